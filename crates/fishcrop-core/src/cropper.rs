//! Border and background removal.
//!
//! [`FishCropper::process`] runs one invocation against an [`ImageHost`]:
//!
//! 1. Scan for the white border vertically, then horizontally
//! 2. Crop to the area inside the border
//! 3. Make sure the drawable has an alpha channel
//! 4. Select the background by colour from a point near the top-left corner
//! 5. Clear the selection
//! 6. Select what is left by alpha and crop to it
//!
//! The first failing step ends the run: later mutations are skipped, but
//! progress is still reported to completion, the display is flushed and the
//! drawable is released.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::{ChannelOp, Drawable, DrawableId, HostError, ImageHost, ImageId, PdbStatus, RunMode};
use crate::scan::{scan_with, Axis, BorderResult, Rect, ScanConfig};

/// Label shown while the cropper runs.
pub const PROGRESS_LABEL: &str = "Cropping the fish...";

/// Settings for one cropper run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropperConfig {
    pub scan: ScanConfig,
    /// Similarity threshold (0.0 to 1.0) used while selecting the background.
    pub similarity_threshold: f64,
    /// Distance of the background seed point from the top-left corner.
    pub seed_inset: u32,
}

impl Default for CropperConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            similarity_threshold: 0.2,
            seed_inset: 4,
        }
    }
}

/// A mutating step of the cropper pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    Drawable,
    Crop,
    Alpha,
    Select,
    Clear,
    FinalCrop,
}

impl Step {
    /// User-facing message for a failure of this step.
    pub fn message(self) -> &'static str {
        match self {
            Step::Drawable => "Failed to access the drawable",
            Step::Crop | Step::FinalCrop => "Failed to crop out borders",
            Step::Alpha => "Failed to add an Alpha channel",
            Step::Select => "Failed to select the background",
            Step::Clear => "Failed to clear the background",
        }
    }
}

/// A host operation failed during `step`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", .step.message())]
pub struct OperationFailed {
    pub step: Step,
    #[source]
    pub source: HostError,
}

impl OperationFailed {
    pub fn new(step: Step, source: HostError) -> Self {
        Self { step, source }
    }
}

/// The mutating steps, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Crop,
    Alpha,
    Select,
    Clear,
    FinalCrop,
}

impl Action {
    fn step(self) -> Step {
        match self {
            Action::Crop => Step::Crop,
            Action::Alpha => Step::Alpha,
            Action::Select => Step::Select,
            Action::Clear => Step::Clear,
            Action::FinalCrop => Step::FinalCrop,
        }
    }
}

/// Where a run got to. Stages only move forward; any stage may fail.
#[derive(Debug, Clone, PartialEq)]
pub enum CropStage {
    Pending,
    CroppedOnce,
    AlphaEnsured,
    BackgroundSelected,
    BackgroundCleared,
    FinalCropped,
    Failed(OperationFailed),
}

impl CropStage {
    /// The stage reached when the step after this one succeeds.
    pub fn next(&self) -> Option<CropStage> {
        match self {
            CropStage::Pending => Some(CropStage::CroppedOnce),
            CropStage::CroppedOnce => Some(CropStage::AlphaEnsured),
            CropStage::AlphaEnsured => Some(CropStage::BackgroundSelected),
            CropStage::BackgroundSelected => Some(CropStage::BackgroundCleared),
            CropStage::BackgroundCleared => Some(CropStage::FinalCropped),
            CropStage::FinalCropped | CropStage::Failed(_) => None,
        }
    }

    /// The action that moves a run out of this stage.
    fn pending_action(&self) -> Option<Action> {
        match self {
            CropStage::Pending => Some(Action::Crop),
            CropStage::CroppedOnce => Some(Action::Alpha),
            CropStage::AlphaEnsured => Some(Action::Select),
            CropStage::BackgroundSelected => Some(Action::Clear),
            CropStage::BackgroundCleared => Some(Action::FinalCrop),
            CropStage::FinalCropped | CropStage::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CropStage::Failed(_))
    }
}

/// Outcome of one cropper run.
#[derive(Debug, Clone, PartialEq)]
pub struct CropReport {
    /// Top and bottom border edges.
    pub vertical: Option<BorderResult>,
    /// Left and right border edges.
    pub horizontal: Option<BorderResult>,
    /// Rectangle of the last crop, in the coordinates of the first crop.
    pub final_rect: Option<Rect>,
    pub stage: CropStage,
}

impl CropReport {
    fn new() -> Self {
        Self {
            vertical: None,
            horizontal: None,
            final_rect: None,
            stage: CropStage::Pending,
        }
    }

    pub fn status(&self) -> PdbStatus {
        if self.stage.is_failed() {
            PdbStatus::ExecutionError
        } else {
            PdbStatus::Success
        }
    }

    pub fn error(&self) -> Option<&OperationFailed> {
        match &self.stage {
            CropStage::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Rectangle of the first crop, built from both scans.
    pub fn border_rect(&self) -> Option<Rect> {
        let (v, h) = (self.vertical?, self.horizontal?);
        Some(Rect::new(h.c1, v.c1, h.c2, v.c2))
    }
}

/// Progress reported after the vertical and horizontal scans.
const SCAN_PROGRESS: [f64; 2] = [0.25, 0.50];

/// Progress reported after each mutating step, in step order.
const STEP_PROGRESS: [f64; 5] = [0.60, 0.65, 0.80, 0.90, 1.0];

/// Removes the white border and background around a photographed fish.
#[derive(Debug, Clone, Copy, Default)]
pub struct FishCropper {
    config: CropperConfig,
}

impl FishCropper {
    pub fn new(config: CropperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CropperConfig {
        &self.config
    }

    /// Run the full pass on `drawable_id` of `image`.
    ///
    /// Failure messages are shown unless `run_mode` is
    /// [`RunMode::NonInteractive`]; the returned report always carries the
    /// status.
    pub fn process<H: ImageHost + ?Sized>(
        &self,
        host: &mut H,
        run_mode: RunMode,
        image: ImageId,
        drawable_id: DrawableId,
    ) -> CropReport {
        let mut report = CropReport::new();
        host.init_progress(PROGRESS_LABEL);

        let drawable = match host.get_drawable(drawable_id) {
            Ok(drawable) => drawable,
            Err(source) => {
                self.fail(host, run_mode, &mut report, OperationFailed::new(Step::Drawable, source));
                for progress in SCAN_PROGRESS.into_iter().chain(STEP_PROGRESS) {
                    host.report_progress(progress);
                }
                host.flush_display();
                return report;
            }
        };

        let vertical = self.scan_axis(host, &drawable, Axis::Vertical);
        host.report_progress(SCAN_PROGRESS[0]);
        let horizontal = self.scan_axis(host, &drawable, Axis::Horizontal);
        host.report_progress(SCAN_PROGRESS[1]);

        match (vertical, horizontal) {
            (Ok(vertical), Ok(horizontal)) => {
                log::debug!(
                    "X: ({}, {}), Y: ({}, {})",
                    horizontal.c1,
                    horizontal.c2,
                    vertical.c1,
                    vertical.c2
                );
                report.vertical = Some(vertical);
                report.horizontal = Some(horizontal);
            }
            (Err(source), _) | (_, Err(source)) => {
                self.fail(host, run_mode, &mut report, OperationFailed::new(Step::Crop, source));
            }
        }

        for progress in STEP_PROGRESS {
            if let Some(action) = report.stage.pending_action() {
                match self.run_action(host, image, &drawable, action, &mut report) {
                    Ok(()) => {
                        if let Some(next) = report.stage.next() {
                            log::debug!("{:?} done, now {:?}", action, next);
                            report.stage = next;
                        }
                    }
                    Err(source) => {
                        let failure = OperationFailed::new(action.step(), source);
                        self.fail(host, run_mode, &mut report, failure);
                    }
                }
            }
            host.report_progress(progress);
        }

        host.flush_display();
        host.release(drawable);
        report
    }

    fn fail<H: ImageHost + ?Sized>(
        &self,
        host: &mut H,
        run_mode: RunMode,
        report: &mut CropReport,
        failure: OperationFailed,
    ) {
        log::warn!("{}: {}", failure, failure.source);
        if run_mode.shows_messages() {
            host.report_message(failure.step.message());
        }
        report.stage = CropStage::Failed(failure);
    }

    fn scan_axis<H: ImageHost + ?Sized>(
        &self,
        host: &H,
        drawable: &Drawable,
        axis: Axis,
    ) -> Result<BorderResult, HostError> {
        let rect = host.mask_bounds(drawable)?;
        let view = host.pixels(drawable)?;
        Ok(scan_with(&view, rect, axis, &self.config.scan))
    }

    fn run_action<H: ImageHost + ?Sized>(
        &self,
        host: &mut H,
        image: ImageId,
        drawable: &Drawable,
        action: Action,
        report: &mut CropReport,
    ) -> Result<(), HostError> {
        match action {
            Action::Crop => {
                let rect = report.border_rect().unwrap_or_default();
                host.crop(image, rect.width(), rect.height(), rect.x1, rect.y1)
            }
            Action::Alpha => {
                if host.has_alpha(drawable) || !host.is_layer(drawable) {
                    // Only layers can gain an alpha channel; others go on without one
                    return Ok(());
                }
                host.add_alpha(drawable)
            }
            Action::Select => self.select_background(host, image, drawable),
            Action::Clear => host.clear_selection(drawable),
            Action::FinalCrop => {
                host.select_by_item_alpha(image, ChannelOp::Replace, drawable)?;
                let rect = host.mask_bounds(drawable)?;
                host.crop(image, rect.width(), rect.height(), rect.x1, rect.y1)?;
                report.final_rect = Some(rect);
                Ok(())
            }
        }
    }

    /// Contiguous colour selection at the seed point, with the host's
    /// similarity threshold overridden only for the duration of the call.
    fn select_background<H: ImageHost + ?Sized>(
        &self,
        host: &mut H,
        image: ImageId,
        drawable: &Drawable,
    ) -> Result<(), HostError> {
        let bounds = host.mask_bounds(drawable)?;
        let seed_x = f64::from(bounds.x1.saturating_add(self.config.seed_inset));
        let seed_y = f64::from(bounds.y1.saturating_add(self.config.seed_inset));

        let previous = host.similarity_threshold();
        host.set_similarity_threshold(self.config.similarity_threshold);
        let selected = host.select_contiguous_color(image, ChannelOp::Replace, drawable, seed_x, seed_y);
        host.set_similarity_threshold(previous);

        selected
    }
}

/// Run the cropper with default settings.
pub fn crop_fish<H: ImageHost + ?Sized>(
    host: &mut H,
    run_mode: RunMode,
    image: ImageId,
    drawable: DrawableId,
) -> CropReport {
    FishCropper::default().process(host, run_mode, image, drawable)
}
