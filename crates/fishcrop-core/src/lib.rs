//! Fishcrop Core - white border and background removal
//!
//! This crate crops a photographed fish out of its white frame and clears
//! the flat background around it, leaving the fish on a transparent canvas
//! cropped to its bounding box.
//!
//! # Module Structure
//!
//! - `pixel` - near-white classification and read-only line access
//! - `scan` - border detection along one axis
//! - `host` - the [`ImageHost`] capability trait the cropper drives
//! - `cropper` - the crop, select, clear and re-crop sequence
//! - `raster` - an in-memory [`ImageHost`] over an owned canvas
//! - `codec` - decoding input images and PNG output

pub mod codec;
pub mod cropper;
pub mod host;
pub mod pixel;
pub mod raster;
pub mod scan;

pub use codec::{decode_image, encode_png, CodecError};
pub use cropper::{crop_fish, CropReport, CropStage, CropperConfig, FishCropper, OperationFailed, Step};
pub use host::{ChannelOp, Drawable, DrawableId, HostError, ImageHost, ImageId, PdbStatus, RunMode};
pub use pixel::{is_white, PixelError, PixelView, WHITE_THRESHOLD};
pub use raster::{Canvas, RasterHost, Selection};
pub use scan::{scan, scan_with, Axis, BorderResult, Bounds, Rect, ScanConfig};

/// Crop an image held in memory, returning the report and the result.
///
/// Builds a [`RasterHost`] around `canvas` and runs the cropper with
/// `config` on its only layer.
pub fn crop_canvas(canvas: Canvas, run_mode: RunMode, config: CropperConfig) -> (CropReport, RasterHost) {
    let mut host = RasterHost::new(canvas);
    let (image, drawable) = (host.image_id(), host.drawable_id());
    let report = FishCropper::new(config).process(&mut host, run_mode, image, drawable);
    (report, host)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAY: [u8; 3] = [128, 128, 128];
    const WHITE: [u8; 3] = [255, 255, 255];
    const FISH: [u8; 3] = [20, 60, 180];

    /// 100x100 photo: 3px white frame at the edges, gray background, and a
    /// blue 40x20 fish at (30, 40).
    fn fish_photo() -> Canvas {
        let mut canvas = Canvas::filled(100, 100, WHITE);
        canvas.fill_rect(3, 3, 97, 97, GRAY);
        canvas.fill_rect(30, 40, 70, 60, FISH);
        canvas
    }

    #[test]
    fn test_end_to_end_crop() {
        let (report, host) = crop_canvas(fish_photo(), RunMode::Interactive, CropperConfig::default());

        assert_eq!(report.status(), PdbStatus::Success);
        assert_eq!(report.vertical, Some(BorderResult { c1: 4, c2: 93 }));
        assert_eq!(report.horizontal, Some(BorderResult { c1: 4, c2: 93 }));
        // Fish sits at (26, 36) after the first crop
        assert_eq!(report.final_rect, Some(Rect::new(26, 36, 66, 56)));

        let canvas = host.canvas();
        assert_eq!((canvas.width(), canvas.height(), canvas.channels()), (40, 20, 4));
        assert!(canvas.pixels().chunks_exact(4).all(|px| px == [20, 60, 180, 255]));

        assert!(!host.is_attached());
        assert_eq!(host.flush_count(), 1);
        assert!(host.messages().is_empty());
        assert_eq!(host.progress(), &[0.25, 0.50, 0.60, 0.65, 0.80, 0.90, 1.0]);
        assert_eq!(host.progress_label(), Some(cropper::PROGRESS_LABEL));
        assert!((host.similarity_threshold() - raster::DEFAULT_SIMILARITY_THRESHOLD).abs() < f64::EPSILON);
    }

    #[test]
    fn test_end_to_end_rgba_input() {
        let canvas = fish_photo().with_alpha();
        let (report, host) = crop_canvas(canvas, RunMode::NonInteractive, CropperConfig::default());

        assert_eq!(report.status(), PdbStatus::Success);
        assert_eq!((host.canvas().width(), host.canvas().height()), (40, 20));
    }

    #[test]
    fn test_background_pixels_become_transparent() {
        // Fish with a notch: the gray inside the notch touches the background
        let mut canvas = fish_photo();
        canvas.fill_rect(45, 40, 55, 45, GRAY);
        let (report, host) = crop_canvas(canvas, RunMode::Interactive, CropperConfig::default());

        assert_eq!(report.status(), PdbStatus::Success);
        let out = host.canvas();
        assert_eq!((out.width(), out.height()), (40, 20));
        // Notch at (15..25, 0..5) in output coordinates
        assert_eq!(out.pixel(20, 2)[3], 0);
        assert_eq!(out.pixel(20, 10), &[20, 60, 180, 255]);
    }

    #[test]
    fn test_thick_border_fails_first_crop() {
        // A 6px frame is hit twice before the inset clears it, leaving an
        // empty crop rectangle
        let mut canvas = Canvas::filled(100, 100, WHITE);
        canvas.fill_rect(6, 6, 94, 94, GRAY);
        let original = canvas.clone();
        let (report, host) = crop_canvas(canvas, RunMode::Interactive, CropperConfig::default());

        assert_eq!(report.status(), PdbStatus::ExecutionError);
        assert_eq!(report.vertical, Some(BorderResult { c1: 4, c2: 1 }));
        assert_eq!(report.error().map(|e| e.step), Some(Step::Crop));
        assert!(matches!(
            report.error().map(|e| &e.source),
            Some(HostError::InvalidRegion { .. })
        ));
        assert_eq!(host.messages(), &["Failed to crop out borders".to_string()]);
        assert_eq!(host.canvas(), &original);
        assert_eq!(host.progress().len(), 7);
        assert!(!host.is_attached());
    }

    #[test]
    fn test_failure_is_silent_when_non_interactive() {
        let mut canvas = Canvas::filled(100, 100, WHITE);
        canvas.fill_rect(6, 6, 94, 94, GRAY);
        let (report, host) = crop_canvas(canvas, RunMode::NonInteractive, CropperConfig::default());

        assert_eq!(report.status().code(), 1);
        assert!(host.messages().is_empty());
    }

    #[test]
    fn test_no_border_photo() {
        // Without a frame the first crop keeps everything
        let mut canvas = Canvas::filled(60, 60, GRAY);
        canvas.fill_rect(20, 25, 40, 35, FISH);
        let (report, host) = crop_canvas(canvas, RunMode::Interactive, CropperConfig::default());

        assert_eq!(report.status(), PdbStatus::Success);
        assert_eq!(report.border_rect(), Some(Rect::full(60, 60)));
        assert_eq!(report.final_rect, Some(Rect::new(20, 25, 40, 35)));
        assert_eq!((host.canvas().width(), host.canvas().height()), (20, 10));
    }

    #[test]
    fn test_unknown_drawable_still_completes_progress() {
        let mut host = RasterHost::new(fish_photo());
        let image = host.image_id();
        let report = crop_fish(&mut host, RunMode::Interactive, image, DrawableId(99));

        assert_eq!(report.status(), PdbStatus::ExecutionError);
        assert_eq!(report.error().map(|e| e.step), Some(Step::Drawable));
        assert_eq!(host.progress(), &[0.25, 0.50, 0.60, 0.65, 0.80, 0.90, 1.0]);
        assert_eq!(host.messages(), &["Failed to access the drawable".to_string()]);
        assert_eq!(host.flush_count(), 1);
        assert_eq!(host.canvas(), &fish_photo());
    }

    #[test]
    fn test_channel_drawable_clears_to_white() {
        let mut host = RasterHost::new(fish_photo()).as_channel();
        let (image, drawable) = (host.image_id(), host.drawable_id());
        let report = crop_fish(&mut host, RunMode::Interactive, image, drawable);

        // No alpha: the cleared background is white and alpha selection
        // covers the whole layer, so the last crop keeps the first crop
        assert_eq!(report.status(), PdbStatus::Success);
        assert_eq!(report.final_rect, Some(Rect::full(89, 89)));
        assert_eq!(host.canvas().pixel(0, 0), &WHITE);
        assert_eq!(host.canvas().channels(), 3);
    }
}
