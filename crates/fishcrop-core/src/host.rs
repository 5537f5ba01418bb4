//! The image editor the cropper runs inside.
//!
//! Everything that touches editor state goes through [`ImageHost`]: pixel
//! reads, crops, selections, the shared similarity threshold and user
//! feedback. The cropper itself holds no state between invocations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pixel::{PixelError, PixelView};
use crate::scan::Rect;

/// Host identifier of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(pub u32);

/// Host identifier of a drawable (layer, channel or mask).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawableId(pub u32);

/// An attached drawable. Must be handed back through [`ImageHost::release`].
#[derive(Debug, PartialEq, Eq)]
pub struct Drawable {
    id: DrawableId,
}

impl Drawable {
    pub fn new(id: DrawableId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> DrawableId {
        self.id
    }
}

/// How the procedure was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunMode {
    #[default]
    Interactive,
    NonInteractive,
    WithLastVals,
}

impl RunMode {
    /// Whether diagnostic messages should reach the user.
    pub fn shows_messages(self) -> bool {
        self != RunMode::NonInteractive
    }
}

/// How a new selection combines with the existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelOp {
    Add,
    Subtract,
    #[default]
    Replace,
    Intersect,
}

/// Procedure return status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PdbStatus {
    Success,
    ExecutionError,
}

impl PdbStatus {
    /// Numeric status code (0 = success, 1 = execution error).
    pub fn code(self) -> u32 {
        match self {
            PdbStatus::Success => 0,
            PdbStatus::ExecutionError => 1,
        }
    }
}

/// Failures reported by host operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("Unknown image: {0:?}")]
    UnknownImage(ImageId),

    #[error("Unknown drawable: {0:?}")]
    UnknownDrawable(DrawableId),

    /// Crop rectangle is empty or extends past the image.
    #[error("Invalid region {width}x{height} at ({x}, {y}) for a {image_width}x{image_height} image")]
    InvalidRegion {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("Seed point ({x}, {y}) is outside the drawable")]
    SeedOutOfBounds { x: f64, y: f64 },

    #[error("Drawable {0:?} is not a layer")]
    NotALayer(DrawableId),

    #[error(transparent)]
    Pixels(#[from] PixelError),

    /// The host refused the operation for its own reasons.
    #[error("Host rejected the operation: {0}")]
    Rejected(String),
}

/// Editor capabilities consumed by the cropper.
pub trait ImageHost {
    /// Attach a drawable for the duration of one invocation.
    fn get_drawable(&mut self, id: DrawableId) -> Result<Drawable, HostError>;

    /// Detach a drawable obtained from [`ImageHost::get_drawable`].
    fn release(&mut self, drawable: Drawable);

    /// Bounding box of the current selection on the drawable, or the whole
    /// drawable when nothing is selected.
    fn mask_bounds(&self, drawable: &Drawable) -> Result<Rect, HostError>;

    /// Read-only view of the drawable's pixels.
    fn pixels(&self, drawable: &Drawable) -> Result<PixelView<'_>, HostError>;

    fn bytes_per_pixel(&self, drawable: &Drawable) -> Result<usize, HostError> {
        Ok(self.pixels(drawable)?.channels())
    }

    /// Crop the image to `width` x `height` starting at the offset.
    fn crop(
        &mut self,
        image: ImageId,
        width: u32,
        height: u32,
        offset_x: u32,
        offset_y: u32,
    ) -> Result<(), HostError>;

    fn has_alpha(&self, drawable: &Drawable) -> bool;

    fn is_layer(&self, drawable: &Drawable) -> bool;

    fn add_alpha(&mut self, drawable: &Drawable) -> Result<(), HostError>;

    /// Colour distance (0.0 to 1.0) used by colour selections.
    fn similarity_threshold(&self) -> f64;

    fn set_similarity_threshold(&mut self, value: f64);

    /// Select the connected region of similar colour around the seed.
    fn select_contiguous_color(
        &mut self,
        image: ImageId,
        op: ChannelOp,
        drawable: &Drawable,
        seed_x: f64,
        seed_y: f64,
    ) -> Result<(), HostError>;

    /// Select the drawable's non-transparent pixels.
    fn select_by_item_alpha(
        &mut self,
        image: ImageId,
        op: ChannelOp,
        drawable: &Drawable,
    ) -> Result<(), HostError>;

    /// Erase the selected pixels of the drawable.
    fn clear_selection(&mut self, drawable: &Drawable) -> Result<(), HostError>;

    fn flush_display(&mut self);

    fn init_progress(&mut self, message: &str);

    /// Report progress as a fraction (0.0 to 1.0).
    fn report_progress(&mut self, fraction: f64);

    fn report_message(&mut self, text: &str);
}
