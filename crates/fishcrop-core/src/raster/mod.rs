//! In-memory image host.
//!
//! [`RasterHost`] implements [`ImageHost`] over a single-layer [`Canvas`],
//! so the cropper can run without a desktop editor: in tests, from WASM,
//! or in batch jobs. It mirrors the editor behaviour the cropper relies on:
//!
//! - Mask bounds are the selection's bounding box, or the whole layer when
//!   nothing is selected
//! - Cropping cuts the selection along with the pixels
//! - Clearing with nothing selected clears the whole layer
//!
//! Progress, messages and display flushes are recorded rather than shown.

mod canvas;
mod selection;

pub use canvas::{Canvas, BACKGROUND};
pub use selection::Selection;

use crate::host::{ChannelOp, Drawable, DrawableId, HostError, ImageHost, ImageId};
use crate::pixel::PixelView;
use crate::scan::Rect;

/// Similarity threshold a fresh host starts with (15 of 255).
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 15.0 / 255.0;

/// Single-image, single-layer host backed by an owned canvas.
#[derive(Debug, Clone)]
pub struct RasterHost {
    image: ImageId,
    drawable: DrawableId,
    canvas: Canvas,
    selection: Selection,
    layer: bool,
    threshold: f64,
    attached: bool,
    progress_label: Option<String>,
    progress: Vec<f64>,
    messages: Vec<String>,
    flushes: usize,
}

impl RasterHost {
    pub fn new(canvas: Canvas) -> Self {
        let selection = Selection::none(canvas.width(), canvas.height());
        Self {
            image: ImageId(1),
            drawable: DrawableId(2),
            canvas,
            selection,
            layer: true,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            attached: false,
            progress_label: None,
            progress: Vec::new(),
            messages: Vec::new(),
            flushes: 0,
        }
    }

    /// Treat the drawable as a channel rather than a layer.
    pub fn as_channel(mut self) -> Self {
        self.layer = false;
        self
    }

    pub fn image_id(&self) -> ImageId {
        self.image
    }

    pub fn drawable_id(&self) -> DrawableId {
        self.drawable
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn into_canvas(self) -> Canvas {
        self.canvas
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Whether a drawable handle is currently out.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn progress_label(&self) -> Option<&str> {
        self.progress_label.as_deref()
    }

    pub fn progress(&self) -> &[f64] {
        &self.progress
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    fn check_image(&self, image: ImageId) -> Result<(), HostError> {
        if image == self.image {
            Ok(())
        } else {
            Err(HostError::UnknownImage(image))
        }
    }

    fn check_drawable(&self, drawable: &Drawable) -> Result<(), HostError> {
        if drawable.id() == self.drawable {
            Ok(())
        } else {
            Err(HostError::UnknownDrawable(drawable.id()))
        }
    }

    /// Integer pixel under a seed point, if it lies on the canvas.
    fn seed_pixel(&self, x: f64, y: f64) -> Result<(u32, u32), HostError> {
        let (w, h) = (f64::from(self.canvas.width()), f64::from(self.canvas.height()));
        if !(0.0..w).contains(&x) || !(0.0..h).contains(&y) {
            return Err(HostError::SeedOutOfBounds { x, y });
        }
        Ok((x.floor() as u32, y.floor() as u32))
    }
}

impl ImageHost for RasterHost {
    fn get_drawable(&mut self, id: DrawableId) -> Result<Drawable, HostError> {
        if id != self.drawable {
            return Err(HostError::UnknownDrawable(id));
        }
        self.attached = true;
        Ok(Drawable::new(id))
    }

    fn release(&mut self, drawable: Drawable) {
        if drawable.id() == self.drawable {
            self.attached = false;
        }
    }

    fn mask_bounds(&self, drawable: &Drawable) -> Result<Rect, HostError> {
        self.check_drawable(drawable)?;
        Ok(self
            .selection
            .bounds()
            .unwrap_or_else(|| Rect::full(self.canvas.width(), self.canvas.height())))
    }

    fn pixels(&self, drawable: &Drawable) -> Result<PixelView<'_>, HostError> {
        self.check_drawable(drawable)?;
        Ok(self.canvas.view()?)
    }

    fn crop(
        &mut self,
        image: ImageId,
        width: u32,
        height: u32,
        offset_x: u32,
        offset_y: u32,
    ) -> Result<(), HostError> {
        self.check_image(image)?;
        let fits_x = offset_x.checked_add(width).is_some_and(|r| r <= self.canvas.width());
        let fits_y = offset_y.checked_add(height).is_some_and(|b| b <= self.canvas.height());
        if width == 0 || height == 0 || !fits_x || !fits_y {
            return Err(HostError::InvalidRegion {
                x: offset_x,
                y: offset_y,
                width,
                height,
                image_width: self.canvas.width(),
                image_height: self.canvas.height(),
            });
        }

        log::debug!("crop to {}x{} at ({}, {})", width, height, offset_x, offset_y);
        self.canvas = self.canvas.crop(offset_x, offset_y, width, height);
        self.selection = self.selection.crop(offset_x, offset_y, width, height);
        Ok(())
    }

    fn has_alpha(&self, drawable: &Drawable) -> bool {
        self.check_drawable(drawable).is_ok() && self.canvas.has_alpha()
    }

    fn is_layer(&self, drawable: &Drawable) -> bool {
        self.check_drawable(drawable).is_ok() && self.layer
    }

    fn add_alpha(&mut self, drawable: &Drawable) -> Result<(), HostError> {
        self.check_drawable(drawable)?;
        if !self.layer {
            return Err(HostError::NotALayer(drawable.id()));
        }
        self.canvas = self.canvas.with_alpha();
        Ok(())
    }

    fn similarity_threshold(&self) -> f64 {
        self.threshold
    }

    fn set_similarity_threshold(&mut self, value: f64) {
        self.threshold = value.clamp(0.0, 1.0);
    }

    fn select_contiguous_color(
        &mut self,
        image: ImageId,
        op: ChannelOp,
        drawable: &Drawable,
        seed_x: f64,
        seed_y: f64,
    ) -> Result<(), HostError> {
        self.check_image(image)?;
        self.check_drawable(drawable)?;
        let (x, y) = self.seed_pixel(seed_x, seed_y)?;

        let region = Selection::contiguous(&self.canvas, x, y, self.threshold);
        log::debug!("contiguous selection at ({}, {}): {} pixels", x, y, region.count());
        self.selection = self.selection.combine(op, region);
        Ok(())
    }

    fn select_by_item_alpha(
        &mut self,
        image: ImageId,
        op: ChannelOp,
        drawable: &Drawable,
    ) -> Result<(), HostError> {
        self.check_image(image)?;
        self.check_drawable(drawable)?;
        let region = Selection::from_alpha(&self.canvas);
        self.selection = self.selection.combine(op, region);
        Ok(())
    }

    fn clear_selection(&mut self, drawable: &Drawable) -> Result<(), HostError> {
        self.check_drawable(drawable)?;
        if self.selection.is_empty() {
            let everything = Selection::all(self.canvas.width(), self.canvas.height());
            self.canvas.clear(&everything);
        } else {
            self.canvas.clear(&self.selection);
        }
        Ok(())
    }

    fn flush_display(&mut self) {
        self.flushes += 1;
    }

    fn init_progress(&mut self, message: &str) {
        self.progress_label = Some(message.to_string());
        self.progress.clear();
    }

    fn report_progress(&mut self, fraction: f64) {
        self.progress.push(fraction.clamp(0.0, 1.0));
    }

    fn report_message(&mut self, text: &str) {
        log::info!("{}", text);
        self.messages.push(text.to_string());
    }
}
