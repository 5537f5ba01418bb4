//! Owned RGB(A) pixel buffer backing the raster host.

use image::{DynamicImage, RgbImage, RgbaImage};

use super::Selection;
use crate::pixel::{PixelError, PixelView};

/// Colour written by a clear on a drawable without alpha.
pub const BACKGROUND: [u8; 3] = [255, 255, 255];

/// An image with interleaved 8-bit RGB or RGBA pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    channels: usize,
    pixels: Vec<u8>,
}

impl Canvas {
    /// Create a canvas, checking the channel count and buffer length.
    pub fn new(width: u32, height: u32, channels: usize, pixels: Vec<u8>) -> Result<Self, PixelError> {
        PixelView::new(width, height, channels, &pixels)?;
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// An RGB canvas filled with one colour.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self {
            width,
            height,
            channels: 3,
            pixels,
        }
    }

    /// Convert a decoded image. Sources with alpha become RGBA, all others RGB.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        if img.color().has_alpha() {
            let rgba = img.into_rgba8();
            let (width, height) = rgba.dimensions();
            Self {
                width,
                height,
                channels: 4,
                pixels: rgba.into_raw(),
            }
        } else {
            let rgb = img.into_rgb8();
            let (width, height) = rgb.dimensions();
            Self {
                width,
                height,
                channels: 3,
                pixels: rgb.into_raw(),
            }
        }
    }

    /// Convert to an `image` crate buffer for encoding.
    pub fn to_dynamic(&self) -> Option<DynamicImage> {
        match self.channels {
            4 => RgbaImage::from_raw(self.width, self.height, self.pixels.clone()).map(DynamicImage::ImageRgba8),
            _ => RgbImage::from_raw(self.width, self.height, self.pixels.clone()).map(DynamicImage::ImageRgb8),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    pub fn view(&self) -> Result<PixelView<'_>, PixelError> {
        PixelView::new(self.width, self.height, self.channels, &self.pixels)
    }

    /// Samples of the pixel at (x, y). Panics outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let idx = (y as usize * self.width as usize + x as usize) * self.channels;
        &self.pixels[idx..idx + self.channels]
    }

    /// Fill `[x1, x2) x [y1, y2)` with `rgb`, leaving alpha untouched.
    pub fn fill_rect(&mut self, x1: u32, y1: u32, x2: u32, y2: u32, rgb: [u8; 3]) {
        for y in y1..y2.min(self.height) {
            for x in x1..x2.min(self.width) {
                let idx = (y as usize * self.width as usize + x as usize) * self.channels;
                self.pixels[idx..idx + 3].copy_from_slice(&rgb);
            }
        }
    }

    /// Copy out a `width` x `height` region at (x, y).
    ///
    /// The caller guarantees the region lies inside the canvas.
    pub(crate) fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Canvas {
        let bpp = self.channels;
        let row_len = width as usize * bpp;
        let mut output = Vec::with_capacity(row_len * height as usize);

        // Copy pixel data row by row
        for row in y..y + height {
            let start = (row as usize * self.width as usize + x as usize) * bpp;
            output.extend_from_slice(&self.pixels[start..start + row_len]);
        }

        Canvas {
            width,
            height,
            channels: bpp,
            pixels: output,
        }
    }

    /// RGBA copy of this canvas with every pixel opaque.
    pub(crate) fn with_alpha(&self) -> Canvas {
        if self.has_alpha() {
            return self.clone();
        }
        let mut pixels = Vec::with_capacity(self.pixels.len() / 3 * 4);
        for rgb in self.pixels.chunks_exact(3) {
            pixels.extend_from_slice(rgb);
            pixels.push(255);
        }
        Canvas {
            width: self.width,
            height: self.height,
            channels: 4,
            pixels,
        }
    }

    /// Erase the pixels selected in `mask`: transparent when the canvas has
    /// alpha, [`BACKGROUND`] otherwise.
    pub(crate) fn clear(&mut self, mask: &Selection) {
        let bpp = self.channels;
        let width = self.width;
        for (idx, px) in self.pixels.chunks_exact_mut(bpp).enumerate() {
            let x = (idx as u32) % width;
            let y = (idx as u32) / width;
            if !mask.contains(x, y) {
                continue;
            }
            if bpp == 4 {
                px[3] = 0;
            } else {
                px.copy_from_slice(&BACKGROUND);
            }
        }
    }
}
