//! WASM-compatible wrapper types for image data.
//!
//! This module provides JavaScript-friendly types that wrap the core fishcrop
//! canvas, handling the conversion between Rust and JavaScript data
//! representations.

use fishcrop_core::{Canvas, PixelError, RunMode};
use wasm_bindgen::prelude::*;

/// An RGB or RGBA image wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
#[derive(Clone)]
pub struct JsCanvas {
    width: u32,
    height: u32,
    channels: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsCanvas {
    /// Create a new JsCanvas from dimensions and pixel data.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `channels` - 3 for RGB, 4 for RGBA
    /// * `pixels` - Interleaved pixel data, row-major order
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, channels: u32, pixels: Vec<u8>) -> JsCanvas {
        JsCanvas {
            width,
            height,
            channels,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per pixel (3 or 4)
    #[wasm_bindgen(getter)]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl JsCanvas {
    pub(crate) fn from_canvas(canvas: Canvas) -> Self {
        Self {
            width: canvas.width(),
            height: canvas.height(),
            channels: canvas.channels() as u32,
            pixels: canvas.into_pixels(),
        }
    }

    /// Convert to a core Canvas, validating channels and buffer length.
    /// Note: This clones the pixel data.
    pub(crate) fn to_canvas(&self) -> Result<Canvas, PixelError> {
        Canvas::new(self.width, self.height, self.channels as usize, self.pixels.clone())
    }
}

/// Convert a host run mode value to the core RunMode enum.
///
/// Values:
/// - 0 = Interactive
/// - 1 = NonInteractive
/// - 2 = WithLastVals
///
/// Any other value is treated as NonInteractive.
pub(crate) fn run_mode_from_u32(value: u32) -> RunMode {
    match value {
        0 => RunMode::Interactive,
        2 => RunMode::WithLastVals,
        _ => RunMode::NonInteractive,
    }
}
