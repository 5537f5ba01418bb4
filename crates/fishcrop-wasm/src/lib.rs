//! Fishcrop WASM - WebAssembly bindings for Fishcrop
//!
//! This crate exposes the fishcrop-core cropper to JavaScript/TypeScript
//! applications.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for image data
//! - `cropper` - Border and background removal bindings
//!
//! # Usage
//!
//! ```typescript
//! import init, { crop_fish_png } from '@fishcrop/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const png = crop_fish_png(bytes, 1);
//! ```

use wasm_bindgen::prelude::*;

mod cropper;
mod types;

pub use cropper::{crop_fish, crop_fish_png, crop_fish_with_config, JsCropResult};
pub use types::JsCanvas;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
