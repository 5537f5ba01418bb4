//! WASM bindings for the fish cropper.
//!
//! Each call runs the full pass on an in-memory copy of the image and hands
//! back the result together with the host status code.

use crate::types::{run_mode_from_u32, JsCanvas};
use fishcrop_core::{
    crop_canvas, decode_image, encode_png, BorderResult, Canvas, CropReport, CropperConfig, Rect,
    RunMode, Step,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Result of a crop run.
///
/// `status` follows the host convention: 0 on success, 1 on an execution
/// error. On failure `image` holds whatever the pass left behind.
#[wasm_bindgen]
pub struct JsCropResult {
    status: u32,
    message: Option<String>,
    image: JsCanvas,
    summary: CropSummary,
}

/// Serializable view of a [`CropReport`] for JavaScript.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct CropSummary {
    status: u32,
    vertical: Option<BorderResult>,
    horizontal: Option<BorderResult>,
    border_rect: Option<Rect>,
    final_rect: Option<Rect>,
    failed_step: Option<Step>,
}

impl From<&CropReport> for CropSummary {
    fn from(report: &CropReport) -> Self {
        Self {
            status: report.status().code(),
            vertical: report.vertical,
            horizontal: report.horizontal,
            border_rect: report.border_rect(),
            final_rect: report.final_rect,
            failed_step: report.error().map(|e| e.step),
        }
    }
}

#[wasm_bindgen]
impl JsCropResult {
    #[wasm_bindgen(getter)]
    pub fn status(&self) -> u32 {
        self.status
    }

    #[wasm_bindgen(getter)]
    pub fn succeeded(&self) -> bool {
        self.status == 0
    }

    /// Failure message, if the pass failed.
    #[wasm_bindgen(getter)]
    pub fn message(&self) -> Option<String> {
        self.message.clone()
    }

    /// The processed image (a copy).
    pub fn image(&self) -> JsCanvas {
        self.image.clone()
    }

    /// Border edges and crop rectangles as a plain object.
    ///
    /// # Errors
    /// Returns error if the summary cannot be serialized
    pub fn report(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.summary)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize report: {}", e)))
    }
}

/// Crop the fish out of its white frame and clear the background.
///
/// # Arguments
///
/// * `image` - RGB or RGBA source image
/// * `run_mode` - 0 = interactive, 1 = non-interactive, 2 = with last values
///
/// # Returns
///
/// A `JsCropResult` with the status code and the cropped image. Failures in
/// interactive runs are also written to the browser console.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const result = crop_fish(image, 0);
/// if (result.succeeded) {
///   draw(result.image());
/// }
/// ```
#[wasm_bindgen]
pub fn crop_fish(image: &JsCanvas, run_mode: u32) -> JsCropResult {
    crop_js_canvas(image, run_mode_from_u32(run_mode), CropperConfig::default())
}

/// Like [`crop_fish`], with settings taken from a JS object.
///
/// Missing fields fall back to their defaults, e.g.
/// `{ similarity_threshold: 0.3, scan: { border_inset: 2 } }`.
///
/// # Errors
/// Returns error if `config` cannot be deserialized
#[wasm_bindgen]
pub fn crop_fish_with_config(
    image: &JsCanvas,
    run_mode: u32,
    config: JsValue,
) -> Result<JsCropResult, JsValue> {
    let config: CropperConfig = serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsValue::from_str(&format!("Invalid cropper config: {}", e)))?;
    Ok(crop_js_canvas(image, run_mode_from_u32(run_mode), config))
}

/// Decode an image, crop it and encode the result as PNG.
///
/// # Errors
/// Returns error if decoding fails, the cropper fails, or PNG encoding fails
#[wasm_bindgen]
pub fn crop_fish_png(bytes: &[u8], run_mode: u32) -> Result<Vec<u8>, JsValue> {
    crop_png_bytes(bytes, run_mode_from_u32(run_mode)).map_err(|e| JsValue::from_str(&e))
}

fn crop_js_canvas(image: &JsCanvas, run_mode: RunMode, config: CropperConfig) -> JsCropResult {
    let canvas = match image.to_canvas() {
        Ok(canvas) => canvas,
        Err(e) => {
            let message = format!("Invalid image: {}", e);
            log::warn!("{}", message);
            if run_mode.shows_messages() {
                show_messages(std::slice::from_ref(&message));
            }
            return JsCropResult {
                status: 1,
                message: Some(message),
                image: image.clone(),
                summary: CropSummary {
                    status: 1,
                    vertical: None,
                    horizontal: None,
                    border_rect: None,
                    final_rect: None,
                    failed_step: None,
                },
            };
        }
    };
    run_crop(canvas, run_mode, config)
}

fn run_crop(canvas: Canvas, run_mode: RunMode, config: CropperConfig) -> JsCropResult {
    let (report, host) = crop_canvas(canvas, run_mode, config);
    show_messages(host.messages());

    let summary = CropSummary::from(&report);
    JsCropResult {
        status: summary.status,
        message: report.error().map(|e| e.to_string()),
        image: JsCanvas::from_canvas(host.into_canvas()),
        summary,
    }
}

fn crop_png_bytes(bytes: &[u8], run_mode: RunMode) -> Result<Vec<u8>, String> {
    let canvas = decode_image(bytes).map_err(|e| e.to_string())?;
    let (report, host) = crop_canvas(canvas, run_mode, CropperConfig::default());
    show_messages(host.messages());

    if let Some(failure) = report.error() {
        return Err(failure.to_string());
    }
    encode_png(host.canvas()).map_err(|e| e.to_string())
}

/// Forward host messages to the browser console.
///
/// The host has already logged them.
fn show_messages(messages: &[String]) {
    for message in messages {
        console_error(message);
    }
}

#[cfg(target_arch = "wasm32")]
fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from_str(message));
}

// No console outside the browser
#[cfg(not(target_arch = "wasm32"))]
fn console_error(_message: &str) {}
