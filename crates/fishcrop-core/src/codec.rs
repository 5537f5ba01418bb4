//! Decoding input images and encoding results.
//!
//! Output is always PNG so that the cleared background stays transparent.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageReader};
use thiserror::Error;

use crate::raster::Canvas;

/// Errors that can occur while decoding or encoding images.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The bytes are not an image format we can read.
    #[error("Invalid or unsupported image format: {0}")]
    InvalidFormat(String),

    /// The image header was readable but the data was not.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Decode an image from bytes, guessing the format from its contents.
///
/// Images with an alpha channel decode to RGBA, everything else to RGB.
pub fn decode_image(bytes: &[u8]) -> Result<Canvas, CodecError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CodecError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(CodecError::InvalidFormat("unrecognized image signature".to_string()));
    }

    let img = reader
        .decode()
        .map_err(|e| CodecError::CorruptedFile(e.to_string()))?;

    Ok(Canvas::from_dynamic(img))
}

/// Encode a canvas as PNG, keeping its alpha channel if it has one.
pub fn encode_png(canvas: &Canvas) -> Result<Vec<u8>, CodecError> {
    let (width, height) = (canvas.width(), canvas.height());
    if width == 0 || height == 0 {
        return Err(CodecError::InvalidDimensions { width, height });
    }

    let color = if canvas.has_alpha() {
        ExtendedColorType::Rgba8
    } else {
        ExtendedColorType::Rgb8
    };

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(canvas.pixels(), width, height, color)
        .map_err(|e| CodecError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_encode_png_magic() {
        let canvas = Canvas::filled(10, 10, [128, 128, 128]);
        let png = encode_png(&canvas).unwrap();
        assert_eq!(&png[..8], &PNG_MAGIC);
    }

    #[test]
    fn test_png_keeps_transparency() {
        let mut canvas = Canvas::filled(4, 4, [10, 20, 30]).with_alpha();
        let mut mask = crate::raster::Selection::none(4, 4);
        mask.select(0, 0);
        canvas.clear(&mask);

        let decoded = decode_image(&encode_png(&canvas).unwrap()).unwrap();
        assert_eq!(decoded.channels(), 4);
        assert_eq!(decoded.pixel(0, 0)[3], 0);
        assert_eq!(decoded.pixel(1, 0), &[10, 20, 30, 255]);
    }

    #[test]
    fn test_rgb_png_decodes_to_rgb() {
        let canvas = Canvas::filled(3, 5, [1, 2, 3]);
        let decoded = decode_image(&encode_png(&canvas).unwrap()).unwrap();
        assert_eq!(decoded, canvas);
    }

    #[test]
    fn test_decode_jpeg() {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([200, 100, 50]));
        let mut jpeg = Cursor::new(Vec::new());
        img.write_to(&mut jpeg, image::ImageFormat::Jpeg).unwrap();

        let decoded = decode_image(jpeg.get_ref()).unwrap();
        assert_eq!((decoded.width(), decoded.height(), decoded.channels()), (8, 8, 3));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_image(&[1, 2, 3, 4, 5]),
            Err(CodecError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_decode_truncated_png() {
        let png = encode_png(&Canvas::filled(16, 16, [5, 5, 5])).unwrap();
        assert!(matches!(
            decode_image(&png[..20]),
            Err(CodecError::CorruptedFile(_))
        ));
    }

    #[test]
    fn test_encode_empty_canvas() {
        let canvas = Canvas::filled(0, 3, [0, 0, 0]);
        assert!(matches!(
            encode_png(&canvas),
            Err(CodecError::InvalidDimensions { width: 0, height: 3 })
        ));
    }
}
