//! Pixel classification and read-only line access.
//!
//! Pixel data is interleaved 8-bit samples, 3 (RGB) or 4 (RGBA) per pixel,
//! in row-major order. The scanner never writes to a buffer: it borrows a
//! [`PixelView`] and pulls single rows or columns ("lines") out of it.

use std::borrow::Cow;
use std::ops::Range;

use thiserror::Error;

use crate::scan::Axis;

/// Every RGB sample must be strictly above this value for a pixel to count
/// as part of the white border.
pub const WHITE_THRESHOLD: u8 = 225;

/// Errors raised when wrapping a raw buffer in a [`PixelView`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PixelError {
    /// Only RGB and RGBA buffers are supported.
    #[error("Unsupported channel count: {0} (expected 3 or 4)")]
    UnsupportedChannels(usize),

    /// Buffer length does not match the declared dimensions.
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Test whether the pixel at `index` of an interleaved line is near-white.
///
/// Reads the R, G and B samples at `channels * index`; alpha is ignored.
/// An index past the end of the line is never white.
#[inline]
pub fn is_white(line: &[u8], channels: usize, index: usize) -> bool {
    is_white_with(line, channels, index, WHITE_THRESHOLD)
}

/// [`is_white`] with an explicit threshold.
#[inline]
pub fn is_white_with(line: &[u8], channels: usize, index: usize, threshold: u8) -> bool {
    let base = channels * index;
    match line.get(base..base + 3) {
        Some(rgb) => rgb.iter().all(|&v| v > threshold),
        None => false,
    }
}

/// Borrowed, read-only view over an interleaved RGB(A) pixel buffer.
#[derive(Debug, Clone, Copy)]
pub struct PixelView<'a> {
    width: u32,
    height: u32,
    channels: usize,
    data: &'a [u8],
}

impl<'a> PixelView<'a> {
    /// Wrap `data`, checking the channel count and buffer length.
    pub fn new(width: u32, height: u32, channels: usize, data: &'a [u8]) -> Result<Self, PixelError> {
        if channels != 3 && channels != 4 {
            return Err(PixelError::UnsupportedChannels(channels));
        }
        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(PixelError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per pixel (3 or 4).
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Borrow the pixels of row `y` for the columns in `xs`.
    ///
    /// The range is clamped to the image; a row past the bottom is empty.
    pub fn row(&self, y: u32, xs: Range<u32>) -> &'a [u8] {
        if y >= self.height {
            return &[];
        }
        let end = xs.end.min(self.width);
        let start = xs.start.min(end);
        let row_start = y as usize * self.width as usize * self.channels;
        &self.data[row_start + start as usize * self.channels..row_start + end as usize * self.channels]
    }

    /// Gather the pixels of column `x` for the rows in `ys` into one
    /// contiguous buffer.
    pub fn column(&self, x: u32, ys: Range<u32>) -> Vec<u8> {
        if x >= self.width {
            return Vec::new();
        }
        let end = ys.end.min(self.height);
        let start = ys.start.min(end);
        let stride = self.width as usize * self.channels;
        let offset = x as usize * self.channels;

        let mut out = Vec::with_capacity((end - start) as usize * self.channels);
        for y in start..end {
            let idx = y as usize * stride + offset;
            out.extend_from_slice(&self.data[idx..idx + self.channels]);
        }
        out
    }

    /// Extract a line running along `axis` at the fixed orthogonal
    /// coordinate `at`, covering `range` on the scan axis.
    ///
    /// Horizontal lines are rows (borrowed), vertical lines are columns
    /// (gathered).
    pub fn line(&self, axis: Axis, at: u32, range: Range<u32>) -> Cow<'a, [u8]> {
        match axis {
            Axis::Horizontal => Cow::Borrowed(self.row(at, range)),
            Axis::Vertical => Cow::Owned(self.column(at, range)),
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: classification is exactly the three-channel threshold test.
        #[test]
        fn prop_is_white_matches_threshold(
            r in any::<u8>(),
            g in any::<u8>(),
            b in any::<u8>(),
            a in any::<u8>(),
        ) {
            let expected = r > WHITE_THRESHOLD && g > WHITE_THRESHOLD && b > WHITE_THRESHOLD;
            prop_assert_eq!(is_white(&[r, g, b], 3, 0), expected);
            prop_assert_eq!(is_white(&[r, g, b, a], 4, 0), expected);
        }

        /// Property: bytes after the classified pixel never change the answer.
        #[test]
        fn prop_is_white_ignores_trailing_bytes(
            pixel in prop::array::uniform3(any::<u8>()),
            tail in prop::collection::vec(any::<u8>(), 0..32),
        ) {
            let mut line = pixel.to_vec();
            let alone = is_white(&line, 3, 0);
            line.extend_from_slice(&tail);
            prop_assert_eq!(is_white(&line, 3, 0), alone);
        }

        /// Property: a gathered column matches per-row slices.
        #[test]
        fn prop_column_matches_rows(
            (width, height) in (1u32..=12, 1u32..=12),
            seed in any::<u8>(),
        ) {
            let pixels: Vec<u8> = (0..(width * height * 3) as usize)
                .map(|i| (i as u8).wrapping_add(seed))
                .collect();
            let view = PixelView::new(width, height, 3, &pixels).unwrap();
            let x = width / 2;
            let column = view.column(x, 0..height);
            for y in 0..height {
                let start = y as usize * 3;
                prop_assert_eq!(&column[start..start + 3], view.row(y, x..x + 1));
            }
        }
    }
}
