//! White border detection.
//!
//! The scanner walks one line through the middle of the image along the
//! scan axis looking for near-white pixels. A white pixel only counts as a
//! border when a window of the perpendicular line through it is white too,
//! which rejects small white features such as an eye highlight.
//!
//! # Coordinate System
//!
//! - `p` is the scan axis (x for [`Axis::Horizontal`], y for [`Axis::Vertical`])
//! - `o` is the orthogonal axis
//! - All ranges are half-open, matching host mask bounds

use serde::{Deserialize, Serialize};

use crate::pixel::{is_white_with, PixelView, WHITE_THRESHOLD};

/// Which image dimension is scanned for borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Scan along x, finding the left and right borders.
    Horizontal,
    /// Scan along y, finding the top and bottom borders.
    Vertical,
}

impl Axis {
    /// The perpendicular axis.
    #[inline]
    pub fn orthogonal(self) -> Self {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// Axis-aligned rectangle in image coordinates, `x2`/`y2` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Rect {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Rectangle covering a whole `width` x `height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// The part of this rectangle inside a `width` x `height` image.
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        let (x2, y2) = (self.x2.min(width), self.y2.min(height));
        Self::new(self.x1.min(x2), self.y1.min(y2), x2, y2)
    }
}

/// A rectangle expressed in scan-axis (`p`) and orthogonal (`o`) terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub p1: u32,
    pub o1: u32,
    pub p2: u32,
    pub o2: u32,
}

impl Bounds {
    /// Project `rect` onto `axis`.
    pub fn along(rect: Rect, axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => Self {
                p1: rect.x1,
                o1: rect.y1,
                p2: rect.x2,
                o2: rect.y2,
            },
            Axis::Vertical => Self {
                p1: rect.y1,
                o1: rect.x1,
                p2: rect.y2,
                o2: rect.x2,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.p2 <= self.p1 || self.o2 <= self.o1
    }
}

/// Inner edges of the border on each side of the scan axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderResult {
    pub c1: u32,
    pub c2: u32,
}

impl BorderResult {
    /// The "no border found" result: the bounds themselves.
    pub fn identity(bounds: Bounds) -> Self {
        Self {
            c1: bounds.p1,
            c2: bounds.p2,
        }
    }
}

/// Tuning knobs for the border scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// RGB samples must all exceed this to be white.
    pub white_threshold: u8,
    /// Half-width of the orthogonal cross-check window around the midpoint.
    pub cross_check_radius: u32,
    /// How far inside a detected border the crop edge is placed.
    pub border_inset: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            white_threshold: WHITE_THRESHOLD,
            cross_check_radius: 20,
            border_inset: 4,
        }
    }
}

/// Find the border edges along `axis` within `rect` using default settings.
pub fn scan(view: &PixelView<'_>, rect: Rect, axis: Axis) -> BorderResult {
    scan_with(view, rect, axis, &ScanConfig::default())
}

/// Find the border edges along `axis` within `rect`.
///
/// # Algorithm
///
/// 1. Read the primary line at the orthogonal midpoint `o1 + (o2 - o1) / 2`
/// 2. Walk `i` from `p1` to `p2`; each white pixel whose orthogonal line is
///    white across `[mid - radius, mid + radius)` is a border
/// 3. The first border sets `c1 = min(i + inset, p2)` and resumes after it
/// 4. The second border sets `c2 = max(i - inset, p1)` and stops
///
/// Once `i` passes `p2 / 2` without a first border, the next border found
/// is taken as the second one and `c1` keeps its default.
///
/// `rect` is clipped to the view first.
///
/// # Returns
///
/// `(p1, p2)` on a side where no border was confirmed.
pub fn scan_with(view: &PixelView<'_>, rect: Rect, axis: Axis, config: &ScanConfig) -> BorderResult {
    let bounds = Bounds::along(rect.clamped(view.width(), view.height()), axis);
    let mut result = BorderResult::identity(bounds);
    if bounds.is_empty() {
        return result;
    }

    let channels = view.channels();
    let threshold = config.white_threshold;
    let orth_mid = bounds.o1 + (bounds.o2 - bounds.o1) / 2;
    let window_start = orth_mid.saturating_sub(config.cross_check_radius).max(bounds.o1);
    let window_end = orth_mid.saturating_add(config.cross_check_radius).min(bounds.o2);

    let primary = view.line(axis, orth_mid, bounds.p1..bounds.p2);

    let is_border = |i: u32| {
        let orth = view.line(axis.orthogonal(), i, bounds.o1..bounds.o2);
        (window_start..window_end)
            .all(|j| is_white_with(&orth, channels, (j - bounds.o1) as usize, threshold))
    };

    let mut found_first_border = false;
    let mut i = bounds.p1;
    while i < bounds.p2 {
        if !found_first_border && i > bounds.p2 / 2 {
            found_first_border = true;
        }

        if is_white_with(&primary, channels, (i - bounds.p1) as usize, threshold) && is_border(i) {
            if !found_first_border {
                found_first_border = true;
                result.c1 = i.saturating_add(config.border_inset).min(bounds.p2);
                i = result.c1;
            } else {
                result.c2 = i.saturating_sub(config.border_inset).max(bounds.p1);
                break;
            }
        }
        i += 1;
    }

    log::debug!(
        "{:?} scan over {}..{}: border edges ({}, {})",
        axis,
        bounds.p1,
        bounds.p2,
        result.c1,
        result.c2
    );
    result
}



// ============================================================================
// Property-Based Tests
// ============================================================================
