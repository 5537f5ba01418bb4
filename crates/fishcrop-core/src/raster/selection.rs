//! Selection masks for the raster host.
//!
//! A selection is a grayscale mask the size of the canvas; any non-zero
//! value is selected.

use std::collections::VecDeque;

use image::{imageops::crop_imm, GrayImage, Luma};

use super::Canvas;
use crate::host::ChannelOp;
use crate::scan::Rect;

const SELECTED: Luma<u8> = Luma([255]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    mask: GrayImage,
}

impl Selection {
    /// An empty selection.
    pub fn none(width: u32, height: u32) -> Self {
        Self {
            mask: GrayImage::new(width, height),
        }
    }

    /// Everything selected.
    pub fn all(width: u32, height: u32) -> Self {
        Self {
            mask: GrayImage::from_pixel(width, height, SELECTED),
        }
    }

    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    pub fn height(&self) -> u32 {
        self.mask.height()
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.mask.width() && y < self.mask.height() && self.mask.get_pixel(x, y).0[0] > 0
    }

    pub fn select(&mut self, x: u32, y: u32) {
        if x < self.mask.width() && y < self.mask.height() {
            self.mask.put_pixel(x, y, SELECTED);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mask.pixels().all(|p| p.0[0] == 0)
    }

    /// Number of selected pixels.
    pub fn count(&self) -> usize {
        self.mask.pixels().filter(|p| p.0[0] > 0).count()
    }

    /// Bounding box of the selected pixels, `None` when nothing is selected.
    pub fn bounds(&self) -> Option<Rect> {
        let mut found: Option<Rect> = None;
        for (x, y, p) in self.mask.enumerate_pixels() {
            if p.0[0] == 0 {
                continue;
            }
            found = Some(match found {
                None => Rect::new(x, y, x + 1, y + 1),
                Some(r) => Rect::new(r.x1.min(x), r.y1.min(y), r.x2.max(x + 1), r.y2.max(y + 1)),
            });
        }
        found
    }

    /// Connected region around the seed whose colour is within `threshold`
    /// (0.0 to 1.0) of the seed colour.
    ///
    /// Neighbours are 4-connected. Colour distance is the largest absolute
    /// difference over all channels, scaled to 0-255.
    pub fn contiguous(canvas: &Canvas, seed_x: u32, seed_y: u32, threshold: f64) -> Self {
        let (width, height) = (canvas.width(), canvas.height());
        let mut selection = Self::none(width, height);
        if seed_x >= width || seed_y >= height {
            return selection;
        }

        let limit = threshold.clamp(0.0, 1.0) * 255.0;
        let seed = canvas.pixel(seed_x, seed_y).to_vec();
        let similar = |x: u32, y: u32| {
            let distance = canvas
                .pixel(x, y)
                .iter()
                .zip(&seed)
                .map(|(&a, &b)| a.abs_diff(b))
                .max()
                .unwrap_or(0);
            f64::from(distance) <= limit
        };

        let mut queue = VecDeque::new();
        selection.select(seed_x, seed_y);
        queue.push_back((seed_x, seed_y));

        while let Some((x, y)) = queue.pop_front() {
            let neighbours = [
                (x.checked_sub(1), Some(y)),
                (x.checked_add(1).filter(|&nx| nx < width), Some(y)),
                (Some(x), y.checked_sub(1)),
                (Some(x), y.checked_add(1).filter(|&ny| ny < height)),
            ];
            for (nx, ny) in neighbours {
                let (Some(nx), Some(ny)) = (nx, ny) else {
                    continue;
                };
                if !selection.contains(nx, ny) && similar(nx, ny) {
                    selection.select(nx, ny);
                    queue.push_back((nx, ny));
                }
            }
        }
        selection
    }

    /// Pixels with non-zero alpha; everything when the canvas has no alpha.
    pub fn from_alpha(canvas: &Canvas) -> Self {
        let (width, height) = (canvas.width(), canvas.height());
        if !canvas.has_alpha() {
            return Self::all(width, height);
        }
        let mask = GrayImage::from_fn(width, height, |x, y| {
            if canvas.pixel(x, y)[3] > 0 {
                SELECTED
            } else {
                Luma([0])
            }
        });
        Self { mask }
    }

    /// Combine `other` into this selection.
    pub fn combine(&self, op: ChannelOp, other: Selection) -> Selection {
        if op == ChannelOp::Replace {
            return other;
        }
        let mask = GrayImage::from_fn(self.width(), self.height(), |x, y| {
            let (a, b) = (self.contains(x, y), other.contains(x, y));
            let selected = match op {
                ChannelOp::Add => a || b,
                ChannelOp::Subtract => a && !b,
                ChannelOp::Intersect => a && b,
                ChannelOp::Replace => b,
            };
            if selected {
                SELECTED
            } else {
                Luma([0])
            }
        });
        Selection { mask }
    }

    /// Cut the mask down to a region; the caller guarantees it is in range.
    pub(crate) fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Selection {
        Selection {
            mask: crop_imm(&self.mask, x, y, width, height).to_image(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection() {
        let sel = Selection::none(5, 5);
        assert!(sel.is_empty());
        assert_eq!(sel.bounds(), None);
        assert_eq!(sel.count(), 0);
    }

    #[test]
    fn test_bounds() {
        let mut sel = Selection::none(10, 10);
        sel.select(2, 7);
        sel.select(5, 3);
        assert_eq!(sel.bounds(), Some(Rect::new(2, 3, 6, 8)));
        assert_eq!(sel.count(), 2);
    }

    #[test]
    fn test_select_out_of_range_is_ignored() {
        let mut sel = Selection::none(3, 3);
        sel.select(3, 0);
        assert!(sel.is_empty());
        assert!(!sel.contains(9, 9));
    }

    #[test]
    fn test_contiguous_stops_at_different_colour() {
        let mut canvas = Canvas::filled(10, 10, [128, 128, 128]);
        canvas.fill_rect(3, 3, 7, 7, [20, 60, 180]);

        let sel = Selection::contiguous(&canvas, 0, 0, 0.2);
        assert_eq!(sel.count(), 100 - 16);
        assert!(!sel.contains(5, 5));
        assert!(sel.contains(9, 9));
    }

    #[test]
    fn test_contiguous_threshold() {
        let mut canvas = Canvas::filled(4, 1, [100, 100, 100]);
        // 51 = 0.2 * 255 is still within reach, 52 is not
        canvas.fill_rect(1, 0, 2, 1, [151, 100, 100]);
        canvas.fill_rect(2, 0, 3, 1, [100, 100, 100]);
        canvas.fill_rect(3, 0, 4, 1, [100, 48, 100]);

        let sel = Selection::contiguous(&canvas, 0, 0, 0.2);
        assert!(sel.contains(1, 0));
        assert!(sel.contains(2, 0));
        assert!(!sel.contains(3, 0));
    }

    #[test]
    fn test_contiguous_is_not_diagonal() {
        let mut canvas = Canvas::filled(3, 3, [0, 0, 0]);
        canvas.fill_rect(0, 0, 1, 1, [200, 200, 200]);
        canvas.fill_rect(1, 1, 2, 2, [200, 200, 200]);

        let sel = Selection::contiguous(&canvas, 0, 0, 0.0);
        assert_eq!(sel.count(), 1);
    }

    #[test]
    fn test_contiguous_disconnected_region() {
        let mut canvas = Canvas::filled(9, 3, [10, 10, 10]);
        canvas.fill_rect(4, 0, 5, 3, [250, 250, 250]);

        let sel = Selection::contiguous(&canvas, 0, 1, 0.2);
        assert_eq!(sel.bounds(), Some(Rect::new(0, 0, 4, 3)));
    }

    #[test]
    fn test_from_alpha() {
        let mut canvas = Canvas::filled(4, 4, [1, 1, 1]).with_alpha();
        let mut background = Selection::all(4, 4);
        background = background.combine(ChannelOp::Subtract, {
            let mut fish = Selection::none(4, 4);
            fish.select(1, 2);
            fish.select(2, 2);
            fish
        });
        canvas.clear(&background);

        let sel = Selection::from_alpha(&canvas);
        assert_eq!(sel.bounds(), Some(Rect::new(1, 2, 3, 3)));
    }

    #[test]
    fn test_from_alpha_without_alpha_selects_all() {
        let canvas = Canvas::filled(3, 2, [1, 1, 1]);
        assert_eq!(Selection::from_alpha(&canvas).count(), 6);
    }

    #[test]
    fn test_combine_ops() {
        let mut a = Selection::none(3, 1);
        a.select(0, 0);
        a.select(1, 0);
        let mut b = Selection::none(3, 1);
        b.select(1, 0);
        b.select(2, 0);

        assert_eq!(a.combine(ChannelOp::Add, b.clone()).count(), 3);
        assert_eq!(a.combine(ChannelOp::Intersect, b.clone()).count(), 1);
        let sub = a.combine(ChannelOp::Subtract, b.clone());
        assert!(sub.contains(0, 0) && !sub.contains(1, 0));
        assert_eq!(a.combine(ChannelOp::Replace, b.clone()), b);
    }

    #[test]
    fn test_crop() {
        let mut sel = Selection::none(10, 10);
        sel.select(6, 6);
        let cropped = sel.crop(4, 4, 4, 4);
        assert_eq!((cropped.width(), cropped.height()), (4, 4));
        assert!(cropped.contains(2, 2));
    }
}
