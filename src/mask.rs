//! Dense per-pixel class grid for mask labelling.
//!
//! The grid has the same dimensions as the image and is never resized.
//! `0` means unlabeled; `n` means the class at registry index `n - 1`.

use image::GrayImage;
use ndarray::Array2;

use crate::constants::mask::UNLABELED;
use crate::model::{ImageBounds, PixelPoint};

/// Class-index grid, indexed `[row, column]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskGrid {
    cells: Array2<u32>,
    dirty: bool,
}

impl MaskGrid {
    /// All-unlabeled grid for an image of the given size.
    pub fn new(bounds: ImageBounds) -> Self {
        Self {
            cells: Array2::zeros((bounds.height as usize, bounds.width as usize)),
            dirty: false,
        }
    }

    /// Wrap an existing `(height, width)` array. Starts clean.
    pub fn from_array(cells: Array2<u32>) -> Self {
        Self {
            cells,
            dirty: false,
        }
    }

    pub fn bounds(&self) -> ImageBounds {
        let (height, width) = self.cells.dim();
        ImageBounds::new(width as u32, height as u32)
    }

    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cells(&self) -> &Array2<u32> {
        &self.cells
    }

    /// Value at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 {
            return None;
        }
        self.cells.get((y as usize, x as usize)).copied()
    }

    /// Number of labelled cells.
    pub fn labeled_cells(&self) -> usize {
        self.cells.iter().filter(|&&v| v != UNLABELED).count()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&v| v == UNLABELED)
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn mark_persisted(&mut self) {
        self.dirty = false;
    }

    /// Paint a segment of a freehand stroke.
    ///
    /// Every cell whose centre lies within `thickness / 2` of the segment
    /// `a -> b` is set to `value` (use `0` to erase). Returns the number of
    /// cells that changed.
    pub fn stroke_segment(&mut self, a: PixelPoint, b: PixelPoint, thickness: u32, value: u32) -> usize {
        let radius = (thickness.max(1) as f32) / 2.0;
        let reach = radius.ceil() as i32;

        let max_x = self.width() as i32 - 1;
        let max_y = self.height() as i32 - 1;
        if max_x < 0 || max_y < 0 {
            return 0;
        }

        let x_start = (a.x.min(b.x) - reach).max(0);
        let x_end = (a.x.max(b.x) + reach).min(max_x);
        let y_start = (a.y.min(b.y) - reach).max(0);
        let y_end = (a.y.max(b.y) + reach).min(max_y);

        let mut changed = 0;
        for y in y_start..=y_end {
            for x in x_start..=x_end {
                if distance_to_segment(x, y, a, b) > radius {
                    continue;
                }
                let cell = &mut self.cells[(y as usize, x as usize)];
                if *cell != value {
                    *cell = value;
                    changed += 1;
                }
            }
        }

        if changed > 0 {
            self.dirty = true;
        }
        changed
    }

    /// Content-aware rectangle fill.
    ///
    /// Within the half-open rectangle spanned by `a` and `b`, every cell whose
    /// grayscale value is at or below `threshold` is set to `value`. Brighter
    /// cells are left untouched. Returns the number of cells that changed.
    pub fn fill_dark_in_rect(
        &mut self,
        gray: &GrayImage,
        a: PixelPoint,
        b: PixelPoint,
        threshold: u8,
        value: u32,
    ) -> usize {
        let width = self.width().min(gray.width() as usize);
        let height = self.height().min(gray.height() as usize);

        let x1 = (a.x.min(b.x).max(0) as usize).min(width);
        let x2 = (a.x.max(b.x).max(0) as usize).min(width);
        let y1 = (a.y.min(b.y).max(0) as usize).min(height);
        let y2 = (a.y.max(b.y).max(0) as usize).min(height);

        let mut changed = 0;
        for y in y1..y2 {
            for x in x1..x2 {
                if gray.get_pixel(x as u32, y as u32)[0] > threshold {
                    continue;
                }
                let cell = &mut self.cells[(y, x)];
                if *cell != value {
                    *cell = value;
                    changed += 1;
                }
            }
        }

        if changed > 0 {
            self.dirty = true;
        }
        changed
    }
}

/// Euclidean distance from cell `(x, y)` to the segment `a -> b`.
fn distance_to_segment(x: i32, y: i32, a: PixelPoint, b: PixelPoint) -> f32 {
    let (px, py) = (x as f32, y as f32);
    let (ax, ay) = (a.x as f32, a.y as f32);
    let (bx, by) = (b.x as f32, b.y as f32);
    let (dx, dy) = (bx - ax, by - ay);
    let len_sq = dx * dx + dy * dy;

    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    };

    let (cx, cy) = (ax + t * dx, ay + t * dy);
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn p(x: i32, y: i32) -> PixelPoint {
        PixelPoint::new(x, y)
    }

    #[test]
    fn test_new_grid_is_blank() {
        let grid = MaskGrid::new(ImageBounds::new(8, 4));
        assert_eq!((grid.width(), grid.height()), (8, 4));
        assert!(grid.is_blank());
        assert!(!grid.is_dirty());
    }

    #[test]
    fn test_horizontal_stroke_has_thickness() {
        let mut grid = MaskGrid::new(ImageBounds::new(20, 20));
        let changed = grid.stroke_segment(p(2, 10), p(12, 10), 2, 3);
        assert!(changed > 0);
        assert!(grid.is_dirty());
        // on the line and one row either side
        assert_eq!(grid.get(7, 10), Some(3));
        assert_eq!(grid.get(7, 9), Some(3));
        assert_eq!(grid.get(7, 11), Some(3));
        assert_eq!(grid.get(7, 13), Some(0));
        // nothing past the end cap
        assert_eq!(grid.get(15, 10), Some(0));
    }

    #[test]
    fn test_erase_stroke_clears() {
        let mut grid = MaskGrid::new(ImageBounds::new(10, 10));
        grid.stroke_segment(p(0, 5), p(9, 5), 2, 1);
        let before = grid.labeled_cells();
        grid.stroke_segment(p(0, 5), p(4, 5), 2, 0);
        assert!(grid.labeled_cells() < before);
        assert_eq!(grid.get(2, 5), Some(0));
        assert_eq!(grid.get(8, 5), Some(1));
    }

    #[test]
    fn test_stroke_clips_at_edges() {
        let mut grid = MaskGrid::new(ImageBounds::new(5, 5));
        grid.stroke_segment(p(-3, 0), p(10, 0), 4, 2);
        assert_eq!(grid.get(0, 0), Some(2));
        assert_eq!(grid.get(4, 0), Some(2));
    }

    #[test]
    fn test_rect_fill_only_labels_dark_pixels() {
        // Left half dark, right half bright
        let gray = GrayImage::from_fn(10, 10, |x, _| if x < 5 { Luma([20]) } else { Luma([220]) });
        let mut grid = MaskGrid::new(ImageBounds::new(10, 10));

        let changed = grid.fill_dark_in_rect(&gray, p(8, 8), p(2, 2), 128, 4);

        // x in 2..5 dark, y in 2..8
        assert_eq!(changed, 3 * 6);
        assert_eq!(grid.get(2, 2), Some(4));
        assert_eq!(grid.get(4, 7), Some(4));
        assert_eq!(grid.get(6, 4), Some(0));
        // half-open: row/column 8 untouched
        assert_eq!(grid.get(3, 8), Some(0));
    }

    #[test]
    fn test_rect_fill_threshold_is_inclusive() {
        let gray = GrayImage::from_pixel(4, 4, Luma([128]));
        let mut grid = MaskGrid::new(ImageBounds::new(4, 4));
        assert_eq!(grid.fill_dark_in_rect(&gray, p(0, 0), p(4, 4), 128, 1), 16);
    }
}
