//! Ordered box storage for the current image.
//!
//! Shapes live in a contiguous vector: insertion order is z-order (later
//! shapes draw on top and hit-test first), and a shape's identity is its
//! position. Indices come from hit-testing or the selection; an index that
//! is out of range is a caller bug and panics.

use crate::model::{BoxShape, Corner, ImageBounds, PixelPoint};

/// Storage for box annotations on a single image.
#[derive(Debug, Clone)]
pub struct ShapeStore {
    /// All shapes in insertion (z) order.
    shapes: Vec<BoxShape>,
    /// Image the shapes are clamped into.
    bounds: ImageBounds,
    /// Currently selected shape index.
    selected: Option<usize>,
    /// Set when shapes change; cleared once the store is persisted.
    dirty: bool,
}

impl ShapeStore {
    pub fn new(bounds: ImageBounds) -> Self {
        Self {
            shapes: Vec::new(),
            bounds,
            selected: None,
            dirty: false,
        }
    }

    /// Build a store from already-normalized shapes (e.g. decoded labels).
    /// The result starts clean.
    pub fn from_shapes(bounds: ImageBounds, shapes: Vec<BoxShape>) -> Self {
        debug_assert!(shapes.iter().all(BoxShape::is_normalized));
        Self {
            shapes,
            bounds,
            selected: None,
            dirty: false,
        }
    }

    pub fn bounds(&self) -> ImageBounds {
        self.bounds
    }

    /// Check if shapes have changed since the last `mark_persisted()`.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag after a successful save.
    #[inline]
    pub fn mark_persisted(&mut self) {
        self.dirty = false;
    }

    /// Append a shape on top of the z-order and select it.
    pub fn add(&mut self, shape: BoxShape) -> usize {
        debug_assert!(shape.is_normalized(), "store only holds normalized boxes");
        self.shapes.push(shape);
        let index = self.shapes.len() - 1;
        self.selected = Some(index);
        self.dirty = true;
        index
    }

    /// # Panics
    /// Panics if `index` is out of range.
    pub fn get(&self, index: usize) -> &BoxShape {
        &self.shapes[index]
    }

    /// # Panics
    /// Panics if `index` is out of range.
    pub fn set(&mut self, index: usize, shape: BoxShape) {
        debug_assert!(shape.is_normalized(), "store only holds normalized boxes");
        self.shapes[index] = shape;
        self.dirty = true;
    }

    /// Delete a shape. The selection is always cleared so it never points at
    /// a shifted neighbour.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> BoxShape {
        let removed = self.shapes.remove(index);
        self.selected = None;
        self.dirty = true;
        removed
    }

    /// Change the class of a shape in place.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn set_class(&mut self, index: usize, class_name: &str) {
        let shape = &mut self.shapes[index];
        if shape.class_name != class_name {
            shape.class_name = class_name.to_string();
            self.dirty = true;
        }
    }

    /// Translate both corners, then clamp each corner into the image on its
    /// own. A box pushed against an edge compresses instead of stopping.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn move_by(&mut self, index: usize, dx: i32, dy: i32) {
        let shape = &self.shapes[index];
        let moved = BoxShape {
            class_name: shape.class_name.clone(),
            x1: shape.x1 + dx,
            y1: shape.y1 + dy,
            x2: shape.x2 + dx,
            y2: shape.y2 + dy,
        };
        self.shapes[index] = settle(moved, self.bounds);
        self.dirty = true;
    }

    /// Move `corner` to `point` with the opposite corner fixed, then
    /// re-normalize and clamp. Dragging past the opposite corner flips the
    /// box.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn resize_corner(&mut self, index: usize, corner: Corner, point: PixelPoint) {
        let anchor = self.shapes[index].corner(corner.opposite());
        self.resize_from_anchor(index, anchor, point);
    }

    /// Span the shape between a fixed `anchor` and `point`, then clamp.
    ///
    /// Repeated calls with the same anchor never move it, even after a step
    /// that collapsed an axis to its 1px minimum.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn resize_from_anchor(&mut self, index: usize, anchor: PixelPoint, point: PixelPoint) {
        let class_name = self.shapes[index].class_name.clone();
        let resized = BoxShape::from_corners(class_name, anchor, point);
        self.shapes[index] = settle(resized, self.bounds);
        self.dirty = true;
    }

    pub fn select(&mut self, index: Option<usize>) {
        if let Some(i) = index {
            assert!(i < self.shapes.len(), "selection index {} out of range", i);
        }
        self.selected = index;
    }

    /// Get the selected shape index.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_shape(&self) -> Option<&BoxShape> {
        self.selected.map(|i| &self.shapes[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoxShape> {
        self.shapes.iter()
    }

    pub fn as_slice(&self) -> &[BoxShape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Clamp a normalized box into the image and keep at least one pixel of
/// extent per axis.
fn settle(shape: BoxShape, bounds: ImageBounds) -> BoxShape {
    let mut shape = shape.clamped(bounds);
    (shape.x1, shape.x2) = keep_extent(shape.x1, shape.x2, bounds.max_x());
    (shape.y1, shape.y2) = keep_extent(shape.y1, shape.y2, bounds.max_y());
    shape
}

fn keep_extent(lo: i32, hi: i32, max: i32) -> (i32, i32) {
    if hi > lo {
        (lo, hi)
    } else if lo < max {
        (lo, lo + 1)
    } else {
        ((hi - 1).max(0), hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_100() -> ShapeStore {
        ShapeStore::new(ImageBounds::new(100, 100))
    }

    #[test]
    fn test_add_selects_and_orders() {
        let mut store = store_100();
        let a = store.add(BoxShape::new("A", 0, 0, 10, 10));
        let b = store.add(BoxShape::new("B", 5, 5, 15, 15));
        assert_eq!((a, b), (0, 1));
        assert_eq!(store.selected(), Some(1));
        assert_eq!(store.get(0).class_name, "A");
        assert!(store.is_dirty());
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut store = store_100();
        store.add(BoxShape::new("A", 0, 0, 10, 10));
        store.add(BoxShape::new("B", 20, 20, 30, 30));
        store.select(Some(0));
        let removed = store.remove(0);
        assert_eq!(removed.class_name, "A");
        assert_eq!(store.selected(), None);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).class_name, "B");
    }

    #[test]
    #[should_panic]
    fn test_get_out_of_range_panics() {
        let store = store_100();
        store.get(0);
    }

    #[test]
    fn test_move_by_translates_inside_image() {
        let mut store = store_100();
        store.add(BoxShape::new("A", 10, 10, 20, 20));
        store.move_by(0, 5, -3);
        assert_eq!(store.get(0), &BoxShape::new("A", 15, 7, 25, 17));
    }

    #[test]
    fn test_move_by_compresses_against_edge() {
        let mut store = store_100();
        store.add(BoxShape::new("A", 0, 0, 10, 10));
        store.move_by(0, -5, 0);
        // x1 pinned at 0, x2 moved to 5
        assert_eq!(store.get(0), &BoxShape::new("A", 0, 0, 5, 10));

        store.move_by(0, -20, 0);
        let shape = store.get(0);
        assert_eq!(shape.x1, 0);
        assert!(shape.is_normalized());
        assert!(shape.width() < 10, "box compresses rather than translating rigidly");
    }

    #[test]
    fn test_move_by_compresses_at_far_edge() {
        let mut store = store_100();
        store.add(BoxShape::new("A", 80, 80, 95, 95));
        store.move_by(0, 30, 30);
        let shape = store.get(0);
        assert_eq!((shape.x2, shape.y2), (99, 99));
        assert!(shape.is_normalized());
    }

    #[test]
    fn test_resize_corner_holds_opposite() {
        let mut store = store_100();
        store.add(BoxShape::new("A", 10, 10, 50, 50));
        store.resize_corner(0, Corner::BottomRight, PixelPoint::new(70, 60));
        assert_eq!(store.get(0), &BoxShape::new("A", 10, 10, 70, 60));
    }

    #[test]
    fn test_resize_past_opposite_corner_flips() {
        let mut store = store_100();
        store.add(BoxShape::new("A", 10, 10, 50, 50));
        store.resize_corner(0, Corner::TopLeft, PixelPoint::new(60, 70));
        assert_eq!(store.get(0), &BoxShape::new("A", 50, 50, 60, 70));
    }

    #[test]
    fn test_resize_from_anchor_does_not_drift_after_collapse() {
        let mut store = store_100();
        store.add(BoxShape::new("A", 10, 10, 40, 40));
        let anchor = PixelPoint::new(40, 40);

        // Landing on the anchor column collapses x to the 1px minimum
        store.resize_from_anchor(0, anchor, PixelPoint::new(40, 20));
        assert!(store.get(0).is_normalized());

        store.resize_from_anchor(0, anchor, PixelPoint::new(20, 20));
        assert_eq!(store.get(0), &BoxShape::new("A", 20, 20, 40, 40));
    }

    #[test]
    fn test_resize_onto_opposite_keeps_extent() {
        let mut store = store_100();
        store.add(BoxShape::new("A", 10, 10, 50, 50));
        store.resize_corner(0, Corner::TopRight, PixelPoint::new(10, 50));
        assert!(store.get(0).is_normalized());
    }

    #[test]
    fn test_set_class_marks_dirty_only_on_change() {
        let mut store = ShapeStore::from_shapes(
            ImageBounds::new(100, 100),
            vec![BoxShape::new("A", 0, 0, 10, 10)],
        );
        assert!(!store.is_dirty());
        store.set_class(0, "A");
        assert!(!store.is_dirty());
        store.set_class(0, "B");
        assert!(store.is_dirty());
        assert_eq!(store.get(0).class_name, "B");
    }
}
