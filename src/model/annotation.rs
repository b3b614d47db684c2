//! Box annotation geometry in image-pixel space.

/// A point in integer image-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Dimensions of the loaded image, used for clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBounds {
    pub width: u32,
    pub height: u32,
}

impl ImageBounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Largest valid column index.
    pub fn max_x(&self) -> i32 {
        (self.width as i32 - 1).max(0)
    }

    /// Largest valid row index.
    pub fn max_y(&self) -> i32 {
        (self.height as i32 - 1).max(0)
    }

    pub fn clamp_x(&self, x: i32) -> i32 {
        x.clamp(0, self.max_x())
    }

    pub fn clamp_y(&self, y: i32) -> i32 {
        y.clamp(0, self.max_y())
    }

    /// Clamp a point into `[0, W-1] x [0, H-1]`.
    pub fn clamp(&self, point: PixelPoint) -> PixelPoint {
        PixelPoint::new(self.clamp_x(point.x), self.clamp_y(point.y))
    }

    /// Clamp a pixel-edge position into `[0, W] x [0, H]`.
    ///
    /// Edges lie between pixels, so the far edge of the last column is `W`.
    pub fn clamp_edge(&self, point: PixelPoint) -> PixelPoint {
        PixelPoint::new(
            point.x.clamp(0, self.width as i32),
            point.y.clamp(0, self.height as i32),
        )
    }

    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= 0 && point.y >= 0 && point.x <= self.max_x() && point.y <= self.max_y()
    }
}

/// One of the four resize handles of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Handles in hit-test order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// The diagonally opposite handle, held fixed while this one is dragged.
    pub fn opposite(&self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// Handle on the given sides of a box.
    pub fn from_sides(right: bool, bottom: bool) -> Corner {
        match (right, bottom) {
            (false, false) => Corner::TopLeft,
            (true, false) => Corner::TopRight,
            (false, true) => Corner::BottomLeft,
            (true, true) => Corner::BottomRight,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Corner::TopLeft => "top-left",
            Corner::TopRight => "top-right",
            Corner::BottomLeft => "bottom-left",
            Corner::BottomRight => "bottom-right",
        }
    }
}

/// A classed, axis-aligned box in image pixels.
///
/// Boxes held by a [`ShapeStore`](crate::store::ShapeStore) always satisfy
/// `x1 < x2` and `y1 < y2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxShape {
    pub class_name: String,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoxShape {
    pub fn new(class_name: impl Into<String>, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            class_name: class_name.into(),
            x1,
            y1,
            x2,
            y2,
        }
    }

    /// Build a normalized box from two arbitrary corner points.
    pub fn from_corners(class_name: impl Into<String>, a: PixelPoint, b: PixelPoint) -> Self {
        Self::new(class_name, a.x, a.y, b.x, b.y).normalized()
    }

    /// Swap coordinates so that `x1 <= x2` and `y1 <= y2`.
    pub fn normalized(mut self) -> Self {
        if self.x1 > self.x2 {
            std::mem::swap(&mut self.x1, &mut self.x2);
        }
        if self.y1 > self.y2 {
            std::mem::swap(&mut self.y1, &mut self.y2);
        }
        self
    }

    /// Whether the box has positive extent on both axes.
    pub fn is_normalized(&self) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn corner(&self, corner: Corner) -> PixelPoint {
        match corner {
            Corner::TopLeft => PixelPoint::new(self.x1, self.y1),
            Corner::TopRight => PixelPoint::new(self.x2, self.y1),
            Corner::BottomLeft => PixelPoint::new(self.x1, self.y2),
            Corner::BottomRight => PixelPoint::new(self.x2, self.y2),
        }
    }

    /// Closed-rectangle containment.
    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= self.x1 && point.x <= self.x2 && point.y >= self.y1 && point.y <= self.y2
    }

    /// Clamp every coordinate into the image independently.
    pub fn clamped(&self, bounds: ImageBounds) -> Self {
        Self {
            class_name: self.class_name.clone(),
            x1: bounds.clamp_x(self.x1),
            y1: bounds.clamp_y(self.y1),
            x2: bounds.clamp_x(self.x2),
            y2: bounds.clamp_y(self.y2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_normalizes() {
        let a = BoxShape::from_corners("car", PixelPoint::new(50, 80), PixelPoint::new(10, 20));
        assert_eq!((a.x1, a.y1, a.x2, a.y2), (10, 20, 50, 80));
        assert!(a.is_normalized());
    }

    #[test]
    fn test_contains_is_closed() {
        let b = BoxShape::new("a", 10, 10, 20, 20);
        assert!(b.contains(PixelPoint::new(10, 10)));
        assert!(b.contains(PixelPoint::new(20, 20)));
        assert!(!b.contains(PixelPoint::new(21, 15)));
    }

    #[test]
    fn test_opposite_corners() {
        for corner in Corner::ALL {
            assert_eq!(corner.opposite().opposite(), corner);
        }
        assert_eq!(Corner::TopRight.opposite(), Corner::BottomLeft);
    }

    #[test]
    fn test_bounds_clamp() {
        let bounds = ImageBounds::new(100, 50);
        assert_eq!(bounds.clamp(PixelPoint::new(-5, 70)), PixelPoint::new(0, 49));
        assert!(bounds.contains(PixelPoint::new(99, 49)));
        assert!(!bounds.contains(PixelPoint::new(100, 0)));
    }

    #[test]
    fn test_bounds_clamp_edge_reaches_far_side() {
        let bounds = ImageBounds::new(100, 50);
        assert_eq!(bounds.clamp_edge(PixelPoint::new(140, 70)), PixelPoint::new(100, 50));
        assert_eq!(bounds.clamp_edge(PixelPoint::new(-3, 10)), PixelPoint::new(0, 10));
    }
}
