//! Image <-> viewport coordinate mapping.
//!
//! `viewport = image * scale + offset`. The transform is a plain value:
//! every pan/zoom returns a new transform rather than mutating in place, so
//! the interaction controller can hand it back to the caller each step.

use crate::constants::zoom;
use crate::model::{ImageBounds, PixelPoint};

/// Lower and upper guard on the zoom scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLimits {
    pub min: f32,
    pub max: f32,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self {
            min: zoom::MIN_SCALE,
            max: zoom::MAX_SCALE,
        }
    }
}

/// Pan/zoom state for one displayed image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Viewport pixels per image pixel.
    pub scale: f32,
    /// Viewport position of image pixel (0, 0).
    pub offset_x: f32,
    pub offset_y: f32,
    /// Image dimensions; when set, `to_image` clamps into the image.
    pub bounds: Option<ImageBounds>,
    pub limits: ScaleLimits,
}

impl ViewTransform {
    /// Create an identity transform (scale=1, no offset, no image).
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            bounds: None,
            limits: ScaleLimits::default(),
        }
    }

    /// Fresh transform for a newly loaded image.
    pub fn for_image(bounds: ImageBounds) -> Self {
        Self {
            bounds: Some(bounds),
            ..Self::identity()
        }
    }

    pub fn with_limits(mut self, limits: ScaleLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Unrounded image-space position of a viewport point.
    pub fn to_image_f(&self, vx: f32, vy: f32) -> (f32, f32) {
        (
            (vx - self.offset_x) / self.scale,
            (vy - self.offset_y) / self.scale,
        )
    }

    /// Viewport point to image pixel, rounded and clamped into the image.
    pub fn to_image(&self, vx: f32, vy: f32) -> PixelPoint {
        let (ix, iy) = self.to_image_f(vx, vy);
        let point = PixelPoint::new(ix.round() as i32, iy.round() as i32);
        match self.bounds {
            Some(bounds) => bounds.clamp(point),
            None => point,
        }
    }

    /// Viewport point to pixel edge, rounded and clamped into
    /// `[0, W] x [0, H]`. Used for half-open regions that must be able to
    /// cover the last row and column.
    pub fn to_image_edge(&self, vx: f32, vy: f32) -> PixelPoint {
        let (ix, iy) = self.to_image_f(vx, vy);
        let point = PixelPoint::new(ix.round() as i32, iy.round() as i32);
        match self.bounds {
            Some(bounds) => bounds.clamp_edge(point),
            None => point,
        }
    }

    /// Image pixel to viewport pixel, truncated toward zero.
    pub fn to_viewport(&self, ix: i32, iy: i32) -> (i32, i32) {
        (
            (ix as f32 * self.scale + self.offset_x) as i32,
            (iy as f32 * self.scale + self.offset_y) as i32,
        )
    }

    /// Multiply the scale by `factor` keeping the image point under
    /// `(vx, vy)` fixed.
    ///
    /// Non-finite or non-positive factors, and zooms that would leave the
    /// scale limits, leave the transform unchanged (at the limit).
    pub fn zoom_at(&self, vx: f32, vy: f32, factor: f32) -> ViewTransform {
        if !factor.is_finite() || factor <= 0.0 {
            log::warn!("Ignoring invalid zoom factor {}", factor);
            return *self;
        }

        let new_scale = (self.scale * factor).clamp(self.limits.min, self.limits.max);
        if !new_scale.is_finite() || new_scale <= 0.0 || new_scale == self.scale {
            return *self;
        }

        // Image point under the cursor before the zoom
        let (img_x, img_y) = self.to_image_f(vx, vy);

        ViewTransform {
            scale: new_scale,
            offset_x: vx - img_x * new_scale,
            offset_y: vy - img_y * new_scale,
            ..*self
        }
    }

    /// Translate the view. No clamping: the image may leave the viewport.
    pub fn pan_by(&self, dx: f32, dy: f32) -> ViewTransform {
        ViewTransform {
            offset_x: self.offset_x + dx,
            offset_y: self.offset_y + dy,
            ..*self
        }
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_identity_transform() {
        let t = ViewTransform::identity();
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.to_image(12.4, 7.6), PixelPoint::new(12, 8));
        assert_eq!(t.to_viewport(3, 4), (3, 4));
    }

    #[test]
    fn test_to_image_clamps_into_image() {
        let t = ViewTransform::for_image(ImageBounds::new(100, 80));
        assert_eq!(t.to_image(-40.0, 500.0), PixelPoint::new(0, 79));
        assert_eq!(t.to_image(150.0, -1.0), PixelPoint::new(99, 0));
    }

    #[test]
    fn test_to_image_edge_allows_far_edge() {
        let t = ViewTransform::for_image(ImageBounds::new(100, 80));
        assert_eq!(t.to_image_edge(150.0, 500.0), PixelPoint::new(100, 80));
        assert_eq!(t.to_image_edge(-5.0, 40.0), PixelPoint::new(0, 40));
    }

    #[test]
    fn test_to_image_rounds_after_scaling() {
        let t = ViewTransform {
            scale: 2.0,
            offset_x: 10.0,
            offset_y: 20.0,
            ..ViewTransform::identity()
        };
        // (15 - 10) / 2 = 2.5 rounds away from zero
        assert_eq!(t.to_image(15.0, 20.0), PixelPoint::new(3, 0));
    }

    #[test]
    fn test_to_viewport_truncates() {
        let t = ViewTransform {
            scale: 1.5,
            offset_x: 0.4,
            offset_y: 0.0,
            ..ViewTransform::identity()
        };
        // 3 * 1.5 + 0.4 = 4.9
        assert_eq!(t.to_viewport(3, 1), (4, 1));
    }

    #[test]
    fn test_zoom_at_preserves_cursor_point() {
        let t = ViewTransform {
            scale: 1.0,
            offset_x: 50.0,
            offset_y: 30.0,
            ..ViewTransform::for_image(ImageBounds::new(1000, 1000))
        };
        let (bx, by) = t.to_image_f(150.0, 120.0);

        let zoomed = t.zoom_at(150.0, 120.0, 1.15);
        let (ax, ay) = zoomed.to_image_f(150.0, 120.0);

        assert!(approx_eq(zoomed.scale, 1.15));
        assert!(approx_eq(bx, ax));
        assert!(approx_eq(by, ay));
        assert_eq!(t.to_image(150.0, 120.0), zoomed.to_image(150.0, 120.0));
    }

    #[test]
    fn test_repeated_zoom_keeps_cursor_point() {
        let mut t = ViewTransform::for_image(ImageBounds::new(640, 480));
        let before = t.to_image(200.0, 100.0);
        for _ in 0..5 {
            t = t.zoom_at(200.0, 100.0, 1.15);
        }
        for _ in 0..3 {
            t = t.zoom_at(200.0, 100.0, 1.0 / 1.15);
        }
        assert_eq!(before, t.to_image(200.0, 100.0));
    }

    #[test]
    fn test_zoom_rejects_invalid_factor() {
        let t = ViewTransform::identity();
        assert_eq!(t.zoom_at(0.0, 0.0, 0.0), t);
        assert_eq!(t.zoom_at(0.0, 0.0, -2.0), t);
        assert_eq!(t.zoom_at(0.0, 0.0, f32::NAN), t);
        assert_eq!(t.zoom_at(0.0, 0.0, f32::INFINITY), t);
    }

    #[test]
    fn test_zoom_respects_limits() {
        let t = ViewTransform::identity().with_limits(ScaleLimits { min: 0.5, max: 2.0 });
        let t = t.zoom_at(0.0, 0.0, 10.0);
        assert_eq!(t.scale, 2.0);
        let t = t.zoom_at(0.0, 0.0, 0.01);
        assert_eq!(t.scale, 0.5);
    }

    #[test]
    fn test_pan_by_is_unclamped() {
        let t = ViewTransform::for_image(ImageBounds::new(10, 10));
        let panned = t.pan_by(-5000.0, 250.0);
        assert_eq!(panned.scale, 1.0);
        assert_eq!(panned.offset_x, -5000.0);
        assert_eq!(panned.offset_y, 250.0);
    }
}
