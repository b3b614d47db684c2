//! Colour helpers.
//!
//! New classes get a colour from a golden-angle hue walk so consecutive
//! classes stay visually distinct without a palette file. Rectangle fill
//! thresholds a BT.601 grayscale copy of the source image.

use image::{GrayImage, Luma, RgbImage};

/// Convert HSV to RGB.
///
/// # Arguments
/// * `h` - Hue in degrees (0-360)
/// * `s` - Saturation (0.0-1.0)
/// * `v` - Value/brightness (0.0-1.0)
///
/// # Returns
/// RGB tuple with values in range 0.0-1.0
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

/// Colour for the class at `index` in the registry.
pub fn class_color(index: usize) -> [u8; 3] {
    let hue = (index as f32 * 137.5) % 360.0;
    let (r, g, b) = hsv_to_rgb(hue, 0.7, 0.9);
    [to_channel(r), to_channel(g), to_channel(b)]
}

fn to_channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Grayscale with BT.601 weights (0.299, 0.587, 0.114) in 14-bit fixed
/// point, rounded half up.
pub fn luma_bt601(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let weighted = u32::from(r) * 4899 + u32::from(g) * 9617 + u32::from(b) * 1868;
        Luma([((weighted + (1 << 13)) >> 14) as u8])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_hsv_to_rgb_red() {
        let (r, g, b) = hsv_to_rgb(0.0, 1.0, 1.0);
        assert!((r - 1.0).abs() < 0.01);
        assert!(g.abs() < 0.01);
        assert!(b.abs() < 0.01);
    }

    #[test]
    fn test_hsv_to_rgb_blue() {
        let (r, g, b) = hsv_to_rgb(240.0, 1.0, 1.0);
        assert!(r.abs() < 0.01);
        assert!(g.abs() < 0.01);
        assert!((b - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_luma_bt601_weights() {
        let rgb = RgbImage::from_fn(4, 1, |x, _| match x {
            0 => Rgb([128, 128, 128]),
            1 => Rgb([0, 255, 0]),
            2 => Rgb([0, 180, 0]),
            _ => Rgb([255, 255, 255]),
        });
        let gray = luma_bt601(&rgb);
        assert_eq!(gray.get_pixel(0, 0)[0], 128);
        assert_eq!(gray.get_pixel(1, 0)[0], 150);
        // Rec.709 would put this green above the default fill threshold
        assert_eq!(gray.get_pixel(2, 0)[0], 106);
        assert_eq!(gray.get_pixel(3, 0)[0], 255);
    }

    #[test]
    fn test_class_colors_differ() {
        assert_ne!(class_color(0), class_color(1));
        assert_ne!(class_color(1), class_color(2));
    }
}
