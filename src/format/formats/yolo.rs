//! YOLO TXT format implementation.
//!
//! One text file per image, one record per box:
//! `class_index cx cy w h` with all four geometry values normalized to
//! `[0, 1]` by the image size and written with six decimals.

use crate::format::error::FormatError;
use crate::format::traits::{
    Decoded, Encoded, FormatWarning, LabelContext, LabelFormat, WarningKind,
};
use crate::model::{BoxShape, ImageBounds};
use crate::store::ShapeStore;

/// YOLO box format.
///
/// Boxes are clamped into the image before encoding; boxes that collapse
/// are dropped. Unknown class names are appended to the registry. On
/// decode, class indices beyond the registry become `class_<index>`
/// placeholders so that no record is lost for want of a class.
pub struct YoloFormat;

impl LabelFormat for YoloFormat {
    type Labels = ShapeStore;

    fn id(&self) -> &'static str {
        "yolo"
    }

    fn display_name(&self) -> &'static str {
        "YOLO (TXT)"
    }

    fn encode(&self, labels: &ShapeStore, ctx: &mut LabelContext<'_>) -> Result<Encoded, FormatError> {
        let bounds = ctx.bounds;
        if bounds.width == 0 || bounds.height == 0 {
            return Err(FormatError::InvalidDimensions {
                width: bounds.width,
                height: bounds.height,
            });
        }
        let width = f64::from(bounds.width);
        let height = f64::from(bounds.height);

        let mut text = String::new();
        let mut records = 0;
        let mut dropped = 0;

        for shape in labels.iter() {
            let c = shape.clamped(bounds);
            if c.x2 <= c.x1 || c.y2 <= c.y1 {
                log::debug!("Dropping degenerate box {:?} on save", shape);
                dropped += 1;
                continue;
            }

            let class_idx = ctx.registry.ensure(&shape.class_name);

            // YOLO uses center coordinates, normalized to [0, 1]
            let cx = f64::from(c.x1 + c.x2) / 2.0 / width;
            let cy = f64::from(c.y1 + c.y2) / 2.0 / height;
            let nw = f64::from(c.x2 - c.x1) / width;
            let nh = f64::from(c.y2 - c.y1) / height;

            text.push_str(&format!(
                "{} {:.6} {:.6} {:.6} {:.6}\n",
                class_idx, cx, cy, nw, nh
            ));
            records += 1;
        }

        Ok(Encoded {
            text,
            records,
            dropped,
        })
    }

    fn decode(&self, text: &str, ctx: &mut LabelContext<'_>) -> Decoded<ShapeStore> {
        let bounds = ctx.bounds;
        let mut shapes = Vec::new();
        let mut warnings = Vec::new();

        for (line_no, line) in text.lines().enumerate().map(|(i, l)| (i + 1, l.trim())) {
            if line.is_empty() {
                continue;
            }

            let record = match parse_yolo_line(line) {
                Ok(record) => record,
                Err(message) => {
                    warnings.push(
                        FormatWarning::new(WarningKind::LabelParseSkip, message).at_line(line_no),
                    );
                    continue;
                }
            };

            let class_name = ctx.registry.resolve_index(record.class_idx);
            let shape = record.to_pixels(&class_name, bounds);
            if !shape.is_normalized() {
                warnings.push(
                    FormatWarning::new(
                        WarningKind::DegenerateBox,
                        format!("box has no area at {}x{}", bounds.width, bounds.height),
                    )
                    .at_line(line_no),
                );
                continue;
            }
            shapes.push(shape);
        }

        Decoded {
            labels: ShapeStore::from_shapes(bounds, shapes),
            warnings,
        }
    }

    fn empty(&self, bounds: ImageBounds) -> ShapeStore {
        ShapeStore::new(bounds)
    }
}

/// One parsed YOLO record, still normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
struct YoloRecord {
    class_idx: i64,
    cx: f64,
    cy: f64,
    w: f64,
    h: f64,
}

impl YoloRecord {
    /// Convert to pixel corners, truncating toward zero, then normalize and
    /// clamp into the image.
    fn to_pixels(&self, class_name: &str, bounds: ImageBounds) -> BoxShape {
        let width = f64::from(bounds.width);
        let height = f64::from(bounds.height);
        let x1 = ((self.cx - self.w / 2.0) * width) as i32;
        let y1 = ((self.cy - self.h / 2.0) * height) as i32;
        let x2 = ((self.cx + self.w / 2.0) * width) as i32;
        let y2 = ((self.cy + self.h / 2.0) * height) as i32;
        BoxShape::new(class_name, x1, y1, x2, y2)
            .normalized()
            .clamped(bounds)
    }
}

/// Parse a single YOLO annotation line.
fn parse_yolo_line(line: &str) -> Result<YoloRecord, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 5 {
        return Err(format!("expected 5 fields, found {}", parts.len()));
    }

    let class_idx: i64 = parts[0]
        .parse()
        .map_err(|_| format!("invalid class index '{}'", parts[0]))?;

    let mut values = [0.0f64; 4];
    for (value, part) in values.iter_mut().zip(&parts[1..]) {
        *value = part
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .ok_or_else(|| format!("invalid coordinate '{}'", part))?;
    }
    let [cx, cy, w, h] = values;

    Ok(YoloRecord {
        class_idx,
        cx,
        cy,
        w,
        h,
    })
}
