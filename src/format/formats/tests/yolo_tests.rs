//! Tests for the YOLO format.

use crate::format::formats::YoloFormat;
use crate::format::traits::{LabelContext, LabelFormat, WarningKind};
use crate::model::{BoxShape, ImageBounds};
use crate::registry::ClassRegistry;
use crate::store::ShapeStore;

fn registry_with(names: &[&str]) -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    for name in names {
        registry.add(name);
    }
    registry
}

fn store_with(bounds: ImageBounds, shapes: &[BoxShape]) -> ShapeStore {
    ShapeStore::from_shapes(bounds, shapes.to_vec())
}

#[test]
fn test_yolo_line_format() {
    let bounds = ImageBounds::new(640, 480);
    let mut registry = registry_with(&["person"]);
    let store = store_with(bounds, &[BoxShape::new("person", 100, 120, 180, 320)]);

    let encoded = YoloFormat
        .encode(&store, &mut LabelContext::new(bounds, &mut registry))
        .unwrap();

    // (100 + 40) / 640, (120 + 100) / 480, 80 / 640, 200 / 480
    assert_eq!(encoded.text, "0 0.218750 0.458333 0.125000 0.416667\n");
    assert_eq!(encoded.records, 1);
    assert_eq!(encoded.dropped, 0);
}

#[test]
fn test_yolo_encode_registers_unknown_class() {
    let bounds = ImageBounds::new(100, 100);
    let mut registry = registry_with(&["a"]);
    let store = store_with(bounds, &[BoxShape::new("zebra", 0, 0, 10, 10)]);

    let encoded = YoloFormat
        .encode(&store, &mut LabelContext::new(bounds, &mut registry))
        .unwrap();

    assert!(encoded.text.starts_with("1 "));
    assert_eq!(registry.index_of("zebra"), Some(1));
    assert!(registry.is_dirty());
}

#[test]
fn test_yolo_encode_clamps_and_drops_degenerate() {
    let bounds = ImageBounds::new(100, 100);
    let mut registry = registry_with(&["a"]);
    let store = store_with(
        bounds,
        &[
            // Extends past the right edge
            BoxShape::new("a", 90, 10, 140, 20),
            // Entirely off the image: collapses to zero width
            BoxShape::new("a", 150, 10, 160, 20),
        ],
    );

    let encoded = YoloFormat
        .encode(&store, &mut LabelContext::new(bounds, &mut registry))
        .unwrap();

    assert_eq!(encoded.records, 1);
    assert_eq!(encoded.dropped, 1);
    // x range 90..99 after clamping
    assert!(encoded.text.starts_with("0 0.945000 "));
}

#[test]
fn test_yolo_encode_rejects_empty_image() {
    let bounds = ImageBounds::new(0, 10);
    let mut registry = ClassRegistry::new();
    let store = ShapeStore::new(bounds);
    let result = YoloFormat.encode(&store, &mut LabelContext::new(bounds, &mut registry));
    assert!(result.is_err());
}

#[test]
fn test_yolo_decode_skips_malformed_lines() {
    let bounds = ImageBounds::new(100, 100);
    let mut registry = registry_with(&["a", "b"]);
    let text = "0 0.3 0.3 0.4 0.4\nnot a record\n1 0.5 0.5 0.2\n\n1 0.5 0.5 0.2 0.2\n";

    let decoded = YoloFormat.decode(text, &mut LabelContext::new(bounds, &mut registry));

    assert_eq!(decoded.labels.len(), 2);
    assert_eq!(decoded.labels.get(1).class_name, "b");
    assert_eq!(decoded.warnings.len(), 2);
    assert!(decoded
        .warnings
        .iter()
        .all(|w| w.kind == WarningKind::LabelParseSkip));
    assert_eq!(decoded.warnings[0].line, Some(2));
    assert_eq!(decoded.warnings[1].line, Some(3));
    assert!(!decoded.labels.is_dirty());
}

#[test]
fn test_yolo_decode_unknown_index_gets_placeholder() {
    let bounds = ImageBounds::new(100, 100);
    let mut registry = registry_with(&["a"]);

    let decoded = YoloFormat.decode(
        "7 0.5 0.5 0.2 0.2\n",
        &mut LabelContext::new(bounds, &mut registry),
    );

    assert_eq!(decoded.labels.len(), 1);
    assert_eq!(decoded.labels.get(0).class_name, "class_7");
    assert!(registry.contains("class_7"));
}

#[test]
fn test_yolo_decode_negative_index_gets_placeholder() {
    let bounds = ImageBounds::new(100, 100);
    let mut registry = registry_with(&["a"]);

    let decoded = YoloFormat.decode(
        "-1 0.5 0.5 0.2 0.2\n",
        &mut LabelContext::new(bounds, &mut registry),
    );

    assert!(decoded.warnings.is_empty());
    assert_eq!(decoded.labels.len(), 1);
    assert_eq!(decoded.labels.get(0).class_name, "class_-1");
    assert!(registry.contains("class_-1"));
}

#[test]
fn test_yolo_decode_drops_zero_area_box() {
    let bounds = ImageBounds::new(100, 100);
    let mut registry = registry_with(&["a"]);

    let decoded = YoloFormat.decode(
        "0 0.5 0.5 0.0 0.2\n",
        &mut LabelContext::new(bounds, &mut registry),
    );

    assert!(decoded.labels.is_empty());
    assert_eq!(decoded.warnings.len(), 1);
    assert_eq!(decoded.warnings[0].kind, WarningKind::DegenerateBox);
}

#[test]
fn test_yolo_decode_clamps_out_of_range() {
    let bounds = ImageBounds::new(100, 100);
    let mut registry = registry_with(&["a"]);

    let decoded = YoloFormat.decode(
        "0 0.95 0.5 0.3 0.2\n",
        &mut LabelContext::new(bounds, &mut registry),
    );

    let shape = decoded.labels.get(0);
    assert_eq!(shape.x2, 99);
    assert!(shape.x1 < shape.x2);
}

#[test]
fn test_yolo_empty_labels() {
    let bounds = ImageBounds::new(64, 48);
    let labels = YoloFormat.empty(bounds);
    assert!(labels.is_empty());
    assert_eq!(labels.bounds(), bounds);
}
