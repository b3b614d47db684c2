//! Tests for the mask grid format.

use ndarray::array;

use crate::format::formats::MaskGridFormat;
use crate::format::traits::{LabelContext, LabelFormat, WarningKind};
use crate::mask::MaskGrid;
use crate::model::ImageBounds;
use crate::registry::ClassRegistry;

#[test]
fn test_mask_encode_layout() {
    let grid = MaskGrid::from_array(array![[0, 1, 0], [2, 2, 0]]);
    let bounds = ImageBounds::new(3, 2);
    let mut registry = ClassRegistry::new();

    let encoded = MaskGridFormat
        .encode(&grid, &mut LabelContext::new(bounds, &mut registry))
        .unwrap();

    assert_eq!(encoded.text, "0 1 0\n2 2 0\n");
    assert_eq!(encoded.records, 2);
}

#[test]
fn test_mask_encode_rejects_wrong_size() {
    let grid = MaskGrid::new(ImageBounds::new(3, 2));
    let mut registry = ClassRegistry::new();
    let result = MaskGridFormat.encode(
        &grid,
        &mut LabelContext::new(ImageBounds::new(4, 2), &mut registry),
    );
    assert!(result.is_err());
}

#[test]
fn test_mask_decode() {
    let bounds = ImageBounds::new(3, 2);
    let mut registry = ClassRegistry::new();

    let decoded = MaskGridFormat.decode(
        "0 1 0\n2 2 0\n",
        &mut LabelContext::new(bounds, &mut registry),
    );

    assert!(decoded.warnings.is_empty());
    assert_eq!(decoded.labels.get(1, 0), Some(1));
    assert_eq!(decoded.labels.get(0, 1), Some(2));
    assert!(!decoded.labels.is_dirty());
}

#[test]
fn test_mask_decode_size_mismatch_starts_blank() {
    let bounds = ImageBounds::new(4, 4);
    let mut registry = ClassRegistry::new();

    let decoded = MaskGridFormat.decode(
        "1 1 1\n1 1 1\n",
        &mut LabelContext::new(bounds, &mut registry),
    );

    assert_eq!(decoded.labels.bounds(), bounds);
    assert!(decoded.labels.is_blank());
    assert_eq!(decoded.warnings[0].kind, WarningKind::DimensionMismatch);
}

#[test]
fn test_mask_decode_malformed_starts_blank() {
    let bounds = ImageBounds::new(2, 2);
    let mut registry = ClassRegistry::new();

    for text in ["1 x\n0 0\n", "1 1\n0\n"] {
        let decoded = MaskGridFormat.decode(text, &mut LabelContext::new(bounds, &mut registry));
        assert!(decoded.labels.is_blank(), "{:?}", text);
        assert_eq!(decoded.warnings[0].kind, WarningKind::MalformedGrid);
    }
}

#[test]
fn test_mask_decode_empty_text_is_mismatch() {
    let bounds = ImageBounds::new(2, 2);
    let mut registry = ClassRegistry::new();
    let decoded = MaskGridFormat.decode("", &mut LabelContext::new(bounds, &mut registry));
    assert!(decoded.labels.is_blank());
    assert_eq!(decoded.warnings[0].kind, WarningKind::DimensionMismatch);
}
