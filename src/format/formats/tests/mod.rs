//! Unit tests for label format implementations.
//!
//! These tests verify file-level behaviour: saving, loading and round-trip
//! conversions through the text formats.

mod mask_grid_tests;
mod yolo_tests;
