//! Label format implementations.

mod mask_grid;
mod yolo;

#[cfg(test)]
mod tests;

pub use mask_grid::MaskGridFormat;
pub use yolo::YoloFormat;
