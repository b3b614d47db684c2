//! Data models for the annotation engine.

mod annotation;
mod category;
mod mode;

pub use annotation::{BoxShape, Corner, ImageBounds, PixelPoint};
pub use category::Category;
pub use mode::LabelMode;
