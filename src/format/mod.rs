//! Label file persistence.
//!
//! Each labelling mode has a per-image text format implementing
//! [`LabelFormat`]; the project class list has its own small reader and
//! writer in [`classes`].
//!
//! ## Supported Formats
//!
//! - **YOLO TXT**: normalized boxes, one record per line
//! - **Mask grid TXT**: dense per-pixel class indices, one row per line
//!
//! ## Usage
//!
//! ```rust,ignore
//! use labelforge::format::{LabelContext, LabelFormat, formats::YoloFormat};
//!
//! let mut ctx = LabelContext::new(bounds, &mut registry);
//! let decoded = YoloFormat.load(&path, &mut ctx)?;
//! ```

pub mod classes;
mod error;
pub mod formats;
mod traits;

pub use classes::{load_classes, save_classes};
pub use error::FormatError;
pub use traits::{
    Decoded, Encoded, ExportResult, FormatWarning, LabelContext, LabelFormat, WarningKind,
    WarningSeverity,
};
