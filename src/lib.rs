//! labelforge - interactive image annotation engine
//!
//! Draw, move, resize and classify bounding boxes or paint pixel masks over a
//! folder of images. Labels are stored as normalized box records and dense
//! mask grids next to the images, with a shared `classes.txt` registry.
//!
//! The GUI is not part of this crate: a front-end feeds pointer and key
//! events into an [`AnnotationSession`] and renders from its accessors.

pub mod color_utils;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod interaction;
pub mod keybindings;
pub mod mask;
pub mod model;
pub mod project;
pub mod registry;
pub mod session;
pub mod store;
pub mod view;

pub use config::{EngineConfig, LogLevel, Preferences};
pub use error::EngineError;
pub use hit_test::{Hit, HitTester};
pub use interaction::{Effect, InteractionController, PointerButton, PointerEvent, ToolMode};
pub use keybindings::{KeyBindings, KeyCode};
pub use mask::MaskGrid;
pub use model::{BoxShape, Corner, ImageBounds, LabelMode, PixelPoint};
pub use project::ProjectLayout;
pub use registry::ClassRegistry;
pub use session::{AnnotationSession, EngineEvent, ImageLabels};
pub use store::ShapeStore;
pub use view::ViewTransform;
