//! Error types for session and interaction operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::format::FormatError;

/// Errors surfaced to the surrounding application.
///
/// None of these leave the engine in a half-updated state: the operation
/// that failed is abandoned and the previous session stays in place.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Drawing was attempted while the class registry is empty
    #[error("No class selected; add a class before drawing")]
    NoClassSelected,

    /// Class names must contain a non-space character
    #[error("Class name is empty")]
    EmptyClassName,

    /// Source image could not be decoded
    #[error("Failed to decode image {path:?}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Operation needs an image but none is loaded
    #[error("No image loaded")]
    NoImageLoaded,

    /// Navigation target does not exist
    #[error("Image index {index} out of range ({count} images)")]
    ImageIndexOutOfRange { index: usize, count: usize },

    /// Project has no images folder or it is empty
    #[error("No images found in {0:?}")]
    NoImages(PathBuf),

    /// I/O error outside label files (e.g. listing the images folder)
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Label or class file error
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Pending edits could not be saved, so the session was kept
    #[error("Unsaved changes could not be persisted: {0}")]
    UnsavedChanges(#[source] FormatError),
}

impl EngineError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
