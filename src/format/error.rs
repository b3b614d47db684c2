//! Error types for label file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing label files.
///
/// Malformed records inside an otherwise readable file are not errors; they
/// are reported as [`FormatWarning`](crate::format::FormatWarning)s.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error on {path:?}: {source}")]
    Io {
        /// File being read or written
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image dimensions that cannot be used for normalization
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions {
        /// Image width in pixels
        width: u32,
        /// Image height in pixels
        height: u32,
    },

    /// File content that cannot be interpreted at all
    #[error("Invalid format in {path:?}: {message}")]
    InvalidFormat {
        /// File being read
        path: PathBuf,
        /// Description of the format error
        message: String,
    },
}

impl FormatError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid format error with a message.
    pub fn invalid_format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            path: path.into(),
            message: message.into(),
        }
    }
}
