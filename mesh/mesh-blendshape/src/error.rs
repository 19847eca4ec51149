//! Error types for blend shape loading and generation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for blend shape operations.
pub type BlendshapeResult<T> = Result<T, BlendshapeError>;

/// Errors that can occur while reading, writing, or generating blend shapes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BlendshapeError {
    /// Target file not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// A data line in a target file could not be parsed.
    #[error("{path}:{line}: {message}")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Description of what was invalid.
        message: String,
    },

    /// The target name could not be derived from the file name.
    #[error("cannot derive a shape name from {path}")]
    InvalidFileName {
        /// The offending path.
        path: PathBuf,
    },

    /// The shape catalog is malformed.
    #[error("invalid catalog: {message}")]
    InvalidCatalog {
        /// Description of the problem.
        message: String,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BlendshapeError {
    /// Create an `InvalidCatalog` error with the given message.
    #[must_use]
    pub fn invalid_catalog(message: impl Into<String>) -> Self {
        Self::InvalidCatalog {
            message: message.into(),
        }
    }

    /// Map an error from opening `path`, turning `NotFound` into [`Self::FileNotFound`].
    pub(crate) fn from_open(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io(err)
        }
    }
}
