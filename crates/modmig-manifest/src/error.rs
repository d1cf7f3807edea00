//! Error types for manifest handling
//!
//! Covers the three places a manifest can go wrong:
//! - reading or writing the declaration file
//! - parsing its literal syntax
//! - interpreting well-formed entries with an unexpected shape

use std::path::PathBuf;

/// Errors while loading, interpreting, or saving a manifest
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// IO error on the manifest file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest file is not valid UTF-8
    #[error("{path} is not valid utf-8")]
    Encoding { path: PathBuf },

    /// Declaration literal could not be parsed
    #[error("syntax error in {path} at {line}:{column}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// Top-level literal is not a mapping
    #[error("manifest {path} does not declare a mapping")]
    NotAMapping { path: PathBuf },

    /// A known key holds a value of the wrong shape
    #[error("manifest key '{key}' must be {expected}")]
    InvalidEntry { key: String, expected: &'static str },

    /// Rendering the manifest text failed
    #[error("failed to render manifest: {0}")]
    Render(String),
}

impl ManifestError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create invalid entry error for key
    pub fn invalid_entry(key: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidEntry {
            key: key.into(),
            expected,
        }
    }
}

/// Result type alias for manifest operations
pub type ManifestResult<T> = Result<T, ManifestError>;
