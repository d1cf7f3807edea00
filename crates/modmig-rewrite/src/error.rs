//! Error types for the rewrite engine
//!
//! Every failure is fatal for the operation that hit it: one malformed or
//! undecodable file aborts the whole directory-wide rewrite.

use modmig_manifest::ManifestError;
use std::path::PathBuf;

/// Errors while walking, reading, transforming or writing module files
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// Module root does not exist or is not a directory
    #[error("'{0}' is not a directory")]
    InvalidModulePath(PathBuf),

    /// File does not parse as markup
    #[error("malformed markup in {path} at line {line}: {message}")]
    MalformedMarkup {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// File is not valid UTF-8
    #[error("{path} is not valid utf-8")]
    Encoding { path: PathBuf },

    /// IO error on a module file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed below the module root
    #[error("failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },

    /// Rule pattern does not compile
    #[error("invalid rule pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Configuration file could not be read or parsed
    #[error("invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Manifest error during a manifest-aware rewrite
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),
}

impl RewriteError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create malformed markup error for path
    pub fn malformed(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::MalformedMarkup {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Create encoding error for path
    pub fn encoding(path: impl Into<PathBuf>) -> Self {
        Self::Encoding { path: path.into() }
    }
}

/// Result type alias for rewrite operations
pub type RewriteResult<T> = Result<T, RewriteError>;
