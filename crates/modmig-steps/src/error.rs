//! Migration errors

use modmig_manifest::ManifestError;
use modmig_rewrite::RewriteError;
use thiserror::Error;

/// Errors raised while selecting or running migration steps
#[derive(Debug, Error)]
pub enum MigrationError {
    /// File walking, parsing or rewriting failed
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    /// Manifest could not be read, interpreted or written
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Version has no registered step starting or ending at it
    #[error("unknown version '{0}'")]
    UnknownVersion(String),

    /// Registered steps do not chain from `from` to `to`
    #[error("no migration path from {from} to {to}")]
    NoPath {
        /// Source version
        from: String,
        /// Target version
        to: String,
    },
}

impl MigrationError {
    /// Create no-path error
    #[must_use]
    pub fn no_path(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::NoPath {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Result type for migration operations
pub type MigrationResult<T> = Result<T, MigrationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn rewrite_errors_keep_their_message() {
        let err: MigrationError = RewriteError::InvalidModulePath(PathBuf::from("/x")).into();
        assert_eq!(err.to_string(), "'/x' is not a directory");
    }

    #[test]
    fn no_path_message() {
        let err = MigrationError::no_path("16.0", "14.0");
        assert_eq!(err.to_string(), "no migration path from 16.0 to 14.0");
    }
}
