//! Manifest file collaborator
//!
//! Migrations never touch the manifest file directly; they go through a
//! [`ManifestTools`] implementation that reads the declaration file as a
//! mapping and writes rendered text back. [`FsManifestTools`] is the
//! filesystem implementation used by the binary and the tests.

use crate::error::ManifestError;
use crate::literal::parse_literal;
use serde_json::{Map, Value};
use std::path::Path;

/// Reads and writes manifest files
pub trait ManifestTools {
    /// Read the manifest at `path` as a mapping
    ///
    /// # Errors
    /// IO, encoding, syntax, or non-mapping errors.
    fn read_manifest(&self, path: &Path) -> Result<Map<String, Value>, ManifestError>;

    /// Replace the content of the manifest at `path`
    ///
    /// # Errors
    /// IO errors.
    fn write_content(&self, path: &Path, content: &str) -> Result<(), ManifestError>;
}

/// Filesystem-backed manifest collaborator
#[derive(Debug, Clone, Copy, Default)]
pub struct FsManifestTools;

impl FsManifestTools {
    /// Create filesystem tools
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ManifestTools for FsManifestTools {
    fn read_manifest(&self, path: &Path) -> Result<Map<String, Value>, ManifestError> {
        let bytes = std::fs::read(path).map_err(|e| ManifestError::io_error(path, e))?;
        let source = String::from_utf8(bytes).map_err(|_| ManifestError::Encoding {
            path: path.to_path_buf(),
        })?;
        match parse_literal(&source) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ManifestError::NotAMapping {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(ManifestError::Syntax {
                path: path.to_path_buf(),
                line: e.line,
                column: e.column,
                message: e.message,
            }),
        }
    }

    fn write_content(&self, path: &Path, content: &str) -> Result<(), ManifestError> {
        std::fs::write(path, content).map_err(|e| ManifestError::io_error(path, e))
    }
}
