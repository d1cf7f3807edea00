//! Rewrite configuration
//!
//! Loaded from an optional TOML file; every field has a default so an
//! empty file (or no file) is a valid configuration.
//!
//! ```toml
//! dry_run = false
//! ignored_dirs = [".git", "node_modules"]
//! indent = "  "
//! manifest_name = "__manifest__.py"
//! ```

use crate::error::RewriteError;
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::Path;

/// Default manifest file name inside a module
pub const DEFAULT_MANIFEST_NAME: &str = "__manifest__.py";

/// Default markup indentation
pub const DEFAULT_INDENT: &str = "  ";

/// Settings shared by every rewrite operation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteConfig {
    /// Report changes without writing or deleting anything
    pub dry_run: bool,
    /// Directory names the walker does not descend into
    pub ignored_dirs: Vec<String>,
    /// Indentation for re-serialized markup
    pub indent: String,
    /// Manifest file name inside the module root
    pub manifest_name: String,
}

impl RewriteConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With dry-run mode
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// With an ignored directory name
    #[inline]
    #[must_use]
    pub fn with_ignored_dir(mut self, name: impl Into<String>) -> Self {
        self.ignored_dirs.push(name.into());
        self
    }

    /// With markup indentation
    #[inline]
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// `RewriteError::Config` on invalid TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, RewriteError> {
        toml::from_str(text).map_err(|e| RewriteError::Config {
            path: "<inline>".into(),
            message: e.to_string(),
        })
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// `RewriteError::Io` if unreadable, `RewriteError::Config` if invalid.
    pub fn load(path: &Path) -> Result<Self, RewriteError> {
        let text = std::fs::read_to_string(path).map_err(|e| RewriteError::io_error(path, e))?;
        toml::from_str(&text).map_err(|e| RewriteError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Whether the walker skips a directory with this name
    #[must_use]
    pub fn is_ignored_dir(&self, name: &OsStr) -> bool {
        self.ignored_dirs.iter().any(|ignored| OsStr::new(ignored) == name)
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            ignored_dirs: Vec::new(),
            indent: DEFAULT_INDENT.to_string(),
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = RewriteConfig::from_toml_str("").unwrap();
        assert_eq!(config, RewriteConfig::default());
    }

    #[test]
    fn toml_overrides_fields() {
        let config = RewriteConfig::from_toml_str(
            "dry_run = true\nignored_dirs = [\".git\"]\nindent = \"    \"\n",
        )
        .unwrap();
        assert!(config.dry_run);
        assert_eq!(config.ignored_dirs, [".git"]);
        assert_eq!(config.indent, "    ");
        assert_eq!(config.manifest_name, DEFAULT_MANIFEST_NAME);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = RewriteConfig::from_toml_str("dryrun = true").unwrap_err();
        assert!(matches!(err, RewriteError::Config { .. }));
    }

    #[test]
    fn builder_methods() {
        let config = RewriteConfig::new()
            .with_dry_run(true)
            .with_ignored_dir("node_modules")
            .with_indent("\t");
        assert!(config.dry_run);
        assert!(config.is_ignored_dir(OsStr::new("node_modules")));
        assert!(!config.is_ignored_dir(OsStr::new("views")));
        assert_eq!(config.indent, "\t");
    }
}
