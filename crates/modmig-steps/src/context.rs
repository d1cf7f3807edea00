//! Migration context
//!
//! The uniform parameter set every operation receives: the module being
//! migrated, its manifest, the steps already applied in this run, the
//! manifest collaborator and the rewrite configuration.

use crate::error::MigrationError;
use modmig_manifest::{Manifest, ManifestTools};
use modmig_rewrite::{ChangeReport, RewriteConfig, RuleApplier};
use std::fmt;
use std::path::{Path, PathBuf};

/// Invocation contract shared by all operations
pub struct MigrationContext<'a> {
    module_path: PathBuf,
    module_name: String,
    manifest_path: PathBuf,
    steps_applied: Vec<String>,
    tools: &'a dyn ManifestTools,
    config: RewriteConfig,
}

impl<'a> MigrationContext<'a> {
    /// Create context for a module directory with default configuration
    ///
    /// The module name is the directory name; the manifest is looked up
    /// under the configured manifest file name.
    #[must_use]
    pub fn new(module_path: impl Into<PathBuf>, tools: &'a dyn ManifestTools) -> Self {
        let module_path = module_path.into();
        let config = RewriteConfig::default();
        Self {
            module_name: module_name_of(&module_path),
            manifest_path: module_path.join(&config.manifest_name),
            module_path,
            steps_applied: Vec::new(),
            tools,
            config,
        }
    }

    /// With configuration; also re-derives the manifest path
    #[must_use]
    pub fn with_config(mut self, config: RewriteConfig) -> Self {
        self.manifest_path = self.module_path.join(&config.manifest_name);
        self.config = config;
        self
    }

    /// With explicit module name
    #[must_use]
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    /// With explicit manifest path
    #[must_use]
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    /// Module root directory
    #[inline]
    #[must_use]
    pub fn module_path(&self) -> &Path {
        &self.module_path
    }

    /// Module technical name
    #[inline]
    #[must_use]
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Manifest file
    #[inline]
    #[must_use]
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Names of the steps applied so far, oldest first
    #[inline]
    #[must_use]
    pub fn steps_applied(&self) -> &[String] {
        &self.steps_applied
    }

    /// Manifest collaborator
    #[inline]
    #[must_use]
    pub fn tools(&self) -> &dyn ManifestTools {
        self.tools
    }

    /// Rewrite configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// Rule applier bound to this context's configuration
    #[inline]
    #[must_use]
    pub fn applier(&self) -> RuleApplier<'_> {
        RuleApplier::new(&self.config)
    }

    /// Record a completed step
    pub fn record_step(&mut self, name: impl Into<String>) {
        self.steps_applied.push(name.into());
    }

    /// Load the module manifest
    ///
    /// # Errors
    /// `MigrationError::Manifest` if the manifest cannot be read or is malformed.
    pub fn load_manifest(&self) -> Result<Manifest, MigrationError> {
        Ok(Manifest::load(self.tools, &self.manifest_path)?)
    }

    /// Save the manifest if it changed, recording it in `report`
    ///
    /// In dry-run mode the change is reported but not written.
    ///
    /// # Errors
    /// `MigrationError::Manifest` if rendering or writing fails.
    pub fn save_manifest(
        &self,
        manifest: &mut Manifest,
        report: &mut ChangeReport,
    ) -> Result<bool, MigrationError> {
        if !manifest.is_modified() {
            return Ok(false);
        }
        if self.config.dry_run {
            tracing::debug!(path = %self.manifest_path.display(), "dry run: skipping manifest save");
        } else {
            manifest.save(self.tools, &self.manifest_path)?;
        }
        report.modified.push(self.manifest_path.clone());
        Ok(true)
    }

    /// Path of `path` relative to the module root, with `/` separators
    #[must_use]
    pub fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.module_path).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Debug for MigrationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationContext")
            .field("module_path", &self.module_path)
            .field("module_name", &self.module_name)
            .field("manifest_path", &self.manifest_path)
            .field("steps_applied", &self.steps_applied)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn module_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .or_else(|| {
            path.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|name| name.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| path.display().to_string())
}
