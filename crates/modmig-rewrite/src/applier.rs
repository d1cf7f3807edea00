//! Rule applier
//!
//! Runs text rules and markup rules over every matching file below a module
//! root. Files are handled one at a time: read, transform in memory, then
//! written back only when something changed. In dry-run mode the same
//! decisions are made and reported, but nothing touches the disk.

use crate::assets::promote_asset_declarations;
use crate::config::RewriteConfig;
use crate::error::RewriteError;
use crate::markup::MarkupDocument;
use crate::rules::MarkupRule;
use crate::text::{apply_all, TextRule};
use crate::walker::walk_files;
use indexmap::IndexMap;
use modmig_manifest::Manifest;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Markup file suffix
pub const MARKUP_SUFFIX: &str = ".xml";

/// Files seen and changed by one or more rule runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeReport {
    /// Candidate files, in walk order
    pub discovered: Vec<PathBuf>,
    /// Files rewritten in place
    pub modified: Vec<PathBuf>,
    /// Files removed because nothing actionable was left in them
    pub deleted: Vec<PathBuf>,
}

impl ChangeReport {
    /// Create empty report
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no file was modified or deleted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Fold another report into this one
    ///
    /// A file modified by several runs is listed once.
    pub fn merge(&mut self, other: ChangeReport) {
        extend_unique(&mut self.discovered, other.discovered);
        extend_unique(&mut self.modified, other.modified);
        extend_unique(&mut self.deleted, other.deleted);
    }

    fn record_modified(&mut self, path: PathBuf) {
        extend_unique(&mut self.modified, [path]);
    }
}

fn extend_unique(target: &mut Vec<PathBuf>, paths: impl IntoIterator<Item = PathBuf>) {
    for path in paths {
        if !target.contains(&path) {
            target.push(path);
        }
    }
}

/// Applies rules to the files of one module
#[derive(Debug, Clone, Copy)]
pub struct RuleApplier<'a> {
    config: &'a RewriteConfig,
}

impl<'a> RuleApplier<'a> {
    /// Create applier
    #[inline]
    #[must_use]
    pub fn new(config: &'a RewriteConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RewriteConfig {
        self.config
    }

    /// Apply text rules, in order, to every file matching their suffix
    ///
    /// Rules sharing a suffix are chained over a single read of each file.
    ///
    /// # Errors
    /// - `InvalidModulePath` if `root` is not a directory
    /// - `Encoding` if a candidate file is not UTF-8
    /// - `Io` on read or write failure
    pub fn apply_text_rules(
        &self,
        root: &Path,
        rules: &[TextRule],
    ) -> Result<ChangeReport, RewriteError> {
        let mut by_suffix: IndexMap<&str, Vec<&TextRule>> = IndexMap::new();
        for rule in rules {
            by_suffix.entry(rule.suffix()).or_default().push(rule);
        }

        let mut report = ChangeReport::new();
        for (suffix, rules) in by_suffix {
            let files = walk_files(root, suffix, self.config)?;
            for path in &files {
                let original = read_text(path)?;
                let rewritten = apply_all(&rules, &original);
                if let Cow::Owned(content) = rewritten {
                    if content != original {
                        self.write(path, &content)?;
                        report.record_modified(path.clone());
                    }
                }
            }
            report.merge(ChangeReport {
                discovered: files,
                ..ChangeReport::default()
            });
        }

        tracing::debug!(modified = report.modified.len(), "modified files: {:?}", report.modified);
        Ok(report)
    }

    /// Apply a markup rule to every file matching `suffix`
    ///
    /// A file is rewritten only when the rule reports a change. Files are
    /// never deleted here, whatever the rule leaves behind.
    ///
    /// # Errors
    /// - `InvalidModulePath` if `root` is not a directory
    /// - `MalformedMarkup` or `Encoding` if a candidate file cannot be parsed
    /// - `Io` on read or write failure
    pub fn apply_markup_rule(
        &self,
        root: &Path,
        suffix: &str,
        rule: &dyn MarkupRule,
    ) -> Result<ChangeReport, RewriteError> {
        let files = walk_files(root, suffix, self.config)?;
        let mut report = ChangeReport::new();
        for path in &files {
            let mut document = MarkupDocument::read(path)?;
            if !rule.apply(&mut document) {
                continue;
            }
            self.write_markup(path, &document)?;
            report.modified.push(path.clone());
        }
        report.discovered = files;

        tracing::debug!(
            rule = rule.name(),
            modified = report.modified.len(),
            "modified files: {:?}",
            report.modified
        );
        Ok(report)
    }

    /// Promote asset declarations out of the manifest's markup data files
    ///
    /// Each `.xml` entry of `data` is parsed and stripped of legacy asset
    /// inheritance. Harvested paths are merged into `manifest`. A file left
    /// without child elements is deleted and pruned from `data`; otherwise
    /// it is re-serialized. Saving the manifest is up to the caller.
    ///
    /// # Errors
    /// - `InvalidModulePath` if `module_path` is not a directory
    /// - `MalformedMarkup`, `Encoding` or `Io` for a listed data file
    pub fn promote_assets(
        &self,
        module_path: &Path,
        manifest: &mut Manifest,
        views: &[&str],
    ) -> Result<ChangeReport, RewriteError> {
        if !module_path.is_dir() {
            return Err(RewriteError::InvalidModulePath(module_path.to_path_buf()));
        }

        let entries: Vec<String> = manifest
            .data()
            .iter()
            .filter(|entry| entry.ends_with(MARKUP_SUFFIX))
            .cloned()
            .collect();

        let mut report = ChangeReport::new();
        for entry in entries {
            let path = module_path.join(&entry);
            report.discovered.push(path.clone());

            let mut document = MarkupDocument::read(&path)?;
            let promotion = promote_asset_declarations(&mut document, views);
            if !promotion.updated {
                continue;
            }
            manifest.merge_assets(&promotion.assets);
            tracing::debug!(
                file = %entry,
                bundles = ?promotion.assets.keys().collect::<Vec<_>>(),
                "promoted asset declarations"
            );

            if document.root().has_child_elements() {
                self.write_markup(&path, &document)?;
                report.modified.push(path);
            } else {
                self.delete(&path)?;
                manifest.remove_data_file(&entry);
                report.deleted.push(path);
            }
        }

        tracing::debug!(
            modified = report.modified.len(),
            deleted = report.deleted.len(),
            "asset promotion done"
        );
        Ok(report)
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), RewriteError> {
        if self.config.dry_run {
            tracing::debug!(path = %path.display(), "dry run: skipping write");
            return Ok(());
        }
        std::fs::write(path, content).map_err(|e| RewriteError::io_error(path, e))
    }

    fn write_markup(&self, path: &Path, document: &MarkupDocument) -> Result<(), RewriteError> {
        self.write(path, &document.to_xml_string(&self.config.indent))
    }

    fn delete(&self, path: &Path) -> Result<(), RewriteError> {
        if self.config.dry_run {
            tracing::debug!(path = %path.display(), "dry run: skipping delete");
            return Ok(());
        }
        tracing::debug!(path = %path.display(), "deleting emptied file");
        std::fs::remove_file(path).map_err(|e| RewriteError::io_error(path, e))
    }
}

fn read_text(path: &Path) -> Result<String, RewriteError> {
    let bytes = std::fs::read(path).map_err(|e| RewriteError::io_error(path, e))?;
    String::from_utf8(bytes).map_err(|_| RewriteError::encoding(path))
}
