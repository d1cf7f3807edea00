//! Migration operations
//!
//! An [`Operation`] is one top-level rewrite within a migration step. The
//! built-in kinds cover everything the shipped steps need:
//!
//! - [`PromoteAssets`]: move inheritance-based asset declarations from the
//!   manifest's markup data files into manifest bundles
//! - [`RewriteSources`]: markup rules, then text rules, over the module tree
//! - [`MigrateLegacyQweb`]: fold the legacy `qweb` manifest key into assets

use crate::context::MigrationContext;
use crate::error::MigrationError;
use modmig_rewrite::{ChangeReport, MarkupRule, TextRule};
use std::fmt;

/// One named rewrite operation
pub trait Operation: fmt::Debug {
    /// Operation name, used in logs
    fn name(&self) -> &str;

    /// Run against a module
    ///
    /// # Errors
    /// Any rewrite or manifest failure; nothing is swallowed.
    fn run(&self, ctx: &MigrationContext<'_>) -> Result<ChangeReport, MigrationError>;
}

/// Asset declaration promotion over the manifest's data files
#[derive(Debug, Clone)]
pub struct PromoteAssets {
    name: String,
    views: &'static [&'static str],
}

impl PromoteAssets {
    /// Create operation promoting assets of the given bundle views
    #[must_use]
    pub fn new(name: impl Into<String>, views: &'static [&'static str]) -> Self {
        Self {
            name: name.into(),
            views,
        }
    }
}

impl Operation for PromoteAssets {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &MigrationContext<'_>) -> Result<ChangeReport, MigrationError> {
        let mut manifest = ctx.load_manifest()?;
        let mut report = ctx
            .applier()
            .promote_assets(ctx.module_path(), &mut manifest, self.views)?;
        ctx.save_manifest(&mut manifest, &mut report)?;
        Ok(report)
    }
}

/// Markup rules followed by text rules
///
/// Markup rules run first, each over every file matching its suffix. Files
/// are rewritten in place and never deleted.
#[derive(Debug, Default)]
pub struct RewriteSources {
    name: String,
    markup_rules: Vec<(String, Box<dyn MarkupRule>)>,
    text_rules: Vec<TextRule>,
}

impl RewriteSources {
    /// Create operation without rules
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a markup rule for files ending in `suffix`
    #[must_use]
    pub fn with_markup_rule(
        mut self,
        suffix: impl Into<String>,
        rule: impl MarkupRule + 'static,
    ) -> Self {
        self.markup_rules.push((suffix.into(), Box::new(rule)));
        self
    }

    /// Add a text rule
    #[must_use]
    pub fn with_text_rule(mut self, rule: TextRule) -> Self {
        self.text_rules.push(rule);
        self
    }

    /// Text rules in application order
    #[inline]
    #[must_use]
    pub fn text_rules(&self) -> &[TextRule] {
        &self.text_rules
    }

    /// Names of the markup rules in application order
    #[must_use]
    pub fn markup_rule_names(&self) -> Vec<&str> {
        self.markup_rules.iter().map(|(_, rule)| rule.name()).collect()
    }
}

impl Operation for RewriteSources {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &MigrationContext<'_>) -> Result<ChangeReport, MigrationError> {
        let applier = ctx.applier();
        let mut report = ChangeReport::new();
        for (suffix, rule) in &self.markup_rules {
            report.merge(applier.apply_markup_rule(ctx.module_path(), suffix, rule.as_ref())?);
        }
        if !self.text_rules.is_empty() {
            report.merge(applier.apply_text_rules(ctx.module_path(), &self.text_rules)?);
        }
        Ok(report)
    }
}

/// Legacy `qweb` manifest key migration
#[derive(Debug, Clone)]
pub struct MigrateLegacyQweb {
    name: String,
}

impl MigrateLegacyQweb {
    /// Create operation
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Operation for MigrateLegacyQweb {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &MigrationContext<'_>) -> Result<ChangeReport, MigrationError> {
        let mut manifest = ctx.load_manifest()?;
        let mut report = ChangeReport::new();
        report.discovered.push(ctx.manifest_path().to_path_buf());
        if manifest.migrate_legacy_qweb() {
            tracing::debug!(module = ctx.module_name(), "moved qweb key into web.assets_qweb");
            ctx.save_manifest(&mut manifest, &mut report)?;
        }
        Ok(report)
    }
}
