//! Migration step registry
//!
//! Provides [`MigrationRegistry`], which maps version transitions to their
//! steps and chains consecutive steps into a migration path.

use crate::context::MigrationContext;
use crate::error::MigrationError;
use crate::steps::{v14_to_v15, v15_to_v16, MigrationStep};
use indexmap::IndexMap;
use modmig_rewrite::ChangeReport;

/// Registry of migration steps keyed by source version
#[derive(Debug, Default)]
pub struct MigrationRegistry {
    steps: IndexMap<String, MigrationStep>,
}

impl MigrationRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            steps: IndexMap::new(),
        }
    }

    /// Create registry with the built-in steps
    ///
    /// # Errors
    /// `MigrationError::Rewrite` if a built-in rule fails to compile.
    pub fn with_defaults() -> Result<Self, MigrationError> {
        let mut registry = Self::new();
        registry.register(v14_to_v15::step()?);
        registry.register(v15_to_v16::step());
        Ok(registry)
    }

    /// Register a step, replacing any step with the same source version
    pub fn register(&mut self, step: MigrationStep) {
        self.steps.insert(step.source_version().to_string(), step);
    }

    /// Step for one direct transition
    #[must_use]
    pub fn step(&self, from: &str, to: &str) -> Option<&MigrationStep> {
        self.steps.get(from).filter(|step| step.target_version() == to)
    }

    /// Consecutive steps leading from `from` to `to`
    ///
    /// Equal versions give an empty path.
    ///
    /// # Errors
    /// - `UnknownVersion` if either version appears in no registered step
    /// - `NoPath` if the steps do not chain from `from` to `to`
    pub fn path(&self, from: &str, to: &str) -> Result<Vec<&MigrationStep>, MigrationError> {
        for version in [from, to] {
            if !self.knows(version) {
                return Err(MigrationError::UnknownVersion(version.to_string()));
            }
        }

        let mut path = Vec::new();
        let mut current = from;
        while current != to {
            let step = self
                .steps
                .get(current)
                .filter(|_| path.len() < self.steps.len())
                .ok_or_else(|| MigrationError::no_path(from, to))?;
            path.push(step);
            current = step.target_version();
        }
        Ok(path)
    }

    /// Run every step from `from` to `to` against `ctx`
    ///
    /// # Errors
    /// Path lookup errors, then the first operation error.
    pub fn migrate(
        &self,
        ctx: &mut MigrationContext<'_>,
        from: &str,
        to: &str,
    ) -> Result<ChangeReport, MigrationError> {
        let path = self.path(from, to)?;
        tracing::info!(
            module = ctx.module_name(),
            from,
            to,
            steps = path.len(),
            "migrating module"
        );
        let mut report = ChangeReport::new();
        for step in path {
            report.merge(step.run(ctx)?);
        }
        Ok(report)
    }

    /// Whether a version starts or ends a registered step
    #[must_use]
    pub fn knows(&self, version: &str) -> bool {
        self.steps
            .values()
            .any(|step| step.source_version() == version || step.target_version() == version)
    }

    /// Iterate over steps in registration order
    pub fn iter(&self) -> impl Iterator<Item = &MigrationStep> {
        self.steps.values()
    }

    /// Get number of registered steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> MigrationRegistry {
        MigrationRegistry::with_defaults().unwrap()
    }

    #[test]
    fn defaults_register_both_steps() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.step("14.0", "15.0").is_some());
        assert!(registry.step("15.0", "16.0").is_some());
        assert!(registry.step("14.0", "16.0").is_none());
    }

    #[test]
    fn path_chains_consecutive_steps() {
        let registry = registry();
        let names: Vec<_> = registry
            .path("14.0", "16.0")
            .unwrap()
            .iter()
            .map(|step| step.name())
            .collect();
        assert_eq!(names, ["14.0 -> 15.0", "15.0 -> 16.0"]);
    }

    #[test]
    fn same_version_is_empty_path() {
        assert!(registry().path("15.0", "15.0").unwrap().is_empty());
    }

    #[test]
    fn unknown_version() {
        let err = registry().path("13.0", "15.0").unwrap_err();
        assert!(matches!(err, MigrationError::UnknownVersion(v) if v == "13.0"));
        let err = registry().path("14.0", "17.0").unwrap_err();
        assert!(matches!(err, MigrationError::UnknownVersion(v) if v == "17.0"));
    }

    #[test]
    fn downgrade_has_no_path() {
        let err = registry().path("16.0", "14.0").unwrap_err();
        assert!(matches!(err, MigrationError::NoPath { .. }));
    }

    #[test]
    fn cycles_terminate() {
        let mut registry = MigrationRegistry::new();
        registry.register(MigrationStep::new("a", "b"));
        registry.register(MigrationStep::new("b", "a"));
        registry.register(MigrationStep::new("c", "d"));
        let err = registry.path("a", "d").unwrap_err();
        assert!(matches!(err, MigrationError::NoPath { .. }));
    }
}
