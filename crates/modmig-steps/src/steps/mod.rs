//! Migration steps
//!
//! A [`MigrationStep`] is the ordered operation list for one version
//! transition. Order matters: asset promotion must run before anything that
//! relies on the manifest's final shape.

pub mod v14_to_v15;
pub mod v15_to_v16;

use crate::context::MigrationContext;
use crate::error::MigrationError;
use crate::operation::Operation;
use modmig_rewrite::ChangeReport;

/// Ordered operations for one version transition
#[derive(Debug)]
pub struct MigrationStep {
    from: String,
    to: String,
    operations: Vec<Box<dyn Operation>>,
}

impl MigrationStep {
    /// Create empty step
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            operations: Vec::new(),
        }
    }

    /// Append an operation
    #[must_use]
    pub fn with_operation(mut self, operation: impl Operation + 'static) -> Self {
        self.operations.push(Box::new(operation));
        self
    }

    /// Source version
    #[inline]
    #[must_use]
    pub fn source_version(&self) -> &str {
        &self.from
    }

    /// Target version
    #[inline]
    #[must_use]
    pub fn target_version(&self) -> &str {
        &self.to
    }

    /// Step name, e.g. `14.0 -> 15.0`
    #[must_use]
    pub fn name(&self) -> String {
        format!("{} -> {}", self.from, self.to)
    }

    /// Operation names in run order
    #[must_use]
    pub fn operation_names(&self) -> Vec<&str> {
        self.operations.iter().map(|op| op.name()).collect()
    }

    /// Run every operation in order, then record the step in `ctx`
    ///
    /// # Errors
    /// The first operation error; later operations do not run.
    pub fn run(&self, ctx: &mut MigrationContext<'_>) -> Result<ChangeReport, MigrationError> {
        let name = self.name();
        tracing::info!(module = ctx.module_name(), step = %name, "applying migration step");

        let mut report = ChangeReport::new();
        for operation in &self.operations {
            let span = tracing::info_span!(
                "operation",
                module = ctx.module_name(),
                operation = operation.name()
            );
            let _guard = span.enter();
            let outcome = operation.run(ctx)?;
            tracing::info!(
                modified = outcome.modified.len(),
                deleted = outcome.deleted.len(),
                "operation finished"
            );
            report.merge(outcome);
        }

        ctx.record_step(name);
        Ok(report)
    }
}
