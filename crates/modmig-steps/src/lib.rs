//! Migration steps for module version transitions
//!
//! Each supported transition is a [`MigrationStep`]: an ordered list of
//! [`Operation`]s run against one module through a [`MigrationContext`].
//! The [`MigrationRegistry`] selects steps and chains them, so migrating
//! from 14.0 to 16.0 runs the 14.0 -> 15.0 step and then 15.0 -> 16.0.
//!
//! # Example
//!
//! ```rust,no_run
//! use modmig_manifest::FsManifestTools;
//! use modmig_steps::{MigrationContext, MigrationRegistry};
//!
//! # fn example() -> Result<(), modmig_steps::MigrationError> {
//! let registry = MigrationRegistry::with_defaults()?;
//! let mut ctx = MigrationContext::new("addons/my_module", &FsManifestTools);
//! let report = registry.migrate(&mut ctx, "14.0", "16.0")?;
//! println!("{} modified, {} deleted", report.modified.len(), report.deleted.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod context;
pub mod error;
pub mod operation;
pub mod registry;
pub mod steps;

pub use context::MigrationContext;
pub use error::{MigrationError, MigrationResult};
pub use operation::{MigrateLegacyQweb, Operation, PromoteAssets, RewriteSources};
pub use registry::MigrationRegistry;
pub use steps::MigrationStep;
