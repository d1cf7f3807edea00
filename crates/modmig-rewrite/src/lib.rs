//! Rewrite engine for module migrations
//!
//! Walks a module directory, applies rewrite rules to matching files, and
//! reports which files changed. Two kinds of rules exist:
//!
//! - **Text rules** ([`TextRule`]): a file-name suffix plus a pure
//!   content-to-content [`Substitution`]
//! - **Markup rules** ([`MarkupRule`]): in-place transformations of a parsed
//!   [`MarkupDocument`] that report whether they changed anything
//!
//! The [`RuleApplier`] runs either kind over a module and only writes files
//! whose content actually changed. [`promote_asset_declarations`] moves
//! legacy inheritance-based asset declarations into manifest bundles.
//!
//! # Example
//!
//! ```rust,no_run
//! use modmig_rewrite::{RewriteConfig, RuleApplier, Substitution, TextRule};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), modmig_rewrite::RewriteError> {
//! let config = RewriteConfig::default();
//! let rule = TextRule::new(
//!     "savepoint_case",
//!     ".py",
//!     Substitution::literal("SavepointCase", "TransactionCase"),
//! );
//! let report = RuleApplier::new(&config).apply_text_rules(Path::new("my_module"), &[rule])?;
//! println!("{} files modified", report.modified.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod applier;
pub mod assets;
pub mod config;
pub mod error;
pub mod markup;
pub mod rules;
pub mod text;
pub mod walker;

pub use applier::{ChangeReport, RuleApplier, MARKUP_SUFFIX};
pub use assets::{promote_asset_declarations, Promotion, LEGACY_ASSET_VIEWS};
pub use config::RewriteConfig;
pub use error::{RewriteError, RewriteResult};
pub use markup::{Element, MarkupDocument, Node};
pub use rules::{AttributeRename, MarkupRule};
pub use text::{apply_all, Substitution, TextRule};
pub use walker::walk_files;
