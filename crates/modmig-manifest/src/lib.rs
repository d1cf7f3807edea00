//! Module manifest handling
//!
//! A manifest is the module's declaration file: an executable literal
//! mapping listing metadata and bundled resources. This crate provides:
//!
//! - **Reading**: [`parse_literal`] turns declaration-literal text into an
//!   order-preserving mapping
//! - **Typing**: [`Manifest`] exposes `data`, `assets` and the legacy `qweb`
//!   key with mutation methods that track whether anything changed
//! - **Writing**: [`to_literal_string`] renders the mapping back with
//!   `True`/`False`/`None` spellings
//! - **Collaborator**: [`ManifestTools`] abstracts file access; the
//!   filesystem implementation is [`FsManifestTools`]
//!
//! # Example
//!
//! ```rust,no_run
//! use modmig_manifest::{FsManifestTools, Manifest};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), modmig_manifest::ManifestError> {
//! let path = Path::new("my_module/__manifest__.py");
//! let mut manifest = Manifest::load(&FsManifestTools, path)?;
//! if manifest.migrate_legacy_qweb() {
//!     manifest.save(&FsManifestTools, path)?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod format;
pub mod literal;
pub mod manifest;
pub mod tools;

pub use error::{ManifestError, ManifestResult};
pub use format::{to_literal_string, LiteralFormatter};
pub use literal::{parse_literal, LiteralError};
pub use manifest::{
    AssetBundles, AssetEntry, Manifest, ASSETS_KEY, DATA_KEY, QWEB_BUNDLE, QWEB_KEY,
};
pub use tools::{FsManifestTools, ManifestTools};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
