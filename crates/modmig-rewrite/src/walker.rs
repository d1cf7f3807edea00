//! File walker
//!
//! Recursive discovery of candidate files below a module root. Results are
//! sorted by file name at every level so a run over an unchanged tree always
//! sees the same order.

use crate::config::RewriteConfig;
use crate::error::RewriteError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect every file below `root` whose name ends with `suffix`
///
/// `suffix` is matched against the file name, so `".xml"` finds
/// `views/a.xml` at any depth. Directories named in
/// [`RewriteConfig::ignored_dirs`] are not entered.
///
/// # Errors
/// - `RewriteError::InvalidModulePath` if `root` is missing or not a directory
/// - `RewriteError::Walk` if a directory below the root cannot be read
pub fn walk_files(
    root: &Path,
    suffix: &str,
    config: &RewriteConfig,
) -> Result<Vec<PathBuf>, RewriteError> {
    if !root.is_dir() {
        return Err(RewriteError::InvalidModulePath(root.to_path_buf()));
    }

    let entries = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !config.is_ignored_dir(entry.file_name())
        });

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RewriteError::Walk {
            path: e.path().unwrap_or(root).to_path_buf(),
            message: e.to_string(),
        })?;
        if entry.file_type().is_file() && entry.file_name().to_string_lossy().ends_with(suffix) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!(
        root = %root.display(),
        suffix,
        count = files.len(),
        "{suffix} files found: {:?}",
        files
    );
    Ok(files)
}
