//! Testing utilities for the modmig workspace
//!
//! On-disk module fixtures backed by a temporary directory.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const MANIFEST_NAME: &str = "__manifest__.py";

/// Module directory living under a temporary root
///
/// The directory is removed when the fixture is dropped.
pub struct ModuleFixture {
    _root: TempDir,
    path: PathBuf,
    name: String,
}

impl ModuleFixture {
    pub fn new(name: &str) -> Self {
        let root = TempDir::new().unwrap();
        let path = root.path().join(name);
        std::fs::create_dir_all(&path).unwrap();
        Self {
            _root: root,
            path,
            name: name.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.file(MANIFEST_NAME)
    }

    /// Write a file, creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> &Self {
        let path = self.file(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
        self
    }

    pub fn write_manifest(&self, content: &str) -> &Self {
        self.write(MANIFEST_NAME, content)
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.file(relative)).unwrap()
    }

    pub fn read_manifest(&self) -> String {
        self.read(MANIFEST_NAME)
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.file(relative).exists()
    }
}

/// Manifest declaring only a name and the given data files
pub fn manifest_with_data(name: &str, data: &[&str]) -> String {
    let entries: String = data.iter().map(|d| format!("        '{d}',\n")).collect();
    format!("{{\n    'name': '{name}',\n    'data': [\n{entries}    ],\n    'installable': True,\n}}\n")
}
