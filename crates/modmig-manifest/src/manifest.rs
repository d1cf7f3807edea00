//! Typed manifest
//!
//! A module manifest is an ordered mapping of declaration keys. Three keys
//! matter for migrations and get typed storage; everything else is carried
//! through untouched in its original position:
//!
//! - `data`: ordered list of data file paths relative to the module root
//! - `assets`: ordered mapping of bundle name to bundle entries
//! - `qweb`: legacy list of template files, folded into `assets`

use crate::error::ManifestError;
use crate::format::to_literal_string;
use crate::tools::ManifestTools;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::path::Path;

/// Manifest key listing data files
pub const DATA_KEY: &str = "data";
/// Manifest key mapping bundle names to entries
pub const ASSETS_KEY: &str = "assets";
/// Legacy manifest key listing template files
pub const QWEB_KEY: &str = "qweb";
/// Bundle receiving the contents of the legacy `qweb` key
pub const QWEB_BUNDLE: &str = "web.assets_qweb";

/// One entry of an asset bundle
#[derive(Debug, Clone, PartialEq)]
pub enum AssetEntry {
    /// Plain file path or glob
    Path(String),
    /// Bundle directive such as `("include", "web._assets_helpers")`
    Directive(Vec<Value>),
}

impl AssetEntry {
    /// File path, if this entry is a plain path
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> Option<&str> {
        match self {
            Self::Path(path) => Some(path),
            Self::Directive(_) => None,
        }
    }

    fn from_value(bundle: &str, value: Value) -> Result<Self, ManifestError> {
        match value {
            Value::String(path) => Ok(Self::Path(path)),
            Value::Array(items) => Ok(Self::Directive(items)),
            _ => Err(ManifestError::invalid_entry(
                format!("{ASSETS_KEY}.{bundle}"),
                "a list of paths or directives",
            )),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Path(path) => Value::String(path.clone()),
            Self::Directive(items) => Value::Array(items.clone()),
        }
    }
}

impl From<String> for AssetEntry {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<&str> for AssetEntry {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

/// Asset bundles keyed by bundle name, in declaration order
pub type AssetBundles = IndexMap<String, Vec<AssetEntry>>;

/// Module manifest with typed access to the keys migrations restructure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    data: Option<Vec<String>>,
    assets: Option<AssetBundles>,
    qweb: Option<Vec<String>>,
    other: Map<String, Value>,
    /// Key order as declared; keys added later are appended
    order: Vec<String>,
    modified: bool,
}

impl Manifest {
    /// Create empty manifest
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build typed manifest from a generic mapping
    ///
    /// # Errors
    /// `ManifestError::InvalidEntry` if `data`, `qweb` or `assets` have the
    /// wrong shape.
    pub fn from_mapping(mapping: Map<String, Value>) -> Result<Self, ManifestError> {
        let mut manifest = Self::new();
        for (key, value) in mapping {
            match key.as_str() {
                DATA_KEY => manifest.data = Some(string_list(&key, value)?),
                QWEB_KEY => manifest.qweb = Some(string_list(&key, value)?),
                ASSETS_KEY => manifest.assets = Some(asset_bundles(value)?),
                _ => {
                    manifest.other.insert(key.clone(), value);
                }
            }
            manifest.order.push(key);
        }
        Ok(manifest)
    }

    /// Generic mapping in declaration order
    #[must_use]
    pub fn to_mapping(&self) -> Map<String, Value> {
        let mut mapping = Map::new();
        for key in &self.order {
            let value = match key.as_str() {
                DATA_KEY => self.data.as_ref().map(|data| string_list_value(data)),
                QWEB_KEY => self.qweb.as_ref().map(|qweb| string_list_value(qweb)),
                ASSETS_KEY => self.assets.as_ref().map(asset_bundles_value),
                _ => self.other.get(key).cloned(),
            };
            if let Some(value) = value {
                mapping.insert(key.clone(), value);
            }
        }
        mapping
    }

    /// Load manifest through the tools collaborator
    ///
    /// # Errors
    /// Propagates read, parse and shape errors.
    pub fn load(tools: &dyn ManifestTools, path: &Path) -> Result<Self, ManifestError> {
        let manifest = Self::from_mapping(tools.read_manifest(path)?)?;
        tracing::debug!(path = %path.display(), keys = manifest.order.len(), "loaded manifest");
        Ok(manifest)
    }

    /// Render and write manifest through the tools collaborator
    ///
    /// Clears the modified flag on success.
    ///
    /// # Errors
    /// Propagates render and write errors.
    pub fn save(&mut self, tools: &dyn ManifestTools, path: &Path) -> Result<(), ManifestError> {
        let text = self.to_literal_text()?;
        tools.write_content(path, &text)?;
        self.modified = false;
        tracing::debug!(path = %path.display(), "saved manifest");
        Ok(())
    }

    /// Render as declaration-literal text
    ///
    /// # Errors
    /// `ManifestError::Render` if serialization fails.
    pub fn to_literal_text(&self) -> Result<String, ManifestError> {
        to_literal_string(&Value::Object(self.to_mapping()))
            .map_err(|e| ManifestError::Render(e.to_string()))
    }

    /// Data file paths (empty if the key is absent)
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[String] {
        self.data.as_deref().unwrap_or_default()
    }

    /// Legacy template files, if the `qweb` key is present
    #[inline]
    #[must_use]
    pub fn qweb(&self) -> Option<&[String]> {
        self.qweb.as_deref()
    }

    /// Asset bundles, if the `assets` key is present
    #[inline]
    #[must_use]
    pub fn assets(&self) -> Option<&AssetBundles> {
        self.assets.as_ref()
    }

    /// Entries of one bundle
    #[must_use]
    pub fn bundle(&self, name: &str) -> Option<&[AssetEntry]> {
        self.assets.as_ref()?.get(name).map(Vec::as_slice)
    }

    /// Plain paths of one bundle, skipping directives
    #[must_use]
    pub fn bundle_paths(&self, name: &str) -> Vec<&str> {
        self.bundle(name)
            .unwrap_or_default()
            .iter()
            .filter_map(AssetEntry::as_path)
            .collect()
    }

    /// Any other key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.other.get(key)
    }

    /// Whether a key is declared
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }

    /// Whether any mutation changed the manifest since load or save
    #[inline]
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Set data file list, declaring the key if needed
    pub fn set_data(&mut self, data: Vec<String>) {
        self.declare(DATA_KEY);
        self.data = Some(data);
        self.modified = true;
    }

    /// Append paths to a bundle, creating the bundle if absent
    ///
    /// Paths are not deduplicated; callers only add what they discover.
    pub fn add_assets<I, P>(&mut self, bundle: &str, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<AssetEntry>,
    {
        self.declare(ASSETS_KEY);
        let bundles = self.assets.get_or_insert_with(IndexMap::new);
        if !bundles.contains_key(bundle) {
            bundles.insert(bundle.to_string(), Vec::new());
            self.modified = true;
        }
        let entries = bundles.entry(bundle.to_string()).or_default();
        let before = entries.len();
        entries.extend(paths.into_iter().map(Into::into));
        if entries.len() != before {
            self.modified = true;
        }
    }

    /// Merge discovered bundle contributions, in their order
    pub fn merge_assets(&mut self, contributions: &IndexMap<String, Vec<String>>) {
        for (bundle, paths) in contributions {
            self.add_assets(bundle, paths.iter().map(String::as_str));
        }
    }

    /// Move the legacy `qweb` list into the `web.assets_qweb` bundle
    ///
    /// Returns `true` if the key was present.
    pub fn migrate_legacy_qweb(&mut self) -> bool {
        let Some(files) = self.qweb.take() else {
            return false;
        };
        self.order.retain(|key| key != QWEB_KEY);
        self.modified = true;
        self.add_assets(QWEB_BUNDLE, files);
        true
    }

    /// Remove every occurrence of a path from `data`
    ///
    /// Returns `true` if anything was removed.
    pub fn remove_data_file(&mut self, path: &str) -> bool {
        let Some(data) = self.data.as_mut() else {
            return false;
        };
        let before = data.len();
        data.retain(|entry| entry != path);
        let removed = data.len() != before;
        self.modified |= removed;
        removed
    }

    fn declare(&mut self, key: &str) {
        if !self.contains_key(key) {
            self.order.push(key.to_string());
        }
    }
}

fn string_list(key: &str, value: Value) -> Result<Vec<String>, ManifestError> {
    let Value::Array(items) = value else {
        return Err(ManifestError::invalid_entry(key, "a list of strings"));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            _ => Err(ManifestError::invalid_entry(key, "a list of strings")),
        })
        .collect()
}

fn asset_bundles(value: Value) -> Result<AssetBundles, ManifestError> {
    let Value::Object(map) = value else {
        return Err(ManifestError::invalid_entry(ASSETS_KEY, "a mapping of bundles"));
    };
    map.into_iter()
        .map(|(bundle, entries)| {
            let Value::Array(items) = entries else {
                return Err(ManifestError::invalid_entry(
                    format!("{ASSETS_KEY}.{bundle}"),
                    "a list of paths or directives",
                ));
            };
            let entries = items
                .into_iter()
                .map(|item| AssetEntry::from_value(&bundle, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((bundle, entries))
        })
        .collect()
}

fn string_list_value(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

fn asset_bundles_value(bundles: &AssetBundles) -> Value {
    Value::Object(
        bundles
            .iter()
            .map(|(bundle, entries)| {
                let entries = entries.iter().map(AssetEntry::to_value).collect();
                (bundle.clone(), Value::Array(entries))
            })
            .collect(),
    )
}
