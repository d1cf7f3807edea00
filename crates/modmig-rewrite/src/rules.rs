//! Structural markup rules
//!
//! A [`MarkupRule`] mutates a parsed document in place and reports whether
//! it changed anything. The applier uses that flag, not a content diff, to
//! decide whether to write the file back.

use crate::markup::MarkupDocument;
use std::fmt;

/// In-place markup transformation
pub trait MarkupRule: fmt::Debug {
    /// Rule name, used in logs
    fn name(&self) -> &str;

    /// Transform the document; `true` if any node or attribute changed
    fn apply(&self, document: &mut MarkupDocument) -> bool;
}

/// Rename deprecated attributes on every element
///
/// Several old names may map to the same new name. If an element carries
/// more than one of them, the last rename listed wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRename {
    name: String,
    renames: Vec<(String, String)>,
}

impl AttributeRename {
    /// Create rule from `(old, new)` pairs
    #[must_use]
    pub fn new(name: impl Into<String>, renames: &[(&str, &str)]) -> Self {
        Self {
            name: name.into(),
            renames: renames
                .iter()
                .map(|(old, new)| ((*old).to_string(), (*new).to_string()))
                .collect(),
        }
    }

    /// `(old, new)` pairs in application order
    #[inline]
    #[must_use]
    pub fn renames(&self) -> &[(String, String)] {
        &self.renames
    }
}

impl MarkupRule for AttributeRename {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, document: &mut MarkupDocument) -> bool {
        let mut updated = false;
        document.root_mut().visit_mut(&mut |element| {
            for (old, new) in &self.renames {
                if let Some(value) = element.remove_attr(old) {
                    element.remove_attr(new);
                    element.set_attr(new.as_str(), value);
                    updated = true;
                }
            }
        });
        updated
    }
}
