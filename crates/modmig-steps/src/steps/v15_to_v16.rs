//! 15.0 -> 16.0
//!
//! 1. `reformat_deprecated_tags_xml`: `groups_id` attributes become `groups`
//! 2. `reformat_deprecated_tags_py`: renamed ORM methods

use super::MigrationStep;
use crate::operation::RewriteSources;
use modmig_rewrite::{AttributeRename, Substitution, TextRule, MARKUP_SUFFIX};

/// Source version
pub const FROM: &str = "15.0";
/// Target version
pub const TO: &str = "16.0";

/// `(rule name, old, new)`, applied in order
const PY_RENAMES: &[(&str, &str, &str)] = &[
    ("get_view", "fields_view_get", "get_view"),
    ("get_external_id", "get_xml_id", "get_external_id"),
    ("invalidate_recordset", "invalidate_cache", "invalidate_recordset"),
    ("flush_model", "flush()", "flush_model()"),
    ("flush_recordset", "recompute()", "flush_recordset()"),
];

/// Build the step
#[must_use]
pub fn step() -> MigrationStep {
    let xml = RewriteSources::new("reformat_deprecated_tags_xml").with_markup_rule(
        MARKUP_SUFFIX,
        AttributeRename::new("groups", &[("groups_id", "groups")]),
    );
    let py = PY_RENAMES
        .iter()
        .fold(RewriteSources::new("reformat_deprecated_tags_py"), |op, (name, from, to)| {
            op.with_text_rule(TextRule::new(*name, ".py", Substitution::literal(*from, *to)))
        });
    MigrationStep::new(FROM, TO).with_operation(xml).with_operation(py)
}
