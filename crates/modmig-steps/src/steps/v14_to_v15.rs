//! 14.0 -> 15.0
//!
//! 1. `reformat_assets_definition`: asset inheritance in data files moves
//!    into the manifest `assets` key
//! 2. `reformat_deprecated_tags`: `t-esc`/`t-raw` become `t-out`, test
//!    cases drop `SavepointCase`, `ir.model` access goes through `sudo()`
//!    and `${expr}` mail placeholders become `{{expr}}`
//! 3. `update_manifest_qweb`: the `qweb` key folds into `web.assets_qweb`

use super::MigrationStep;
use crate::error::MigrationError;
use crate::operation::{MigrateLegacyQweb, PromoteAssets, RewriteSources};
use modmig_rewrite::{AttributeRename, Substitution, TextRule, LEGACY_ASSET_VIEWS, MARKUP_SUFFIX};

/// Source version
pub const FROM: &str = "14.0";
/// Target version
pub const TO: &str = "15.0";

/// `self.env["ir.model"]` with either quote style and inner whitespace
const IR_MODEL_ACCESS: &str = r#"self\.env\[\s*["']ir\.model["']\s*\]"#;
/// `${expr}`, shortest match
const DOLLAR_PLACEHOLDER: &str = r"\$\{(.*?)\}";

/// Build the step
///
/// # Errors
/// `MigrationError::Rewrite` if a rule pattern fails to compile.
pub fn step() -> Result<MigrationStep, MigrationError> {
    Ok(MigrationStep::new(FROM, TO)
        .with_operation(PromoteAssets::new(
            "reformat_assets_definition",
            LEGACY_ASSET_VIEWS,
        ))
        .with_operation(deprecated_tags()?)
        .with_operation(MigrateLegacyQweb::new("update_manifest_qweb")))
}

fn deprecated_tags() -> Result<RewriteSources, MigrationError> {
    Ok(RewriteSources::new("reformat_deprecated_tags")
        .with_markup_rule(
            MARKUP_SUFFIX,
            AttributeRename::new("t_out", &[("t-esc", "t-out"), ("t-raw", "t-out")]),
        )
        .with_text_rule(TextRule::new(
            "transaction_case",
            ".py",
            Substitution::literal("SavepointCase", "TransactionCase"),
        ))
        .with_text_rule(TextRule::new(
            "ir_model_sudo",
            ".py",
            Substitution::ensure_suffix(IR_MODEL_ACCESS, ".sudo()")?,
        ))
        .with_text_rule(TextRule::new(
            "mail_placeholders",
            MARKUP_SUFFIX,
            Substitution::pattern(DOLLAR_PLACEHOLDER, "{{${1}}}")?,
        )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_are_ordered() {
        let step = step().unwrap();
        assert_eq!(step.name(), "14.0 -> 15.0");
        assert_eq!(
            step.operation_names(),
            ["reformat_assets_definition", "reformat_deprecated_tags", "update_manifest_qweb"]
        );
    }

    #[test]
    fn text_rules_cover_python_and_markup() {
        let rules = deprecated_tags().unwrap();
        let names: Vec<_> = rules.text_rules().iter().map(|r| (r.name(), r.suffix())).collect();
        assert_eq!(
            names,
            [
                ("transaction_case", ".py"),
                ("ir_model_sudo", ".py"),
                ("mail_placeholders", ".xml"),
            ]
        );
        assert_eq!(rules.markup_rule_names(), ["t_out"]);
    }
}
