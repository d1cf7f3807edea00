use modmig_manifest::{FsManifestTools, Manifest};
use modmig_rewrite::{
    walk_files, AttributeRename, RewriteConfig, RewriteError, RuleApplier, Substitution,
    TextRule, LEGACY_ASSET_VIEWS, MARKUP_SUFFIX,
};
use modmig_test_utils::{manifest_with_data, ModuleFixture};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const IR_MODEL: &str = r#"self\.env\[\s*["']ir\.model["']\s*\]"#;

fn t_out() -> AttributeRename {
    AttributeRename::new("t-out", &[("t-esc", "t-out"), ("t-raw", "t-out")])
}

#[test]
fn test_sudo_appended_once() {
    let module = ModuleFixture::new("sale_ext");
    module.write("models/a.py", "records = self.env[\"ir.model\"].search([])\n");
    module.write("models/b.py", "records = self.env[\"ir.model\"].sudo().search([])\n");

    let rule = TextRule::new(
        "ir_model_sudo",
        ".py",
        Substitution::ensure_suffix(IR_MODEL, ".sudo()").unwrap(),
    );
    let config = RewriteConfig::default();
    let report = RuleApplier::new(&config)
        .apply_text_rules(module.path(), &[rule])
        .unwrap();

    assert_eq!(report.modified, [module.file("models/a.py")]);
    assert_eq!(
        module.read("models/a.py"),
        "records = self.env[\"ir.model\"].sudo().search([])\n"
    );
    assert_eq!(
        module.read("models/b.py"),
        "records = self.env[\"ir.model\"].sudo().search([])\n"
    );
}

#[test]
fn test_rules_for_different_suffixes_touch_their_own_files() {
    let module = ModuleFixture::new("mail_ext");
    module.write("tests/test_mail.py", "class T(SavepointCase): pass\n");
    module.write("data/mail.xml", "<odoo><p>Dear ${object.name}</p></odoo>\n");

    let rules = [
        TextRule::new(
            "savepoint_case",
            ".py",
            Substitution::literal("SavepointCase", "TransactionCase"),
        ),
        TextRule::new(
            "qweb_placeholders",
            ".xml",
            Substitution::pattern(r"\$\{(.*?)\}", "{{${1}}}").unwrap(),
        ),
    ];
    let config = RewriteConfig::default();
    let report = RuleApplier::new(&config)
        .apply_text_rules(module.path(), &rules)
        .unwrap();

    assert_eq!(report.modified.len(), 2);
    assert_eq!(module.read("tests/test_mail.py"), "class T(TransactionCase): pass\n");
    assert_eq!(module.read("data/mail.xml"), "<odoo><p>Dear {{object.name}}</p></odoo>\n");
}

#[test]
fn test_rename_applied_twice_is_stable() {
    let module = ModuleFixture::new("web_ext");
    module.write(
        "static/src/xml/widget.xml",
        r#"<templates><t t-name="w"><span t-esc="a"/><div t-raw="b"/></t></templates>"#,
    );
    let config = RewriteConfig::default();
    let applier = RuleApplier::new(&config);

    let first = applier
        .apply_markup_rule(module.path(), MARKUP_SUFFIX, &t_out())
        .unwrap();
    assert_eq!(first.modified.len(), 1);
    let once = module.read("static/src/xml/widget.xml");
    assert!(once.contains(r#"<span t-out="a"/>"#));
    assert!(once.contains(r#"<div t-out="b"/>"#));
    assert!(!once.contains("t-esc"));
    assert!(!once.contains("t-raw"));

    let second = applier
        .apply_markup_rule(module.path(), MARKUP_SUFFIX, &t_out())
        .unwrap();
    assert!(second.is_empty());
    assert_eq!(module.read("static/src/xml/widget.xml"), once);
}

#[test]
fn test_renames_never_delete_files() {
    let module = ModuleFixture::new("label_ext");
    module.write("static/src/xml/label.xml", r#"<span t-esc="record.name">fallback</span>"#);
    module.write("views/rec.xml", r#"<record id="r" groups_id="base.group_user"/>"#);
    let config = RewriteConfig::default();
    let applier = RuleApplier::new(&config);

    let renamed = applier
        .apply_markup_rule(module.path(), MARKUP_SUFFIX, &t_out())
        .unwrap();
    assert!(renamed.deleted.is_empty());
    assert!(module.exists("static/src/xml/label.xml"));
    assert!(module
        .read("static/src/xml/label.xml")
        .contains(r#"<span t-out="record.name">fallback</span>"#));

    let groups = AttributeRename::new("groups", &[("groups_id", "groups")]);
    let regrouped = applier
        .apply_markup_rule(module.path(), MARKUP_SUFFIX, &groups)
        .unwrap();
    assert!(regrouped.deleted.is_empty());
    assert_eq!(regrouped.modified, [module.file("views/rec.xml")]);
    assert!(module
        .read("views/rec.xml")
        .contains(r#"<record id="r" groups="base.group_user"/>"#));
}

#[test]
fn test_untouched_markup_is_byte_identical() {
    let module = ModuleFixture::new("plain");
    let source = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<odoo>\n    <template id=\"page\" inherit_id=\"website.layout\">\n        <div class=\"x\"/>\n    </template>\n</odoo>\n";
    module.write("views/page.xml", source);
    module.write_manifest(&manifest_with_data("plain", &["views/page.xml"]));

    let config = RewriteConfig::default();
    let applier = RuleApplier::new(&config);
    let renamed = applier
        .apply_markup_rule(module.path(), MARKUP_SUFFIX, &t_out())
        .unwrap();
    let mut manifest = Manifest::load(&FsManifestTools, &module.manifest_path()).unwrap();
    let promoted = applier
        .promote_assets(module.path(), &mut manifest, LEGACY_ASSET_VIEWS)
        .unwrap();

    assert!(renamed.is_empty());
    assert!(promoted.is_empty());
    assert!(!manifest.is_modified());
    assert_eq!(module.read("views/page.xml"), source);
}

#[test]
fn test_asset_only_file_is_deleted_and_promoted() {
    let module = ModuleFixture::new("theme_ext");
    module.write(
        "views/assets.xml",
        r#"<odoo><data inherit_id="web.assets_backend"><xpath expr="//head" position="inside"><script src="foo.js"/></xpath></data></odoo>"#,
    );
    module.write_manifest(&manifest_with_data("theme_ext", &["views/assets.xml"]));

    let config = RewriteConfig::default();
    let mut manifest = Manifest::load(&FsManifestTools, &module.manifest_path()).unwrap();
    let report = RuleApplier::new(&config)
        .promote_assets(module.path(), &mut manifest, LEGACY_ASSET_VIEWS)
        .unwrap();
    manifest.save(&FsManifestTools, &module.manifest_path()).unwrap();

    assert_eq!(report.deleted, [module.file("views/assets.xml")]);
    assert!(!module.exists("views/assets.xml"));

    let reloaded = Manifest::load(&FsManifestTools, &module.manifest_path()).unwrap();
    assert!(reloaded.data().is_empty());
    assert_eq!(reloaded.bundle_paths("web.assets_backend"), ["foo.js"]);
}

#[test]
fn test_dead_bundle_template_file_is_deleted() {
    let module = ModuleFixture::new("dead_assets");
    module.write(
        "views/assets.xml",
        r#"<odoo><template id="a" inherit_id="web.assets_backend"/></odoo>"#,
    );
    module.write_manifest(&manifest_with_data("dead_assets", &["views/assets.xml"]));

    let config = RewriteConfig::default();
    let mut manifest = Manifest::load(&FsManifestTools, &module.manifest_path()).unwrap();
    let report = RuleApplier::new(&config)
        .promote_assets(module.path(), &mut manifest, LEGACY_ASSET_VIEWS)
        .unwrap();

    assert_eq!(report.deleted, [module.file("views/assets.xml")]);
    assert!(!module.exists("views/assets.xml"));
    assert!(manifest.is_modified());
    assert!(manifest.data().is_empty());
}

#[test]
fn test_invalid_module_path() {
    let module = ModuleFixture::new("gone");
    let missing = module.file("not_here");
    let config = RewriteConfig::default();
    let err = RuleApplier::new(&config)
        .apply_markup_rule(&missing, MARKUP_SUFFIX, &t_out())
        .unwrap_err();
    assert!(matches!(err, RewriteError::InvalidModulePath(path) if path == missing));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_walker_counts_matching_files(n in 0usize..6, m in 0usize..6, depth in 0usize..4) {
        let module = ModuleFixture::new("counted");
        let dir = "nested/".repeat(depth);
        for i in 0..n {
            module.write(&format!("{dir}view_{i}.xml"), "<odoo/>");
        }
        for i in 0..m {
            module.write(&format!("{dir}model_{i}.py"), "");
        }
        let files = walk_files(module.path(), ".xml", &RewriteConfig::default()).unwrap();
        prop_assert_eq!(files.len(), n);
    }
}
