//! Asset declaration promotion
//!
//! Older modules registered front-end files by inheriting an asset bundle
//! view and inserting `<script src>`/`<link href>` nodes through `xpath`
//! insertion points. Newer manifests list them under `assets` instead.
//! [`promote_asset_declarations`] harvests those references from a markup
//! document and removes the nodes that carried them.
//!
//! Removal is two-pass: indices are collected while scanning and removed
//! afterwards, from the back, so no live iterator ever sees a shifting
//! child list.

use crate::markup::{Element, MarkupDocument, Node};
use indexmap::IndexMap;

/// Attribute naming the inherited view
pub const INHERIT_ID: &str = "inherit_id";

/// Legacy asset bundle views whose inheritance declares assets
pub const LEGACY_ASSET_VIEWS: &[&str] = &[
    "web.assets_backend",
    "web.assets_common",
    "web.assets_frontend",
    "web.assets_qweb",
    "web.assets_tests",
    "website.assets_frontend",
    "website.assets_editor",
    "website.assets_frontend_editor",
    "website.assets_wysiwyg",
    "web_enterprise.assets_backend",
    "web_enterprise.assets_common",
    "web_enterprise._assets_backend_helpers",
];

/// Outcome of promoting one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Promotion {
    /// File paths per bundle, in document order
    pub assets: IndexMap<String, Vec<String>>,
    /// Whether any node was removed from the document
    pub updated: bool,
}

impl Promotion {
    fn record(&mut self, bundle: &str, path: String) {
        self.assets.entry(bundle.to_string()).or_default().push(path);
        self.updated = true;
    }
}

/// Move asset references out of bundle-inheriting templates
///
/// For every element whose `inherit_id` is in `views`, each `xpath` child
/// with an `expr` attribute gives up its children carrying `src` (or else
/// `href`). Those `xpath` nodes are dropped once they hold no element,
/// whether harvesting emptied them or they were empty to begin with. A
/// template left without child elements goes next, then any ancestor
/// emptied by that. The root is never removed.
pub fn promote_asset_declarations(document: &mut MarkupDocument, views: &[&str]) -> Promotion {
    let mut promotion = Promotion::default();
    promote_within(document.root_mut(), views, &mut promotion);
    promotion
}

/// Returns `true` if removals left `element` without child elements
fn promote_within(element: &mut Element, views: &[&str], promotion: &mut Promotion) -> bool {
    let mut emptied = Vec::new();
    for (index, node) in element.children.iter_mut().enumerate() {
        let Node::Element(child) = node else {
            continue;
        };
        let bundle = child
            .attr(INHERIT_ID)
            .filter(|view| views.contains(view))
            .map(str::to_owned);
        let drained = match bundle {
            Some(bundle) => harvest_template(child, &bundle, promotion),
            None => promote_within(child, views, promotion),
        };
        if drained {
            emptied.push(index);
        }
    }
    promotion.updated |= !emptied.is_empty();
    remove_indices(&mut element.children, &emptied);
    !emptied.is_empty() && !element.has_child_elements()
}

/// Returns `true` if `template` holds no child elements afterwards
fn harvest_template(template: &mut Element, bundle: &str, promotion: &mut Promotion) -> bool {
    let mut emptied = Vec::new();
    for (index, node) in template.children.iter_mut().enumerate() {
        let Node::Element(xpath) = node else {
            continue;
        };
        if xpath.name != "xpath" || !xpath.has_attr("expr") {
            continue;
        }

        let mut harvested = Vec::new();
        for (position, child) in xpath.children.iter().enumerate() {
            if let Some(path) = child.as_element().and_then(asset_reference) {
                promotion.record(bundle, path.to_string());
                harvested.push(position);
            }
        }
        remove_indices(&mut xpath.children, &harvested);
        if !xpath.has_child_elements() {
            emptied.push(index);
        }
    }
    promotion.updated |= !emptied.is_empty();
    remove_indices(&mut template.children, &emptied);
    !template.has_child_elements()
}

/// Referenced file of a `<script src>` / `<link href>` style node
fn asset_reference(element: &Element) -> Option<&str> {
    element
        .attr("src")
        .filter(|src| !src.is_empty())
        .or_else(|| element.attr("href").filter(|href| !href.is_empty()))
}

/// Remove ascending `indices` from `nodes`
fn remove_indices(nodes: &mut Vec<Node>, indices: &[usize]) {
    for index in indices.iter().rev() {
        nodes.remove(*index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn parse(text: &str) -> MarkupDocument {
        MarkupDocument::parse(text, Path::new("assets.xml")).unwrap()
    }

    #[test]
    fn single_script_empties_document() {
        let mut doc = parse(
            r#"<odoo><data inherit_id="web.assets_backend"><xpath expr="//head" position="inside"><script src="foo.js"/></xpath></data></odoo>"#,
        );
        let promotion = promote_asset_declarations(&mut doc, LEGACY_ASSET_VIEWS);
        assert!(promotion.updated);
        assert_eq!(promotion.assets["web.assets_backend"], ["foo.js"]);
        assert!(!doc.root().has_child_elements());
    }

    #[test]
    fn collects_src_and_href_in_order() {
        let mut doc = parse(
            r#"<odoo>
                <template id="assets_backend" inherit_id="web.assets_backend" name="Backend">
                    <xpath expr="." position="inside">
                        <link rel="stylesheet" href="/mod/static/src/scss/a.scss"/>
                        <script type="text/javascript" src="/mod/static/src/js/a.js"/>
                    </xpath>
                </template>
                <template id="assets_frontend" inherit_id="website.assets_frontend">
                    <xpath expr="." position="inside">
                        <script src="/mod/static/src/js/b.js"/>
                    </xpath>
                </template>
            </odoo>"#,
        );
        let promotion = promote_asset_declarations(&mut doc, LEGACY_ASSET_VIEWS);
        assert_eq!(
            promotion.assets["web.assets_backend"],
            ["/mod/static/src/scss/a.scss", "/mod/static/src/js/a.js"]
        );
        assert_eq!(promotion.assets["website.assets_frontend"], ["/mod/static/src/js/b.js"]);
        let bundles: Vec<_> = promotion.assets.keys().cloned().collect();
        assert_eq!(bundles, ["web.assets_backend", "website.assets_frontend"]);
        assert!(!doc.root().has_child_elements());
    }

    #[test]
    fn unrelated_records_survive() {
        let mut doc = parse(
            r#"<odoo><template id="a" inherit_id="web.assets_backend"><xpath expr="." position="inside"><script src="a.js"/></xpath></template><menuitem id="menu_root" name="Root"/><record id="r" model="ir.ui.view"><field name="arch" type="xml"><form/></field></record></odoo>"#,
        );
        let promotion = promote_asset_declarations(&mut doc, LEGACY_ASSET_VIEWS);
        assert!(promotion.updated);
        let names: Vec<_> = doc.root().child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["menuitem", "record"]);
    }

    #[test]
    fn nodes_without_reference_are_kept() {
        let mut doc = parse(
            r#"<odoo><template id="a" inherit_id="web.assets_backend"><xpath expr="." position="inside"><script src="a.js"/><script>console.log(1)</script></xpath></template></odoo>"#,
        );
        let promotion = promote_asset_declarations(&mut doc, LEGACY_ASSET_VIEWS);
        assert_eq!(promotion.assets["web.assets_backend"], ["a.js"]);

        let template = doc.root().child_elements().next().unwrap();
        let xpath = template.child_elements().next().unwrap();
        let kept: Vec<_> = xpath.child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(kept, ["script"]);
        assert!(xpath.child_elements().next().unwrap().attr("src").is_none());
    }

    #[test]
    fn non_asset_views_are_untouched() {
        let text = r#"<odoo><template id="a" inherit_id="web.layout"><xpath expr="." position="inside"><script src="a.js"/></xpath></template></odoo>"#;
        let mut doc = parse(text);
        let before = doc.clone();
        let promotion = promote_asset_declarations(&mut doc, LEGACY_ASSET_VIEWS);
        assert!(!promotion.updated);
        assert!(promotion.assets.is_empty());
        assert_eq!(doc, before);
    }

    #[test]
    fn xpath_without_expr_is_ignored() {
        let mut doc = parse(
            r#"<odoo><template id="a" inherit_id="web.assets_backend"><xpath position="inside"><script src="a.js"/></xpath></template></odoo>"#,
        );
        let promotion = promote_asset_declarations(&mut doc, LEGACY_ASSET_VIEWS);
        assert!(!promotion.updated);
    }

    #[test]
    fn nested_wrapper_is_pruned_when_emptied() {
        let mut doc = parse(
            r#"<odoo><data noupdate="0"><template id="a" inherit_id="web.assets_common"><xpath expr="." position="inside"><link href="a.css"/></xpath></template></data><record id="keep" model="x"/></odoo>"#,
        );
        let promotion = promote_asset_declarations(&mut doc, LEGACY_ASSET_VIEWS);
        assert_eq!(promotion.assets["web.assets_common"], ["a.css"]);
        let names: Vec<_> = doc.root().child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["record"]);
    }

    #[test]
    fn childless_bundle_template_is_removed() {
        let mut doc = parse(
            r#"<odoo><template id="a" inherit_id="web.assets_backend"/><record id="keep" model="x"/></odoo>"#,
        );
        let promotion = promote_asset_declarations(&mut doc, LEGACY_ASSET_VIEWS);
        assert!(promotion.updated);
        assert!(promotion.assets.is_empty());
        let names: Vec<_> = doc.root().child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["record"]);
    }

    #[test]
    fn empty_xpath_is_pruned_with_its_template() {
        let mut doc = parse(
            r#"<odoo><template id="a" inherit_id="web.assets_frontend"><xpath expr="." position="inside"/></template></odoo>"#,
        );
        let promotion = promote_asset_declarations(&mut doc, LEGACY_ASSET_VIEWS);
        assert!(promotion.updated);
        assert!(!doc.root().has_child_elements());
    }

    #[test]
    fn empty_xpath_is_pruned_beside_kept_content() {
        let mut doc = parse(
            r#"<odoo><template id="a" inherit_id="web.assets_backend"><xpath expr="//head" position="inside"/><xpath expr="//body" position="inside"><div class="x"/></xpath></template></odoo>"#,
        );
        let promotion = promote_asset_declarations(&mut doc, LEGACY_ASSET_VIEWS);
        assert!(promotion.updated);
        let template = doc.root().child_elements().next().unwrap();
        let exprs: Vec<_> = template.child_elements().filter_map(|e| e.attr("expr")).collect();
        assert_eq!(exprs, ["//body"]);
    }

    #[test]
    fn empty_src_falls_back_to_href() {
        let element = Element::new("link").with_attr("src", "").with_attr("href", "b.css");
        assert_eq!(asset_reference(&element), Some("b.css"));
        assert_eq!(asset_reference(&Element::new("link")), None);
    }
}
