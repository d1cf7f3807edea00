//! Markup document
//!
//! An owned element tree built from `quick-xml` events, one per file.
//!
//! Parsing discards insignificant whitespace: whitespace-only text inside
//! an element is dropped unless that element also holds real text (mixed
//! content keeps its spacing). Serialization always emits an XML
//! declaration and re-indents element-only content; mixed content is
//! written inline exactly as parsed.

use crate::error::RewriteError;
use indexmap::IndexMap;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

/// Declaration written at the top of every serialized document
pub const XML_DECLARATION: &str = "<?xml version='1.0' encoding='utf-8'?>";

/// Node of a markup tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Nested element
    Element(Element),
    /// Character data, unescaped
    Text(String),
    /// CDATA section content
    CData(String),
    /// Comment content
    Comment(String),
    /// Processing instruction content
    ProcessingInstruction(String),
    /// Document type declaration content
    DocType(String),
}

impl Node {
    /// Element, if this node is one
    #[inline]
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Mutable element, if this node is one
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// Element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Qualified tag name
    pub name: String,
    /// Attributes in document order, values unescaped
    pub attributes: IndexMap<String, String>,
    /// Child nodes in document order
    pub children: Vec<Node>,
}

impl Element {
    /// Create element without attributes or children
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// With attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// With child node
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Attribute value
    #[inline]
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether the attribute is present
    #[inline]
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Set attribute; an existing attribute keeps its position
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Remove attribute, keeping the order of the others
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.shift_remove(name)
    }

    /// Child elements in document order
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Whether any child is an element
    #[must_use]
    pub fn has_child_elements(&self) -> bool {
        self.children.iter().any(|node| matches!(node, Node::Element(_)))
    }

    /// Visit this element and every descendant element in document order
    pub fn visit_mut<F>(&mut self, visitor: &mut F)
    where
        F: FnMut(&mut Element),
    {
        visitor(self);
        for child in &mut self.children {
            if let Node::Element(element) = child {
                element.visit_mut(visitor);
            }
        }
    }

    /// Drop whitespace-only text unless the element has real text too
    fn drop_blank_text(&mut self) {
        let element_only = self.children.iter().all(|node| match node {
            Node::Text(text) => is_blank(text),
            _ => true,
        });
        if element_only {
            self.children.retain(|node| !matches!(node, Node::Text(_)));
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// Parsed markup file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupDocument {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl MarkupDocument {
    /// Wrap a root element
    #[must_use]
    pub fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Read and parse a file
    ///
    /// # Errors
    /// `Io`, `Encoding` or `MalformedMarkup`.
    pub fn read(path: &Path) -> Result<Self, RewriteError> {
        let bytes = std::fs::read(path).map_err(|e| RewriteError::io_error(path, e))?;
        let text = String::from_utf8(bytes).map_err(|_| RewriteError::encoding(path))?;
        Self::parse(&text, path)
    }

    /// Parse markup text; `path` only labels errors
    ///
    /// # Errors
    /// `RewriteError::MalformedMarkup` if the text is not well-formed.
    pub fn parse(text: &str, path: &Path) -> Result<Self, RewriteError> {
        let mut reader = Reader::from_str(text);
        let mut builder = TreeBuilder::default();

        loop {
            let malformed = |reader: &Reader<&[u8]>, message: String| {
                let offset = usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX);
                RewriteError::malformed(path, line_at(text, offset), message)
            };
            let event = reader
                .read_event()
                .map_err(|e| malformed(&reader, e.to_string()))?;
            let step = match event {
                Event::Decl(_) => Ok(()),
                Event::Start(start) => element_from(&start).map(|element| builder.open(element)),
                Event::Empty(start) => {
                    element_from(&start).and_then(|element| builder.attach(element.into()))
                }
                Event::End(_) => builder.close(),
                Event::Text(content) => content
                    .unescape()
                    .map_err(|e| e.to_string())
                    .and_then(|text| builder.text(text.into_owned())),
                Event::CData(content) => {
                    utf8(&content).and_then(|text| builder.attach(Node::CData(text)))
                }
                Event::Comment(content) => {
                    utf8(&content).and_then(|text| builder.attach(Node::Comment(text)))
                }
                Event::PI(content) => utf8(&content)
                    .and_then(|text| builder.attach(Node::ProcessingInstruction(text))),
                Event::DocType(content) => {
                    utf8(&content).and_then(|text| builder.attach(Node::DocType(text)))
                }
                Event::Eof => break,
            };
            step.map_err(|message| malformed(&reader, message))?;
        }

        builder
            .finish()
            .map_err(|message| RewriteError::malformed(path, line_at(text, text.len()), message))
    }

    /// Root element
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Mutable root element
    #[inline]
    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Serialize with declaration and normalized indentation
    #[must_use]
    pub fn to_xml_string(&self, indent: &str) -> String {
        let mut out = String::with_capacity(256);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        for node in &self.prolog {
            write_node(&mut out, node, 0, indent, true);
            out.push('\n');
        }
        write_element(&mut out, &self.root, 0, indent, true);
        out.push('\n');
        for node in &self.epilog {
            write_node(&mut out, node, 0, indent, true);
            out.push('\n');
        }
        out
    }

    /// Serialize and replace the file content
    ///
    /// # Errors
    /// `RewriteError::Io` if the write fails.
    pub fn write(&self, path: &Path, indent: &str) -> Result<(), RewriteError> {
        std::fs::write(path, self.to_xml_string(indent)).map_err(|e| RewriteError::io_error(path, e))
    }
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Element>,
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
}

impl TreeBuilder {
    fn open(&mut self, element: Element) {
        self.stack.push(element);
    }

    fn close(&mut self) -> Result<(), String> {
        let mut element = self
            .stack
            .pop()
            .ok_or_else(|| "closing tag without matching opening tag".to_string())?;
        element.drop_blank_text();
        self.attach(element.into())
    }

    fn text(&mut self, text: String) -> Result<(), String> {
        if self.stack.is_empty() {
            if is_blank(&text) {
                return Ok(());
            }
            return Err("text outside the root element".to_string());
        }
        self.attach(Node::Text(text))
    }

    fn attach(&mut self, node: Node) -> Result<(), String> {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
            return Ok(());
        }
        match node {
            Node::Element(element) => {
                if self.root.is_some() {
                    return Err(format!("second root element <{}>", element.name));
                }
                self.root = Some(element);
            }
            Node::Text(_) | Node::CData(_) => {
                return Err("character data outside the root element".to_string());
            }
            other if self.root.is_none() => self.prolog.push(other),
            other => self.epilog.push(other),
        }
        Ok(())
    }

    fn finish(self) -> Result<MarkupDocument, String> {
        if let Some(open) = self.stack.last() {
            return Err(format!("unexpected end of document inside <{}>", open.name));
        }
        let root = self
            .root
            .ok_or_else(|| "document has no root element".to_string())?;
        Ok(MarkupDocument {
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, String> {
    let mut element = Element::new(utf8(start.name().as_ref())?);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let name = utf8(attribute.key.as_ref())?;
        let value = attribute.unescape_value().map_err(|e| e.to_string())?;
        element.set_attr(name, value.into_owned());
    }
    Ok(element)
}

fn utf8(bytes: &[u8]) -> Result<String, String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| format!("invalid utf-8: {e}"))
}

fn is_blank(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

fn line_at(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}

fn push_indent(out: &mut String, indent: &str, depth: usize) {
    for _ in 0..depth {
        out.push_str(indent);
    }
}

fn write_node(out: &mut String, node: &Node, depth: usize, indent: &str, pretty: bool) {
    match node {
        Node::Element(element) => write_element(out, element, depth, indent, pretty),
        Node::Text(text) => out.push_str(&partial_escape(text)),
        Node::CData(text) => {
            out.push_str("<![CDATA[");
            out.push_str(text);
            out.push_str("]]>");
        }
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::ProcessingInstruction(text) => {
            out.push_str("<?");
            out.push_str(text);
            out.push_str("?>");
        }
        Node::DocType(text) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(text.trim_start());
            out.push('>');
        }
    }
}

fn write_element(out: &mut String, element: &Element, depth: usize, indent: &str, pretty: bool) {
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&partial_escape(value).replace('"', "&quot;"));
        out.push('"');
    }
    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    let mixed = element
        .children
        .iter()
        .any(|node| matches!(node, Node::Text(_) | Node::CData(_)));
    let pretty = pretty && !mixed;
    for child in &element.children {
        if pretty {
            out.push('\n');
            push_indent(out, indent, depth + 1);
        }
        write_node(out, child, depth + 1, indent, pretty);
    }
    if pretty {
        out.push('\n');
        push_indent(out, indent, depth);
    }

    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> MarkupDocument {
        MarkupDocument::parse(text, Path::new("test.xml")).unwrap()
    }

    #[test]
    fn serializes_with_declaration_and_indentation() {
        let doc = parse(
            r#"<odoo><data inherit_id="web.assets_backend"><xpath expr="//head" position="inside"><script src="foo.js"/></xpath></data></odoo>"#,
        );
        let expected = r#"<?xml version='1.0' encoding='utf-8'?>
<odoo>
  <data inherit_id="web.assets_backend">
    <xpath expr="//head" position="inside">
      <script src="foo.js"/>
    </xpath>
  </data>
</odoo>
"#;
        assert_eq!(doc.to_xml_string("  "), expected);
    }

    #[test]
    fn insignificant_whitespace_is_discarded() {
        let compact = parse("<odoo><record id=\"a\"><field name=\"x\">1</field></record></odoo>");
        let spaced = parse(
            "<?xml version=\"1.0\"?>\n<odoo>\n    <record id=\"a\">\n        <field name=\"x\">1</field>\n    </record>\n</odoo>\n",
        );
        assert_eq!(compact, spaced);
    }

    #[test]
    fn mixed_content_is_written_inline() {
        let doc = parse("<odoo><p>Hello <b>world</b> !</p></odoo>");
        assert_eq!(
            doc.to_xml_string("  "),
            "<?xml version='1.0' encoding='utf-8'?>\n<odoo>\n  <p>Hello <b>world</b> !</p>\n</odoo>\n"
        );
    }

    #[test]
    fn escapes_roundtrip() {
        let doc = parse(r#"<odoo><t t-if="x &lt; 2 and y == 'z'">a &amp; b</t></odoo>"#);
        let element = doc.root().child_elements().next().unwrap();
        assert_eq!(element.attr("t-if"), Some("x < 2 and y == 'z'"));
        assert!(doc
            .to_xml_string("  ")
            .contains(r#"<t t-if="x &lt; 2 and y == 'z'">a &amp; b</t>"#));
    }

    #[test]
    fn comments_and_prolog_are_kept() {
        let doc = parse("<!-- header -->\n<odoo><!-- inner --><record id=\"a\"/></odoo>");
        assert_eq!(
            doc.to_xml_string("  "),
            "<?xml version='1.0' encoding='utf-8'?>\n<!-- header -->\n<odoo>\n  <!-- inner -->\n  <record id=\"a\"/>\n</odoo>\n"
        );
    }

    #[test]
    fn unclosed_element_is_malformed() {
        let err = MarkupDocument::parse("<odoo>\n<record>\n", Path::new("bad.xml")).unwrap_err();
        assert!(matches!(err, RewriteError::MalformedMarkup { .. }));
    }

    #[test]
    fn mismatched_end_tag_is_malformed() {
        let err = MarkupDocument::parse("<odoo><record></odoo>", Path::new("bad.xml")).unwrap_err();
        assert!(matches!(err, RewriteError::MalformedMarkup { .. }));
    }

    #[test]
    fn empty_document_is_malformed() {
        let err = MarkupDocument::parse("  \n", Path::new("empty.xml")).unwrap_err();
        assert!(matches!(err, RewriteError::MalformedMarkup { .. }));
    }

    #[test]
    fn attribute_operations_keep_order() {
        let mut element = Element::new("span")
            .with_attr("class", "a")
            .with_attr("t-esc", "v")
            .with_attr("title", "t");
        element.set_attr("class", "b");
        let value = element.remove_attr("t-esc").unwrap();
        element.set_attr("t-out", value);
        let names: Vec<_> = element.attributes.keys().map(String::as_str).collect();
        assert_eq!(names, ["class", "title", "t-out"]);
        assert_eq!(element.attr("class"), Some("b"));
    }

    #[test]
    fn visit_mut_walks_in_document_order() {
        let mut doc = parse("<a><b><c/></b><d/></a>");
        let mut seen = Vec::new();
        doc.root_mut().visit_mut(&mut |element| seen.push(element.name.clone()));
        assert_eq!(seen, ["a", "b", "c", "d"]);
    }

    #[test]
    fn reads_file_and_rejects_bad_encoding() {
        let dir = tempfile::TempDir::new().unwrap();
        let good = dir.path().join("good.xml");
        std::fs::write(&good, "<odoo/>").unwrap();
        assert_eq!(MarkupDocument::read(&good).unwrap().root().name, "odoo");

        let bad = dir.path().join("bad.xml");
        std::fs::write(&bad, b"<odoo>\xff</odoo>").unwrap();
        let err = MarkupDocument::read(&bad).unwrap_err();
        assert!(matches!(err, RewriteError::Encoding { .. }));
    }
}
