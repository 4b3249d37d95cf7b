//! HTML5 Parser implementation
//!
//! Uses html5ever's built-in RcDom and converts to our DOM format.
//! This is simpler and more reliable than implementing TreeSink directly.

use domkit_dom::{Document, ElementData, Namespace, Node, NodeData, NodeId};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use thiserror::Error;

const HTML_NS: &str = "http://www.w3.org/1999/xhtml";
const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// HTML parse failure
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read HTML input")]
    Io(#[from] std::io::Error),
}

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse an HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, ParseError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, ParseError> {
        tracing::debug!("parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut document = Document::empty(url);
        let root = document.root();
        self.convert_node(&dom.document, &mut document, root);

        tracing::debug!("parsed {} nodes", document.len());
        Ok(document)
    }

    /// Parse markup as a fragment and import the resulting nodes into
    /// `doc` as detached subtrees, in source order.
    pub fn parse_fragment(&self, doc: &mut Document, html: &str) -> Result<Vec<NodeId>, ParseError> {
        // html5ever wraps fragments in html/head/body; the body children
        // are the fragment.
        let scratch = self.parse(html)?;
        let Some(body) = scratch.body() else {
            return Ok(Vec::new());
        };

        let mut imported = Vec::new();
        for child in scratch.children(body) {
            if let Some(id) = import_node(doc, &scratch, child) {
                imported.push(id);
            }
        }
        Ok(imported)
    }

    /// Convert an RcDom node to our DOM format
    fn convert_node(&self, handle: &Handle, doc: &mut Document, parent: NodeId) {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, doc, parent);
                }
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                if !text.trim().is_empty() {
                    let id = doc.create_text(&text);
                    doc.append_child(parent, id);
                }
            }
            RcNodeData::Comment { contents } => {
                let id = doc.create_comment(&contents.to_string());
                doc.append_child(parent, id);
            }
            RcNodeData::Element { name, attrs, .. } => {
                let ns = match name.ns.to_string().as_str() {
                    HTML_NS => Namespace::Html,
                    SVG_NS => Namespace::Svg,
                    _ => Namespace::Other,
                };
                let id = doc.create_element_ns(&name.local, ns);

                for attr in attrs.borrow().iter() {
                    let value = attr.value.to_string();
                    if let Some(elem) = doc.element_mut(id) {
                        elem.set_attribute(&attr.name.local, &value);
                    }
                }
                doc.append_child(parent, id);

                for child in handle.children.borrow().iter() {
                    self.convert_node(child, doc, id);
                }
            }
            // doctypes and processing instructions carry nothing the
            // query layer reads
            RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => {}
        }
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep-copy a node from one arena into another; the copy is detached.
fn import_node(target: &mut Document, src: &Document, id: NodeId) -> Option<NodeId> {
    let node: &Node = src.get(id)?;
    let new_id = match &node.data {
        NodeData::Element(elem) => copy_element(target, elem),
        NodeData::Text(text) => target.create_text(text),
        NodeData::Comment(text) => target.create_comment(text),
        NodeData::Document => return None,
    };
    for child in src.children(id) {
        if let Some(copy) = import_node(target, src, child) {
            target.append_child(new_id, copy);
        }
    }
    Some(new_id)
}

fn copy_element(target: &mut Document, elem: &ElementData) -> NodeId {
    let id = target.create_element_ns(elem.tag(), elem.namespace());
    for attr in elem.attributes().iter() {
        if let Some(copy) = target.element_mut(id) {
            copy.set_attribute(&attr.name, &attr.value);
        }
    }
    id
}
