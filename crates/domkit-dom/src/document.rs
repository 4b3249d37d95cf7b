//! Document
//!
//! Arena-backed document: structural operations, element creation, and the
//! native lookup primitives (by id, class, tag, and name attribute).

use crate::events::ListenerRegistry;
use crate::node::{ElementData, Namespace, Node, NodeData};
use crate::{NodeId, select};

/// A document: arena of nodes plus the listener registry for its
/// elements and global targets.
pub struct Document {
    nodes: Vec<Node>,
    url: String,
    pub(crate) listeners: ListenerRegistry,
}

impl Document {
    /// Create a document with the usual html/head/body scaffold
    pub fn new(url: &str) -> Self {
        let mut doc = Self::empty(url);
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.append_child(doc.root(), html);
        doc.append_child(html, head);
        doc.append_child(html, body);
        doc
    }

    /// Create a document containing only the document node
    pub fn empty(url: &str) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            url: url.to_string(),
            listeners: ListenerRegistry::new(),
        };
        doc.push_node(Node::new(NodeData::Document));
        doc
    }

    /// Document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The root element (`<html>` in a scaffolded document)
    pub fn document_element(&self) -> Option<NodeId> {
        self.child_elements(self.root()).first().copied()
    }

    /// The `<body>` element, when present
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.child_elements(html)
            .into_iter()
            .find(|&id| self.tag(id).as_deref() == Some("body"))
    }

    /// Number of nodes in the arena (detached nodes included)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get a node by id
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by id
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Element data for an element node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Mutable element data for an element node
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Tag name of an element node
    pub fn tag(&self, id: NodeId) -> Option<String> {
        self.element(id).map(|e| e.tag().to_string())
    }

    // ---- creation ----

    /// Create a detached HTML element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.create_element_ns(tag, Namespace::Html)
    }

    /// Create a detached element in an explicit namespace
    pub fn create_element_ns(&mut self, tag: &str, ns: Namespace) -> NodeId {
        self.push_node(Node::new(NodeData::Element(ElementData::new(tag, ns))))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push_node(Node::new(NodeData::Text(content.to_string())))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push_node(Node::new(NodeData::Comment(content.to_string())))
    }

    // ---- structure ----

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first. Appending a node into its own subtree is
    /// refused.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.get(parent).is_none() || self.get(child).is_none() || parent == child {
            return;
        }
        if self.is_ancestor(child, parent) {
            tracing::warn!("refusing to append a node into its own subtree");
            return;
        }
        self.detach(child);

        let prev_last = self.nodes[parent.index()].last_child;
        {
            let child_node = &mut self.nodes[child.index()];
            child_node.parent = parent;
            child_node.prev_sibling = prev_last;
        }
        if prev_last.is_some() {
            self.nodes[prev_last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
    }

    /// Unlink a node from its parent. The node (and its subtree) stays in
    /// the arena and remains addressable.
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);

        if prev.is_some() {
            self.nodes[prev.index()].next_sibling = next;
        } else if parent.is_some() {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_some() {
            self.nodes[next.index()].prev_sibling = prev;
        } else if parent.is_some() {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Detach every child of a node
    pub fn clear_children(&mut self, id: NodeId) {
        while let Some(node) = self.get(id) {
            let first = node.first_child;
            if !first.is_some() {
                break;
            }
            self.detach(first);
        }
    }

    fn is_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut cursor = of;
        while let Some(node) = self.get(cursor) {
            if cursor == candidate {
                return true;
            }
            cursor = node.parent;
            if !cursor.is_some() {
                break;
            }
        }
        false
    }

    /// Deep-copy a subtree; the copy is detached
    pub fn clone_subtree(&mut self, id: NodeId) -> Option<NodeId> {
        let data = self.get(id)?.data.clone();
        let copy = self.push_node(Node::new(data));
        let children = self.children(id);
        for child in children {
            if let Some(child_copy) = self.clone_subtree(child) {
                self.append_child(copy, child_copy);
            }
        }
        Some(copy)
    }

    // ---- traversal ----

    /// Direct children of a node, in order
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Some(node) = self.get(id) else { return out };
        let mut cursor = node.first_child;
        while cursor.is_some() {
            out.push(cursor);
            cursor = self.nodes[cursor.index()].next_sibling;
        }
        out
    }

    /// Direct element children of a node, in order
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .into_iter()
            .filter(|&c| self.nodes[c.index()].is_element())
            .collect()
    }

    /// Parent node, when it is an element
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.get(id)?.parent;
        (parent.is_some() && self.nodes[parent.index()].is_element()).then_some(parent)
    }

    /// All descendants of a node in document (pre-) order, excluding the
    /// node itself
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = self.children(root);
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut children = self.children(id);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Descendant elements of a node in document order
    pub fn descendant_elements(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.nodes[id.index()].is_element())
            .collect()
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            out.push_str(text);
        }
        for desc in self.descendants(id) {
            if let Some(text) = self.nodes[desc.index()].as_text() {
                out.push_str(text);
            }
        }
        out
    }

    // ---- native lookups ----

    /// First element with the given id, in document order
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendant_elements(self.root())
            .into_iter()
            .find(|&node| self.element(node).and_then(ElementData::id) == Some(id))
    }

    /// Descendant elements of `root` carrying the given class
    pub fn get_elements_by_class_name(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendant_elements(root)
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(|e| e.has_class(class)))
            .collect()
    }

    /// Descendant elements of `root` with the given tag name (`*` matches
    /// every element)
    pub fn get_elements_by_tag_name(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.descendant_elements(root)
            .into_iter()
            .filter(|&id| {
                self.element(id)
                    .is_some_and(|e| tag == "*" || e.tag() == tag)
            })
            .collect()
    }

    /// Elements anywhere in the document whose `name` attribute equals
    /// `value`
    pub fn get_elements_by_name(&self, value: &str) -> Vec<NodeId> {
        self.descendant_elements(self.root())
            .into_iter()
            .filter(|&id| {
                self.element(id)
                    .is_some_and(|e| e.attributes().get("name") == Some(value))
            })
            .collect()
    }

    /// General selector query; always a static snapshot in document order
    pub fn query_selector_all(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, select::SelectorError> {
        select::query_selector_all(self, root, selector)
    }
}
