//! Selection
//!
//! The uniform container over zero-or-more host elements. Every chained
//! operation is implemented once against the closed `Backing` variants
//! (empty, single, many, event-target-backed) instead of per shape, so
//! callers never branch on "one element vs a list".
//!
//! A `Live` backing stores the lookup instead of its result and re-runs
//! it on every access, mirroring the host's live collections: the
//! membership of such a selection tracks later document mutations, so its
//! length is not stable across calls that may change the tree.

use std::cell::RefCell;
use std::collections::HashSet;

use domkit_dom::{
    Document, DocumentHandle, EventHandler, EventTarget, NodeId, dispatch, inner_html,
};
use domkit_html::HtmlParser;

use crate::config::{Config, ConfigHandle};
use crate::error::{QueryError, QueryResult, soft_or};
use crate::resolve::{ResolveRoot, resolve};

/// Global object an event-target-backed selection is anchored to. The
/// representative element stands in for queries and content, but event
/// registration goes to the global object itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalTarget {
    Document,
    Window,
}

#[derive(Debug, Clone)]
enum LiveKind {
    Class(String),
    Tag(String),
    Name(String),
    Children,
}

/// A stored native lookup, re-evaluated against the host on every access
#[derive(Debug, Clone)]
pub(crate) struct LiveQuery {
    root: NodeId,
    kind: LiveKind,
}

impl LiveQuery {
    pub(crate) fn by_class(root: NodeId, class: &str) -> Self {
        Self {
            root,
            kind: LiveKind::Class(class.to_string()),
        }
    }

    pub(crate) fn by_tag(root: NodeId, tag: &str) -> Self {
        Self {
            root,
            kind: LiveKind::Tag(tag.to_string()),
        }
    }

    pub(crate) fn by_name(root: NodeId, value: &str) -> Self {
        Self {
            root,
            kind: LiveKind::Name(value.to_string()),
        }
    }

    fn children(root: NodeId) -> Self {
        Self {
            root,
            kind: LiveKind::Children,
        }
    }

    fn evaluate(&self, doc: &Document) -> Vec<NodeId> {
        match &self.kind {
            LiveKind::Class(class) => doc.get_elements_by_class_name(self.root, class),
            LiveKind::Tag(tag) => doc.get_elements_by_tag_name(self.root, tag),
            LiveKind::Name(value) => doc.get_elements_by_name(value),
            LiveKind::Children => doc.child_elements(self.root),
        }
    }
}

#[derive(Debug, Clone)]
enum Backing {
    /// The distinguished zero-element state; allocates nothing
    Empty,
    /// Exactly one known element, stored directly
    Single(NodeId),
    /// Fixed element list
    Snapshot(Vec<NodeId>),
    /// Host-maintained view, re-evaluated per access
    Live(LiveQuery),
    /// Document/window: a representative element plus the true event target
    Target {
        global: GlobalTarget,
        element: NodeId,
    },
}

/// Something that can be appended into a selection
#[derive(Clone)]
pub enum Content {
    /// Markup, parsed and inserted
    Markup(String),
    /// An existing node, moved (or cloned per target for to-all appends)
    Node(NodeId),
    /// Every element of another selection
    Selection(Selection),
    /// Any ordered mix of the above
    List(Vec<Content>),
}

impl From<&str> for Content {
    fn from(markup: &str) -> Self {
        Content::Markup(markup.to_string())
    }
}

impl From<String> for Content {
    fn from(markup: String) -> Self {
        Content::Markup(markup)
    }
}

impl From<NodeId> for Content {
    fn from(node: NodeId) -> Self {
        Content::Node(node)
    }
}

impl From<Selection> for Content {
    fn from(selection: Selection) -> Self {
        Content::Selection(selection)
    }
}

impl From<Vec<Content>> for Content {
    fn from(items: Vec<Content>) -> Self {
        Content::List(items)
    }
}

/// The first element's `data-*` view
pub struct Dataset {
    doc: DocumentHandle,
    node: NodeId,
}

impl Dataset {
    pub fn get(&self, key: &str) -> Option<String> {
        self.doc
            .borrow()
            .element(self.node)
            .and_then(|e| e.attribute(&format!("data-{key}")))
    }

    pub fn set(&self, key: &str, value: &str) {
        if let Some(elem) = self.doc.borrow_mut().element_mut(self.node) {
            elem.set_attribute(&format!("data-{key}"), value);
        }
    }

    pub fn remove(&self, key: &str) {
        if let Some(elem) = self.doc.borrow_mut().element_mut(self.node) {
            elem.remove_attribute(&format!("data-{key}"));
        }
    }

    /// Keys present, without the `data-` prefix
    pub fn keys(&self) -> Vec<String> {
        let doc = self.doc.borrow();
        let Some(elem) = doc.element(self.node) else {
            return Vec::new();
        };
        elem.attributes()
            .iter()
            .filter_map(|attr| attr.name.strip_prefix("data-"))
            .map(str::to_string)
            .collect()
    }
}

/// Ordered, index-addressable view over zero or more host elements
pub struct Selection {
    doc: DocumentHandle,
    config: ConfigHandle,
    backing: Backing,
    /// First element's display value remembered by `hide`
    saved_display: RefCell<Option<String>>,
}

impl Clone for Selection {
    fn clone(&self) -> Self {
        Self {
            doc: self.doc.clone(),
            config: self.config.clone(),
            backing: self.backing.clone(),
            saved_display: RefCell::new(self.saved_display.borrow().clone()),
        }
    }
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("backing", &self.backing)
            .finish()
    }
}

impl Selection {
    // ---- construction ----

    fn build(doc: &DocumentHandle, config: &ConfigHandle, backing: Backing) -> Self {
        Self {
            doc: doc.clone(),
            config: config.clone(),
            backing,
            saved_display: RefCell::new(None),
        }
    }

    pub(crate) fn empty(doc: &DocumentHandle, config: &ConfigHandle) -> Self {
        Self::build(doc, config, Backing::Empty)
    }

    pub(crate) fn single(doc: &DocumentHandle, config: &ConfigHandle, id: NodeId) -> Self {
        Self::build(doc, config, Backing::Single(id))
    }

    pub(crate) fn snapshot(doc: &DocumentHandle, config: &ConfigHandle, ids: Vec<NodeId>) -> Self {
        Self::build(doc, config, Backing::Snapshot(ids))
    }

    pub(crate) fn live(doc: &DocumentHandle, config: &ConfigHandle, query: LiveQuery) -> Self {
        Self::build(doc, config, Backing::Live(query))
    }

    pub(crate) fn target(
        doc: &DocumentHandle,
        config: &ConfigHandle,
        global: GlobalTarget,
        element: NodeId,
    ) -> Self {
        Self::build(doc, config, Backing::Target { global, element })
    }

    fn derive(&self, backing: Backing) -> Self {
        Self::build(&self.doc, &self.config, backing)
    }

    fn cfg(&self) -> Config {
        *self.config.borrow()
    }

    /// Handle to the document this selection reads from
    pub fn document_handle(&self) -> &DocumentHandle {
        &self.doc
    }

    // ---- introspection ----

    /// The current backing elements, in order. Live views are
    /// re-evaluated here.
    pub fn ids(&self) -> Vec<NodeId> {
        match &self.backing {
            Backing::Empty => Vec::new(),
            Backing::Single(id) => vec![*id],
            Backing::Snapshot(ids) => ids.clone(),
            Backing::Live(query) => query.evaluate(&self.doc.borrow()),
            Backing::Target { element, .. } => vec![*element],
        }
    }

    /// First element, `None` when the selection is empty
    pub fn element(&self) -> Option<NodeId> {
        match &self.backing {
            Backing::Empty => None,
            Backing::Single(id) => Some(*id),
            Backing::Target { element, .. } => Some(*element),
            _ => self.ids().first().copied(),
        }
    }

    /// Element at an index
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.ids().get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.ids().len()
    }

    /// Whether the selection currently holds no elements
    pub fn is_empty(&self) -> bool {
        self.element().is_none()
    }

    /// Error out unless at least one element is present. Operations that
    /// loop over the elements never fail on empty selections, so this is
    /// the opt-in check.
    pub fn require(&self, operation: &'static str) -> QueryResult<&Self> {
        if self.is_empty() {
            return Err(QueryError::EmptySelection { operation });
        }
        Ok(self)
    }

    /// Debug-only form of [`require`](Self::require) for call sites that
    /// already know the selection is non-empty
    pub fn debug_assert_elements(&self) {
        debug_assert!(!self.is_empty(), "no elements in selection");
    }

    // ---- content ----

    /// Inner markup of the first element
    pub fn html(&self) -> QueryResult<String> {
        match self.element() {
            Some(id) => Ok(inner_html(&self.doc.borrow(), id)),
            None => soft_or(
                &self.cfg(),
                String::new(),
                QueryError::EmptySelection { operation: "html" },
            ),
        }
    }

    /// Replace the inner markup of every element
    pub fn set_html(&self, markup: &str) -> QueryResult<&Self> {
        let ids = self.ids();
        if ids.is_empty() {
            return Ok(self);
        }

        let fragment = {
            let mut doc = self.doc.borrow_mut();
            HtmlParser::new().parse_fragment(&mut doc, markup)
        };
        let fragment = match fragment {
            Ok(nodes) => nodes,
            Err(err) => return soft_or(&self.cfg(), self, err.into()),
        };

        let mut doc = self.doc.borrow_mut();
        for (index, &target) in ids.iter().enumerate() {
            doc.clear_children(target);
            for &node in &fragment {
                if index == 0 {
                    doc.append_child(target, node);
                } else if let Some(copy) = doc.clone_subtree(node) {
                    doc.append_child(target, copy);
                }
            }
        }
        Ok(self)
    }

    /// Delete the contents of every element
    pub fn empty_html(&self) -> QueryResult<&Self> {
        self.set_html("")
    }

    /// Append to the first element: markup, a node (moved), another
    /// selection's elements (moved), or an ordered mix
    pub fn append(&self, content: impl Into<Content>) -> QueryResult<&Self> {
        let Some(first) = self.element() else {
            return soft_or(
                &self.cfg(),
                self,
                QueryError::EmptySelection { operation: "append" },
            );
        };
        self.append_into(first, content.into(), false)?;
        Ok(self)
    }

    /// Append to every element; node and selection arguments are cloned
    /// per target
    pub fn append_to_all(&self, content: impl Into<Content>) -> QueryResult<&Self> {
        let content = content.into();
        let ids = self.ids();

        // markup appends loop the elements and so no-op when empty
        if let Content::Markup(markup) = &content {
            for &id in &ids {
                self.append_into(id, Content::Markup(markup.clone()), false)?;
            }
            return Ok(self);
        }

        if ids.is_empty() {
            return soft_or(
                &self.cfg(),
                self,
                QueryError::EmptySelection {
                    operation: "append_to_all",
                },
            );
        }
        for &id in &ids {
            self.append_into(id, content.clone(), true)?;
        }
        Ok(self)
    }

    fn append_into(&self, target: NodeId, content: Content, clone: bool) -> QueryResult<()> {
        match content {
            Content::Markup(markup) => {
                let fragment = {
                    let mut doc = self.doc.borrow_mut();
                    HtmlParser::new().parse_fragment(&mut doc, &markup)
                };
                match fragment {
                    Ok(nodes) => {
                        let mut doc = self.doc.borrow_mut();
                        for node in nodes {
                            doc.append_child(target, node);
                        }
                    }
                    Err(err) => {
                        soft_or(&self.cfg(), (), err.into())?;
                    }
                }
            }
            Content::Node(node) => {
                let mut doc = self.doc.borrow_mut();
                if clone {
                    if let Some(copy) = doc.clone_subtree(node) {
                        doc.append_child(target, copy);
                    }
                } else {
                    doc.append_child(target, node);
                }
            }
            Content::Selection(selection) => {
                for node in selection.ids() {
                    self.append_into(target, Content::Node(node), clone)?;
                }
            }
            Content::List(items) => {
                for item in items {
                    self.append_into(target, item, clone)?;
                }
            }
        }
        Ok(())
    }

    /// Append a text node to every element
    pub fn append_text(&self, text: &str) -> &Self {
        let ids = self.ids();
        let mut doc = self.doc.borrow_mut();
        for id in ids {
            let node = doc.create_text(text);
            doc.append_child(id, node);
        }
        self
    }

    /// Concatenated text content of every element
    pub fn text(&self) -> String {
        let ids = self.ids();
        let doc = self.doc.borrow();
        ids.into_iter().map(|id| doc.text_content(id)).collect()
    }

    /// Replace every element's children with a single text node
    pub fn set_text(&self, text: &str) -> &Self {
        let ids = self.ids();
        let mut doc = self.doc.borrow_mut();
        for id in ids {
            doc.clear_children(id);
            let node = doc.create_text(text);
            doc.append_child(id, node);
        }
        self
    }

    /// Detach every child node of every element
    pub fn clear_children(&self) -> &Self {
        let ids = self.ids();
        let mut doc = self.doc.borrow_mut();
        for id in ids {
            doc.clear_children(id);
        }
        self
    }

    // ---- attributes & appearance ----

    /// Attribute value on the first element
    pub fn attr(&self, name: &str) -> QueryResult<String> {
        let Some(id) = self.element() else {
            return soft_or(
                &self.cfg(),
                String::new(),
                QueryError::EmptySelection { operation: "attr" },
            );
        };
        match self.doc.borrow().element(id).and_then(|e| e.attribute(name)) {
            Some(value) => Ok(value),
            None => soft_or(
                &self.cfg(),
                String::new(),
                QueryError::MissingAttribute {
                    name: name.to_string(),
                },
            ),
        }
    }

    /// Set an attribute on every element
    pub fn set_attr(&self, name: &str, value: &str) -> &Self {
        let ids = self.ids();
        let mut doc = self.doc.borrow_mut();
        for id in ids {
            if let Some(elem) = doc.element_mut(id) {
                elem.set_attribute(name, value);
            }
        }
        self
    }

    /// Add class tokens given as one space-separated string
    pub fn add_class(&self, classes: &str) -> &Self {
        let tokens: Vec<&str> = classes.split_whitespace().collect();
        let ids = self.ids();
        let mut doc = self.doc.borrow_mut();
        for id in ids {
            if let Some(elem) = doc.element_mut(id) {
                for token in &tokens {
                    elem.add_class(token);
                }
            }
        }
        self
    }

    /// Add class tokens given as distinct arguments. The two calling
    /// conventions are not combined: tokens here are taken verbatim.
    pub fn add_classes(&self, classes: &[&str]) -> &Self {
        let ids = self.ids();
        let mut doc = self.doc.borrow_mut();
        for id in ids {
            if let Some(elem) = doc.element_mut(id) {
                for class in classes {
                    elem.add_class(class);
                }
            }
        }
        self
    }

    /// Remove a class token from every element
    pub fn remove_class(&self, class: &str) -> &Self {
        let ids = self.ids();
        let mut doc = self.doc.borrow_mut();
        for id in ids {
            if let Some(elem) = doc.element_mut(id) {
                elem.remove_class(class);
            }
        }
        self
    }

    /// Toggle a class token on every element
    pub fn toggle_class(&self, class: &str) -> &Self {
        let ids = self.ids();
        let mut doc = self.doc.borrow_mut();
        for id in ids {
            if let Some(elem) = doc.element_mut(id) {
                elem.toggle_class(class);
            }
        }
        self
    }

    /// Inline style property of the first element; empty string when the
    /// property is not set
    pub fn css(&self, property: &str) -> QueryResult<String> {
        let Some(id) = self.element() else {
            return soft_or(
                &self.cfg(),
                String::new(),
                QueryError::EmptySelection { operation: "css" },
            );
        };
        Ok(self
            .doc
            .borrow()
            .element(id)
            .and_then(|e| e.style_get(property).map(str::to_string))
            .unwrap_or_default())
    }

    /// Set an inline style property on every element
    pub fn set_css(&self, property: &str, value: &str) -> &Self {
        let ids = self.ids();
        let mut doc = self.doc.borrow_mut();
        for id in ids {
            if let Some(elem) = doc.element_mut(id) {
                elem.style_set(property, value);
            }
        }
        self
    }

    /// Checked state of the first element
    pub fn checked(&self) -> QueryResult<bool> {
        let state = self
            .element()
            .and_then(|id| self.doc.borrow().element(id).and_then(|e| e.checked()));
        match state {
            Some(value) => Ok(value),
            None => soft_or(&self.cfg(), false, QueryError::NotCheckable),
        }
    }

    /// Set the checked state on every element
    pub fn set_checked(&self, value: bool) -> QueryResult<&Self> {
        let cfg = self.cfg();
        let ids = self.ids();
        for id in ids {
            let supported = self
                .doc
                .borrow_mut()
                .element_mut(id)
                .is_some_and(|e| e.set_checked(value));
            if !supported {
                if cfg.fail_fast {
                    return Err(QueryError::NotCheckable);
                }
                if cfg.verbose {
                    tracing::warn!("set_checked on an element without a checked state");
                }
            }
        }
        Ok(self)
    }

    /// Current value of the first element
    pub fn value(&self) -> QueryResult<String> {
        let Some(id) = self.element() else {
            return soft_or(
                &self.cfg(),
                String::new(),
                QueryError::EmptySelection { operation: "value" },
            );
        };
        match self
            .doc
            .borrow()
            .element(id)
            .and_then(|e| e.value().map(str::to_string))
        {
            Some(value) => Ok(value),
            None => soft_or(
                &self.cfg(),
                String::new(),
                QueryError::UnsupportedArgument("element has no value"),
            ),
        }
    }

    /// Set the current value on every element that has one
    pub fn set_value(&self, value: &str) -> &Self {
        let ids = self.ids();
        let mut doc = self.doc.borrow_mut();
        for id in ids {
            if let Some(elem) = doc.element_mut(id) {
                elem.set_value(value);
            }
        }
        self
    }

    /// The first element's `data-*` view. Unlike most accessors this
    /// raises on an empty selection and on elements that cannot carry
    /// data, regardless of the fail-fast flag.
    pub fn dataset(&self) -> QueryResult<Dataset> {
        let id = self
            .element()
            .ok_or(QueryError::EmptySelection { operation: "dataset" })?;
        let supported = self
            .doc
            .borrow()
            .element(id)
            .is_some_and(|e| e.supports_dataset());
        if !supported {
            return Err(QueryError::NoDataset);
        }
        Ok(Dataset {
            doc: self.doc.clone(),
            node: id,
        })
    }

    /// Run an operation against the first element's dataset
    pub fn with_data(&self, operation: impl FnOnce(&Dataset)) -> QueryResult<&Self> {
        operation(&self.dataset()?);
        Ok(self)
    }

    // ---- visibility ----

    /// Remember the first element's inline display value, then force
    /// `display: none` on every element. Only the first element's prior
    /// value is remembered, even for multi-element selections.
    pub fn hide(&self) -> &Self {
        let ids = self.ids();
        let Some(&first) = ids.first() else {
            return self;
        };
        let prior = {
            let doc = self.doc.borrow();
            doc.element(first)
                .and_then(|e| e.style_get("display").map(str::to_string))
                .unwrap_or_default()
        };
        *self.saved_display.borrow_mut() = Some(prior);

        let mut doc = self.doc.borrow_mut();
        for id in ids {
            if let Some(elem) = doc.element_mut(id) {
                elem.style_set("display", "none");
            }
        }
        self
    }

    /// Restore the remembered display value (or clear the inline
    /// property when none was remembered) on every element
    pub fn show(&self) -> &Self {
        let ids = self.ids();
        if ids.is_empty() {
            return self;
        }
        let restored = self.saved_display.borrow_mut().take().unwrap_or_default();

        let mut doc = self.doc.borrow_mut();
        for id in ids {
            if let Some(elem) = doc.element_mut(id) {
                elem.style_set("display", &restored);
            }
        }
        self
    }

    // ---- traversal ----

    /// Direct child elements of every element, in order. Children of
    /// distinct elements cannot coincide, so no de-duplication applies.
    pub fn children(&self) -> Selection {
        match &self.backing {
            Backing::Empty => self.derive(Backing::Empty),
            Backing::Single(id) => self.derive(Backing::Live(LiveQuery::children(*id))),
            Backing::Target { element, .. } => {
                self.derive(Backing::Live(LiveQuery::children(*element)))
            }
            _ => {
                let ids = self.ids();
                let doc = self.doc.borrow();
                let mut out = Vec::new();
                for id in ids {
                    out.extend(doc.child_elements(id));
                }
                drop(doc);
                self.derive(Backing::Snapshot(out))
            }
        }
    }

    /// De-duplicated union of the elements' parent elements
    pub fn parent(&self) -> QueryResult<Selection> {
        match &self.backing {
            Backing::Empty => Ok(self.derive(Backing::Empty)),
            Backing::Single(id) | Backing::Target { element: id, .. } => {
                match self.doc.borrow().parent_element(*id) {
                    Some(parent) => Ok(self.derive(Backing::Single(parent))),
                    None => soft_or(
                        &self.cfg(),
                        self.derive(Backing::Empty),
                        QueryError::MissingParent,
                    ),
                }
            }
            _ => {
                let ids = self.ids();
                let doc = self.doc.borrow();
                let mut seen = HashSet::new();
                let mut out = Vec::new();
                for id in ids {
                    if let Some(parent) = doc.parent_element(id) {
                        if seen.insert(parent) {
                            out.push(parent);
                        }
                    }
                }
                drop(doc);
                Ok(self.derive(Backing::Snapshot(out)))
            }
        }
    }

    /// Run the selector resolver rooted at each element and collect the
    /// de-duplicated union of the matches
    pub fn find(&self, selector: &str, force_query: bool) -> QueryResult<Selection> {
        match &self.backing {
            Backing::Empty => Ok(self.derive(Backing::Empty)),
            Backing::Single(id) | Backing::Target { element: id, .. } => resolve(
                &self.doc,
                &self.config,
                selector,
                ResolveRoot::Element(*id),
                force_query,
            ),
            _ => {
                let mut seen = HashSet::new();
                let mut out = Vec::new();
                for id in self.ids() {
                    let matches = resolve(
                        &self.doc,
                        &self.config,
                        selector,
                        ResolveRoot::Element(id),
                        force_query,
                    )?;
                    for matched in matches.ids() {
                        if seen.insert(matched) {
                            out.push(matched);
                        }
                    }
                }
                Ok(self.derive(Backing::Snapshot(out)))
            }
        }
    }

    /// Remove every element from its parent. The selection stays valid
    /// and still addresses the detached elements.
    pub fn detach(&self) -> &Self {
        let ids = self.ids();
        let mut doc = self.doc.borrow_mut();
        for id in ids {
            doc.detach(id);
        }
        self
    }

    // ---- events ----

    fn event_targets(&self) -> Vec<EventTarget> {
        match &self.backing {
            Backing::Target { global, .. } => vec![match global {
                GlobalTarget::Document => EventTarget::Document,
                GlobalTarget::Window => EventTarget::Window,
            }],
            _ => self.ids().into_iter().map(EventTarget::Node).collect(),
        }
    }

    /// Attach a listener for an event type on every element (or on the
    /// global object for document/window selections)
    pub fn on(&self, event_type: &str, handler: &EventHandler) -> &Self {
        let targets = self.event_targets();
        let mut doc = self.doc.borrow_mut();
        for target in targets {
            doc.add_event_listener(target, event_type, handler.clone(), false);
        }
        self
    }

    /// Attach a listener that detaches itself after its first invocation
    pub fn once(&self, event_type: &str, handler: &EventHandler) -> &Self {
        let targets = self.event_targets();
        let mut doc = self.doc.borrow_mut();
        for target in targets {
            doc.add_event_listener(target, event_type, handler.clone(), true);
        }
        self
    }

    /// Detach a previously attached listener
    pub fn off(&self, event_type: &str, handler: &EventHandler) -> &Self {
        let targets = self.event_targets();
        let mut doc = self.doc.borrow_mut();
        for target in targets {
            doc.remove_event_listener(target, event_type, handler);
        }
        self
    }

    fn trigger(&self, event_type: &str) -> &Self {
        for target in self.event_targets() {
            dispatch(&self.doc, target, event_type);
        }
        self
    }

    /// With a handler: listen for clicks. Without: click every element.
    pub fn click(&self, handler: Option<&EventHandler>) -> &Self {
        match handler {
            Some(handler) => self.on("click", handler),
            None => self.trigger("click"),
        }
    }

    /// With a handler: listen for blur. Without: blur every element.
    pub fn blur(&self, handler: Option<&EventHandler>) -> &Self {
        match handler {
            Some(handler) => self.on("blur", handler),
            None => self.trigger("blur"),
        }
    }

    /// With a handler: listen for focus. Without: focus every element.
    pub fn focus(&self, handler: Option<&EventHandler>) -> &Self {
        match handler {
            Some(handler) => self.on("focus", handler),
            None => self.trigger("focus"),
        }
    }

    pub fn keypress(&self, handler: &EventHandler) -> &Self {
        self.on("keypress", handler)
    }

    pub fn submit(&self, handler: &EventHandler) -> &Self {
        self.on("submit", handler)
    }

    pub fn load(&self, handler: &EventHandler) -> &Self {
        self.on("load", handler)
    }

    pub fn dblclick(&self, handler: &EventHandler) -> &Self {
        self.on("dblclick", handler)
    }

    pub fn keydown(&self, handler: &EventHandler) -> &Self {
        self.on("keydown", handler)
    }

    pub fn change(&self, handler: &EventHandler) -> &Self {
        self.on("change", handler)
    }

    pub fn resize(&self, handler: &EventHandler) -> &Self {
        self.on("resize", handler)
    }

    pub fn mouseenter(&self, handler: &EventHandler) -> &Self {
        self.on("mouseenter", handler)
    }

    pub fn keyup(&self, handler: &EventHandler) -> &Self {
        self.on("keyup", handler)
    }

    pub fn scroll(&self, handler: &EventHandler) -> &Self {
        self.on("scroll", handler)
    }

    pub fn mouseleave(&self, handler: &EventHandler) -> &Self {
        self.on("mouseleave", handler)
    }

    pub fn unload(&self, handler: &EventHandler) -> &Self {
        self.on("unload", handler)
    }

    // ---- bulk iteration ----

    /// Walk the raw elements
    pub fn each(&self, mut callback: impl FnMut(NodeId, usize)) -> &Self {
        for (index, id) in self.ids().into_iter().enumerate() {
            callback(id, index);
        }
        self
    }

    /// Map the raw elements to plain values
    pub fn map<T>(&self, mut callback: impl FnMut(NodeId, usize) -> T) -> Vec<T> {
        self.ids()
            .into_iter()
            .enumerate()
            .map(|(index, id)| callback(id, index))
            .collect()
    }

    /// Walk the elements, each re-wrapped as a single-element selection
    pub fn each_wrapped(&self, mut callback: impl FnMut(&Selection, usize)) -> &Self {
        for (index, id) in self.ids().into_iter().enumerate() {
            callback(&self.derive(Backing::Single(id)), index);
        }
        self
    }

    /// Map each element through a selection-returning transform and
    /// merge the results, in order
    pub fn map_wrapped(&self, mut callback: impl FnMut(Selection, usize) -> Selection) -> Selection {
        let mut out = Vec::new();
        for (index, id) in self.ids().into_iter().enumerate() {
            let mapped = callback(self.derive(Backing::Single(id)), index);
            out.extend(mapped.ids());
        }
        self.derive(Backing::Snapshot(out))
    }
}
