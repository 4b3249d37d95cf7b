//! Entry Point
//!
//! `DomTools` binds a document, the shared configuration cell, the
//! load-deferral scheduler, and the extension registry. Every accepted
//! input kind is a variant of the `Arg` union, resolved once at this
//! boundary; everything downstream works on selections.

use std::cell::RefCell;
use std::rc::Rc;

use domkit_dom::{Document, DocumentHandle, NodeId};
use domkit_html::HtmlParser;

use crate::config::{Config, ConfigHandle};
use crate::error::{QueryError, QueryResult, soft_or};
use crate::plugin::{PluginBatch, PluginRegistry, RegistrationReport};
use crate::ready::LoadScheduler;
use crate::resolve::{ResolveRoot, resolve};
use crate::selection::{GlobalTarget, Selection};

/// The accepted input kinds of the entry point
pub enum Arg {
    /// A selector string, resolved at the document root with the
    /// document-only fast paths enabled
    Selector(String),
    /// A callback deferred to the document-loaded transition
    Ready(Box<dyn FnOnce()>),
    /// One element
    Element(NodeId),
    /// An element list
    Elements(Vec<NodeId>),
    /// An existing selection; passes through unchanged
    Selection(Selection),
    /// The global document
    Document,
    /// The global window
    Window,
}

/// What a dispatch produced
pub enum Dispatched {
    Selection(Selection),
    /// The argument was a callback; nothing to return
    Scheduled,
}

impl Dispatched {
    /// The produced selection, if any
    pub fn into_selection(self) -> Option<Selection> {
        match self {
            Self::Selection(selection) => Some(selection),
            Self::Scheduled => None,
        }
    }
}

/// The DOM tools entry point
pub struct DomTools {
    doc: DocumentHandle,
    config: ConfigHandle,
    scheduler: RefCell<LoadScheduler>,
    plugins: RefCell<PluginRegistry>,
}

impl DomTools {
    /// Bind to a document. Fails when the document has no root element,
    /// so the document/window selections are guaranteed non-empty from
    /// the start.
    pub fn new(doc: DocumentHandle) -> QueryResult<Self> {
        Self::with_config(doc, Config::default())
    }

    /// Bind to a document with explicit configuration
    pub fn with_config(doc: DocumentHandle, config: Config) -> QueryResult<Self> {
        let tools = Self {
            doc,
            config: Rc::new(RefCell::new(config)),
            scheduler: RefCell::new(LoadScheduler::new()),
            plugins: RefCell::new(PluginRegistry::new()),
        };
        tools.strict(Arg::Document)?;
        tools.strict(Arg::Window)?;
        Ok(tools)
    }

    /// Parse markup and bind to the resulting document
    pub fn from_html(html: &str, url: &str) -> QueryResult<Self> {
        let document = HtmlParser::new().parse_with_url(html, url)?;
        Self::new(Rc::new(RefCell::new(document)))
    }

    /// Handle to the bound document
    pub fn document_handle(&self) -> &DocumentHandle {
        &self.doc
    }

    /// Current configuration snapshot
    pub fn config(&self) -> Config {
        *self.config.borrow()
    }

    /// Mutate the shared configuration; takes effect for every call
    /// evaluated afterwards, including on selections already produced
    pub fn configure(&self, update: impl FnOnce(&mut Config)) {
        update(&mut self.config.borrow_mut());
    }

    /// The shared configuration cell
    pub fn config_handle(&self) -> &ConfigHandle {
        &self.config
    }

    /// Dispatch on the runtime kind of the argument
    pub fn dispatch(&self, arg: Arg) -> QueryResult<Dispatched> {
        match arg {
            Arg::Selector(selector) => resolve(
                &self.doc,
                &self.config,
                &selector,
                ResolveRoot::Document,
                false,
            )
            .map(Dispatched::Selection),
            Arg::Ready(callback) => {
                self.on_ready(callback);
                Ok(Dispatched::Scheduled)
            }
            Arg::Element(id) => self.wrap_element(id).map(Dispatched::Selection),
            Arg::Elements(ids) => Ok(Dispatched::Selection(Selection::snapshot(
                &self.doc,
                &self.config,
                ids,
            ))),
            Arg::Selection(selection) => Ok(Dispatched::Selection(selection)),
            Arg::Document => self
                .global_selection(GlobalTarget::Document)
                .map(Dispatched::Selection),
            Arg::Window => self
                .global_selection(GlobalTarget::Window)
                .map(Dispatched::Selection),
        }
    }

    /// Dispatch with failure-on-empty forced for the duration of this one
    /// call; the previous flag is restored afterwards either way
    pub fn strict(&self, arg: Arg) -> QueryResult<Dispatched> {
        let previous = {
            let mut config = self.config.borrow_mut();
            std::mem::replace(&mut config.fail_fast, true)
        };
        let result = self.dispatch(arg);
        self.config.borrow_mut().fail_fast = previous;

        let dispatched = result?;
        if let Dispatched::Selection(selection) = &dispatched {
            if selection.is_empty() {
                return Err(QueryError::EmptySelection {
                    operation: "strict dispatch",
                });
            }
        }
        Ok(dispatched)
    }

    /// Resolve a selector at the document root
    pub fn query(&self, selector: &str) -> QueryResult<Selection> {
        resolve(
            &self.doc,
            &self.config,
            selector,
            ResolveRoot::Document,
            false,
        )
    }

    /// Resolve a selector with the general query forced
    pub fn query_static(&self, selector: &str) -> QueryResult<Selection> {
        resolve(
            &self.doc,
            &self.config,
            selector,
            ResolveRoot::Document,
            true,
        )
    }

    /// Wrap one element
    pub fn wrap_element(&self, id: NodeId) -> QueryResult<Selection> {
        let is_element = self
            .doc
            .borrow()
            .get(id)
            .is_some_and(domkit_dom::Node::is_element);
        if is_element {
            Ok(Selection::single(&self.doc, &self.config, id))
        } else {
            soft_or(
                &self.config.borrow(),
                Selection::empty(&self.doc, &self.config),
                QueryError::UnrecognizedTarget,
            )
        }
    }

    /// Wrap an element list as a fixed snapshot
    pub fn wrap_elements(&self, ids: Vec<NodeId>) -> Selection {
        Selection::snapshot(&self.doc, &self.config, ids)
    }

    /// The document selection: queries and content go through the root
    /// element, events go to the document object itself
    pub fn document(&self) -> QueryResult<Selection> {
        self.global_selection(GlobalTarget::Document)
    }

    /// The window selection, anchored at the root element
    pub fn window(&self) -> QueryResult<Selection> {
        self.global_selection(GlobalTarget::Window)
    }

    fn global_selection(&self, global: GlobalTarget) -> QueryResult<Selection> {
        let element = self.doc.borrow().document_element();
        match element {
            Some(element) => Ok(Selection::target(&self.doc, &self.config, global, element)),
            None => soft_or(
                &self.config.borrow(),
                Selection::empty(&self.doc, &self.config),
                QueryError::NoDocumentElement,
            ),
        }
    }

    // ---- load deferral ----

    /// Run the callback once the document has loaded; immediately when it
    /// already has
    pub fn on_ready(&self, callback: impl FnOnce() + 'static) {
        if self.scheduler.borrow().has_fired() {
            callback();
            return;
        }
        self.scheduler.borrow_mut().schedule(callback);
    }

    /// The one-time document-loaded transition. Pending callbacks run in
    /// enqueue order; the scheduler borrow is released first, so they may
    /// schedule further work (which then runs immediately).
    pub fn mark_loaded(&self) {
        let pending = self.scheduler.borrow_mut().fire();
        for callback in pending {
            callback();
        }
    }

    /// Whether the document-loaded transition has happened
    pub fn is_loaded(&self) -> bool {
        self.scheduler.borrow().has_fired()
    }

    // ---- extensions ----

    /// Register a batch of extensions; collisions are skipped and
    /// reported, never raised
    pub fn register_plugins(&self, batch: PluginBatch) -> RegistrationReport {
        self.plugins.borrow_mut().register(batch)
    }

    /// Call a registered extension by name on a selection
    pub fn invoke(&self, name: &str, selection: &Selection) -> QueryResult<()> {
        let func = self.plugins.borrow().get(name).cloned();
        match func {
            Some(func) => {
                func(selection);
                Ok(())
            }
            None => Err(QueryError::UnknownExtension(name.to_string())),
        }
    }
}

/// Convenience: bind to a freshly scaffolded empty document
pub fn empty_document(url: &str) -> DocumentHandle {
    Rc::new(RefCell::new(Document::new(url)))
}
