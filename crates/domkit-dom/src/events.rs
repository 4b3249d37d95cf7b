//! DOM Events
//!
//! Listener registration and synchronous dispatch. Delivery is
//! target-only; the host does not model capture or bubble phases.

use std::cell::Cell;
use std::rc::Rc;

use crate::{DocumentHandle, NodeId};

/// What a listener is attached to. The document and the window are
/// event targets in their own right, distinct from any element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Node(NodeId),
    Document,
    Window,
}

/// A dispatched event
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub target: EventTarget,
}

impl Event {
    pub fn new(event_type: &str, target: EventTarget) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
        }
    }
}

thread_local! {
    static NEXT_HANDLER_SERIAL: Cell<u64> = const { Cell::new(0) };
}

/// Cloneable callback wrapper. Clones share identity, so the same
/// handler value that was registered can later be passed to remove it.
#[derive(Clone)]
pub struct EventHandler {
    serial: u64,
    callback: Rc<dyn Fn(&Event)>,
}

impl EventHandler {
    pub fn new(callback: impl Fn(&Event) + 'static) -> Self {
        let serial = NEXT_HANDLER_SERIAL.with(|next| {
            let serial = next.get();
            next.set(serial + 1);
            serial
        });
        Self {
            serial,
            callback: Rc::new(callback),
        }
    }

    /// Identity used for removal
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Invoke the wrapped callback
    pub fn call(&self, event: &Event) {
        (self.callback)(event);
    }
}

impl std::fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHandler")
            .field("serial", &self.serial)
            .finish()
    }
}

struct ListenerEntry {
    target: EventTarget,
    event_type: String,
    handler: EventHandler,
    once: bool,
}

/// Per-document listener table, in registration order
pub(crate) struct ListenerRegistry {
    entries: Vec<ListenerEntry>,
}

impl ListenerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add(&mut self, target: EventTarget, event_type: &str, handler: EventHandler, once: bool) {
        self.entries.push(ListenerEntry {
            target,
            event_type: event_type.to_string(),
            handler,
            once,
        });
    }

    fn remove(&mut self, target: EventTarget, event_type: &str, handler: &EventHandler) {
        self.entries.retain(|entry| {
            entry.target != target
                || entry.event_type != event_type
                || entry.handler.serial() != handler.serial()
        });
    }

    fn count(&self, target: EventTarget, event_type: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.target == target && entry.event_type == event_type)
            .count()
    }

    /// Collect the handlers to fire for an event and drop `once` entries.
    fn collect_for_dispatch(&mut self, target: EventTarget, event_type: &str) -> Vec<EventHandler> {
        let matched: Vec<EventHandler> = self
            .entries
            .iter()
            .filter(|entry| entry.target == target && entry.event_type == event_type)
            .map(|entry| entry.handler.clone())
            .collect();
        self.entries
            .retain(|entry| !(entry.target == target && entry.event_type == event_type && entry.once));
        matched
    }
}

impl crate::Document {
    /// Register a listener for an event type on a target
    pub fn add_event_listener(
        &mut self,
        target: EventTarget,
        event_type: &str,
        handler: EventHandler,
        once: bool,
    ) {
        self.listeners.add(target, event_type, handler, once);
    }

    /// Remove every listener with the given handler identity for the
    /// target/event-type pair
    pub fn remove_event_listener(
        &mut self,
        target: EventTarget,
        event_type: &str,
        handler: &EventHandler,
    ) {
        self.listeners.remove(target, event_type, handler);
    }

    /// Number of listeners registered for a target/event-type pair
    pub fn listener_count(&self, target: EventTarget, event_type: &str) -> usize {
        self.listeners.count(target, event_type)
    }
}

/// Dispatch an event to a target's listeners, in registration order.
/// The document borrow is released before any callback runs, so handlers
/// may freely query and mutate the document. Returns the number of
/// handlers invoked.
pub fn dispatch(doc: &DocumentHandle, target: EventTarget, event_type: &str) -> usize {
    let handlers = doc
        .borrow_mut()
        .listeners
        .collect_for_dispatch(target, event_type);
    tracing::debug!(event_type, count = handlers.len(), "dispatching event");

    let event = Event::new(event_type, target);
    for handler in &handlers {
        handler.call(&event);
    }
    handlers.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;
    use std::cell::RefCell;

    fn doc() -> DocumentHandle {
        Rc::new(RefCell::new(Document::new("about:blank")))
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let doc = doc();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b"] {
            let log = log.clone();
            let handler = EventHandler::new(move |_| log.borrow_mut().push(tag));
            doc.borrow_mut()
                .add_event_listener(EventTarget::Document, "click", handler, false);
        }

        assert_eq!(dispatch(&doc, EventTarget::Document, "click"), 2);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn test_remove_by_identity() {
        let doc = doc();
        let fired = Rc::new(Cell::new(0u32));
        let fired2 = fired.clone();
        let handler = EventHandler::new(move |_| fired2.set(fired2.get() + 1));

        doc.borrow_mut().add_event_listener(
            EventTarget::Window,
            "resize",
            handler.clone(),
            false,
        );
        doc.borrow_mut()
            .remove_event_listener(EventTarget::Window, "resize", &handler);

        assert_eq!(dispatch(&doc, EventTarget::Window, "resize"), 0);
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn test_once_auto_detaches() {
        let doc = doc();
        let fired = Rc::new(Cell::new(0u32));
        let fired2 = fired.clone();
        let handler = EventHandler::new(move |_| fired2.set(fired2.get() + 1));

        doc.borrow_mut()
            .add_event_listener(EventTarget::Document, "load", handler, true);

        dispatch(&doc, EventTarget::Document, "load");
        dispatch(&doc, EventTarget::Document, "load");
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_handler_may_touch_document() {
        let doc = doc();
        let doc2 = doc.clone();
        let handler = EventHandler::new(move |_| {
            let mut d = doc2.borrow_mut();
            let body = d.body().unwrap();
            let div = d.create_element("div");
            d.append_child(body, div);
        });
        doc.borrow_mut()
            .add_event_listener(EventTarget::Document, "click", handler, false);

        let before = doc.borrow().len();
        dispatch(&doc, EventTarget::Document, "click");
        assert_eq!(doc.borrow().len(), before + 1);
    }
}
