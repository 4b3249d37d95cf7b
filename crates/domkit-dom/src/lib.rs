//! domkit-dom - Host DOM tree
//!
//! Arena-based DOM with the native lookup primitives the query layer
//! dispatches to: element-by-id, elements-by-class/tag/name, element
//! creation, attribute/class/style access, event listener registration,
//! and a selector-matching engine for general queries.

use std::cell::RefCell;
use std::rc::Rc;

mod attributes;
mod document;
mod events;
mod node;
mod select;
mod serialize;

pub use attributes::{Attr, NamedNodeMap};
pub use document::Document;
pub use events::{Event, EventHandler, EventTarget, dispatch};
pub use node::{ElementData, Namespace, Node, NodeData};
pub use select::{SelectorError, SelectorList};
pub use serialize::{inner_html, outer_html};

/// Shared handle to a document. The DOM is single-threaded; every
/// wrapper and query layer clones this handle instead of owning the tree.
pub type DocumentHandle = Rc<RefCell<Document>>;

/// Node identifier (index into the document arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Whether this id refers to a node at all
    #[inline]
    pub fn is_some(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}
