//! Extension Registry
//!
//! A closed registry of named extension functions consulted by
//! `DomTools::invoke`, instead of injecting members into the container
//! type. Registration validates names against the built-in operation set
//! and prior registrations; a rejected entry is skipped and reported,
//! never raised, and the rest of its batch still registers.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::selection::Selection;

/// An extension: a chained operation over a selection
pub type ExtensionFn = Rc<dyn Fn(&Selection)>;

/// Names of the container's built-in operations; extensions may not
/// shadow them.
const BUILTIN_METHODS: &[&str] = &[
    "ids",
    "element",
    "get",
    "len",
    "is_empty",
    "require",
    "html",
    "set_html",
    "empty_html",
    "append",
    "append_to_all",
    "append_text",
    "text",
    "set_text",
    "clear_children",
    "attr",
    "set_attr",
    "add_class",
    "add_classes",
    "remove_class",
    "toggle_class",
    "css",
    "set_css",
    "checked",
    "set_checked",
    "value",
    "set_value",
    "dataset",
    "with_data",
    "hide",
    "show",
    "children",
    "parent",
    "find",
    "detach",
    "on",
    "once",
    "off",
    "click",
    "blur",
    "focus",
    "keypress",
    "submit",
    "load",
    "dblclick",
    "keydown",
    "change",
    "resize",
    "mouseenter",
    "keyup",
    "scroll",
    "mouseleave",
    "unload",
    "each",
    "map",
    "each_wrapped",
    "map_wrapped",
];

/// A batch of registrations, in any of the accepted shapes
pub enum PluginBatch {
    /// One named function
    Single(String, ExtensionFn),
    /// A flat sequence of name/function pairs
    Pairs(Vec<(String, ExtensionFn)>),
    /// A name-to-function mapping
    Map(BTreeMap<String, ExtensionFn>),
}

impl PluginBatch {
    fn into_pairs(self) -> Vec<(String, ExtensionFn)> {
        match self {
            Self::Single(name, func) => vec![(name, func)],
            Self::Pairs(pairs) => pairs,
            Self::Map(map) => map.into_iter().collect(),
        }
    }
}

/// Why one entry of a batch was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Name is empty or not a usable method name
    InvalidName,
    /// Name shadows a built-in operation
    BuiltinCollision,
    /// Name was already registered
    AlreadyRegistered,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "invalid name"),
            Self::BuiltinCollision => write!(f, "collides with a built-in operation"),
            Self::AlreadyRegistered => write!(f, "already registered"),
        }
    }
}

/// Outcome of one batch registration. Reported, never raised.
#[derive(Debug, Default)]
pub struct RegistrationReport {
    pub registered: Vec<String>,
    pub rejected: Vec<(String, RejectReason)>,
}

impl RegistrationReport {
    /// Whether any entry of the batch was rejected
    pub fn is_partial(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// The extension registry; append-only for the process lifetime
#[derive(Default)]
pub struct PluginRegistry {
    entries: HashMap<String, ExtensionFn>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a batch, skipping (and reporting) colliding or malformed
    /// entries while the rest of the batch proceeds
    pub fn register(&mut self, batch: PluginBatch) -> RegistrationReport {
        let mut report = RegistrationReport::default();
        for (name, func) in batch.into_pairs() {
            if let Some(reason) = self.validate(&name) {
                tracing::warn!(%name, %reason, "extension registration rejected");
                report.rejected.push((name, reason));
                continue;
            }
            self.entries.insert(name.clone(), func);
            report.registered.push(name);
        }
        report
    }

    fn validate(&self, name: &str) -> Option<RejectReason> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Some(RejectReason::InvalidName);
        }
        if BUILTIN_METHODS.contains(&name) {
            return Some(RejectReason::BuiltinCollision);
        }
        if self.entries.contains_key(name) {
            return Some(RejectReason::AlreadyRegistered);
        }
        None
    }

    /// Look up an extension by name
    pub fn get(&self, name: &str) -> Option<&ExtensionFn> {
        self.entries.get(name)
    }

    /// Whether a name is taken, by a built-in or a registration
    pub fn contains(&self, name: &str) -> bool {
        BUILTIN_METHODS.contains(&name) || self.entries.contains_key(name)
    }

    /// Registered extension names
    pub fn names(&self) -> Vec<&String> {
        self.entries.keys().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> ExtensionFn {
        Rc::new(|_| {})
    }

    #[test]
    fn test_register_single() {
        let mut registry = PluginRegistry::new();
        let report = registry.register(PluginBatch::Single("highlight".into(), noop()));

        assert!(!report.is_partial());
        assert_eq!(report.registered, vec!["highlight"]);
        assert!(registry.get("highlight").is_some());
    }

    #[test]
    fn test_builtin_collision_rejected_batch_continues() {
        let mut registry = PluginRegistry::new();
        let report = registry.register(PluginBatch::Pairs(vec![
            ("html".into(), noop()),
            ("fine".into(), noop()),
        ]));

        assert!(report.is_partial());
        assert_eq!(report.registered, vec!["fine"]);
        assert_eq!(
            report.rejected,
            vec![("html".to_string(), RejectReason::BuiltinCollision)]
        );
        assert!(registry.get("html").is_none());
    }

    #[test]
    fn test_duplicate_and_invalid_names() {
        let mut registry = PluginRegistry::new();
        registry.register(PluginBatch::Single("pulse".into(), noop()));

        let mut map = BTreeMap::new();
        map.insert("pulse".to_string(), noop());
        map.insert("".to_string(), noop());
        map.insert("ok".to_string(), noop());
        let report = registry.register(PluginBatch::Map(map));

        assert_eq!(report.registered, vec!["ok"]);
        assert_eq!(
            report.rejected,
            vec![
                ("".to_string(), RejectReason::InvalidName),
                ("pulse".to_string(), RejectReason::AlreadyRegistered),
            ]
        );
    }
}
