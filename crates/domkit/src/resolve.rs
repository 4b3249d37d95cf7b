//! Selector Resolver
//!
//! Routes a selector string to the cheapest native lookup its shape
//! permits: class, id, name-attribute, tag, or element creation. Anything
//! else defers to the general query. The fast paths are only taken when
//! the identifier window cannot possibly be a compound CSS expression, so
//! routing never changes what a selector matches.

use domkit_dom::{DocumentHandle, NodeId};

use crate::config::ConfigHandle;
use crate::error::{QueryError, QueryResult, soft_or};
use crate::selection::{LiveQuery, Selection};

/// Lookup root for a resolution. Id, name, and creation fast paths are
/// inherently document-global and are refused for element roots.
#[derive(Debug, Clone, Copy)]
pub enum ResolveRoot {
    /// The global document
    Document,
    /// A specific element (descendant search)
    Element(NodeId),
}

/// Plain identifier check: non-empty, every byte in `[0-9A-Za-z_-]`.
/// This is the token set the native lookups match against, so a selector
/// that passes cannot carry combinators, pseudo-classes, or any other
/// compound syntax.
fn is_plain_identifier(bytes: &[u8]) -> bool {
    !bytes.is_empty()
        && bytes
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Extract the value of an exact `[name=value]` / `[name="value"]` shape
fn name_attribute_value(selector: &str) -> Option<&str> {
    let rest = selector.strip_prefix("[name=")?;
    let value = match rest.strip_prefix('"') {
        Some(quoted) => quoted.strip_suffix("\"]")?,
        None => rest.strip_suffix(']')?,
    };
    is_plain_identifier(value.as_bytes()).then_some(value)
}

/// Extract the tag of an exact `<tagname>` shape
fn creation_tag(selector: &str) -> Option<&str> {
    let inner = selector.strip_prefix('<')?.strip_suffix('>')?;
    is_plain_identifier(inner.as_bytes()).then_some(inner)
}

/// Resolve a selector against a root.
///
/// `force_query` skips every fast path and always runs the general query,
/// trading speed for full selector generality. Otherwise the first
/// character picks a candidate fast path; a candidate that fails shape
/// validation falls through to the general query (or to the empty/raise
/// policy when the fallback is disabled).
pub fn resolve(
    doc: &DocumentHandle,
    config: &ConfigHandle,
    selector: &str,
    root: ResolveRoot,
    force_query: bool,
) -> QueryResult<Selection> {
    let root_id = match root {
        ResolveRoot::Document => doc.borrow().root(),
        ResolveRoot::Element(id) => id,
    };
    let root_is_document = matches!(root, ResolveRoot::Document);
    let verbose = config.borrow().verbose;

    // general queries return static element lists, so forcing one is an
    // option when a live view is not wanted
    if force_query {
        if verbose {
            tracing::debug!(selector, "resolver: forced general query");
        }
        return general_query(doc, config, selector, root_id);
    }

    let bytes = selector.as_bytes();
    match bytes.first().copied() {
        // fast-track .class
        Some(b'.') if is_plain_identifier(&bytes[1..]) => {
            if verbose {
                tracing::debug!(selector, "resolver: class fast path");
            }
            return Ok(Selection::live(
                doc,
                config,
                LiveQuery::by_class(root_id, &selector[1..]),
            ));
        }
        // fast-track #id; id lookup is document-global, so a narrower
        // root must not take it
        Some(b'#') if root_is_document && is_plain_identifier(&bytes[1..]) => {
            if verbose {
                tracing::debug!(selector, "resolver: id fast path");
            }
            let found = doc.borrow().get_element_by_id(&selector[1..]);
            return match found {
                Some(id) => Ok(Selection::single(doc, config, id)),
                None => soft_or(
                    &config.borrow(),
                    Selection::empty(doc, config),
                    QueryError::NoMatch {
                        selector: selector.to_string(),
                    },
                ),
            };
        }
        // fast-track [name="foobar"]
        Some(b'[') if root_is_document => {
            if let Some(value) = name_attribute_value(selector) {
                if verbose {
                    tracing::debug!(selector, "resolver: name fast path");
                }
                return Ok(Selection::live(
                    doc,
                    config,
                    LiveQuery::by_name(root_id, value),
                ));
            }
        }
        // create element via <tagname>
        Some(b'<') if root_is_document => {
            if let Some(tag) = creation_tag(selector) {
                if verbose {
                    tracing::debug!(selector, "resolver: element creation");
                }
                let id = doc.borrow_mut().create_element(tag);
                return Ok(Selection::single(doc, config, id));
            }
        }
        // fast-track tagname
        Some(_) if is_plain_identifier(bytes) => {
            if verbose {
                tracing::debug!(selector, "resolver: tag fast path");
            }
            return Ok(Selection::live(
                doc,
                config,
                LiveQuery::by_tag(root_id, selector),
            ));
        }
        _ => {}
    }

    if config.borrow().allow_query_fallback {
        if verbose {
            tracing::debug!(selector, "resolver: general query fallback");
        }
        general_query(doc, config, selector, root_id)
    } else {
        soft_or(
            &config.borrow(),
            Selection::empty(doc, config),
            QueryError::FallbackDisabled {
                selector: selector.to_string(),
            },
        )
    }
}

fn general_query(
    doc: &DocumentHandle,
    config: &ConfigHandle,
    selector: &str,
    root: NodeId,
) -> QueryResult<Selection> {
    let result = doc.borrow().query_selector_all(root, selector);
    match result {
        Ok(ids) => Ok(Selection::snapshot(doc, config, ids)),
        Err(err) => soft_or(
            &config.borrow(),
            Selection::empty(doc, config),
            err.into(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_identifier() {
        assert!(is_plain_identifier(b"div"));
        assert!(is_plain_identifier(b"my-tag_2"));
        assert!(is_plain_identifier(b"9lives"));
        assert!(!is_plain_identifier(b""));
        assert!(!is_plain_identifier(b"a b"));
        assert!(!is_plain_identifier(b"a.b"));
        assert!(!is_plain_identifier(b"a>b"));
        assert!(!is_plain_identifier(b"a:hover"));
    }

    #[test]
    fn test_name_attribute_shape() {
        assert_eq!(name_attribute_value("[name=q]"), Some("q"));
        assert_eq!(name_attribute_value(r#"[name="q"]"#), Some("q"));
        assert_eq!(name_attribute_value("[name=]"), None);
        assert_eq!(name_attribute_value(r#"[name="q]"#), None);
        assert_eq!(name_attribute_value("[name=a b]"), None);
        assert_eq!(name_attribute_value("[id=q]"), None);
        assert_eq!(name_attribute_value("[name=q][x]"), None);
    }

    #[test]
    fn test_creation_shape() {
        assert_eq!(creation_tag("<div>"), Some("div"));
        assert_eq!(creation_tag("<my-element>"), Some("my-element"));
        assert_eq!(creation_tag("<>"), None);
        assert_eq!(creation_tag("<div"), None);
        assert_eq!(creation_tag("<div><p>"), None);
    }
}
