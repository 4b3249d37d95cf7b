//! Errors
//!
//! One taxonomy for the resolver and the container, with the dual
//! soft/strict policy: under the default configuration most failures
//! degrade to an empty or default result, under `fail_fast` they raise.

use domkit_dom::SelectorError;
use thiserror::Error;

use crate::config::Config;

/// Query-layer failure
#[derive(Debug, Error)]
pub enum QueryError {
    /// A lookup matched nothing
    #[error("no match for selector {selector:?}")]
    NoMatch { selector: String },
    /// An operation needed at least one element
    #[error("no elements in selection for `{operation}`")]
    EmptySelection { operation: &'static str },
    /// No fast path applied and the general-query fallback is disabled
    #[error("selector {selector:?} needs a general query but the fallback is disabled")]
    FallbackDisabled { selector: String },
    /// An attribute read found nothing to return
    #[error("attribute {name:?} not present")]
    MissingAttribute { name: String },
    /// An operation received a value it cannot use
    #[error("unsupported argument: {0}")]
    UnsupportedArgument(&'static str),
    /// The element has no parent element
    #[error("element lacks a parent")]
    MissingParent,
    /// The element has no checked state
    #[error("element is not a checkbox")]
    NotCheckable,
    /// The element type cannot carry dataset values
    #[error("element is not capable of storing data")]
    NoDataset,
    /// No extension registered under this name
    #[error("unknown extension {0:?}")]
    UnknownExtension(String),
    /// The wrapped value is not something the entry point recognizes
    #[error("unrecognized wrap target")]
    UnrecognizedTarget,
    /// The document has no root element to stand in for document/window
    #[error("document element not available")]
    NoDocumentElement,
    /// The general query rejected the selector
    #[error(transparent)]
    Selector(#[from] SelectorError),
    /// Markup could not be parsed
    #[error(transparent)]
    Markup(#[from] domkit_html::ParseError),
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Resolve the dual policy: propagate under `fail_fast`, otherwise log
/// and fall back to the given default.
pub(crate) fn soft_or<T>(config: &Config, default: T, err: QueryError) -> QueryResult<T> {
    if config.fail_fast {
        return Err(err);
    }
    if config.verbose {
        tracing::warn!("{err}");
    }
    Ok(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_or_default_mode() {
        let config = Config::default();
        let value = soft_or(&config, 7, QueryError::EmptySelection { operation: "attr" });
        assert_eq!(value.unwrap(), 7);
    }

    #[test]
    fn test_soft_or_fail_fast() {
        let config = Config {
            fail_fast: true,
            ..Config::default()
        };
        let value = soft_or(&config, 7, QueryError::EmptySelection { operation: "attr" });
        assert!(matches!(
            value,
            Err(QueryError::EmptySelection { operation: "attr" })
        ));
    }
}
