//! domkit
//!
//! A DOM query-and-manipulation convenience layer: one entry point that
//! turns a selector string, an element, an element list, or the global
//! document/window into a uniform [`Selection`], plus chained batch
//! operations over it.
//!
//! # Goals
//! - Route plain selectors to the dedicated native lookups instead of the
//!   general selector engine
//! - One polymorphic container, so callers never branch on "one element
//!   vs a list vs nothing"
//!
//! # Example
//! ```rust
//! use domkit::DomTools;
//!
//! let tools = DomTools::from_html("<div id=app></div>", "about:blank")?;
//! let app = tools.query("#app")?;
//! app.set_html("<p class=greeting>hello</p>")?;
//! assert_eq!(app.find(".greeting", false)?.text(), "hello");
//! # Ok::<(), domkit::QueryError>(())
//! ```

mod config;
mod error;
mod plugin;
mod ready;
mod resolve;
mod selection;
mod tools;

pub use config::{Config, ConfigHandle};
pub use error::{QueryError, QueryResult};
pub use plugin::{ExtensionFn, PluginBatch, PluginRegistry, RegistrationReport, RejectReason};
pub use ready::LoadScheduler;
pub use resolve::{ResolveRoot, resolve};
pub use selection::{Content, Dataset, GlobalTarget, Selection};
pub use tools::{Arg, Dispatched, DomTools, empty_document};

// Re-export sub-crates for advanced usage
pub use domkit_dom as dom;
pub use domkit_html as html;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
