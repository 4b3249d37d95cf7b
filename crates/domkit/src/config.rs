//! Configuration
//!
//! Flags are injected: the entry point owns one shared cell and clones the
//! handle into every selection it produces, so each call reads the flags
//! as they are at that moment without touching ambient globals.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Behavior flags for the resolver and container operations
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Permit falling back to a general selector query when no fast path
    /// matches
    pub allow_query_fallback: bool,
    /// Raise on empty/invalid instead of returning empty defaults
    pub fail_fast: bool,
    /// Extra diagnostic logging, no behavioral effect
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allow_query_fallback: true,
            fail_fast: false,
            verbose: false,
        }
    }
}

/// Shared, mutable-at-any-time configuration cell
pub type ConfigHandle = Rc<RefCell<Config>>;
