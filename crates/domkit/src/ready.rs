//! Load Deferral
//!
//! One-shot callback queue keyed on the document-loaded transition.
//! Two states: pending (callbacks accumulate) and fired (callbacks run
//! immediately). The transition is explicit and irreversible.

use std::collections::VecDeque;

/// A deferred callback
pub type Callback = Box<dyn FnOnce()>;

enum State {
    Pending(VecDeque<Callback>),
    Fired,
}

/// The deferred-callback scheduler
pub struct LoadScheduler {
    state: State,
}

impl LoadScheduler {
    pub fn new() -> Self {
        Self {
            state: State::Pending(VecDeque::new()),
        }
    }

    /// Whether the loaded transition has happened
    pub fn has_fired(&self) -> bool {
        matches!(self.state, State::Fired)
    }

    /// Number of callbacks waiting for the transition
    pub fn pending(&self) -> usize {
        match &self.state {
            State::Pending(queue) => queue.len(),
            State::Fired => 0,
        }
    }

    /// Run the callback now if the document has loaded, otherwise queue
    /// it. Queued callbacks cannot be withdrawn.
    pub fn schedule(&mut self, callback: impl FnOnce() + 'static) {
        match &mut self.state {
            State::Pending(queue) => queue.push_back(Box::new(callback)),
            State::Fired => callback(),
        }
    }

    /// The loaded transition: switch to immediate invocation and hand the
    /// pending callbacks back, in enqueue order, for the caller to run.
    /// Splitting the transition from the invocation lets a caller holding
    /// this scheduler behind a cell release it before callbacks run.
    /// Later calls return nothing.
    pub fn fire(&mut self) -> VecDeque<Callback> {
        match std::mem::replace(&mut self.state, State::Fired) {
            State::Pending(queue) => {
                tracing::debug!(count = queue.len(), "document loaded, draining queue");
                queue
            }
            State::Fired => VecDeque::new(),
        }
    }

    /// The loaded transition, running the pending callbacks in place
    pub fn mark_loaded(&mut self) {
        for callback in self.fire() {
            callback();
        }
    }
}

impl Default for LoadScheduler {
    fn default() -> Self {
        Self::new()
    }
}
