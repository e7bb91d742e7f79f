//! Per-dispatch shared state.

use serde::Serialize;

use crate::keyring::ContextKeyring;

/// A path whose handler ran, and the pass it ran in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandledPath {
    pub run: u32,
    pub path: String,
}

/// State threaded through one top-level dispatch and all of its passes.
///
/// Handlers use it to share values through the context bag (readable by
/// later parameters declared with the context source) and to request another
/// pass over all paths.
#[derive(Debug, Default)]
pub struct RequestContext {
    run: u32,
    passes: u32,
    continue_requested: bool,
    bag: ContextKeyring,
    current_path: Option<String>,
    handled: Vec<HandledPath>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the current pass, starting at 0.
    pub fn run(&self) -> u32 {
        self.run
    }

    /// Passes executed so far by this context.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Ask the dispatcher to stop the current pass and start another one.
    pub fn request_another_pass(&mut self) {
        self.continue_requested = true;
    }

    pub fn is_continuation_requested(&self) -> bool {
        self.continue_requested
    }

    pub fn bag(&self) -> &ContextKeyring {
        &self.bag
    }

    pub fn bag_mut(&mut self) -> &mut ContextKeyring {
        &mut self.bag
    }

    /// Path currently being matched or handled.
    pub fn current_path(&self) -> Option<&str> {
        self.current_path.as_deref()
    }

    /// Handlers that ran, in order.
    pub fn handled(&self) -> &[HandledPath] {
        &self.handled
    }

    /// Moves to the next pass of a re-entered dispatch.
    pub(crate) fn advance_run(&mut self) {
        self.run += 1;
        self.continue_requested = false;
    }

    pub(crate) fn start_pass(&mut self) {
        self.passes += 1;
    }

    pub(crate) fn enter_path(&mut self, name: &str) {
        self.current_path = Some(name.to_string());
    }

    pub(crate) fn record_handled(&mut self, name: &str) {
        self.handled.push(HandledPath {
            run: self.run,
            path: name.to_string(),
        });
    }
}
