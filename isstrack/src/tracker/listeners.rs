//! Observer lists for tracker events.
//!
//! Each listener runs inside its own `catch_unwind`, so a panicking consumer
//! is logged and skipped while the remaining listeners still see the event.

use std::panic::{catch_unwind, AssertUnwindSafe};

use super::state::{StatusEvent, TrackerError};
use crate::position::Position;

/// Called with each new fix (not with animation frames).
pub type PositionListener = Box<dyn Fn(&Position) + Send + Sync>;

/// Called when a poll cycle fails.
pub type ErrorListener = Box<dyn Fn(&TrackerError) + Send + Sync>;

/// Called on lifecycle transitions.
pub type StatusListener = Box<dyn Fn(StatusEvent) + Send + Sync>;

/// Registered listeners, grouped by event kind.
#[derive(Default)]
pub struct Listeners {
    position: Vec<PositionListener>,
    error: Vec<ErrorListener>,
    status: Vec<StatusListener>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_position(&mut self, listener: PositionListener) {
        self.position.push(listener);
    }

    pub fn add_error(&mut self, listener: ErrorListener) {
        self.error.push(listener);
    }

    pub fn add_status(&mut self, listener: StatusListener) {
        self.status.push(listener);
    }

    pub fn emit_position(&self, position: &Position) {
        for (index, listener) in self.position.iter().enumerate() {
            guarded("position", index, || listener(position));
        }
    }

    pub fn emit_error(&self, error: &TrackerError) {
        for (index, listener) in self.error.iter().enumerate() {
            guarded("error", index, || listener(error));
        }
    }

    pub fn emit_status(&self, event: StatusEvent) {
        for (index, listener) in self.status.iter().enumerate() {
            guarded("status", index, || listener(event));
        }
    }

    /// Drop every listener.
    pub fn clear(&mut self) {
        self.position.clear();
        self.error.clear();
        self.status.clear();
    }

    pub fn len(&self) -> usize {
        self.position.len() + self.error.len() + self.status.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("position", &self.position.len())
            .field("error", &self.error.len())
            .field("status", &self.status.len())
            .finish()
    }
}

fn guarded(kind: &'static str, index: usize, call: impl FnOnce()) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(call)) {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!(kind, index, panic = %message, "Listener panicked");
    }
}
