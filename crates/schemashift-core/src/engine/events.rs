//! Set lifecycle events.
//!
//! A [`MigrationSet`](crate::engine::MigrationSet) notifies a registered
//! sink once per warning and once per applied or reverted step. The
//! shipped sink forwards to `tracing`; tests register recording sinks.

use tracing::{info, warn};

use super::step::Direction;

/// A lifecycle notification from a migration set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetEvent {
    /// Something odd but non-fatal was noticed (e.g. persisted history
    /// referencing a script missing on disk).
    Warning(String),
    /// A step was applied or reverted.
    Migration {
        /// Title of the step.
        title: String,
        /// Direction it ran in.
        direction: Direction,
    },
}

/// Receiver for set lifecycle events.
pub trait EventSink: Send + Sync {
    /// Handle one event. Called exactly once per event.
    fn emit(&self, event: SetEvent);
}

/// Sink that forwards events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: SetEvent) {
        match event {
            SetEvent::Warning(message) => warn!("{message}"),
            SetEvent::Migration { title, direction } => match direction {
                Direction::Up => info!(migration = %title, "applied"),
                Direction::Down => info!(migration = %title, "reverted"),
            },
        }
    }
}

/// Sink that discards events.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: SetEvent) {}
}
