//! Migration sets.

use std::fmt;
use std::sync::Arc;

use super::events::{EventSink, NullSink, SetEvent};
use super::step::MigrationStep;

/// The ordered migrations for one entity, plus the marker of the most
/// recently applied step.
pub struct MigrationSet {
    /// Entity this set belongs to.
    pub entity: String,
    /// Steps in ascending title order.
    pub migrations: Vec<MigrationStep>,
    /// Title of the most recently applied step, if any.
    pub last_run: Option<String>,
    sink: Arc<dyn EventSink>,
}

impl MigrationSet {
    /// Create an empty set for an entity. Events are discarded until a
    /// sink is registered with [`subscribe`](Self::subscribe).
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            migrations: Vec::new(),
            last_run: None,
            sink: Arc::new(NullSink),
        }
    }

    /// Register the sink that receives this set's lifecycle events.
    pub fn subscribe(&mut self, sink: Arc<dyn EventSink>) {
        self.sink = sink;
    }

    /// Append a step. Steps must be added in ascending title order.
    pub fn add_step(&mut self, step: MigrationStep) {
        self.migrations.push(step);
    }

    /// Index of the step with the given title.
    pub fn position(&self, title: &str) -> Option<usize> {
        self.migrations.iter().position(|m| m.title == title)
    }

    /// Steps that have been applied, in set order.
    pub fn applied(&self) -> impl Iterator<Item = &MigrationStep> {
        self.migrations.iter().filter(|m| m.is_applied())
    }

    /// Deliver an event to the registered sink.
    pub(crate) fn emit(&self, event: SetEvent) {
        self.sink.emit(event);
    }
}

impl fmt::Debug for MigrationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationSet")
            .field("entity", &self.entity)
            .field("migrations", &self.migrations)
            .field("last_run", &self.last_run)
            .finish_non_exhaustive()
    }
}
