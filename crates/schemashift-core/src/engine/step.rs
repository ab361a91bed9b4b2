//! Migration steps.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::context::Transform;

/// Direction a migration set is run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Apply pending steps.
    Up,
    /// Revert applied steps.
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// One reversible unit of schema change.
///
/// A step carries an `applied_at` timestamp once it has been successfully
/// applied; absence of the timestamp means it has never run. Steps are
/// owned by the [`MigrationSet`](crate::engine::MigrationSet) that
/// contains them.
#[derive(Clone)]
pub struct MigrationStep {
    /// Step title: the script's file stem, sorted lexicographically
    /// within the set.
    pub title: String,
    /// Optional human-readable description from the script.
    pub description: Option<String>,
    /// Transformation applied when running up.
    pub up: Option<Arc<dyn Transform>>,
    /// Transformation applied when running down.
    pub down: Option<Arc<dyn Transform>>,
    /// When the step was applied; `None` when never applied.
    pub applied_at: Option<DateTime<Utc>>,
}

impl MigrationStep {
    /// Create a step with no transformations.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            up: None,
            down: None,
            applied_at: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the up transformation.
    pub fn with_up(mut self, transform: Arc<dyn Transform>) -> Self {
        self.up = Some(transform);
        self
    }

    /// Set the down transformation.
    pub fn with_down(mut self, transform: Arc<dyn Transform>) -> Self {
        self.down = Some(transform);
        self
    }

    /// Whether the step has been applied.
    pub fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }

    /// The transformation for a direction, if the step has one.
    pub fn transform(&self, direction: Direction) -> Option<Arc<dyn Transform>> {
        match direction {
            Direction::Up => self.up.clone(),
            Direction::Down => self.down.clone(),
        }
    }

    /// Stamp the step as applied now.
    pub(crate) fn mark_applied(&mut self) {
        self.applied_at = Some(Utc::now());
    }

    /// Clear the applied stamp after a revert.
    pub(crate) fn clear_applied(&mut self) {
        self.applied_at = None;
    }
}

impl fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationStep")
            .field("title", &self.title)
            .field("applied_at", &self.applied_at)
            .field("has_up", &self.up.is_some())
            .field("has_down", &self.down.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Up.to_string(), "up");
        assert_eq!(Direction::Down.to_string(), "down");
    }

    #[test]
    fn test_applied_stamp() {
        let mut step = MigrationStep::new("001-create");
        assert!(!step.is_applied());

        step.mark_applied();
        assert!(step.is_applied());

        step.clear_applied();
        assert!(!step.is_applied());
    }
}
