//! Persisted applied-history documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::MigrationSet;

/// One applied step as recorded in a state document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedMigration {
    /// Step title.
    pub title: String,
    /// Description carried by the script, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the step was applied.
    #[serde(rename = "timestamp")]
    pub applied_at: DateTime<Utc>,
}

/// The serialized applied history of one entity's migration set.
///
/// A state with zero applied migrations is equivalent to no state at
/// all; the store deletes the remote record instead of persisting an
/// empty one, so "no record" and "record with zero migrations" stay one
/// state for future readers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Title of the most recently applied step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<String>,
    /// Applied steps, in application order.
    #[serde(default)]
    pub migrations: Vec<AppliedMigration>,
}

impl PersistedState {
    /// Snapshot a set's applied history: only steps carrying an applied
    /// timestamp are recorded.
    pub fn from_set(set: &MigrationSet) -> Self {
        let migrations = set
            .migrations
            .iter()
            .filter_map(|step| {
                step.applied_at.map(|applied_at| AppliedMigration {
                    title: step.title.clone(),
                    description: step.description.clone(),
                    applied_at,
                })
            })
            .collect();
        Self {
            last_run: set.last_run.clone(),
            migrations,
        }
    }

    /// Whether the state records no applied migrations.
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}
