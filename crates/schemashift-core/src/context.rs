//! Per-step execution context and the transformation contract.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use schemashift_client::DocumentApi;

use crate::error::Error;

/// Everything a step's transformation receives when it runs: the scope it
/// operates in, the dry-run flag, and an authenticated API handle.
///
/// The orchestrator binds one context per entity and hands it to the
/// runner, which passes it to every transform invocation.
#[derive(Clone)]
pub struct MigrationContext {
    /// Space the run targets.
    pub space_id: String,
    /// Environment within the space.
    pub environment_id: String,
    /// Entity whose definition is being migrated.
    pub entity: String,
    /// When set, transforms must not perform remote writes.
    pub dry_run: bool,
    /// Authenticated document API shared across the run.
    pub api: Arc<dyn DocumentApi>,
}

impl fmt::Debug for MigrationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationContext")
            .field("space_id", &self.space_id)
            .field("environment_id", &self.environment_id)
            .field("entity", &self.entity)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

/// One directional transformation of a migration step.
///
/// Opaque to the engine: the runner only invokes it and observes success
/// or failure, exactly once per step execution.
#[async_trait]
pub trait Transform: Send + Sync {
    /// Apply the transformation within the given context.
    async fn apply(&self, ctx: &MigrationContext) -> Result<(), Error>;
}
