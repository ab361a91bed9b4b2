//! State persistence for migration sets.
//!
//! Applied history lives in remote documents, one entry per entity,
//! under the reserved `migration` entity type. The cache and factory
//! guarantee that bootstrap work (locale resolution, bulk state fetch)
//! happens exactly once per factory, before any store is handed out.

pub mod cache;
pub mod factory;
pub mod remote;
pub mod state;

pub use cache::EntityStateCache;
pub use factory::{StoreFactory, BULK_FETCH_LIMIT};
pub use remote::{RemoteStateStore, ENTITY_ID_FIELD, STATE_FIELD, STATE_TYPE_ID};
pub use state::{AppliedMigration, PersistedState};

use async_trait::async_trait;

use crate::engine::MigrationSet;
use crate::error::Error;

/// The storage contract the execution engine runs against.
///
/// Each operation completes with success or failure, exactly once.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// One-time environment bootstrap: ensure the reserved entity type
    /// for state documents exists. Idempotent.
    async fn init(&self) -> Result<(), Error>;

    /// The persisted state for this store's entity. An entity with no
    /// record yields an empty state, not an error.
    async fn load(&self) -> Result<PersistedState, Error>;

    /// Persist a snapshot of the set's applied history.
    async fn save(&self, set: &MigrationSet) -> Result<(), Error>;
}
