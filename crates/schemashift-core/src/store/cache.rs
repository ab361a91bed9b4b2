//! Populate-once cache of every entity's persisted state.

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::OnceCell;

use crate::error::Error;

use super::state::PersistedState;

/// Mapping from entity identifier to its persisted state, filled by one
/// bulk fetch.
///
/// The cache is explicit shared state owned by a
/// [`StoreFactory`](crate::store::StoreFactory), not a process-wide
/// singleton: separate factories (separate orchestration runs, tests)
/// each carry their own. The first successful [`populate`](Self::populate)
/// wins; afterwards the cache is read-only.
#[derive(Debug, Default)]
pub struct EntityStateCache {
    states: OnceCell<HashMap<String, PersistedState>>,
}

impl EntityStateCache {
    /// Create an unpopulated cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the cache with `fetch`'s result, unless an earlier call
    /// already succeeded. Concurrent callers share one in-flight fetch;
    /// a failed fetch leaves the cache unpopulated so a later call can
    /// retry.
    pub async fn populate<F, Fut>(&self, fetch: F) -> Result<(), Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<HashMap<String, PersistedState>, Error>>,
    {
        self.states.get_or_try_init(fetch).await.map(|_| ())
    }

    /// Whether the cache has been populated.
    pub fn is_populated(&self) -> bool {
        self.states.initialized()
    }

    /// The persisted state for an entity. An entity absent from the
    /// cache yields an empty state; a cache that was never populated is
    /// a bootstrap-ordering bug and yields an error.
    pub fn lookup(&self, entity: &str) -> Result<PersistedState, Error> {
        let states = self.states.get().ok_or(Error::NotBootstrapped)?;
        Ok(states.get(entity).cloned().unwrap_or_default())
    }
}
