//! Store factory and environment bootstrap.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use schemashift_client::{DocumentApi, EntryQuery};

use crate::error::Error;

use super::cache::EntityStateCache;
use super::remote::{RemoteStateStore, ENTITY_ID_FIELD, STATE_FIELD, STATE_TYPE_ID};
use super::state::PersistedState;

/// Page size of the bulk state fetch. Entities beyond this bound are a
/// known limitation: the cache is truncated and a warning names the
/// shortfall.
pub const BULK_FETCH_LIMIT: usize = 1000;

/// Produces [`RemoteStateStore`]s, guaranteeing the shared bootstrap
/// (default locale, bulk state prefetch) happens exactly once per
/// factory no matter how many stores are requested.
pub struct StoreFactory {
    api: Arc<dyn DocumentApi>,
    dry_run: bool,
    locale: OnceCell<String>,
    cache: Arc<EntityStateCache>,
}

impl StoreFactory {
    /// Create a factory with its own fresh cache. No remote calls until
    /// [`bootstrap`](Self::bootstrap).
    pub fn new(api: Arc<dyn DocumentApi>, dry_run: bool) -> Self {
        Self::with_cache(api, Arc::new(EntityStateCache::new()), dry_run)
    }

    /// Create a factory over explicit shared cache state.
    pub fn with_cache(
        api: Arc<dyn DocumentApi>,
        cache: Arc<EntityStateCache>,
        dry_run: bool,
    ) -> Self {
        Self {
            api,
            dry_run,
            locale: OnceCell::new(),
            cache,
        }
    }

    /// Resolve the default locale, then prefetch every entity's state in
    /// one bulk query. Both results are memoized; calling this again
    /// performs no further remote calls.
    pub async fn bootstrap(&self) -> Result<(), Error> {
        let locale = self
            .locale
            .get_or_try_init(|| resolve_default_locale(self.api.as_ref()))
            .await?
            .clone();
        debug!(%locale, "resolved default locale");
        self.cache
            .populate(|| fetch_states(Arc::clone(&self.api), locale))
            .await
    }

    /// A store bound to one entity, the resolved locale, and the shared
    /// cache. Performs no remote call. Fails when the factory has not
    /// bootstrapped.
    pub fn new_store(&self, entity: &str) -> Result<RemoteStateStore, Error> {
        let locale = self.locale.get().ok_or(Error::NotBootstrapped)?;
        Ok(RemoteStateStore::new(
            Arc::clone(&self.api),
            Arc::clone(&self.cache),
            entity,
            locale.clone(),
            self.dry_run,
        ))
    }
}

async fn resolve_default_locale(api: &dyn DocumentApi) -> Result<String, Error> {
    let locales = api.locales().await?;
    locales
        .into_iter()
        .find(|locale| locale.is_default)
        .map(|locale| locale.code)
        .ok_or_else(|| Error::Bootstrap("environment has no default locale".to_string()))
}

async fn fetch_states(
    api: Arc<dyn DocumentApi>,
    locale: String,
) -> Result<HashMap<String, PersistedState>, Error> {
    let query = EntryQuery::of_type(STATE_TYPE_ID).with_limit(BULK_FETCH_LIMIT);
    let collection = api.entries(&query).await?;
    if collection.total > collection.items.len() {
        warn!(
            total = collection.total,
            fetched = collection.items.len(),
            "state cache truncated at the fetch limit; entities beyond it load as unmigrated"
        );
    }

    let mut states = HashMap::new();
    for entry in collection.items {
        let Some(entity) = entry.field(ENTITY_ID_FIELD, &locale).and_then(Value::as_str) else {
            warn!(entry_id = %entry.sys.id, "skipping state entry without an entity id");
            continue;
        };
        let Some(state_value) = entry.field(STATE_FIELD, &locale) else {
            warn!(entry_id = %entry.sys.id, "skipping state entry without a state field");
            continue;
        };
        let state: PersistedState =
            serde_json::from_value(state_value.clone()).map_err(|e| Error::MalformedState {
                entity: entity.to_string(),
                message: e.to_string(),
            })?;
        states.insert(entity.to_string(), state);
    }
    Ok(states)
}
