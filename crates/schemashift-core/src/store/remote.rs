//! Remote-backed state store.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use schemashift_client::{
    DocumentApi, EntityFieldDef, EntityTypeDef, EntryQuery, Error as ClientError, FieldKind,
};

use crate::engine::MigrationSet;
use crate::error::Error;

use super::cache::EntityStateCache;
use super::state::PersistedState;
use super::StateStore;

/// Identifier of the reserved entity type holding state documents.
pub const STATE_TYPE_ID: &str = "migration";

/// Field carrying the serialized [`PersistedState`].
pub const STATE_FIELD: &str = "state";

/// Field carrying the entity identifier a state document belongs to.
pub const ENTITY_ID_FIELD: &str = "entityId";

/// Ensure the reserved entity type for state documents exists.
///
/// Queries before creating, so repeated calls are no-op successes. In
/// dry-run mode the definition is never written.
pub async fn ensure_state_entity_type(api: &dyn DocumentApi, dry_run: bool) -> Result<(), Error> {
    if api.entity_type(STATE_TYPE_ID).await?.is_some() {
        debug!("state entity type already present");
        return Ok(());
    }
    let def = EntityTypeDef::new(STATE_TYPE_ID, "Migration")
        .with_display_field(ENTITY_ID_FIELD)
        .with_description("Tracks the state of content models through migrations")
        .with_field(EntityFieldDef::new(STATE_FIELD, "Migration State", FieldKind::Object).required())
        .with_field(
            EntityFieldDef::new(ENTITY_ID_FIELD, "Entity ID", FieldKind::Symbol)
                .required()
                .unique(),
        );
    if dry_run {
        debug!("dry-run: skipping state entity type creation");
        return Ok(());
    }
    api.create_entity_type(&def).await?;
    Ok(())
}

/// A [`StateStore`] persisting one entity's applied history as a remote
/// entry keyed by the entity identifier.
pub struct RemoteStateStore {
    api: Arc<dyn DocumentApi>,
    cache: Arc<EntityStateCache>,
    entity: String,
    locale: String,
    dry_run: bool,
}

impl RemoteStateStore {
    /// Bind a store to one entity. Performs no remote call; stores are
    /// handed out by a bootstrapped
    /// [`StoreFactory`](crate::store::StoreFactory).
    pub fn new(
        api: Arc<dyn DocumentApi>,
        cache: Arc<EntityStateCache>,
        entity: impl Into<String>,
        locale: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            api,
            cache,
            entity: entity.into(),
            locale: locale.into(),
            dry_run,
        }
    }

    /// The entity this store is bound to.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Wrap a value in the locale keying the wire format uses.
    fn locale_keyed(&self, value: Value) -> Value {
        let mut keyed = Map::new();
        keyed.insert(self.locale.clone(), value);
        Value::Object(keyed)
    }

    async fn write_state(&self, state: &PersistedState) -> Result<(), Error> {
        let query = EntryQuery::of_type(STATE_TYPE_ID).with_entity_id(&self.entity);
        let existing = self.api.entries(&query).await?;
        let state_value = self.locale_keyed(serde_json::to_value(state).map_err(ClientError::from)?);

        if existing.total == 0 {
            debug!(entity = %self.entity, "creating state entry");
            let mut fields = Map::new();
            fields.insert(
                ENTITY_ID_FIELD.to_string(),
                self.locale_keyed(json!(self.entity)),
            );
            fields.insert(STATE_FIELD.to_string(), state_value);
            self.api
                .create_entry_with_id(STATE_TYPE_ID, &self.entity, fields)
                .await?;
        } else {
            let mut entry = existing
                .items
                .into_iter()
                .next()
                .ok_or_else(|| Error::MalformedState {
                    entity: self.entity.clone(),
                    message: "state query reported matches but returned no items".to_string(),
                })?;
            debug!(entity = %self.entity, entry_id = %entry.sys.id, "updating state entry");
            entry.fields.insert(STATE_FIELD.to_string(), state_value);
            self.api.update_entry(&entry).await?;
        }
        Ok(())
    }

    async fn delete_state(&self) -> Result<(), Error> {
        debug!(entity = %self.entity, "deleting state entry");
        match self.api.delete_entry(&self.entity).await {
            // Absent record already satisfies "no state exists".
            Err(ClientError::NotFound(_)) => Ok(()),
            other => other.map_err(Error::from),
        }
    }
}

#[async_trait]
impl StateStore for RemoteStateStore {
    async fn init(&self) -> Result<(), Error> {
        ensure_state_entity_type(self.api.as_ref(), self.dry_run).await
    }

    async fn load(&self) -> Result<PersistedState, Error> {
        self.cache.lookup(&self.entity)
    }

    async fn save(&self, set: &MigrationSet) -> Result<(), Error> {
        if self.dry_run {
            debug!(entity = %self.entity, "dry-run: skipping state write");
            return Ok(());
        }
        let state = PersistedState::from_set(set);
        if state.is_empty() {
            return self.delete_state().await;
        }
        self.write_state(&state).await
    }
}
