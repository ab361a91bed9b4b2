//! The remote-document contract consumed by the migration core.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::types::{EntityTypeDef, Entry, EntryCollection, EntryQuery, Locale};

/// Operations the migration core needs from the management API.
///
/// [`HttpDocumentClient`](crate::HttpDocumentClient) is the production
/// implementation; tests substitute an in-memory fake. The core only
/// distinguishes success from failure; API errors are not interpreted
/// beyond their status.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// List entries matching a query. Returns one page plus the total
    /// match count.
    async fn entries(&self, query: &EntryQuery) -> Result<EntryCollection, Error>;

    /// Create an entry with a caller-chosen identifier.
    async fn create_entry_with_id(
        &self,
        entity_type: &str,
        entry_id: &str,
        fields: Map<String, Value>,
    ) -> Result<Entry, Error>;

    /// Update an existing entry in place.
    async fn update_entry(&self, entry: &Entry) -> Result<Entry, Error>;

    /// Delete an entry. Fails with [`Error::NotFound`] when absent.
    async fn delete_entry(&self, entry_id: &str) -> Result<(), Error>;

    /// List the locales configured for the environment.
    async fn locales(&self) -> Result<Vec<Locale>, Error>;

    /// Fetch an entity-type definition, or `None` when absent.
    async fn entity_type(&self, id: &str) -> Result<Option<EntityTypeDef>, Error>;

    /// Create an entity-type definition.
    async fn create_entity_type(&self, def: &EntityTypeDef) -> Result<EntityTypeDef, Error>;

    /// Replace an entity-type definition.
    async fn update_entity_type(&self, def: &EntityTypeDef) -> Result<EntityTypeDef, Error>;

    /// Delete an entity-type definition.
    async fn delete_entity_type(&self, id: &str) -> Result<(), Error>;
}
