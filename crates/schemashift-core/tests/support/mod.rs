//! Shared test doubles: an in-memory document API with a recorded call
//! log, an event-recording sink, and migration-directory fixtures.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use schemashift_client::{
    DocumentApi, EntityTypeDef, Entry, EntryCollection, EntryQuery, Error as ClientError, Locale,
    Sys,
};
use schemashift_core::engine::{EventSink, SetEvent};

/// Locale every fixture uses.
pub const LOCALE: &str = "en-US";

/// In-memory [`DocumentApi`] with a recorded call log.
#[derive(Default)]
pub struct FakeApi {
    pub entries: Mutex<HashMap<String, Entry>>,
    pub entity_types: Mutex<HashMap<String, EntityTypeDef>>,
    pub locales: Vec<Locale>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeApi {
    /// A fake with a single default locale and nothing else.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            locales: vec![
                Locale {
                    code: "de-DE".to_string(),
                    name: Some("German".to_string()),
                    is_default: false,
                },
                Locale {
                    code: LOCALE.to_string(),
                    name: Some("English".to_string()),
                    is_default: true,
                },
            ],
            ..Self::default()
        })
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    /// The recorded calls, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Recorded calls that mutate remote state.
    pub fn write_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| {
                c.starts_with("create_") || c.starts_with("update_") || c.starts_with("delete_")
            })
            .collect()
    }

    /// Position of the first recorded call matching `needle`.
    pub fn call_index(&self, needle: &str) -> Option<usize> {
        self.calls().iter().position(|c| c == needle)
    }

    /// Seed a persisted-state entry for an entity.
    pub fn seed_state(&self, entity: &str, state: Value) {
        let mut fields = Map::new();
        fields.insert("entityId".to_string(), json!({ LOCALE: entity }));
        fields.insert("state".to_string(), json!({ LOCALE: state }));
        self.entries.lock().insert(
            entity.to_string(),
            Entry {
                sys: Sys {
                    id: entity.to_string(),
                    version: 1,
                },
                fields,
            },
        );
    }

    /// Seed an entity-type definition.
    pub fn seed_entity_type(&self, def: EntityTypeDef) {
        self.entity_types.lock().insert(def.id.clone(), def);
    }
}

#[async_trait]
impl DocumentApi for FakeApi {
    async fn entries(&self, query: &EntryQuery) -> Result<EntryCollection, ClientError> {
        self.record("entries");
        let entries = self.entries.lock();
        let mut items: Vec<Entry> = entries
            .values()
            .filter(|entry| match &query.entity_id {
                Some(wanted) => entry
                    .fields
                    .get("entityId")
                    .and_then(Value::as_object)
                    .is_some_and(|locales| locales.values().any(|v| v == wanted)),
                None => true,
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| a.sys.id.cmp(&b.sys.id));
        let total = items.len();
        if let Some(limit) = query.limit {
            items.truncate(limit);
        }
        Ok(EntryCollection { items, total })
    }

    async fn create_entry_with_id(
        &self,
        _entity_type: &str,
        entry_id: &str,
        fields: Map<String, Value>,
    ) -> Result<Entry, ClientError> {
        self.record(format!("create_entry:{entry_id}"));
        let entry = Entry {
            sys: Sys {
                id: entry_id.to_string(),
                version: 1,
            },
            fields,
        };
        self.entries
            .lock()
            .insert(entry_id.to_string(), entry.clone());
        Ok(entry)
    }

    async fn update_entry(&self, entry: &Entry) -> Result<Entry, ClientError> {
        self.record(format!("update_entry:{}", entry.sys.id));
        let mut entries = self.entries.lock();
        if !entries.contains_key(&entry.sys.id) {
            return Err(ClientError::NotFound(entry.sys.id.clone()));
        }
        let mut updated = entry.clone();
        updated.sys.version += 1;
        entries.insert(entry.sys.id.clone(), updated.clone());
        Ok(updated)
    }

    async fn delete_entry(&self, entry_id: &str) -> Result<(), ClientError> {
        self.record(format!("delete_entry:{entry_id}"));
        match self.entries.lock().remove(entry_id) {
            Some(_) => Ok(()),
            None => Err(ClientError::NotFound(entry_id.to_string())),
        }
    }

    async fn locales(&self) -> Result<Vec<Locale>, ClientError> {
        self.record("locales");
        Ok(self.locales.clone())
    }

    async fn entity_type(&self, id: &str) -> Result<Option<EntityTypeDef>, ClientError> {
        self.record(format!("entity_type:{id}"));
        Ok(self.entity_types.lock().get(id).cloned())
    }

    async fn create_entity_type(&self, def: &EntityTypeDef) -> Result<EntityTypeDef, ClientError> {
        self.record(format!("create_entity_type:{}", def.id));
        let mut created = def.clone();
        created.version = 1;
        self.entity_types
            .lock()
            .insert(def.id.clone(), created.clone());
        Ok(created)
    }

    async fn update_entity_type(&self, def: &EntityTypeDef) -> Result<EntityTypeDef, ClientError> {
        self.record(format!("update_entity_type:{}", def.id));
        let mut types = self.entity_types.lock();
        if !types.contains_key(&def.id) {
            return Err(ClientError::NotFound(def.id.clone()));
        }
        let mut updated = def.clone();
        updated.version += 1;
        types.insert(def.id.clone(), updated.clone());
        Ok(updated)
    }

    async fn delete_entity_type(&self, id: &str) -> Result<(), ClientError> {
        self.record(format!("delete_entity_type:{id}"));
        match self.entity_types.lock().remove(id) {
            Some(_) => Ok(()),
            None => Err(ClientError::NotFound(id.to_string())),
        }
    }
}

/// Sink that records every event it receives.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<SetEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<SetEvent> {
        self.events.lock().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: SetEvent) {
        self.events.lock().push(event);
    }
}

/// Write one migration script under `root/<entity>/<name>.json`.
pub fn write_script(root: &Path, entity: &str, name: &str, body: Value) {
    let dir = root.join(entity);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join(format!("{name}.json")),
        serde_json::to_string_pretty(&body).unwrap(),
    )
    .unwrap();
}

/// A two-step blog fixture: create the type, then add an author field.
pub fn write_blog_scripts(root: &Path) {
    write_script(
        root,
        "blog",
        "001-create-blog",
        json!({
            "description": "create the blog model",
            "up": [{
                "op": "create_entity_type",
                "name": "Blog",
                "display_field": "title",
                "fields": [{"id": "title", "name": "Title", "type": "Symbol", "required": true}]
            }],
            "down": [{"op": "delete_entity_type"}]
        }),
    );
    write_script(
        root,
        "blog",
        "002-add-author",
        json!({
            "up": [{"op": "add_field",
                    "field": {"id": "author", "name": "Author", "type": "Symbol"}}],
            "down": [{"op": "remove_field", "id": "author"}]
        }),
    );
}
