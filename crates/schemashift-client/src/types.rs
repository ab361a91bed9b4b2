//! Wire types for the management API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// System metadata attached to every remote document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sys {
    /// Document identifier, unique within its collection.
    pub id: String,
    /// Document version, used for optimistic concurrency on updates.
    #[serde(default)]
    pub version: u64,
}

/// A remote entry document.
///
/// Field values are keyed by locale on the wire, so a field value is a
/// JSON object of the form `{"<locale>": <value>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// System metadata.
    pub sys: Sys,
    /// Locale-keyed field values.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Entry {
    /// Look up a field value for a specific locale.
    pub fn field(&self, name: &str, locale: &str) -> Option<&Value> {
        self.fields.get(name).and_then(|v| v.get(locale))
    }
}

/// One page of entries plus the total match count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryCollection {
    /// Entries in this page.
    #[serde(default)]
    pub items: Vec<Entry>,
    /// Total number of entries matching the query, across all pages.
    #[serde(default)]
    pub total: usize,
}

/// Query parameters for listing entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryQuery {
    /// Restrict to entries of this entity type.
    pub entity_type: Option<String>,
    /// Restrict to entries whose `entityId` field equals this value.
    pub entity_id: Option<String>,
    /// Maximum number of entries returned in one page.
    pub limit: Option<usize>,
}

impl EntryQuery {
    /// Query entries of one entity type.
    pub fn of_type(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: Some(entity_type.into()),
            ..Self::default()
        }
    }

    /// Restrict to entries whose `entityId` field matches.
    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set the page size.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A locale configured for a space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locale {
    /// Locale code, e.g. `en-US`.
    pub code: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether this is the default locale for the environment.
    #[serde(rename = "default", default)]
    pub is_default: bool,
}

/// Field value kinds supported by entity-type definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum FieldKind {
    /// Short string, indexable.
    Symbol,
    /// Long-form text.
    Text,
    /// Signed integer.
    Integer,
    /// Floating-point number.
    Number,
    /// Boolean flag.
    Boolean,
    /// ISO 8601 date.
    Date,
    /// Arbitrary JSON object.
    Object,
}

/// A field within an entity-type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFieldDef {
    /// Field identifier, unique within the entity type.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Value kind.
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Whether a value is required.
    #[serde(default)]
    pub required: bool,
    /// Whether values must be unique across entries.
    #[serde(default)]
    pub unique: bool,
}

impl EntityFieldDef {
    /// Create a field definition.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            required: false,
            unique: false,
        }
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field as unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// An entity-type definition (content model schema).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTypeDef {
    /// Type identifier, unique within the environment.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Field shown as the entry title, if any.
    #[serde(default)]
    pub display_field: Option<String>,
    /// Description of the type.
    #[serde(default)]
    pub description: Option<String>,
    /// Field definitions.
    #[serde(default)]
    pub fields: Vec<EntityFieldDef>,
    /// Definition version, used for optimistic concurrency on updates.
    #[serde(default)]
    pub version: u64,
}

impl EntityTypeDef {
    /// Create a new entity-type definition.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_field: None,
            description: None,
            fields: Vec::new(),
            version: 0,
        }
    }

    /// Set the display field.
    pub fn with_display_field(mut self, field: impl Into<String>) -> Self {
        self.display_field = Some(field.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a field.
    pub fn with_field(mut self, field: EntityFieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Get a field by identifier.
    pub fn get_field(&self, id: &str) -> Option<&EntityFieldDef> {
        self.fields.iter().find(|f| f.id == id)
    }
}
