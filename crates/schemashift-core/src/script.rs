//! The schema-change DSL carried by migration scripts.
//!
//! A script is a JSON file named `NNN-description.json` (the stem becomes
//! the step title) with optional `up` and `down` operation lists:
//!
//! ```json
//! {
//!   "description": "create the blog model",
//!   "up": [
//!     {
//!       "op": "create_entity_type",
//!       "name": "Blog Post",
//!       "display_field": "title",
//!       "fields": [
//!         {"id": "title", "name": "Title", "type": "Symbol", "required": true}
//!       ]
//!     }
//!   ],
//!   "down": [
//!     {"op": "delete_entity_type"}
//!   ]
//! }
//! ```
//!
//! Operations always target the entity type the script's directory is
//! named after. The engine treats the parsed operations as an opaque
//! [`Transform`]; in dry-run mode each operation is logged and skipped.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use schemashift_client::{EntityFieldDef, EntityTypeDef};

use crate::context::{MigrationContext, Transform};
use crate::engine::MigrationStep;
use crate::error::Error;

/// One schema operation, applied to the script's own entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SchemaOp {
    /// Create the entity type.
    CreateEntityType {
        /// Human-readable name.
        name: String,
        /// Field shown as the entry title.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_field: Option<String>,
        /// Description of the type.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        /// Initial fields.
        #[serde(default)]
        fields: Vec<EntityFieldDef>,
    },
    /// Delete the entity type.
    DeleteEntityType,
    /// Add a field to the entity type.
    AddField {
        /// The field to add.
        field: EntityFieldDef,
    },
    /// Remove a field from the entity type.
    RemoveField {
        /// Identifier of the field to remove.
        id: String,
    },
    /// Rename a field, keeping its definition otherwise intact.
    RenameField {
        /// Current field identifier.
        id: String,
        /// New field identifier.
        new_id: String,
    },
}

impl SchemaOp {
    /// Short human-readable form, used for dry-run logging.
    pub fn describe(&self) -> String {
        match self {
            SchemaOp::CreateEntityType { name, .. } => format!("create entity type ({name})"),
            SchemaOp::DeleteEntityType => "delete entity type".to_string(),
            SchemaOp::AddField { field } => format!("add field {}", field.id),
            SchemaOp::RemoveField { id } => format!("remove field {id}"),
            SchemaOp::RenameField { id, new_id } => format!("rename field {id} -> {new_id}"),
        }
    }
}

/// A migration script file.
#[derive(Debug, Clone, Default, Deserialize)]
struct ScriptFile {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    up: Option<Vec<SchemaOp>>,
    #[serde(default)]
    down: Option<Vec<SchemaOp>>,
}

/// Parse one script file into a migration step.
///
/// The file stem becomes the step title. A direction key that is absent
/// leaves the step without that transformation; a present-but-empty list
/// yields a transformation that does nothing.
pub fn load_step(path: &Path) -> Result<MigrationStep, Error> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let script: ScriptFile = serde_json::from_str(&raw).map_err(|e| Error::InvalidScript {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let title = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| Error::InvalidScript {
            path: path.to_path_buf(),
            message: "file name is not valid UTF-8".to_string(),
        })?;

    let mut step = MigrationStep::new(title);
    if let Some(description) = script.description {
        step = step.with_description(description);
    }
    if let Some(ops) = script.up {
        step = step.with_up(Arc::new(ScriptTransform::new(ops)));
    }
    if let Some(ops) = script.down {
        step = step.with_down(Arc::new(ScriptTransform::new(ops)));
    }
    Ok(step)
}

/// A parsed operation list behind the [`Transform`] contract.
#[derive(Debug, Clone)]
pub struct ScriptTransform {
    ops: Vec<SchemaOp>,
}

impl ScriptTransform {
    /// Wrap an operation list.
    pub fn new(ops: Vec<SchemaOp>) -> Self {
        Self { ops }
    }

    /// The operations this transform will apply.
    pub fn ops(&self) -> &[SchemaOp] {
        &self.ops
    }

    async fn apply_op(&self, ctx: &MigrationContext, op: &SchemaOp) -> Result<(), Error> {
        match op {
            SchemaOp::CreateEntityType {
                name,
                display_field,
                description,
                fields,
            } => {
                let mut def = EntityTypeDef::new(&ctx.entity, name);
                def.display_field = display_field.clone();
                def.description = description.clone();
                def.fields = fields.clone();
                ctx.api.create_entity_type(&def).await?;
            }
            SchemaOp::DeleteEntityType => {
                ctx.api.delete_entity_type(&ctx.entity).await?;
            }
            SchemaOp::AddField { field } => {
                self.modify(ctx, |def| {
                    if def.get_field(&field.id).is_some() {
                        return Err(format!("field {} already exists", field.id));
                    }
                    def.fields.push(field.clone());
                    Ok(())
                })
                .await?;
            }
            SchemaOp::RemoveField { id } => {
                self.modify(ctx, |def| {
                    let before = def.fields.len();
                    def.fields.retain(|f| f.id != *id);
                    if def.fields.len() == before {
                        return Err(format!("field {id} does not exist"));
                    }
                    Ok(())
                })
                .await?;
            }
            SchemaOp::RenameField { id, new_id } => {
                self.modify(ctx, |def| {
                    let field = def
                        .fields
                        .iter_mut()
                        .find(|f| f.id == *id)
                        .ok_or_else(|| format!("field {id} does not exist"))?;
                    field.id = new_id.clone();
                    Ok(())
                })
                .await?;
            }
        }
        Ok(())
    }

    /// Fetch the entity type, apply an in-memory edit, write it back.
    async fn modify<F>(&self, ctx: &MigrationContext, edit: F) -> Result<(), Error>
    where
        F: FnOnce(&mut EntityTypeDef) -> Result<(), String>,
    {
        let mut def = ctx
            .api
            .entity_type(&ctx.entity)
            .await?
            .ok_or_else(|| Error::Transform {
                entity: ctx.entity.clone(),
                message: "entity type does not exist".to_string(),
            })?;
        edit(&mut def).map_err(|message| Error::Transform {
            entity: ctx.entity.clone(),
            message,
        })?;
        ctx.api.update_entity_type(&def).await?;
        Ok(())
    }
}

#[async_trait]
impl Transform for ScriptTransform {
    async fn apply(&self, ctx: &MigrationContext) -> Result<(), Error> {
        for op in &self.ops {
            if ctx.dry_run {
                info!(entity = %ctx.entity, operation = %op.describe(), "dry-run: skipping");
                continue;
            }
            self.apply_op(ctx, op).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemashift_client::FieldKind;
    use serde_json::json;

    #[test]
    fn test_parse_tagged_ops() {
        let ops: Vec<SchemaOp> = serde_json::from_value(json!([
            {"op": "create_entity_type", "name": "Blog Post", "display_field": "title",
             "fields": [{"id": "title", "name": "Title", "type": "Symbol", "required": true}]},
            {"op": "add_field", "field": {"id": "body", "name": "Body", "type": "Text"}},
            {"op": "rename_field", "id": "body", "new_id": "content"},
            {"op": "remove_field", "id": "content"},
            {"op": "delete_entity_type"}
        ]))
        .unwrap();

        assert_eq!(ops.len(), 5);
        match &ops[0] {
            SchemaOp::CreateEntityType { name, fields, .. } => {
                assert_eq!(name, "Blog Post");
                assert_eq!(fields[0].kind, FieldKind::Symbol);
            }
            other => panic!("unexpected op: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let result: Result<SchemaOp, _> =
            serde_json::from_value(json!({"op": "explode_entity_type"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_step_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("001-create-blog.json");
        std::fs::write(
            &path,
            serde_json::to_string(&json!({
                "description": "create the blog model",
                "up": [{"op": "create_entity_type", "name": "Blog"}],
                "down": [{"op": "delete_entity_type"}]
            }))
            .unwrap(),
        )
        .unwrap();

        let step = load_step(&path).unwrap();
        assert_eq!(step.title, "001-create-blog");
        assert_eq!(step.description.as_deref(), Some("create the blog model"));
        assert!(step.up.is_some());
        assert!(step.down.is_some());
        assert!(!step.is_applied());
    }

    #[test]
    fn test_load_step_without_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("002-irreversible.json");
        std::fs::write(&path, r#"{"up": []}"#).unwrap();

        let step = load_step(&path).unwrap();
        assert!(step.up.is_some());
        assert!(step.down.is_none());
    }

    #[test]
    fn test_load_step_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("003-broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_step(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidScript { .. }));
    }
}
