//! schemashift core - migration engine, remote state store, and
//! orchestration.
//!
//! Migrations are ordered, reversible schema-change scripts applied to
//! per-entity content-model definitions on a remote management API.
//! Applied history is persisted as remote documents (one per entity), so
//! re-invoking a run is idempotent.
//!
//! The pieces, bottom-up:
//!
//! - [`engine`] - loads one entity's scripts into a [`MigrationSet`] and
//!   executes it in a direction, saving state after every step.
//! - [`script`] - the JSON schema-change DSL each step carries.
//! - [`store`] - the [`StateStore`] contract plus the remote-backed
//!   implementation, cache, and factory.
//! - [`orchestrator`] - discovers entities, resolves the credential, and
//!   sequences whole-set runs (serial for up, concurrent for down).

pub mod context;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod script;
pub mod store;

pub use context::{MigrationContext, Transform};
pub use engine::{
    load_set, run, Direction, EventSink, MigrationSet, MigrationStep, SetEvent, TracingSink,
};
pub use error::Error;
pub use orchestrator::{MigrateOptions, Orchestrator};
pub use script::{SchemaOp, ScriptTransform};
pub use store::{
    EntityStateCache, PersistedState, RemoteStateStore, StateStore, StoreFactory,
};
