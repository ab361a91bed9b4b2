//! Set loading and run sequencing.
//!
//! Translates an operator-level request ("migrate entities X, Y up to
//! step Z") into configured migration sets and executes them. Sequencing
//! is asymmetric on purpose: "up" runs sets strictly one at a time so
//! interleaved logs stay readable and a failure aborts the remainder,
//! while "down" runs sets concurrently and a failure in one set leaves
//! its siblings to finish.

use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use futures::future::join_all;
use tracing::{error, info};

use schemashift_client::{
    exchange_app_token, AppTokenRequest, ClientConfig, DocumentApi, HttpDocumentClient,
};

use crate::context::MigrationContext;
use crate::engine::{load_set, run, Direction, EventSink, TracingSink};
use crate::error::Error;
use crate::store::{remote, StoreFactory};

/// Environment variable holding the base64-encoded app private key.
pub const APP_PRIVATE_KEY_VAR: &str = "SCHEMASHIFT_APP_PRIVATE_KEY";

/// Default migrations root, one subdirectory per entity.
pub const DEFAULT_MIGRATIONS_DIR: &str = "migrations";

/// Options for one orchestration run.
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    /// Base URL of the management API.
    pub base_url: String,
    /// Space identifier.
    pub space_id: String,
    /// Environment identifier within the space.
    pub environment_id: String,
    /// Entities to process; empty means "use `all`".
    pub entities: Vec<String>,
    /// Process every entity found under the migrations root.
    pub all: bool,
    /// App identity for the token exchange.
    pub app_id: Option<String>,
    /// Direct bearer token; skips the exchange when present.
    pub access_token: Option<String>,
    /// Base64-encoded PEM private key; falls back to
    /// [`APP_PRIVATE_KEY_VAR`] when absent.
    pub private_key_base64: Option<String>,
    /// Migrations root directory.
    pub migrations_dir: PathBuf,
    /// Suppress all remote writes.
    pub dry_run: bool,
}

impl MigrateOptions {
    /// Options for a space, with defaults for everything else.
    pub fn new(space_id: impl Into<String>) -> Self {
        Self {
            base_url: schemashift_client::config::DEFAULT_BASE_URL.to_string(),
            space_id: space_id.into(),
            environment_id: schemashift_client::config::DEFAULT_ENVIRONMENT.to_string(),
            entities: Vec::new(),
            all: false,
            app_id: None,
            access_token: None,
            private_key_base64: None,
            migrations_dir: PathBuf::from(DEFAULT_MIGRATIONS_DIR),
            dry_run: false,
        }
    }

    /// Set the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the environment.
    pub fn with_environment(mut self, environment_id: impl Into<String>) -> Self {
        self.environment_id = environment_id.into();
        self
    }

    /// Add one entity to process.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entities.push(entity.into());
        self
    }

    /// Process every entity under the migrations root.
    pub fn with_all(mut self) -> Self {
        self.all = true;
        self
    }

    /// Use a direct bearer token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Use an app identity for the token exchange.
    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Set the migrations root directory.
    pub fn with_migrations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migrations_dir = dir.into();
        self
    }

    /// Suppress all remote writes.
    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Apply pending migrations for the selected entities, oldest first,
/// optionally up to `target` (inclusive). Sets run strictly one at a
/// time; the first failure aborts the remaining sequence.
pub async fn up(options: MigrateOptions, target: Option<&str>) -> Result<(), Error> {
    validate_up(&options, target)?;
    let api = connect_api(&options).await?;
    Orchestrator::with_api(options, api).up(target).await
}

/// Revert applied migrations for the selected entities, newest first,
/// down to `target` (inclusive) or just the last applied step. Sets run
/// concurrently; a failure in one set fails the run but leaves siblings
/// to finish.
pub async fn down(options: MigrateOptions, target: Option<&str>) -> Result<(), Error> {
    validate_down(&options)?;
    let api = connect_api(&options).await?;
    Orchestrator::with_api(options, api).down(target).await
}

/// Bootstrap the environment: create the reserved entity type that holds
/// migration-state documents. Safe to repeat.
pub async fn init(options: MigrateOptions) -> Result<(), Error> {
    let api = connect_api(&options).await?;
    Orchestrator::with_api(options, api).init().await
}

/// Sequences configured migration sets against one environment.
pub struct Orchestrator {
    options: MigrateOptions,
    api: Arc<dyn DocumentApi>,
    sink: Arc<dyn EventSink>,
}

impl Orchestrator {
    /// Build an orchestrator over an already-connected API handle.
    ///
    /// This is the seam tests use to substitute a fake API; production
    /// callers go through [`up`], [`down`], or [`init`].
    pub fn with_api(options: MigrateOptions, api: Arc<dyn DocumentApi>) -> Self {
        Self {
            options,
            api,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the sink receiving set lifecycle events.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Serial "up" across the selected entities.
    pub async fn up(&self, target: Option<&str>) -> Result<(), Error> {
        validate_up(&self.options, target)?;
        let entities = self.entity_list()?;
        let factory = StoreFactory::new(Arc::clone(&self.api), self.options.dry_run);
        factory.bootstrap().await?;

        for entity in entities {
            let store = factory.new_store(&entity)?;
            let dir = self.options.migrations_dir.join(&entity);
            let ctx = self.context(&entity);
            info!(entity = %entity, "processing");
            let mut set = load_set(&dir, &entity, &store, Arc::clone(&self.sink)).await?;
            run(&mut set, &store, &ctx, Direction::Up, target).await?;
            info!(entity = %entity, "all migrations applied");
        }

        info!(
            environment = %self.options.environment_id,
            "all entities up-to-date"
        );
        Ok(())
    }

    /// Concurrent "down" across the selected entities.
    pub async fn down(&self, target: Option<&str>) -> Result<(), Error> {
        validate_down(&self.options)?;
        let entities = self.entity_list()?;
        let factory = StoreFactory::new(Arc::clone(&self.api), self.options.dry_run);
        factory.bootstrap().await?;

        let runs = entities.iter().map(|entity| {
            let factory = &factory;
            let sink = Arc::clone(&self.sink);
            let dir = self.options.migrations_dir.join(entity);
            let ctx = self.context(entity);
            async move {
                let store = factory.new_store(entity)?;
                let mut set = load_set(&dir, entity, &store, sink).await?;
                run(&mut set, &store, &ctx, Direction::Down, target).await
            }
        });

        let mut first_error = None;
        for (entity, result) in entities.iter().zip(join_all(runs).await) {
            match result {
                Ok(()) => info!(entity = %entity, "migrations reverted"),
                Err(e) => {
                    error!(entity = %entity, error = %e, "migration run failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Environment bootstrap: ensure the reserved state entity type
    /// exists.
    pub async fn init(&self) -> Result<(), Error> {
        remote::ensure_state_entity_type(self.api.as_ref(), self.options.dry_run).await?;
        info!(environment = %self.options.environment_id, "environment initialized");
        Ok(())
    }

    fn context(&self, entity: &str) -> MigrationContext {
        MigrationContext {
            space_id: self.options.space_id.clone(),
            environment_id: self.options.environment_id.clone(),
            entity: entity.to_string(),
            dry_run: self.options.dry_run,
            api: Arc::clone(&self.api),
        }
    }

    /// The entities to process: the explicit list, or every
    /// subdirectory of the migrations root.
    fn entity_list(&self) -> Result<Vec<String>, Error> {
        if !self.options.entities.is_empty() {
            return Ok(self.options.entities.clone());
        }
        let root = &self.options.migrations_dir;
        let entries = std::fs::read_dir(root).map_err(|e| Error::Io {
            path: root.clone(),
            source: e,
        })?;
        let mut entities = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::Io {
                path: root.clone(),
                source: e,
            })?;
            if entry.path().is_dir() {
                if let Ok(name) = entry.file_name().into_string() {
                    entities.push(name);
                }
            }
        }
        entities.sort();
        Ok(entities)
    }
}

fn validate_up(options: &MigrateOptions, target: Option<&str>) -> Result<(), Error> {
    validate_entity_selection(options)?;
    if options.all && target.is_some() {
        return Err(Error::InvalidOptions(
            "a target step cannot be combined with 'all'".to_string(),
        ));
    }
    Ok(())
}

fn validate_down(options: &MigrateOptions) -> Result<(), Error> {
    validate_entity_selection(options)
}

fn validate_entity_selection(options: &MigrateOptions) -> Result<(), Error> {
    if options.all && !options.entities.is_empty() {
        return Err(Error::InvalidOptions(
            "'entity' and 'all' are mutually exclusive".to_string(),
        ));
    }
    if !options.all && options.entities.is_empty() {
        return Err(Error::InvalidOptions(
            "at least one of 'all' or 'entity' must be specified".to_string(),
        ));
    }
    Ok(())
}

/// Resolve the bearer credential for a run: a direct token when given,
/// otherwise an app-token exchange. Resolved once per run and never
/// cached beyond it.
async fn resolve_credential(options: &MigrateOptions) -> Result<String, Error> {
    if let Some(token) = &options.access_token {
        return Ok(token.clone());
    }
    let app_id = options
        .app_id
        .as_ref()
        .ok_or(Error::MissingCredential("app id or direct access token"))?;
    let key_base64 = match &options.private_key_base64 {
        Some(key) => key.clone(),
        None => std::env::var(APP_PRIVATE_KEY_VAR)
            .map_err(|_| Error::MissingCredential("app private key"))?,
    };
    let key_bytes = BASE64
        .decode(key_base64.trim())
        .map_err(|e| Error::InvalidOptions(format!("app private key is not valid base64: {e}")))?;
    let private_key_pem = String::from_utf8(key_bytes)
        .map_err(|e| Error::InvalidOptions(format!("app private key is not valid UTF-8: {e}")))?;

    let request = AppTokenRequest {
        app_id: app_id.clone(),
        space_id: options.space_id.clone(),
        environment_id: options.environment_id.clone(),
        private_key_pem,
    };
    Ok(exchange_app_token(&options.base_url, &request).await?)
}

async fn connect_api(options: &MigrateOptions) -> Result<Arc<dyn DocumentApi>, Error> {
    let token = resolve_credential(options).await?;
    let config = ClientConfig::new(&options.space_id, &options.environment_id, token)
        .with_base_url(&options.base_url);
    Ok(Arc::new(HttpDocumentClient::new(config)?))
}
