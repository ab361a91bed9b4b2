//! Loads one entity's migration directory into a set.

use std::path::Path;
use std::sync::Arc;

use crate::error::Error;
use crate::script;
use crate::store::StateStore;

use super::events::{EventSink, SetEvent};
use super::set::MigrationSet;

/// Extension migration scripts must carry.
const SCRIPT_EXTENSION: &str = "json";

/// Load the scripts in `dir` and merge them with the persisted state from
/// `store` into a [`MigrationSet`] for `entity`.
///
/// Scripts are ordered by file name, so titles must sort in application
/// order. Two situations produce `warning` events rather than errors:
/// persisted history referencing a script missing on disk, and a pending
/// script that sorts before the last-run marker (out-of-order history).
pub async fn load_set(
    dir: &Path,
    entity: &str,
    store: &dyn StateStore,
    sink: Arc<dyn EventSink>,
) -> Result<MigrationSet, Error> {
    let mut paths = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| Error::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut set = MigrationSet::new(entity);
    set.subscribe(sink);
    for path in &paths {
        set.add_step(script::load_step(path)?);
    }

    let state = store.load().await?;
    for applied in &state.migrations {
        match set.position(&applied.title) {
            Some(index) => set.migrations[index].applied_at = Some(applied.applied_at),
            None => set.emit(SetEvent::Warning(format!(
                "state for {entity} references migration {} with no script on disk",
                applied.title
            ))),
        }
    }
    set.last_run = state.last_run;

    if let Some(last_run) = set.last_run.clone() {
        for step in &set.migrations {
            if !step.is_applied() && step.title.as_str() < last_run.as_str() {
                set.emit(SetEvent::Warning(format!(
                    "migration {} is pending but sorts before last run {last_run}",
                    step.title
                )));
            }
        }
    }

    Ok(set)
}
