//! Directional execution of a migration set.

use tracing::debug;

use crate::context::MigrationContext;
use crate::error::Error;
use crate::store::StateStore;

use super::events::SetEvent;
use super::set::MigrationSet;
use super::step::Direction;

/// Run a set in a direction, optionally up to a named target step
/// (inclusive).
///
/// Pending steps execute strictly in order; a step never starts before
/// its predecessor has completed. After every successful step the set's
/// state is saved through `store`, so an interrupted run resumes where it
/// stopped. The first failing step halts the set; no partial continuation
/// past a failed step.
///
/// For [`Direction::Down`] with no target, only the most recently applied
/// step is reverted. A set with nothing to do succeeds without touching
/// the store.
pub async fn run(
    set: &mut MigrationSet,
    store: &dyn StateStore,
    ctx: &MigrationContext,
    direction: Direction,
    target: Option<&str>,
) -> Result<(), Error> {
    if let Some(target) = target {
        if set.position(target).is_none() {
            return Err(Error::UnknownMigration(target.to_string()));
        }
    }

    let target = match (direction, target) {
        (Direction::Down, None) => {
            let Some(last_run) = set.last_run.clone() else {
                debug!(entity = %set.entity, "nothing applied, nothing to revert");
                return Ok(());
            };
            Some(last_run)
        }
        (_, target) => target.map(str::to_string),
    };

    let order: Vec<usize> = match direction {
        Direction::Up => (0..set.migrations.len()).collect(),
        Direction::Down => (0..set.migrations.len()).rev().collect(),
    };

    for index in order {
        let title = set.migrations[index].title.clone();
        let runnable = match direction {
            Direction::Up => !set.migrations[index].is_applied(),
            Direction::Down => set.migrations[index].is_applied(),
        };

        if runnable {
            let transform = set.migrations[index].transform(direction).ok_or_else(|| {
                Error::MissingTransform {
                    title: title.clone(),
                    direction,
                }
            })?;

            debug!(entity = %set.entity, migration = %title, %direction, "running step");
            transform
                .apply(ctx)
                .await
                .map_err(|e| Error::StepFailed {
                    title: title.clone(),
                    source: Box::new(e),
                })?;

            match direction {
                Direction::Up => {
                    set.migrations[index].mark_applied();
                    set.last_run = Some(title.clone());
                }
                Direction::Down => {
                    set.migrations[index].clear_applied();
                    set.last_run = set.migrations[..index]
                        .iter()
                        .rev()
                        .find(|m| m.is_applied())
                        .map(|m| m.title.clone());
                }
            }

            set.emit(SetEvent::Migration {
                title: title.clone(),
                direction,
            });
            store.save(set).await?;
        }

        if target.as_deref() == Some(title.as_str()) {
            break;
        }
    }

    Ok(())
}
