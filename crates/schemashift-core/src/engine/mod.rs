//! Migration execution engine.
//!
//! Loads one entity's scripts into a [`MigrationSet`] and runs the set in
//! a direction, persisting applied history through a
//! [`StateStore`](crate::store::StateStore) after every step.

pub mod events;
pub mod loader;
pub mod runner;
pub mod set;
pub mod step;

pub use events::{EventSink, NullSink, SetEvent, TracingSink};
pub use loader::load_set;
pub use runner::run;
pub use set::MigrationSet;
pub use step::{Direction, MigrationStep};
