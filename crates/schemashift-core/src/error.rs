//! Core error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::Direction;

/// Core migration errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Remote API call failed.
    #[error("client error: {0}")]
    Client(#[from] schemashift_client::Error),

    /// Invalid or mutually exclusive options, detected before any remote
    /// call.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Required credential material is missing.
    #[error("missing credential material: {0}")]
    MissingCredential(&'static str),

    /// Environment bootstrap (locale resolution, state prefetch) failed.
    #[error("bootstrap failed: {0}")]
    Bootstrap(String),

    /// Filesystem access failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A migration script file could not be parsed.
    #[error("invalid migration script {path}: {message}")]
    InvalidScript {
        /// The offending script file.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// The requested target step does not exist in the set.
    #[error("unknown migration: {0}")]
    UnknownMigration(String),

    /// A step has no transformation for the requested direction.
    #[error("migration {title} has no {direction} transformation")]
    MissingTransform {
        /// Title of the step.
        title: String,
        /// Direction that was requested.
        direction: Direction,
    },

    /// A step's transformation failed; no further steps in the set run.
    #[error("migration step {title} failed: {source}")]
    StepFailed {
        /// Title of the failed step.
        title: String,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// A schema operation could not be applied to the remote definition.
    #[error("cannot apply operation to {entity}: {message}")]
    Transform {
        /// Entity whose definition was being changed.
        entity: String,
        /// What went wrong.
        message: String,
    },

    /// A store was requested from a factory that has not bootstrapped.
    #[error("store factory used before bootstrap")]
    NotBootstrapped,

    /// A persisted state document does not have the expected shape.
    #[error("state document for {entity} is malformed: {message}")]
    MalformedState {
        /// Entity whose state document is malformed.
        entity: String,
        /// What was wrong with it.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_failed_display_names_the_step() {
        let err = Error::StepFailed {
            title: "002-add-author".to_string(),
            source: Box::new(Error::UnknownMigration("whatever".to_string())),
        };
        assert!(err.to_string().contains("002-add-author"));
    }

    #[test]
    fn test_missing_transform_names_direction() {
        let err = Error::MissingTransform {
            title: "001-create".to_string(),
            direction: Direction::Down,
        };
        assert!(err.to_string().contains("down"));
    }
}
