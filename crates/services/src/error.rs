//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::SessionError;
use quiz_core::model::{LevelNumber, PlayerError};
use storage::StorageError;
use storage::sqlite::SqliteInitError;

use crate::controller::Intent;

/// A level could not be made available.
///
/// Every variant is recoverable: the controller shows a retry message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LevelLoadError {
    #[error("level {level} was not found")]
    NotFound { level: LevelNumber },

    #[error("level {level} is malformed: {reason}")]
    Malformed { level: LevelNumber, reason: String },

    #[error("level {level} could not be fetched: {reason}")]
    Transport { level: LevelNumber, reason: String },

    #[error("saved answers for level {level} could not be read")]
    Storage {
        level: LevelNumber,
        #[source]
        source: StorageError,
    },
}

impl LevelLoadError {
    #[must_use]
    pub fn level(&self) -> LevelNumber {
        match self {
            Self::NotFound { level }
            | Self::Malformed { level, .. }
            | Self::Transport { level, .. }
            | Self::Storage { level, .. } => *level,
        }
    }
}

/// Errors emitted by `QuizController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ControllerError {
    #[error(transparent)]
    InvalidName(#[from] PlayerError),

    #[error("reset must be confirmed")]
    ResetNotConfirmed,

    #[error("{intent} is not available while {state}")]
    Unavailable { intent: Intent, state: &'static str },

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
