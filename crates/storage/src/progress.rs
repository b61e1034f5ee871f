//! Typed projection of quiz progress onto a [`KeyValueStore`].
//!
//! Numeric keys that fail to parse fall back to their defaults. Corrupt
//! values are logged, never returned as errors.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use quiz_core::model::{LevelNumber, Player, ResumeState, ScoreHistory};
use tracing::{debug, warn};

use crate::keys;
use crate::repository::{KeyValueStore, StorageError};

#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// The saved player, if a valid name was stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn player(&self) -> Result<Option<Player>, StorageError> {
        let Some(raw) = self.kv.get(keys::PLAYER_NAME).await? else {
            return Ok(None);
        };
        match Player::new(&raw) {
            Ok(player) => Ok(Some(player)),
            Err(err) => {
                if !raw.is_empty() {
                    warn!(key = keys::PLAYER_NAME, %err, "ignoring stored player name");
                }
                Ok(None)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the name cannot be stored.
    pub async fn save_player(&self, player: &Player) -> Result<(), StorageError> {
        self.kv.set(keys::PLAYER_NAME, player.name()).await
    }

    /// Level the player is on; level 1 when unset or unreadable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn current_level(&self) -> Result<LevelNumber, StorageError> {
        self.read_or_default(keys::CURRENT_LEVEL, LevelNumber::FIRST)
            .await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    pub async fn set_current_level(&self, level: LevelNumber) -> Result<(), StorageError> {
        self.kv
            .set(keys::CURRENT_LEVEL, &level.to_string())
            .await
    }

    /// Index of the next unanswered question; 0 when unset or unreadable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn question_index(&self) -> Result<usize, StorageError> {
        self.read_or_default(keys::CURRENT_QUESTION, 0).await
    }

    /// Points scored so far in the current level; 0 when unset or unreadable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn score(&self) -> Result<usize, StorageError> {
        self.read_or_default(keys::CURRENT_SCORE, 0).await
    }

    /// Saved picks for `level`, if any were stored and are readable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn selections(
        &self,
        level: LevelNumber,
    ) -> Result<Option<Vec<Option<usize>>>, StorageError> {
        let key = keys::selections(level);
        let Some(raw) = self.kv.get(&key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(saved) => Ok(Some(saved)),
            Err(err) => {
                warn!(%key, %err, "ignoring unreadable saved selections");
                Ok(None)
            }
        }
    }

    /// In-progress state for `level`.
    ///
    /// Present only while the level's selections are stored and the saved
    /// position points at that level.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn resume_state(
        &self,
        level: LevelNumber,
    ) -> Result<Option<ResumeState>, StorageError> {
        let Some(selections) = self.selections(level).await? else {
            return Ok(None);
        };
        if self.current_level().await? != level {
            debug!(%level, "saved position belongs to another level");
            return Ok(None);
        }

        Ok(Some(ResumeState {
            level,
            question_index: self.question_index().await?,
            score: self.score().await?,
            selections,
        }))
    }

    /// Persist the full in-progress position.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any key cannot be stored.
    pub async fn save_resume(&self, state: &ResumeState) -> Result<(), StorageError> {
        let selections = serde_json::to_string(&state.selections)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv
            .set(&keys::selections(state.level), &selections)
            .await?;
        self.set_current_level(state.level).await?;
        self.kv
            .set(keys::CURRENT_QUESTION, &state.question_index.to_string())
            .await?;
        self.kv
            .set(keys::CURRENT_SCORE, &state.score.to_string())
            .await
    }

    /// Drop the in-progress state for `level` and zero the saved position.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any key cannot be written.
    pub async fn clear_resume(&self, level: LevelNumber) -> Result<(), StorageError> {
        self.kv.remove(&keys::selections(level)).await?;
        self.kv.set(keys::CURRENT_QUESTION, "0").await?;
        self.kv.set(keys::CURRENT_SCORE, "0").await
    }

    /// Recorded percentages; empty when unset or unreadable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn score_history(&self) -> Result<ScoreHistory, StorageError> {
        let Some(raw) = self.kv.get(keys::SCORE_HISTORY).await? else {
            return Ok(ScoreHistory::new());
        };
        match serde_json::from_str(&raw) {
            Ok(history) => Ok(history),
            Err(err) => {
                warn!(key = keys::SCORE_HISTORY, %err, "ignoring unreadable score history");
                Ok(ScoreHistory::new())
            }
        }
    }

    /// Overwrite the score for `level` and return the updated history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be read or stored.
    pub async fn record_score(
        &self,
        level: LevelNumber,
        percent: f64,
    ) -> Result<ScoreHistory, StorageError> {
        let mut history = self.score_history().await?;
        history.record(level, percent);
        let raw = serde_json::to_string(&history)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(keys::SCORE_HISTORY, &raw).await?;
        Ok(history)
    }

    /// Remove everything except the player's name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if keys cannot be listed or removed.
    pub async fn clear_progress(&self) -> Result<(), StorageError> {
        for key in self.kv.keys().await? {
            if key != keys::PLAYER_NAME {
                self.kv.remove(&key).await?;
            }
        }
        Ok(())
    }

    /// Remove every key, including the player's name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be cleared.
    pub async fn clear_all(&self) -> Result<(), StorageError> {
        self.kv.clear().await
    }

    async fn read_or_default<T>(&self, key: &str, default: T) -> Result<T, StorageError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(default);
        };
        match raw.trim().parse() {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(key, raw = %raw, %err, "stored value is corrupt; using default");
                Ok(default)
            }
        }
    }
}

impl fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressStore").finish_non_exhaustive()
    }
}
