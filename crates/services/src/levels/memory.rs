use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use quiz_core::model::{Level, LevelNumber};

use super::LevelSource;
use crate::error::LevelLoadError;

/// Serves levels held in memory.
#[derive(Clone, Default)]
pub struct StaticLevelSource {
    levels: Arc<Mutex<HashMap<LevelNumber, Level>>>,
}

impl StaticLevelSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_level(self, level: Level) -> Self {
        self.insert(level);
        self
    }

    pub fn insert(&self, level: Level) {
        self.lock().insert(level.number(), level);
    }

    pub fn remove(&self, number: LevelNumber) -> Option<Level> {
        self.lock().remove(&number)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<LevelNumber, Level>> {
        self.levels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LevelSource for StaticLevelSource {
    async fn fetch(&self, level: LevelNumber) -> Result<Level, LevelLoadError> {
        self.lock()
            .get(&level)
            .cloned()
            .ok_or(LevelLoadError::NotFound { level })
    }
}
