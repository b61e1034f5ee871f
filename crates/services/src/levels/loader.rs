use std::sync::Arc;

use tracing::debug;

use quiz_core::model::{Level, LevelNumber};
use storage::ProgressStore;

use super::LevelSource;
use crate::error::LevelLoadError;

/// Fetches levels and pre-fills answers saved for them.
#[derive(Clone)]
pub struct LevelLoader {
    source: Arc<dyn LevelSource>,
    progress: ProgressStore,
}

impl LevelLoader {
    #[must_use]
    pub fn new(source: Arc<dyn LevelSource>, progress: ProgressStore) -> Self {
        Self { source, progress }
    }

    /// Load `level`, restoring any saved picks by question index.
    ///
    /// # Errors
    ///
    /// Returns `LevelLoadError` if the level cannot be fetched or the saved
    /// picks cannot be read.
    pub async fn load(&self, level: LevelNumber) -> Result<Level, LevelLoadError> {
        let mut loaded = self.source.fetch(level).await?;
        let saved = self
            .progress
            .selections(level)
            .await
            .map_err(|source| LevelLoadError::Storage { level, source })?;

        if let Some(saved) = saved {
            let applied = loaded.apply_selections(&saved);
            debug!(%level, applied, "restored saved selections");
        }
        Ok(loaded)
    }
}
