use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use quiz_core::model::{Level, LevelNumber};

use super::document::LevelDocument;
use super::{LevelSource, file_name};
use crate::error::LevelLoadError;

/// Reads `level<n>.json` files from a directory.
#[derive(Debug, Clone)]
pub struct DirectoryLevelSource {
    root: PathBuf,
}

impl DirectoryLevelSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn path_for(&self, level: LevelNumber) -> PathBuf {
        self.root.join(file_name(level))
    }
}

#[async_trait]
impl LevelSource for DirectoryLevelSource {
    async fn fetch(&self, level: LevelNumber) -> Result<Level, LevelLoadError> {
        let path = self.path_for(level);
        debug!(path = %path.display(), "reading level file");
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => LevelLoadError::NotFound { level },
                _ => LevelLoadError::Transport {
                    level,
                    reason: format!("{}: {err}", path.display()),
                },
            })?;
        LevelDocument::parse(level, &raw)
    }
}
