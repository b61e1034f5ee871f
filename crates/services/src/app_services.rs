use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use quiz_core::model::QuizConfig;
use storage::ProgressStore;
use storage::repository::Storage;

use crate::controller::QuizController;
use crate::error::AppServicesError;
use crate::levels::{DirectoryLevelSource, HttpLevelSource, LevelSource};
use crate::render::Renderer;

/// Where level files are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelLocation {
    Directory(PathBuf),
    Http(String),
}

impl LevelLocation {
    #[must_use]
    pub fn source(&self) -> Arc<dyn LevelSource> {
        match self {
            Self::Directory(root) => Arc::new(DirectoryLevelSource::new(root.clone())),
            Self::Http(base_url) => Arc::new(HttpLevelSource::new(base_url.clone())),
        }
    }
}

impl FromStr for LevelLocation {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Ok(Self::Http(raw.to_owned()))
        } else {
            Ok(Self::Directory(PathBuf::from(raw)))
        }
    }
}

impl fmt::Display for LevelLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory(root) => write!(f, "{}", root.display()),
            Self::Http(base_url) => f.write_str(base_url),
        }
    }
}

/// Assembles the progress store and level source the controller runs on.
#[derive(Clone)]
pub struct AppServices {
    progress: ProgressStore,
    levels: Arc<dyn LevelSource>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(
        db_url: &str,
        location: &LevelLocation,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, location.source()))
    }

    /// Build services that forget everything on exit.
    #[must_use]
    pub fn in_memory(location: &LevelLocation) -> Self {
        Self::from_storage(&Storage::in_memory(), location.source())
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, levels: Arc<dyn LevelSource>) -> Self {
        Self {
            progress: storage.progress(),
            levels,
        }
    }

    #[must_use]
    pub fn progress(&self) -> ProgressStore {
        self.progress.clone()
    }

    #[must_use]
    pub fn levels(&self) -> Arc<dyn LevelSource> {
        Arc::clone(&self.levels)
    }

    #[must_use]
    pub fn controller<R: Renderer>(&self, config: QuizConfig, renderer: R) -> QuizController<R> {
        QuizController::new(config, self.progress(), self.levels(), renderer)
    }
}
