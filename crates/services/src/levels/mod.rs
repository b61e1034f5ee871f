//! Level retrieval: where level data comes from and how saved answers are merged in.

use async_trait::async_trait;

use quiz_core::model::{Level, LevelNumber};

use crate::error::LevelLoadError;

mod directory;
mod document;
mod http;
mod loader;
mod memory;

pub use directory::DirectoryLevelSource;
pub use document::{LevelDocument, QuestionDocument};
pub use http::HttpLevelSource;
pub use loader::LevelLoader;
pub use memory::StaticLevelSource;

/// Anything that can produce a level by number.
#[async_trait]
pub trait LevelSource: Send + Sync {
    /// Fetch and validate one level.
    ///
    /// # Errors
    ///
    /// Returns `LevelLoadError` if the level is absent, unreachable or malformed.
    async fn fetch(&self, level: LevelNumber) -> Result<Level, LevelLoadError>;
}

/// File name a level is published under, e.g. `level3.json`.
#[must_use]
pub fn file_name(level: LevelNumber) -> String {
    format!("level{level}.json")
}
