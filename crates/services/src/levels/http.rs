use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use quiz_core::model::{Level, LevelNumber};

use super::document::LevelDocument;
use super::{LevelSource, file_name};
use crate::error::LevelLoadError;

/// Fetches `level<n>.json` from a static file host.
///
/// No timeout is applied; a non-success status counts as a missing level.
#[derive(Debug, Clone)]
pub struct HttpLevelSource {
    client: Client,
    base_url: String,
}

impl HttpLevelSource {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    #[must_use]
    pub fn url_for(&self, level: LevelNumber) -> String {
        format!("{}/{}", self.base_url, file_name(level))
    }
}

#[async_trait]
impl LevelSource for HttpLevelSource {
    async fn fetch(&self, level: LevelNumber) -> Result<Level, LevelLoadError> {
        let url = self.url_for(level);
        debug!(%url, "fetching level");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| LevelLoadError::Transport {
                level,
                reason: err.to_string(),
            })?;

        if !response.status().is_success() {
            debug!(%url, status = %response.status(), "level request failed");
            return Err(LevelLoadError::NotFound { level });
        }

        let body = response
            .text()
            .await
            .map_err(|err| LevelLoadError::Malformed {
                level,
                reason: err.to_string(),
            })?;
        LevelDocument::parse(level, &body)
    }
}
