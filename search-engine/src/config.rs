//! Connection settings for the search engine.

use std::time::Duration;

/// Endpoint, credentials and index names used by [`crate::ElasticClient`].
#[derive(Clone)]
pub struct EngineConfig {
    /// Base URL, e.g. `http://elasticsearch:9200`.
    pub url: String,
    /// Basic-auth user; auth is skipped when `None`.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Per-request timeout applied to every engine call.
    pub timeout: Duration,
    /// Index holding filesystem-origin documents.
    pub file_index: String,
    /// Index holding database-origin documents.
    pub db_index: String,
}

impl EngineConfig {
    /// Config pointing at `url` with the stock index names and a 30s timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
            timeout: Duration::from_secs(30),
            file_index: "filestore".to_string(),
            db_index: "postgres".to_string(),
        }
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .field("file_index", &self.file_index)
            .field("db_index", &self.db_index)
            .finish()
    }
}
