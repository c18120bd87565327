use serde::Deserialize;

/// Query string of `GET /search/`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Free-text query, forwarded verbatim to the engine.
    pub query: String,
}
