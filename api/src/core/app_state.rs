use std::sync::Arc;

use search_engine::ElasticClient;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Engine client shared with the sync scheduler.
    pub engine: Arc<ElasticClient>,
}

impl AppState {
    pub fn new(engine: Arc<ElasticClient>) -> Self {
        Self { engine }
    }
}
