use search_engine::SearchPage;
use search_engine::client::MAX_RESULTS;
use serde::Serialize;
use text_highlight::prepare_content;

/// One hit with highlighted content.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    pub content: String,
}

/// Response payload for `GET /search/`.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Total reported matches, capped at 100.
    pub size: u64,
    /// Hits in engine relevance order.
    pub result: Vec<SearchHit>,
}

impl SearchResponse {
    /// Highlights every hit against `query` and caps the reported size.
    pub fn from_page(page: SearchPage, query: &str) -> Self {
        let result = page
            .hits
            .into_iter()
            .take(MAX_RESULTS as usize)
            .map(|hit| SearchHit {
                content: prepare_content(&hit.content, query),
                id: hit.id,
                name: hit.name,
            })
            .collect();

        Self {
            size: page.total.min(MAX_RESULTS),
            result,
        }
    }
}
