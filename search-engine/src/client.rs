//! HTTP client for the Elasticsearch REST API.
//!
//! Endpoints used:
//! - `PUT  {url}/{index}`: index provisioning (400 = already exists)
//! - `POST {url}/_bulk`: NDJSON batch upsert
//! - `POST {url}/{index}/_delete_by_query`: prune IDs outside the live set
//! - `POST {url}/{a},{b}/_search`: query-string full-text search
//! - `GET  {url}/_cluster/health`: health probe
//!
//! A single `reqwest::Client` is reused for all calls and every request carries
//! the configured timeout.

use std::collections::BTreeSet;
use std::time::Instant;

use reqwest::{RequestBuilder, Response, StatusCode, header};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument, warn};

use crate::config::EngineConfig;
use crate::errors::{EngineError, Result, make_snippet};
use crate::index::SearchIndex;
use crate::models::{BulkReport, IndexedDocument, RawHit, SearchPage, SourceKind};

/// Upper bound of hits requested per query.
pub const MAX_RESULTS: u64 = 100;

/// Shared engine client. Cheap to clone the surrounding `Arc`, never the client itself.
pub struct ElasticClient {
    http: reqwest::Client,
    cfg: EngineConfig,
    base: String,
}

/// Snapshot returned by [`ElasticClient::health`].
#[derive(Debug, Clone)]
pub struct EngineHealth {
    /// Cluster status (`green`/`yellow`/`red`) or `unreachable`.
    pub status: String,
    pub latency_ms: u128,
}

impl ElasticClient {
    /// Builds the client.
    ///
    /// # Errors
    /// - [`EngineError::InvalidEndpoint`] if `cfg.url` is empty or not http/https
    /// - [`EngineError::Transport`] if the HTTP client cannot be built
    pub fn new(cfg: EngineConfig) -> Result<Self> {
        let url = cfg.url.trim();
        if url.is_empty() || !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(EngineError::InvalidEndpoint(cfg.url));
        }
        let base = url.trim_end_matches('/').to_string();

        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            // Local clusters commonly run with self-signed certificates.
            .danger_accept_invalid_certs(true)
            .build()?;

        info!(
            url = %base,
            timeout_secs = cfg.timeout.as_secs(),
            file_index = %cfg.file_index,
            db_index = %cfg.db_index,
            "ElasticClient initialized"
        );

        Ok(Self { http, cfg, base })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Index name for documents of the given origin.
    pub fn index_for(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Filesystem => &self.cfg.file_index,
            SourceKind::Database => &self.cfg.db_index,
        }
    }

    fn authed(&self, rb: RequestBuilder) -> RequestBuilder {
        match &self.cfg.username {
            Some(user) => rb.basic_auth(user, self.cfg.password.as_deref()),
            None => rb,
        }
    }

    async fn check(url: &str, resp: Response) -> Result<Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        Err(EngineError::HttpStatus {
            status,
            url: url.to_string(),
            snippet: make_snippet(&text),
        })
    }

    /// Creates one index; a 400 answer means it already exists.
    async fn create_index(&self, index: &str) -> Result<()> {
        let url = format!("{}/{}", self.base, index);
        debug!(%url, "PUT index");
        let resp = self.authed(self.http.put(&url)).send().await?;
        match Self::check(&url, resp).await {
            Ok(_) => {
                info!(index, "index created");
                Ok(())
            }
            Err(e) if e.is_status(StatusCode::BAD_REQUEST) => {
                debug!(index, "index already exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Sends one `_bulk` request with `index` actions for every document.
    ///
    /// Transport or HTTP-level failures return the error; item-level
    /// rejections are collected into the report.
    async fn bulk_once(&self, docs: &[IndexedDocument]) -> Result<BulkReport> {
        let mut body = String::new();
        for doc in docs {
            let action = json!({ "index": { "_index": self.index_for(doc.source_kind), "_id": doc.id } });
            body.push_str(&action.to_string());
            body.push('\n');
            body.push_str(&doc.source_body().to_string());
            body.push('\n');
        }

        let url = format!("{}/_bulk", self.base);
        let resp = self
            .authed(self.http.post(&url))
            .header(header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await?;
        let resp = Self::check(&url, resp).await?;
        let parsed: BulkResponse = resp
            .json()
            .await
            .map_err(|e| EngineError::Decode(format!("bulk response: {e}")))?;

        let mut report = BulkReport::default();
        for item in parsed.items {
            let Some(outcome) = item.into_values().next() else {
                continue;
            };
            match outcome.error {
                Some(err) => {
                    report.failed += 1;
                    report.failures.push((outcome.id, describe_item_error(&err)));
                }
                None if (200..300).contains(&outcome.status) => report.written += 1,
                None => {
                    report.failed += 1;
                    report
                        .failures
                        .push((outcome.id, format!("status {}", outcome.status)));
                }
            }
        }
        Ok(report)
    }

    /// Relevance-ranked `query_string` search over both indices, restricted to
    /// `content`, top [`MAX_RESULTS`] hits from offset 0.
    #[instrument(skip(self), fields(query_len = query.len()))]
    pub async fn search(&self, query: &str) -> Result<SearchPage> {
        let url = format!(
            "{}/{},{}/_search?ignore_unavailable=true",
            self.base, self.cfg.file_index, self.cfg.db_index
        );
        let body = json!({
            "query": { "query_string": { "query": query, "fields": ["content"] } },
            "size": MAX_RESULTS,
            "from": 0,
            "sort": ["_score"],
        });

        let started = Instant::now();
        let resp = self.authed(self.http.post(&url)).json(&body).send().await?;
        let resp = Self::check(&url, resp).await.inspect_err(|e| {
            error!(error = %e, "search request failed");
        })?;
        let parsed: SearchResponseBody = resp
            .json()
            .await
            .map_err(|e| EngineError::Decode(format!("search response: {e}")))?;

        let hits = parsed
            .hits
            .hits
            .into_iter()
            .map(|h| self.to_raw_hit(h))
            .collect::<Vec<_>>();

        debug!(
            total = parsed.hits.total.value,
            returned = hits.len(),
            latency_ms = started.elapsed().as_millis(),
            "search completed"
        );

        Ok(SearchPage {
            total: parsed.hits.total.value,
            hits,
        })
    }

    fn to_raw_hit(&self, h: HitBody) -> RawHit {
        let name_field = if h.index == self.cfg.file_index {
            Some(SourceKind::Filesystem.name_field())
        } else if h.index == self.cfg.db_index {
            Some(SourceKind::Database.name_field())
        } else {
            None
        };
        let name = name_field
            .and_then(|f| h.source.get(f))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let content = h
            .source
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        RawHit {
            index: h.index,
            id: h.id,
            name,
            content,
        }
    }

    /// Cluster health probe. Never fails: transport errors map to `unreachable`.
    pub async fn health(&self) -> EngineHealth {
        let url = format!("{}/_cluster/health", self.base);
        let started = Instant::now();

        #[derive(Deserialize)]
        struct Health {
            status: String,
        }

        let result: Result<Health> = async {
            let resp = self.authed(self.http.get(&url)).send().await?;
            let resp = Self::check(&url, resp).await?;
            resp.json::<Health>()
                .await
                .map_err(|e| EngineError::Decode(format!("cluster health: {e}")))
        }
        .await;

        let latency_ms = started.elapsed().as_millis();
        match result {
            Ok(h) => EngineHealth {
                status: h.status,
                latency_ms,
            },
            Err(e) => {
                warn!(error = %e, "engine health probe failed");
                EngineHealth {
                    status: "unreachable".to_string(),
                    latency_ms,
                }
            }
        }
    }
}

impl SearchIndex for ElasticClient {
    async fn ensure_indices(&self) -> Result<()> {
        self.create_index(&self.cfg.file_index).await?;
        self.create_index(&self.cfg.db_index).await
    }

    #[instrument(skip_all, fields(docs = docs.len()))]
    async fn bulk_upsert(&self, docs: &[IndexedDocument]) -> Result<BulkReport> {
        if docs.is_empty() {
            return Ok(BulkReport::default());
        }
        self.bulk_once(docs).await
    }

    #[instrument(skip(self, keep), fields(source = kind.label(), keep = keep.len()))]
    async fn delete_missing(&self, kind: SourceKind, keep: &BTreeSet<String>) -> Result<u64> {
        let index = self.index_for(kind);
        let url = format!(
            "{}/{}/_delete_by_query?conflicts=proceed&refresh=true",
            self.base, index
        );
        let ids: Vec<&str> = keep.iter().map(String::as_str).collect();
        let body = json!({
            "query": { "bool": { "must_not": [ { "ids": { "values": ids } } ] } }
        });

        let resp = self.authed(self.http.post(&url)).json(&body).send().await?;
        let resp = Self::check(&url, resp).await?;
        let parsed: DeleteByQueryBody = resp
            .json()
            .await
            .map_err(|e| EngineError::Decode(format!("delete_by_query response: {e}")))?;

        debug!(index, deleted = parsed.deleted, "stale documents removed");
        Ok(parsed.deleted)
    }
}

fn describe_item_error(err: &Value) -> String {
    let kind = err.get("type").and_then(Value::as_str).unwrap_or("unknown");
    match err.get("reason").and_then(Value::as_str) {
        Some(reason) => format!("{kind}: {reason}"),
        None => kind.to_string(),
    }
}

/* ------------------------------------------------------------------------- */
/* Wire types                                                                */
/* ------------------------------------------------------------------------- */

#[derive(Deserialize)]
struct BulkResponse {
    #[serde(default)]
    items: Vec<std::collections::HashMap<String, BulkItem>>,
}

#[derive(Deserialize)]
struct BulkItem {
    #[serde(rename = "_id", default)]
    id: String,
    #[serde(default)]
    status: u16,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
struct SearchResponseBody {
    hits: HitsBody,
}

#[derive(Deserialize)]
struct HitsBody {
    total: TotalBody,
    #[serde(default)]
    hits: Vec<HitBody>,
}

#[derive(Deserialize)]
struct TotalBody {
    value: u64,
}

#[derive(Deserialize)]
struct HitBody {
    #[serde(rename = "_index")]
    index: String,
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Value,
}

#[derive(Deserialize)]
struct DeleteByQueryBody {
    #[serde(default)]
    deleted: u64,
}
