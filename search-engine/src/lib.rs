//! Elasticsearch access layer shared by the sync jobs and the HTTP API.
//!
//! Public API:
//! - [`ElasticClient`]: provisioning, bulk upsert, stale pruning, search and health.
//! - [`SearchIndex`]: the write-side seam the sync passes are generic over.
//! - Models: [`IndexedDocument`], [`SourceKind`], [`SearchPage`], [`RawHit`], [`BulkReport`].

pub mod client;
pub mod config;
pub mod errors;
pub mod index;
pub mod models;

pub use client::ElasticClient;
pub use config::EngineConfig;
pub use errors::{EngineError, Result};
pub use index::SearchIndex;
pub use models::{BulkReport, IndexedDocument, RawHit, SearchPage, SourceKind};
