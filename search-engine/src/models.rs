//! Documents written to and hits read from the engine.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Where an indexed document came from. Decides the target index and the
/// name field stored in `_source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Filesystem,
    Database,
}

impl SourceKind {
    /// `_source` field carrying the display name.
    pub fn name_field(self) -> &'static str {
        match self {
            SourceKind::Filesystem => "file_name",
            SourceKind::Database => "book",
        }
    }

    /// Short label used in logs.
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Filesystem => "filestore",
            SourceKind::Database => "postgres",
        }
    }
}

/// A document as produced by one of the sync passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDocument {
    /// Deterministic per source: full path or `"{title}_{chunk_id}"`.
    pub id: String,
    pub source_kind: SourceKind,
    pub display_name: String,
    pub content: String,
}

impl IndexedDocument {
    pub fn new(
        id: impl Into<String>,
        source_kind: SourceKind,
        display_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_kind,
            display_name: display_name.into(),
            content: content.into(),
        }
    }

    /// JSON body stored as `_source`.
    pub fn source_body(&self) -> Value {
        json!({
            self.source_kind.name_field(): self.display_name,
            "content": self.content,
        })
    }
}

/// One search hit before highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHit {
    pub index: String,
    pub id: String,
    /// Resolved from `file_name`/`book` depending on the index; empty otherwise.
    pub name: String,
    pub content: String,
}

/// Result of a relevance-ranked query.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    /// Total matches reported by the engine (may exceed `hits.len()`).
    pub total: u64,
    pub hits: Vec<RawHit>,
}

/// Aggregated outcome of one or more bulk requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkReport {
    pub written: usize,
    pub failed: usize,
    /// `(id, reason)` for every rejected item.
    pub failures: Vec<(String, String)>,
}

impl BulkReport {
    pub fn merge(&mut self, other: BulkReport) {
        self.written += other.written;
        self.failed += other.failed;
        self.failures.extend(other.failures);
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}
