//! Shared tail of every sync pass: batch upsert, then prune stale documents.

use std::collections::BTreeSet;

use search_engine::{BulkReport, IndexedDocument, SearchIndex, SourceKind};
use tracing::{info, warn};

use crate::errors::Result;

/// How many rejected IDs are echoed into the log.
const LOGGED_FAILURES: usize = 5;

/// Outcome of one sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub source: SourceKind,
    /// Source unavailable (missing config); nothing was touched.
    pub skipped: bool,
    /// Records found at the source with non-empty content.
    pub seen: usize,
    /// Empty records ignored by the pass.
    pub skipped_empty: usize,
    pub indexed: usize,
    pub failed: usize,
    /// Stale documents removed from the index.
    pub pruned: u64,
}

impl SyncReport {
    pub fn skipped(source: SourceKind) -> Self {
        Self {
            source,
            skipped: true,
            seen: 0,
            skipped_empty: 0,
            indexed: 0,
            failed: 0,
            pruned: 0,
        }
    }
}

/// Writes `docs` in batches of `batch_size` and deletes every document of
/// `kind` whose ID is not among them.
///
/// Item-level bulk rejections are aggregated and logged; the pass still prunes
/// against the full live-ID set so a rejected record keeps its previous version.
pub async fn reconcile<I: SearchIndex>(
    index: &I,
    kind: SourceKind,
    docs: &[IndexedDocument],
    batch_size: usize,
) -> Result<SyncReport> {
    let live: BTreeSet<String> = docs.iter().map(|d| d.id.clone()).collect();

    let mut bulk = BulkReport::default();
    for chunk in docs.chunks(batch_size.max(1)) {
        bulk.merge(index.bulk_upsert(chunk).await?);
    }

    if !bulk.is_clean() {
        let sample: Vec<String> = bulk
            .failures
            .iter()
            .take(LOGGED_FAILURES)
            .map(|(id, reason)| format!("{id}: {reason}"))
            .collect();
        warn!(
            source = kind.label(),
            failed = bulk.failed,
            written = bulk.written,
            sample = ?sample,
            "some documents were rejected by the engine"
        );
    }

    info!(source = kind.label(), live = live.len(), "start removing unused documents");
    let pruned = index.delete_missing(kind, &live).await?;

    Ok(SyncReport {
        source: kind,
        skipped: false,
        seen: live.len(),
        skipped_empty: 0,
        indexed: bulk.written,
        failed: bulk.failed,
        pruned,
    })
}
