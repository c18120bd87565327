//! Write-side seam used by the sync passes.
//!
//! [`crate::ElasticClient`] is the production implementation; tests plug in an
//! in-memory index to check reconciliation without a running engine.

use std::collections::BTreeSet;
use std::future::Future;

use crate::errors::Result;
use crate::models::{BulkReport, IndexedDocument, SourceKind};

pub trait SearchIndex: Send + Sync {
    /// Creates every index the sync passes write to. Already existing indices are fine.
    fn ensure_indices(&self) -> impl Future<Output = Result<()>> + Send;

    /// Index-or-replace every document by ID. Per-item rejections are reported,
    /// not returned as an error.
    fn bulk_upsert(
        &self,
        docs: &[IndexedDocument],
    ) -> impl Future<Output = Result<BulkReport>> + Send;

    /// Deletes every document of `kind` whose ID is not in `keep`. Returns the
    /// number of deleted documents.
    fn delete_missing(
        &self,
        kind: SourceKind,
        keep: &BTreeSet<String>,
    ) -> impl Future<Output = Result<u64>> + Send;
}
