//! In-memory [`SearchIndex`] used by unit tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use search_engine::{
    BulkReport, EngineError, IndexedDocument, Result, SearchIndex, SourceKind,
};

#[derive(Default)]
pub struct MemoryIndex {
    docs: Mutex<BTreeMap<(SourceKind, String), IndexedDocument>>,
    bulk_calls: AtomicUsize,
    ensure_calls: AtomicUsize,
    ensure_completed: AtomicUsize,
    ensure_delay: Option<Duration>,
    reject_id: Option<String>,
    fail_ensure: bool,
}

impl MemoryIndex {
    /// Every upsert of `id` is reported as a rejected bulk item.
    pub fn rejecting(mut self, id: &str) -> Self {
        self.reject_id = Some(id.to_string());
        self
    }

    /// `ensure_indices` fails like an unreachable engine.
    pub fn failing_provisioning(mut self) -> Self {
        self.fail_ensure = true;
        self
    }

    /// `ensure_indices` takes `delay` before answering.
    pub fn slow_provisioning(mut self, delay: Duration) -> Self {
        self.ensure_delay = Some(delay);
        self
    }

    pub fn put(&self, doc: IndexedDocument) {
        self.docs
            .lock()
            .unwrap()
            .insert((doc.source_kind, doc.id.clone()), doc);
    }

    pub fn ids(&self, kind: SourceKind) -> Vec<String> {
        self.docs
            .lock()
            .unwrap()
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, id)| id.clone())
            .collect()
    }

    pub fn get(&self, kind: SourceKind, id: &str) -> Option<IndexedDocument> {
        self.docs
            .lock()
            .unwrap()
            .get(&(kind, id.to_string()))
            .cloned()
    }

    pub fn bulk_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::SeqCst)
    }

    pub fn ensure_calls(&self) -> usize {
        self.ensure_calls.load(Ordering::SeqCst)
    }

    /// `ensure_indices` calls that have returned.
    pub fn ensure_completed(&self) -> usize {
        self.ensure_completed.load(Ordering::SeqCst)
    }
}

impl SearchIndex for MemoryIndex {
    async fn ensure_indices(&self) -> Result<()> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.ensure_delay {
            tokio::time::sleep(delay).await;
        }
        self.ensure_completed.fetch_add(1, Ordering::SeqCst);
        if self.fail_ensure {
            return Err(EngineError::Decode("engine unavailable".into()));
        }
        Ok(())
    }

    async fn bulk_upsert(&self, docs: &[IndexedDocument]) -> Result<BulkReport> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);
        let mut report = BulkReport::default();
        for doc in docs {
            if self.reject_id.as_deref() == Some(doc.id.as_str()) {
                report.failed += 1;
                report
                    .failures
                    .push((doc.id.clone(), "mapper_parsing_exception".into()));
                continue;
            }
            self.put(doc.clone());
            report.written += 1;
        }
        Ok(report)
    }

    async fn delete_missing(&self, kind: SourceKind, keep: &BTreeSet<String>) -> Result<u64> {
        let mut docs = self.docs.lock().unwrap();
        let before = docs.len();
        docs.retain(|(k, id), _| *k != kind || keep.contains(id));
        Ok((before - docs.len()) as u64)
    }
}
