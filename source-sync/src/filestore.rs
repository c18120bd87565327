//! Filesystem source: walk a directory tree and mirror allowed files into the
//! file index.
//!
//! - Extension match is case-sensitive on the last dot-segment of the file name.
//! - Document ID is the full path under the canonicalized root; name is the base filename.
//! - Empty files are neither indexed nor part of the live-ID set.
//! - A read error aborts the pass before anything is pruned.

use std::path::Path;

use search_engine::{IndexedDocument, SearchIndex, SourceKind};
use tokio::task;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::config::SyncConfig;
use crate::errors::{Result, SyncError};
use crate::reconcile::{SyncReport, reconcile};

/// Documents collected by one walk.
#[derive(Debug, Default)]
pub struct FileScan {
    pub docs: Vec<IndexedDocument>,
    pub skipped_empty: usize,
}

/// Last dot-segment of a file name (`"a.tar.gz"` → `"gz"`, `"README"` → `"README"`).
pub fn extension_of(file_name: &str) -> &str {
    file_name.rsplit('.').next().unwrap_or(file_name)
}

/// Blocking walk of `root`. Unreadable directory entries are skipped; unreadable
/// files abort the scan. Symlinks to files are read through; linked directories
/// are not descended into.
pub fn scan_files(root: &Path, allowed: &[String]) -> Result<FileScan> {
    let root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let mut scan = FileScan::default();

    for entry in WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.path().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if !allowed.iter().any(|ext| ext == extension_of(&file_name)) {
            continue;
        }

        let path = entry.path();
        let content = std::fs::read_to_string(path).map_err(|source| SyncError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.is_empty() {
            debug!(path = %path.display(), "empty file skipped");
            scan.skipped_empty += 1;
            continue;
        }

        scan.docs.push(IndexedDocument::new(
            path.to_string_lossy(),
            SourceKind::Filesystem,
            file_name,
            content,
        ));
    }

    Ok(scan)
}

/// One filesystem sync pass. No-op when no root is configured.
#[instrument(skip_all, fields(source = "filestore"))]
pub async fn sync_filestore<I: SearchIndex>(index: &I, cfg: &SyncConfig) -> Result<SyncReport> {
    let Some(root) = cfg.file_root.clone() else {
        info!("FILE_PATH is not set, skipped");
        return Ok(SyncReport::skipped(SourceKind::Filesystem));
    };
    info!(root = %root.display(), "start indexing filestore");

    let allowed = cfg.allowed_extensions.clone();
    let scan = task::spawn_blocking(move || scan_files(&root, &allowed)).await??;

    let mut report = reconcile(index, SourceKind::Filesystem, &scan.docs, cfg.batch_size).await?;
    report.skipped_empty = scan.skipped_empty;

    info!(
        indexed = report.indexed,
        failed = report.failed,
        skipped_empty = report.skipped_empty,
        pruned = report.pruned,
        "filestore sync finished"
    );
    Ok(report)
}
