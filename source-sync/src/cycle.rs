//! One scheduler tick: provision the indices, then run both sync passes.

use search_engine::{SearchIndex, SourceKind};
use tracing::{error, info, instrument};

use crate::config::SyncConfig;
use crate::errors::SyncError;
use crate::filestore::sync_filestore;
use crate::postgres::sync_postgres;
use crate::reconcile::SyncReport;

/// What happened during a cycle. Each pass result is independent.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Index provisioning failed; no pass ran.
    Skipped(SyncError),
    Ran {
        filestore: Result<SyncReport, SyncError>,
        postgres: Result<SyncReport, SyncError>,
    },
}

/// Runs the filesystem pass then the database pass. A failing pass is logged
/// and does not prevent the other one.
#[instrument(skip_all)]
pub async fn run_cycle<I: SearchIndex>(index: &I, cfg: &SyncConfig) -> CycleOutcome {
    if let Err(e) = index.ensure_indices().await {
        error!(error = %e, "cannot create indices on the search engine, cycle skipped");
        return CycleOutcome::Skipped(e.into());
    }

    let filestore = sync_filestore(index, cfg).await;
    log_failure(SourceKind::Filesystem, &filestore);

    let postgres = sync_postgres(index, cfg).await;
    log_failure(SourceKind::Database, &postgres);

    info!("sync cycle finished");
    CycleOutcome::Ran {
        filestore,
        postgres,
    }
}

fn log_failure(kind: SourceKind, result: &Result<SyncReport, SyncError>) {
    if let Err(e) = result {
        error!(source = kind.label(), error = %e, "synchronization failed");
    }
}
