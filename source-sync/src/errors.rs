//! Error types for configuration loading and sync passes.
//!
//! All messages include the suffix `[Source Sync]` to simplify attribution in logs.

use std::path::PathBuf;

use search_engine::EngineError;
use thiserror::Error;

/// Result alias for sync passes.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Problems found while reading settings.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A number failed to parse (ports, batch sizes, timeouts).
    #[error("[Source Sync] invalid number in {var}: {reason}")]
    InvalidNumber {
        var: &'static str,
        reason: &'static str,
    },

    /// Value had the wrong shape (e.g. a table name that is not an identifier).
    #[error("[Source Sync] invalid format in {var}: {reason}")]
    InvalidFormat {
        var: &'static str,
        reason: &'static str,
    },
}

/// Failure of a single sync pass. The pass that raised it is aborted; other
/// passes of the same cycle still run.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reading a source file failed (missing permissions, invalid UTF-8, ...).
    #[error("[Source Sync] cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[Source Sync] postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Blocking filesystem task panicked or was cancelled.
    #[error("[Source Sync] task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}
