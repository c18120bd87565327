//! Periodic reconciliation of external sources into the search engine.
//!
//! Public API:
//! - [`config::AppConfig`]: environment-driven settings for the whole service.
//! - [`filestore::sync_filestore`] / [`postgres::sync_postgres`]: one sync pass per source.
//! - [`cycle::run_cycle`]: provisioning followed by both passes.
//! - [`scheduler::SyncScheduler`]: fixed-interval driver with an explicit shutdown handle.

pub mod config;
pub mod cycle;
pub mod errors;
pub mod filestore;
pub mod postgres;
pub mod reconcile;
pub mod scheduler;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{AppConfig, PostgresConfig, SyncConfig};
pub use errors::{ConfigError, SyncError};
pub use reconcile::SyncReport;
pub use scheduler::{SchedulerHandle, SyncScheduler};
