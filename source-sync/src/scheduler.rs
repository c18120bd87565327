//! Fixed-interval driver for sync cycles.
//!
//! The first cycle starts one full interval after [`SyncScheduler::start`].
//! Every tick spawns its cycle as a separate task, so a cycle slower than the
//! interval overlaps with the next one instead of delaying it.
//! [`SchedulerHandle::shutdown`] aborts the ticker and any in-flight cycle
//! without waiting for them.

use std::sync::Arc;
use std::time::Duration;

use search_engine::SearchIndex;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::cycle::run_cycle;

/// Shortest period a ticker accepts; `INTERVAL=0` runs every second.
const MIN_PERIOD: Duration = Duration::from_secs(1);
/// Longest period, far below what would overflow `Instant` arithmetic.
const MAX_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Clamps a configured interval into the range the ticker can run with.
pub fn effective_period(configured: Duration) -> Duration {
    configured.clamp(MIN_PERIOD, MAX_PERIOD)
}

pub struct SyncScheduler<I> {
    index: Arc<I>,
    cfg: Arc<SyncConfig>,
}

impl<I> SyncScheduler<I>
where
    I: SearchIndex + 'static,
{
    pub fn new(index: Arc<I>, cfg: SyncConfig) -> Self {
        Self {
            index,
            cfg: Arc::new(cfg),
        }
    }

    /// Spawns the ticker task. Must be called from within a Tokio runtime.
    pub fn start(self) -> SchedulerHandle {
        let period = effective_period(self.cfg.interval);
        if period != self.cfg.interval {
            warn!(
                configured_secs = self.cfg.interval.as_secs(),
                interval_secs = period.as_secs(),
                "sync interval out of range, clamped"
            );
        }
        info!(interval_secs = period.as_secs(), "sync scheduler started");

        let ticker = tokio::spawn(async move {
            let now = Instant::now();
            let first = now.checked_add(period).unwrap_or(now);
            let mut ticks = interval_at(first, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut cycles = JoinSet::new();

            loop {
                ticks.tick().await;
                while cycles.try_join_next().is_some() {}

                if !cycles.is_empty() {
                    debug!(in_flight = cycles.len(), "previous cycle still running");
                }
                let index = Arc::clone(&self.index);
                let cfg = Arc::clone(&self.cfg);
                cycles.spawn(async move {
                    run_cycle(index.as_ref(), &cfg).await;
                });
            }
        });

        SchedulerHandle { ticker }
    }
}

/// Owner of the running scheduler. Dropping it also stops the scheduler.
pub struct SchedulerHandle {
    ticker: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Non-blocking stop; in-flight cycles are cancelled, not awaited.
    pub fn shutdown(self) {
        info!("sync scheduler stopping");
        // Drop aborts.
    }

    pub fn is_running(&self) -> bool {
        !self.ticker.is_finished()
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryIndex;
    use std::time::Duration;

    fn idle_config(secs: u64) -> SyncConfig {
        SyncConfig {
            interval: Duration::from_secs(secs),
            file_root: None,
            ..SyncConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_cycle_waits_one_interval() {
        let index = Arc::new(MemoryIndex::default());
        let handle = SyncScheduler::new(Arc::clone(&index), idle_config(10)).start();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(index.ensure_calls(), 0);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(index.ensure_calls(), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(index.ensure_calls(), 2);

        handle.shutdown();
    }

    #[test]
    fn period_is_clamped() {
        assert_eq!(effective_period(Duration::ZERO), Duration::from_secs(1));
        assert_eq!(effective_period(Duration::from_secs(3600)), Duration::from_secs(3600));
        assert_eq!(effective_period(Duration::MAX), MAX_PERIOD);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_ticks_every_second() {
        let index = Arc::new(MemoryIndex::default());
        let handle = SyncScheduler::new(Arc::clone(&index), idle_config(0)).start();

        tokio::time::sleep(Duration::from_millis(5500)).await;
        assert!(handle.is_running());
        assert_eq!(index.ensure_calls(), 5);

        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn huge_interval_does_not_kill_the_ticker() {
        let index = Arc::new(MemoryIndex::default());
        let handle = SyncScheduler::new(Arc::clone(&index), idle_config(u64::MAX)).start();

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(handle.is_running());
        assert_eq!(index.ensure_calls(), 0);

        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn slow_cycle_overlaps_with_the_next_tick() {
        let index = Arc::new(MemoryIndex::default().slow_provisioning(Duration::from_secs(25)));
        let handle = SyncScheduler::new(Arc::clone(&index), idle_config(10)).start();

        tokio::time::sleep(Duration::from_secs(21)).await;
        assert_eq!(index.ensure_calls(), 2);
        assert_eq!(index.ensure_completed(), 0);

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(index.ensure_completed(), 1);

        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_further_cycles() {
        let index = Arc::new(MemoryIndex::default());
        let handle = SyncScheduler::new(Arc::clone(&index), idle_config(10)).start();

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(index.ensure_calls(), 1);
        assert!(handle.is_running());

        handle.shutdown();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(index.ensure_calls(), 1);
    }
}
