use std::{error::Error, sync::Arc};

use api::AppState;
use search_engine::ElasticClient;
use source_sync::{AppConfig, SyncScheduler, telemetry};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine; real deployments pass variables directly.
    let dotenv = dotenvy::dotenv();

    telemetry::init("info")?;
    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, ".env file could not be loaded");
        }
    }

    let cfg = AppConfig::from_env()?;
    info!(config = ?cfg, "configuration loaded");

    let engine = Arc::new(ElasticClient::new(cfg.engine)?);

    let scheduler = SyncScheduler::new(engine.clone(), cfg.sync).start();

    let served = api::start(
        &cfg.api_address,
        Arc::new(AppState::new(engine)),
        api::shutdown_signal(),
    )
    .await;

    scheduler.shutdown();
    info!("sync scheduler stopped");

    served?;
    Ok(())
}
