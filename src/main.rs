use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use healthpredict::common::config::AppCfg;
use healthpredict::common::log;
use healthpredict::inference::domain::{DEFAULTABLE_FEATURES, FEATURE_SCHEMA};
use healthpredict::{api, FsArtefactRepo, ModelStore};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = AppCfg::load();
    log::init(&cfg.log_filter);

    let addr = cfg
        .bind_addr()
        .with_context(|| format!("invalid bind address {:?}", cfg.bind))?;

    let store = Arc::new(ModelStore::load(&FsArtefactRepo::new(&cfg)));
    let status = store.status();
    info!(
        model_loaded = status.model_loaded,
        scaler_loaded = status.scaler_loaded,
        features = %FEATURE_SCHEMA.join(", "),
        defaultable = %DEFAULTABLE_FEATURES.join(", "),
        "air-quality health impact backend starting"
    );
    if !status.available() {
        warn!("model store unavailable; /predict will answer 500 until restart");
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, api::router(store))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated")?;

    info!("backend stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
