use atlas_config::config::Config;
use atlas_db::seed::seed_continents;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    api::{router, AppState},
    error::{AtlasResult, ErrorContext},
    utils::open_database,
};

pub async fn serve(mut config: Config, host: Option<String>, port: Option<u16>) -> AtlasResult<()> {
    if let Some(host) = host {
        config.server.host = Some(host);
    }
    if let Some(port) = port {
        config.server.port = Some(port);
    }
    config.validate()?;

    let mut db = open_database(&config, config.auto_migrate())?;
    if config.seed_on_start() {
        let seeded = seed_continents(db.conn())?;
        info!("Seeded {seeded} continents");
    }

    let addr = format!("{}:{}", config.host(), config.port());
    if !config.read_only() {
        warn!("Write routes are enabled");
    }

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Listening on http://{addr}");

    axum::serve(listener, router(AppState::new(db, config)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| "serving HTTP requests".into())?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {err}");
        std::future::pending::<()>().await;
    }
}
