/*****************************************************************************************
 *
 *  valuekeeper – In-memory key–value record service
 *  ------------------------------------------------
 *
 *  Records keyed by an auto-generated id, gated by an id:password header.
 *
 *****************************************************************************************/

mod app;
mod config;
mod errors;
mod middleware;
mod routes;
mod services;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use axum::serve;
use tokio::net::TcpListener;
use tracing_subscriber::FmtSubscriber;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::services::auth_service::AuthGate;
use crate::state::credentials::CredentialTable;
use crate::state::values::{new_store, SharedStore};

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    //
    // ────────────────────────────────────────────────────────
    //  Load configuration
    // ────────────────────────────────────────────────────────
    //
    let config_path = locate_config()?;
    let cfg = AppConfig::load_from_file(&config_path)?;

    //
    // ────────────────────────────────────────────────────────
    //  Configure logging
    // ────────────────────────────────────────────────────────
    //
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cfg.level_filter())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
    }

    tracing::info!("Loaded config.json from {}", config_path.display());

    //
    // ────────────────────────────────────────────────────────
    //  Build the credential table and the value store
    // ────────────────────────────────────────────────────────
    //
    let credentials = CredentialTable::from_users(cfg.app_users.clone())?;
    tracing::info!("Loaded {} app users", credentials.len());
    if credentials.is_empty() {
        tracing::warn!("No app_users configured; every /values request will be rejected");
    }
    let gate = AuthGate::new(Arc::new(credentials));

    let store = new_store(cfg.backend());
    let metadata = cfg.metadata();

    tracing::info!(
        name = %metadata.name,
        version = %metadata.version,
        backend = ?store.backend(),
        "Starting value service"
    );

    let app = app::build_app(store.clone(), gate, metadata);

    //
    // ────────────────────────────────────────────────────────
    //  Bind server and start listening
    // ────────────────────────────────────────────────────────
    //
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    serve(listener, app)
        .with_graceful_shutdown(shutdown(store))
        .await?;

    Ok(())
}

/// Find config.json beside the executable, or one directory up.
fn locate_config() -> Result<PathBuf, ServiceError> {
    let exe_path = std::env::current_exe()?;
    let exe_dir = exe_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let candidates = vec![
        exe_dir.join("config.json"),
        exe_dir.join("..").join("config.json"),
    ];

    match candidates.iter().position(|p| p.exists()) {
        Some(i) => Ok(candidates[i].clone()),
        None => Err(ServiceError::ConfigNotFound(candidates)),
    }
}

//
// ─────────────────────────────────────────────────────────────
//  Graceful shutdown handler
// ─────────────────────────────────────────────────────────────
//
async fn shutdown(store: SharedStore) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }

    if store.is_empty() {
        tracing::warn!("CTRL+C received, shutting down.");
    } else {
        tracing::warn!("CTRL+C received, discarding {} stored values.", store.len());
    }
}
