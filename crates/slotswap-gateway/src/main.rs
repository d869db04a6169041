use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use slotswap_core::config::AuthMode;
use slotswap_core::SlotswapConfig;
use tracing::{info, warn};

mod app;
mod cli;
mod http;
mod ws;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slotswap_gateway=info,slotswap_swaps=info,tower_http=debug".into()),
        )
        .init();

    let cli = cli::Cli::parse();

    // load config: --config > SLOTSWAP_CONFIG env > ~/.slotswap/slotswap.toml
    let mut config = SlotswapConfig::load(cli.config_path().as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        SlotswapConfig::default()
    });
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    if let Some(db) = cli.db {
        config.database.path = db;
    }
    if config.gateway.auth.mode == AuthMode::TrustedProxy {
        warn!("trusted-proxy auth: identities are taken from the connect payload unchecked; only expose this listener to the proxy");
    }

    // single SQLite file shared by profiles and swaps
    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    db.busy_timeout(Duration::from_millis(config.database.busy_timeout_ms))?;

    // profiles first: events and swap_requests reference profiles(id)
    slotswap_profiles::db::init_db(&db)?;
    slotswap_swaps::db::init_db(&db)?;
    info!("database migrations complete");

    let db = Arc::new(Mutex::new(db));
    let profiles = slotswap_profiles::ProfileResolver::new(Arc::clone(&db));
    let swaps = slotswap_swaps::SwapManager::shared(db)?;

    let violations = swaps.verify_invariants()?;
    if violations.is_empty() {
        info!("swap invariants verified");
    } else {
        warn!(count = violations.len(), "store has inconsistent swap state");
    }

    let addr: SocketAddr = config.listen_addr().parse()?;
    let state = Arc::new(app::AppState::new(config, profiles, swaps));
    let router = app::build_router(state);

    info!("SlotSwap gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("SlotSwap gateway stopped");
    Ok(())
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
