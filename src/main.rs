use assist_tracker::{config::StorageKind, router, seed::REFERENCE_PLAYERS, AppState, Config};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if config.storage == StorageKind::File {
        if let Some(parent) = config.data_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        info!("using data file {}", config.data_path.display());
    } else {
        info!("using in-memory storage");
    }

    let state = AppState::from_config(&config).await?;
    {
        let ledger = state.ledger.read().await;
        for drift in ledger.reconcile(&REFERENCE_PLAYERS) {
            warn!(
                player_id = drift.player_id,
                expected = %drift.expected,
                actual = drift.actual,
                "assist total does not match seed plus ledger"
            );
        }
    }

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        return std::future::pending().await;
    }
    info!("shutting down");
}
