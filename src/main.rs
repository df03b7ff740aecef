use std::sync::Arc;

use clap::Parser;
use purchases::config::{CliArgs, Config};
use purchases::{router, telemetry, AppState, InMemoryStore, PurchaseStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliArgs::parse();
    let config = Config::load(&cli);

    telemetry::init_tracing(&config.logging);

    let metrics = if config.metrics.enabled {
        Some(telemetry::install_metrics_recorder()?)
    } else {
        None
    };

    let store: Arc<dyn PurchaseStore> = Arc::new(InMemoryStore::new());
    let app = router(AppState::new(store, metrics));

    let addr = config.listen_addr()?;
    tracing::info!(%addr, metrics = config.metrics.enabled, "Purchases API listening");

    axum::Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
