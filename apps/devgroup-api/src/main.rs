//! Device-group service.
//!
//! Answers `GET /api/device-group` by making sure the calling device owns a
//! dedicated group in the Pi-hole directory, then reporting what it found.

mod config;
mod logging;
mod routes;

use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

use config::AppConfig;
use devgroup_pihole::{PiholeClient, Reconciler};
use routes::{router, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    logging::init_logging(&config.log_filter);

    let client = PiholeClient::from_config(&config.directory).unwrap_or_else(|e| {
        eprintln!("Directory client error: {e}");
        std::process::exit(1);
    });

    info!(
        listen_addr = %config.listen_addr,
        directory = %client.base_url(),
        timeout_secs = config.directory.request_timeout_secs,
        "starting devgroup-api"
    );

    let app = router(AppState {
        reconciler: Reconciler::from_client(client),
    });

    let listener = match tokio::net::TcpListener::bind(config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {e}", config.listen_addr);
            std::process::exit(1);
        }
    };

    info!(addr = %config.listen_addr, "Server listening");

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
