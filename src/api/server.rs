/// Axum HTTP server setup and routing
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::chain::{ChainConnector, SubstrateConnector};
use crate::config::AppConfig;
use crate::session::TransferSession;
use crate::wallet::{KeystoreWallet, WalletBridge};

pub fn create_router(session: TransferSession) -> anyhow::Result<Router> {
    let cors = cors_layer()?;

    Ok(Router::new()
        // Page and form posts
        .route("/", get(handlers::page_handler))
        .route("/account", post(handlers::select_account_handler))
        .route("/transfer", post(handlers::transfer_handler))
        .route("/cancel", post(handlers::cancel_handler))
        // JSON
        .route("/api/state", get(handlers::state_handler))
        .route("/health", get(handlers::health_check))
        .with_state(session)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// CORS from `ALLOWED_ORIGINS` (comma separated), any origin when unset
fn cors_layer() -> anyhow::Result<CorsLayer> {
    match std::env::var("ALLOWED_ORIGINS") {
        Ok(origins) if !origins.trim().is_empty() => {
            log::info!("CORS configured for origins: {}", origins);
            let origin_list = origins
                .split(',')
                .map(|s| {
                    s.trim()
                        .parse()
                        .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", s.trim(), e))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            Ok(CorsLayer::new()
                .allow_origin(origin_list)
                .allow_methods(Any)
                .allow_headers(Any))
        }
        _ => {
            log::warn!("CORS: Allowing all origins (development mode). Set ALLOWED_ORIGINS env var for production.");
            Ok(CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any))
        }
    }
}

/// Serve the page with the keystore wallet and a live chain connection
pub async fn start_server(config: AppConfig) -> anyhow::Result<()> {
    let wallet: Arc<dyn WalletBridge> = Arc::new(KeystoreWallet::new(config.keystore_path.clone()));
    let connector: Arc<dyn ChainConnector> = Arc::new(SubstrateConnector::new());
    run_server(config, wallet, connector).await
}

/// Serve the page until Ctrl+C or SIGTERM. Startup runs in the background so
/// the loading state is visible right away.
pub async fn run_server(
    config: AppConfig,
    wallet: Arc<dyn WalletBridge>,
    connector: Arc<dyn ChainConnector>,
) -> anyhow::Result<()> {
    let addr = config.bind_address.clone();
    let session = TransferSession::new(config);

    let startup = session.clone();
    tokio::spawn(async move { startup.initialize(wallet, connector).await });

    let app = create_router(session)?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("🚀 Transfer page listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            log::info!("Received SIGTERM signal");
        },
    }

    log::info!("Shutdown signal received, exiting gracefully...");
}
