// API Module
//
// Router construction and the HTTP server loop. Handlers live in
// `handlers`, shared state and form types in `types`.

pub mod handlers;
pub mod helpers;
pub mod types;

pub use helpers::*;
pub use types::*;

use axum::{routing::get, Extension, Router};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::analysis::WalletAnalyzer;
use crate::config::Settings;
use crate::error::ObservatoryError;

/// Create the application router
pub fn app(state: Arc<AppState>, asset_dir: &str) -> Router {
    Router::new()
        .route("/", get(handlers::home).post(handlers::observe))
        .route("/metrics", get(handlers::metrics))
        .nest_service("/asset", ServeDir::new(asset_dir))
        .fallback(handlers::not_found)
        .layer(Extension(state))
}

/// Run the web front end until Ctrl+C / SIGTERM
pub async fn serve(settings: &Settings) -> Result<(), ObservatoryError> {
    let analyzer = WalletAnalyzer::new(settings)?;
    let state = Arc::new(AppState {
        analyzer: Arc::new(analyzer),
        base_url: settings.server.base_url.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&settings.server.bind_addr).await?;
    tracing::info!(
        bind_addr = %settings.server.bind_addr,
        asset_dir = %settings.server.asset_dir,
        "Web front end listening"
    );

    axum::serve(listener, app(state, &settings.server.asset_dir))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web front end stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
