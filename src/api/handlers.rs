// Web Handlers
//
// GET /          wallet form
// POST /         wallet report
// GET /metrics   Prometheus text exposition
// anything else  404 echoing the path

use axum::{
    extract::{Extension, Form},
    http::{StatusCode, Uri},
    response::Html,
};
use std::sync::Arc;

use super::helpers::{internal_error, normalize_wallet};
use super::types::{AppState, WalletForm};
use crate::metrics::gather_metrics;
use crate::render::{render_home_page, render_report_page};

pub async fn home(Extension(state): Extension<Arc<AppState>>) -> Html<String> {
    Html(render_home_page(&state.base_url))
}

pub async fn observe(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<WalletForm>,
) -> Html<String> {
    let wallet = normalize_wallet(&form.wallet);
    if wallet.is_empty() {
        return Html(render_home_page(&state.base_url));
    }

    tracing::info!(wallet = %wallet, "Report requested");
    let result = state.analyzer.analyze(&wallet).await;

    Html(render_report_page(
        &state.base_url,
        &wallet,
        &result,
        state.analyzer.registry().ibc_denoms(),
    ))
}

pub async fn metrics() -> Result<String, (StatusCode, String)> {
    gather_metrics().map_err(|e| {
        tracing::error!(error = %e, "Failed to encode metrics");
        internal_error(e.to_string())
    })
}

pub async fn not_found(uri: Uri) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, uri.path().to_string())
}
