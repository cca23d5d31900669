//! Router tests over a real listener.

use httpmock::prelude::*;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

use alliance_observatory::analysis::WalletAnalyzer;
use alliance_observatory::api::{app, AppState};
use alliance_observatory::chains::ChainConfig;
use alliance_observatory::config::Settings;
use alliance_observatory::metrics::init_metrics;

const ASSET_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/frontend/asset");

async fn spawn_app(lcd_base: &str) -> SocketAddr {
    let mut settings = Settings::default();
    settings.lcd.page_delay_ms = 0;
    settings.rewards.enabled = false;
    settings.chains = vec![ChainConfig::new("terra", lcd_base, &[])];

    let state = Arc::new(AppState {
        analyzer: Arc::new(WalletAnalyzer::new(&settings).unwrap()),
        base_url: "/".to_string(),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state, ASSET_DIR)).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_home_page() {
    let addr = spawn_app("http://127.0.0.1:9/").await;

    let response = reqwest::get(format!("http://{}/", addr)).await.unwrap();
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains(r#"name="wallet""#));
}

#[tokio::test]
async fn test_unknown_path_echoes_path() {
    let addr = spawn_app("http://127.0.0.1:9/").await;

    let response = reqwest::get(format!("http://{}/some/where", addr)).await.unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(response.text().await.unwrap(), "/some/where");
}

#[tokio::test]
async fn test_static_assets() {
    let addr = spawn_app("http://127.0.0.1:9/").await;

    let response = reqwest::get(format!("http://{}/asset/main.css", addr)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains(".chart-grid"));

    for asset in ["logo.svg", "favicon.svg"] {
        let response = reqwest::get(format!("http://{}/asset/{}", addr, asset)).await.unwrap();
        assert_eq!(response.status(), 200, "{}", asset);
    }
}

#[tokio::test]
async fn test_metrics_endpoint() {
    init_metrics().unwrap();
    let addr = spawn_app("http://127.0.0.1:9/").await;

    let response = reqwest::get(format!("http://{}/metrics", addr)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("observatory_unparseable_claim_amounts_total"));
}

#[tokio::test]
async fn test_post_wallet_renders_report() {
    let server = MockServer::start_async().await;

    let history = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/cosmos/tx/v1beta1/txs")
                .query_param("events", "message.sender='terra1primary'");
            then.status(200)
                .json_body(json!({"tx_responses": [], "pagination": {"total": "0"}}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cosmos/tx/v1beta1/txs");
            then.status(200)
                .json_body(json!({"tx_responses": [], "pagination": {"total": "0"}}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cosmos/bank/v1beta1/balances/terra1primary");
            then.status(200)
                .json_body(json!({"balances": [{"denom": "uluna", "amount": "1234567"}]}));
        })
        .await;

    let addr = spawn_app(&server.base_url()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/", addr))
        .form(&[("wallet", "  TERRA1PRIMARY ")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();

    history.assert_async().await;
    assert!(body.contains("Results for: terra1primary"));
    assert!(body.contains("1 chains analysed."));
    assert!(body.contains("Disqualification Status: False"));
    assert!(body.contains("luna : 1.234567"));
    assert!(body.contains("Unable to get data, does the wallet have enough transactions or delegations ?"));
}

#[tokio::test]
async fn test_post_without_wallet_shows_form() {
    let addr = spawn_app("http://127.0.0.1:9/").await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/", addr))
        .form(&[("wallet", "   ")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains(r#"name="wallet""#));
}
