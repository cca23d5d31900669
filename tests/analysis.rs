//! End-to-end wallet analysis against mocked LCD nodes and rewards API.
//!
//! Every chain's LCD lives on the same mock server under `/<chain>/`.

use httpmock::prelude::*;
use serde_json::{json, Value};

use alliance_observatory::analysis::WalletAnalyzer;
use alliance_observatory::chains::ChainConfig;
use alliance_observatory::config::Settings;
use alliance_observatory::discovery::REASON_FOREIGN_HOME_TRANSFER;
use alliance_observatory::error::LcdError;
use alliance_observatory::lcd::TxQuery;
use alliance_observatory::render::{render_report_page, NO_DATA_MESSAGE};

const PRIMARY: &str = "terra1primary";
const HARKONNEN: &str = "harkonnen1sub";
const ORDOS: &str = "ordos1sub";

fn settings_for(server: &MockServer, rewards: bool) -> Settings {
    let base = server.base_url();
    let mut settings = Settings::default();
    settings.lcd.page_delay_ms = 0;
    settings.rewards.enabled = rewards;
    settings.rewards.api_url = format!("{}/rewards", base);
    settings.chains = vec![
        ChainConfig::new("terra", &format!("{}/terra/", base), &[]),
        ChainConfig::new("harkonnen", &format!("{}/harkonnen/", base), &["sCOR", "sORD", "sATR"]),
        ChainConfig::new("ordos", &format!("{}/ordos/", base), &["sCOR"]),
    ];
    settings
}

fn packet(kind: &str, sender: &str, receiver: &str) -> Value {
    let data = json!({"sender": sender, "receiver": receiver, "denom": "uluna", "amount": "1000"});
    json!({"type": kind, "attributes": [{"key": "packet_data", "value": data.to_string()}]})
}

fn tx(hash: &str, timestamp: &str, events: Vec<Value>) -> Value {
    json!({"txhash": hash, "height": "10", "timestamp": timestamp, "logs": [{"events": events}]})
}

/// `txs` for the message.sender query of `account`, empty pages for the rest.
async fn mock_history(server: &MockServer, chain: &str, account: &str, txs: Vec<Value>) {
    let path = format!("/{}/cosmos/tx/v1beta1/txs", chain);
    let total = txs.len().to_string();

    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(path.as_str())
                .query_param("events", TxQuery::MessageSender.filter(account));
            then.status(200)
                .json_body(json!({"tx_responses": txs, "pagination": {"total": total}}));
        })
        .await;

    for query in TxQuery::ALL.iter().filter(|q| **q != TxQuery::MessageSender) {
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(path.as_str())
                    .query_param("events", query.filter(account));
                then.status(200)
                    .json_body(json!({"tx_responses": [], "pagination": {"total": "0"}}));
            })
            .await;
    }
}

async fn mock_balances(server: &MockServer, chain: &str, account: &str, balances: Value) {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("/{}/cosmos/bank/v1beta1/balances/{}", chain, account));
            then.status(200).json_body(json!({"balances": balances}));
        })
        .await;
}

#[tokio::test]
async fn test_multi_chain_report() {
    let server = MockServer::start_async().await;

    mock_history(&server, "terra", PRIMARY, vec![
        tx("H1", "2023-03-01T10:00:00Z", vec![packet("send_packet", PRIMARY, HARKONNEN)]),
        tx("H2", "2023-03-01T11:00:00Z", vec![packet("send_packet", PRIMARY, ORDOS)]),
        tx("H3", "2023-03-01T12:00:00Z", vec![packet("recv_packet", "corrino1stranger", PRIMARY)]),
    ])
    .await;
    mock_balances(&server, "terra", PRIMARY, json!([{"denom": "uluna", "amount": "2000000"}])).await;

    mock_history(&server, "harkonnen", HARKONNEN, vec![
        tx("K1", "2023-03-02T09:00:00Z", vec![
            packet("recv_packet", PRIMARY, HARKONNEN),
            json!({"type": "alliance_delegate", "attributes": []}),
            json!({"type": "alliance_delegate", "attributes": []}),
        ]),
        tx("K2", "2023-03-03T09:00:00Z", vec![json!({
            "type": "alliance_claim_delegation_rewards",
            "attributes": [{"key": "amount", "value": "1000000uhar"}]
        })]),
    ])
    .await;
    mock_balances(&server, "harkonnen", HARKONNEN, json!([{"denom": "uhar", "amount": "3000000"}])).await;

    // ordos is down: the chain is skipped
    let ordos = server
        .mock_async(|when, then| {
            when.method(GET).path("/ordos/cosmos/tx/v1beta1/txs");
            then.status(502);
        })
        .await;

    let rewards = server
        .mock_async(|when, then| {
            when.method(GET)
                .path_contains("/rewards/staking/validators/harkonnen-1/")
                .query_param("address", HARKONNEN);
            then.status(200)
                .json_body(json!([{"rewards": [{"symbol": "uhar", "amount": "500000"}]}]));
        })
        .await;

    let settings = settings_for(&server, true);
    let analyzer = WalletAnalyzer::new(&settings).unwrap();
    let report = analyzer.analyze(PRIMARY).await.unwrap();

    ordos.assert_async().await;
    rewards.assert_hits_async(3).await;

    assert_eq!(report.secondary_addresses, vec![HARKONNEN, ORDOS]);
    assert_eq!(report.disqualification.reasons(), &[REASON_FOREIGN_HOME_TRANSFER.to_string()]);

    assert_eq!(report.found_chains.len(), 1);
    assert_eq!(report.found_chains[0].chain, "harkonnen");
    assert_eq!(report.found_chains[0].address, HARKONNEN);
    assert_eq!(report.chains_analysed(), 2);

    assert_eq!(report.stats.total_ibc_sent, 2);
    assert_eq!(report.stats.total_ibc_received, 2);
    assert_eq!(report.stats.total_delegations, 2);
    assert_eq!(report.stats.total_claims, 1);

    // One claimed bucket plus pending rewards stamped at analysis time
    let points = report.total.points();
    assert_eq!(points.len(), 2);
    assert!((points[0].amounts["har"] - 1.0).abs() < 1e-9);
    assert!((points[1].amounts["har"] - 2.5).abs() < 1e-9);

    let summed = report.summed_balances(analyzer.registry().ibc_denoms());
    assert_eq!(summed["luna"], 2_000_000);
    assert_eq!(summed["har"], 3_000_000);

    let html = render_report_page("/", PRIMARY, &Ok(report), analyzer.registry().ibc_denoms());
    assert!(html.contains("2 chains analysed."));
    assert!(html.contains("Disqualification Status: True"));
    assert!(html.contains("har (summed)"));
}

#[tokio::test]
async fn test_primary_history_failure_is_no_data() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/terra/cosmos/tx/v1beta1/txs");
            then.status(200).body("not json");
        })
        .await;

    let settings = settings_for(&server, false);
    let analyzer = WalletAnalyzer::new(&settings).unwrap();
    let result = analyzer.analyze(PRIMARY).await;

    assert!(matches!(result, Err(LcdError::Decode { .. })));

    let html = render_report_page("/", PRIMARY, &result, analyzer.registry().ibc_denoms());
    assert!(html.contains(NO_DATA_MESSAGE));
    assert!(!html.contains("chains analysed"));
}

#[tokio::test]
async fn test_wallet_without_transfers_has_no_secondary_chains() {
    let server = MockServer::start_async().await;

    mock_history(&server, "terra", PRIMARY, vec![]).await;
    // Balance lookup fails; the report still renders
    server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/terra/cosmos/bank/v1beta1/balances/");
            then.status(500);
        })
        .await;

    let settings = settings_for(&server, false);
    let analyzer = WalletAnalyzer::new(&settings).unwrap();
    let report = analyzer.analyze(PRIMARY).await.unwrap();

    assert!(report.secondary_addresses.is_empty());
    assert!(!report.disqualification.is_disqualified());
    assert!(report.balances.is_empty());
    assert!(report.total.is_empty());
    assert_eq!(report.chains_analysed(), 1);
}

#[tokio::test]
async fn test_relayed_packets_for_other_wallets_do_not_disqualify() {
    let server = MockServer::start_async().await;

    // One relayer tx carrying packets for the primary and for a stranger
    mock_history(&server, "terra", PRIMARY, vec![
        tx("H1", "2023-03-01T10:00:00Z", vec![packet("send_packet", PRIMARY, HARKONNEN)]),
        tx("R1", "2023-03-01T12:00:00Z", vec![
            packet("recv_packet", HARKONNEN, PRIMARY),
            packet("recv_packet", "corrino1stranger", "terra1someoneelse"),
        ]),
    ])
    .await;
    mock_balances(&server, "terra", PRIMARY, json!([])).await;

    mock_history(&server, "harkonnen", HARKONNEN, vec![
        tx("K1", "2023-03-02T09:00:00Z", vec![
            packet("recv_packet", PRIMARY, HARKONNEN),
            packet("recv_packet", "corrino1stranger", "harkonnen1someoneelse"),
        ]),
    ])
    .await;
    mock_balances(&server, "harkonnen", HARKONNEN, json!([])).await;

    let settings = settings_for(&server, false);
    let analyzer = WalletAnalyzer::new(&settings).unwrap();
    let report = analyzer.analyze(PRIMARY).await.unwrap();

    assert_eq!(report.secondary_addresses, vec![HARKONNEN]);
    assert!(!report.disqualification.is_disqualified());
    assert_eq!(report.stats.total_ibc_received, 2);
}
