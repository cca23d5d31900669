/// LCD REST Client
///
/// Walks the transaction search endpoint of one chain for one account and
/// reads bank balances. Pages are fetched strictly one after another with a
/// fixed pause between them to stay under the public nodes' rate limits.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;

use crate::error::LcdError;
use crate::metrics::{self, Timer};
use crate::types::{BalancesResponse, Coin, TxResponse, TxSearchResponse};

pub const TX_SEARCH_PATH: &str = "cosmos/tx/v1beta1/txs";
pub const BALANCES_PATH: &str = "cosmos/bank/v1beta1/balances";

pub const DEFAULT_PAGE_LIMIT: u32 = 100;
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(500);

/// Event filters that together cover every transaction touching an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxQuery {
    MessageSender,
    MessageReceiver,
    WasmSender,
    TransferRecipient,
    WasmReceiver,
}

impl TxQuery {
    pub const ALL: [TxQuery; 5] = [
        TxQuery::MessageSender,
        TxQuery::MessageReceiver,
        TxQuery::WasmSender,
        TxQuery::TransferRecipient,
        TxQuery::WasmReceiver,
    ];

    pub fn event_key(&self) -> &'static str {
        match self {
            TxQuery::MessageSender => "message.sender",
            TxQuery::MessageReceiver => "message.receiver",
            TxQuery::WasmSender => "wasm.sender",
            TxQuery::TransferRecipient => "transfer.recipient",
            TxQuery::WasmReceiver => "wasm.receiver",
        }
    }

    /// Value of the `events` query parameter, e.g. `message.sender='terra1...'`.
    pub fn filter(&self, account: &str) -> String {
        format!("{}='{}'", self.event_key(), account)
    }
}

#[derive(Debug, Clone)]
pub struct LcdClient {
    client: Client,
    chain: String,
    base_url: String,
    page_limit: u32,
    page_delay: Duration,
}

impl LcdClient {
    pub fn new(client: Client, chain: &str, base_url: &str) -> Self {
        Self {
            client,
            chain: chain.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }

    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Every transaction touching `account`, deduplicated by hash.
    ///
    /// Order is first-seen order across the five event queries. Any upstream
    /// failure aborts the whole walk: a partial history would produce wrong
    /// totals.
    pub async fn fetch_transactions(&self, account: &str) -> Result<Vec<TxResponse>, LcdError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut transactions = Vec::new();

        for query in TxQuery::ALL {
            let mut offset: u64 = 0;
            let mut fetched: u64 = 0;
            let mut total: Option<u64> = None;

            loop {
                let page = self.search_page(query, account, offset).await?;

                // A null pagination block means the node will not page: one page only
                let expected = *total.get_or_insert_with(|| {
                    page.pagination.as_ref().map(|p| p.total()).unwrap_or(0)
                });

                let txs = page.tx_responses.unwrap_or_default();
                let page_len = txs.len() as u64;
                fetched += page_len;
                offset += page_len;

                for tx in txs {
                    if seen.insert(tx.txhash.clone()) {
                        transactions.push(tx);
                    }
                }

                tokio::time::sleep(self.page_delay).await;

                if page_len == 0 || fetched >= expected {
                    break;
                }
            }

            tracing::debug!(
                chain = %self.chain,
                account = %account,
                query = query.event_key(),
                fetched = fetched,
                "Finished transaction query"
            );
        }

        metrics::increment_transactions_fetched(&self.chain, transactions.len() as u64);
        tracing::info!(
            chain = %self.chain,
            account = %account,
            count = transactions.len(),
            "Fetched transactions"
        );

        Ok(transactions)
    }

    /// One page of `GET cosmos/tx/v1beta1/txs`.
    pub async fn search_page(
        &self,
        query: TxQuery,
        account: &str,
        offset: u64,
    ) -> Result<TxSearchResponse, LcdError> {
        let url = format!("{}/{}", self.base_url, TX_SEARCH_PATH);
        let params = [
            ("events", query.filter(account)),
            ("pagination.offset", offset.to_string()),
            ("pagination.limit", self.page_limit.to_string()),
            ("pagination.count_total", "true".to_string()),
        ];

        let body = get_json(&self.client, "txs", &url, &params).await?;
        if body.get("pagination").is_none() {
            return Err(LcdError::MissingField { url, field: "pagination" });
        }

        decode(&url, body)
    }

    /// `GET cosmos/bank/v1beta1/balances/{account}`.
    pub async fn fetch_balances(&self, account: &str) -> Result<Vec<Coin>, LcdError> {
        let url = format!("{}/{}/{}", self.base_url, BALANCES_PATH, account);
        let body = get_json(&self.client, "balances", &url, &[]).await?;
        if body.get("balances").is_none() {
            return Err(LcdError::MissingField { url, field: "balances" });
        }

        let response: BalancesResponse = decode(&url, body)?;
        tracing::debug!(
            chain = %self.chain,
            account = %account,
            denoms = response.balances.len(),
            "Fetched balances"
        );
        Ok(response.balances)
    }
}

/// GET `url` and parse the body as JSON, recording the outcome.
pub(crate) async fn get_json(
    client: &Client,
    endpoint: &str,
    url: &str,
    params: &[(&str, String)],
) -> Result<Value, LcdError> {
    let timer = Timer::new();
    let result = get_json_inner(client, url, params).await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    metrics::record_upstream_request(endpoint, outcome, timer.elapsed_secs());

    result
}

async fn get_json_inner(
    client: &Client,
    url: &str,
    params: &[(&str, String)],
) -> Result<Value, LcdError> {
    tracing::debug!(url = %url, "GET");

    let response = client
        .get(url)
        .query(params)
        .send()
        .await
        .map_err(|source| LcdError::Http { url: url.to_string(), source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(LcdError::Status { url: url.to_string(), status });
    }

    let text = response
        .text()
        .await
        .map_err(|source| LcdError::Http { url: url.to_string(), source })?;

    serde_json::from_str(&text).map_err(|source| LcdError::Decode { url: url.to_string(), source })
}

pub(crate) fn decode<T: DeserializeOwned>(url: &str, body: Value) -> Result<T, LcdError> {
    serde_json::from_value(body).map_err(|source| LcdError::Decode { url: url.to_string(), source })
}
