use serde::{Deserialize, Deserializer, Serialize};
use chrono::{DateTime, Utc};

// Cosmos LCD encodes integers as strings; some proxies send plain numbers.
fn deserialize_u128_lenient<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = serde_json::Value::deserialize(deserializer)?;
    match &value {
        serde_json::Value::String(s) => s.trim().parse::<u128>().map_err(Error::custom),
        serde_json::Value::Number(n) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| Error::custom(format!("amount is not a non-negative integer: {}", n))),
        other => Err(Error::custom(format!("unexpected amount value: {}", other))),
    }
}

// ========== Transaction Search ==========

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PageResponse {
    #[serde(default)]
    pub next_key: Option<String>,
    #[serde(default)]
    pub total: Option<String>,
}

impl PageResponse {
    pub fn total(&self) -> u64 {
        self.total
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0)
    }
}

/// `GET cosmos/tx/v1beta1/txs` response.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TxSearchResponse {
    #[serde(default)]
    pub tx_responses: Option<Vec<TxResponse>>,
    #[serde(default)]
    pub pagination: Option<PageResponse>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TxResponse {
    pub txhash: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub code: u32,
    pub timestamp: String,
    #[serde(default)]
    pub logs: Vec<TxLog>,
    /// Flattened events; newer SDKs leave `logs` empty and only fill these
    #[serde(default)]
    pub events: Vec<Event>,
}

impl TxResponse {
    pub fn parsed_timestamp(&self) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(&self.timestamp).map(|ts| ts.with_timezone(&Utc))
    }

    /// Every event of the transaction, taken from `logs` when present.
    pub fn all_events(&self) -> Box<dyn Iterator<Item = &Event> + '_> {
        if self.logs.iter().any(|log| !log.events.is_empty()) {
            Box::new(self.logs.iter().flat_map(|log| log.events.iter()))
        } else {
            Box::new(self.events.iter())
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TxLog {
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub attributes: Vec<EventAttribute>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EventAttribute {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// Event kinds the aggregator and the address discovery care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    SendPacket,
    RecvPacket,
    AllianceDelegate,
    AllianceUndelegate,
    AllianceRedelegate,
    AllianceClaimRewards,
    Other,
}

impl EventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "send_packet" => EventKind::SendPacket,
            "recv_packet" => EventKind::RecvPacket,
            "alliance_delegate" => EventKind::AllianceDelegate,
            "alliance_undelegate" => EventKind::AllianceUndelegate,
            "alliance_redelegate" => EventKind::AllianceRedelegate,
            "alliance_claim_delegation_rewards" => EventKind::AllianceClaimRewards,
            _ => EventKind::Other,
        }
    }
}

impl Event {
    pub fn kind(&self) -> EventKind {
        EventKind::from_type(&self.event_type)
    }

    /// Values of every attribute named `key`, in order.
    pub fn attribute_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.attributes
            .iter()
            .filter(move |attr| attr.key == key)
            .map(|attr| attr.value.as_deref().unwrap_or(""))
    }
}

/// ICS-20 `packet_data` attribute of `send_packet` / `recv_packet`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PacketData {
    pub sender: String,
    pub receiver: String,
    #[serde(default)]
    pub denom: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
}

// ========== Bank ==========

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Coin {
    pub denom: String,
    #[serde(deserialize_with = "deserialize_u128_lenient")]
    pub amount: u128,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BalancesResponse {
    pub balances: Vec<Coin>,
    #[serde(default)]
    pub pagination: Option<PageResponse>,
}

// ========== Staking Rewards API ==========

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RewardCoin {
    pub symbol: String,
    #[serde(deserialize_with = "deserialize_u128_lenient")]
    pub amount: u128,
}

/// One validator entry of `staking/validators/{chain_id}/{ibc_hash}`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ValidatorRewards {
    #[serde(default)]
    pub rewards: Vec<RewardCoin>,
}
