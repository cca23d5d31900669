/// Reward / Delegation Aggregator
///
/// Walks the event logs of one address's transactions, counts alliance
/// staking operations and buckets every claimed reward by transaction time.
///
/// Claim amounts arrive as a Cosmos coin list string:
/// - `"100ibc/D7AA...B4,3785uatr"` (IBC voucher, possibly followed by more coins)
/// - `"652200uhar"` (native micro-unit denom)
///
/// Amounts are scaled from minor units by 1e-6 and denominations normalized
/// through the IBC alias table before being bucketed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::chains::IbcDenoms;
use crate::denom::{scale_micro, Denom};
use crate::metrics;
use crate::telemetry::truncate_hash;
use crate::types::{EventKind, TxResponse};

/// denomination -> amount (whole tokens)
pub type DenomAmounts = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimAmount {
    pub minor_units: u128,
    pub denom: Denom,
}

impl ClaimAmount {
    /// Amount in whole tokens.
    pub fn amount(&self) -> f64 {
        scale_micro(self.minor_units)
    }
}

/// Parse a single `<digits><denom>` coin.
fn parse_coin(raw: &str) -> Option<ClaimAmount> {
    let raw = raw.trim();
    let split = raw.find(|c: char| !c.is_ascii_digit())?;
    let (digits, denom) = raw.split_at(split);
    if digits.is_empty() {
        return None;
    }

    Some(ClaimAmount {
        minor_units: digits.parse().ok()?,
        denom: Denom::parse(denom)?,
    })
}

/// First coin of a claim amount string.
pub fn parse_claim_amount(raw: &str) -> Option<ClaimAmount> {
    raw.split(',').next().and_then(parse_coin)
}

/// Every well-formed coin of a claim amount string; fragments without a
/// denomination (`"3785"`) or without digits are dropped.
pub fn parse_claim_amounts(raw: &str) -> Vec<ClaimAmount> {
    raw.split(',').filter_map(parse_coin).collect()
}

/// timestamp -> newly claimed amounts at that timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClaimBuckets(BTreeMap<DateTime<Utc>, DenomAmounts>);

impl ClaimBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, timestamp: DateTime<Utc>, denom: &str, amount: f64) {
        *self
            .0
            .entry(timestamp)
            .or_default()
            .entry(denom.to_string())
            .or_insert(0.0) += amount;
    }

    /// Add every delta of `other` into this timeline.
    pub fn merge(&mut self, other: &ClaimBuckets) {
        for (timestamp, amounts) in other.iter() {
            for (denom, amount) in amounts {
                self.add(*timestamp, denom, *amount);
            }
        }
    }

    /// Buckets in ascending timestamp order.
    pub fn iter(&self) -> impl Iterator<Item = (&DateTime<Utc>, &DenomAmounts)> {
        self.0.iter()
    }

    pub fn get(&self, timestamp: &DateTime<Utc>) -> Option<&DenomAmounts> {
        self.0.get(timestamp)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DelegationStats {
    pub delegated: u64,
    pub undelegated: u64,
    pub redelegated: u64,
    pub claims: u64,
}

/// Count alliance operations in `transactions` and bucket claimed rewards
/// into `buckets`.
pub fn aggregate_rewards(
    transactions: &[TxResponse],
    ibc: &IbcDenoms,
    buckets: &mut ClaimBuckets,
) -> DelegationStats {
    let mut stats = DelegationStats::default();

    for tx in transactions {
        let timestamp = match tx.parsed_timestamp() {
            Ok(ts) => ts,
            Err(e) => {
                tracing::warn!(txhash = %tx.txhash, timestamp = %tx.timestamp, error = %e, "Skipping transaction with unparseable timestamp");
                continue;
            }
        };

        for event in tx.all_events() {
            match event.kind() {
                EventKind::AllianceDelegate => stats.delegated += 1,
                EventKind::AllianceUndelegate => stats.undelegated += 1,
                EventKind::AllianceRedelegate => stats.redelegated += 1,
                EventKind::AllianceClaimRewards => {
                    stats.claims += 1;
                    for raw in event.attribute_values("amount") {
                        if raw.trim().is_empty() {
                            tracing::debug!(txhash = %truncate_hash(&tx.txhash, 16), "Skipping empty claim amount");
                            continue;
                        }

                        let coins = parse_claim_amounts(raw);
                        if coins.is_empty() {
                            metrics::increment_unparseable_claims();
                            tracing::warn!(txhash = %truncate_hash(&tx.txhash, 16), amount = %raw, "Skipping unparseable claim amount");
                            continue;
                        }

                        for coin in coins {
                            tracing::trace!(txhash = %truncate_hash(&tx.txhash, 16), minor_units = %coin.minor_units, denom = ?coin.denom, "Claimed reward");
                            buckets.add(timestamp, &coin.denom.canonical(ibc), coin.amount());
                        }
                    }
                }
                _ => {}
            }
        }
    }

    stats
}
