/// Cumulative Reward Series
///
/// Folds claim buckets into a running total per denomination:
/// `sum[t] = sum[t-1] + claims[t]`, ascending by timestamp. Amounts never
/// decrease because claims are non-negative.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregator::{ClaimBuckets, DenomAmounts};

/// Denominations whose total stays at or below this are not charted
pub const DUST_THRESHOLD: f64 = 0.0009;

/// Charted first when present
pub const PRIMARY_DENOM: &str = "luna";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardPoint {
    pub timestamp: DateTime<Utc>,
    pub amounts: DenomAmounts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CumulativeSeries {
    points: Vec<RewardPoint>,
}

impl CumulativeSeries {
    pub fn from_buckets(buckets: &ClaimBuckets) -> Self {
        let mut points: Vec<RewardPoint> = Vec::with_capacity(buckets.len());
        let mut running = DenomAmounts::new();

        for (timestamp, deltas) in buckets.iter() {
            for (denom, amount) in deltas {
                *running.entry(denom.clone()).or_insert(0.0) += amount;
            }
            points.push(RewardPoint {
                timestamp: *timestamp,
                amounts: running.clone(),
            });
        }

        Self { points }
    }

    /// One timeline across several chains; deltas landing on the same
    /// timestamp on different chains add up.
    pub fn merge_chains<'a, I>(chains: I) -> Self
    where
        I: IntoIterator<Item = &'a ClaimBuckets>,
    {
        let mut combined = ClaimBuckets::new();
        for buckets in chains {
            combined.merge(buckets);
        }
        Self::from_buckets(&combined)
    }

    pub fn points(&self) -> &[RewardPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&RewardPoint> {
        self.points.last()
    }

    /// `(timestamp, cumulative amount)` for every point of the timeline;
    /// zero before the denomination first appears.
    pub fn denom_series(&self, denom: &str) -> Vec<(DateTime<Utc>, f64)> {
        self.points
            .iter()
            .map(|p| (p.timestamp, p.amounts.get(denom).copied().unwrap_or(0.0)))
            .collect()
    }

    /// Denominations worth charting: final total above the dust threshold,
    /// sorted, with `luna` moved to the front.
    pub fn display_denoms(&self) -> Vec<String> {
        let Some(last) = self.last() else {
            return Vec::new();
        };

        let mut denoms: Vec<String> = last
            .amounts
            .iter()
            .filter(|(_, amount)| **amount > DUST_THRESHOLD)
            .map(|(denom, _)| denom.clone())
            .collect();
        denoms.sort();

        if let Some(pos) = denoms.iter().position(|d| d == PRIMARY_DENOM) {
            let primary = denoms.remove(pos);
            denoms.insert(0, primary);
        }

        denoms
    }
}
