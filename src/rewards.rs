/// Pending Staking Rewards
///
/// Queries the Game of Alliances staking API for the rewards an address has
/// accrued but not yet claimed, one request per staked IBC asset enabled on
/// the chain.

use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::chains::{ChainConfig, IbcDenoms};
use crate::error::LcdError;
use crate::lcd::{decode, get_json};
use crate::types::ValidatorRewards;

pub const DEFAULT_REWARDS_API: &str = "https://goa.terra.dev";

/// staked asset alias -> reward symbol -> minor units
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingRewards {
    pub by_asset: BTreeMap<String, BTreeMap<String, u128>>,
}

impl PendingRewards {
    /// Rewards summed over every staked asset, keyed by reward symbol.
    pub fn totals_by_symbol(&self) -> BTreeMap<String, u128> {
        let mut totals = BTreeMap::new();
        for rewards in self.by_asset.values() {
            for (symbol, amount) in rewards {
                *totals.entry(symbol.clone()).or_insert(0) += amount;
            }
        }
        totals
    }

    pub fn is_empty(&self) -> bool {
        self.by_asset.values().all(BTreeMap::is_empty)
    }
}

#[derive(Debug, Clone)]
pub struct RewardsClient {
    client: Client,
    api_url: String,
}

impl RewardsClient {
    pub fn new(client: Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Pending rewards for every staked asset enabled on `chain`.
    ///
    /// Assets are queried in order and the first failure stops the walk. The
    /// assets collected before it are still returned; a failure on the first
    /// asset is an error.
    pub async fn pending_rewards(
        &self,
        chain: &ChainConfig,
        account: &str,
        ibc: &IbcDenoms,
    ) -> Result<PendingRewards, LcdError> {
        let mut pending = PendingRewards::default();

        for alias in &chain.enabled_staking_ibcs {
            let Some(hash) = ibc.hash_for(alias) else {
                tracing::warn!(chain = %chain.name, asset = %alias, "Staked asset missing from IBC denom table");
                continue;
            };

            match self.asset_rewards(chain, account, hash).await {
                Ok(rewards) => {
                    pending.by_asset.insert(alias.clone(), rewards);
                }
                Err(e) if pending.by_asset.is_empty() => return Err(e),
                Err(e) => {
                    tracing::warn!(chain = %chain.name, asset = %alias, kind = e.kind(), error = %e, "Keeping partial pending rewards");
                    break;
                }
            }
        }

        tracing::debug!(
            chain = %chain.name,
            account = %account,
            assets = pending.by_asset.len(),
            "Fetched pending rewards"
        );

        Ok(pending)
    }

    async fn asset_rewards(
        &self,
        chain: &ChainConfig,
        account: &str,
        hash: &str,
    ) -> Result<BTreeMap<String, u128>, LcdError> {
        let url = format!(
            "{}/staking/validators/{}/{}",
            self.api_url,
            chain.rewards_chain_id(),
            hash
        );
        let body = get_json(&self.client, "rewards", &url, &[("address", account.to_string())]).await?;

        // Errors come back as an object carrying a `status` field
        if let Some(status) = body.get("status") {
            let message = match status {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(LcdError::Upstream { url, message });
        }

        let validators: Vec<ValidatorRewards> = decode(&url, body)?;
        let mut rewards = BTreeMap::new();
        for reward in validators.iter().flat_map(|v| v.rewards.iter()) {
            *rewards.entry(reward.symbol.clone()).or_insert(0) += reward.amount;
        }
        Ok(rewards)
    }
}
