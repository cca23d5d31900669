/// Wallet Analysis
///
/// Builds one wallet report from scratch:
/// 1. Fetch the primary address's home-chain history and balances
/// 2. Discover its secondary addresses from outbound IBC transfers
/// 3. For each secondary address: history, balances, pending rewards,
///    delegation counters and claim buckets of its chain
/// 4. Merge every chain's claims into one cumulative series
///
/// All upstream calls are issued one after another. Only the home-chain
/// history is required; anything else that fails is logged and left out.

use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::aggregator::{aggregate_rewards, ClaimBuckets, DelegationStats};
use crate::chains::{ChainConfig, ChainRegistry, IbcDenoms};
use crate::config::Settings;
use crate::denom::{scale_micro, Denom};
use crate::discovery::{
    check_secondary_inbound, discover_secondary_addresses, extract_ibc_transfers, Disqualification,
    IbcTransfers,
};
use crate::error::{LcdError, ObservatoryError};
use crate::lcd::LcdClient;
use crate::metrics::{self, Timer};
use crate::rewards::RewardsClient;
use crate::series::CumulativeSeries;
use crate::types::Coin;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivityStats {
    pub total_ibc_sent: u64,
    pub total_ibc_received: u64,
    pub total_delegations: u64,
    pub total_undelegations: u64,
    pub total_redelegations: u64,
    pub total_claims: u64,
}

impl ActivityStats {
    /// Count the transfers and delegation activity of `address` on `chain`.
    pub fn record(
        &mut self,
        chain: &str,
        address: &str,
        transfers: &IbcTransfers,
        delegations: Option<&DelegationStats>,
    ) {
        let received = transfers.received_by(address).count();
        self.total_ibc_sent += transfers.sent.len() as u64;
        self.total_ibc_received += received as u64;

        tracing::info!(
            chain = %chain,
            address = %address,
            ibc_sent = transfers.sent.len(),
            ibc_received = received,
            "IBC transfers"
        );

        if let Some(d) = delegations {
            self.total_delegations += d.delegated;
            self.total_undelegations += d.undelegated;
            self.total_redelegations += d.redelegated;
            self.total_claims += d.claims;

            tracing::info!(
                chain = %chain,
                delegated = d.delegated,
                undelegated = d.undelegated,
                redelegated = d.redelegated,
                claimed = d.claims,
                "Staking stats"
            );
        }
    }
}

/// One secondary chain the wallet was found on.
#[derive(Debug, Clone, Serialize)]
pub struct ChainReport {
    pub chain: String,
    /// First address discovered on this chain
    pub address: String,
    pub delegations: DelegationStats,
    pub claims: ClaimBuckets,
    pub series: CumulativeSeries,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletReport {
    pub wallet: String,
    pub secondary_addresses: Vec<String>,
    pub disqualification: Disqualification,
    pub stats: ActivityStats,
    /// address -> raw denom -> minor units
    pub balances: BTreeMap<String, BTreeMap<String, u128>>,
    pub found_chains: Vec<ChainReport>,
    pub total: CumulativeSeries,
}

impl WalletReport {
    /// Secondary chains plus the home chain.
    pub fn chains_analysed(&self) -> usize {
        self.found_chains.len() + 1
    }

    /// Balances of every address summed by display denomination.
    pub fn summed_balances(&self, ibc: &IbcDenoms) -> BTreeMap<String, u128> {
        let mut summed = BTreeMap::new();
        for denoms in self.balances.values() {
            for (raw, amount) in denoms {
                let name = Denom::parse(raw)
                    .map(|d| d.canonical(ibc))
                    .unwrap_or_else(|| raw.clone());
                *summed.entry(name).or_insert(0) += amount;
            }
        }
        summed
    }
}

struct ChainProgress {
    chain: String,
    address: String,
    delegations: DelegationStats,
    claims: ClaimBuckets,
}

pub struct WalletAnalyzer {
    registry: ChainRegistry,
    lcd_clients: HashMap<String, LcdClient>,
    rewards: Option<RewardsClient>,
}

impl WalletAnalyzer {
    pub fn new(settings: &Settings) -> Result<Self, ObservatoryError> {
        let client = Client::builder()
            .timeout(settings.lcd.timeout())
            .user_agent(settings.lcd.user_agent.as_str())
            .build()
            .map_err(ObservatoryError::Client)?;

        Self::with_client(settings, client)
    }

    /// Analyzer sharing an existing connection pool.
    pub fn with_client(settings: &Settings, client: Client) -> Result<Self, ObservatoryError> {
        let registry = settings.registry()?;

        let lcd_clients = registry
            .chains()
            .iter()
            .map(|chain| {
                let lcd = LcdClient::new(client.clone(), &chain.name, &chain.lcd)
                    .with_page_limit(settings.lcd.page_limit)
                    .with_page_delay(settings.lcd.page_delay());
                (chain.name.clone(), lcd)
            })
            .collect();

        let rewards = settings
            .rewards
            .enabled
            .then(|| RewardsClient::new(client.clone(), &settings.rewards.api_url));

        Ok(Self { registry, lcd_clients, rewards })
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    fn lcd(&self, chain: &ChainConfig) -> Result<&LcdClient, LcdError> {
        self.lcd_clients.get(&chain.name).ok_or_else(|| LcdError::Upstream {
            url: chain.lcd.clone(),
            message: format!("no LCD client for chain {}", chain.name),
        })
    }

    pub async fn analyze(&self, wallet: &str) -> Result<WalletReport, LcdError> {
        let timer = Timer::new();
        let home = self.registry.home();
        let ibc = self.registry.ibc_denoms();

        tracing::info!(wallet = %wallet, chain = %home.name, "Analysing wallet");

        let transactions = match self.lcd(home)?.fetch_transactions(wallet).await {
            Ok(txs) => txs,
            Err(e) => {
                tracing::error!(wallet = %wallet, chain = %home.name, kind = e.kind(), error = %e, "Unable to fetch primary transactions");
                metrics::record_report("no_data", false, timer.elapsed_secs());
                return Err(e);
            }
        };

        let transfers = extract_ibc_transfers(&transactions);
        let mut discovery = discover_secondary_addresses(home, wallet, &transfers);
        let mut stats = ActivityStats::default();
        stats.record(&home.name, wallet, &transfers, None);

        let mut balances = BTreeMap::new();
        self.collect_balances(home, wallet, &mut balances).await;

        let mut chains: Vec<ChainProgress> = Vec::new();
        let secondary_addresses = discovery.secondary_addresses.clone();

        for address in &secondary_addresses {
            let Some(chain) = self.registry.secondary_chain_for(address) else {
                tracing::debug!(wallet = %wallet, address = %address, "Address belongs to no configured chain");
                continue;
            };

            tracing::info!(wallet = %wallet, chain = %chain.name, address = %address, "Checking chain");

            let sub_transactions = match self.lcd(chain)?.fetch_transactions(address).await {
                Ok(txs) => txs,
                Err(e) => {
                    tracing::warn!(chain = %chain.name, address = %address, kind = e.kind(), error = %e, "Skipping chain");
                    continue;
                }
            };

            let sub_transfers = extract_ibc_transfers(&sub_transactions);
            check_secondary_inbound(chain, wallet, address, &mut discovery, &sub_transfers);

            let progress = match chains.iter().position(|c| c.chain == chain.name) {
                Some(idx) => &mut chains[idx],
                None => {
                    chains.push(ChainProgress {
                        chain: chain.name.clone(),
                        address: address.clone(),
                        delegations: DelegationStats::default(),
                        claims: ClaimBuckets::new(),
                    });
                    let last = chains.len() - 1;
                    &mut chains[last]
                }
            };

            if let Some(rewards) = &self.rewards {
                match rewards.pending_rewards(chain, address, ibc).await {
                    Ok(pending) => {
                        let now = Utc::now();
                        for (symbol, amount) in pending.totals_by_symbol() {
                            let denom = Denom::parse(&symbol)
                                .map(|d| d.canonical(ibc))
                                .unwrap_or(symbol);
                            progress.claims.add(now, &denom, scale_micro(amount));
                        }
                    }
                    Err(e) => {
                        tracing::warn!(chain = %chain.name, address = %address, kind = e.kind(), error = %e, "Pending rewards unavailable");
                    }
                }
            }

            self.collect_balances(chain, address, &mut balances).await;

            let delegations = aggregate_rewards(&sub_transactions, ibc, &mut progress.claims);
            progress.delegations.delegated += delegations.delegated;
            progress.delegations.undelegated += delegations.undelegated;
            progress.delegations.redelegated += delegations.redelegated;
            progress.delegations.claims += delegations.claims;
            stats.record(&chain.name, address, &sub_transfers, Some(&delegations));
        }

        let found_chains: Vec<ChainReport> = chains
            .into_iter()
            .map(|c| ChainReport {
                series: CumulativeSeries::from_buckets(&c.claims),
                chain: c.chain,
                address: c.address,
                delegations: c.delegations,
                claims: c.claims,
            })
            .collect();

        let total = CumulativeSeries::merge_chains(found_chains.iter().map(|c| &c.claims));

        let report = WalletReport {
            wallet: wallet.to_string(),
            secondary_addresses,
            disqualification: discovery.disqualification,
            stats,
            balances,
            found_chains,
            total,
        };

        let disqualified = report.disqualification.is_disqualified();
        metrics::record_report("ok", disqualified, timer.elapsed_secs());
        tracing::info!(
            wallet = %wallet,
            chains = report.chains_analysed(),
            disqualified = disqualified,
            points = report.total.points().len(),
            elapsed_secs = timer.elapsed_secs(),
            "Report ready"
        );

        Ok(report)
    }

    async fn collect_balances(
        &self,
        chain: &ChainConfig,
        address: &str,
        balances: &mut BTreeMap<String, BTreeMap<String, u128>>,
    ) {
        let coins: Vec<Coin> = match self.lcd(chain) {
            Ok(lcd) => match lcd.fetch_balances(address).await {
                Ok(coins) => coins,
                Err(e) => {
                    tracing::warn!(chain = %chain.name, address = %address, kind = e.kind(), error = %e, "Balances unavailable");
                    return;
                }
            },
            Err(e) => {
                tracing::warn!(chain = %chain.name, error = %e, "Balances unavailable");
                return;
            }
        };

        let entry = balances.entry(address.to_string()).or_default();
        for coin in coins {
            *entry.entry(coin.denom).or_insert(0) += coin.amount;
        }
    }
}
