/// Chain Registry
///
/// Static description of the chains an account is tracked across: the LCD
/// endpoint of each chain, the address prefix that identifies it, and which
/// staked IBC assets earn rewards there. One chain is the *home* chain, the
/// chain of the primary address being analysed.
///
/// The defaults reproduce the Game of Alliances testnet layout; deployments
/// override them through `config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ObservatoryError;

pub const DEFAULT_HOME_CHAIN: &str = "terra";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub name: String,
    /// Base URL of the chain's LCD REST endpoint
    pub lcd: String,
    /// Bech32 prefix of account addresses (defaults to the chain name)
    #[serde(default)]
    pub prefix: Option<String>,
    /// Chain id used by the staking rewards API (defaults to `<name>-1`)
    #[serde(default)]
    pub chain_id: Option<String>,
    /// Aliases from the IBC denom table that can be staked on this chain
    #[serde(default)]
    pub enabled_staking_ibcs: Vec<String>,
}

impl ChainConfig {
    pub fn new(name: &str, lcd: &str, enabled_staking_ibcs: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            lcd: lcd.to_string(),
            prefix: None,
            chain_id: None,
            enabled_staking_ibcs: enabled_staking_ibcs.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn address_prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(&self.name)
    }

    pub fn owns_address(&self, address: &str) -> bool {
        address.starts_with(self.address_prefix())
    }

    pub fn rewards_chain_id(&self) -> String {
        self.chain_id
            .clone()
            .unwrap_or_else(|| format!("{}-1", self.name))
    }
}

/// The Game of Alliances chains: the Terra testnet plus the four alliance chains.
pub fn default_chains() -> Vec<ChainConfig> {
    vec![
        ChainConfig::new(DEFAULT_HOME_CHAIN, "https://pisco-lcd.terra.dev/", &[]),
        ChainConfig::new("harkonnen", "https://harkonnen.terra.dev:1317/", &["sCOR", "sORD", "sATR"]),
        ChainConfig::new("corrino", "https://corrino.terra.dev:1317/", &["sORD", "sATR"]),
        ChainConfig::new("atreides", "https://atreides.terra.dev:1317/", &["sCOR", "sHAR", "sORD"]),
        ChainConfig::new("ordos", "https://ordos.terra.dev:1317/", &["sCOR", "sHAR", "sATR"]),
    ]
}

pub fn default_ibc_denoms() -> BTreeMap<String, String> {
    [
        ("sCOR", "D7AA592A1C1C00FE7C9E15F4BB7ADB4B779627DD3FBB3C877CD4DB27F56E35B4"),
        ("sORD", "3FA98D26F2D6CCB58D8E4D1B332C6EB8EE4AC7E3F0AD5B5B05201155CEB1AD1D"),
        ("sATR", "95287CFB16A09D3FE1D0B1E34B6725A380DD2A40AEF4F496B3DAF6F0D901695B"),
        ("sHAR", "51B1594844CCB9438C4EF3720B7ADD4398AC5D52E073CA7E592E675C6E4163EF"),
    ]
    .into_iter()
    .map(|(alias, hash)| (alias.to_string(), hash.to_string()))
    .collect()
}

/// Alias <-> hash lookup for IBC vouchers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IbcDenoms {
    by_alias: BTreeMap<String, String>,
    by_hash: BTreeMap<String, String>,
}

impl IbcDenoms {
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        // Hashes are compared upper-case, that is how the chains print them
        let by_hash = aliases
            .iter()
            .map(|(alias, hash)| (hash.to_ascii_uppercase(), alias.clone()))
            .collect();
        Self { by_alias: aliases, by_hash }
    }

    pub fn alias_for(&self, hash: &str) -> Option<&str> {
        self.by_hash.get(&hash.to_ascii_uppercase()).map(String::as_str)
    }

    pub fn hash_for(&self, alias: &str) -> Option<&str> {
        self.by_alias.get(alias).map(String::as_str)
    }

    /// Replace a known IBC hash with its alias; unknown hashes pass through.
    pub fn normalize(&self, hash: &str) -> String {
        self.alias_for(hash)
            .map(str::to_string)
            .unwrap_or_else(|| hash.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ChainRegistry {
    home: ChainConfig,
    chains: Vec<ChainConfig>,
    ibc_denoms: IbcDenoms,
}

impl ChainRegistry {
    pub fn new(
        home_chain: &str,
        chains: Vec<ChainConfig>,
        ibc_denoms: IbcDenoms,
    ) -> Result<Self, ObservatoryError> {
        let home = chains
            .iter()
            .find(|c| c.name == home_chain)
            .cloned()
            .ok_or_else(|| ObservatoryError::UnknownHomeChain(home_chain.to_string()))?;

        Ok(Self { home, chains, ibc_denoms })
    }

    pub fn game_of_alliances() -> Self {
        Self {
            home: default_chains().remove(0),
            chains: default_chains(),
            ibc_denoms: IbcDenoms::new(default_ibc_denoms()),
        }
    }

    pub fn home(&self) -> &ChainConfig {
        &self.home
    }

    pub fn chains(&self) -> &[ChainConfig] {
        &self.chains
    }

    pub fn ibc_denoms(&self) -> &IbcDenoms {
        &self.ibc_denoms
    }

    /// Non-home chain owning `address`, if any.
    ///
    /// The longest matching prefix wins so that e.g. `terra` never shadows a
    /// chain whose prefix merely starts with it.
    pub fn secondary_chain_for(&self, address: &str) -> Option<&ChainConfig> {
        self.chains
            .iter()
            .filter(|c| c.name != self.home.name && c.owns_address(address))
            .max_by_key(|c| c.address_prefix().len())
    }
}
