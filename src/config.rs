pub use config::{Config, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::chains::{default_chains, default_ibc_denoms, ChainConfig, ChainRegistry, IbcDenoms, DEFAULT_HOME_CHAIN};
use crate::error::ObservatoryError;
use crate::lcd::{DEFAULT_PAGE_DELAY, DEFAULT_PAGE_LIMIT};
use crate::rewards::DEFAULT_REWARDS_API;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "OBSERVATORY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
    /// Prefix prepended to links in the rendered pages
    pub base_url: String,
    pub asset_dir: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:4000".to_string(),
            base_url: "/".to_string(),
            asset_dir: "frontend/asset".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LcdSettings {
    pub page_limit: u32,
    /// Pause after every page, in milliseconds
    pub page_delay_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for LcdSettings {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            page_delay_ms: DEFAULT_PAGE_DELAY.as_millis() as u64,
            timeout_secs: 30,
            user_agent: format!("alliance-observatory/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl LcdSettings {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardsSettings {
    pub enabled: bool,
    pub api_url: String,
}

impl Default for RewardsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: DEFAULT_REWARDS_API.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
    pub file: Option<String>,
    /// "daily", "hourly" or "never"
    pub rotation: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
            rotation: "daily".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub lcd: LcdSettings,
    pub rewards: RewardsSettings,
    pub logging: LoggingSettings,
    pub home_chain: String,
    pub chains: Vec<ChainConfig>,
    /// A list rather than a table: config keys are case-folded, aliases are not
    pub ibc_denoms: Vec<IbcDenomEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbcDenomEntry {
    pub alias: String,
    pub hash: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            lcd: LcdSettings::default(),
            rewards: RewardsSettings::default(),
            logging: LoggingSettings::default(),
            home_chain: DEFAULT_HOME_CHAIN.to_string(),
            chains: default_chains(),
            ibc_denoms: default_ibc_denoms()
                .into_iter()
                .map(|(alias, hash)| IbcDenomEntry { alias, hash })
                .collect(),
        }
    }
}

impl Settings {
    pub fn registry(&self) -> Result<ChainRegistry, ObservatoryError> {
        ChainRegistry::new(
            &self.home_chain,
            self.chains.clone(),
            IbcDenoms::new(
                self.ibc_denoms
                    .iter()
                    .map(|e| (e.alias.clone(), e.hash.clone()))
                    .collect::<BTreeMap<_, _>>(),
            ),
        )
    }
}

/// Load settings from `path` (or `config.toml` when absent) and the
/// `OBSERVATORY__*` environment.
///
/// A missing file is not an error; every setting has a default. An explicit
/// `path` that does not exist is.
pub fn load_config(path: Option<&Path>) -> Result<Settings, ObservatoryError> {
    let file = match path {
        Some(p) => ConfigFile::from(p).required(true),
        None => ConfigFile::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let config = Config::builder()
        .add_source(file)
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let settings: Settings = config.try_deserialize()?;

    // Surface an unknown home chain at startup rather than on first request
    settings.registry()?;

    Ok(settings)
}
