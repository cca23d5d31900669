// API Type Definitions
//
// Form and state types shared by the web handlers.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analysis::WalletAnalyzer;

/// `POST /` body (`application/x-www-form-urlencoded`)
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct WalletForm {
    #[serde(default)]
    pub wallet: String,
}

/// Shared by every request; nothing in it is mutated after startup.
pub struct AppState {
    pub analyzer: Arc<WalletAnalyzer>,
    /// Prefix for links in rendered pages
    pub base_url: String,
}
