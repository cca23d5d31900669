/// Error Types
///
/// `LcdError` covers every upstream REST call (LCD nodes and the staking
/// rewards API). Callers log it and degrade to "no data"; nothing here is
/// retried.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LcdError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response from {url} is missing `{field}`")]
    MissingField { url: String, field: &'static str },

    #[error("upstream {url} reported an error: {message}")]
    Upstream { url: String, message: String },
}

impl LcdError {
    /// Short label used for the `outcome` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            LcdError::Http { .. } => "transport",
            LcdError::Status { .. } => "status",
            LcdError::Decode { .. } => "decode",
            LcdError::MissingField { .. } => "missing_field",
            LcdError::Upstream { .. } => "upstream",
        }
    }
}

#[derive(Debug, Error)]
pub enum ObservatoryError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("home chain `{0}` is not present in the chain registry")]
    UnknownHomeChain(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Lcd(#[from] LcdError),
}
