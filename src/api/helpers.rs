// API Helper Functions
//
// Shared utilities used by the web handlers.

use axum::http::StatusCode;

/// Wallet addresses are compared lower-case and without surrounding blanks.
pub fn normalize_wallet(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Helper to create a 500 Internal Server Error response
pub fn internal_error(message: impl Into<String>) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, message.into())
}
