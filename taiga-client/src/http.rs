//! Shared HTTP client construction for Taiga requests.

use crate::config::TaigaConfig;
use crate::error::TaigaError;
use std::time::Duration;

/// User-Agent sent when the configuration does not override it.
pub fn default_user_agent() -> String {
    format!("taiga-client/{}", env!("CARGO_PKG_VERSION"))
}

/// Build a [`reqwest::Client`] configured for Taiga API calls.
///
/// The client has:
/// - Timeout from config
/// - User-Agent from config (or [`default_user_agent`])
/// - gzip decompression
///
/// # Errors
///
/// Returns [`TaigaError::Http`] if the client cannot be constructed.
pub fn build_client(config: &TaigaConfig) -> Result<reqwest::Client, TaigaError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => default_user_agent(),
    };

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .build()
        .map_err(|e| TaigaError::Http(format!("failed to build HTTP client: {e}")))
}

/// Extract a human-readable message from a Taiga error body.
///
/// Taiga reports errors as `{"_error_message": "...", "_error_type": "..."}`
/// and DRF-style errors as `{"detail": "..."}`. Anything else is returned as-is.
pub fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("_error_message")
                .or_else(|| v.get("detail"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
