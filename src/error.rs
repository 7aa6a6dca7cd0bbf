//! Error types for the standup pipeline.
//!
//! Each variant carries a stable error code (SCREAMING_SNAKE_CASE) shown in
//! the Display output and a distinct process exit code, so a failed cron run
//! can be diagnosed from the CI log line alone.

use taiga_client::TaigaError;

/// Stable error codes for programmatic error handling.
pub mod error_codes {
    /// Missing or malformed required setting.
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    /// The project-management service rejected the credentials.
    pub const AUTH_FAILED: &str = "AUTH_FAILED";

    /// Sprint data could not be retrieved.
    pub const FETCH_FAILED: &str = "FETCH_FAILED";

    /// The summary image could not be built.
    pub const RENDER_FAILED: &str = "RENDER_FAILED";

    /// The webhook rejected the post or could not be reached.
    pub const DELIVERY_FAILED: &str = "DELIVERY_FAILED";
}

/// Why a webhook delivery failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// Connection, TLS or timeout failure before any response.
    Unreachable,
    /// The webhook answered with a non-success status.
    Rejected { status: u16 },
    /// The payload is larger than the webhook accepts.
    Oversized,
    /// The request body could not be assembled.
    Payload,
}

/// Top-level error type. Every variant is fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum StandupError {
    /// Missing or malformed configuration.
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    Config(String),

    /// Credential rejection or login failure.
    #[error("[{}] {}", error_codes::AUTH_FAILED, .0)]
    Auth(String),

    /// Project, sprint or task retrieval failure.
    #[error("[{}] {}", error_codes::FETCH_FAILED, .0)]
    Fetch(String),

    /// Image construction failure.
    #[error("[{}] {}", error_codes::RENDER_FAILED, .0)]
    Render(String),

    /// Webhook delivery failure.
    #[error("[{}] {message}", error_codes::DELIVERY_FAILED)]
    Delivery {
        kind: DeliveryFailure,
        message: String,
    },
}

impl StandupError {
    pub fn delivery(kind: DeliveryFailure, message: impl Into<String>) -> Self {
        Self::Delivery {
            kind,
            message: message.into(),
        }
    }

    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => error_codes::CONFIG_INVALID,
            Self::Auth(_) => error_codes::AUTH_FAILED,
            Self::Fetch(_) => error_codes::FETCH_FAILED,
            Self::Render(_) => error_codes::RENDER_FAILED,
            Self::Delivery { .. } => error_codes::DELIVERY_FAILED,
        }
    }

    /// Process exit code for this error. Zero is reserved for success.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Auth(_) => 3,
            Self::Fetch(_) => 4,
            Self::Render(_) => 5,
            Self::Delivery { .. } => 6,
        }
    }

    /// Returns the inner message without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Config(m) | Self::Auth(m) | Self::Fetch(m) | Self::Render(m) => m,
            Self::Delivery { message, .. } => message,
        }
    }

    /// Map an API-client error raised during login.
    ///
    /// Anything that prevented obtaining a token is an auth failure.
    pub fn from_login(err: TaigaError) -> Self {
        match err {
            TaigaError::Config(m) => Self::Config(m),
            other => Self::Auth(other.to_string()),
        }
    }

    /// Map an API-client error raised while fetching sprint data.
    pub fn from_fetch(err: TaigaError) -> Self {
        match err {
            TaigaError::Config(m) => Self::Config(m),
            other => Self::Fetch(other.to_string()),
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, StandupError>;
