//! Error types for the taiga-client crate.
//!
//! Messages never contain the password or the session token.

/// Errors that can occur while talking to the Taiga API.
#[derive(Debug, thiserror::Error)]
pub enum TaigaError {
    /// The login request was rejected (bad username or password).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The requested resource (usually the project slug) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The HTTP request failed or returned an unexpected status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for taiga-client results.
pub type Result<T> = std::result::Result<T, TaigaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_auth() {
        let err = TaigaError::Auth("No active account found".into());
        assert_eq!(
            err.to_string(),
            "authentication failed: No active account found"
        );
    }

    #[test]
    fn display_not_found() {
        let err = TaigaError::NotFound("project `demo`".into());
        assert_eq!(err.to_string(), "not found: project `demo`");
    }

    #[test]
    fn display_http() {
        let err = TaigaError::Http("connection refused".into());
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn display_parse() {
        let err = TaigaError::Parse("missing field `auth_token`".into());
        assert_eq!(err.to_string(), "parse error: missing field `auth_token`");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TaigaError>();
    }
}
