//! Client configuration with sensible defaults.
//!
//! [`TaigaConfig`] controls which Taiga instance is queried and how long a
//! single request may take. The defaults target the hosted taiga.io service.

use crate::error::TaigaError;

/// Default REST endpoint of the hosted Taiga service.
pub const DEFAULT_API_URL: &str = "https://api.taiga.io/api/v1";

/// Default web front-end used to build project links.
pub const DEFAULT_WEB_URL: &str = "https://tree.taiga.io";

/// Configuration for a [`crate::TaigaClient`].
#[derive(Debug, Clone)]
pub struct TaigaConfig {
    /// REST API root, e.g. `https://api.taiga.io/api/v1`. No trailing slash needed.
    pub api_url: String,
    /// Web front-end root used for `project/<slug>` links.
    pub web_url: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, `taiga-client/<version>` is sent.
    pub user_agent: Option<String>,
}

impl Default for TaigaConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            web_url: DEFAULT_WEB_URL.to_owned(),
            timeout_seconds: 30,
            user_agent: None,
        }
    }
}

impl TaigaConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `api_url` must be an `http://` or `https://` URL
    /// - `timeout_seconds` must be greater than 0
    pub fn validate(&self) -> Result<(), TaigaError> {
        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(TaigaError::Config(format!(
                "api_url must start with http:// or https://, got `{url}`"
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(TaigaError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// The API root with any trailing slash removed.
    pub fn api_root(&self) -> &str {
        self.api_url.trim().trim_end_matches('/')
    }

    /// Browser link for a project slug.
    pub fn project_web_url(&self, slug: &str) -> String {
        format!("{}/project/{slug}", self.web_url.trim().trim_end_matches('/'))
    }
}
