//! Configuration for the standup run.
//!
//! Two layers:
//! - [`StandupConfig`]: non-secret options with defaults, optionally loaded
//!   from a TOML file (board columns, message copy, limits).
//! - [`Settings`]: the required per-run values (credentials, project slug,
//!   webhook URL) read once from the environment, plus the options.

use crate::error::{Result, StandupError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use taiga_client::{Credentials, TaigaConfig};

/// Environment variable names.
pub mod env_keys {
    pub const TAIGA_URL: &str = "TAIGA_URL";
    pub const TAIGA_USERNAME: &str = "TAIGA_USERNAME";
    pub const TAIGA_PASSWORD: &str = "TAIGA_PASSWORD";
    pub const PROJECT_SLUG: &str = "PROJECT_SLUG";
    pub const DISCORD_WEBHOOK: &str = "DISCORD_WEBHOOK";
    pub const STANDUP_CONFIG: &str = "STANDUP_CONFIG";
}

/// Top-level options. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StandupConfig {
    /// Project-management service connection settings.
    pub taiga: TaigaSection,
    /// Status columns and board limits.
    pub board: BoardConfig,
    /// Message copy and broadcast behaviour.
    pub message: MessageConfig,
    /// Webhook delivery settings.
    pub delivery: DeliveryConfig,
}

/// Taiga connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaigaSection {
    /// REST API root. `TAIGA_URL` overrides this.
    pub api_url: String,
    /// Web front-end root used for the "Open Project" link.
    pub web_url: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for TaigaSection {
    fn default() -> Self {
        Self {
            api_url: taiga_client::config::DEFAULT_API_URL.to_owned(),
            web_url: taiga_client::config::DEFAULT_WEB_URL.to_owned(),
            timeout_seconds: 30,
        }
    }
}

impl TaigaSection {
    pub fn client_config(&self) -> TaigaConfig {
        TaigaConfig {
            api_url: self.api_url.clone(),
            web_url: self.web_url.clone(),
            timeout_seconds: self.timeout_seconds,
            user_agent: Some(format!("standup/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

/// One board column: a task status shown on the sprint board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardColumn {
    /// Status name exactly as Taiga reports it.
    pub status: String,
    /// Emoji shown in message field titles.
    pub emoji: String,
    /// `#RRGGBB` band colour in the rendered image.
    pub color: String,
}

impl BoardColumn {
    pub fn new(status: &str, emoji: &str, color: &str) -> Self {
        Self {
            status: status.to_owned(),
            emoji: emoji.to_owned(),
            color: color.to_owned(),
        }
    }
}

/// Board layout and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Sprint board columns, in display order.
    pub columns: Vec<BoardColumn>,
    /// Kanban story columns used for the workload breakdown.
    pub kanban_columns: Vec<BoardColumn>,
    /// Status that counts as finished.
    pub done_status: String,
    /// Story status that marks a blocker.
    pub blocked_status: String,
    /// Story statuses that are not active work.
    pub inactive_statuses: Vec<String>,
    /// Tasks listed per column in the message before "+N more".
    pub max_tasks_per_column: usize,
    /// Blocked stories listed in the metrics embed.
    pub max_blocked: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            columns: vec![
                BoardColumn::new("Not Started", "⏸️", "#95A5A6"),
                BoardColumn::new("In Progress", "🔄", "#F39C12"),
                BoardColumn::new("Done", "✅", "#2ECC71"),
            ],
            kanban_columns: vec![
                BoardColumn::new("Not Started", "⏸️", "#95A5A6"),
                BoardColumn::new("In Progress", "🔄", "#F39C12"),
                BoardColumn::new("Ready for Test", "🧪", "#9B59B6"),
                BoardColumn::new("Ready for Review", "👀", "#3498DB"),
                BoardColumn::new("Done", "✅", "#2ECC71"),
            ],
            done_status: "Done".to_owned(),
            blocked_status: "Blocked".to_owned(),
            inactive_statuses: vec!["Done".to_owned(), "Archived".to_owned()],
            max_tasks_per_column: 3,
            max_blocked: 5,
        }
    }
}

/// Status names compare ASCII case-insensitively everywhere on the board.
pub fn status_matches(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

impl BoardConfig {
    /// Column definition for a status, if it is on the sprint board.
    pub fn column(&self, status: &str) -> Option<&BoardColumn> {
        self.columns.iter().find(|c| status_matches(&c.status, status))
    }

    pub fn is_done(&self, status: &str) -> bool {
        status_matches(status, &self.done_status)
    }
}

/// Message copy and broadcast behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    /// Whether the message pings the whole channel.
    pub include_broadcast_tag: bool,
    /// Mention used when `include_broadcast_tag` is on.
    pub broadcast_tag: String,
    /// Daily reminder sentence placed after the tag.
    pub reminder: String,
    /// Optional link appended to the reminder (e.g. the sprint discussion thread).
    pub sprint_page_url: Option<String>,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            include_broadcast_tag: true,
            broadcast_tag: "@everyone".to_owned(),
            reminder: "Hey team, this is your daily reminder to check in with the team. \
                       Please share what you will get done today, or let the team know \
                       if you are not available today. Thank you!"
                .to_owned(),
            sprint_page_url: None,
        }
    }
}

/// Webhook delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Largest attachment accepted by the webhook.
    pub max_attachment_bytes: usize,
    /// Post a short failure notice to the webhook when a run fails.
    pub notify_on_failure: bool,
    /// Display name override for the webhook post.
    pub username: Option<String>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_attachment_bytes: 8 * 1024 * 1024,
            notify_on_failure: true,
            username: None,
        }
    }
}

impl StandupConfig {
    /// Load options from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns [`StandupError::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StandupError::Config(format!("read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| StandupError::Config(format!("parse {}: {e}", path.display())))
    }

    /// Options for one invocation: `explicit` if given, else the file named by
    /// `STANDUP_CONFIG`, else defaults.
    ///
    /// # Errors
    ///
    /// Returns [`StandupError::Config`] if the chosen file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let from_env = lookup(env_keys::STANDUP_CONFIG)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading config");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Same options with the broadcast tag switched off.
    pub fn without_broadcast(mut self) -> Self {
        self.message.include_broadcast_tag = false;
        self
    }

    /// Checks the options for values that would break a run.
    pub fn validate(&self) -> Result<()> {
        if self.taiga.timeout_seconds == 0 || self.delivery.timeout_seconds == 0 {
            return Err(StandupError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.board.columns.is_empty() {
            return Err(StandupError::Config(
                "board.columns must list at least one status".into(),
            ));
        }
        for column in self.board.columns.iter().chain(&self.board.kanban_columns) {
            if crate::render::parse_hex_color(&column.color).is_none() {
                return Err(StandupError::Config(format!(
                    "column `{}` has invalid color `{}` (expected #RRGGBB)",
                    column.status, column.color
                )));
            }
        }
        if self.board.max_tasks_per_column == 0 {
            return Err(StandupError::Config(
                "board.max_tasks_per_column must be greater than 0".into(),
            ));
        }
        if self.message.include_broadcast_tag {
            let tag = &self.message.broadcast_tag;
            if tag.chars().count() < 2 || tag.chars().any(char::is_whitespace) {
                return Err(StandupError::Config(format!(
                    "message.broadcast_tag `{tag}` must be at least 2 characters with no whitespace"
                )));
            }
        }
        if self.delivery.max_attachment_bytes == 0 {
            return Err(StandupError::Config(
                "delivery.max_attachment_bytes must be greater than 0".into(),
            ));
        }
        self.taiga
            .client_config()
            .validate()
            .map_err(|e| StandupError::Config(e.to_string()))
    }
}

/// Identifies the remote project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub slug: String,
}

/// Webhook destination. The URL path embeds the webhook secret, so `Debug`
/// and `Display` only show the host.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookTarget {
    url: url::Url,
}

impl WebhookTarget {
    /// Parse and check a webhook URL.
    ///
    /// # Errors
    ///
    /// Returns [`StandupError::Config`] for anything that is not an absolute
    /// `http(s)` URL with a host.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = url::Url::parse(raw.trim())
            .map_err(|e| StandupError::Config(format!("webhook URL is malformed: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(StandupError::Config(
                "webhook URL must be an http(s) URL with a host".into(),
            ));
        }
        Ok(Self { url })
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }

    fn host(&self) -> &str {
        self.url.host_str().unwrap_or("?")
    }
}

impl fmt::Debug for WebhookTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WebhookTarget({}://{}/…)", self.url.scheme(), self.host())
    }
}

impl fmt::Display for WebhookTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/…", self.url.scheme(), self.host())
    }
}

/// Everything one run needs, built once at startup and passed down.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub project: ProjectRef,
    pub webhook: WebhookTarget,
    pub options: StandupConfig,
}

impl Settings {
    /// Read the required values from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`StandupError::Config`] naming the first missing or invalid value.
    pub fn from_env(options: StandupConfig) -> Result<Self> {
        Self::from_lookup(options, |key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] with an injected variable lookup.
    pub fn from_lookup(
        mut options: StandupConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| StandupError::Config(format!("{key} is not set")))
        };

        let username = required(env_keys::TAIGA_USERNAME)?;
        // Passwords keep their surrounding whitespace.
        let password = lookup(env_keys::TAIGA_PASSWORD)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                StandupError::Config(format!("{} is not set", env_keys::TAIGA_PASSWORD))
            })?;
        let slug = required(env_keys::PROJECT_SLUG)?;
        let webhook = WebhookTarget::parse(&required(env_keys::DISCORD_WEBHOOK)?)?;

        if let Some(api_url) = lookup(env_keys::TAIGA_URL).filter(|v| !v.trim().is_empty()) {
            options.taiga.api_url = api_url.trim().to_owned();
        }
        options.validate()?;

        Ok(Self {
            credentials: Credentials::new(username, password),
            project: ProjectRef { slug },
            webhook,
            options,
        })
    }
}
