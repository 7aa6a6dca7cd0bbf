//! Wire types for the subset of the Taiga API the client uses.
//!
//! Only the fields the standup needs are decoded; everything else in the
//! (large) Taiga payloads is ignored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status name used when an item carries no status information.
pub const UNKNOWN_STATUS: &str = "Unknown";

/// Username/password pair for a `normal` Taiga login.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer token returned by `POST /auth`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Body of `POST /auth`.
#[derive(Debug, Serialize)]
pub(crate) struct AuthRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST /auth` (only the token is kept).
#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    pub auth_token: String,
}

/// A Taiga project as returned by `GET /projects/by_slug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub slug: String,
    /// Browser link, when the instance reports one.
    #[serde(default)]
    pub url: Option<String>,
}

/// A sprint (Taiga calls them milestones).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: u64,
    pub name: String,
    /// `YYYY-MM-DD` (or an RFC 3339 timestamp on some instances).
    #[serde(default)]
    pub estimated_start: Option<String>,
    #[serde(default)]
    pub estimated_finish: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_closed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryInfo {
    #[serde(rename = "ref", default)]
    pub reference: Option<u64>,
}

/// A task or user story. Both share the fields the standup reads; stories
/// simply never carry `user_story_extra_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: u64,
    #[serde(rename = "ref", default)]
    pub reference: Option<u64>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default)]
    pub status_extra_info: Option<StatusInfo>,
    #[serde(default)]
    pub assigned_to_extra_info: Option<UserInfo>,
    #[serde(default)]
    pub user_story_extra_info: Option<StoryInfo>,
}

impl WorkItem {
    /// Status name, or [`UNKNOWN_STATUS`] when Taiga sent none.
    pub fn status_name(&self) -> &str {
        self.status_extra_info
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .unwrap_or(UNKNOWN_STATUS)
    }

    /// Username of the assignee, if any.
    pub fn assignee(&self) -> Option<&str> {
        self.assigned_to_extra_info
            .as_ref()
            .and_then(|u| u.username.as_deref())
            .filter(|u| !u.is_empty())
    }

    /// `ref` of the parent user story, for tasks that belong to one.
    pub fn story_ref(&self) -> Option<u64> {
        self.user_story_extra_info
            .as_ref()
            .and_then(|s| s.reference)
    }
}
