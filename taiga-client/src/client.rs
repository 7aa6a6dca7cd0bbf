//! Taiga REST client.
//!
//! One request per call, no retries. Every list endpoint is requested with
//! pagination disabled so a single response carries the whole collection.

use crate::config::TaigaConfig;
use crate::error::{Result, TaigaError};
use crate::http::{build_client, extract_error_message};
use crate::types::{
    AuthRequest, AuthResponse, Credentials, Milestone, Project, SessionToken, WorkItem,
};
use serde::de::DeserializeOwned;

/// Header that makes Taiga return complete lists instead of 30-item pages.
const DISABLE_PAGINATION: &str = "x-disable-pagination";

/// Async client for a single Taiga instance.
pub struct TaigaClient {
    config: TaigaConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for TaigaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaigaClient")
            .field("api_url", &self.config.api_url)
            .field("timeout_seconds", &self.config.timeout_seconds)
            .finish()
    }
}

impl TaigaClient {
    /// Create a client after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TaigaError::Config`] for an invalid configuration and
    /// [`TaigaError::Http`] if the HTTP client cannot be built.
    pub fn new(config: TaigaConfig) -> Result<Self> {
        config.validate()?;
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &TaigaConfig {
        &self.config
    }

    /// Log in with a username/password pair and return the session token.
    ///
    /// # Errors
    ///
    /// Returns [`TaigaError::Auth`] when Taiga rejects the credentials,
    /// [`TaigaError::Http`] on network failure and [`TaigaError::Parse`]
    /// when the response carries no token.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<SessionToken> {
        let url = format!("{}/auth", self.config.api_root());
        tracing::debug!(%url, username = %credentials.username, "taiga login");

        let body = AuthRequest {
            kind: "normal",
            username: &credentials.username,
            password: &credentials.password,
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TaigaError::Http(format!("login request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = extract_error_message(&text);
            return Err(match status.as_u16() {
                400 | 401 | 403 => TaigaError::Auth(message),
                code => TaigaError::Http(format!("login returned HTTP {code}: {message}")),
            });
        }

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| TaigaError::Parse(format!("login response: {e}")))?;
        if auth.auth_token.trim().is_empty() {
            return Err(TaigaError::Parse("login response has an empty auth_token".into()));
        }
        Ok(SessionToken::new(auth.auth_token))
    }

    /// Resolve a project by its slug.
    ///
    /// # Errors
    ///
    /// Returns [`TaigaError::NotFound`] when no project has this slug.
    pub async fn project_by_slug(&self, token: &SessionToken, slug: &str) -> Result<Project> {
        self.get_json(token, "projects/by_slug", &[("slug", slug.to_owned())])
            .await
            .map_err(|e| match e {
                TaigaError::NotFound(msg) => TaigaError::NotFound(format!("project `{slug}`: {msg}")),
                other => other,
            })
    }

    /// All sprints of a project.
    pub async fn milestones(&self, token: &SessionToken, project_id: u64) -> Result<Vec<Milestone>> {
        let items: Vec<Option<Milestone>> = self
            .get_json(token, "milestones", &[("project", project_id.to_string())])
            .await?;
        Ok(items.into_iter().flatten().collect())
    }

    /// Tasks of a project, optionally restricted to one sprint.
    pub async fn tasks(
        &self,
        token: &SessionToken,
        project_id: u64,
        milestone_id: Option<u64>,
    ) -> Result<Vec<WorkItem>> {
        let mut query = vec![("project", project_id.to_string())];
        if let Some(id) = milestone_id {
            query.push(("milestone", id.to_string()));
        }
        let items: Vec<Option<WorkItem>> = self.get_json(token, "tasks", &query).await?;
        Ok(items.into_iter().flatten().collect())
    }

    /// All user stories of a project.
    pub async fn user_stories(&self, token: &SessionToken, project_id: u64) -> Result<Vec<WorkItem>> {
        let items: Vec<Option<WorkItem>> = self
            .get_json(token, "userstories", &[("project", project_id.to_string())])
            .await?;
        Ok(items.into_iter().flatten().collect())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &SessionToken,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{path}", self.config.api_root());
        tracing::debug!(%url, ?query, "taiga request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .bearer_auth(token.as_str())
            .header(DISABLE_PAGINATION, "True")
            .send()
            .await
            .map_err(|e| TaigaError::Http(format!("GET /{path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = extract_error_message(&text);
            return Err(match status.as_u16() {
                404 => TaigaError::NotFound(message),
                code => TaigaError::Http(format!("GET /{path} returned HTTP {code}: {message}")),
            });
        }

        response
            .json()
            .await
            .map_err(|e| TaigaError::Parse(format!("GET /{path}: {e}")))
    }
}
