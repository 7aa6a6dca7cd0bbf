//! Where sprint snapshots come from.
//!
//! [`SprintSource`] is the seam the pipeline is generic over, so tests can
//! substitute the remote service. [`TaigaSource`] is the real implementation.

use crate::config::ProjectRef;
use crate::error::{Result, StandupError};
use crate::snapshot::{ProjectInfo, SprintInfo, SprintSnapshot, TaskItem};
use chrono::{DateTime, Utc};
use taiga_client::sprint::parse_day;
use taiga_client::{Credentials, SessionToken, TaigaClient, WorkItem};

/// A project-management backend that can produce a [`SprintSnapshot`].
pub trait SprintSource: Send + Sync {
    /// Log in and return a session token.
    ///
    /// # Errors
    ///
    /// Returns [`StandupError::Auth`] when the credentials are rejected or the
    /// service cannot be reached.
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<SessionToken>> + Send;

    /// Fetch the current sprint of `project`.
    ///
    /// # Errors
    ///
    /// Returns [`StandupError::Fetch`] when the project is unknown, the
    /// service cannot be reached or a response is malformed.
    fn fetch_sprint(
        &self,
        token: &SessionToken,
        project: &ProjectRef,
    ) -> impl std::future::Future<Output = Result<SprintSnapshot>> + Send;
}

/// [`SprintSource`] backed by the Taiga REST API.
#[derive(Debug)]
pub struct TaigaSource {
    client: TaigaClient,
    clock: fn() -> DateTime<Utc>,
}

impl TaigaSource {
    pub fn new(client: TaigaClient) -> Self {
        Self {
            client,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock used to stamp snapshots and pick the sprint.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }
}

fn items(list: Vec<WorkItem>) -> Vec<TaskItem> {
    list.into_iter().map(TaskItem::from).collect()
}

impl SprintSource for TaigaSource {
    async fn authenticate(&self, credentials: &Credentials) -> Result<SessionToken> {
        self.client
            .authenticate(credentials)
            .await
            .map_err(StandupError::from_login)
    }

    async fn fetch_sprint(&self, token: &SessionToken, project: &ProjectRef) -> Result<SprintSnapshot> {
        let taken_at = (self.clock)();
        let today = taken_at.date_naive();

        let remote = self
            .client
            .project_by_slug(token, &project.slug)
            .await
            .map_err(StandupError::from_fetch)?;
        tracing::info!(project = %remote.name, id = remote.id, "project resolved");

        let milestones = self
            .client
            .milestones(token, remote.id)
            .await
            .map_err(StandupError::from_fetch)?;
        let sprint = taiga_client::current_sprint(&milestones, today).map(|m| SprintInfo {
            id: m.id,
            name: m.name.clone(),
            estimated_start: m.estimated_start.as_deref().and_then(parse_day),
            estimated_finish: m.estimated_finish.as_deref().and_then(parse_day),
        });
        tracing::info!(
            sprint = sprint.as_ref().map_or("none", |s| s.name.as_str()),
            "current sprint"
        );

        let tasks = match &sprint {
            Some(s) => self
                .client
                .tasks(token, remote.id, Some(s.id))
                .await
                .map_err(StandupError::from_fetch)?,
            None => Vec::new(),
        };
        let stories = self
            .client
            .user_stories(token, remote.id)
            .await
            .map_err(StandupError::from_fetch)?;
        let project_tasks = self
            .client
            .tasks(token, remote.id, None)
            .await
            .map_err(StandupError::from_fetch)?;
        tracing::debug!(
            sprint_tasks = tasks.len(),
            stories = stories.len(),
            project_tasks = project_tasks.len(),
            "sprint data fetched"
        );

        let url = remote
            .url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| self.client.config().project_web_url(&remote.slug));
        Ok(SprintSnapshot {
            project: ProjectInfo {
                id: remote.id,
                name: remote.name,
                slug: remote.slug,
                url,
            },
            sprint,
            tasks: items(tasks),
            stories: items(stories),
            project_tasks: items(project_tasks),
            taken_at,
        })
    }
}
