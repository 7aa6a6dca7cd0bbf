//! The per-run sprint snapshot and the status grouping both derived
//! artifacts are built from.

use crate::config::{status_matches, BoardConfig};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use taiga_client::WorkItem;

/// Project identity as shown in the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: u64,
    pub name: String,
    pub slug: String,
    /// Browser link to the project.
    pub url: String,
}

/// The sprint the snapshot describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintInfo {
    pub id: u64,
    pub name: String,
    pub estimated_start: Option<NaiveDate>,
    pub estimated_finish: Option<NaiveDate>,
}

/// A task or story reduced to what the report shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    /// Project-scoped `#ref` number.
    pub reference: Option<u64>,
    pub title: String,
    pub status: String,
    pub assignee: Option<String>,
    pub is_closed: bool,
    /// `#ref` of the parent story (tasks only).
    pub story_ref: Option<u64>,
}

impl TaskItem {
    pub fn new(title: &str, status: &str, assignee: Option<&str>) -> Self {
        Self {
            reference: None,
            title: title.to_owned(),
            status: status.to_owned(),
            assignee: assignee.map(str::to_owned),
            is_closed: false,
            story_ref: None,
        }
    }
}

impl From<WorkItem> for TaskItem {
    fn from(item: WorkItem) -> Self {
        Self {
            reference: item.reference,
            title: item.subject.clone(),
            status: item.status_name().to_owned(),
            assignee: item.assignee().map(str::to_owned),
            is_closed: item.is_closed,
            story_ref: item.story_ref(),
        }
    }
}

/// Everything fetched in one run. Both the image and the message are pure
/// functions of this value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintSnapshot {
    pub project: ProjectInfo,
    pub sprint: Option<SprintInfo>,
    /// Tasks of the current sprint.
    pub tasks: Vec<TaskItem>,
    /// All user stories of the project.
    pub stories: Vec<TaskItem>,
    /// All tasks of the project.
    pub project_tasks: Vec<TaskItem>,
    /// When the snapshot was assembled.
    pub taken_at: DateTime<Utc>,
}

/// Tasks sharing one status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBucket<'a> {
    pub status: &'a str,
    pub tasks: Vec<&'a TaskItem>,
}

impl StatusBucket<'_> {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Group items into non-empty status buckets.
///
/// Buckets for the configured board columns come first in column order and
/// carry the column's spelling of the status; any other status follows
/// alphabetically. Task order inside a bucket follows the input order.
pub fn group_by_status<'a>(items: &'a [TaskItem], board: &'a BoardConfig) -> Vec<StatusBucket<'a>> {
    let mut buckets: Vec<StatusBucket<'a>> = board
        .columns
        .iter()
        .map(|column| StatusBucket {
            status: column.status.as_str(),
            tasks: Vec::new(),
        })
        .collect();
    let mut others: BTreeMap<&'a str, Vec<&'a TaskItem>> = BTreeMap::new();
    for item in items {
        match buckets
            .iter_mut()
            .find(|b| status_matches(b.status, &item.status))
        {
            Some(bucket) => bucket.tasks.push(item),
            None => others.entry(item.status.as_str()).or_default().push(item),
        }
    }

    buckets.retain(|b| !b.is_empty());
    buckets.extend(
        others
            .into_iter()
            .map(|(status, tasks)| StatusBucket { status, tasks }),
    );
    buckets
}

/// Items whose status matches `status`.
pub fn with_status<'a>(items: &'a [TaskItem], status: &str) -> Vec<&'a TaskItem> {
    items
        .iter()
        .filter(|t| status_matches(&t.status, status))
        .collect()
}

/// `done` out of `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub done: usize,
    pub total: usize,
}

impl Completion {
    /// Completion by the board's done status.
    pub fn by_status(items: &[TaskItem], board: &BoardConfig) -> Self {
        Self {
            done: items.iter().filter(|t| board.is_done(&t.status)).count(),
            total: items.len(),
        }
    }

    /// Completion by the closed flag.
    pub fn by_closed(items: &[TaskItem]) -> Self {
        Self {
            done: items.iter().filter(|t| t.is_closed).count(),
            total: items.len(),
        }
    }

    /// Whole-number percentage; 0 when there is nothing to complete.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.done as f64 * 100.0 / self.total as f64).round() as u32
    }
}
