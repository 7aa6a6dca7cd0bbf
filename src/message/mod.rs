//! Turns a [`SprintSnapshot`] into the chat message.
//!
//! The message is plain content (broadcast tag, reminder, summary line)
//! followed by two embeds: the sprint board and the team metrics. The
//! broadcast tag only ever appears in the content; every other string is
//! passed through [`escape_mentions`] so task titles cannot ping anyone.

pub mod embed;
pub mod metrics;

use crate::config::{status_matches, MessageConfig, StandupConfig};
use crate::error::StandupError;
use crate::render::FILE_NAME;
use crate::snapshot::{group_by_status, Completion, SprintSnapshot, TaskItem};
use embed::{clip, Embed, EmbedField, EmbedFooter, EmbedMedia, ZERO_WIDTH_SPACE};
use serde::Serialize;

/// Maximum length of the message content.
pub const MAX_CONTENT: usize = 2000;
/// Shown instead of the summary when the sprint has no tasks.
pub const NO_TASKS: &str = "No tasks in the current sprint.";

pub(crate) const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

const SPRINT_COLOR: u32 = 0x5865F2;
const FAILURE_COLOR: u32 = 0xE74C3C;
const TASK_TITLE_CHARS: usize = 25;
const DATE_FORMAT: &str = "%A, %B %d, %Y";

/// The formatted message, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandupMessage {
    pub content: String,
    pub embeds: Vec<Embed>,
    /// Whether the content carries a broadcast tag the webhook should honour.
    #[serde(skip)]
    pub broadcast: bool,
}

impl StandupMessage {
    /// Every user-visible string, content first.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.content.as_str()).chain(self.embeds.iter().flat_map(|e| e.texts()))
    }
}

/// Break `@everyone`, `@here` and the configured tag with a zero-width space
/// so the chat service shows them as text instead of pinging.
///
/// One-character tags are left alone; config validation rejects them.
pub fn escape_mentions(text: &str, tag: &str) -> String {
    let mut out = text.to_owned();
    for needle in ["@everyone", "@here", tag.trim()] {
        let mut chars = needle.chars();
        let Some(first) = chars.next() else { continue };
        let rest = chars.as_str();
        if rest.is_empty() {
            continue;
        }
        out = out.replace(needle, &format!("{first}{ZERO_WIDTH_SPACE}{rest}"));
    }
    out
}

pub(crate) fn item_ref(item: &TaskItem) -> String {
    item.reference
        .map_or_else(|| "#?".to_owned(), |r| format!("#{r}"))
}

pub(crate) fn assignee_handle(item: &TaskItem) -> String {
    format!("@{}", item.assignee.as_deref().unwrap_or("?"))
}

/// `"<n> done"` then each other non-empty status bucket, joined with `" / "`.
pub fn summary_line(snapshot: &SprintSnapshot, config: &StandupConfig) -> String {
    let board = &config.board;
    if snapshot.tasks.is_empty() {
        return NO_TASKS.to_owned();
    }
    let done = Completion::by_status(&snapshot.tasks, board).done;
    let mut parts = vec![format!("{done} done")];
    parts.extend(
        group_by_status(&snapshot.tasks, board)
            .iter()
            .filter(|bucket| !board.is_done(bucket.status))
            .map(|bucket| format!("{} {}", bucket.len(), bucket.status.to_lowercase())),
    );
    parts.join(" / ")
}

fn content(snapshot: &SprintSnapshot, config: &MessageConfig, summary: &str) -> String {
    let mut body = config.reminder.clone();
    if let Some(url) = &config.sprint_page_url {
        body.push_str(&format!("\n{url}"));
    }
    body.push_str("\n\n");
    match &snapshot.sprint {
        Some(sprint) => body.push_str(&format!("🏃 **{}**: {summary}", sprint.name)),
        None => body.push_str(summary),
    }
    let tag = config.broadcast_tag.trim();
    let body = escape_mentions(&body, tag);

    if config.include_broadcast_tag {
        clip(&format!("{tag} {body}"), MAX_CONTENT)
    } else {
        clip(&body, MAX_CONTENT)
    }
}

fn task_line(task: &TaskItem) -> String {
    let story = task
        .story_ref
        .map(|r| format!(" (US#{r})"))
        .unwrap_or_default();
    format!(
        "**{}** {}{story}\n{}",
        item_ref(task),
        assignee_handle(task),
        clip(&task.title, TASK_TITLE_CHARS)
    )
}

fn sprint_embed(snapshot: &SprintSnapshot, config: &StandupConfig) -> Embed {
    let board = &config.board;
    let completion = Completion::by_status(&snapshot.tasks, board);

    let mut description = format!(
        "**{}** • [Open Project]({})\n\n",
        snapshot.taken_at.format(DATE_FORMAT),
        snapshot.project.url
    );
    match &snapshot.sprint {
        Some(sprint) => description.push_str(&format!(
            "🏃 **{}**: {}/{} tasks complete ({}%)\n\n",
            sprint.name,
            completion.done,
            completion.total,
            completion.percent()
        )),
        None => description.push_str("🏃 **No Active Sprint**\n\n"),
    }
    description.push_str(SEPARATOR);

    let mut embed = Embed::new(
        format!("🌅 Daily Standup • {}", snapshot.project.name),
        description,
        SPRINT_COLOR,
    );

    if let Some(sprint) = &snapshot.sprint {
        if completion.total > 0 {
            embed.push_field(EmbedField::new(
                format!("🏃 {} (Sprint Tasks)", sprint.name),
                format!("Active sprint with **{}** tasks", completion.total),
                false,
            ));
            let buckets = group_by_status(&snapshot.tasks, board);
            for column in &board.columns {
                let tasks = buckets
                    .iter()
                    .find(|b| status_matches(b.status, &column.status))
                    .map(|b| b.tasks.as_slice())
                    .unwrap_or_default();
                let mut lines: Vec<String> = tasks
                    .iter()
                    .take(board.max_tasks_per_column)
                    .map(|t| task_line(t))
                    .collect();
                if tasks.len() > board.max_tasks_per_column {
                    lines.push(format!(
                        "*+{} more*",
                        tasks.len() - board.max_tasks_per_column
                    ));
                }
                if lines.is_empty() {
                    lines.push("*—*".to_owned());
                }
                embed.push_field(EmbedField::new(
                    format!("{} {} ({})", column.emoji, column.status, tasks.len()),
                    lines.join("\n\n"),
                    true,
                ));
            }
        }
    }

    embed.image = Some(EmbedMedia {
        url: format!("attachment://{FILE_NAME}"),
    });
    embed.footer = Some(EmbedFooter {
        text: "🏃 Sprint Tasks Board".to_owned(),
        icon_url: None,
    });
    embed.timestamp = Some(snapshot.taken_at.to_rfc3339());
    embed
}

/// Build the standup message for `snapshot`.
///
/// Pure: the same snapshot and options always give the same message.
pub fn format(snapshot: &SprintSnapshot, config: &StandupConfig) -> StandupMessage {
    let tag = &config.message.broadcast_tag;
    let summary = summary_line(snapshot, config);

    let mut embeds = vec![
        sprint_embed(snapshot, config),
        metrics::metrics_embed(snapshot, &config.board),
    ];
    for embed in &mut embeds {
        embed.map_texts(|text| escape_mentions(text, tag));
    }

    StandupMessage {
        content: content(snapshot, &config.message, &summary),
        embeds,
        broadcast: config.message.include_broadcast_tag,
    }
}

/// A single-embed notice describing why the run failed.
pub fn failure_notice(err: &StandupError, config: &MessageConfig) -> StandupMessage {
    let description = format!("`{}`\n{}", err.code(), err.message());
    let embed = Embed::new(
        "⚠️ Standup Automation Failed",
        escape_mentions(&description, &config.broadcast_tag),
        FAILURE_COLOR,
    );
    StandupMessage {
        content: String::new(),
        embeds: vec![embed],
        broadcast: false,
    }
}
