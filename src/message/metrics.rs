//! Team metrics embed: Kanban health, blockers, per-person workload and
//! completion bars.

use super::embed::{clip, Embed, EmbedField, EmbedFooter};
use super::{assignee_handle, item_ref, SEPARATOR};
use crate::config::{status_matches, BoardConfig};
use crate::snapshot::{with_status, Completion, SprintSnapshot, TaskItem};
use std::collections::BTreeMap;

const METRICS_COLOR: u32 = 0x3498DB;
const BAR_LENGTH: usize = 10;
const BLOCKER_TITLE_CHARS: usize = 50;
/// Workload fields per row before a spacer.
const USERS_PER_ROW: usize = 3;

/// `█` per full 10%, `░` for the rest.
pub fn progress_bar(percent: u32) -> String {
    let filled = ((percent / 10) as usize).min(BAR_LENGTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_LENGTH - filled))
}

/// 🟢 when nothing is blocked, 🟡 for one or two blockers, 🔴 beyond.
pub fn health_dot(blocked: usize) -> &'static str {
    match blocked {
        0 => "🟢",
        1 | 2 => "🟡",
        _ => "🔴",
    }
}

/// 🟢 up to two active stories, 🟡 up to four, 🔴 beyond.
pub fn workload_dot(active: usize) -> &'static str {
    match active {
        0..=2 => "🟢",
        3..=4 => "🟡",
        _ => "🔴",
    }
}

fn blockers_field(blocked: &[&TaskItem], board: &BoardConfig) -> Option<EmbedField> {
    if blocked.is_empty() {
        return None;
    }
    let lines: Vec<String> = blocked
        .iter()
        .take(board.max_blocked)
        .map(|story| {
            format!(
                "🚨 **{}** {} • {}",
                item_ref(story),
                clip(&story.title, BLOCKER_TITLE_CHARS),
                assignee_handle(story)
            )
        })
        .collect();
    Some(EmbedField::new(
        "⚠️ BLOCKED - Needs Immediate Attention",
        lines.join("\n"),
        false,
    ))
}

/// Emoji/count pairs for `stories`, in Kanban column order.
fn status_breakdown(stories: &[&TaskItem], board: &BoardConfig) -> String {
    board
        .kanban_columns
        .iter()
        .filter_map(|column| {
            let count = stories.iter().filter(|s| status_matches(&s.status, &column.status)).count();
            (count > 0).then(|| format!("{}{count}", column.emoji))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn workload_fields(stories: &[TaskItem], board: &BoardConfig) -> Vec<EmbedField> {
    let mut by_user: BTreeMap<&str, Vec<&TaskItem>> = BTreeMap::new();
    let mut unassigned = 0;
    for story in stories {
        if board
            .inactive_statuses
            .iter()
            .any(|s| status_matches(s, &story.status))
        {
            continue;
        }
        match story.assignee.as_deref() {
            Some(user) => by_user.entry(user).or_default().push(story),
            None => unassigned += 1,
        }
    }

    let mut fields = Vec::new();
    for (i, (user, active)) in by_user.iter().enumerate() {
        fields.push(EmbedField::new(
            format!("{} @{user}", workload_dot(active.len())),
            format!(
                "**{}** active\n{}",
                active.len(),
                status_breakdown(active, board)
            ),
            true,
        ));
        if (i + 1) % USERS_PER_ROW == 0 {
            fields.push(EmbedField::spacer());
        }
    }
    if unassigned > 0 {
        fields.push(EmbedField::new(
            "⚠️ Unassigned",
            format!("**{unassigned}** stories"),
            true,
        ));
    }
    fields
}

fn metric_field(title: &str, completion: Completion, unit: &str) -> EmbedField {
    let pct = completion.percent();
    EmbedField::new(
        title,
        format!(
            "{}\n**{}/{}** {unit}\n({pct}%)",
            progress_bar(pct),
            completion.done,
            completion.total
        ),
        true,
    )
}

/// Build the metrics embed.
pub fn metrics_embed(snapshot: &SprintSnapshot, board: &BoardConfig) -> Embed {
    let kanban = Completion::by_status(&snapshot.stories, board);
    let blocked = with_status(&snapshot.stories, &board.blocked_status);

    let mut description = format!(
        "📋 **Kanban**: {}/{} stories complete ({}%) {}\n",
        kanban.done,
        kanban.total,
        kanban.percent(),
        health_dot(blocked.len())
    );
    if !blocked.is_empty() {
        description.push_str(&format!("🚫 **{}** blocked items\n", blocked.len()));
    }
    description.push('\n');
    description.push_str(SEPARATOR);

    let mut embed = Embed::new("📊 Team Metrics & Workload", description, METRICS_COLOR);
    if let Some(field) = blockers_field(&blocked, board) {
        embed.push_field(field);
    }
    for field in workload_fields(&snapshot.stories, board) {
        embed.push_field(field);
    }

    embed.push_field(EmbedField::spacer());
    if snapshot.sprint.is_some() && !snapshot.tasks.is_empty() {
        embed.push_field(metric_field(
            "🏃 Sprint Progress",
            Completion::by_closed(&snapshot.tasks),
            "tasks",
        ));
    }
    embed.push_field(metric_field("📈 Story Progress", kanban, "stories"));
    embed.push_field(metric_field(
        "✓ Task Completion",
        Completion::by_closed(&snapshot.project_tasks),
        "tasks",
    ));

    embed.footer = Some(EmbedFooter {
        text: "👥 Team Workload | 📊 Velocity Metrics".to_owned(),
        icon_url: None,
    });
    embed.timestamp = Some(snapshot.taken_at.to_rfc3339());
    embed
}
