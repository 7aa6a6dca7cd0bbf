//! Current-sprint selection.

use crate::types::Milestone;
use chrono::{DateTime, NaiveDate};

/// Parse a Taiga milestone date.
///
/// Taiga normally sends plain `YYYY-MM-DD`; some self-hosted instances send
/// full RFC 3339 timestamps instead.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Pick the sprint the team is working in on `today`.
///
/// The first sprint whose `[estimated_start, estimated_finish]` range
/// contains `today` wins. When none does, the sprint with the latest
/// `estimated_start` is returned; `None` only when there are no sprints.
pub fn current_sprint(milestones: &[Milestone], today: NaiveDate) -> Option<&Milestone> {
    let active = milestones.iter().find(|m| {
        let start = m.estimated_start.as_deref().and_then(parse_day);
        let finish = m.estimated_finish.as_deref().and_then(parse_day);
        matches!((start, finish), (Some(s), Some(f)) if s <= today && today <= f)
    });
    if active.is_some() {
        return active;
    }

    // Same ordering as comparing the raw strings; missing starts sort first.
    milestones
        .iter()
        .rev()
        .max_by(|a, b| {
            let a = a.estimated_start.as_deref().unwrap_or("");
            let b = b.estimated_start.as_deref().unwrap_or("");
            a.cmp(b)
        })
}
