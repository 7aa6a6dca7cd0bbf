//! One standup run: authenticate, fetch, render, format, deliver.
//!
//! Steps run strictly in order and the first failure ends the run; nothing
//! is delivered unless every earlier step succeeded.

use crate::config::Settings;
use crate::delivery::{Ack, WebhookSink};
use crate::error::Result;
use crate::message::{self, StandupMessage};
use crate::render::{self, RenderedReport};
use crate::source::SprintSource;

/// Per-invocation switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Build everything but skip delivery.
    pub dry_run: bool,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub message: StandupMessage,
    pub report: RenderedReport,
    /// `None` for dry runs.
    pub ack: Option<Ack>,
}

/// Run the standup once.
///
/// # Errors
///
/// Returns the error of the first step that failed.
pub async fn run<S, D>(
    settings: &Settings,
    source: &S,
    sink: &D,
    options: RunOptions,
) -> Result<RunOutcome>
where
    S: SprintSource,
    D: WebhookSink,
{
    tracing::info!(user = %settings.credentials.username, "authenticating");
    let token = source.authenticate(&settings.credentials).await?;

    tracing::info!(project = %settings.project.slug, "fetching sprint");
    let snapshot = source.fetch_sprint(&token, &settings.project).await?;
    tracing::info!(
        project = %snapshot.project.name,
        sprint = snapshot.sprint.as_ref().map_or("none", |s| s.name.as_str()),
        tasks = snapshot.tasks.len(),
        "sprint fetched"
    );

    let report = render::render(&snapshot, &settings.options.board)?;
    tracing::info!(
        rows = report.rows,
        buckets = report.buckets,
        bytes = report.png.len(),
        "report rendered"
    );
    let message = message::format(&snapshot, &settings.options);

    if options.dry_run {
        tracing::info!("dry run, skipping delivery");
        return Ok(RunOutcome {
            message,
            report,
            ack: None,
        });
    }

    let ack = sink.deliver(&message, &report).await?;
    tracing::info!(
        status = ack.status,
        message_id = ack.message_id.as_deref().unwrap_or("-"),
        "standup delivered"
    );
    Ok(RunOutcome {
        message,
        report,
        ack: Some(ack),
    })
}

/// Run once, posting a failure notice if the run fails.
///
/// Dry runs never post anything, the notice included.
///
/// # Errors
///
/// Returns the run's error after the notice attempt.
pub async fn execute<S, D>(
    settings: &Settings,
    source: &S,
    sink: &D,
    options: RunOptions,
) -> Result<RunOutcome>
where
    S: SprintSource,
    D: WebhookSink,
{
    match run(settings, source, sink, options).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            if !options.dry_run {
                notify_failure(settings, sink, &e).await;
            }
            Err(e)
        }
    }
}

/// Post a failure notice for `err`. Best effort: a failed notice is logged
/// and otherwise ignored.
pub async fn notify_failure<D: WebhookSink>(
    settings: &Settings,
    sink: &D,
    err: &crate::error::StandupError,
) {
    if !settings.options.delivery.notify_on_failure {
        return;
    }
    let notice = message::failure_notice(err, &settings.options.message);
    match sink.notify(&notice).await {
        Ok(_) => tracing::info!("failure notice posted"),
        Err(e) => tracing::warn!(error = %e, "failure notice not delivered"),
    }
}
