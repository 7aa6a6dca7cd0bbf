//! Standup: a daily sprint report from Taiga, posted to a Discord webhook.
//!
//! One run is a straight pipeline:
//! Environment → Taiga login → sprint snapshot → {PNG report, message} → webhook
//!
//! # Architecture
//!
//! - **Config**: non-secret options from TOML, secrets from the environment
//! - **Source**: fetches a [`snapshot::SprintSnapshot`] through `taiga-client`
//! - **Render**: draws the snapshot as a PNG summary card
//! - **Message**: formats the snapshot as content plus Discord embeds
//! - **Delivery**: one multipart POST carrying both
//!
//! Every failure is fatal to the run and maps to a distinct exit code.

pub mod config;
pub mod delivery;
pub mod error;
pub mod message;
pub mod pipeline;
pub mod render;
pub mod snapshot;
pub mod source;

pub use config::{Settings, StandupConfig};
pub use delivery::{Ack, DiscordWebhook, WebhookSink};
pub use error::{Result, StandupError};
pub use message::StandupMessage;
pub use pipeline::{execute, run, RunOptions, RunOutcome};
pub use render::RenderedReport;
pub use snapshot::SprintSnapshot;
pub use source::{SprintSource, TaigaSource};
