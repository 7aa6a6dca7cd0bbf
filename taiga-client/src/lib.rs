//! # taiga-client
//!
//! Minimal asynchronous client for the Taiga project-management REST API.
//!
//! It covers exactly what a daily standup report needs:
//!
//! - `normal` username/password login returning a bearer token
//! - project lookup by slug
//! - sprints (milestones) and current-sprint selection
//! - tasks (project-wide or per sprint) and user stories
//!
//! ## Security
//!
//! - Passwords and tokens are redacted from `Debug` output
//! - Request URLs are logged at debug level; credentials never are

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod sprint;
pub mod types;

pub use client::TaigaClient;
pub use config::TaigaConfig;
pub use error::{Result, TaigaError};
pub use sprint::current_sprint;
pub use types::{Credentials, Milestone, Project, SessionToken, WorkItem};
