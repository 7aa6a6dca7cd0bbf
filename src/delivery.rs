//! Webhook delivery.
//!
//! The standup goes out as a single `multipart/form-data` POST: a
//! `payload_json` part with the message and a `files[0]` part with the PNG.
//! One attempt, no retry.

use crate::config::{DeliveryConfig, WebhookTarget};
use crate::error::{DeliveryFailure, Result, StandupError};
use crate::message::StandupMessage;
use crate::render::{RenderedReport, FILE_NAME, MIME_TYPE};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use std::time::Duration;

/// Longest slice of an error body kept in messages and logs.
const MAX_ERROR_BODY: usize = 300;

/// Successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub status: u16,
    /// Id of the posted message, when the webhook returns one.
    pub message_id: Option<String>,
}

/// Destination for the finished standup.
pub trait WebhookSink: Send + Sync {
    /// Post the message with the report attached.
    ///
    /// # Errors
    ///
    /// Returns [`StandupError::Delivery`] when the payload is too large, the
    /// webhook is unreachable or it rejects the post.
    fn deliver(
        &self,
        message: &StandupMessage,
        report: &RenderedReport,
    ) -> impl std::future::Future<Output = Result<Ack>> + Send;

    /// Post a message without an attachment.
    ///
    /// # Errors
    ///
    /// Same as [`WebhookSink::deliver`].
    fn notify(
        &self,
        message: &StandupMessage,
    ) -> impl std::future::Future<Output = Result<Ack>> + Send;
}

/// The JSON body of a webhook post.
///
/// Mentions are only honoured when the message carries a broadcast tag.
/// `attachment` names the uploaded file that the embeds reference.
pub fn payload_json(
    message: &StandupMessage,
    username: Option<&str>,
    attachment: Option<&str>,
) -> Value {
    let parse = if message.broadcast {
        json!(["everyone", "roles", "users"])
    } else {
        json!([])
    };
    let mut payload = json!({
        "content": message.content,
        "embeds": message.embeds,
        "allowed_mentions": { "parse": parse },
    });
    if let Some(filename) = attachment {
        payload["attachments"] = json!([{ "id": 0, "filename": filename }]);
    }
    if let Some(name) = username {
        payload["username"] = json!(name);
    }
    payload
}

/// Pretty-printed [`payload_json`] for a post carrying the report, as shown
/// by dry runs.
///
/// # Errors
///
/// Returns [`StandupError::Delivery`] with [`DeliveryFailure::Payload`] if
/// the payload cannot be encoded.
pub fn payload_preview(message: &StandupMessage, username: Option<&str>) -> Result<String> {
    serde_json::to_string_pretty(&payload_json(message, username, Some(FILE_NAME))).map_err(|e| {
        StandupError::delivery(DeliveryFailure::Payload, format!("payload encoding: {e}"))
    })
}

fn attachment_part(png: Vec<u8>, mime: &str) -> Result<Part> {
    Part::bytes(png)
        .file_name(FILE_NAME)
        .mime_str(mime)
        .map_err(|e| {
            StandupError::delivery(DeliveryFailure::Payload, format!("attachment part: {e}"))
        })
}

/// [`WebhookSink`] for a Discord-compatible webhook.
#[derive(Debug)]
pub struct DiscordWebhook {
    client: reqwest::Client,
    target: WebhookTarget,
    max_attachment_bytes: usize,
    username: Option<String>,
}

impl DiscordWebhook {
    /// Build a webhook client for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`StandupError::Config`] if the HTTP client cannot be built.
    pub fn new(target: WebhookTarget, config: &DeliveryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(format!("standup/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StandupError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            target,
            max_attachment_bytes: config.max_attachment_bytes,
            username: config.username.clone(),
        })
    }

    /// Webhook URL with `wait=true`, so the response carries the message.
    fn post_url(&self) -> url::Url {
        let mut url = self.target.url().clone();
        if !url.query_pairs().any(|(k, _)| k == "wait") {
            url.query_pairs_mut().append_pair("wait", "true");
        }
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Ack> {
        let response = request.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                "timed out".to_owned()
            } else {
                e.without_url().to_string()
            };
            StandupError::delivery(
                DeliveryFailure::Unreachable,
                format!("webhook {} unreachable: {reason}", self.target),
            )
        })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "webhook responded");

        if status == reqwest::StatusCode::PAYLOAD_TOO_LARGE {
            return Err(StandupError::delivery(
                DeliveryFailure::Oversized,
                format!("webhook {} rejected the payload as too large", self.target),
            ));
        }
        if !status.is_success() {
            let detail: String = body.trim().chars().take(MAX_ERROR_BODY).collect();
            return Err(StandupError::delivery(
                DeliveryFailure::Rejected {
                    status: status.as_u16(),
                },
                format!("webhook {} returned HTTP {status}: {detail}", self.target),
            ));
        }

        let message_id = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("id").and_then(Value::as_str).map(str::to_owned));
        Ok(Ack {
            status: status.as_u16(),
            message_id,
        })
    }
}

impl WebhookSink for DiscordWebhook {
    async fn deliver(&self, message: &StandupMessage, report: &RenderedReport) -> Result<Ack> {
        if report.png.len() > self.max_attachment_bytes {
            return Err(StandupError::delivery(
                DeliveryFailure::Oversized,
                format!(
                    "{FILE_NAME} is {} bytes, limit is {}",
                    report.png.len(),
                    self.max_attachment_bytes
                ),
            ));
        }

        let payload = payload_json(message, self.username.as_deref(), Some(FILE_NAME));
        let file = attachment_part(report.png.clone(), MIME_TYPE)?;
        let form = Form::new()
            .text("payload_json", payload.to_string())
            .part("files[0]", file);

        tracing::debug!(
            webhook = %self.target,
            attachment_bytes = report.png.len(),
            embeds = message.embeds.len(),
            "posting standup"
        );
        self.send(self.client.post(self.post_url()).multipart(form))
            .await
    }

    async fn notify(&self, message: &StandupMessage) -> Result<Ack> {
        let payload = payload_json(message, self.username.as_deref(), None);
        tracing::debug!(webhook = %self.target, "posting notice");
        self.send(self.client.post(self.post_url()).json(&payload))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::embed::Embed;

    fn message(broadcast: bool) -> StandupMessage {
        StandupMessage {
            content: "@everyone hello".into(),
            embeds: vec![Embed::new("t", "d", 1)],
            broadcast,
        }
    }

    #[test]
    fn payload_references_attachment() {
        let payload = payload_json(&message(true), None, Some(FILE_NAME));
        assert_eq!(payload["content"], "@everyone hello");
        assert_eq!(payload["attachments"][0]["filename"], "standup.png");
        assert_eq!(payload["attachments"][0]["id"], 0);
        assert_eq!(payload["embeds"][0]["title"], "t");
        assert!(payload.get("username").is_none());
    }

    #[test]
    fn mentions_only_parsed_with_broadcast() {
        let on = payload_json(&message(true), None, None);
        assert_eq!(on["allowed_mentions"]["parse"][0], "everyone");
        let off = payload_json(&message(false), None, None);
        assert_eq!(off["allowed_mentions"]["parse"], json!([]));
        assert!(off.get("attachments").is_none());
    }

    #[test]
    fn username_override() {
        let payload = payload_json(&message(false), Some("Standup Bot"), None);
        assert_eq!(payload["username"], "Standup Bot");
    }

    #[test]
    fn bad_attachment_type_is_a_payload_failure() {
        let err = attachment_part(vec![1, 2, 3], "not a mime type").unwrap_err();
        assert_eq!(err.exit_code(), 6);
        assert!(matches!(
            err,
            StandupError::Delivery {
                kind: DeliveryFailure::Payload,
                ..
            }
        ));
        assert!(attachment_part(vec![1, 2, 3], MIME_TYPE).is_ok());
    }

    #[test]
    fn preview_is_the_posted_payload() {
        let preview = payload_preview(&message(true), Some("Standup Bot")).unwrap();
        assert!(preview.contains('\n'));
        let parsed: Value = serde_json::from_str(&preview).unwrap();
        assert_eq!(
            parsed,
            payload_json(&message(true), Some("Standup Bot"), Some(FILE_NAME))
        );
    }

    #[test]
    fn post_url_adds_wait_once() {
        let target = WebhookTarget::parse("https://discord.com/api/webhooks/1/abc").unwrap();
        let hook = DiscordWebhook::new(target, &DeliveryConfig::default()).unwrap();
        assert_eq!(
            hook.post_url().as_str(),
            "https://discord.com/api/webhooks/1/abc?wait=true"
        );

        let target =
            WebhookTarget::parse("https://discord.com/api/webhooks/1/abc?wait=false").unwrap();
        let hook = DiscordWebhook::new(target, &DeliveryConfig::default()).unwrap();
        assert_eq!(hook.post_url().query(), Some("wait=false"));
    }

    #[tokio::test]
    async fn oversized_attachment_rejected_before_sending() {
        // Port 1 is never listening; reaching the network would fail differently.
        let target = WebhookTarget::parse("http://127.0.0.1:1/hook").unwrap();
        let config = DeliveryConfig {
            max_attachment_bytes: 4,
            ..DeliveryConfig::default()
        };
        let hook = DiscordWebhook::new(target, &config).unwrap();
        let report = RenderedReport {
            png: vec![0; 16],
            width: 1,
            height: 1,
            rows: 0,
            buckets: 0,
        };
        let err = hook.deliver(&message(false), &report).await.unwrap_err();
        assert!(matches!(
            err,
            StandupError::Delivery {
                kind: DeliveryFailure::Oversized,
                ..
            }
        ));
    }
}
