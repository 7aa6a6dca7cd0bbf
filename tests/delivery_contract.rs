//! Discord webhook contract tests.
//!
//! Verifies the wire format of the standup post and the mapping of webhook
//! responses onto `DeliveryFailure`.

use serde_json::json;
use standup::config::{DeliveryConfig, WebhookTarget};
use standup::delivery::{DiscordWebhook, WebhookSink};
use standup::error::{DeliveryFailure, StandupError};
use standup::message::embed::Embed;
use standup::{RenderedReport, StandupMessage};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Substring match on a possibly binary (multipart) body.
fn body_has(needle: &'static str) -> impl Fn(&Request) -> bool + Send + Sync + 'static {
    move |request: &Request| String::from_utf8_lossy(&request.body).contains(needle)
}

fn hook(server: &MockServer, config: &DeliveryConfig) -> DiscordWebhook {
    let target = WebhookTarget::parse(&format!("{}/api/webhooks/1/abc", server.uri())).unwrap();
    DiscordWebhook::new(target, config).unwrap()
}

fn message() -> StandupMessage {
    StandupMessage {
        content: "@everyone standup time".into(),
        embeds: vec![Embed::new("🌅 Daily Standup • Demo", "today", 0x5865F2)],
        broadcast: true,
    }
}

fn report() -> RenderedReport {
    RenderedReport {
        png: b"\x89PNG\r\n\x1a\nfake".to_vec(),
        width: 800,
        height: 100,
        rows: 0,
        buckets: 0,
    }
}

fn delivery_kind(err: StandupError) -> DeliveryFailure {
    match err {
        StandupError::Delivery { kind, .. } => kind,
        other => panic!("expected delivery error, got {other}"),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request format
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn standup_post_is_multipart_with_payload_and_png() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/webhooks/1/abc"))
        .and(query_param("wait", "true"))
        .and(body_has("name=\"payload_json\""))
        .and(body_has("filename=\"standup.png\""))
        .and(body_has("\"filename\":\"standup.png\""))
        .and(body_has("\"allowed_mentions\":{\"parse\":[\"everyone\",\"roles\",\"users\"]}"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1234"})))
        .expect(1)
        .mount(&server)
        .await;

    let ack = hook(&server, &DeliveryConfig::default())
        .deliver(&message(), &report())
        .await
        .unwrap();
    assert_eq!(ack.status, 200);
    assert_eq!(ack.message_id.as_deref(), Some("1234"));
}

#[tokio::test]
async fn username_override_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_has("\"username\":\"Standup Bot\""))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = DeliveryConfig {
        username: Some("Standup Bot".into()),
        ..DeliveryConfig::default()
    };
    let ack = hook(&server, &config)
        .deliver(&message(), &report())
        .await
        .unwrap();
    assert_eq!(ack.status, 204);
    assert!(ack.message_id.is_none());
}

#[tokio::test]
async fn notice_is_plain_json_without_attachment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/webhooks/1/abc"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "content": "",
            "allowed_mentions": {"parse": []}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "5"})))
        .expect(1)
        .mount(&server)
        .await;

    let notice = StandupMessage {
        content: String::new(),
        embeds: vec![Embed::new("⚠️ Standup Automation Failed", "boom", 0xE74C3C)],
        broadcast: false,
    };
    hook(&server, &DeliveryConfig::default())
        .notify(&notice)
        .await
        .unwrap();
}

// ────────────────────────────────────────────────────────────────────────────
// Error mapping
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn http_413_is_oversized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&server)
        .await;

    let err = hook(&server, &DeliveryConfig::default())
        .deliver(&message(), &report())
        .await
        .unwrap_err();
    assert_eq!(delivery_kind(err), DeliveryFailure::Oversized);
}

#[tokio::test]
async fn http_400_is_rejected_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Invalid Form Body", "code": 50035
        })))
        .mount(&server)
        .await;

    let err = hook(&server, &DeliveryConfig::default())
        .deliver(&message(), &report())
        .await
        .unwrap_err();
    assert!(err.message().contains("Invalid Form Body"));
    assert_eq!(delivery_kind(err), DeliveryFailure::Rejected { status: 400 });
}

#[tokio::test]
async fn attachment_over_limit_is_never_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = DeliveryConfig {
        max_attachment_bytes: 8,
        ..DeliveryConfig::default()
    };
    let err = hook(&server, &config)
        .deliver(&message(), &report())
        .await
        .unwrap_err();
    assert_eq!(delivery_kind(err), DeliveryFailure::Oversized);
}
