//! Taiga client contract tests.
//!
//! These tests run the client against a wiremock server and verify:
//! - request format (login body, bearer header, query parameters)
//! - status code mapping to `TaigaError`
//! - tolerance for nulls inside list responses

use serde_json::json;
use taiga_client::{Credentials, SessionToken, TaigaClient, TaigaConfig, TaigaError};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> TaigaClient {
    let config = TaigaConfig {
        api_url: format!("{}/api/v1", server.uri()),
        timeout_seconds: 5,
        ..Default::default()
    };
    TaigaClient::new(config).expect("mock config is valid")
}

fn token() -> SessionToken {
    SessionToken::new("test-token")
}

// ────────────────────────────────────────────────────────────────────────────
// Login
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_sends_normal_credentials_and_returns_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth"))
        .and(body_partial_json(json!({
            "type": "normal",
            "username": "alice",
            "password": "s3cret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "username": "alice",
            "auth_token": "abc.def.ghi"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let token = client
        .authenticate(&Credentials::new("alice", "s3cret"))
        .await
        .expect("login should succeed");
    assert_eq!(token.as_str(), "abc.def.ghi");
}

#[tokio::test]
async fn rejected_login_maps_to_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "_error_message": "No active account found with the given credentials",
            "_error_type": "taiga.base.exceptions.WrongArguments"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .authenticate(&Credentials::new("alice", "wrong"))
        .await
        .unwrap_err();
    match err {
        TaigaError::Auth(msg) => assert!(msg.contains("No active account")),
        other => panic!("expected Auth, got {other:?}"),
    }
}

#[tokio::test]
async fn login_server_error_is_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .authenticate(&Credentials::new("alice", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, TaigaError::Http(ref m) if m.contains("502")));
}

#[tokio::test]
async fn login_without_token_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .authenticate(&Credentials::new("alice", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, TaigaError::Parse(_)));
}

#[tokio::test]
async fn unreachable_server_is_http_error() {
    let config = TaigaConfig {
        api_url: "http://127.0.0.1:1/api/v1".into(),
        timeout_seconds: 2,
        ..Default::default()
    };
    let client = TaigaClient::new(config).expect("valid config");
    let err = client
        .authenticate(&Credentials::new("alice", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, TaigaError::Http(_)));
}

// ────────────────────────────────────────────────────────────────────────────
// Data endpoints
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn project_lookup_sends_bearer_and_slug() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/projects/by_slug"))
        .and(query_param("slug", "demo"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 99,
            "name": "Demo Project",
            "slug": "demo",
            "total_milestones": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let project = client
        .project_by_slug(&token(), "demo")
        .await
        .expect("project lookup should succeed");
    assert_eq!(project.id, 99);
    assert_eq!(project.name, "Demo Project");
    assert!(project.url.is_none());
}

#[tokio::test]
async fn project_url_is_kept_when_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/projects/by_slug"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 99,
            "name": "Demo Project",
            "slug": "demo",
            "url": "https://taiga.example.com/project/demo"
        })))
        .mount(&server)
        .await;

    let project = client_for(&server)
        .project_by_slug(&token(), "demo")
        .await
        .unwrap();
    assert_eq!(
        project.url.as_deref(),
        Some("https://taiga.example.com/project/demo")
    );
}

#[tokio::test]
async fn unknown_slug_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/projects/by_slug"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"_error_message": "Not found."})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.project_by_slug(&token(), "nope").await.unwrap_err();
    match err {
        TaigaError::NotFound(msg) => assert!(msg.contains("nope")),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn sprint_tasks_filter_by_milestone_and_disable_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tasks"))
        .and(query_param("project", "99"))
        .and(query_param("milestone", "5"))
        .and(header("x-disable-pagination", "True"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "ref": 10,
                "subject": "Write the parser",
                "is_closed": true,
                "status_extra_info": {"name": "Done"},
                "assigned_to_extra_info": {"username": "alice"}
            },
            null,
            {
                "id": 2,
                "ref": 11,
                "subject": "Review the parser",
                "is_closed": false,
                "status_extra_info": {"name": "In Progress"},
                "assigned_to_extra_info": null
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let tasks = client
        .tasks(&token(), 99, Some(5))
        .await
        .expect("tasks should load");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].status_name(), "Done");
    assert_eq!(tasks[1].assignee(), None);
}

#[tokio::test]
async fn milestones_and_stories_decode() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/milestones"))
        .and(query_param("project", "99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 5, "name": "Sprint 5", "estimated_start": "2024-03-01", "estimated_finish": "2024-03-14"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/userstories"))
        .and(query_param("project", "99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 3, "ref": 7, "subject": "Login", "status_extra_info": {"name": "Blocked"}}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let sprints = client.milestones(&token(), 99).await.expect("milestones");
    assert_eq!(sprints.len(), 1);
    assert_eq!(sprints[0].estimated_start.as_deref(), Some("2024-03-01"));

    let stories = client.user_stories(&token(), 99).await.expect("stories");
    assert_eq!(stories[0].status_name(), "Blocked");
}

#[tokio::test]
async fn malformed_list_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/milestones"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.milestones(&token(), 99).await.unwrap_err();
    assert!(matches!(err, TaigaError::Parse(_)));
}
