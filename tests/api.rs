//! End-to-end tests for the HTTP API, driving the axum router directly.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use outcall::api::api_router;
use outcall::notifier::{ApprovalPayload, Notifier, NotifierError};
use outcall::providers::{CompletionProvider, ProviderError};
use outcall::service::CampaignService;
use outcall::store::CampaignStore;

// ---------------------------------------------------------------------------
// Stubs and harness
// ---------------------------------------------------------------------------

struct CannedCompletion;

#[async_trait]
impl CompletionProvider for CannedCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        Ok("Canned script.".to_owned())
    }

    fn model_id(&self) -> &str {
        "stub/canned"
    }
}

struct AcceptingNotifier;

#[async_trait]
impl Notifier for AcceptingNotifier {
    async fn notify(&self, _payload: &ApprovalPayload) -> Result<(), NotifierError> {
        Ok(())
    }
}

fn test_app() -> (Router, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("create temp dir");
    std::fs::write(
        dir.path().join("knowledge_base.json"),
        r#"{"company_name": "Acme", "faq": {}}"#,
    )
    .expect("write knowledge base");
    std::fs::write(
        dir.path().join("prompt.txt"),
        "Company {company_name}, purpose {purpose}, tone {tone}, faq {faq}, msg {user_message}",
    )
    .expect("write template");

    let service = Arc::new(CampaignService::new(
        CampaignStore::open(dir.path().join("campaigns.json")),
        Arc::new(CannedCompletion),
        Arc::new(AcceptingNotifier),
        dir.path().join("knowledge_base.json"),
        dir.path().join("prompt.txt"),
    ));
    (api_router(service), dir)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, value)
}

fn generate_script_body() -> Value {
    json!({
        "campaign_name": "Spring Launch",
        "campaign_purpose": "Announce the new plan",
        "tone": "Professional",
        "voice": "female",
        "numbers": ["+1 234-5678901", "abc"]
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_campaign_lifecycle_over_http() {
    let (app, _dir) = test_app();

    // Generate.
    let (status, body) = post_json(&app, "/generate-script", generate_script_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["script"], "Canned script.");
    assert_eq!(body["cleaned_numbers"], json!(["+12345678901"]));
    let campaign_id = body["campaign_id"].as_str().expect("id present").to_owned();

    // Approve.
    let (status, body) = post_json(
        &app,
        "/approve-campaign",
        json!({"campaign_id": campaign_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["campaign_id"], campaign_id);

    // Approve again: still OK, no-op message.
    let (status, body) = post_json(
        &app,
        "/approve-campaign",
        json!({"campaign_id": campaign_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "campaign already approved");

    // Record a call outcome.
    let (status, body) = post_json(
        &app,
        "/call-status-webhook",
        json!({
            "campaign_id": campaign_id,
            "phone_number": "+12345678901",
            "call_status": "completed",
            "duration": 35
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "call log updated");

    // Summarize.
    let (status, body) = post_json(
        &app,
        "/generate-summary",
        json!({"campaign_id": campaign_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["campaign_summary"], "Canned script.");
}

#[tokio::test]
async fn generate_script_with_no_valid_numbers_is_400() {
    let (app, _dir) = test_app();

    let mut body = generate_script_body();
    body["numbers"] = json!(["abc", "123"]);
    let (status, body) = post_json(&app, "/generate-script", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "no valid phone numbers provided");
}

#[tokio::test]
async fn unknown_campaign_id_is_404_with_detail_body() {
    let (app, _dir) = test_app();
    let missing = json!({"campaign_id": "00000000-0000-4000-8000-000000000000"});

    for uri in ["/approve-campaign", "/generate-summary"] {
        let (status, body) = post_json(&app, uri, missing.clone()).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "uri: {uri}");
        assert_eq!(body["detail"], "campaign not found", "uri: {uri}");
    }

    let (status, body) = post_json(
        &app,
        "/call-status-webhook",
        json!({
            "campaign_id": "00000000-0000-4000-8000-000000000000",
            "phone_number": "+12345678901",
            "call_status": "completed",
            "duration": 1
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "campaign not found");
}

#[tokio::test]
async fn malformed_campaign_id_is_404_with_detail_body() {
    let (app, _dir) = test_app();
    let garbage = json!({"campaign_id": "not-a-uuid"});

    for uri in ["/approve-campaign", "/generate-summary"] {
        let (status, body) = post_json(&app, uri, garbage.clone()).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "uri: {uri}");
        assert_eq!(body["detail"], "campaign not found", "uri: {uri}");
    }

    let (status, body) = post_json(
        &app,
        "/call-status-webhook",
        json!({
            "campaign_id": "not-a-uuid",
            "phone_number": "+12345678901",
            "call_status": "completed",
            "duration": 1
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "campaign not found");
}

#[tokio::test]
async fn missing_prompt_documents_are_500() {
    let (app, dir) = test_app();
    std::fs::remove_file(dir.path().join("knowledge_base.json")).expect("remove knowledge");

    let (status, body) = post_json(&app, "/generate-script", generate_script_body()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().expect("detail present");
    assert!(detail.contains("knowledge base missing"));
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _dir) = test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build request");
    let response = app.oneshot(request).await.expect("router should respond");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body: Value = serde_json::from_slice(&bytes).expect("JSON body");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
