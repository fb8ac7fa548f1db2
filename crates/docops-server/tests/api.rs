//! End-to-end API tests: requests go through the full router against a
//! temporary SQLite database.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use docops_analyze::{Analyzer, ClassificationClient};
use docops_core::{DataPaths, DocOpsConfig, Error};
use docops_server::{build_router, AppState};
use docops_store::SqliteStore;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const INVOICE: &str = "INVOICE\nInvoice Number: INV-2024-0315\nBill To: Globex\nAmount Due: $5,400.00\nPayment due within 30 days.";

fn test_app_with(analyzer: Analyzer) -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = DocOpsConfig {
        port: 0,
        data_paths: DataPaths::new(dir.path()).unwrap(),
        mock_ai: true,
        max_upload_mb: 1,
    };
    let store = SqliteStore::open(&config.data_paths.db).unwrap();
    let state = Arc::new(AppState::with_analyzer(config, store, analyzer));
    (build_router(state), dir)
}

fn test_app() -> (Router, TempDir) {
    test_app_with(Analyzer::heuristic())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn multipart_request(file_name: &str, mime: &str, content: &[u8]) -> Request<Body> {
    let boundary = "docops-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(
        format!(
            "\r\n--{boundary}\r\nContent-Disposition: form-data; name=\"mockMode\"\r\n\r\ntrue\r\n--{boundary}--\r\n"
        )
        .as_bytes(),
    );
    Request::builder()
        .method(Method::POST)
        .uri("/api/analyze")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn analyze_invoice(app: &Router) -> Value {
    let (status, body) = send(
        app,
        json_request(Method::POST, "/api/analyze", json!({ "text": INVOICE })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

async fn create_invoice_case(app: &Router) -> String {
    let analyzed = analyze_invoice(app).await;
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/cases",
            json!({
                "fileName": "invoice.txt",
                "fileType": "txt",
                "originalText": INVOICE,
                "analysisResult": analyzed["analysis"],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["case"]["id"].as_str().unwrap().to_string()
}

struct FailingClient;

#[async_trait]
impl ClassificationClient for FailingClient {
    async fn complete_json(&self, _system: &str, _user: &str) -> docops_core::Result<String> {
        Err(Error::Llm("connection refused".into()))
    }

    fn provider_name(&self) -> &str {
        "groq"
    }

    fn model_name(&self) -> &str {
        "test-model"
    }
}

#[tokio::test]
async fn test_analyze_json_text() {
    let (app, _dir) = test_app();
    let body = analyze_invoice(&app).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["analysis"]["docType"], "invoice");
    assert_eq!(body["analysis"]["ownerTeam"], "AP");
    assert_eq!(body["extractedText"], INVOICE);
    assert_eq!(body["metadata"]["fileType"], "paste");
    assert!(body["metadata"]["analyzedAt"].is_string());
    assert!(body["analysis"]["decisionSignals"].as_array().unwrap().len() >= 3);
}

#[tokio::test]
async fn test_analyze_rejects_bad_input() {
    let (app, _dir) = test_app();

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/analyze", json!({ "mockMode": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No text provided");

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/analyze", json!({ "text": "  short  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Document content is too short for analysis");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/analyze")
        .header("content-type", "text/plain")
        .body(Body::from(INVOICE))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid content type");
}

#[tokio::test]
async fn test_analyze_multipart_upload() {
    let (app, _dir) = test_app();

    let (status, body) = send(
        &app,
        multipart_request("invoice.txt", "text/plain", INVOICE.as_bytes()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["fileName"], "invoice.txt");
    assert_eq!(body["metadata"]["fileType"], "txt");
    assert_eq!(body["analysis"]["docType"], "invoice");

    let (status, body) = send(
        &app,
        multipart_request("photo.png", "image/png", b"\x89PNG not a document"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Unsupported file format. Please upload PDF, DOCX, or TXT files."
    );

    let oversized = vec![b'a'; 1024 * 1024 + 512];
    let (status, body) = send(
        &app,
        multipart_request("big.txt", "text/plain", &oversized),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "File too large. Maximum size is 1MB.");
}

#[tokio::test]
async fn test_analyze_model_failure_is_500() {
    let (app, _dir) = test_app_with(Analyzer::new(Some(Arc::new(FailingClient)), false));

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/analyze", json!({ "text": INVOICE })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to analyze document. Please try again.");

    // mockMode bypasses the model entirely.
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/analyze",
            json!({ "text": INVOICE, "mockMode": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["docType"], "invoice");
}

#[tokio::test]
async fn test_case_lifecycle() {
    let (app, _dir) = test_app();
    let id = create_invoice_case(&app).await;

    let (status, body) = send(&app, get(&format!("/api/cases/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["case"]["docType"], "invoice");
    assert_eq!(body["case"]["status"], "new");
    assert_eq!(body["case"]["auditEvents"].as_array().unwrap().len(), 1);
    assert_eq!(body["case"]["auditEvents"][0]["eventType"], "created");

    let (status, body) = send(
        &app,
        json_request(
            Method::PATCH,
            &format!("/api/cases/{id}"),
            json!({ "status": "in_progress" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["case"]["status"], "in_progress");

    let (_, body) = send(&app, get(&format!("/api/cases/{id}/audit"))).await;
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert!(events
        .iter()
        .any(|e| e["eventType"] == "status_changed"
            && e["description"] == "Status changed from new to in_progress"));

    let (status, body) = send(&app, get("/api/cases?status=in_progress&team=AP")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"], id.as_str());

    let (_, body) = send(&app, get("/api/cases?status=resolved")).await;
    assert_eq!(body["data"]["total"], 0);

    let (status, _) = send(&app, get("/api/cases?priority=whenever")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/cases/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Case deleted successfully");

    let (status, body) = send(&app, get(&format!("/api/cases/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Case not found");
}

#[tokio::test]
async fn test_list_cases_huge_page() {
    let (app, _dir) = test_app();
    create_invoice_case(&app).await;

    let (status, body) = send(
        &app,
        get(&format!("/api/cases?page={}&limit=100", usize::MAX)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert!(body["data"]["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_case_validation_and_duplicates() {
    let (app, _dir) = test_app();

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/cases", json!({ "originalText": INVOICE })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    let id = create_invoice_case(&app).await;

    let analyzed = analyze_invoice(&app).await;
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/cases",
            json!({ "originalText": INVOICE, "analysisResult": analyzed["analysis"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["existingCaseId"], id.as_str());
}

#[tokio::test]
async fn test_create_case_with_classification_override() {
    let (app, _dir) = test_app();
    let analyzed = analyze_invoice(&app).await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/cases",
            json!({
                "originalText": INVOICE,
                "analysisResult": analyzed["analysis"],
                "classificationConfirmation": {
                    "ownerTeam": "Finance",
                    "priority": "high",
                    "reason": "Large amount",
                    "hasOverride": true,
                    "confirmedAt": "2024-03-01T10:00:00.000Z",
                },
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["case"]["ownerTeam"], "Finance");
    assert_eq!(body["case"]["priority"], "high");
}

#[tokio::test]
async fn test_update_unknown_case_is_404() {
    let (app, _dir) = test_app();
    let (status, _) = send(
        &app,
        json_request(
            Method::PATCH,
            "/api/cases/does-not-exist",
            json!({ "status": "resolved" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notes_and_audit() {
    let (app, _dir) = test_app();
    let id = create_invoice_case(&app).await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/cases/{id}/notes"),
            json!({ "content": "Called vendor about terms", "noteType": "followup" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["note"]["noteType"], "followup");
    assert_eq!(body["note"]["author"], "User");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/cases/{id}/notes"),
            json!({ "content": "   " }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Note content is required");

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/cases/missing/notes",
            json!({ "content": "hello" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, get(&format!("/api/cases/{id}/notes"))).await;
    assert_eq!(body["notes"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/cases/{id}/audit"),
            json!({
                "eventType": "email_sent",
                "description": "Sent draft email to vendor",
                "metadata": { "to": "ap@globex.com" },
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["eventType"], "email_sent");
    assert_eq!(body["event"]["metadata"]["to"], "ap@globex.com");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/cases/{id}/audit"),
            json!({ "eventType": "edited" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Event type and description are required");

    // created + note_added + email_sent
    let (_, body) = send(&app, get(&format!("/api/cases/{id}/audit"))).await;
    assert_eq!(body["events"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_stats() {
    let (app, _dir) = test_app();

    let (status, body) = send(&app, get("/api/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["total"], 0);
    assert_eq!(body["stats"]["byStatus"]["new"], 0);

    create_invoice_case(&app).await;

    let (_, body) = send(&app, get("/api/stats")).await;
    assert_eq!(body["stats"]["total"], 1);
    assert_eq!(body["stats"]["today"], 1);
    assert_eq!(body["stats"]["thisWeek"], 1);
    assert_eq!(body["stats"]["byStatus"]["new"], 1);
    assert_eq!(body["stats"]["byTeam"]["AP"], 1);
    assert_eq!(body["stats"]["byDocType"]["invoice"], 1);
}

#[tokio::test]
async fn test_llm_config_masks_keys() {
    let (app, dir) = test_app();

    let (status, body) = send(&app, get("/api/llm/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["config"]["preferredProvider"], "auto");
    assert!(body["config"]["activeProvider"].is_null());

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/llm/config",
            json!({ "groqApiKey": "gsk_abcdef123456" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["config"]["groqKey"], "gsk_…3456");
    assert_eq!(body["config"]["activeProvider"], "groq");
    assert!(dir.path().join("llm-config.json").is_file());

    // MOCK_AI keeps the heuristic path even with a key configured.
    let (_, body) = send(&app, get("/api/llm/status")).await;
    assert_eq!(body["provider"], "groq");
    assert_eq!(body["mockMode"], true);
    assert_eq!(body["llmAvailable"], false);
}

#[tokio::test]
async fn test_llm_config_unchanged_when_save_fails() {
    let (app, dir) = test_app();
    // A directory where the config file should go makes the write fail.
    std::fs::create_dir_all(dir.path().join("llm-config.json")).unwrap();

    let (status, _) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/llm/config",
            json!({ "groqApiKey": "gsk_abcdef123456" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, body) = send(&app, get("/api/llm/config")).await;
    assert!(body["config"]["groqKey"].is_null());
    assert!(body["config"]["activeProvider"].is_null());
}
