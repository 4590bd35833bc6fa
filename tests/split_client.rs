//! Tests for the iLovePDF client against an in-process stub of the API.

mod common;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use common::{FakeRasterizer, FakeVision, Harness, SPLIT_PDF};
use rangescribe::{DocumentSplitter, ExtractError, Extractor, ILovePdfSplitter, ServiceConfig};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const TASK: &str = "task-123";
const SERVER_FILENAME: &str = "srv-file-1";

#[derive(Default)]
struct Recorded {
    tokens: Vec<String>,
    steps: Vec<&'static str>,
    upload_body: Vec<u8>,
    process_body: Option<Value>,
}

#[derive(Clone)]
struct StubState {
    server: String,
    recorded: Arc<Mutex<Recorded>>,
}

impl StubState {
    fn record(&self, step: &'static str, headers: &HeaderMap) {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or_default()
            .to_string();
        let mut rec = self.recorded.lock().unwrap();
        rec.tokens.push(token);
        rec.steps.push(step);
    }
}

async fn start(State(state): State<StubState>, headers: HeaderMap) -> Json<Value> {
    state.record("start", &headers);
    Json(json!({ "server": state.server, "task": TASK }))
}

async fn upload(State(state): State<StubState>, headers: HeaderMap, body: Bytes) -> Json<Value> {
    state.record("upload", &headers);
    state.recorded.lock().unwrap().upload_body = body.to_vec();
    Json(json!({ "server_filename": SERVER_FILENAME }))
}

async fn process(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.record("process", &headers);
    let bad = body["ranges"] == "bad";
    state.recorded.lock().unwrap().process_body = Some(body);
    if bad {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "type": "ProcessError", "message": "Invalid ranges" } })),
        )
    } else {
        (
            StatusCode::OK,
            Json(json!({ "download_filename": "book.pdf", "output_filenumber": 1 })),
        )
    }
}

async fn download(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(task): Path<String>,
) -> impl IntoResponse {
    state.record("download", &headers);
    assert_eq!(task, TASK);
    SPLIT_PDF.to_vec()
}

/// Start the stub on an ephemeral port and return its base URL.
async fn spawn_stub() -> (String, Arc<Mutex<Recorded>>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let recorded = Arc::new(Mutex::new(Recorded::default()));
    let state = StubState {
        server: base.clone(),
        recorded: Arc::clone(&recorded),
    };

    let app = Router::new()
        .route("/v1/start/split", get(start))
        .route("/v1/upload", post(upload))
        .route("/v1/process", post(process))
        .route("/v1/download/{task}", get(download))
        .with_state(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base, recorded)
}

fn splitter(base: &str) -> ILovePdfSplitter {
    let config = ServiceConfig::builder()
        .ilovepdf_base_url(base)
        .ilovepdf_keys("project_public_test", "secret_test")
        .http_timeout_secs(10)
        .build()
        .unwrap();
    ILovePdfSplitter::from_config(&config).unwrap()
}

#[tokio::test]
async fn split_runs_full_task_sequence() {
    let (base, recorded) = spawn_stub().await;

    let bytes = splitter(&base)
        .split("book.pdf", b"%PDF-1.7 source".to_vec(), "2-3")
        .await
        .expect("split should succeed");

    assert_eq!(bytes, SPLIT_PDF);

    let rec = recorded.lock().unwrap();
    assert_eq!(rec.steps, vec!["start", "upload", "process", "download"]);

    let upload = String::from_utf8_lossy(&rec.upload_body);
    assert!(upload.contains(r#"name="task""#));
    assert!(upload.contains(TASK));
    assert!(upload.contains(r#"filename="book.pdf""#));
    assert!(upload.contains("%PDF-1.7 source"));

    let body = rec.process_body.as_ref().unwrap();
    assert_eq!(body["task"], TASK);
    assert_eq!(body["tool"], "split");
    assert_eq!(body["split_mode"], "ranges");
    assert_eq!(body["ranges"], "2-3");
    assert_eq!(body["merge_after"], true);
    assert_eq!(body["files"][0]["server_filename"], SERVER_FILENAME);
    assert_eq!(body["files"][0]["filename"], "book.pdf");

    for token in &rec.tokens {
        let payload = token.split('.').nth(1).expect("JWT payload");
        let claims: Value = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
        assert_eq!(claims["jti"], "project_public_test");
    }
}

#[tokio::test]
async fn split_surfaces_service_validation_message() {
    let (base, recorded) = spawn_stub().await;

    let err = splitter(&base)
        .split("book.pdf", b"%PDF-1.7".to_vec(), "bad")
        .await
        .unwrap_err();

    match err {
        ExtractError::SplitRejected { step, status, message } => {
            assert_eq!(step, "process");
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid ranges");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!recorded.lock().unwrap().steps.contains(&"download"));
}

#[tokio::test]
async fn unreachable_service_is_request_failure() {
    // Bind and immediately drop a listener to get a port nothing listens on.
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };

    let err = splitter(&format!("http://127.0.0.1:{port}"))
        .split("book.pdf", b"%PDF-1.7".to_vec(), "1")
        .await
        .unwrap_err();

    assert!(
        matches!(err, ExtractError::SplitRequestFailed { step: "start", .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn extractor_runs_against_split_service() {
    let (base, recorded) = spawn_stub().await;
    let h = Harness::new();
    let config = ServiceConfig::builder()
        .source_pdf(h.source_dir.path().join("Student Book.pdf"))
        .temp_root(h.temp_root.path())
        .ilovepdf_base_url(&base)
        .ilovepdf_keys("project_public_test", "secret_test")
        .build()
        .unwrap();
    let extractor = Extractor::with_components(
        config.clone(),
        Arc::new(ILovePdfSplitter::from_config(&config).unwrap()),
        FakeRasterizer::pages(2),
        FakeVision::ok(),
    );

    let output = extractor.extract("5-6").await.unwrap();

    assert_eq!(output.stats.split_bytes, SPLIT_PDF.len());
    assert_eq!(output.text, common::expected_text(2));
    let rec = recorded.lock().unwrap();
    assert_eq!(rec.process_body.as_ref().unwrap()["files"][0]["filename"], "Student Book.pdf");
    assert_eq!(h.leftover_workspaces(), 0);
}
