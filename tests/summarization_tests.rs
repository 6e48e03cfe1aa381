mod common;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;

use common::ScriptedSummarizer;
use notewise::services::summarizer::{PAYLOAD_FAILURE, TRANSPORT_FAILURE};
use notewise::services::{HttpSummarizer, SummarizeError};
use notewise::workflow::{RequestState, SummarizationWorkflow, SAMPLE_NOTES};

async fn stub_summarize(Json(body): Json<Value>) -> Response {
    match body["text"].as_str().unwrap_or_default() {
        "Hello world" => Json(json!({ "summary": "Greeting." })).into_response(),
        "boom" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "model crashed" })),
        )
            .into_response(),
        "garbage" => "definitely not json".into_response(),
        "blank" => Json(json!({ "summary": "" })).into_response(),
        _ => Json(json!({})).into_response(),
    }
}

async fn spawn_stub() -> SocketAddr {
    let app = Router::new().route("/summarize", post(stub_summarize));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn summarize_via_http(addr: SocketAddr, notes: &str) -> RequestState {
    let summarizer = HttpSummarizer::new(format!("http://{}", addr), None);
    let mut workflow = SummarizationWorkflow::new();
    workflow.set_note_text(notes);
    workflow.submit(&summarizer).await.clone()
}

#[tokio::test]
async fn test_http_success() {
    let addr = spawn_stub().await;
    assert_eq!(
        summarize_via_http(addr, "Hello world").await,
        RequestState::Succeeded("Greeting.".into())
    );
}

#[tokio::test]
async fn test_http_missing_summary() {
    let addr = spawn_stub().await;
    assert_eq!(
        summarize_via_http(addr, "anything else").await,
        RequestState::Failed(PAYLOAD_FAILURE.into())
    );
    assert_eq!(
        summarize_via_http(addr, "blank").await,
        RequestState::Failed(PAYLOAD_FAILURE.into())
    );
}

#[tokio::test]
async fn test_http_server_error_with_json_body() {
    let addr = spawn_stub().await;
    assert_eq!(
        summarize_via_http(addr, "boom").await,
        RequestState::Failed(PAYLOAD_FAILURE.into())
    );
}

#[tokio::test]
async fn test_http_undecodable_body_is_transport_failure() {
    let addr = spawn_stub().await;
    assert_eq!(
        summarize_via_http(addr, "garbage").await,
        RequestState::Failed(TRANSPORT_FAILURE.into())
    );
}

#[tokio::test]
async fn test_http_unreachable_service() {
    // Bind then release a port so nothing is listening on it.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    assert_eq!(
        summarize_via_http(addr, "Hello world").await,
        RequestState::Failed(TRANSPORT_FAILURE.into())
    );
}

#[tokio::test]
async fn test_sends_current_note_text_once() {
    let summarizer = ScriptedSummarizer::new(vec![Ok("Short.".into())]);
    let mut workflow = SummarizationWorkflow::new();
    workflow.set_note_text("Some long notes");

    let state = workflow.submit(&summarizer).await.clone();

    assert_eq!(state, RequestState::Succeeded("Short.".into()));
    assert_eq!(summarizer.sent(), vec!["Some long notes".to_string()]);
}

#[tokio::test]
async fn test_failure_then_retry_succeeds() {
    let summarizer = ScriptedSummarizer::new(vec![
        Err(SummarizeError::Transport("connection refused".into())),
        Ok("Second time lucky.".into()),
    ]);
    let mut workflow = SummarizationWorkflow::new();
    workflow.set_note_text("notes");

    assert_eq!(
        workflow.submit(&summarizer).await,
        &RequestState::Failed(TRANSPORT_FAILURE.into())
    );
    assert!(workflow.can_submit(), "failure returns to an actionable state");
    assert_eq!(
        workflow.submit(&summarizer).await,
        &RequestState::Succeeded("Second time lucky.".into())
    );
}

#[tokio::test]
async fn test_load_sample_resets_any_state() {
    let summarizer = ScriptedSummarizer::new(vec![
        Ok("done".into()),
        Err(SummarizeError::MissingSummary),
    ]);

    let mut workflow = SummarizationWorkflow::new();
    workflow.load_sample();
    assert_eq!(workflow.note_text(), SAMPLE_NOTES);
    assert_eq!(workflow.state(), &RequestState::Idle);

    workflow.set_note_text("a");
    workflow.submit(&summarizer).await;
    workflow.load_sample();
    assert_eq!(workflow.state(), &RequestState::Idle);

    workflow.set_note_text("b");
    workflow.submit(&summarizer).await;
    assert!(matches!(workflow.state(), RequestState::Failed(_)));
    workflow.load_sample();
    assert_eq!(workflow.note_text(), SAMPLE_NOTES);
    assert_eq!(workflow.state(), &RequestState::Idle);
    assert_eq!(workflow.char_count(), SAMPLE_NOTES.chars().count());
}

#[tokio::test]
async fn test_set_note_text_is_idempotent() {
    let mut workflow = SummarizationWorkflow::new();
    assert!(workflow.set_note_text("same"));
    assert!(!workflow.set_note_text("same"));
    assert_eq!(workflow.state(), &RequestState::Idle);
    assert_eq!(workflow.note_text(), "same");
}
