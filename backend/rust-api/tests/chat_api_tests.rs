use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

async fn post_chat(app: &axum::Router, payload: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/gemini-chat")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    (status, json)
}

#[tokio::test]
async fn chat_rejects_empty_payload() {
    let app = common::create_test_app().await;

    let (status, body) = post_chat(&app, json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message is required");
    // Client-side errors carry no upstream details
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn chat_rejects_whitespace_message() {
    let app = common::create_test_app().await;

    let (status, body) = post_chat(&app, json!({ "message": "   \n\t" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message is required");
}

#[tokio::test]
async fn chat_rejects_blank_message_with_history() {
    let app = common::create_test_app().await;

    // History alone is not enough; the current message must be non-empty.
    let (status, body) = post_chat(
        &app,
        json!({
            "message": "",
            "history": [
                { "role": "user", "parts": "Earlier question" },
                { "role": "model", "parts": [{ "text": "Earlier answer" }] },
            ],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message is required");
}
