use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

async fn post_course(app: &axum::Router, payload: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/courses")
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
async fn create_course_rejects_blank_title() {
    let app = common::create_test_app().await;

    let (status, body) = post_course(&app, json!({ "title": "" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Course title is required");
}

#[tokio::test]
async fn create_course_rejects_blank_module_title() {
    let app = common::create_test_app().await;

    let (status, body) = post_course(
        &app,
        json!({
            "title": "Rust for Juniors",
            "modules": [
                { "title": "", "description": "Getting started" },
            ],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Module title is required");
}

#[tokio::test]
async fn create_course_rejects_blank_lesson_content() {
    let app = common::create_test_app().await;

    let (status, body) = post_course(
        &app,
        json!({
            "title": "Rust for Juniors",
            "modules": [
                {
                    "title": "Basics",
                    "description": "Getting started",
                    "lessons": [
                        { "title": "Ownership", "content": "" },
                    ],
                },
            ],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Lesson content is required");
}

#[tokio::test]
async fn create_course_rejects_malformed_json() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/courses")
                .header("content-type", "application/json")
                .body(Body::from("{not valid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn get_course_rejects_malformed_id() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/courses/not-an-objectid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Invalid course_id: must be ObjectId");
}
