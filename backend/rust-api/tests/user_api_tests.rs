use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

// Well-formed ObjectId that does not need to exist; requests using it are
// expected to fail validation before any lookup happens.
const VALID_OID: &str = "68a1f08b2c3d4e5f6a7b8c9d";

async fn post_json(app: &axum::Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
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
async fn create_user_rejects_blank_name() {
    let app = common::create_test_app().await;

    let (status, body) = post_json(&app, "/api/users", json!({ "name": "" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name must be between 1 and 100 characters");
}

#[tokio::test]
async fn create_user_rejects_implausible_age() {
    let app = common::create_test_app().await;

    let (status, body) = post_json(&app, "/api/users", json!({ "name": "Asha", "age": 200 })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Age must be plausible");
}

#[tokio::test]
async fn enroll_rejects_blank_course_id() {
    let app = common::create_test_app().await;

    let uri = format!("/api/users/{}/enrollments", VALID_OID);
    let (status, body) = post_json(&app, &uri, json!({ "courseId": "" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "courseId is required");
}

#[tokio::test]
async fn enroll_rejects_malformed_course_id() {
    let app = common::create_test_app().await;

    let uri = format!("/api/users/{}/enrollments", VALID_OID);
    let (status, body) = post_json(&app, &uri, json!({ "courseId": "not-hex" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid courseId: must be ObjectId");
}

#[tokio::test]
async fn enroll_rejects_malformed_user_id() {
    let app = common::create_test_app().await;

    let (status, body) = post_json(
        &app,
        "/api/users/not-an-objectid/enrollments",
        json!({ "courseId": VALID_OID }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid user_id: must be ObjectId");
}

#[tokio::test]
async fn progress_rejects_malformed_user_id() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/users/123abc/progress")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Invalid user_id: must be ObjectId");
}

#[tokio::test]
async fn lesson_completion_rejects_blank_title() {
    let app = common::create_test_app().await;

    let uri = format!("/api/users/{}/progress/lessons", VALID_OID);
    let (status, body) = post_json(
        &app,
        &uri,
        json!({ "courseId": VALID_OID, "moduleId": 2, "lessonTitle": "" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "lessonTitle is required");
}

#[tokio::test]
async fn final_quiz_rejects_out_of_range_score() {
    let app = common::create_test_app().await;

    let uri = format!("/api/users/{}/progress/final-quiz", VALID_OID);
    let (status, body) = post_json(
        &app,
        &uri,
        json!({ "courseId": VALID_OID, "moduleId": 2, "score": 101 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Score must be a percentage");
}

#[tokio::test]
async fn submission_rejects_blank_code() {
    let app = common::create_test_app().await;

    let uri = format!("/api/users/{}/solved", VALID_OID);
    let (status, body) = post_json(
        &app,
        &uri,
        json!({ "problemId": "two-sum", "source": "practice", "code": "" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Submission code is required");
}
