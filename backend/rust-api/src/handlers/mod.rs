use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use mongodb::bson::oid::ObjectId;
use serde_json::json;
use std::sync::Arc;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::metrics;
use crate::services::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut status = "healthy";
    let mut dependencies = serde_json::Map::new();
    let mut all_healthy = true;

    let mongo_health = check_mongodb(&state).await;
    dependencies.insert("mongodb".to_string(), json!(mongo_health));
    if mongo_health.get("status").and_then(|v| v.as_str()) != Some("healthy") {
        all_healthy = false;
        status = "degraded";
    }

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(json!({
            "status": status,
            "service": "anicodes-api",
            "version": env!("CARGO_PKG_VERSION"),
            "dependencies": dependencies
        })),
    )
}

async fn check_mongodb(state: &AppState) -> serde_json::Map<String, serde_json::Value> {
    let mut result = serde_json::Map::new();

    match tokio::time::timeout(
        std::time::Duration::from_secs(1),
        state.mongo.run_command(mongodb::bson::doc! { "ping": 1 }),
    )
    .await
    {
        Ok(Ok(_)) => {
            result.insert("status".to_string(), json!("healthy"));
            result.insert(
                "message".to_string(),
                json!("MongoDB connection successful"),
            );
        }
        Ok(Err(e)) => {
            result.insert("status".to_string(), json!("unhealthy"));
            result.insert("error".to_string(), json!(format!("MongoDB error: {}", e)));
        }
        Err(_) => {
            result.insert("status".to_string(), json!("unhealthy"));
            result.insert("error".to_string(), json!("MongoDB timeout after 1s"));
        }
    }

    result
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}

/// Metrics authentication middleware - protects /metrics endpoint with HTTP Basic Auth
pub async fn metrics_auth_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Get Authorization header
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Check if it's Basic auth
    if !auth_header.starts_with("Basic ") {
        return Err(StatusCode::UNAUTHORIZED);
    }

    // Decode base64 credentials
    let encoded = &auth_header[6..];
    let decoded = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let credentials = String::from_utf8(decoded).map_err(|_| StatusCode::UNAUTHORIZED)?;

    // Get expected credentials from environment variable
    // Format: username:password
    let expected = std::env::var("METRICS_AUTH").unwrap_or_else(|_| "admin:changeme".to_string());

    // Compare credentials
    if credentials != expected {
        return Err(StatusCode::UNAUTHORIZED);
    }

    // Credentials are valid, proceed with request
    Ok(next.run(request).await)
}

pub(crate) fn parse_object_id(value: &str, field: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(value)
        .map_err(|_| ApiError::bad_request(format!("Invalid {}: must be ObjectId", field)))
}

/// First human-readable message out of a validation failure, walking nested
/// structs and lists depth-first.
pub(crate) fn first_validation_message(errors: &ValidationErrors) -> String {
    fn walk(errors: &ValidationErrors) -> Option<String> {
        for kind in errors.errors().values() {
            match kind {
                ValidationErrorsKind::Field(list) => {
                    if let Some(error) = list.first() {
                        if let Some(message) = &error.message {
                            return Some(message.to_string());
                        }
                        return Some(error.code.to_string());
                    }
                }
                ValidationErrorsKind::Struct(inner) => {
                    if let Some(found) = walk(inner) {
                        return Some(found);
                    }
                }
                ValidationErrorsKind::List(map) => {
                    for inner in map.values() {
                        if let Some(found) = walk(inner) {
                            return Some(found);
                        }
                    }
                }
            }
        }
        None
    }

    walk(errors).unwrap_or_else(|| "Invalid request payload".to_string())
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub(crate) fn validation(errors: &ValidationErrors) -> Self {
        ApiError::BadRequest(first_validation_message(errors))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub mod chat;
pub mod courses;
pub mod problems;
pub mod users;

#[cfg(test)]
mod tests {
    use super::first_validation_message;
    use crate::models::course::CourseCreateRequest;
    use validator::Validate;

    #[test]
    fn nested_validation_failures_surface_a_message() {
        let request: CourseCreateRequest = serde_json::from_value(serde_json::json!({
            "title": "Valid",
            "modules": [
                { "title": "", "description": "ok" },
            ],
        }))
        .expect("request should deserialize");

        let errors = request.validate().unwrap_err();
        assert_eq!(first_validation_message(&errors), "Module title is required");
    }

    #[test]
    fn top_level_failures_surface_their_message() {
        let request: CourseCreateRequest =
            serde_json::from_value(serde_json::json!({ "title": "" }))
                .expect("request should deserialize");

        let errors = request.validate().unwrap_err();
        assert_eq!(first_validation_message(&errors), "Course title is required");
    }
}
