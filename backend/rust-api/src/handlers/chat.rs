use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    extractors::AppJson,
    models::chat::{ChatRequest, ChatResponse},
    services::{
        chat_service::{ChatRelayError, ChatService},
        AppState,
    },
};

impl IntoResponse for ChatRelayError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ChatRelayError::MissingMessage => error_body(StatusCode::BAD_REQUEST, message, Value::Null),
            ChatRelayError::Blocked { details, .. } => {
                error_body(StatusCode::BAD_REQUEST, message, details)
            }
            ChatRelayError::Upstream { details, .. } => {
                error_body(StatusCode::INTERNAL_SERVER_ERROR, message, details)
            }
        }
    }
}

fn error_body(status: StatusCode, message: String, details: Value) -> Response {
    let mut body = json!({ "error": message });
    if !details.is_null() {
        body["details"] = details;
    }
    (status, Json(body)).into_response()
}

pub async fn gemini_chat(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ChatRelayError> {
    let service = ChatService::new(&state);
    let reply = service.relay(payload).await?;
    Ok(Json(reply))
}
