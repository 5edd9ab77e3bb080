use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use validator::Validate;

use crate::{
    extractors::AppJson,
    handlers::ApiError,
    models::problem::{ProblemCreateRequest, ProblemView},
    services::{problem_service::ProblemService, AppState},
};

pub async fn list_problems(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProblemView>>, ApiError> {
    let service = ProblemService::new(&state);
    let problems = service.list_problems().await?;
    Ok(Json(problems))
}

/// Creation failures surface the underlying message verbatim, including the
/// duplicate-id case.
pub async fn create_problem(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<ProblemCreateRequest>,
) -> Result<(StatusCode, Json<ProblemView>), ApiError> {
    payload
        .validate()
        .map_err(|errors| ApiError::validation(&errors))?;

    let service = ProblemService::new(&state);
    let problem = service.create_problem(payload).await?;
    Ok((StatusCode::CREATED, Json(problem)))
}
