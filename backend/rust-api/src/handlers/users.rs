use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    extractors::AppJson,
    handlers::{parse_object_id, ApiError},
    models::solved::{SolvedProblemView, SubmissionRequest},
    models::user::{
        EnrollRequest, FinalQuizProgress, FinalQuizResultRequest, LessonCompletionRequest,
        UserCreateRequest, UserProfileView, UserProgressView,
    },
    services::{
        progress_service::{ProgressError, ProgressService},
        AppState,
    },
};

impl From<ProgressError> for ApiError {
    fn from(error: ProgressError) -> Self {
        match error {
            ProgressError::UserNotFound
            | ProgressError::CourseNotFound
            | ProgressError::ProblemNotFound => ApiError::NotFound(error.to_string()),
            ProgressError::FinalQuizUnavailable => ApiError::BadRequest(error.to_string()),
            ProgressError::Other(inner) => ApiError::from(inner),
        }
    }
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<UserCreateRequest>,
) -> Result<(StatusCode, Json<UserProfileView>), ApiError> {
    payload
        .validate()
        .map_err(|errors| ApiError::validation(&errors))?;

    let service = ProgressService::new(&state);
    let profile = service.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProgressView>, ApiError> {
    let user_obj = parse_object_id(&user_id, "user_id")?;
    let service = ProgressService::new(&state);
    let progress = service.get_progress(&user_obj).await?;
    Ok(Json(progress))
}

pub async fn enroll(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    AppJson(payload): AppJson<EnrollRequest>,
) -> Result<Json<UserProfileView>, ApiError> {
    payload
        .validate()
        .map_err(|errors| ApiError::validation(&errors))?;

    let user_obj = parse_object_id(&user_id, "user_id")?;
    let course_obj = parse_object_id(&payload.course_id, "courseId")?;
    let service = ProgressService::new(&state);
    let profile = service.enroll(&user_obj, &course_obj).await?;
    Ok(Json(profile))
}

pub async fn record_lesson_completion(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    AppJson(payload): AppJson<LessonCompletionRequest>,
) -> Result<Json<UserProgressView>, ApiError> {
    payload
        .validate()
        .map_err(|errors| ApiError::validation(&errors))?;

    let user_obj = parse_object_id(&user_id, "user_id")?;
    let course_obj = parse_object_id(&payload.course_id, "courseId")?;
    let service = ProgressService::new(&state);
    let progress = service
        .record_lesson_completion(&user_obj, &course_obj, payload.module_id, &payload.lesson_title)
        .await?;
    Ok(Json(progress))
}

pub async fn record_final_quiz(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    AppJson(payload): AppJson<FinalQuizResultRequest>,
) -> Result<Json<FinalQuizProgress>, ApiError> {
    payload
        .validate()
        .map_err(|errors| ApiError::validation(&errors))?;

    let user_obj = parse_object_id(&user_id, "user_id")?;
    let course_obj = parse_object_id(&payload.course_id, "courseId")?;
    let service = ProgressService::new(&state);
    let result = service
        .record_final_quiz(
            &user_obj,
            &course_obj,
            payload.module_id,
            payload.score,
            payload.solved_question_ids,
        )
        .await?;
    Ok(Json(result))
}

pub async fn record_submission(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    AppJson(payload): AppJson<SubmissionRequest>,
) -> Result<(StatusCode, Json<SolvedProblemView>), ApiError> {
    payload
        .validate()
        .map_err(|errors| ApiError::validation(&errors))?;

    let user_obj = parse_object_id(&user_id, "user_id")?;
    let service = ProgressService::new(&state);
    let solved = service.record_submission(&user_obj, payload).await?;
    Ok((StatusCode::CREATED, Json(solved)))
}
