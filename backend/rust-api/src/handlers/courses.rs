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
    models::course::{CourseCreateRequest, CourseView},
    services::{course_service::CourseService, AppState},
};

pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CourseView>>, ApiError> {
    let service = CourseService::new(&state);
    let courses = service.list_courses().await.map_err(|error| {
        tracing::error!("Failed to fetch courses: {:#}", error);
        ApiError::Internal("Failed to fetch courses".to_string())
    })?;
    Ok(Json(courses))
}

pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
) -> Result<Json<CourseView>, ApiError> {
    let service = CourseService::new(&state);
    let course_obj = parse_object_id(&course_id, "course_id")?;
    let course = service
        .get_course(&course_obj)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;
    Ok(Json(course))
}

pub async fn create_course(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<CourseCreateRequest>,
) -> Result<(StatusCode, Json<CourseView>), ApiError> {
    payload
        .validate()
        .map_err(|errors| ApiError::validation(&errors))?;

    let service = CourseService::new(&state);
    let course = service.create_course(payload).await.map_err(|error| {
        tracing::error!("Failed to create course: {:#}", error);
        ApiError::Internal("Failed to create course".to_string())
    })?;
    Ok((StatusCode::CREATED, Json(course)))
}
