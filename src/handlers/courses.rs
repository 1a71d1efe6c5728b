// src/handlers/courses.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{
        course::{CourseListParams, EnrollOutcome, Enrollment},
        study::CourseProgress,
    },
    state::AppState,
    utils::jwt::Claims,
};

/// Lists published courses, optionally filtered by specialization.
pub async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<CourseListParams>,
) -> Result<impl IntoResponse, AppError> {
    let specialization = params
        .specialization
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let courses = state.courses.list_courses(specialization).await?;
    Ok(Json(courses))
}

/// Retrieves a single published course by ID.
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let course = state
        .courses
        .find_course(&id)
        .await?
        .filter(|c| c.published)
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    Ok(Json(course))
}

/// Enrolls the current user in a course.
///
/// * 201 with the new enrollment.
/// * 200 with `already_enrolled` when the user/course pair exists; no second row is written.
pub async fn enroll(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .courses
        .find_course(&course_id)
        .await?
        .filter(|c| c.published)
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    let enrollment = Enrollment::new(&claims.sub, &course_id);

    match state.courses.insert_enrollment(&enrollment).await {
        Ok(()) => {
            tracing::info!(user = %claims.sub, course = %course_id, "User enrolled");
            Ok((
                StatusCode::CREATED,
                Json(EnrollOutcome::Enrolled { enrollment }),
            ))
        }
        Err(AppError::Conflict(_)) => Ok((StatusCode::OK, Json(EnrollOutcome::AlreadyEnrolled))),
        Err(e) => Err(e),
    }
}

/// Enrollment check for the current user.
pub async fn get_enrollment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let enrollment = state
        .courses
        .find_enrollment(&claims.sub, &course_id)
        .await?;

    Ok(Json(serde_json::json!({
        "enrolled": enrollment.is_some(),
        "enrollment": enrollment,
    })))
}

/// Study progress of the current user across a course's materials.
pub async fn course_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .courses
        .find_course(&course_id)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    let materials = state.progress.materials_for_course(&course_id).await?;
    let progress = state
        .progress
        .progress_for_course(&claims.sub, &course_id)
        .await?;

    Ok(Json(CourseProgress::build(&course_id, materials, &progress)))
}
