// src/handlers/assessments.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::attempt::AttemptSummary,
    state::AppState,
    utils::jwt::Claims,
};

/// Retrieves an assessment's configuration.
pub async fn get_assessment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let assessment = state
        .assessments
        .find_assessment(&id)
        .await?
        .ok_or(AppError::NotFound("Assessment not found".to_string()))?;

    Ok(Json(assessment))
}

/// The current user's past attempts at an assessment, newest first.
pub async fn list_my_attempts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = state.attempts.attempts_for_user(&claims.sub, &id).await?;
    let summaries: Vec<AttemptSummary> = attempts.iter().map(AttemptSummary::from).collect();
    Ok(Json(summaries))
}

/// All attempts at an assessment, including answers.
/// Admin only.
pub async fn list_all_attempts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .assessments
        .find_assessment(&id)
        .await?
        .ok_or(AppError::NotFound("Assessment not found".to_string()))?;

    let attempts = state.attempts.attempts_for_assessment(&id).await?;
    Ok(Json(attempts))
}
