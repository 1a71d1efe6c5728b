// src/handlers/study.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;

use crate::{error::AppError, state::AppState, utils::jwt::Claims};

/// Toggle completion of a study material for the current user.
/// Completing stamps `completed_at`; toggling back clears it.
pub async fn toggle_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(material_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .progress
        .find_material(&material_id)
        .await?
        .ok_or(AppError::NotFound("Study material not found".to_string()))?;

    let saved = state
        .progress
        .toggle_progress(&claims.sub, &material_id, Utc::now())
        .await?;

    tracing::debug!(
        user = %claims.sub,
        material = %material_id,
        completed = saved.completed,
        "Study progress toggled"
    );

    Ok(Json(saved))
}
