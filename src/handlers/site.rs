// src/handlers/site.rs

use std::collections::BTreeMap;

use axum::{Json, extract::State, response::IntoResponse};

use crate::{error::AppError, state::AppState};

/// Site-wide settings as a flat key/value object.
pub async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let settings: BTreeMap<String, String> = state
        .site
        .site_settings()
        .await?
        .into_iter()
        .map(|s| (s.key, s.value))
        .collect();

    Ok(Json(settings))
}

/// Homepage sections in display order.
pub async fn get_homepage(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let sections = state.site.homepage_content().await?;
    Ok(Json(sections))
}
