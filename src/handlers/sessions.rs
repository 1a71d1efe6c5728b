// src/handlers/sessions.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rand::{SeedableRng, rngs::StdRng};
use serde::Deserialize;
use validator::Validate;

use crate::{
    assessment::{
        AttemptSession, SessionStatus, SubmitOutcome, SubmitTrigger, provider,
        session::SessionView,
    },
    config::PERSONALIZED_DURATION_MINUTES,
    error::AppError,
    models::assessment::UserPreferences,
    state::AppState,
    utils::jwt::Claims,
};

/// DTO for answering one question.
#[derive(Debug, Deserialize, Validate)]
pub struct SetAnswerRequest {
    #[validate(length(min = 1, max = 100))]
    pub question_id: String,
    #[validate(length(max = 2000))]
    pub answer: String,
}

async fn open_session(
    state: &AppState,
    session: AttemptSession,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let session = Arc::new(session);
    state.sessions.insert(session.clone()).await;
    session.start().await?;
    Ok((StatusCode::CREATED, Json(session.view().await)))
}

/// Starts a timed attempt at a fixed assessment.
pub async fn start_fixed(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(assessment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let assessment = state
        .assessments
        .find_assessment(&assessment_id)
        .await?
        .ok_or(AppError::NotFound("Assessment not found".to_string()))?;

    let questions = provider::fixed_questions(state.assessments.as_ref(), &assessment_id).await?;
    let session =
        AttemptSession::fixed(&claims.sub, assessment, questions, state.attempts.clone())?;

    open_session(&state, session).await
}

/// Generates a personalized paper from the question bank and starts it.
pub async fn start_personalized(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(preferences): Json<UserPreferences>,
) -> Result<impl IntoResponse, AppError> {
    preferences.validate()?;

    // Experience is recorded but does not influence selection.
    tracing::info!(
        user = %claims.sub,
        specialization = %preferences.specialization,
        experience = ?preferences.experience,
        "Generating personalized assessment"
    );

    let mut rng = StdRng::from_entropy();
    let questions =
        provider::personalized_questions(state.assessments.as_ref(), &preferences, &mut rng)
            .await?;

    let session = AttemptSession::personalized(
        &claims.sub,
        preferences,
        questions,
        PERSONALIZED_DURATION_MINUTES,
        state.config.personalized_pass_percentage,
        state.attempts.clone(),
    )?;

    open_session(&state, session).await
}

/// Current state of a session. Completed sessions leave the registry, so their
/// results are read from the attempt history.
pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.get(&id, &claims.sub).await?;
    Ok(Json(session.view().await))
}

/// Records (or overwrites) the answer to one question.
pub async fn set_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<SetAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let session = state.sessions.get(&id, &claims.sub).await?;
    let answered_count = session
        .set_answer(&payload.question_id, &payload.answer)
        .await?;

    Ok(Json(serde_json::json!({
        "answered_count": answered_count,
        "total_questions": session.questions().len(),
    })))
}

/// Submits the attempt, or retries after a failed write.
///
/// * 200 with the result once the attempt is stored.
/// * 202 when another submission for this session is still in flight.
pub async fn submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let session = state.sessions.get(&id, &claims.sub).await?;

    match session.submit(SubmitTrigger::User).await? {
        SubmitOutcome::Completed(attempt) | SubmitOutcome::AlreadyCompleted(attempt) => {
            Ok(Json(session.result(attempt)).into_response())
        }
        SubmitOutcome::InFlight => Ok((
            StatusCode::ACCEPTED,
            Json(serde_json::json!({ "status": SessionStatus::Submitting })),
        )
            .into_response()),
    }
}

/// Abandons a session without recording an attempt.
pub async fn abandon(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.get(&id, &claims.sub).await?;
    session.abandon().await?;
    Ok(StatusCode::NO_CONTENT)
}
