// src/assessment/session.rs

use std::{
    collections::HashMap,
    sync::{Arc, OnceLock, Weak},
    time::Duration,
};

use chrono::Utc;
use serde::Serialize;
use tokio::{
    sync::{Mutex, RwLock},
    task::AbortHandle,
};

use super::{
    answers::AnswerTracker,
    scorer::{self, ScoreReport},
    timer::{Countdown, ExpiryLatch},
};
use crate::{
    config::EXPIRED_RETRY_GRACE_SECS,
    error::AppError,
    models::{
        assessment::{Assessment, UserPreferences},
        attempt::Attempt,
        question::{PublicQuestion, Question, ReviewedQuestion},
    },
    store::AttemptStore,
};

/// Lifecycle of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Submitting,
    Completed,
    /// The write failed; answers are kept and an explicit submit retries.
    SubmissionFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitTrigger {
    User,
    TimerExpired,
}

/// Where the paper came from.
#[derive(Debug, Clone)]
pub enum PaperSource {
    Fixed(Assessment),
    Personalized(UserPreferences),
}

/// Marks needed to pass and the scale the score is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkScheme {
    pub total_marks: i32,
    pub passing_marks: i32,
}

impl MarkScheme {
    /// Personalized papers are marked out of their own points.
    pub fn from_percentage(points_possible: i32, pass_percentage: u32) -> Self {
        let passing = (f64::from(points_possible) * f64::from(pass_percentage) / 100.0).ceil();
        MarkScheme {
            total_marks: points_possible,
            passing_marks: passing as i32,
        }
    }

    /// Rescales earned points onto `total_marks`.
    pub fn scale(&self, points_earned: i32, points_possible: i32) -> i32 {
        if points_possible <= 0 || points_possible == self.total_marks {
            return points_earned;
        }
        (f64::from(points_earned) * f64::from(self.total_marks) / f64::from(points_possible))
            .round() as i32
    }
}

/// What a submit call did.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Completed(Attempt),
    /// Already finished earlier; the stored attempt is returned again.
    AlreadyCompleted(Attempt),
    /// Another submission is in flight; this call did nothing.
    InFlight,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResult {
    pub attempt: Attempt,
    pub review: Vec<ReviewedQuestion>,
}

/// Snapshot for polling clients.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: String,
    pub status: SessionStatus,
    pub mode: &'static str,
    pub assessment_id: Option<String>,
    pub title: String,
    pub remaining_seconds: u64,
    pub display: String,
    pub urgent: bool,
    pub answered_count: usize,
    pub total_questions: usize,
    pub questions: Vec<PublicQuestion>,
    pub answers: HashMap<String, String>,
    pub retry_allowed: bool,
    pub last_error: Option<String>,
    pub result: Option<SessionResult>,
}

enum TickOutcome {
    Running,
    Expired,
    Stopped,
}

struct SessionState {
    status: SessionStatus,
    answers: AnswerTracker,
    countdown: Countdown,
    attempt: Option<Attempt>,
    last_error: Option<String>,
    timer: Option<AbortHandle>,
}

/// One learner working through one paper.
///
/// User submits and timer expiry both go through [`AttemptSession::submit`]; the
/// `Submitting` status is the in-flight guard.
pub struct AttemptSession {
    id: String,
    attempt_id: String,
    user_id: String,
    source: PaperSource,
    questions: Vec<Question>,
    scheme: Option<MarkScheme>,
    pass_percentage: u32,
    persister: Arc<dyn AttemptStore>,
    state: Mutex<SessionState>,
    expiry: ExpiryLatch,
    /// Set when the session is registered; used to drop itself once finished.
    registry: OnceLock<Weak<SessionRegistry>>,
}

impl AttemptSession {
    /// Fixed-mode session using the assessment's duration and marks.
    pub fn fixed(
        user_id: &str,
        assessment: Assessment,
        questions: Vec<Question>,
        persister: Arc<dyn AttemptStore>,
    ) -> Result<Self, AppError> {
        let countdown = Countdown::from_minutes(assessment.duration_minutes.max(0) as u32);
        let scheme = MarkScheme {
            total_marks: assessment.total_marks,
            passing_marks: assessment.passing_marks,
        };
        Self::build(
            user_id,
            PaperSource::Fixed(assessment),
            questions,
            countdown,
            Some(scheme),
            0,
            persister,
        )
    }

    /// Personalized session; the pass mark is a share of the paper's points.
    pub fn personalized(
        user_id: &str,
        preferences: UserPreferences,
        questions: Vec<Question>,
        duration_minutes: u32,
        pass_percentage: u32,
        persister: Arc<dyn AttemptStore>,
    ) -> Result<Self, AppError> {
        Self::build(
            user_id,
            PaperSource::Personalized(preferences),
            questions,
            Countdown::from_minutes(duration_minutes),
            None,
            pass_percentage,
            persister,
        )
    }

    fn build(
        user_id: &str,
        source: PaperSource,
        questions: Vec<Question>,
        countdown: Countdown,
        scheme: Option<MarkScheme>,
        pass_percentage: u32,
        persister: Arc<dyn AttemptStore>,
    ) -> Result<Self, AppError> {
        if questions.is_empty() {
            return Err(AppError::NotFound(
                "No questions are available for this assessment".to_string(),
            ));
        }

        Ok(AttemptSession {
            id: uuid::Uuid::new_v4().to_string(),
            attempt_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            source,
            questions,
            scheme,
            pass_percentage,
            persister,
            state: Mutex::new(SessionState {
                status: SessionStatus::NotStarted,
                answers: AnswerTracker::default(),
                countdown,
                attempt: None,
                last_error: None,
                timer: None,
            }),
            expiry: ExpiryLatch::default(),
            registry: OnceLock::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub async fn status(&self) -> SessionStatus {
        self.state.lock().await.status
    }

    pub async fn remaining_seconds(&self) -> u64 {
        self.state.lock().await.countdown.remaining()
    }

    /// `NotStarted -> InProgress` and starts the countdown task.
    pub async fn start(self: &Arc<Self>) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        if state.status != SessionStatus::NotStarted {
            return Err(AppError::BadRequest("Session already started".to_string()));
        }
        state.status = SessionStatus::InProgress;

        let expired_on_start = state.countdown.is_expired();
        state.timer = Some(spawn_countdown(Arc::downgrade(self)));
        drop(state);

        tracing::info!(session = %self.id, user = %self.user_id, "Assessment session started");

        if expired_on_start {
            self.on_expired().await;
        }
        Ok(())
    }

    /// Records an answer. Rejected once time is up or a submission is under way.
    pub async fn set_answer(&self, question_id: &str, answer: &str) -> Result<usize, AppError> {
        if !self.questions.iter().any(|q| q.id == question_id) {
            return Err(AppError::BadRequest(format!(
                "Question '{}' is not part of this session",
                question_id
            )));
        }

        let mut state = self.state.lock().await;
        match state.status {
            SessionStatus::InProgress | SessionStatus::SubmissionFailed => {}
            SessionStatus::NotStarted => {
                return Err(AppError::BadRequest("Session has not started".to_string()));
            }
            SessionStatus::Submitting | SessionStatus::Completed => {
                return Err(AppError::BadRequest(
                    "Answers can no longer be changed".to_string(),
                ));
            }
        }
        if state.countdown.is_expired() {
            return Err(AppError::BadRequest("Time is up".to_string()));
        }

        state.answers.set_answer(question_id, answer);
        Ok(state.answers.answered_count())
    }

    /// Scores and persists the attempt. Safe to call concurrently: only one call
    /// moves the session to `Submitting`, the others get `InFlight`.
    pub async fn submit(&self, trigger: SubmitTrigger) -> Result<SubmitOutcome, AppError> {
        let attempt = {
            let mut state = self.state.lock().await;
            match state.status {
                SessionStatus::NotStarted => {
                    return Err(AppError::BadRequest("Session has not started".to_string()));
                }
                SessionStatus::Submitting => return Ok(SubmitOutcome::InFlight),
                SessionStatus::Completed => {
                    return match &state.attempt {
                        Some(attempt) => Ok(SubmitOutcome::AlreadyCompleted(attempt.clone())),
                        None => Err(AppError::InternalServerError(
                            "Completed session without attempt".to_string(),
                        )),
                    };
                }
                SessionStatus::SubmissionFailed if trigger == SubmitTrigger::TimerExpired => {
                    return Err(AppError::Conflict(
                        "Previous submission failed; waiting for an explicit retry".to_string(),
                    ));
                }
                SessionStatus::InProgress | SessionStatus::SubmissionFailed => {}
            }

            let report = scorer::score(&self.questions, state.answers.as_map())?;
            let attempt = self.assemble(&state, report);
            state.status = SessionStatus::Submitting;
            attempt
        };

        tracing::info!(
            session = %self.id,
            attempt = %attempt.id,
            ?trigger,
            score = attempt.score,
            "Submitting assessment attempt"
        );

        let written = self.persister.persist_attempt(&attempt).await;

        let mut state = self.state.lock().await;
        match written {
            Ok(()) => {
                state.status = SessionStatus::Completed;
                state.last_error = None;
                state.answers.take();
                state.attempt = Some(attempt.clone());
                // An expiry-driven submit runs inside the countdown task itself.
                if let Some(timer) = state.timer.take() {
                    if trigger == SubmitTrigger::User {
                        timer.abort();
                    }
                }
                drop(state);

                tracing::info!(session = %self.id, passed = attempt.passed, "Assessment attempt saved");
                self.release().await;
                Ok(SubmitOutcome::Completed(attempt))
            }
            Err(err) => {
                state.status = SessionStatus::SubmissionFailed;
                state.last_error = Some("Your answers could not be saved. Please retry.".into());
                tracing::warn!(session = %self.id, ?trigger, "Failed to save attempt: {}", err);
                Err(err)
            }
        }
    }

    /// Removes the session from the registry it was inserted into, if any.
    pub async fn release(&self) {
        if let Some(registry) = self.registry.get().and_then(Weak::upgrade) {
            registry.remove(&self.id).await;
        }
    }

    /// Expiry handler. Only the first call submits.
    pub async fn on_expired(&self) -> Option<Result<SubmitOutcome, AppError>> {
        if !self.expiry.fire() {
            return None;
        }
        tracing::info!(session = %self.id, "Time is up, submitting automatically");
        Some(self.submit(SubmitTrigger::TimerExpired).await)
    }

    /// Stops the countdown. A running submission cannot be abandoned.
    pub async fn abandon(&self) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        if state.status == SessionStatus::Submitting {
            return Err(AppError::Conflict(
                "A submission is in progress".to_string(),
            ));
        }
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.answers.take();
        drop(state);

        tracing::info!(session = %self.id, "Assessment session abandoned");
        self.release().await;
        Ok(())
    }

    pub async fn view(&self) -> SessionView {
        let state = self.state.lock().await;
        let (mode, assessment_id, title) = match &self.source {
            PaperSource::Fixed(a) => ("fixed", Some(a.id.clone()), a.title.clone()),
            PaperSource::Personalized(p) => (
                "personalized",
                None,
                format!("Personalized assessment: {}", p.specialization),
            ),
        };

        SessionView {
            id: self.id.clone(),
            status: state.status,
            mode,
            assessment_id,
            title,
            remaining_seconds: state.countdown.remaining(),
            display: state.countdown.display(),
            urgent: state.countdown.is_urgent(),
            answered_count: state.answers.answered_count(),
            total_questions: self.questions.len(),
            questions: self.questions.iter().map(PublicQuestion::from).collect(),
            answers: state.answers.as_map().clone(),
            retry_allowed: state.status == SessionStatus::SubmissionFailed,
            last_error: state.last_error.clone(),
            result: state.attempt.as_ref().map(|a| self.result(a.clone())),
        }
    }

    /// Attempt plus per-question review.
    pub fn result(&self, attempt: Attempt) -> SessionResult {
        let review = self
            .questions
            .iter()
            .map(|q| {
                let submitted = attempt.answers.get(&q.id).cloned();
                ReviewedQuestion {
                    id: q.id.clone(),
                    prompt: q.prompt.clone(),
                    correct_answer: q.correct_answer.clone(),
                    explanation: q.explanation.clone(),
                    correct: submitted
                        .as_deref()
                        .is_some_and(|a| scorer::answer_matches(q, a)),
                    submitted_answer: submitted,
                }
            })
            .collect();
        SessionResult { attempt, review }
    }

    fn assemble(&self, state: &SessionState, report: ScoreReport) -> Attempt {
        let scheme = self.scheme.unwrap_or_else(|| {
            MarkScheme::from_percentage(report.points_possible, self.pass_percentage)
        });
        let score = scheme.scale(report.points_earned, report.points_possible);
        let assessment_id = match &self.source {
            PaperSource::Fixed(a) => Some(a.id.clone()),
            PaperSource::Personalized(_) => None,
        };

        Attempt {
            id: self.attempt_id.clone(),
            assessment_id,
            user_id: self.user_id.clone(),
            answers: state.answers.as_map().clone(),
            score,
            total_marks: scheme.total_marks,
            passing_marks: scheme.passing_marks,
            passed: score >= scheme.passing_marks,
            correct_count: report.correct_count as i32,
            total_questions: report.total_questions as i32,
            percentage: report.percentage as i32,
            category_breakdown: report.categories,
            time_spent_seconds: state.countdown.elapsed() as i64,
            completed_at: Utc::now(),
        }
    }

    async fn tick(&self) -> TickOutcome {
        let mut state = self.state.lock().await;
        if state.status == SessionStatus::Completed {
            return TickOutcome::Stopped;
        }
        if state.countdown.tick() {
            TickOutcome::Expired
        } else if state.countdown.is_expired() {
            TickOutcome::Stopped
        } else {
            TickOutcome::Running
        }
    }
}

/// Ticks once per second while the session is alive.
///
/// After expiry an unsaved session is kept for a grace period so the learner
/// can retry a failed write, then it is released.
fn spawn_countdown(weak: Weak<AttemptSession>) -> AbortHandle {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let Some(session) = weak.upgrade() else {
                break;
            };
            match session.tick().await {
                TickOutcome::Running => continue,
                TickOutcome::Stopped => break,
                TickOutcome::Expired => {
                    if let Some(Err(err)) = session.on_expired().await {
                        tracing::warn!(session = %session.id, "Automatic submission failed: {}", err);
                    }
                    drop(session);

                    tokio::time::sleep(Duration::from_secs(EXPIRED_RETRY_GRACE_SECS)).await;
                    if let Some(session) = weak.upgrade() {
                        if session.status().await != SessionStatus::Completed {
                            tracing::info!(session = %session.id, "Releasing unsaved session after expiry");
                        }
                        session.release().await;
                    }
                    break;
                }
            }
        }
    })
    .abort_handle()
}

/// In-progress sessions by id. Explicitly passed state, shared through `AppState`.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<AttemptSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the session; it removes itself once completed or abandoned.
    pub async fn insert(self: &Arc<Self>, session: Arc<AttemptSession>) {
        let _ = session.registry.set(Arc::downgrade(self));
        self.sessions
            .write()
            .await
            .insert(session.id().to_string(), session);
    }

    /// Sessions are private to the user who started them.
    pub async fn get(&self, id: &str, user_id: &str) -> Result<Arc<AttemptSession>, AppError> {
        self.sessions
            .read()
            .await
            .get(id)
            .filter(|s| s.user_id() == user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
    }

    pub async fn remove(&self, id: &str) -> Option<Arc<AttemptSession>> {
        self.sessions.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
