// src/store/mod.rs

//! Backend collaborator interfaces.
//!
//! Handlers and the assessment engine only see these traits. `PgStore` talks to Postgres,
//! `MemoryStore` keeps everything in process.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::{
        assessment::Assessment,
        attempt::Attempt,
        course::{Course, Enrollment},
        question::Question,
        site::{HomepageSection, SiteSetting},
        study::{StudyMaterial, StudyProgress},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn find_assessment(&self, id: &str) -> Result<Option<Assessment>, AppError>;

    /// Questions attached to a fixed assessment.
    async fn questions_for_assessment(&self, assessment_id: &str)
    -> Result<Vec<Question>, AppError>;

    /// Question bank entries tagged with `category`.
    async fn bank_questions(&self, category: &str) -> Result<Vec<Question>, AppError>;
}

/// Result persister. Writes are a single attempt; retry policy belongs to the caller.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Stores a finished attempt. Writing the same attempt id twice is a no-op.
    async fn persist_attempt(&self, attempt: &Attempt) -> Result<(), AppError>;

    async fn attempts_for_user(
        &self,
        user_id: &str,
        assessment_id: &str,
    ) -> Result<Vec<Attempt>, AppError>;

    async fn attempts_for_assessment(&self, assessment_id: &str)
    -> Result<Vec<Attempt>, AppError>;
}

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn list_courses(&self, specialization: Option<&str>) -> Result<Vec<Course>, AppError>;

    async fn find_course(&self, id: &str) -> Result<Option<Course>, AppError>;

    /// Inserts an enrollment. A duplicate `(user_id, course_id)` yields `AppError::Conflict`.
    async fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<(), AppError>;

    async fn find_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, AppError>;
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn find_material(&self, id: &str) -> Result<Option<StudyMaterial>, AppError>;

    async fn materials_for_course(&self, course_id: &str) -> Result<Vec<StudyMaterial>, AppError>;

    async fn find_progress(
        &self,
        user_id: &str,
        study_material_id: &str,
    ) -> Result<Option<StudyProgress>, AppError>;

    /// Flips completion for `(user_id, study_material_id)` in one atomic step,
    /// creating the row as completed if it does not exist yet.
    async fn toggle_progress(
        &self,
        user_id: &str,
        study_material_id: &str,
        now: DateTime<Utc>,
    ) -> Result<StudyProgress, AppError>;

    async fn progress_for_course(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Vec<StudyProgress>, AppError>;
}

#[async_trait]
pub trait SiteStore: Send + Sync {
    async fn site_settings(&self) -> Result<Vec<SiteSetting>, AppError>;

    async fn homepage_content(&self) -> Result<Vec<HomepageSection>, AppError>;
}
