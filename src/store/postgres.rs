// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, types::Json};

use super::{AssessmentStore, AttemptStore, CourseStore, ProgressStore, SiteStore};
use crate::{
    error::AppError,
    models::{
        assessment::Assessment,
        attempt::{Attempt, AttemptRow},
        course::{Course, Enrollment},
        question::{Question, QuestionRow},
        site::{HomepageSection, SiteSetting},
        study::{StudyMaterial, StudyProgress},
    },
};

const QUESTION_COLUMNS: &str = "id, prompt, question_type, options, correct_answer, explanation, \
     points, category, difficulty, sort_order";

const ATTEMPT_COLUMNS: &str = "id, assessment_id, user_id, answers, score, total_marks, \
     passing_marks, passed, correct_count, total_questions, percentage, category_breakdown, \
     time_spent_seconds, completed_at";

/// Postgres-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn into_questions(rows: Vec<QuestionRow>) -> Result<Vec<Question>, AppError> {
    rows.into_iter().map(Question::try_from).collect()
}

#[async_trait]
impl AssessmentStore for PgStore {
    async fn find_assessment(&self, id: &str) -> Result<Option<Assessment>, AppError> {
        let assessment = sqlx::query_as::<_, Assessment>(
            r#"
            SELECT id, title, description, duration_minutes, total_marks, passing_marks, course_id
            FROM assessments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch assessment {}: {:?}", id, e);
            AppError::from(e)
        })?;

        Ok(assessment)
    }

    async fn questions_for_assessment(
        &self,
        assessment_id: &str,
    ) -> Result<Vec<Question>, AppError> {
        let sql = format!(
            "SELECT {} FROM questions WHERE assessment_id = $1 ORDER BY sort_order, id",
            QUESTION_COLUMNS
        );
        let rows = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(assessment_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch questions for {}: {:?}", assessment_id, e);
                AppError::from(e)
            })?;

        into_questions(rows)
    }

    async fn bank_questions(&self, category: &str) -> Result<Vec<Question>, AppError> {
        let sql = format!(
            "SELECT {} FROM question_bank WHERE category = $1",
            QUESTION_COLUMNS
        );
        let rows = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(category)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch question bank for {}: {:?}", category, e);
                AppError::from(e)
            })?;

        into_questions(rows)
    }
}

#[async_trait]
impl AttemptStore for PgStore {
    async fn persist_attempt(&self, attempt: &Attempt) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO assessment_attempts (
                id, assessment_id, user_id, answers, score, total_marks, passing_marks, passed,
                correct_count, total_questions, percentage, category_breakdown,
                time_spent_seconds, completed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&attempt.id)
        .bind(&attempt.assessment_id)
        .bind(&attempt.user_id)
        .bind(Json(&attempt.answers))
        .bind(attempt.score)
        .bind(attempt.total_marks)
        .bind(attempt.passing_marks)
        .bind(attempt.passed)
        .bind(attempt.correct_count)
        .bind(attempt.total_questions)
        .bind(attempt.percentage)
        .bind(Json(&attempt.category_breakdown))
        .bind(attempt.time_spent_seconds)
        .bind(attempt.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to persist attempt {}: {:?}", attempt.id, e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(())
    }

    async fn attempts_for_user(
        &self,
        user_id: &str,
        assessment_id: &str,
    ) -> Result<Vec<Attempt>, AppError> {
        let sql = format!(
            "SELECT {} FROM assessment_attempts \
             WHERE user_id = $1 AND assessment_id = $2 \
             ORDER BY completed_at DESC",
            ATTEMPT_COLUMNS
        );
        let rows = sqlx::query_as::<_, AttemptRow>(&sql)
            .bind(user_id)
            .bind(assessment_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Attempt::from).collect())
    }

    async fn attempts_for_assessment(
        &self,
        assessment_id: &str,
    ) -> Result<Vec<Attempt>, AppError> {
        let sql = format!(
            "SELECT {} FROM assessment_attempts WHERE assessment_id = $1 ORDER BY completed_at DESC",
            ATTEMPT_COLUMNS
        );
        let rows = sqlx::query_as::<_, AttemptRow>(&sql)
            .bind(assessment_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Attempt::from).collect())
    }
}

#[async_trait]
impl CourseStore for PgStore {
    async fn list_courses(&self, specialization: Option<&str>) -> Result<Vec<Course>, AppError> {
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, title, description, specialization, published
            FROM courses
            WHERE published AND ($1::TEXT IS NULL OR specialization = $1)
            ORDER BY title
            "#,
        )
        .bind(specialization)
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    async fn find_course(&self, id: &str) -> Result<Option<Course>, AppError> {
        let course = sqlx::query_as::<_, Course>(
            "SELECT id, title, description, specialization, published FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }

    async fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO enrollments (id, user_id, course_id, enrolled_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&enrollment.id)
        .bind(&enrollment.user_id)
        .bind(&enrollment.course_id)
        .bind(enrollment.enrolled_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let err = AppError::from(e);
            if !matches!(err, AppError::Conflict(_)) {
                tracing::error!("Failed to insert enrollment: {:?}", err);
            }
            err
        })?;

        Ok(())
    }

    async fn find_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, AppError> {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT id, user_id, course_id, enrolled_at
            FROM enrollments
            WHERE user_id = $1 AND course_id = $2
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(enrollment)
    }
}

#[async_trait]
impl ProgressStore for PgStore {
    async fn find_material(&self, id: &str) -> Result<Option<StudyMaterial>, AppError> {
        let material = sqlx::query_as::<_, StudyMaterial>(
            "SELECT id, course_id, title, kind, url, sort_order FROM study_materials WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(material)
    }

    async fn materials_for_course(&self, course_id: &str) -> Result<Vec<StudyMaterial>, AppError> {
        let materials = sqlx::query_as::<_, StudyMaterial>(
            r#"
            SELECT id, course_id, title, kind, url, sort_order
            FROM study_materials
            WHERE course_id = $1
            ORDER BY sort_order, id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(materials)
    }

    async fn find_progress(
        &self,
        user_id: &str,
        study_material_id: &str,
    ) -> Result<Option<StudyProgress>, AppError> {
        let progress = sqlx::query_as::<_, StudyProgress>(
            r#"
            SELECT user_id, study_material_id, completed, completed_at
            FROM user_study_progress
            WHERE user_id = $1 AND study_material_id = $2
            "#,
        )
        .bind(user_id)
        .bind(study_material_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(progress)
    }

    async fn toggle_progress(
        &self,
        user_id: &str,
        study_material_id: &str,
        now: DateTime<Utc>,
    ) -> Result<StudyProgress, AppError> {
        // The SET expressions read the existing row, so the flip happens under the row lock.
        let saved = sqlx::query_as::<_, StudyProgress>(
            r#"
            INSERT INTO user_study_progress (user_id, study_material_id, completed, completed_at)
            VALUES ($1, $2, TRUE, $3)
            ON CONFLICT (user_id, study_material_id) DO UPDATE SET
                completed = NOT user_study_progress.completed,
                completed_at = CASE
                    WHEN user_study_progress.completed THEN NULL
                    ELSE EXCLUDED.completed_at
                END
            RETURNING user_id, study_material_id, completed, completed_at
            "#,
        )
        .bind(user_id)
        .bind(study_material_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to toggle study progress: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(saved)
    }

    async fn progress_for_course(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Vec<StudyProgress>, AppError> {
        let progress = sqlx::query_as::<_, StudyProgress>(
            r#"
            SELECT p.user_id, p.study_material_id, p.completed, p.completed_at
            FROM user_study_progress p
            JOIN study_materials m ON m.id = p.study_material_id
            WHERE p.user_id = $1 AND m.course_id = $2
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(progress)
    }
}

#[async_trait]
impl SiteStore for PgStore {
    async fn site_settings(&self) -> Result<Vec<SiteSetting>, AppError> {
        let settings =
            sqlx::query_as::<_, SiteSetting>("SELECT key, value FROM site_settings ORDER BY key")
                .fetch_all(&self.pool)
                .await?;

        Ok(settings)
    }

    async fn homepage_content(&self) -> Result<Vec<HomepageSection>, AppError> {
        let sections = sqlx::query_as::<_, HomepageSection>(
            r#"
            SELECT id, section, title, body, sort_order
            FROM homepage_content
            ORDER BY sort_order, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sections)
    }
}
