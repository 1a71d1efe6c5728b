// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{AssessmentStore, AttemptStore, CourseStore, ProgressStore, SiteStore};
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

#[derive(Default)]
struct Tables {
    assessments: HashMap<String, Assessment>,
    /// assessment id -> questions
    questions: HashMap<String, Vec<Question>>,
    bank: Vec<Question>,
    attempts: Vec<Attempt>,
    courses: HashMap<String, Course>,
    enrollments: Vec<Enrollment>,
    materials: HashMap<String, StudyMaterial>,
    /// (user id, material id) -> progress
    progress: HashMap<(String, String), StudyProgress>,
    settings: Vec<SiteSetting>,
    homepage: Vec<HomepageSection>,
}

/// In-process store with the same uniqueness rules as the Postgres schema.
/// Used when no database is configured.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_assessment(&self, assessment: Assessment, questions: Vec<Question>) {
        let mut tables = self.tables.write().await;
        tables.questions.insert(assessment.id.clone(), questions);
        tables.assessments.insert(assessment.id.clone(), assessment);
    }

    pub async fn insert_bank_questions(&self, questions: impl IntoIterator<Item = Question>) {
        self.tables.write().await.bank.extend(questions);
    }

    pub async fn insert_course(&self, course: Course) {
        self.tables
            .write()
            .await
            .courses
            .insert(course.id.clone(), course);
    }

    pub async fn insert_material(&self, material: StudyMaterial) {
        self.tables
            .write()
            .await
            .materials
            .insert(material.id.clone(), material);
    }

    pub async fn insert_setting(&self, key: &str, value: &str) {
        let mut tables = self.tables.write().await;
        tables.settings.retain(|s| s.key != key);
        tables.settings.push(SiteSetting {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    pub async fn insert_homepage_section(&self, section: HomepageSection) {
        self.tables.write().await.homepage.push(section);
    }

    pub async fn enrollment_count(&self, user_id: &str, course_id: &str) -> usize {
        self.tables
            .read()
            .await
            .enrollments
            .iter()
            .filter(|e| e.user_id == user_id && e.course_id == course_id)
            .count()
    }
}

#[async_trait]
impl AssessmentStore for MemoryStore {
    async fn find_assessment(&self, id: &str) -> Result<Option<Assessment>, AppError> {
        Ok(self.tables.read().await.assessments.get(id).cloned())
    }

    async fn questions_for_assessment(
        &self,
        assessment_id: &str,
    ) -> Result<Vec<Question>, AppError> {
        let tables = self.tables.read().await;
        let mut questions = tables
            .questions
            .get(assessment_id)
            .cloned()
            .unwrap_or_default();
        questions.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
        Ok(questions)
    }

    async fn bank_questions(&self, category: &str) -> Result<Vec<Question>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .bank
            .iter()
            .filter(|q| q.category == category)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn persist_attempt(&self, attempt: &Attempt) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if !tables.attempts.iter().any(|a| a.id == attempt.id) {
            tables.attempts.push(attempt.clone());
        }
        Ok(())
    }

    async fn attempts_for_user(
        &self,
        user_id: &str,
        assessment_id: &str,
    ) -> Result<Vec<Attempt>, AppError> {
        let tables = self.tables.read().await;
        let mut attempts: Vec<Attempt> = tables
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id && a.assessment_id.as_deref() == Some(assessment_id))
            .cloned()
            .collect();
        attempts.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(attempts)
    }

    async fn attempts_for_assessment(
        &self,
        assessment_id: &str,
    ) -> Result<Vec<Attempt>, AppError> {
        let tables = self.tables.read().await;
        let mut attempts: Vec<Attempt> = tables
            .attempts
            .iter()
            .filter(|a| a.assessment_id.as_deref() == Some(assessment_id))
            .cloned()
            .collect();
        attempts.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(attempts)
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn list_courses(&self, specialization: Option<&str>) -> Result<Vec<Course>, AppError> {
        let tables = self.tables.read().await;
        let mut courses: Vec<Course> = tables
            .courses
            .values()
            .filter(|c| c.published)
            .filter(|c| specialization.is_none_or(|s| c.specialization == s))
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(courses)
    }

    async fn find_course(&self, id: &str) -> Result<Option<Course>, AppError> {
        Ok(self.tables.read().await.courses.get(id).cloned())
    }

    async fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let exists = tables
            .enrollments
            .iter()
            .any(|e| e.user_id == enrollment.user_id && e.course_id == enrollment.course_id);
        if exists {
            return Err(AppError::Conflict(format!(
                "Enrollment for course '{}' already exists",
                enrollment.course_id
            )));
        }
        tables.enrollments.push(enrollment.clone());
        Ok(())
    }

    async fn find_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .enrollments
            .iter()
            .find(|e| e.user_id == user_id && e.course_id == course_id)
            .cloned())
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn find_material(&self, id: &str) -> Result<Option<StudyMaterial>, AppError> {
        Ok(self.tables.read().await.materials.get(id).cloned())
    }

    async fn materials_for_course(&self, course_id: &str) -> Result<Vec<StudyMaterial>, AppError> {
        let tables = self.tables.read().await;
        let mut materials: Vec<StudyMaterial> = tables
            .materials
            .values()
            .filter(|m| m.course_id == course_id)
            .cloned()
            .collect();
        materials.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
        Ok(materials)
    }

    async fn find_progress(
        &self,
        user_id: &str,
        study_material_id: &str,
    ) -> Result<Option<StudyProgress>, AppError> {
        let key = (user_id.to_string(), study_material_id.to_string());
        Ok(self.tables.read().await.progress.get(&key).cloned())
    }

    async fn toggle_progress(
        &self,
        user_id: &str,
        study_material_id: &str,
        now: DateTime<Utc>,
    ) -> Result<StudyProgress, AppError> {
        let key = (user_id.to_string(), study_material_id.to_string());
        let mut tables = self.tables.write().await;
        let entry = tables
            .progress
            .entry(key)
            .or_insert_with(|| StudyProgress::untouched(user_id, study_material_id));
        *entry = entry.clone().toggled(now);
        Ok(entry.clone())
    }

    async fn progress_for_course(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Vec<StudyProgress>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .progress
            .values()
            .filter(|p| p.user_id == user_id)
            .filter(|p| {
                tables
                    .materials
                    .get(&p.study_material_id)
                    .is_some_and(|m| m.course_id == course_id)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SiteStore for MemoryStore {
    async fn site_settings(&self) -> Result<Vec<SiteSetting>, AppError> {
        let mut settings = self.tables.read().await.settings.clone();
        settings.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(settings)
    }

    async fn homepage_content(&self) -> Result<Vec<HomepageSection>, AppError> {
        let mut sections = self.tables.read().await.homepage.clone();
        sections.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
        Ok(sections)
    }
}
