// src/models/assessment.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::config::CORE_CATEGORY;

/// Represents the 'assessments' table. Configured by admins elsewhere, read-only here.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Assessment {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub total_marks: i32,
    pub passing_marks: i32,
    pub course_id: Option<String>,
}

/// Self-reported experience. Collected with the preferences but not used for selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// Preferences a learner supplies before a personalized paper is generated.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserPreferences {
    #[validate(
        length(min = 1, max = 100, message = "Specialization must be between 1 and 100 characters."),
        custom(function = validate_specialization)
    )]
    pub specialization: String,
    pub experience: ExperienceLevel,
}

/// The core category is always drawn; choosing it again would duplicate questions.
fn validate_specialization(specialization: &str) -> Result<(), validator::ValidationError> {
    if specialization.trim().eq_ignore_ascii_case(CORE_CATEGORY) {
        return Err(validator::ValidationError::new("specialization_is_core_category"));
    }
    Ok(())
}
