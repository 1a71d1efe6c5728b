// src/models/course.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'courses' table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: Option<String>,

    /// Specialization tag used for browsing and recommendations.
    pub specialization: String,

    /// Unpublished courses are hidden from browsing and cannot be enrolled in.
    pub published: bool,
}

/// Query parameters for listing courses.
#[derive(Debug, Default, Deserialize)]
pub struct CourseListParams {
    pub specialization: Option<String>,
}

/// Represents the 'enrollments' table. `(user_id, course_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn new(user_id: &str, course_id: &str) -> Self {
        Enrollment {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            enrolled_at: Utc::now(),
        }
    }
}

/// Result of an enroll request. A duplicate is informational, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrollOutcome {
    Enrolled { enrollment: Enrollment },
    AlreadyEnrolled,
}
