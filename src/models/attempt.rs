// src/models/attempt.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

/// Correct/total tally for a single category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub correct: u32,
    pub total: u32,
}

/// Represents the 'assessment_attempts' table.
/// Assembled once at submission and never mutated afterwards; a retake is a new row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: String,

    /// `None` for personalized papers, which are not tied to a stored assessment.
    pub assessment_id: Option<String>,

    pub user_id: String,

    /// Question id -> submitted answer.
    pub answers: HashMap<String, String>,

    /// Points earned.
    pub score: i32,
    pub total_marks: i32,
    pub passing_marks: i32,
    pub passed: bool,

    pub correct_count: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub category_breakdown: BTreeMap<String, CategoryScore>,

    pub time_spent_seconds: i64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct AttemptRow {
    pub id: String,
    pub assessment_id: Option<String>,
    pub user_id: String,
    pub answers: Json<HashMap<String, String>>,
    pub score: i32,
    pub total_marks: i32,
    pub passing_marks: i32,
    pub passed: bool,
    pub correct_count: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub category_breakdown: Json<BTreeMap<String, CategoryScore>>,
    pub time_spent_seconds: i64,
    pub completed_at: DateTime<Utc>,
}

impl From<AttemptRow> for Attempt {
    fn from(row: AttemptRow) -> Self {
        Attempt {
            id: row.id,
            assessment_id: row.assessment_id,
            user_id: row.user_id,
            answers: row.answers.0,
            score: row.score,
            total_marks: row.total_marks,
            passing_marks: row.passing_marks,
            passed: row.passed,
            correct_count: row.correct_count,
            total_questions: row.total_questions,
            percentage: row.percentage,
            category_breakdown: row.category_breakdown.0,
            time_spent_seconds: row.time_spent_seconds,
            completed_at: row.completed_at,
        }
    }
}

/// History entry returned to learners; omits the raw answer map.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptSummary {
    pub id: String,
    pub assessment_id: Option<String>,
    pub score: i32,
    pub total_marks: i32,
    pub passed: bool,
    pub percentage: i32,
    pub time_spent_seconds: i64,
    pub completed_at: DateTime<Utc>,
}

impl From<&Attempt> for AttemptSummary {
    fn from(a: &Attempt) -> Self {
        AttemptSummary {
            id: a.id.clone(),
            assessment_id: a.assessment_id.clone(),
            score: a.score,
            total_marks: a.total_marks,
            passed: a.passed,
            percentage: a.percentage,
            time_spent_seconds: a.time_spent_seconds,
            completed_at: a.completed_at,
        }
    }
}
