// src/models/question.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

use crate::error::AppError;

/// How a question is answered and therefore how it is graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Answer is the zero-based index of the chosen option.
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::ShortAnswer => "short_answer",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple_choice" => Ok(QuestionType::MultipleChoice),
            "true_false" => Ok(QuestionType::TrueFalse),
            "short_answer" => Ok(QuestionType::ShortAnswer),
            other => Err(AppError::InternalServerError(format!(
                "Unknown question type '{}'",
                other
            ))),
        }
    }
}

/// A question as delivered by the backend. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,

    /// The text shown to the learner.
    pub prompt: String,

    pub question_type: QuestionType,

    /// Ordered option list; absent for short-answer questions.
    pub options: Option<Vec<String>>,

    /// Option index for multiple choice, otherwise the expected text.
    pub correct_answer: String,

    pub explanation: Option<String>,

    pub points: i32,

    /// Category / specialization tag, e.g. "Web Development".
    pub category: String,

    pub difficulty: String,

    pub sort_order: i32,
}

/// Row shape shared by the `questions` and `question_bank` tables.
#[derive(Debug, FromRow)]
pub struct QuestionRow {
    pub id: String,
    pub prompt: String,
    pub question_type: String,
    pub options: Option<Json<Vec<String>>>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub points: i32,
    pub category: String,
    pub difficulty: String,
    pub sort_order: i32,
}

impl TryFrom<QuestionRow> for Question {
    type Error = AppError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        Ok(Question {
            id: row.id,
            prompt: row.prompt,
            question_type: row.question_type.parse()?,
            options: row.options.map(|Json(options)| options),
            correct_answer: row.correct_answer,
            explanation: row.explanation,
            points: row.points,
            category: row.category,
            difficulty: row.difficulty,
            sort_order: row.sort_order,
        })
    }
}

/// DTO for sending a question to a learner mid-attempt (excludes answer and explanation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: String,
    pub prompt: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Option<Vec<String>>,
    pub points: i32,
    pub category: String,
    pub difficulty: String,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        PublicQuestion {
            id: q.id.clone(),
            prompt: q.prompt.clone(),
            question_type: q.question_type,
            options: q.options.clone(),
            points: q.points,
            category: q.category.clone(),
            difficulty: q.difficulty.clone(),
        }
    }
}

/// Post-submission review entry: the question with its answer key and the learner's answer.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewedQuestion {
    pub id: String,
    pub prompt: String,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub submitted_answer: Option<String>,
    pub correct: bool,
}
