// src/assessment/scorer.rs

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{
    error::AppError,
    models::{
        attempt::CategoryScore,
        question::{Question, QuestionType},
    },
};

/// Outcome of grading a full question set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub correct_count: usize,
    pub total_questions: usize,
    pub percentage: u32,
    pub points_earned: i32,
    pub points_possible: i32,
    pub categories: BTreeMap<String, CategoryScore>,

    /// Question ids answered correctly.
    #[serde(skip)]
    pub correct_ids: Vec<String>,
}

fn parse_index(value: &str) -> Option<usize> {
    value.trim().parse().ok()
}

fn text_matches(submitted: &str, expected: &str) -> bool {
    let submitted = submitted.trim();
    !submitted.is_empty() && submitted.to_lowercase() == expected.trim().to_lowercase()
}

/// Whether `submitted` is the right answer to `question`.
///
/// Multiple choice compares option indices. When the answer key holds option text
/// instead of an index, the chosen option's text is compared against it.
/// Every other type is a case-insensitive exact match; no partial credit.
pub fn answer_matches(question: &Question, submitted: &str) -> bool {
    match question.question_type {
        QuestionType::MultipleChoice => {
            match (parse_index(submitted), parse_index(&question.correct_answer)) {
                (Some(chosen), Some(expected)) => chosen == expected,
                (Some(chosen), None) => question
                    .options
                    .as_ref()
                    .and_then(|options| options.get(chosen))
                    .is_some_and(|option| text_matches(option, &question.correct_answer)),
                _ => false,
            }
        }
        QuestionType::TrueFalse | QuestionType::ShortAnswer => {
            text_matches(submitted, &question.correct_answer)
        }
    }
}

/// Grades `answers` against `questions`.
///
/// An empty question set is a caller error.
pub fn score(
    questions: &[Question],
    answers: &HashMap<String, String>,
) -> Result<ScoreReport, AppError> {
    if questions.is_empty() {
        return Err(AppError::BadRequest(
            "Cannot score an empty question set".to_string(),
        ));
    }

    let mut categories: BTreeMap<String, CategoryScore> = BTreeMap::new();
    let mut correct_ids = Vec::new();
    let mut points_earned = 0;
    let mut points_possible = 0;

    for question in questions {
        let tally = categories.entry(question.category.clone()).or_default();
        tally.total += 1;
        points_possible += question.points;

        let correct = answers
            .get(&question.id)
            .is_some_and(|answer| answer_matches(question, answer));

        if correct {
            tally.correct += 1;
            points_earned += question.points;
            correct_ids.push(question.id.clone());
        }
    }

    let correct_count = correct_ids.len();
    let total_questions = questions.len();
    let percentage = (correct_count as f64 * 100.0 / total_questions as f64).round() as u32;

    Ok(ScoreReport {
        correct_count,
        total_questions,
        percentage,
        points_earned,
        points_possible,
        categories,
        correct_ids,
    })
}
