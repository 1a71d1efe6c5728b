// src/assessment/answers.rs

use std::collections::HashMap;

/// Current answers of an in-progress attempt, keyed by question id.
#[derive(Debug, Clone, Default)]
pub struct AnswerTracker {
    answers: HashMap<String, String>,
}

impl AnswerTracker {
    /// Stores `answer`, replacing any previous answer to the same question.
    pub fn set_answer(&mut self, question_id: &str, answer: &str) {
        self.answers
            .insert(question_id.to_string(), answer.to_string());
    }

    pub fn answer(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    /// Distinct questions with a non-blank answer.
    pub fn answered_count(&self) -> usize {
        self.answers
            .values()
            .filter(|a| !a.trim().is_empty())
            .count()
    }

    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.answers
    }

    pub fn take(&mut self) -> HashMap<String, String> {
        std::mem::take(&mut self.answers)
    }
}
