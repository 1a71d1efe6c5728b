// src/models/study.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'study_materials' table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct StudyMaterial {
    pub id: String,
    pub course_id: String,
    pub title: String,

    /// e.g. "video", "article", "pdf".
    pub kind: String,
    pub url: Option<String>,
    pub sort_order: i32,
}

/// Represents the 'user_study_progress' table. Upserted on `(user_id, study_material_id)`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct StudyProgress {
    pub user_id: String,
    pub study_material_id: String,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl StudyProgress {
    /// Progress for a material the user has never touched.
    pub fn untouched(user_id: &str, study_material_id: &str) -> Self {
        StudyProgress {
            user_id: user_id.to_string(),
            study_material_id: study_material_id.to_string(),
            completed: false,
            completed_at: None,
        }
    }

    /// Flips completion. Completing stamps `now`, un-completing clears the stamp.
    pub fn toggled(self, now: DateTime<Utc>) -> Self {
        let completed = !self.completed;
        StudyProgress {
            completed,
            completed_at: completed.then_some(now),
            ..self
        }
    }
}

/// One material with the caller's completion state.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialProgress {
    pub material: StudyMaterial,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Aggregated study progress for one course.
#[derive(Debug, Clone, Serialize)]
pub struct CourseProgress {
    pub course_id: String,
    pub total_materials: usize,
    pub completed_materials: usize,
    pub percentage: u32,
    pub materials: Vec<MaterialProgress>,
}

impl CourseProgress {
    pub fn build(course_id: &str, materials: Vec<StudyMaterial>, progress: &[StudyProgress]) -> Self {
        let materials: Vec<MaterialProgress> = materials
            .into_iter()
            .map(|material| {
                let entry = progress
                    .iter()
                    .find(|p| p.study_material_id == material.id && p.completed);
                MaterialProgress {
                    completed: entry.is_some(),
                    completed_at: entry.and_then(|p| p.completed_at),
                    material,
                }
            })
            .collect();

        let total_materials = materials.len();
        let completed_materials = materials.iter().filter(|m| m.completed).count();
        let percentage = if total_materials == 0 {
            0
        } else {
            (completed_materials as f64 * 100.0 / total_materials as f64).round() as u32
        };

        CourseProgress {
            course_id: course_id.to_string(),
            total_materials,
            completed_materials,
            percentage,
            materials,
        }
    }
}
