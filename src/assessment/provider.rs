// src/assessment/provider.rs

use rand::{Rng, seq::SliceRandom};

use crate::{
    config::{CORE_CATEGORY, PERSONALIZED_PER_CATEGORY},
    error::AppError,
    models::{assessment::UserPreferences, question::Question},
    store::AssessmentStore,
};

/// Picks up to `count` questions from `pool`, uniformly and without replacement.
/// A pool smaller than `count` yields all of its questions.
pub fn sample<R: Rng + ?Sized>(pool: &[Question], count: usize, rng: &mut R) -> Vec<Question> {
    pool.choose_multiple(rng, count).cloned().collect()
}

/// Builds a personalized paper: up to 10 core questions plus up to 10 from the
/// specialization pool, shuffled together.
pub fn personalized_paper<R: Rng + ?Sized>(
    core_pool: &[Question],
    specialization_pool: &[Question],
    rng: &mut R,
) -> Vec<Question> {
    let mut paper = sample(core_pool, PERSONALIZED_PER_CATEGORY, rng);
    paper.extend(sample(specialization_pool, PERSONALIZED_PER_CATEGORY, rng));
    paper.shuffle(rng);
    paper
}

/// Fixed mode: the assessment's own questions in stored sort order.
pub async fn fixed_questions(
    store: &dyn AssessmentStore,
    assessment_id: &str,
) -> Result<Vec<Question>, AppError> {
    let mut questions = store.questions_for_assessment(assessment_id).await?;
    questions.sort_by_key(|q| q.sort_order);
    Ok(questions)
}

/// Personalized mode: draws from the question bank. `rng` is only used after the
/// pools are fetched, so callers can pass a seeded generator in tests.
pub async fn personalized_questions<R: Rng + Send + ?Sized>(
    store: &dyn AssessmentStore,
    preferences: &UserPreferences,
    rng: &mut R,
) -> Result<Vec<Question>, AppError> {
    let core_pool = store.bank_questions(CORE_CATEGORY).await?;
    let specialization_pool = store.bank_questions(preferences.specialization.trim()).await?;

    if core_pool.len() < PERSONALIZED_PER_CATEGORY
        || specialization_pool.len() < PERSONALIZED_PER_CATEGORY
    {
        tracing::warn!(
            core = core_pool.len(),
            specialization = specialization_pool.len(),
            "Question bank pool smaller than requested sample"
        );
    }

    Ok(personalized_paper(&core_pool, &specialization_pool, rng))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::models::question::QuestionType;

    fn pool(category: &str, prefix: &str, n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question {
                id: format!("{}-{}", prefix, i),
                prompt: format!("Question {}", i),
                question_type: QuestionType::ShortAnswer,
                options: None,
                correct_answer: "answer".into(),
                explanation: None,
                points: 1,
                category: category.into(),
                difficulty: "medium".into(),
                sort_order: i as i32,
            })
            .collect()
    }

    #[test]
    fn personalized_paper_takes_ten_from_each_category() {
        let core = pool(CORE_CATEGORY, "dsa", 25);
        let web = pool("Web Development", "web", 14);
        let mut rng = StdRng::seed_from_u64(7);

        let paper = personalized_paper(&core, &web, &mut rng);

        assert_eq!(paper.len(), 20);
        assert_eq!(paper.iter().filter(|q| q.category == CORE_CATEGORY).count(), 10);
        assert_eq!(paper.iter().filter(|q| q.category == "Web Development").count(), 10);
        let ids: HashSet<_> = paper.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn small_pools_contribute_what_they_have() {
        let core = pool(CORE_CATEGORY, "dsa", 4);
        let mut rng = StdRng::seed_from_u64(1);

        let paper = personalized_paper(&core, &[], &mut rng);

        assert_eq!(paper.len(), 4);
        assert!(paper.iter().all(|q| q.category == CORE_CATEGORY));
    }

    #[test]
    fn personalized_paper_mixes_categories() {
        let core = pool(CORE_CATEGORY, "dsa", 10);
        let ml = pool("Machine Learning", "ml", 10);
        let mut rng = StdRng::seed_from_u64(42);

        let paper = personalized_paper(&core, &ml, &mut rng);

        // The final shuffle should not leave the core block in front.
        let leading_core = paper
            .iter()
            .take_while(|q| q.category == CORE_CATEGORY)
            .count();
        assert!(leading_core < 10);
    }

    #[test]
    fn same_seed_gives_same_paper() {
        let core = pool(CORE_CATEGORY, "dsa", 30);
        let web = pool("Web Development", "web", 30);

        let first = personalized_paper(&core, &web, &mut StdRng::seed_from_u64(99));
        let second = personalized_paper(&core, &web, &mut StdRng::seed_from_u64(99));

        assert_eq!(first, second);
    }
}
