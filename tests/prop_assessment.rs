// tests/prop_assessment.rs

use std::collections::{HashMap, HashSet};

use learnhub::{
    assessment::{provider, scorer},
    config::{CORE_CATEGORY, PERSONALIZED_PER_CATEGORY},
    models::question::{Question, QuestionType},
};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

fn pool(category: &str, prefix: &str, n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| Question {
            id: format!("{}-{}", prefix, i),
            prompt: format!("Question {}", i),
            question_type: QuestionType::ShortAnswer,
            options: None,
            correct_answer: "answer".to_string(),
            explanation: None,
            points: 1,
            category: category.to_string(),
            difficulty: "medium".to_string(),
            sort_order: i as i32,
        })
        .collect()
}

/// A question of a random type; multiple choice keys are option indices.
fn question_strategy() -> impl Strategy<Value = (QuestionType, String, i32)> {
    prop_oneof![
        (0usize..4).prop_map(|i| (QuestionType::MultipleChoice, i.to_string())),
        prop_oneof![Just("True"), Just("False")]
            .prop_map(|s| (QuestionType::TrueFalse, s.to_string())),
        "[a-zA-Z]{1,8}".prop_map(|s| (QuestionType::ShortAnswer, s)),
    ]
    .prop_flat_map(|(ty, key)| (Just(ty), Just(key), 1i32..5))
}

fn build_questions(specs: &[(QuestionType, String, i32)], categories: &[u8]) -> Vec<Question> {
    specs
        .iter()
        .zip(categories.iter().cycle())
        .enumerate()
        .map(|(i, ((ty, key, points), category))| Question {
            id: format!("q{}", i),
            prompt: format!("Question {}", i),
            question_type: *ty,
            options: match ty {
                QuestionType::MultipleChoice => {
                    Some(vec!["a".into(), "b".into(), "c".into(), "d".into()])
                }
                QuestionType::TrueFalse => Some(vec!["True".into(), "False".into()]),
                QuestionType::ShortAnswer => None,
            },
            correct_answer: key.clone(),
            explanation: None,
            points: *points,
            category: format!("Category {}", category),
            difficulty: "easy".to_string(),
            sort_order: i as i32,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_personalized_paper_is_ten_plus_ten_without_duplicates(
        core_size in PERSONALIZED_PER_CATEGORY..60,
        specialization_size in PERSONALIZED_PER_CATEGORY..60,
        seed in any::<u64>(),
    ) {
        let core = pool(CORE_CATEGORY, "dsa", core_size);
        let web = pool("Web Development", "web", specialization_size);
        let mut rng = StdRng::seed_from_u64(seed);

        let paper = provider::personalized_paper(&core, &web, &mut rng);

        prop_assert_eq!(paper.len(), 2 * PERSONALIZED_PER_CATEGORY);
        prop_assert_eq!(
            paper.iter().filter(|q| q.category == CORE_CATEGORY).count(),
            PERSONALIZED_PER_CATEGORY
        );
        prop_assert_eq!(
            paper.iter().filter(|q| q.category == "Web Development").count(),
            PERSONALIZED_PER_CATEGORY
        );
        let ids: HashSet<_> = paper.iter().map(|q| q.id.as_str()).collect();
        prop_assert_eq!(ids.len(), paper.len());
    }

    #[test]
    fn prop_small_pools_are_used_whole(
        core_size in 0usize..PERSONALIZED_PER_CATEGORY,
        specialization_size in 0usize..PERSONALIZED_PER_CATEGORY,
        seed in any::<u64>(),
    ) {
        let core = pool(CORE_CATEGORY, "dsa", core_size);
        let ml = pool("Machine Learning", "ml", specialization_size);
        let mut rng = StdRng::seed_from_u64(seed);

        let paper = provider::personalized_paper(&core, &ml, &mut rng);

        prop_assert_eq!(paper.len(), core_size + specialization_size);
        let ids: HashSet<_> = paper.iter().map(|q| q.id.as_str()).collect();
        prop_assert_eq!(ids.len(), paper.len());
    }

    #[test]
    fn prop_score_percentage_is_rounded_ratio(
        specs in prop::collection::vec(question_strategy(), 1..30),
        categories in prop::collection::vec(0u8..4, 1..5),
        picks in prop::collection::vec(prop::option::of(0usize..3), 30),
    ) {
        let questions = build_questions(&specs, &categories);

        // Each question is left blank, answered with its key, or answered wrongly.
        let answers: HashMap<String, String> = questions
            .iter()
            .zip(picks.iter())
            .filter_map(|(q, pick)| {
                let answer = match pick {
                    None => return None,
                    Some(0) => q.correct_answer.to_uppercase(),
                    Some(1) => format!("{}-wrong", q.correct_answer),
                    Some(_) => "   ".to_string(),
                };
                Some((q.id.clone(), answer))
            })
            .collect();

        let report = scorer::score(&questions, &answers).unwrap();

        prop_assert!(report.correct_count <= report.total_questions);
        prop_assert_eq!(report.total_questions, questions.len());
        let expected =
            (100.0 * report.correct_count as f64 / report.total_questions as f64).round() as u32;
        prop_assert_eq!(report.percentage, expected);
        prop_assert!(report.points_earned <= report.points_possible);

        let per_category: u32 = report.categories.values().map(|c| c.correct).sum();
        let totals: u32 = report.categories.values().map(|c| c.total).sum();
        prop_assert_eq!(per_category as usize, report.correct_count);
        prop_assert_eq!(totals as usize, report.total_questions);
    }
}
