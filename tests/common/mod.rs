// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use learnhub::{
    config::{CORE_CATEGORY, Config},
    models::{
        assessment::Assessment,
        course::Course,
        question::{Question, QuestionType},
        site::HomepageSection,
        study::StudyMaterial,
    },
    routes,
    state::AppState,
    store::MemoryStore,
    utils::jwt::sign_jwt,
};

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Bearer token for the given user, valid for ten minutes.
    pub fn token(&self, user_id: &str, role: &str) -> String {
        sign_jwt(user_id, role, JWT_SECRET, 600).expect("Failed to sign token")
    }
}

pub fn question(id: &str, category: &str, question_type: QuestionType, correct: &str) -> Question {
    let options = match question_type {
        QuestionType::MultipleChoice => Some(vec![
            "3".to_string(),
            "4".to_string(),
            "5".to_string(),
        ]),
        QuestionType::TrueFalse => Some(vec!["True".to_string(), "False".to_string()]),
        QuestionType::ShortAnswer => None,
    };

    Question {
        id: id.to_string(),
        prompt: format!("Prompt for {}", id),
        question_type,
        options,
        correct_answer: correct.to_string(),
        explanation: None,
        points: 1,
        category: category.to_string(),
        difficulty: "easy".to_string(),
        sort_order: 0,
    }
}

async fn seed(store: &MemoryStore) {
    store
        .insert_course(Course {
            id: "c1".to_string(),
            title: "Modern Web Development".to_string(),
            description: Some("HTML, CSS and beyond".to_string()),
            specialization: "Web Development".to_string(),
            published: true,
        })
        .await;
    store
        .insert_course(Course {
            id: "c2".to_string(),
            title: "Draft Course".to_string(),
            description: None,
            specialization: "Machine Learning".to_string(),
            published: false,
        })
        .await;

    for (i, id) in ["m1", "m2"].iter().enumerate() {
        store
            .insert_material(StudyMaterial {
                id: id.to_string(),
                course_id: "c1".to_string(),
                title: format!("Lesson {}", i + 1),
                kind: "video".to_string(),
                url: None,
                sort_order: i as i32,
            })
            .await;
    }

    // "What is 2 + 2?" with options 3 / 4 / 5, and "Capital of France?"
    let mut q1 = question("q1", "Web Development", QuestionType::MultipleChoice, "1");
    q1.sort_order = 1;
    let mut q2 = question("q2", "Web Development", QuestionType::ShortAnswer, "Paris");
    q2.sort_order = 2;
    store
        .insert_assessment(
            Assessment {
                id: "a1".to_string(),
                title: "Web Basics".to_string(),
                description: None,
                duration_minutes: 10,
                total_marks: 2,
                passing_marks: 1,
                course_id: Some("c1".to_string()),
            },
            vec![q2, q1],
        )
        .await;

    let bank = (0..12)
        .map(|i| question(&format!("core-{}", i), CORE_CATEGORY, QuestionType::TrueFalse, "0"))
        .chain((0..12).map(|i| {
            question(
                &format!("web-{}", i),
                "Web Development",
                QuestionType::ShortAnswer,
                "html",
            )
        }))
        .chain((0..4).map(|i| {
            question(
                &format!("ml-{}", i),
                "Machine Learning",
                QuestionType::ShortAnswer,
                "gradient",
            )
        }));
    store.insert_bank_questions(bank).await;

    store.insert_setting("site_name", "LearnHub").await;
    store.insert_setting("contact_email", "hello@learnhub.dev").await;
    store
        .insert_homepage_section(HomepageSection {
            id: "h1".to_string(),
            section: "hero".to_string(),
            title: "Learn by doing".to_string(),
            body: None,
            sort_order: 0,
        })
        .await;
}

/// Spawns the app on a random port backed by a seeded in-memory store.
pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    seed(&store).await;

    let config = Config {
        database_url: None,
        jwt_secret: JWT_SECRET.to_string(),
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        personalized_pass_percentage: 60,
    };

    let state = AppState::new(store.clone(), config);
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        store,
        client: reqwest::Client::new(),
    }
}
