// tests/session_tests.rs

mod common;

use common::{TestApp, spawn_app};
use learnhub::config::CORE_CATEGORY;
use serde_json::{Value, json};

async fn start_fixed(app: &TestApp, token: &str) -> Value {
    let response = app
        .client
        .post(app.url("/api/assessments/a1/sessions"))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    response.json().await.unwrap()
}

async fn answer(app: &TestApp, token: &str, session_id: &str, question_id: &str, answer: &str) -> reqwest::Response {
    app.client
        .put(app.url(&format!("/api/sessions/{}/answers", session_id)))
        .bearer_auth(token)
        .json(&json!({ "question_id": question_id, "answer": answer }))
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn assessment_config_is_public() {
    let app = spawn_app().await;

    let assessment: Value = app
        .client
        .get(app.url("/api/assessments/a1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(assessment["title"], "Web Basics");
    assert_eq!(assessment["duration_minutes"], 10);
}

#[tokio::test]
async fn fixed_session_flow() {
    let app = spawn_app().await;
    let token = app.token("learner-1", "student");

    // 1. Start: questions in display order, answer key withheld
    let view = start_fixed(&app, &token).await;
    let session_id = view["id"].as_str().unwrap().to_string();
    assert_eq!(view["status"], "in_progress");
    assert_eq!(view["mode"], "fixed");
    assert_eq!(view["total_questions"], 2);
    assert_eq!(view["display"], "10:00");
    assert_eq!(view["urgent"], false);
    assert_eq!(view["questions"][0]["id"], "q1");
    assert!(view["questions"][0].get("correct_answer").is_none());

    // 2. Answer, then overwrite
    let answered: Value = answer(&app, &token, &session_id, "q1", "0").await.json().await.unwrap();
    assert_eq!(answered["answered_count"], 1);
    answer(&app, &token, &session_id, "q1", "1").await;
    let answered: Value = answer(&app, &token, &session_id, "q2", "  paris ")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(answered["answered_count"], 2);

    // 3. Submit
    let response = app
        .client
        .post(app.url(&format!("/api/sessions/{}/submit", session_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let result: Value = response.json().await.unwrap();
    assert_eq!(result["attempt"]["correct_count"], 2);
    assert_eq!(result["attempt"]["total_questions"], 2);
    assert_eq!(result["attempt"]["percentage"], 100);
    assert_eq!(result["attempt"]["passed"], true);
    assert_eq!(result["review"].as_array().unwrap().len(), 2);

    // 4. Session is released once submitted
    let gone = app
        .client
        .get(app.url(&format!("/api/sessions/{}", session_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status().as_u16(), 404);

    // 5. History holds exactly one attempt
    let history: Vec<Value> = app
        .client
        .get(app.url("/api/assessments/a1/attempts"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["score"], 2);
}

#[tokio::test]
async fn unanswered_questions_score_as_incorrect() {
    let app = spawn_app().await;
    let token = app.token("learner-1", "student");

    let view = start_fixed(&app, &token).await;
    let session_id = view["id"].as_str().unwrap();
    answer(&app, &token, session_id, "q1", "1").await;

    let result: Value = app
        .client
        .post(app.url(&format!("/api/sessions/{}/submit", session_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(result["attempt"]["correct_count"], 1);
    assert_eq!(result["attempt"]["percentage"], 50);
}

#[tokio::test]
async fn answering_unknown_question_is_rejected() {
    let app = spawn_app().await;
    let token = app.token("learner-1", "student");

    let view = start_fixed(&app, &token).await;
    let response = answer(&app, &token, view["id"].as_str().unwrap(), "q99", "1").await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn sessions_are_private_to_their_owner() {
    let app = spawn_app().await;
    let owner = app.token("learner-1", "student");
    let other = app.token("learner-2", "student");

    let view = start_fixed(&app, &owner).await;
    let session_id = view["id"].as_str().unwrap();

    let response = app
        .client
        .get(app.url(&format!("/api/sessions/{}", session_id)))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = answer(&app, &other, session_id, "q1", "1").await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn abandoned_session_records_nothing() {
    let app = spawn_app().await;
    let token = app.token("learner-3", "student");

    let view = start_fixed(&app, &token).await;
    let session_id = view["id"].as_str().unwrap();

    let response = app
        .client
        .delete(app.url(&format!("/api/sessions/{}", session_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let history: Vec<Value> = app
        .client
        .get(app.url("/api/assessments/a1/attempts"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn starting_unknown_assessment_is_not_found() {
    let app = spawn_app().await;
    let token = app.token("learner-1", "student");

    let response = app
        .client
        .post(app.url("/api/assessments/missing/sessions"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn personalized_session_mixes_core_and_specialization() {
    let app = spawn_app().await;
    let token = app.token("learner-4", "student");

    let response = app
        .client
        .post(app.url("/api/sessions/personalized"))
        .bearer_auth(&token)
        .json(&json!({ "specialization": "Web Development", "experience": "beginner" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let view: Value = response.json().await.unwrap();
    assert_eq!(view["mode"], "personalized");
    assert_eq!(view["total_questions"], 20);
    assert_eq!(view["display"], "30:00");

    let questions = view["questions"].as_array().unwrap();
    let core = questions
        .iter()
        .filter(|q| q["category"] == CORE_CATEGORY)
        .count();
    let web = questions
        .iter()
        .filter(|q| q["category"] == "Web Development")
        .count();
    assert_eq!(core, 10);
    assert_eq!(web, 10);
}

#[tokio::test]
async fn personalized_session_with_small_pool_uses_what_exists() {
    let app = spawn_app().await;
    let token = app.token("learner-4", "student");

    let view: Value = app
        .client
        .post(app.url("/api/sessions/personalized"))
        .bearer_auth(&token)
        .json(&json!({ "specialization": "Machine Learning", "experience": "advanced" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(view["total_questions"], 14);
}

#[tokio::test]
async fn personalized_session_rejects_core_as_specialization() {
    let app = spawn_app().await;
    let token = app.token("learner-4", "student");

    let response = app
        .client
        .post(app.url("/api/sessions/personalized"))
        .bearer_auth(&token)
        .json(&json!({ "specialization": CORE_CATEGORY, "experience": "intermediate" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn admin_attempt_listing_requires_admin_role() {
    let app = spawn_app().await;
    let student = app.token("learner-1", "student");
    let admin = app.token("staff-1", "admin");

    let view = start_fixed(&app, &student).await;
    app.client
        .post(app.url(&format!("/api/sessions/{}/submit", view["id"].as_str().unwrap())))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap();

    let forbidden = app
        .client
        .get(app.url("/api/admin/assessments/a1/attempts"))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);

    let attempts: Vec<Value> = app
        .client
        .get(app.url("/api/admin/assessments/a1/attempts"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0]["user_id"], "learner-1");
}
