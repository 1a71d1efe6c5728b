// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{assessments, courses, sessions, site, study},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Public reads (courses, assessments, site content) need no token.
/// * Enrollment, progress, sessions and attempt history require a signed-in user.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let course_routes = Router::new()
        .route("/", get(courses::list_courses))
        .route("/{id}", get(courses::get_course))
        // Protected course routes
        .merge(
            Router::new()
                .route("/{id}/enroll", post(courses::enroll))
                .route("/{id}/enrollment", get(courses::get_enrollment))
                .route("/{id}/progress", get(courses::course_progress))
                .route_layer(auth.clone()),
        );

    let material_routes = Router::new()
        .route("/{id}/progress/toggle", post(study::toggle_progress))
        .route_layer(auth.clone());

    let assessment_routes = Router::new()
        .route("/{id}", get(assessments::get_assessment))
        .merge(
            Router::new()
                .route("/{id}/sessions", post(sessions::start_fixed))
                .route("/{id}/attempts", get(assessments::list_my_attempts))
                .route_layer(auth.clone()),
        );

    let session_routes = Router::new()
        .route("/personalized", post(sessions::start_personalized))
        .route(
            "/{id}",
            get(sessions::get_session).delete(sessions::abandon),
        )
        .route("/{id}/answers", put(sessions::set_answer))
        .route("/{id}/submit", post(sessions::submit))
        .route_layer(auth.clone());

    let site_routes = Router::new()
        .route("/settings", get(site::get_settings))
        .route("/homepage", get(site::get_homepage));

    let admin_routes = Router::new()
        .route(
            "/assessments/{id}/attempts",
            get(assessments::list_all_attempts),
        )
        // Double middleware protection: Auth first, then Admin check
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(auth);

    Router::new()
        .nest("/api/courses", course_routes)
        .nest("/api/materials", material_routes)
        .nest("/api/assessments", assessment_routes)
        .nest("/api/sessions", session_routes)
        .nest("/api/site", site_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
