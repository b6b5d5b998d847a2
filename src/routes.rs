// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{certification, enrollment, exam},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (enrollments, exams, certifications).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store, exam engine, config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let enrollment_routes = Router::new()
        .route("/proof", post(enrollment::validate_proof))
        .route(
            "/{learner_id}/{topic_id}",
            get(enrollment::get_enrollment),
        );

    let exam_routes = Router::new()
        .route("/start", post(exam::start_attempt))
        .route("/{id}", get(exam::get_attempt))
        .route("/{id}/responses", post(exam::record_response))
        .route("/{id}/submit", post(exam::submit_attempt));

    let certification_routes = Router::new().route("/{id}", get(certification::verify));

    Router::new()
        .nest("/api/enrollments", enrollment_routes)
        .nest("/api/exams", exam_routes)
        .nest("/api/certifications", certification_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
