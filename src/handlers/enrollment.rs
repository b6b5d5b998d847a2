// src/handlers/enrollment.rs

use axum::{Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    exam::lifecycle,
    models::enrollment::{EnrollmentRecord, ValidateProofRequest},
    state::AppState,
    store::enrollment_key,
};

/// Records validated proof of prerequisite work for a (learner, topic)
/// pair, creating the enrollment on first submission. This is what makes
/// an enrollment eligible for its first attempt.
pub async fn validate_proof(
    State(state): State<AppState>,
    Json(payload): Json<ValidateProofRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut guard = state.store.write().await;
    let enrollment = guard
        .enrollments
        .entry(enrollment_key(&payload.learner_id, &payload.topic_id))
        .or_insert_with(|| EnrollmentRecord::new(&payload.learner_id, &payload.topic_id));

    lifecycle::validate_proof(enrollment);

    tracing::info!(
        learner = %payload.learner_id,
        topic = %payload.topic_id,
        "Prerequisite proof validated"
    );

    Ok(Json(enrollment.clone()))
}

/// Returns the enrollment for a (learner, topic) pair.
pub async fn get_enrollment(
    State(state): State<AppState>,
    axum::extract::Path((learner_id, topic_id)): axum::extract::Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let guard = state.store.read().await;
    let enrollment = guard
        .enrollments
        .get(&enrollment_key(&learner_id, &topic_id))
        .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

    Ok(Json(enrollment.clone()))
}
