// src/handlers/certification.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{error::AppError, models::enrollment::CertificationLookupResponse, state::AppState};

/// Verifies a certification identifier.
///
/// An unknown id is a normal outcome (`valid: false`), not an error: this
/// endpoint exists so third parties can check certificates.
pub async fn verify(
    State(state): State<AppState>,
    Path(cert_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let guard = state.store.read().await;

    let response = match guard.enrollment_by_certification(&cert_id) {
        Some(enrollment) => CertificationLookupResponse {
            valid: true,
            topic_id: Some(enrollment.topic_id.clone()),
            learner_id: Some(enrollment.learner_id.clone()),
            score: Some(enrollment.best_score),
        },
        None => CertificationLookupResponse {
            valid: false,
            topic_id: None,
            learner_id: None,
            score: None,
        },
    };

    Ok(Json(response))
}
