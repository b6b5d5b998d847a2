// src/handlers/exam.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    exam::{lifecycle, selector},
    models::{
        attempt::{
            AttemptRecord, AttemptState, AttemptStatusResponse, RecordResponseRequest, Response,
            StartAttemptRequest,
        },
        item::{ItemKind, PublicItem},
    },
    state::AppState,
    store::enrollment_key,
};

/// Starts a new attempt for an enrollment.
///
/// * Checks eligibility and increments the attempt counter atomically
///   under the store's write lock.
/// * Selects and varies items, biased away from concepts covered in the
///   learner's prior attempts for this topic.
/// * Returns the items without the correct choices.
pub async fn start_attempt(
    State(state): State<AppState>,
    Json(payload): Json<StartAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut guard = state.store.write().await;
    let inner = &mut *guard;

    let covered = inner.covered_concepts(&payload.learner_id, &payload.topic_id);

    // No enrollment means no validated proof of prerequisite work yet.
    let enrollment = inner
        .enrollments
        .get_mut(&enrollment_key(&payload.learner_id, &payload.topic_id))
        .ok_or(AppError::AttemptNotEligible(
            crate::error::EligibilityReason::NoProof,
        ))?;

    let ordinal = lifecycle::begin_attempt(enrollment, &state.config.exam)?;

    let profile = state.engine.catalog.profile(&payload.topic_id);
    let pool = state.engine.bank.pool_for(profile);
    let mut rng = StdRng::from_entropy();
    let items = selector::select_items(
        profile,
        &pool,
        &covered,
        ordinal,
        &state.config.exam,
        &mut rng,
    );

    let attempt = AttemptRecord::new(&payload.learner_id, &payload.topic_id, ordinal, items);
    let public: Vec<PublicItem> = attempt
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| PublicItem::from_item(i, item))
        .collect();

    tracing::info!(
        learner = %payload.learner_id,
        topic = %payload.topic_id,
        ordinal,
        attempt_id = %attempt.id,
        "Attempt started"
    );

    let attempt_id = attempt.id;
    inner.attempts.insert(attempt.id, attempt);

    Ok(Json(serde_json::json!({
        "attempt_id": attempt_id,
        "ordinal": ordinal,
        "items": public,
    })))
}

/// Records one response on an in-progress attempt. Responses are
/// positional and may be revised until the attempt is submitted.
pub async fn record_response(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
    Json(payload): Json<RecordResponseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut guard = state.store.write().await;
    let attempt = guard
        .attempts
        .get_mut(&attempt_id)
        .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))?;

    if attempt.state != AttemptState::InProgress {
        return Err(AppError::Conflict(
            "Attempt is no longer accepting responses".to_string(),
        ));
    }

    let item = attempt.items.get(payload.item_index).ok_or_else(|| {
        AppError::BadRequest(format!("Item index {} out of range", payload.item_index))
    })?;

    if item.kind == ItemKind::Objective {
        if let Some(selected) = payload.selected_choice {
            if selected >= item.choices.len() {
                return Err(AppError::BadRequest(format!(
                    "Choice index {} out of range",
                    selected
                )));
            }
        }
    }

    let response = Response {
        item_index: payload.item_index,
        kind: item.kind,
        text: payload.text,
        selected_choice: payload.selected_choice,
        submitted_at: chrono::Utc::now(),
    };
    attempt.responses[payload.item_index] = Some(response);

    Ok(Json(serde_json::json!({
        "recorded": true,
        "answered": attempt.answered_count(),
        "total": attempt.items.len(),
    })))
}

/// Submits an attempt for grading.
///
/// Runs the full pipeline (aggregation, cross-validation, integrity
/// assessment, lifecycle settlement) synchronously and writes the outcome
/// back into the attempt and enrollment records.
pub async fn submit_attempt(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut guard = state.store.write().await;
    let crate::store::StoreInner {
        attempts,
        enrollments,
    } = &mut *guard;

    let attempt = attempts
        .get_mut(&attempt_id)
        .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))?;

    let enrollment = enrollments
        .get_mut(&enrollment_key(&attempt.learner_id, &attempt.topic_id))
        .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

    let profile = state.engine.catalog.profile(&attempt.topic_id);
    let outcome = lifecycle::grade_attempt(
        attempt,
        enrollment,
        profile,
        &state.engine.analyzer,
        &state.engine.detector,
        &state.config.exam,
    )?;

    tracing::info!(
        attempt_id = %attempt_id,
        total = outcome.total_score,
        state = ?outcome.new_state,
        "Attempt graded"
    );

    Ok(Json(outcome))
}

/// Returns the current status of an attempt.
pub async fn get_attempt(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let guard = state.store.read().await;
    let attempt = guard
        .attempts
        .get(&attempt_id)
        .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))?;

    Ok(Json(AttemptStatusResponse {
        id: attempt.id,
        topic_id: attempt.topic_id.clone(),
        ordinal: attempt.ordinal,
        state: attempt.state,
        item_count: attempt.items.len(),
        answered_count: attempt.answered_count(),
        total_score: attempt.total_score,
        integrity_flags: attempt.integrity_flags,
    }))
}
