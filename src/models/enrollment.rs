// src/models/enrollment.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::attempt::AttemptState;

/// Per-(learner, topic) aggregate, created on first proof submission.
///
/// `best_score` is monotonically non-decreasing across attempts and is what
/// gates certification. `certification_id`, once minted, is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub learner_id: String,
    pub topic_id: String,
    pub state: AttemptState,
    pub attempt_count: u32,
    pub best_score: u32,
    pub locked: bool,
    pub proof_validated: bool,
    pub certification_id: Option<String>,
}

impl EnrollmentRecord {
    pub fn new(learner_id: &str, topic_id: &str) -> Self {
        Self {
            learner_id: learner_id.to_string(),
            topic_id: topic_id.to_string(),
            state: AttemptState::NotEligible,
            attempt_count: 0,
            best_score: 0,
            locked: false,
            proof_validated: false,
            certification_id: None,
        }
    }
}

/// DTO for validating prerequisite proof.
#[derive(Debug, Deserialize, Validate)]
pub struct ValidateProofRequest {
    #[validate(length(min = 1, max = 128))]
    pub learner_id: String,
    #[validate(length(min = 1, max = 128))]
    pub topic_id: String,
}

/// DTO for the certification verification lookup.
#[derive(Debug, Serialize)]
pub struct CertificationLookupResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}
