// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::item::{Item, ItemKind};

/// Lifecycle state of an enrollment / attempt.
///
/// `NotEligible` through `Certified` follow the attempt policy: a learner
/// must have validated proof of prerequisite work before starting, may not
/// exceed the attempt ceiling, is locked out on repeated integrity flags,
/// and is certified once the best score clears the certification threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttemptState {
    NotEligible,
    Eligible,
    InProgress,
    Completed,
    Locked,
    Certified,
}

/// One learner answer to one item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub item_index: usize,
    pub kind: ItemKind,

    /// Raw answer text for free-text items.
    pub text: Option<String>,

    /// Selected choice index for objective items.
    pub selected_choice: Option<usize>,

    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

impl Response {
    /// The free-text body of this response, empty when absent. Analyzers
    /// must stay total over arbitrary input, so a missing body is scored
    /// as an empty answer rather than rejected.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// One exam session for a (learner, topic) pair.
///
/// Responses are positional: `responses[i]` answers `items[i]`. A completed
/// attempt has exactly one response per item; grading rejects anything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: Uuid,
    pub learner_id: String,
    pub topic_id: String,

    /// 1-based attempt number within the enrollment.
    pub ordinal: u32,

    pub items: Vec<Item>,
    pub responses: Vec<Option<Response>>,

    pub state: AttemptState,

    pub objective: Option<ObjectiveSection>,
    pub free_text: Option<FreeTextSection>,
    pub total_score: Option<u32>,
    pub integrity_flags: u32,

    pub started_at: chrono::DateTime<chrono::Utc>,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl AttemptRecord {
    pub fn new(learner_id: &str, topic_id: &str, ordinal: u32, items: Vec<Item>) -> Self {
        let responses = vec![None; items.len()];
        Self {
            id: Uuid::new_v4(),
            learner_id: learner_id.to_string(),
            topic_id: topic_id.to_string(),
            ordinal,
            items,
            responses,
            state: AttemptState::InProgress,
            objective: None,
            free_text: None,
            total_score: None,
            integrity_flags: 0,
            started_at: chrono::Utc::now(),
            graded_at: None,
        }
    }

    pub fn answered_count(&self) -> usize {
        self.responses.iter().filter(|r| r.is_some()).count()
    }
}

/// Qualitative flag attached to a free-text evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseFlag {
    TooShort,
    Generic,
    Shallow,
    ScoreAdjusted,
}

/// Analyzer output for a single free-text response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextEvaluation {
    /// Score in [0, 1].
    pub score: f64,
    pub flags: Vec<ResponseFlag>,
    pub word_count: usize,
    pub analysis: String,
}

/// Per-item grading outcome for the objective section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemGrade {
    pub item_index: usize,
    pub selected: Option<usize>,
    pub correct: bool,
}

/// Objective-section result: strict-equality grading against the correct
/// choice index. A null answer is wrong; "any answer counts" is not a policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveSection {
    pub correct: usize,
    pub total: usize,
    pub per_item: Vec<ItemGrade>,
}

/// Free-text-section result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeTextSection {
    pub evaluations: Vec<TextEvaluation>,
    /// Mean of evaluation scores, in [0, 1].
    pub average: f64,
}

/// Full scoring breakdown on the configured point budget, split evenly
/// between the two sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub objective: ObjectiveSection,
    pub free_text: FreeTextSection,
    pub objective_points: u32,
    pub free_text_points: u32,
    pub total_points: u32,
}

/// Correction applied by the cross-validator. Corrections are expected,
/// recoverable adjustments; they are reported as flags, never as errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Correction {
    CorrectCountClamped,
    ScoreAdjusted { item_index: usize },
}

/// Final outcome of grading one attempt.
#[derive(Debug, Clone, Serialize)]
pub struct GradedOutcome {
    pub total_score: u32,
    pub objective_score: u32,
    pub free_text_score: u32,
    pub integrity_flags: u32,
    pub corrections: Vec<Correction>,
    pub new_state: AttemptState,
    pub passed: bool,
    pub certified: bool,
    pub best_score: u32,
}

/// DTO for starting an attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct StartAttemptRequest {
    #[validate(length(min = 1, max = 128))]
    pub learner_id: String,
    #[validate(length(min = 1, max = 128))]
    pub topic_id: String,
}

/// DTO for recording one response.
#[derive(Debug, Deserialize, Validate)]
pub struct RecordResponseRequest {
    pub item_index: usize,
    #[validate(length(max = 20000))]
    pub text: Option<String>,
    pub selected_choice: Option<usize>,
}

/// DTO describing an attempt's current status.
#[derive(Debug, Serialize)]
pub struct AttemptStatusResponse {
    pub id: Uuid,
    pub topic_id: String,
    pub ordinal: u32,
    pub state: AttemptState,
    pub item_count: usize,
    pub answered_count: usize,
    pub total_score: Option<u32>,
    pub integrity_flags: u32,
}
