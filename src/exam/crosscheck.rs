// src/exam/crosscheck.rs

use crate::catalog::TopicProfile;
use crate::config::ExamConfig;
use crate::error::AppError;
use crate::exam::aggregator;
use crate::models::attempt::{Correction, Response, ResponseFlag, ScoreBreakdown};
use crate::models::item::{Item, ItemKind};

/// Score difference above which an evaluation is replaced with the midpoint
/// of original and expected.
const ADJUSTMENT_TOLERANCE: f64 = 0.3;
/// Character length below which a high score is treated as suspicious.
const SHORT_ANSWER_CHARS: usize = 50;
/// Ceiling applied to short-but-high-scored answers.
const SHORT_ANSWER_CAP: f64 = 0.4;

/// Re-examine an aggregated score against the topic's concept catalog and
/// the raw responses, correcting internally-inconsistent or suspiciously
/// inflated values in place.
///
/// Corrections are expected, recoverable adjustments: they are recorded as
/// flags and logged, never raised as errors. Section averages and the total
/// are recomputed after any change.
pub fn audit(
    breakdown: &mut ScoreBreakdown,
    profile: &TopicProfile,
    items: &[Item],
    responses: &[Option<Response>],
    cfg: &ExamConfig,
) -> Result<Vec<Correction>, AppError> {
    let mut corrections = Vec::new();

    // Invariant: correct count can never exceed the item count.
    if breakdown.objective.correct > breakdown.objective.total {
        tracing::warn!(
            correct = breakdown.objective.correct,
            total = breakdown.objective.total,
            "Objective correct count exceeded total, clamping"
        );
        breakdown.objective.correct = breakdown.objective.total;
        corrections.push(Correction::CorrectCountClamped);
    }

    // Pair each free-text evaluation with its raw response, in item order.
    let texts: Vec<(usize, &str)> = items
        .iter()
        .zip(responses)
        .enumerate()
        .filter(|(_, (item, _))| item.kind == ItemKind::FreeText)
        .map(|(index, (_, slot))| {
            let response = slot.as_ref().ok_or_else(|| {
                AppError::AttemptShapeInvalid(format!("item {} has no response", index))
            })?;
            Ok((index, response.text_or_empty()))
        })
        .collect::<Result<_, AppError>>()?;

    if texts.len() != breakdown.free_text.evaluations.len() {
        return Err(AppError::AttemptShapeInvalid(format!(
            "{} free-text responses but {} evaluations",
            texts.len(),
            breakdown.free_text.evaluations.len()
        )));
    }

    for (evaluation, (item_index, text)) in breakdown.free_text.evaluations.iter_mut().zip(&texts) {
        let concept_count = profile.count_concepts(text);
        let expected = expected_score(evaluation.score, concept_count, text.chars().count());

        if (expected - evaluation.score).abs() > ADJUSTMENT_TOLERANCE {
            let corrected = (evaluation.score + expected) / 2.0;
            tracing::info!(
                item_index,
                original = evaluation.score,
                corrected,
                "Free-text score adjusted for consistency"
            );
            evaluation.score = corrected;
            evaluation.flags.push(ResponseFlag::ScoreAdjusted);
            corrections.push(Correction::ScoreAdjusted {
                item_index: *item_index,
            });
        }
    }

    let evaluations = &breakdown.free_text.evaluations;
    breakdown.free_text.average = if evaluations.is_empty() {
        0.0
    } else {
        evaluations.iter().map(|e| e.score).sum::<f64>() / evaluations.len() as f64
    };

    aggregator::apply_points(breakdown, cfg);

    Ok(corrections)
}

/// The score the catalog evidence would predict: a small bonus when the
/// response reuses several of the topic's valid concepts, and a hard cap
/// when a very short answer was scored high.
fn expected_score(original: f64, concept_count: usize, text_chars: usize) -> f64 {
    let mut expected = original;

    if concept_count >= 3 {
        expected += 0.1;
    }
    if concept_count >= 5 {
        expected += 0.1;
    }

    if text_chars < SHORT_ANSWER_CHARS && original > 0.6 {
        expected = expected.min(SHORT_ANSWER_CAP);
    }

    expected.clamp(0.0, 1.0)
}
