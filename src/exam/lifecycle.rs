// src/exam/lifecycle.rs

use uuid::Uuid;

use crate::catalog::TopicProfile;
use crate::config::ExamConfig;
use crate::error::{AppError, EligibilityReason};
use crate::exam::analyzer::ResponseAnalyzer;
use crate::exam::integrity::{IntegrityDetector, Recommendation};
use crate::exam::{aggregator, crosscheck};
use crate::models::attempt::{AttemptRecord, AttemptState, GradedOutcome};
use crate::models::enrollment::EnrollmentRecord;
use crate::models::item::ItemKind;

/// Record validated prerequisite proof, making the enrollment eligible for
/// its first attempt.
pub fn validate_proof(enrollment: &mut EnrollmentRecord) {
    enrollment.proof_validated = true;
    if enrollment.state == AttemptState::NotEligible {
        enrollment.state = AttemptState::Eligible;
    }
}

/// Check whether the enrollment may start an attempt right now.
pub fn authorize_start(enrollment: &EnrollmentRecord, cfg: &ExamConfig) -> Result<(), AppError> {
    if !enrollment.proof_validated {
        return Err(AppError::AttemptNotEligible(EligibilityReason::NoProof));
    }
    if enrollment.locked || enrollment.state == AttemptState::Locked {
        return Err(AppError::AttemptNotEligible(EligibilityReason::Locked));
    }
    if enrollment.certification_id.is_some() {
        return Err(AppError::AttemptNotEligible(
            EligibilityReason::AlreadyCertified,
        ));
    }
    if enrollment.attempt_count >= cfg.attempt_ceiling {
        return Err(AppError::AttemptNotEligible(EligibilityReason::MaxAttempts));
    }
    Ok(())
}

/// Authorize and open a new attempt, returning its 1-based ordinal.
///
/// The eligibility check and the counter increment must be applied together
/// under the store's write lock; concurrent starts for the same enrollment
/// must not be able to exceed the ceiling.
pub fn begin_attempt(
    enrollment: &mut EnrollmentRecord,
    cfg: &ExamConfig,
) -> Result<u32, AppError> {
    authorize_start(enrollment, cfg)?;
    enrollment.attempt_count += 1;
    enrollment.state = AttemptState::InProgress;
    Ok(enrollment.attempt_count)
}

/// Grade a completed attempt and apply the outcome to the enrollment.
///
/// Runs the aggregator, the cross-validator and the integrity detector,
/// then settles the lifecycle: a `zero` integrity recommendation forces the
/// total to 0 and locks the enrollment; a best score at or above the
/// certification threshold mints the certification id (once, idempotent);
/// otherwise the learner returns to `Eligible` while attempts remain.
pub fn grade_attempt(
    attempt: &mut AttemptRecord,
    enrollment: &mut EnrollmentRecord,
    profile: &TopicProfile,
    analyzer: &ResponseAnalyzer,
    detector: &IntegrityDetector,
    cfg: &ExamConfig,
) -> Result<GradedOutcome, AppError> {
    // Grading runs at most once per attempt; `Completed` is terminal.
    if attempt.state != AttemptState::InProgress {
        return Err(AppError::Conflict(
            "Attempt has already been graded".to_string(),
        ));
    }

    let mut breakdown = aggregator::grade(&attempt.items, &attempt.responses, analyzer, cfg)?;
    let corrections = crosscheck::audit(
        &mut breakdown,
        profile,
        &attempt.items,
        &attempt.responses,
        cfg,
    )?;

    let free_texts = attempt
        .items
        .iter()
        .zip(&attempt.responses)
        .enumerate()
        .filter(|(_, (item, _))| item.kind == ItemKind::FreeText)
        .filter_map(|(index, (_, slot))| slot.as_ref().map(|r| (index, r.text_or_empty())));
    let report = detector.assess(free_texts, cfg.lock_threshold);

    let locked = report.recommendation == Recommendation::Zero;
    let total = if locked { 0 } else { breakdown.total_points };

    attempt.state = AttemptState::Completed;
    attempt.objective = Some(breakdown.objective.clone());
    attempt.free_text = Some(breakdown.free_text.clone());
    attempt.total_score = Some(total);
    attempt.integrity_flags = report.flag_count;
    attempt.graded_at = Some(chrono::Utc::now());

    // Best score is monotone and is what gates certification.
    enrollment.best_score = enrollment.best_score.max(total);

    if locked {
        tracing::warn!(
            learner = %enrollment.learner_id,
            topic = %enrollment.topic_id,
            flags = report.flag_count,
            "Integrity policy triggered, enrollment locked"
        );
        enrollment.locked = true;
        enrollment.state = AttemptState::Locked;
    } else if enrollment.best_score >= cfg.certification_threshold {
        if enrollment.certification_id.is_none() {
            let id = mint_certification_id();
            tracing::info!(
                learner = %enrollment.learner_id,
                topic = %enrollment.topic_id,
                certification_id = %id,
                "Certification minted"
            );
            enrollment.certification_id = Some(id);
        }
        enrollment.state = AttemptState::Certified;
    } else if enrollment.attempt_count < cfg.attempt_ceiling {
        enrollment.state = AttemptState::Eligible;
    } else {
        enrollment.state = AttemptState::Completed;
    }

    Ok(GradedOutcome {
        total_score: total,
        objective_score: breakdown.objective_points,
        free_text_score: breakdown.free_text_points,
        integrity_flags: report.flag_count,
        corrections,
        new_state: enrollment.state,
        passed: total >= cfg.passing_threshold,
        certified: enrollment.certification_id.is_some(),
        best_score: enrollment.best_score,
    })
}

fn mint_certification_id() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("CERT-{}", raw[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attempt::Response;
    use crate::models::item::Item;

    fn profile() -> TopicProfile {
        TopicProfile::new(
            "ml-fundamentals",
            &["gradient descent", "overfitting"],
            &[],
            &["ML Basics"],
        )
    }

    fn enrollment() -> EnrollmentRecord {
        let mut e = EnrollmentRecord::new("learner-1", "ml-fundamentals");
        validate_proof(&mut e);
        e
    }

    fn objective_item() -> Item {
        Item {
            kind: ItemKind::Objective,
            concept: "overfitting".to_string(),
            prompt: "Which technique helps prevent overfitting?".to_string(),
            choices: vec![
                "More parameters".to_string(),
                "Less data".to_string(),
                "Regularization".to_string(),
                "No validation".to_string(),
            ],
            correct_choice: Some(2),
        }
    }

    fn free_text_item() -> Item {
        Item {
            kind: ItemKind::FreeText,
            concept: "gradient descent".to_string(),
            prompt: "Explain gradient descent.".to_string(),
            choices: Vec::new(),
            correct_choice: None,
        }
    }

    fn attempt_with(texts: &[&str], objective_correct: bool) -> AttemptRecord {
        let mut items = vec![objective_item(), objective_item()];
        items.extend(texts.iter().map(|_| free_text_item()));
        let mut attempt = AttemptRecord::new("learner-1", "ml-fundamentals", 1, items);

        let selected = if objective_correct { Some(2) } else { Some(0) };
        for index in 0..2 {
            attempt.responses[index] = Some(Response {
                item_index: index,
                kind: ItemKind::Objective,
                text: None,
                selected_choice: selected,
                submitted_at: chrono::Utc::now(),
            });
        }
        for (offset, text) in texts.iter().enumerate() {
            attempt.responses[2 + offset] = Some(Response {
                item_index: 2 + offset,
                kind: ItemKind::FreeText,
                text: Some(text.to_string()),
                selected_choice: None,
                submitted_at: chrono::Utc::now(),
            });
        }
        attempt
    }

    const STRONG_ANSWER: &str =
        "First, I split the training data and held out a test set. Then I tuned \
         the model with cross-validation because the initial run showed \
         overfitting. For example, adding regularization moved validation \
         accuracy from 72% to 85%. Finally, gradient descent converged once the \
         learning rate was lowered, and I added a test pipeline to catch errors.";

    fn grade(
        attempt: &mut AttemptRecord,
        enrollment: &mut EnrollmentRecord,
    ) -> Result<GradedOutcome, AppError> {
        grade_attempt(
            attempt,
            enrollment,
            &profile(),
            &ResponseAnalyzer::new(),
            &IntegrityDetector::new(),
            &ExamConfig::default(),
        )
    }

    #[test]
    fn attempt_ceiling_is_enforced_atomically_with_the_counter() {
        let cfg = ExamConfig::default();
        let mut e = enrollment();

        assert_eq!(begin_attempt(&mut e, &cfg).unwrap(), 1);
        e.state = AttemptState::Eligible;
        assert_eq!(begin_attempt(&mut e, &cfg).unwrap(), 2);
        e.state = AttemptState::Eligible;

        let err = begin_attempt(&mut e, &cfg).unwrap_err();
        assert!(matches!(
            err,
            AppError::AttemptNotEligible(EligibilityReason::MaxAttempts)
        ));
        assert_eq!(e.attempt_count, 2);
    }

    #[test]
    fn missing_proof_blocks_the_start() {
        let cfg = ExamConfig::default();
        let mut e = EnrollmentRecord::new("learner-1", "ml-fundamentals");
        let err = begin_attempt(&mut e, &cfg).unwrap_err();
        assert!(matches!(
            err,
            AppError::AttemptNotEligible(EligibilityReason::NoProof)
        ));
    }

    #[test]
    fn locked_enrollment_cannot_start() {
        let cfg = ExamConfig::default();
        let mut e = enrollment();
        e.locked = true;
        let err = begin_attempt(&mut e, &cfg).unwrap_err();
        assert!(matches!(
            err,
            AppError::AttemptNotEligible(EligibilityReason::Locked)
        ));
    }

    #[test]
    fn strong_attempt_reaches_certification() {
        let mut e = enrollment();
        let cfg = ExamConfig::default();
        begin_attempt(&mut e, &cfg).unwrap();

        let mut attempt = attempt_with(&[STRONG_ANSWER, STRONG_ANSWER], true);
        let outcome = grade(&mut attempt, &mut e).unwrap();

        assert!(outcome.total_score >= cfg.certification_threshold);
        assert!(outcome.certified);
        assert_eq!(outcome.new_state, AttemptState::Certified);
        assert!(e.certification_id.as_deref().unwrap().starts_with("CERT-"));
    }

    #[test]
    fn certification_id_is_minted_once_and_never_replaced() {
        let mut e = enrollment();
        let cfg = ExamConfig::default();

        begin_attempt(&mut e, &cfg).unwrap();
        let mut first = attempt_with(&[STRONG_ANSWER, STRONG_ANSWER], true);
        grade(&mut first, &mut e).unwrap();
        let minted = e.certification_id.clone().unwrap();

        // Grade another attempt directly; the id must be stable.
        let mut second = attempt_with(&[STRONG_ANSWER, STRONG_ANSWER], true);
        let outcome = grade(&mut second, &mut e).unwrap();
        assert!(outcome.certified);
        assert_eq!(e.certification_id.as_deref(), Some(minted.as_str()));
    }

    #[test]
    fn best_score_never_decreases() {
        let mut e = enrollment();
        let cfg = ExamConfig::default();

        begin_attempt(&mut e, &cfg).unwrap();
        let mut strong = attempt_with(&[STRONG_ANSWER, STRONG_ANSWER], true);
        let first = grade(&mut strong, &mut e).unwrap();

        let mut weak = attempt_with(&["I don't know", "no idea"], false);
        let second = grade(&mut weak, &mut e).unwrap();

        assert!(second.total_score < first.total_score);
        assert_eq!(second.best_score, first.best_score);
        assert_eq!(e.best_score, first.best_score);
    }

    #[test]
    fn two_integrity_flags_zero_the_score_and_lock_the_enrollment() {
        let mut e = enrollment();
        let cfg = ExamConfig::default();
        begin_attempt(&mut e, &cfg).unwrap();

        let ai_a = "As an AI, it's important to note that the gradient vanished.";
        let ai_b = "Certainly! In conclusion, the approach worked well overall.";
        let mut attempt = attempt_with(&[ai_a, ai_b], true);
        let outcome = grade(&mut attempt, &mut e).unwrap();

        assert_eq!(outcome.total_score, 0);
        assert_eq!(outcome.integrity_flags, 2);
        assert_eq!(outcome.new_state, AttemptState::Locked);
        assert!(e.locked);
        assert_eq!(attempt.total_score, Some(0));

        let err = begin_attempt(&mut e, &cfg).unwrap_err();
        assert!(matches!(
            err,
            AppError::AttemptNotEligible(EligibilityReason::Locked)
        ));
    }

    #[test]
    fn failed_attempt_with_attempts_left_returns_to_eligible() {
        let mut e = enrollment();
        let cfg = ExamConfig::default();
        begin_attempt(&mut e, &cfg).unwrap();

        let weak = "I tried a few things during the project but nothing specific comes \
                    to mind right now to be honest with you all things considered";
        let mut attempt = attempt_with(&[weak, weak], false);
        let outcome = grade(&mut attempt, &mut e).unwrap();

        assert!(!outcome.passed);
        assert_eq!(outcome.new_state, AttemptState::Eligible);
    }

    #[test]
    fn regrading_a_completed_attempt_is_rejected() {
        let mut e = enrollment();
        let cfg = ExamConfig::default();
        begin_attempt(&mut e, &cfg).unwrap();

        let mut attempt = attempt_with(&[STRONG_ANSWER, STRONG_ANSWER], false);
        grade(&mut attempt, &mut e).unwrap();
        let err = grade(&mut attempt, &mut e).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
