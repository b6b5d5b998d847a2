// src/exam/aggregator.rs

use crate::config::ExamConfig;
use crate::error::AppError;
use crate::exam::analyzer::ResponseAnalyzer;
use crate::models::attempt::{
    FreeTextSection, ItemGrade, ObjectiveSection, Response, ScoreBreakdown,
};
use crate::models::item::{Item, ItemKind};

/// Grade a completed attempt's items and responses into section results
/// and a total on the configured point budget (split evenly, each section
/// rounded to the nearest whole point after scaling).
///
/// The attempt shape is the caller's contract: one response per item, kinds
/// matching, choice indices in range. Violations are upstream bugs and fail
/// loudly as `AttemptShapeInvalid`; an unanswered objective choice (`None`)
/// is legal and simply graded wrong.
pub fn grade(
    items: &[Item],
    responses: &[Option<Response>],
    analyzer: &ResponseAnalyzer,
    cfg: &ExamConfig,
) -> Result<ScoreBreakdown, AppError> {
    if responses.len() != items.len() {
        return Err(AppError::AttemptShapeInvalid(format!(
            "{} items but {} responses",
            items.len(),
            responses.len()
        )));
    }

    let mut per_item = Vec::new();
    let mut correct = 0;
    let mut objective_total = 0;
    let mut evaluations = Vec::new();

    for (index, (item, slot)) in items.iter().zip(responses).enumerate() {
        let response = slot.as_ref().ok_or_else(|| {
            AppError::AttemptShapeInvalid(format!("item {} has no response", index))
        })?;
        if response.kind != item.kind {
            return Err(AppError::AttemptShapeInvalid(format!(
                "item {} response kind mismatch",
                index
            )));
        }

        match item.kind {
            ItemKind::Objective => {
                if let Some(selected) = response.selected_choice {
                    if selected >= item.choices.len() {
                        return Err(AppError::AttemptShapeInvalid(format!(
                            "item {} choice index {} out of range",
                            index, selected
                        )));
                    }
                }
                // Strict equality against the correct index. A non-null
                // answer is not enough on its own.
                let is_correct = response.selected_choice == item.correct_choice;
                if is_correct {
                    correct += 1;
                }
                objective_total += 1;
                per_item.push(ItemGrade {
                    item_index: index,
                    selected: response.selected_choice,
                    correct: is_correct,
                });
            }
            ItemKind::FreeText => {
                evaluations.push(analyzer.analyze(response.text_or_empty()));
            }
        }
    }

    let average = if evaluations.is_empty() {
        0.0
    } else {
        evaluations.iter().map(|e| e.score).sum::<f64>() / evaluations.len() as f64
    };

    let mut breakdown = ScoreBreakdown {
        objective: ObjectiveSection {
            correct,
            total: objective_total,
            per_item,
        },
        free_text: FreeTextSection {
            evaluations,
            average,
        },
        objective_points: 0,
        free_text_points: 0,
        total_points: 0,
    };
    apply_points(&mut breakdown, cfg);

    Ok(breakdown)
}

/// Scale both sections onto the point budget and recompute the total.
/// Also used by the cross-validator after it adjusts section contents.
pub(crate) fn apply_points(breakdown: &mut ScoreBreakdown, cfg: &ExamConfig) {
    let half_budget = cfg.point_budget as f64 / 2.0;

    let objective_ratio = if breakdown.objective.total == 0 {
        0.0
    } else {
        breakdown.objective.correct as f64 / breakdown.objective.total as f64
    };

    breakdown.objective_points = (objective_ratio * half_budget).round() as u32;
    breakdown.free_text_points = (breakdown.free_text.average * half_budget).round() as u32;
    breakdown.total_points = breakdown.objective_points + breakdown.free_text_points;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attempt::ResponseFlag;

    fn objective_item(correct: usize) -> Item {
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
            correct_choice: Some(correct),
        }
    }

    fn free_text_item() -> Item {
        Item {
            kind: ItemKind::FreeText,
            concept: "model evaluation".to_string(),
            prompt: "Explain your evaluation approach.".to_string(),
            choices: Vec::new(),
            correct_choice: None,
        }
    }

    fn choice(index: usize, selected: Option<usize>) -> Option<Response> {
        Some(Response {
            item_index: index,
            kind: ItemKind::Objective,
            text: None,
            selected_choice: selected,
            submitted_at: chrono::Utc::now(),
        })
    }

    fn text(index: usize, body: &str) -> Option<Response> {
        Some(Response {
            item_index: index,
            kind: ItemKind::FreeText,
            text: Some(body.to_string()),
            selected_choice: None,
            submitted_at: chrono::Utc::now(),
        })
    }

    #[test]
    fn objective_grading_is_strict_equality() {
        let items = vec![objective_item(2), objective_item(2), objective_item(2)];
        let responses = vec![choice(0, Some(2)), choice(1, Some(0)), choice(2, None)];

        let breakdown = grade(
            &items,
            &responses,
            &ResponseAnalyzer::new(),
            &ExamConfig::default(),
        )
        .unwrap();

        assert_eq!(breakdown.objective.correct, 1);
        assert_eq!(breakdown.objective.total, 3);
        assert!(breakdown.objective.per_item[0].correct);
        assert!(!breakdown.objective.per_item[1].correct);
        assert!(!breakdown.objective.per_item[2].correct);
    }

    #[test]
    fn sections_scale_onto_the_point_budget() {
        let items = vec![objective_item(1), objective_item(1), free_text_item()];
        let responses = vec![
            choice(0, Some(1)),
            choice(1, Some(1)),
            text(2, "I don't know"),
        ];

        let breakdown = grade(
            &items,
            &responses,
            &ResponseAnalyzer::new(),
            &ExamConfig::default(),
        )
        .unwrap();

        // Full objective section is worth half the 10-point budget.
        assert_eq!(breakdown.objective_points, 5);
        assert_eq!(breakdown.free_text_points, 0);
        assert_eq!(breakdown.total_points, 5);
        assert!(
            breakdown.free_text.evaluations[0]
                .flags
                .contains(&ResponseFlag::TooShort)
        );
    }

    #[test]
    fn response_count_mismatch_fails_loudly() {
        let items = vec![objective_item(0)];
        let err = grade(
            &items,
            &[],
            &ResponseAnalyzer::new(),
            &ExamConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::AttemptShapeInvalid(_)));
    }

    #[test]
    fn missing_response_fails_loudly() {
        let items = vec![objective_item(0)];
        let err = grade(
            &items,
            &[None],
            &ResponseAnalyzer::new(),
            &ExamConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::AttemptShapeInvalid(_)));
    }

    #[test]
    fn out_of_range_choice_fails_loudly() {
        let items = vec![objective_item(0)];
        let responses = vec![choice(0, Some(9))];
        let err = grade(
            &items,
            &responses,
            &ResponseAnalyzer::new(),
            &ExamConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::AttemptShapeInvalid(_)));
    }
}
