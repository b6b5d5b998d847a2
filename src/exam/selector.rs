// src/exam/selector.rs

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::bank::{self, TopicPool};
use crate::catalog::TopicProfile;
use crate::config::ExamConfig;
use crate::models::item::{Item, ItemKind};

/// Rotating prefix clauses applied to every prompt on retry attempts, so a
/// retry reads as different text even when the underlying concept repeats.
const RETRY_PREFIXES: [&str; 4] = [
    "Considering what you learned, ",
    "Based on your project work, ",
    "From a practical standpoint, ",
    "In a production environment, ",
];

/// Choose and vary the items for one attempt.
///
/// Within each kind, templates whose concept was already covered in prior
/// attempts sort after those that were not (stable otherwise); shuffling
/// happens before the sort, so order is random within each priority group.
/// Pools shorter than the configured count are padded with filler items
/// synthesized from the topic's concept list. Pure apart from `rng`, which
/// is injected so selection is reproducible in tests.
pub fn select_items(
    profile: &TopicProfile,
    pool: &TopicPool,
    covered: &HashSet<String>,
    ordinal: u32,
    cfg: &ExamConfig,
    rng: &mut impl Rng,
) -> Vec<Item> {
    let mut items = Vec::with_capacity(cfg.objective_count + cfg.free_text_count);

    let mut objective = pool.objective.clone();
    objective.shuffle(rng);
    objective.sort_by_key(|t| covered.contains(&t.concept));
    objective.truncate(cfg.objective_count);
    while objective.len() < cfg.objective_count {
        objective.push(bank::filler_objective(
            &profile.valid_concepts,
            objective.len(),
        ));
    }

    for template in objective {
        let (prompt, choices, correct) = if ordinal > 1 {
            let (choices, correct) = reshuffle_choices(&template.choices, template.correct, rng);
            (rephrase(&template.prompt, ordinal), choices, correct)
        } else {
            (
                template.prompt.clone(),
                template.choices.clone(),
                template.correct,
            )
        };
        items.push(Item {
            kind: ItemKind::Objective,
            concept: template.concept.clone(),
            prompt,
            choices,
            correct_choice: Some(correct),
        });
    }

    let mut free_text = pool.free_text.clone();
    free_text.shuffle(rng);
    free_text.sort_by_key(|t| covered.contains(&t.concept));
    free_text.truncate(cfg.free_text_count);
    while free_text.len() < cfg.free_text_count {
        free_text.push(bank::filler_free_text(
            &profile.valid_concepts,
            free_text.len(),
        ));
    }

    for template in free_text {
        let prompt = if ordinal > 1 {
            rephrase(&template.prompt, ordinal)
        } else {
            template.prompt.clone()
        };
        items.push(Item {
            kind: ItemKind::FreeText,
            concept: template.concept.clone(),
            prompt,
            choices: Vec::new(),
            correct_choice: None,
        });
    }

    items
}

/// Deterministic rephrasing for retry attempts: a prefix clause keyed by
/// the attempt ordinal, with the original first letter lowercased.
fn rephrase(prompt: &str, ordinal: u32) -> String {
    let prefix = RETRY_PREFIXES[((ordinal - 1) as usize) % RETRY_PREFIXES.len()];
    let mut chars = prompt.chars();
    match chars.next() {
        Some(first) => format!("{}{}{}", prefix, first.to_lowercase(), chars.as_str()),
        None => prefix.trim_end().to_string(),
    }
}

/// Randomize choice order while tracking where the correct choice lands.
fn reshuffle_choices(
    choices: &[String],
    correct: usize,
    rng: &mut impl Rng,
) -> (Vec<String>, usize) {
    let mut order: Vec<usize> = (0..choices.len()).collect();
    order.shuffle(rng);
    let shuffled = order.iter().map(|&i| choices[i].clone()).collect();
    // `order` is a permutation of 0..len, so `correct` is always found.
    let new_correct = order.iter().position(|&i| i == correct).unwrap_or(correct);
    (shuffled, new_correct)
}
