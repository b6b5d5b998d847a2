// src/models/item.rs

use serde::{Deserialize, Serialize};

/// Kind of an exam item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    /// Multiple-choice question with exactly one correct choice.
    Objective,
    /// Open-ended question graded by the response analyzer.
    FreeText,
}

/// One exam question, as issued to an attempt. Immutable after issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,

    /// The sub-skill this item tests. Used to vary items across attempts
    /// and to bias selection away from already-covered concepts.
    pub concept: String,

    pub prompt: String,

    /// Choice texts for objective items; empty for free-text items.
    pub choices: Vec<String>,

    /// Index into `choices` of the correct answer. `None` for free-text.
    pub correct_choice: Option<usize>,
}

impl Item {
    /// An item is well-formed when its correct-choice index (if any)
    /// points into its choice list.
    pub fn is_well_formed(&self) -> bool {
        match self.kind {
            ItemKind::Objective => self
                .correct_choice
                .is_some_and(|idx| idx < self.choices.len()),
            ItemKind::FreeText => self.correct_choice.is_none(),
        }
    }
}

/// DTO for sending an item to the learner (excludes the correct choice).
#[derive(Debug, Serialize)]
pub struct PublicItem {
    pub index: usize,
    pub kind: ItemKind,
    pub prompt: String,
    pub choices: Vec<String>,
}

impl PublicItem {
    pub fn from_item(index: usize, item: &Item) -> Self {
        Self {
            index,
            kind: item.kind,
            prompt: item.prompt.clone(),
            choices: item.choices.clone(),
        }
    }
}
