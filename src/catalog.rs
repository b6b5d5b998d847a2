// src/catalog.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Static per-topic reference data: which concepts belong to the topic,
/// which are known off-topic, and the display labels. Pure data, loaded
/// once at process start and passed explicitly into the scoring pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicProfile {
    pub id: String,
    pub valid_concepts: Vec<String>,
    pub invalid_concepts: Vec<String>,
    /// 1–3 human-readable topic labels.
    pub labels: Vec<String>,
}

impl TopicProfile {
    pub fn new(id: &str, valid: &[&str], invalid: &[&str], labels: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            valid_concepts: valid.iter().map(|s| s.to_string()).collect(),
            invalid_concepts: invalid.iter().map(|s| s.to_string()).collect(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Count how many of this topic's valid concepts appear in `text`.
    /// Case-insensitive substring match; used by the cross-validator to
    /// sanity-check free-text scores.
    pub fn count_concepts(&self, text: &str) -> usize {
        let lower = text.to_lowercase();
        self.valid_concepts
            .iter()
            .filter(|c| lower.contains(&c.to_lowercase()))
            .count()
    }
}

/// All known topic profiles, keyed by topic id, with a designated default.
///
/// An unknown topic id falls back to the default profile rather than
/// failing: item generation must never hard-fail on missing catalog data.
#[derive(Debug, Clone)]
pub struct ConceptCatalog {
    topics: HashMap<String, TopicProfile>,
    default_id: String,
}

impl ConceptCatalog {
    pub fn new(topics: Vec<TopicProfile>, default_id: &str) -> Self {
        let topics: HashMap<String, TopicProfile> =
            topics.into_iter().map(|t| (t.id.clone(), t)).collect();
        debug_assert!(topics.contains_key(default_id));
        Self {
            topics,
            default_id: default_id.to_string(),
        }
    }

    /// Look up a profile, falling back to the default for unknown ids.
    pub fn profile(&self, topic_id: &str) -> &TopicProfile {
        self.topics.get(topic_id).unwrap_or_else(|| {
            tracing::warn!("Unknown topic '{}', using default profile", topic_id);
            &self.topics[&self.default_id]
        })
    }

    pub fn contains(&self, topic_id: &str) -> bool {
        self.topics.contains_key(topic_id)
    }

    /// The built-in catalog shipped with the service.
    pub fn builtin() -> Self {
        let topics = vec![
            TopicProfile::new(
                "ml-fundamentals",
                &[
                    "supervised learning",
                    "unsupervised learning",
                    "reinforcement learning",
                    "neural networks",
                    "deep learning",
                    "training data",
                    "test data",
                    "overfitting",
                    "underfitting",
                    "bias",
                    "variance",
                    "accuracy",
                    "precision",
                    "recall",
                    "f1 score",
                    "classification",
                    "regression",
                    "gradient descent",
                    "loss function",
                    "activation function",
                ],
                &["quantum computing", "blockchain", "cryptocurrency", "web3"],
                &["ML Basics", "Model Training", "Evaluation"],
            ),
            TopicProfile::new(
                "prompt-engineering",
                &[
                    "few-shot",
                    "zero-shot",
                    "chain-of-thought",
                    "prompt template",
                    "system prompt",
                    "structured output",
                    "temperature",
                    "top-p",
                    "instruction tuning",
                    "role prompting",
                    "prompt chaining",
                ],
                &[],
                &["Prompt Design", "Few-shot Learning"],
            ),
            TopicProfile::new(
                "api-integration",
                &[
                    "api key",
                    "endpoint",
                    "request",
                    "response",
                    "token",
                    "rate limit",
                    "streaming",
                    "retry",
                    "timeout",
                    "authentication",
                    "pagination",
                ],
                &["ftp", "soap"],
                &["API Usage", "Integration"],
            ),
            TopicProfile::new(
                "general-skills",
                &[
                    "implementation",
                    "architecture",
                    "best practices",
                    "error handling",
                    "debugging",
                    "testing",
                    "optimization",
                ],
                &[],
                &["Core Skills"],
            ),
        ];

        Self::new(topics, "general-skills")
    }
}
