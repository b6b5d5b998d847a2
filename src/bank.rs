// src/bank.rs

use std::collections::HashMap;

use crate::catalog::TopicProfile;

/// Template for one objective (multiple-choice) item.
#[derive(Debug, Clone)]
pub struct ObjectiveTemplate {
    pub concept: String,
    pub prompt: String,
    pub choices: Vec<String>,
    pub correct: usize,
}

/// Template for one free-text item.
#[derive(Debug, Clone)]
pub struct FreeTextTemplate {
    pub concept: String,
    pub prompt: String,
}

/// The item pools for one topic.
#[derive(Debug, Clone, Default)]
pub struct TopicPool {
    pub objective: Vec<ObjectiveTemplate>,
    pub free_text: Vec<FreeTextTemplate>,
}

/// Per-topic pools of item templates. Immutable reference data loaded at
/// process start. Topics without an authored pool get one synthesized from
/// their concept list, so selection never hard-fails on missing data.
#[derive(Debug, Clone)]
pub struct ItemBank {
    pools: HashMap<String, TopicPool>,
}

impl ItemBank {
    pub fn new(pools: HashMap<String, TopicPool>) -> Self {
        Self { pools }
    }

    /// The pool for a topic, synthesizing a generic one from the profile's
    /// concepts when nothing was authored for it.
    pub fn pool_for(&self, profile: &TopicProfile) -> TopicPool {
        match self.pools.get(&profile.id) {
            Some(pool) => pool.clone(),
            None => {
                tracing::debug!("No authored pool for '{}', synthesizing", profile.id);
                synthesize_pool(&profile.valid_concepts)
            }
        }
    }

    /// The built-in bank shipped with the service.
    pub fn builtin() -> Self {
        let mut pools = HashMap::new();
        pools.insert("ml-fundamentals".to_string(), ml_fundamentals_pool());
        pools.insert("prompt-engineering".to_string(), prompt_engineering_pool());
        Self::new(pools)
    }
}

/// Filler objective item for when a pool runs short of the configured count.
pub fn filler_objective(concepts: &[String], index: usize) -> ObjectiveTemplate {
    let concept = concepts
        .get(index % concepts.len().max(1))
        .map(String::as_str)
        .unwrap_or("general knowledge");
    ObjectiveTemplate {
        concept: concept.to_string(),
        prompt: format!("What is the recommended approach to {} in this context?", concept),
        choices: vec![
            "Ignore it completely".to_string(),
            "Follow established practice and the official documentation".to_string(),
            "Use trial and error exclusively".to_string(),
            "Copy solutions from unverified sources".to_string(),
        ],
        correct: 1,
    }
}

/// Filler free-text item for when a pool runs short.
pub fn filler_free_text(concepts: &[String], index: usize) -> FreeTextTemplate {
    let concept = concepts
        .get(index % concepts.len().max(1))
        .map(String::as_str)
        .unwrap_or("implementation");
    FreeTextTemplate {
        concept: concept.to_string(),
        prompt: format!(
            "Describe your approach to {} in your project work. What decisions did you make and why?",
            concept
        ),
    }
}

/// Build a generic pool from a topic's concept list.
fn synthesize_pool(concepts: &[String]) -> TopicPool {
    let objective = concepts
        .iter()
        .take(9)
        .map(|concept| ObjectiveTemplate {
            concept: concept.clone(),
            prompt: format!("Which statement about {} is most accurate?", concept),
            choices: vec![
                format!("{} is only relevant for advanced use cases", concept),
                format!("A sound understanding of {} is essential in practice", concept),
                format!("{} can be safely ignored in production", concept),
                format!("{} is always handled automatically by tooling", concept),
            ],
            correct: 1,
        })
        .collect();

    let free_text = concepts
        .iter()
        .take(4)
        .map(|concept| FreeTextTemplate {
            concept: concept.clone(),
            prompt: format!(
                "Explain how {} applies to the work you completed. Provide specific examples.",
                concept
            ),
        })
        .collect();

    TopicPool {
        objective,
        free_text,
    }
}

fn mcq(concept: &str, prompt: &str, choices: [&str; 4], correct: usize) -> ObjectiveTemplate {
    ObjectiveTemplate {
        concept: concept.to_string(),
        prompt: prompt.to_string(),
        choices: choices.iter().map(|s| s.to_string()).collect(),
        correct,
    }
}

fn open(concept: &str, prompt: &str) -> FreeTextTemplate {
    FreeTextTemplate {
        concept: concept.to_string(),
        prompt: prompt.to_string(),
    }
}

fn ml_fundamentals_pool() -> TopicPool {
    TopicPool {
        objective: vec![
            mcq(
                "supervised learning",
                "What distinguishes supervised learning from unsupervised learning?",
                [
                    "Supervised learning trains on labeled data",
                    "Supervised learning requires no data at all",
                    "Unsupervised learning always produces better results",
                    "There is no difference between them",
                ],
                0,
            ),
            mcq(
                "neural networks",
                "What is the primary role of activation functions in a neural network?",
                [
                    "They store the training data",
                    "They introduce non-linearity into the network",
                    "They reduce the parameter count",
                    "They connect the network to external databases",
                ],
                1,
            ),
            mcq(
                "overfitting",
                "Which technique helps prevent overfitting?",
                [
                    "Increasing model complexity",
                    "Using less training data",
                    "Regularization and cross-validation",
                    "Removing all validation data",
                ],
                2,
            ),
            mcq(
                "training data",
                "Why does data quality matter when training a model?",
                [
                    "It does not; quantity matters more",
                    "Clean, representative data leads to more reliable models",
                    "Only the algorithm matters",
                    "Data quality only affects training speed",
                ],
                1,
            ),
            mcq(
                "model evaluation",
                "What does the F1 score measure in classification?",
                [
                    "Model training speed",
                    "The harmonic mean of precision and recall",
                    "The total number of predictions made",
                    "GPU utilization during inference",
                ],
                1,
            ),
            mcq(
                "deep learning",
                "What makes deep learning \"deep\" compared to traditional ML?",
                [
                    "It uses more storage space",
                    "It requires more expensive hardware",
                    "It stacks hidden layers to learn hierarchical representations",
                    "It simply takes longer to train",
                ],
                2,
            ),
            mcq(
                "bias",
                "How can bias in a trained system be mitigated?",
                [
                    "By using only synthetic data",
                    "It cannot be mitigated",
                    "Through diverse training data, fairness metrics and auditing",
                    "By training for longer",
                ],
                2,
            ),
            mcq(
                "classification",
                "Which of the following is NOT a classification task?",
                [
                    "Email spam detection",
                    "Predicting house prices",
                    "Image recognition",
                    "Sentiment analysis",
                ],
                1,
            ),
            mcq(
                "regression",
                "What is the key difference between classification and regression?",
                [
                    "Regression needs more data",
                    "Classification predicts categories, regression predicts continuous values",
                    "They are identical tasks",
                    "Regression only works with linear models",
                ],
                1,
            ),
        ],
        free_text: vec![
            open(
                "neural networks",
                "Explain how a neural network learns to make predictions. Describe the roles of forward propagation and backpropagation in training.",
            ),
            open(
                "model evaluation",
                "A classification model reaches 98% accuracy in training but performs poorly in production. What might be wrong, and how would you diagnose and fix it?",
            ),
            open(
                "bias",
                "Describe a real-world scenario where model bias could have serious consequences. What steps would you take to detect and mitigate it?",
            ),
            open(
                "supervised learning",
                "Compare supervised and unsupervised learning. For a customer segmentation problem, which would you choose and why?",
            ),
        ],
    }
}

fn prompt_engineering_pool() -> TopicPool {
    TopicPool {
        objective: vec![
            mcq(
                "few-shot",
                "What characterizes a few-shot prompt?",
                [
                    "It contains no instructions",
                    "It includes a handful of worked examples before the task",
                    "It disables sampling entirely",
                    "It requires fine-tuning the model first",
                ],
                1,
            ),
            mcq(
                "chain-of-thought",
                "What is the purpose of chain-of-thought prompting?",
                [
                    "To reduce token usage",
                    "To elicit intermediate reasoning steps before the answer",
                    "To randomize the output",
                    "To disable safety filtering",
                ],
                1,
            ),
            mcq(
                "temperature",
                "What does raising the sampling temperature do?",
                [
                    "Makes outputs more deterministic",
                    "Makes outputs more varied and less predictable",
                    "Increases the context window",
                    "Improves factual accuracy",
                ],
                1,
            ),
            mcq(
                "system prompt",
                "What is a system prompt used for?",
                [
                    "Billing configuration",
                    "Setting persistent behavior and constraints for the model",
                    "Encrypting the conversation",
                    "Selecting the GPU",
                ],
                1,
            ),
            mcq(
                "structured output",
                "Which approach most reliably yields machine-parseable responses?",
                [
                    "Asking politely for valid JSON",
                    "Constraining output with an explicit schema or format instruction",
                    "Raising the temperature",
                    "Shortening the prompt",
                ],
                1,
            ),
        ],
        free_text: vec![
            open(
                "chain-of-thought",
                "Explain when chain-of-thought prompting helps and when it hurts. Give a concrete example of each.",
            ),
            open(
                "prompt template",
                "Describe how you would design a reusable prompt template for a summarization task. What variables would it expose and why?",
            ),
            open(
                "few-shot",
                "Compare zero-shot and few-shot prompting for a classification task you have worked on. Which performed better, and why?",
            ),
        ],
    }
}
