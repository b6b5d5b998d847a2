// src/exam/analyzer.rs

use regex::Regex;

use crate::exam::rules::{Rule, RuleSet};
use crate::models::attempt::{ResponseFlag, TextEvaluation};

/// Minimum word count before a response is scored at all.
const MIN_WORD_COUNT: usize = 10;
/// Base score for any response clearing the minimum length.
const BASE_SCORE: f64 = 0.2;
/// Word-count thresholds that each add a length bonus.
const LENGTH_STEPS: [usize; 4] = [30, 50, 100, 150];
const LENGTH_BONUS: f64 = 0.05;
/// Ceiling a generic response is clamped to.
const GENERIC_CAP: f64 = 0.2;
/// Multiplier applied to shallow responses.
const SHALLOW_PENALTY: f64 = 0.7;
/// Specificity below this on a non-trivial answer marks it shallow.
const SHALLOW_SPECIFICITY: f64 = 0.3;

/// Domain-indicator terms counted toward specificity.
const INDICATOR_TERMS: [&str; 25] = [
    "api",
    "function",
    "method",
    "class",
    "parameter",
    "variable",
    "model",
    "training",
    "data",
    "algorithm",
    "implementation",
    "code",
    "error",
    "debug",
    "test",
    "deploy",
    "config",
    "prompt",
    "response",
    "context",
    "token",
    "pipeline",
    "endpoint",
    "schema",
    "validation",
];

/// Heuristic scorer for a single free-text response.
///
/// Scores along specificity and coherence axes on top of a length-based
/// base, and flags generic or shallow answers. Total over all input: any
/// string, including empty or enormous ones, yields a score in [0, 1].
#[derive(Debug)]
pub struct ResponseAnalyzer {
    generic_rules: RuleSet,
    code_markers: Regex,
    enumerative: Regex,
    connectors: Regex,
}

impl Default for ResponseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseAnalyzer {
    pub fn new() -> Self {
        let generic_rules = RuleSet::new(vec![
            Rule::new("very-short", r"(?s)^.{0,30}$", 0.0),
            Rule::new(
                "single-word-ack",
                r"(?i)^(?:yes|no|maybe|i don't know|idk|n/a)\.?$",
                0.0,
            ),
            Rule::new(
                "filler-phrase",
                r"(?i)it is good|it is bad|it works|i learned a lot",
                0.0,
            ),
            Rule::new("empty-opener", r"(?i)^(?:the answer is|i think)\.?$", 0.0),
        ]);

        Self {
            generic_rules,
            code_markers: Regex::new(
                r"(?s)`[^`]+`|```.*```|\b\w+\(\)|\bimport |\bexport |\bconst |\blet |\bfn |\bdef ",
            )
            .expect("valid pattern"),
            enumerative: Regex::new(
                r"(?i)step \d|first|then|next|finally|for example|such as|specifically",
            )
            .expect("valid pattern"),
            connectors: Regex::new(
                r"(?i)because|therefore|however|moreover|additionally|furthermore",
            )
            .expect("valid pattern"),
        }
    }

    /// Score one free-text response.
    pub fn analyze(&self, text: &str) -> TextEvaluation {
        let mut flags = Vec::new();

        let word_count = text.split_whitespace().count();
        if word_count < MIN_WORD_COUNT {
            flags.push(ResponseFlag::TooShort);
            return TextEvaluation {
                score: 0.0,
                flags,
                word_count,
                analysis: "Response too short to evaluate".to_string(),
            };
        }

        let mut score = BASE_SCORE;

        for step in LENGTH_STEPS {
            if word_count >= step {
                score += LENGTH_BONUS;
            }
        }

        let specificity = self.specificity(text);
        score += specificity * 0.3;

        let coherence = self.coherence(text);
        score += coherence * 0.2;

        if self.generic_rules.any_match(text) {
            flags.push(ResponseFlag::Generic);
            score = score.min(GENERIC_CAP);
        }

        if word_count >= 20 && specificity < SHALLOW_SPECIFICITY {
            flags.push(ResponseFlag::Shallow);
            score *= SHALLOW_PENALTY;
        }

        let score = score.clamp(0.0, 1.0);

        TextEvaluation {
            analysis: summarize(score, &flags),
            score,
            flags,
            word_count,
        }
    }

    /// Specificity in [0, 1]: fraction of domain-indicator terms present
    /// (capped), plus bonuses for code-like syntax and enumerative or
    /// example-driven phrasing.
    fn specificity(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let mut score = 0.0;

        let found = INDICATOR_TERMS
            .iter()
            .filter(|term| lower.contains(*term))
            .count();
        score += (found as f64 / 5.0).min(1.0) * 0.5;

        if self.code_markers.is_match(text) {
            score += 0.3;
        }

        if self.enumerative.is_match(text) {
            score += 0.2;
        }

        score.min(1.0)
    }

    /// Coherence in [0, 1]: sentence count, capitalization, paragraph
    /// breaks and logical-connector usage.
    fn coherence(&self, text: &str) -> f64 {
        let mut score: f64 = 0.0;

        let sentences = text
            .split(['.', '!', '?'])
            .filter(|s| s.trim().len() > 5)
            .count();
        if sentences >= 2 {
            score += 0.3;
        }
        if sentences >= 4 {
            score += 0.2;
        }

        if text.trim().chars().next().is_some_and(|c| c.is_uppercase()) {
            score += 0.1;
        }

        if text.contains('\n') {
            score += 0.2;
        }

        if self.connectors.is_match(text) {
            score += 0.2;
        }

        score.min(1.0)
    }
}

fn summarize(score: f64, flags: &[ResponseFlag]) -> String {
    if score >= 0.8 {
        return "Excellent response demonstrating deep understanding".to_string();
    }
    if score >= 0.6 {
        return "Good response with adequate detail".to_string();
    }
    if score >= 0.4 {
        return "Acceptable response but could include more specifics".to_string();
    }
    if flags.contains(&ResponseFlag::Generic) {
        return "Response is too generic; provide specific details".to_string();
    }
    if flags.contains(&ResponseFlag::Shallow) {
        return "Response lacks depth; demonstrate deeper understanding".to_string();
    }
    "Insufficient response; more detail and specificity needed".to_string()
}
