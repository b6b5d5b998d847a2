// src/exam/integrity.rs

use regex::Regex;
use serde::Serialize;

use crate::exam::rules::{Rule, RuleSet};

/// Confidence added per matched stock-phrase rule.
const PHRASE_WEIGHT: f64 = 0.15;
/// Confidence at which a response is considered likely non-original.
const AI_VERDICT_THRESHOLD: f64 = 0.3;
/// Long-word ratio above which vocabulary is suspiciously uniform.
const LONG_WORD_RATIO: f64 = 0.3;

/// Analysis of one response for AI-generated phrasing.
#[derive(Debug, Clone, Serialize)]
pub struct AiAnalysis {
    pub likely: bool,
    /// Accumulated confidence, capped at 1.0.
    pub confidence: f64,
    pub matched: Vec<&'static str>,
}

/// One flagged response within an attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum IntegrityFinding {
    AiGenerated {
        item_index: usize,
        confidence: f64,
        matched: Vec<&'static str>,
    },
    CopyPaste {
        item_index: usize,
        matched: Vec<&'static str>,
    },
}

/// Per-attempt recommendation derived from the flag count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Clean,
    Warning,
    Zero,
}

impl Recommendation {
    pub fn for_flags(flag_count: u32, lock_threshold: u32) -> Self {
        if flag_count >= lock_threshold {
            Recommendation::Zero
        } else if flag_count > 0 {
            Recommendation::Warning
        } else {
            Recommendation::Clean
        }
    }
}

/// Aggregated integrity verdict over all free-text responses of an attempt.
#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub flag_count: u32,
    pub findings: Vec<IntegrityFinding>,
    pub recommendation: Recommendation,
}

/// Flags free-text responses that are likely non-original: artificially
/// generated (stock phrasing, uniform vocabulary, suspiciously clean text)
/// or copy-pasted (IDE/web artifacts). Heuristic and pattern-based; it does
/// not guarantee detection and never fails on arbitrary input.
#[derive(Debug)]
pub struct IntegrityDetector {
    ai_rules: RuleSet,
    paste_rules: RuleSet,
    typo_artifacts: Regex,
}

impl Default for IntegrityDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegrityDetector {
    pub fn new() -> Self {
        let ai_rules = RuleSet::new(vec![
            Rule::new("as-an-ai", r"(?i)as an ai", PHRASE_WEIGHT),
            Rule::new("no-personal", r"(?i)i don't have personal", PHRASE_WEIGHT),
            Rule::new("important-to-note", r"(?i)it's important to note", PHRASE_WEIGHT),
            Rule::new("in-conclusion", r"(?i)in conclusion", PHRASE_WEIGHT),
            Rule::new("worth-mentioning", r"(?i)it is worth mentioning", PHRASE_WEIGHT),
            Rule::new("certainly", r"(?i)certainly!?\s", PHRASE_WEIGHT),
            Rule::new("absolutely", r"(?i)absolutely!?\s", PHRASE_WEIGHT),
            Rule::new("great-question", r"(?i)great question", PHRASE_WEIGHT),
            Rule::new("let-me-explain", r"(?i)let me explain", PHRASE_WEIGHT),
            Rule::new(
                "stock-overview",
                r"(?i)here'?s? (?:a|an) (?:comprehensive|detailed) (?:overview|explanation)",
                PHRASE_WEIGHT,
            ),
            Rule::new(
                "several-key-factors",
                r"(?i)there are several (?:key|important) (?:factors|aspects|considerations)",
                PHRASE_WEIGHT,
            ),
            Rule::new(
                "ordinal-listing",
                r"(?i)(?:firstly|secondly|thirdly|finally),?\s",
                PHRASE_WEIGHT,
            ),
            Rule::new("delve-into", r"(?i)delve into", PHRASE_WEIGHT),
            Rule::new("crucial-to", r"(?i)it's crucial to", PHRASE_WEIGHT),
            Rule::new("leverage", r"(?i)leverage", PHRASE_WEIGHT),
            Rule::new("utilize", r"(?i)utilize", PHRASE_WEIGHT),
        ]);

        let paste_rules = RuleSet::new(vec![
            Rule::new("tab-runs", r"\t{2,}", 1.0),
            Rule::new("newline-runs", r"\n{3,}", 1.0),
            Rule::new("embedded-url", r"https?://\S+", 1.0),
            Rule::new(
                "copyright-boilerplate",
                r"(?i)copyright|©|all rights reserved",
                1.0,
            ),
        ]);

        Self {
            ai_rules,
            paste_rules,
            // Irregular casing or double spacing mid-sentence. Absence of
            // both in a long answer is a proxy for text not hand-typed
            // under time pressure.
            typo_artifacts: Regex::new(r"[a-z]{2,}[A-Z]|[^.!?]\s{2,}[a-z]").expect("valid pattern"),
        }
    }

    /// Analyze one response text for AI-generated phrasing.
    pub fn analyze_ai(&self, text: &str) -> AiAnalysis {
        let (mut confidence, mut matched) = self.ai_rules.accumulate(text);

        let words: Vec<&str> = text.split_whitespace().collect();
        let long_words = words.iter().filter(|w| w.len() > 8).count();
        let ratio = long_words as f64 / words.len().max(1) as f64;
        if ratio > LONG_WORD_RATIO {
            confidence += 0.1;
            matched.push("high-vocabulary-uniformity");
        }

        if words.len() > 50 && !self.typo_artifacts.is_match(text) {
            confidence += 0.05;
            matched.push("too-clean");
        }

        AiAnalysis {
            likely: confidence >= AI_VERDICT_THRESHOLD,
            confidence: confidence.min(1.0),
            matched,
        }
    }

    /// Whether the text carries copy-paste artifacts. Any single indicator
    /// is sufficient.
    pub fn copy_paste_suspected(&self, text: &str) -> bool {
        self.paste_rules.any_match(text)
    }

    /// Run both detectors over every free-text response of an attempt and
    /// aggregate the flag count into a recommendation.
    pub fn assess<'a>(
        &self,
        free_texts: impl IntoIterator<Item = (usize, &'a str)>,
        lock_threshold: u32,
    ) -> IntegrityReport {
        let mut findings = Vec::new();
        let mut flag_count = 0u32;

        for (item_index, text) in free_texts {
            let ai = self.analyze_ai(text);
            if ai.likely {
                flag_count += 1;
                findings.push(IntegrityFinding::AiGenerated {
                    item_index,
                    confidence: ai.confidence,
                    matched: ai.matched,
                });
            }

            let pasted = self.paste_rules.matched(text);
            if !pasted.is_empty() {
                flag_count += 1;
                findings.push(IntegrityFinding::CopyPaste {
                    item_index,
                    matched: pasted,
                });
            }
        }

        IntegrityReport {
            flag_count,
            findings,
            recommendation: Recommendation::for_flags(flag_count, lock_threshold),
        }
    }
}
