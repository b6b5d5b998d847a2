// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Tunable policy knobs for exam assembly, scoring and the attempt
/// lifecycle. All values have defaults; any can be overridden through the
/// environment (EXAM_* variables).
#[derive(Debug, Clone)]
pub struct ExamConfig {
    /// Number of objective (multiple-choice) items per attempt.
    pub objective_count: usize,
    /// Number of free-text items per attempt.
    pub free_text_count: usize,
    /// Total points an attempt is scored on, split evenly between sections.
    pub point_budget: u32,
    /// Maximum attempts per enrollment.
    pub attempt_ceiling: u32,
    /// Points required to pass.
    pub passing_threshold: u32,
    /// Points required to mint a certification. Higher than passing.
    pub certification_threshold: u32,
    /// Integrity flag count at which an attempt is zeroed and locked.
    pub lock_threshold: u32,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            objective_count: 7,
            free_text_count: 3,
            point_budget: 10,
            attempt_ceiling: 2,
            passing_threshold: 6,
            certification_threshold: 7,
            lock_threshold: 2,
        }
    }
}

impl ExamConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            objective_count: env_parse("EXAM_OBJECTIVE_COUNT", defaults.objective_count),
            free_text_count: env_parse("EXAM_FREE_TEXT_COUNT", defaults.free_text_count),
            point_budget: env_parse("EXAM_POINT_BUDGET", defaults.point_budget),
            attempt_ceiling: env_parse("EXAM_ATTEMPT_CEILING", defaults.attempt_ceiling),
            passing_threshold: env_parse("EXAM_PASSING_THRESHOLD", defaults.passing_threshold),
            certification_threshold: env_parse(
                "EXAM_CERTIFICATION_THRESHOLD",
                defaults.certification_threshold,
            ),
            lock_threshold: env_parse("EXAM_LOCK_THRESHOLD", defaults.lock_threshold),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub rust_log: String,
    pub exam: ExamConfig,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            bind_addr,
            rust_log,
            exam: ExamConfig::from_env(),
        }
    }
}
