// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::bank::ItemBank;
use crate::catalog::ConceptCatalog;
use crate::config::Config;
use crate::exam::analyzer::ResponseAnalyzer;
use crate::exam::integrity::IntegrityDetector;
use crate::store::MemoryStore;

/// The immutable scoring machinery: reference data and detectors, built
/// once at process start and shared read-only across requests.
#[derive(Debug)]
pub struct ExamEngine {
    pub catalog: ConceptCatalog,
    pub bank: ItemBank,
    pub analyzer: ResponseAnalyzer,
    pub detector: IntegrityDetector,
}

impl ExamEngine {
    pub fn builtin() -> Self {
        Self {
            catalog: ConceptCatalog::builtin(),
            bank: ItemBank::builtin(),
            analyzer: ResponseAnalyzer::new(),
            detector: IntegrityDetector::new(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub engine: Arc<ExamEngine>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            engine: Arc::new(ExamEngine::builtin()),
            config,
        }
    }
}

impl FromRef<AppState> for Arc<MemoryStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<ExamEngine> {
    fn from_ref(state: &AppState) -> Self {
        state.engine.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
