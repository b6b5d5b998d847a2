// src/store.rs

use std::collections::HashMap;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::models::attempt::AttemptRecord;
use crate::models::enrollment::EnrollmentRecord;

/// In-memory stand-in for the durable storage boundary.
///
/// Handlers take the write guard for any read-modify-write sequence, so the
/// eligibility check and the attempt-counter increment happen atomically
/// with respect to concurrent start requests for the same enrollment. The
/// scoring pipeline itself is pure; this is the only shared mutable state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

#[derive(Debug, Default)]
pub struct StoreInner {
    pub attempts: HashMap<Uuid, AttemptRecord>,
    pub enrollments: HashMap<EnrollmentKey, EnrollmentRecord>,
}

pub type EnrollmentKey = (String, String);

pub fn enrollment_key(learner_id: &str, topic_id: &str) -> EnrollmentKey {
    (learner_id.to_string(), topic_id.to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().await
    }
}

impl StoreInner {
    /// Concepts already tested in the learner's prior attempts for a topic.
    pub fn covered_concepts(&self, learner_id: &str, topic_id: &str) -> std::collections::HashSet<String> {
        self.attempts
            .values()
            .filter(|a| a.learner_id == learner_id && a.topic_id == topic_id)
            .flat_map(|a| a.items.iter().map(|i| i.concept.clone()))
            .collect()
    }

    /// Find the enrollment holding a certification id, if any.
    pub fn enrollment_by_certification(&self, cert_id: &str) -> Option<&EnrollmentRecord> {
        self.enrollments
            .values()
            .find(|e| e.certification_id.as_deref() == Some(cert_id))
    }
}
