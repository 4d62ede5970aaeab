use std::sync::Arc;

use async_trait::async_trait;
use evidence_store::{CollectionName, EvidenceStore};

use super::SignalEvaluator;
use crate::domain::{student_exam_filter, Signal, Verdict};
use crate::error::Result;

/// Any matching record fails the signal; none passes it. The number of
/// records does not matter.
pub struct PresenceEvaluator {
    signal: Signal,
    collection: CollectionName,
    store: Arc<dyn EvidenceStore>,
}

impl PresenceEvaluator {
    pub fn out_of_frame(store: Arc<dyn EvidenceStore>) -> Self {
        Self {
            signal: Signal::OutOfFrame,
            collection: CollectionName::OutOfFrame,
            store,
        }
    }

    pub fn blur(store: Arc<dyn EvidenceStore>) -> Self {
        Self {
            signal: Signal::Blur,
            collection: CollectionName::Blur,
            store,
        }
    }
}

#[async_trait]
impl SignalEvaluator for PresenceEvaluator {
    fn signal(&self) -> Signal {
        self.signal
    }

    async fn evaluate(&self, student: &str, exam: &str) -> Result<Verdict> {
        let records = self
            .store
            .read(self.collection, &student_exam_filter(student, exam))
            .await?;
        Ok(if records.is_empty() {
            Verdict::success()
        } else {
            Verdict::fail()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_store::fakes::MemoryEvidenceStore;
    use serde_json::json;

    fn event(student: &str, exam: &str, time: &str) -> evidence_store::Document {
        json!({"student": student, "exam": exam, "time": time, "duration": 4})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn no_records_is_success() {
        let store = Arc::new(MemoryEvidenceStore::new());
        let verdict = PresenceEvaluator::blur(store)
            .evaluate("ana@uni.edu", "Calculus")
            .await
            .unwrap();
        assert_eq!(verdict.to_string(), "SUCCESS");
    }

    #[tokio::test]
    async fn any_record_is_fail_regardless_of_count() {
        let store = Arc::new(MemoryEvidenceStore::new());
        store.insert(
            CollectionName::OutOfFrame,
            event("ana@uni.edu", "Calculus", "2024-05-01T10:00:00Z"),
        );
        let evaluator = PresenceEvaluator::out_of_frame(store.clone());
        assert_eq!(
            evaluator.evaluate("ana@uni.edu", "Calculus").await.unwrap(),
            Verdict::fail()
        );

        for minute in 1..5 {
            store.insert(
                CollectionName::OutOfFrame,
                event("ana@uni.edu", "Calculus", &format!("2024-05-01T10:0{minute}:00Z")),
            );
        }
        assert_eq!(
            evaluator.evaluate("ana@uni.edu", "Calculus").await.unwrap(),
            Verdict::fail()
        );
    }

    #[tokio::test]
    async fn other_students_evidence_is_ignored() {
        let store = Arc::new(MemoryEvidenceStore::new());
        store.insert(
            CollectionName::Blur,
            event("ben@uni.edu", "Calculus", "2024-05-01T10:00:00Z"),
        );
        store.insert(
            CollectionName::Blur,
            event("ana@uni.edu", "Physics", "2024-05-01T10:00:00Z"),
        );
        let verdict = PresenceEvaluator::blur(store)
            .evaluate("ana@uni.edu", "Calculus")
            .await
            .unwrap();
        assert!(verdict.is_success());
    }

    #[tokio::test]
    async fn unavailable_store_propagates() {
        let store = Arc::new(MemoryEvidenceStore::new());
        store.set_unavailable(CollectionName::Blur, true);
        let err = PresenceEvaluator::blur(store)
            .evaluate("ana@uni.edu", "Calculus")
            .await
            .unwrap_err();
        assert!(err.is_storage_fault());
    }
}
