//! Signal evaluators: one evidence category in, one verdict out.
//!
//! Evaluators hold no state between calls. Faults they do not convert into
//! a verdict themselves are returned as `Err` and handled by the
//! [`StudentReportBuilder`](crate::builder::StudentReportBuilder).

mod object_detection;
mod presence;
mod screenshot;
mod speech;

use std::sync::Arc;

use async_trait::async_trait;
use evidence_store::EvidenceStore;

use crate::domain::{Signal, Verdict};
use crate::error::Result;
use crate::perception::Perception;
use crate::policy::EvaluationPolicy;

pub use object_detection::ObjectDetectionEvaluator;
pub use presence::PresenceEvaluator;
pub use screenshot::ScreenshotTitleEvaluator;
pub use speech::SpeechTopicEvaluator;

#[async_trait]
pub trait SignalEvaluator: Send + Sync {
    /// The report field this evaluator fills.
    fn signal(&self) -> Signal;

    async fn evaluate(&self, student: &str, exam: &str) -> Result<Verdict>;
}

/// The five evaluators in report order.
pub fn standard_evaluators(
    store: Arc<dyn EvidenceStore>,
    perception: &Perception,
    policy: &EvaluationPolicy,
) -> Vec<Arc<dyn SignalEvaluator>> {
    vec![
        Arc::new(ScreenshotTitleEvaluator::new(
            store.clone(),
            perception.document_qa.clone(),
            policy.clone(),
        )),
        Arc::new(PresenceEvaluator::out_of_frame(store.clone())),
        Arc::new(PresenceEvaluator::blur(store.clone())),
        Arc::new(ObjectDetectionEvaluator::new(
            store.clone(),
            perception.object_detector.clone(),
            policy.clone(),
        )),
        Arc::new(SpeechTopicEvaluator::new(
            store,
            perception.topic_classifier.clone(),
            policy.clone(),
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::fakes::*;
    use evidence_store::fakes::MemoryEvidenceStore;

    #[test]
    fn standard_evaluators_follow_report_order() {
        let perception = Perception::new(
            Arc::new(ScriptedDocumentQa::answering("x", 1.0)),
            Arc::new(ScriptedObjectDetector::new()),
            Arc::new(ScriptedTopicClassifier::new()),
        );
        let evaluators = standard_evaluators(
            Arc::new(MemoryEvidenceStore::new()),
            &perception,
            &EvaluationPolicy::default(),
        );
        let order: Vec<Signal> = evaluators.iter().map(|e| e.signal()).collect();
        assert_eq!(order, Signal::ORDER.to_vec());
    }
}
