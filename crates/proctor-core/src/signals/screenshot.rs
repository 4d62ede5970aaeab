use std::sync::Arc;

use async_trait::async_trait;
use evidence_store::{CollectionName, EvidenceStore};
use tracing::debug;

use super::SignalEvaluator;
use crate::domain::{read_records, student_exam_filter, ImageEvidence, Signal, Verdict};
use crate::error::Result;
use crate::perception::{DocumentAnswer, DocumentQuestionAnswering};
use crate::policy::EvaluationPolicy;

/// Checks that the student's latest screenshot shows the exam title.
pub struct ScreenshotTitleEvaluator {
    store: Arc<dyn EvidenceStore>,
    document_qa: Arc<dyn DocumentQuestionAnswering>,
    policy: EvaluationPolicy,
}

impl ScreenshotTitleEvaluator {
    pub fn new(
        store: Arc<dyn EvidenceStore>,
        document_qa: Arc<dyn DocumentQuestionAnswering>,
        policy: EvaluationPolicy,
    ) -> Self {
        Self {
            store,
            document_qa,
            policy,
        }
    }

    async fn read_title(&self, screenshot: &ImageEvidence) -> Result<DocumentAnswer> {
        let image = screenshot.image.decode()?;
        self.document_qa
            .answer_document_question(&image, &self.policy.title_question)
            .await
    }
}

/// Latest by capture time; ties go to the later record in read order.
fn latest(screenshots: Vec<ImageEvidence>) -> Option<ImageEvidence> {
    screenshots.into_iter().max_by_key(|s| s.time)
}

#[async_trait]
impl SignalEvaluator for ScreenshotTitleEvaluator {
    fn signal(&self) -> Signal {
        Signal::Screenshot
    }

    async fn evaluate(&self, student: &str, exam: &str) -> Result<Verdict> {
        let screenshots: Vec<ImageEvidence> = read_records(
            self.store.as_ref(),
            CollectionName::Screenshot,
            &student_exam_filter(student, exam),
        )
        .await?;

        let Some(screenshot) = latest(screenshots) else {
            return Ok(Verdict::fail_with("No screenshot."));
        };

        let answer = match self.read_title(&screenshot).await {
            Ok(answer) => answer,
            Err(e) => {
                debug!(student = %student, exam = %exam, error = %e, "screenshot title unreadable");
                return Ok(Verdict::fail_with("No text."));
            }
        };

        let matches = self.policy.accepts_title(answer.confidence)
            && answer.answer.to_lowercase() == exam.to_lowercase();
        Ok(if matches {
            Verdict::success()
        } else {
            Verdict::fail_with("Wrong text.")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EncodedImage;
    use crate::perception::fakes::ScriptedDocumentQa;
    use evidence_store::document_from;
    use evidence_store::fakes::MemoryEvidenceStore;

    fn screenshot(time: &str, bytes: &[u8]) -> ImageEvidence {
        ImageEvidence {
            student: "ana@uni.edu".to_string(),
            exam: "Calculus".to_string(),
            time: time.parse().unwrap(),
            image: EncodedImage::from_jpeg(bytes),
        }
    }

    fn seeded(shots: &[ImageEvidence]) -> Arc<MemoryEvidenceStore> {
        let store = Arc::new(MemoryEvidenceStore::new());
        for shot in shots {
            store.insert(CollectionName::Screenshot, document_from(shot).unwrap());
        }
        store
    }

    fn evaluator(
        store: Arc<MemoryEvidenceStore>,
        qa: Arc<ScriptedDocumentQa>,
    ) -> ScreenshotTitleEvaluator {
        ScreenshotTitleEvaluator::new(store, qa, EvaluationPolicy::default())
    }

    #[tokio::test]
    async fn no_screenshot_fails() {
        let qa = Arc::new(ScriptedDocumentQa::answering("Calculus", 0.99));
        let verdict = evaluator(seeded(&[]), qa.clone())
            .evaluate("ana@uni.edu", "Calculus")
            .await
            .unwrap();
        assert_eq!(verdict.to_string(), "FAIL: No screenshot.");
        assert!(qa.calls().is_empty());
    }

    #[tokio::test]
    async fn matching_title_is_case_insensitive() {
        let qa = Arc::new(ScriptedDocumentQa::answering("CALCULUS", 0.8));
        let store = seeded(&[screenshot("2024-05-01T10:00:00Z", b"s1")]);
        let verdict = evaluator(store, qa.clone())
            .evaluate("ana@uni.edu", "Calculus")
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::success());
        assert_eq!(qa.calls()[0].1, "What does the title say?");
    }

    #[tokio::test]
    async fn only_the_latest_screenshot_is_read() {
        let qa = Arc::new(ScriptedDocumentQa::answering("Calculus", 0.8));
        let store = seeded(&[
            screenshot("2024-05-01T10:05:00Z", b"newest"),
            screenshot("2024-05-01T10:00:00Z", b"oldest"),
        ]);
        evaluator(store, qa.clone())
            .evaluate("ana@uni.edu", "Calculus")
            .await
            .unwrap();
        let calls = qa.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, b"newest".to_vec());
    }

    #[tokio::test]
    async fn wrong_title_fails() {
        let qa = Arc::new(ScriptedDocumentQa::answering("Inbox", 0.97));
        let store = seeded(&[screenshot("2024-05-01T10:00:00Z", b"s1")]);
        let verdict = evaluator(store, qa)
            .evaluate("ana@uni.edu", "Calculus")
            .await
            .unwrap();
        assert_eq!(verdict.to_string(), "FAIL: Wrong text.");
    }

    #[tokio::test]
    async fn model_fault_is_no_text() {
        let qa = Arc::new(ScriptedDocumentQa::failing("model offline"));
        let store = seeded(&[screenshot("2024-05-01T10:00:00Z", b"s1")]);
        let verdict = evaluator(store, qa)
            .evaluate("ana@uni.edu", "Calculus")
            .await
            .unwrap();
        assert_eq!(verdict.to_string(), "FAIL: No text.");
    }

    #[test]
    fn latest_prefers_later_record_on_tie() {
        let picked = latest(vec![
            screenshot("2024-05-01T10:00:00Z", b"first"),
            screenshot("2024-05-01T10:00:00Z", b"second"),
        ])
        .unwrap();
        assert_eq!(picked.image, EncodedImage::from_jpeg(b"second"));
    }
}
