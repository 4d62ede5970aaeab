use std::sync::Arc;

use async_trait::async_trait;
use evidence_store::{document_from, CollectionName, EvidenceStore};
use tracing::{info, warn};

use super::SignalEvaluator;
use crate::domain::{read_records, student_exam_filter, ImageEvidence, Signal, Verdict};
use crate::error::{ProctorError, Result};
use crate::metrics::{Counter, METRICS};
use crate::perception::{Detection, ObjectDetection};
use crate::policy::EvaluationPolicy;

/// Scans periodic webcam photos for a phone and quarantines the first one
/// found.
///
/// A photo that cannot be decoded or inspected ends the scan with an `ERROR`
/// verdict for this signal. Storage faults still reach the builder.
pub struct ObjectDetectionEvaluator {
    store: Arc<dyn EvidenceStore>,
    detector: Arc<dyn ObjectDetection>,
    policy: EvaluationPolicy,
}

impl ObjectDetectionEvaluator {
    pub fn new(
        store: Arc<dyn EvidenceStore>,
        detector: Arc<dyn ObjectDetection>,
        policy: EvaluationPolicy,
    ) -> Self {
        Self {
            store,
            detector,
            policy,
        }
    }

    async fn inspect(&self, photo: &ImageEvidence) -> Result<Vec<Detection>> {
        let image = photo.image.decode()?;
        self.detector.detect_objects(&image).await
    }
}

#[async_trait]
impl SignalEvaluator for ObjectDetectionEvaluator {
    fn signal(&self) -> Signal {
        Signal::ObjectDetection
    }

    async fn evaluate(&self, student: &str, exam: &str) -> Result<Verdict> {
        let photos: Vec<ImageEvidence> = read_records(
            self.store.as_ref(),
            CollectionName::PeriodicPhotos,
            &student_exam_filter(student, exam),
        )
        .await?;

        if photos.is_empty() {
            return Ok(Verdict::fail_with("No periodic photos found."));
        }

        for photo in photos {
            let detections = match self.inspect(&photo).await {
                Ok(detections) => detections,
                Err(ProctorError::PerceptionFault(reason)) => {
                    warn!(
                        student = %student,
                        exam = %exam,
                        time = %photo.time,
                        "photo not inspected: {reason}"
                    );
                    return Ok(Verdict::error(format!(
                        "An error occurred while processing object detection: {reason}"
                    )));
                }
                Err(e) => return Err(e),
            };
            let Some(phone) = detections
                .iter()
                .find(|d| self.policy.is_phone(&d.label, d.confidence))
            else {
                continue;
            };

            self.store
                .write_once(CollectionName::FlaggedPhoto, document_from(&photo)?)
                .await?;
            METRICS.incr(Counter::PhotosFlagged);
            info!(
                student = %student,
                exam = %exam,
                time = %photo.time,
                confidence = phone.confidence,
                "periodic photo flagged"
            );
            return Ok(Verdict::fail());
        }

        Ok(Verdict::success())
    }
}
