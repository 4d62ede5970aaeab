//! Student and exam reports.

use evidence_store::{document_from, Document};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::verdict::{Signal, Verdict};
use crate::error::Result;

/// Verdicts of every evaluated signal for one student in one exam.
///
/// Signals whose evaluator did not run are absent (serialized as missing
/// fields, not nulls).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub student: String,
    pub exam: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_of_frame: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_detection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech: Option<String>,
}

impl StudentReport {
    pub fn new(student: impl Into<String>, exam: impl Into<String>) -> Self {
        Self {
            student: student.into(),
            exam: exam.into(),
            ..Self::default()
        }
    }

    fn slot(&mut self, signal: Signal) -> &mut Option<String> {
        match signal {
            Signal::Screenshot => &mut self.screenshot,
            Signal::OutOfFrame => &mut self.out_of_frame,
            Signal::Blur => &mut self.blur,
            Signal::ObjectDetection => &mut self.object_detection,
            Signal::Speech => &mut self.speech,
        }
    }

    /// Record the verdict text for `signal`.
    pub fn set(&mut self, signal: Signal, verdict: &Verdict) {
        *self.slot(signal) = Some(verdict.to_string());
    }

    /// Verdict text for `signal`, if it was evaluated.
    pub fn get(&self, signal: Signal) -> Option<&str> {
        match signal {
            Signal::Screenshot => self.screenshot.as_deref(),
            Signal::OutOfFrame => self.out_of_frame.as_deref(),
            Signal::Blur => self.blur.as_deref(),
            Signal::ObjectDetection => self.object_detection.as_deref(),
            Signal::Speech => self.speech.as_deref(),
        }
    }

    /// Signals present in this report, in evaluation order.
    pub fn evaluated(&self) -> Vec<Signal> {
        Signal::ORDER
            .into_iter()
            .filter(|s| self.get(*s).is_some())
            .collect()
    }
}

/// The cached, per-exam artifact: one student report per roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamReport {
    pub test: String,
    pub reports: Vec<StudentReport>,
}

impl ExamReport {
    /// Document form, as written to the report collection.
    pub fn to_document(&self) -> Result<Document> {
        Ok(document_from(self)?)
    }

    /// SHA-256 of the canonical JSON encoding.
    ///
    /// Two reports with the same digest are the same document as far as
    /// `write_once` dedup is concerned.
    pub fn content_digest(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }
}
