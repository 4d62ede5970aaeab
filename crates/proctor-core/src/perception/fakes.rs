//! Scripted perception fakes (testing only)
//!
//! Each fake returns canned outputs and records what it was asked, so tests
//! can assert both the verdict and which evidence reached the model.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    Detection, DocumentAnswer, DocumentQuestionAnswering, ObjectDetection, TopicClassification,
    TopicScore,
};
use crate::error::{ProctorError, Result};

/// Document QA fake that gives the same answer for every image, or fails.
#[derive(Debug)]
pub struct ScriptedDocumentQa {
    outcome: std::result::Result<DocumentAnswer, String>,
    calls: Mutex<Vec<(Vec<u8>, String)>>,
}

impl ScriptedDocumentQa {
    pub fn answering(answer: &str, confidence: f64) -> Self {
        Self {
            outcome: Ok(DocumentAnswer {
                answer: answer.to_string(),
                confidence,
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(image, question)` pairs received so far.
    pub fn calls(&self) -> Vec<(Vec<u8>, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentQuestionAnswering for ScriptedDocumentQa {
    async fn answer_document_question(
        &self,
        image: &[u8],
        question: &str,
    ) -> Result<DocumentAnswer> {
        self.calls
            .lock()
            .unwrap()
            .push((image.to_vec(), question.to_string()));
        self.outcome.clone().map_err(ProctorError::PerceptionFault)
    }
}

/// Object detector fake keyed by raw image bytes.
///
/// Images without a script detect nothing.
#[derive(Debug, Default)]
pub struct ScriptedObjectDetector {
    detections: HashMap<Vec<u8>, Vec<Detection>>,
    failure: Option<String>,
    inspected: Mutex<Vec<Vec<u8>>>,
}

impl ScriptedObjectDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Script `(label, confidence)` detections for `image`.
    pub fn with_detections(mut self, image: &[u8], detections: &[(&str, f64)]) -> Self {
        let detections = detections
            .iter()
            .map(|(label, confidence)| Detection {
                label: label.to_string(),
                confidence: *confidence,
            })
            .collect();
        self.detections.insert(image.to_vec(), detections);
        self
    }

    /// Images passed to `detect_objects`, in call order.
    pub fn inspected(&self) -> Vec<Vec<u8>> {
        self.inspected.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectDetection for ScriptedObjectDetector {
    async fn detect_objects(&self, image: &[u8]) -> Result<Vec<Detection>> {
        self.inspected.lock().unwrap().push(image.to_vec());
        if let Some(message) = &self.failure {
            return Err(ProctorError::perception(message.clone()));
        }
        Ok(self.detections.get(image).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Clone)]
struct TopicRule {
    needle: String,
    label: String,
    score: f64,
}

/// Score given to a candidate label no rule matches.
pub const BACKGROUND_TOPIC_SCORE: f64 = 0.05;

/// Topic classifier fake driven by substring rules.
///
/// A rule `(needle, label, score)` scores `label` at `score` for any text
/// containing `needle`. Every candidate label is returned; unmatched labels
/// get [`BACKGROUND_TOPIC_SCORE`].
#[derive(Debug, Default)]
pub struct ScriptedTopicClassifier {
    rules: Vec<TopicRule>,
    failure: Option<String>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedTopicClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn with_rule(mut self, needle: &str, label: &str, score: f64) -> Self {
        self.rules.push(TopicRule {
            needle: needle.to_string(),
            label: label.to_string(),
            score,
        });
        self
    }

    /// `(text, candidate_labels)` pairs received so far.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    fn score(&self, text: &str, label: &str) -> f64 {
        self.rules
            .iter()
            .filter(|r| r.label == label && text.contains(&r.needle))
            .map(|r| r.score)
            .fold(BACKGROUND_TOPIC_SCORE, f64::max)
    }
}

#[async_trait]
impl TopicClassification for ScriptedTopicClassifier {
    async fn classify_topics(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<Vec<TopicScore>> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), candidate_labels.to_vec()));
        if let Some(message) = &self.failure {
            return Err(ProctorError::perception(message.clone()));
        }
        Ok(candidate_labels
            .iter()
            .map(|label| TopicScore {
                label: label.clone(),
                score: self.score(text, label),
            })
            .collect())
    }
}
