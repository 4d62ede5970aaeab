//! Perception capabilities consumed by the signal evaluators.
//!
//! Models are external collaborators: the evaluators only see these three
//! traits and receive implementations through [`Perception`]. The process
//! that builds a `Perception` owns model lifecycle.

pub mod fakes;
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use http::{HttpPerception, PerceptionConfig};

/// Best answer of a document question-answering model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnswer {
    pub answer: String,
    pub confidence: f64,
}

/// One detected object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
}

/// Score of one candidate label from a zero-shot topic classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicScore {
    pub label: String,
    pub score: f64,
}

/// Answers a natural-language question about a document image.
#[async_trait]
pub trait DocumentQuestionAnswering: Send + Sync {
    async fn answer_document_question(&self, image: &[u8], question: &str)
        -> Result<DocumentAnswer>;
}

/// Detects labelled objects in an image.
#[async_trait]
pub trait ObjectDetection: Send + Sync {
    async fn detect_objects(&self, image: &[u8]) -> Result<Vec<Detection>>;
}

/// Scores text against a set of candidate topic labels.
#[async_trait]
pub trait TopicClassification: Send + Sync {
    async fn classify_topics(&self, text: &str, candidate_labels: &[String])
        -> Result<Vec<TopicScore>>;
}

/// The capability handles handed to the evaluators.
#[derive(Clone)]
pub struct Perception {
    pub document_qa: Arc<dyn DocumentQuestionAnswering>,
    pub object_detector: Arc<dyn ObjectDetection>,
    pub topic_classifier: Arc<dyn TopicClassification>,
}

impl Perception {
    pub fn new(
        document_qa: Arc<dyn DocumentQuestionAnswering>,
        object_detector: Arc<dyn ObjectDetection>,
        topic_classifier: Arc<dyn TopicClassification>,
    ) -> Self {
        Self {
            document_qa,
            object_detector,
            topic_classifier,
        }
    }

    /// Use one client for all three capabilities.
    pub fn shared<C>(client: Arc<C>) -> Self
    where
        C: DocumentQuestionAnswering + ObjectDetection + TopicClassification + 'static,
    {
        Self {
            document_qa: client.clone(),
            object_detector: client.clone(),
            topic_classifier: client,
        }
    }
}

impl std::fmt::Debug for Perception {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Perception").finish_non_exhaustive()
    }
}
