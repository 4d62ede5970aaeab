//! HTTP client for a model inference server.
//!
//! Endpoints (JSON in, JSON out; images travel as base64):
//! - `POST /document-question-answering` `{image, question}` → `[{answer, score}]`
//! - `POST /object-detection` `{image}` → `[{label, score, ...}]`
//! - `POST /zero-shot-classification` `{text, candidate_labels}` → `{labels, scores}`

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    Detection, DocumentAnswer, DocumentQuestionAnswering, ObjectDetection, TopicClassification,
    TopicScore,
};
use crate::error::{ProctorError, Result};

/// Default inference server address.
pub const DEFAULT_PERCEPTION_URL: &str = "http://127.0.0.1:8000";

/// Inference server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerceptionConfig {
    /// Base URL of the inference server
    pub base_url: String,
    /// Bearer token (optional)
    pub token: Option<String>,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        PerceptionConfig {
            base_url: DEFAULT_PERCEPTION_URL.to_string(),
            token: None,
        }
    }
}

impl PerceptionConfig {
    /// Create a config for a specific server
    pub fn new(base_url: &str) -> Self {
        PerceptionConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Read `PROCTOR_PERCEPTION_URL` and `PROCTOR_PERCEPTION_TOKEN`.
    pub fn from_env() -> Self {
        let base_url = std::env::var("PROCTOR_PERCEPTION_URL")
            .unwrap_or_else(|_| DEFAULT_PERCEPTION_URL.to_string());
        PerceptionConfig {
            token: std::env::var("PROCTOR_PERCEPTION_TOKEN").ok(),
            ..Self::new(&base_url)
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}

#[derive(Debug, Serialize)]
struct DocumentQaRequest<'a> {
    image: String,
    question: &'a str,
}

#[derive(Debug, Deserialize)]
struct DocumentQaCandidate {
    answer: String,
    score: f64,
}

#[derive(Debug, Serialize)]
struct ObjectDetectionRequest {
    image: String,
}

#[derive(Debug, Deserialize)]
struct DetectionCandidate {
    label: String,
    score: f64,
}

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    text: &'a str,
    candidate_labels: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

/// Pick the top answer; pipelines return candidates best-first.
fn top_answer(candidates: Vec<DocumentQaCandidate>) -> Result<DocumentAnswer> {
    candidates
        .into_iter()
        .next()
        .map(|c| DocumentAnswer {
            answer: c.answer,
            confidence: c.score,
        })
        .ok_or_else(|| ProctorError::perception("document QA returned no answer"))
}

/// Pair labels with scores; mismatched lengths are unusable output.
fn zip_topics(response: ZeroShotResponse) -> Result<Vec<TopicScore>> {
    if response.labels.len() != response.scores.len() {
        return Err(ProctorError::perception(format!(
            "zero-shot returned {} labels but {} scores",
            response.labels.len(),
            response.scores.len()
        )));
    }
    Ok(response
        .labels
        .into_iter()
        .zip(response.scores)
        .map(|(label, score)| TopicScore { label, score })
        .collect())
}

/// Perception capabilities served by a remote inference server.
pub struct HttpPerception {
    config: PerceptionConfig,
    http_client: reqwest::Client,
}

impl HttpPerception {
    /// Create a new client
    pub fn new(config: PerceptionConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("proctor-core/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpPerception {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(PerceptionConfig::from_env())
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.config.base_url, path);
        debug!(url = %url, "perception request");

        let mut request = self.http_client.post(&url).json(body);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ProctorError::perception(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DocumentQuestionAnswering for HttpPerception {
    async fn answer_document_question(
        &self,
        image: &[u8],
        question: &str,
    ) -> Result<DocumentAnswer> {
        let body = DocumentQaRequest {
            image: STANDARD.encode(image),
            question,
        };
        let candidates: Vec<DocumentQaCandidate> =
            self.post("document-question-answering", &body).await?;
        top_answer(candidates)
    }
}

#[async_trait]
impl ObjectDetection for HttpPerception {
    async fn detect_objects(&self, image: &[u8]) -> Result<Vec<Detection>> {
        let body = ObjectDetectionRequest {
            image: STANDARD.encode(image),
        };
        let candidates: Vec<DetectionCandidate> = self.post("object-detection", &body).await?;
        Ok(candidates
            .into_iter()
            .map(|c| Detection {
                label: c.label,
                confidence: c.score,
            })
            .collect())
    }
}

#[async_trait]
impl TopicClassification for HttpPerception {
    async fn classify_topics(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<Vec<TopicScore>> {
        let body = ZeroShotRequest {
            text,
            candidate_labels,
        };
        let response: ZeroShotResponse = self.post("zero-shot-classification", &body).await?;
        zip_topics(response)
    }
}
