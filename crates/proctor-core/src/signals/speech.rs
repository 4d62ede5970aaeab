use std::sync::Arc;

use async_trait::async_trait;
use evidence_store::{CollectionName, EvidenceStore};

use super::SignalEvaluator;
use crate::domain::{
    read_records, student_exam_filter, Conversation, Registration, Signal, Verdict,
};
use crate::error::{ProctorError, Result};
use crate::perception::TopicClassification;
use crate::policy::EvaluationPolicy;

/// Classifies transcribed conversation against the exam's forbidden themes.
///
/// Every snippet is classified on its own, then the whole transcript once.
/// Faults become an `ERROR` verdict; only an invalid collection escapes.
pub struct SpeechTopicEvaluator {
    store: Arc<dyn EvidenceStore>,
    classifier: Arc<dyn TopicClassification>,
    policy: EvaluationPolicy,
}

impl SpeechTopicEvaluator {
    pub fn new(
        store: Arc<dyn EvidenceStore>,
        classifier: Arc<dyn TopicClassification>,
        policy: EvaluationPolicy,
    ) -> Self {
        Self {
            store,
            classifier,
            policy,
        }
    }

    async fn themes(&self, student: &str, exam: &str) -> Result<Vec<String>> {
        let registrations: Vec<Registration> = read_records(
            self.store.as_ref(),
            CollectionName::Registration,
            &student_exam_filter(student, exam),
        )
        .await?;
        Ok(registrations
            .first()
            .map(Registration::theme_list)
            .unwrap_or_default())
    }

    /// `Some(verdict)` for the first label above threshold.
    async fn detect(&self, text: &str, themes: &[String], scope: &str) -> Result<Option<Verdict>> {
        let scores = self.classifier.classify_topics(text, themes).await?;
        Ok(scores
            .into_iter()
            .find(|s| self.policy.is_theme_hit(s.score))
            .map(|s| {
                Verdict::fail_with(format!(
                    "Detected theme '{}' in {} with probability {}.",
                    s.label, scope, s.score
                ))
            }))
    }

    async fn try_evaluate(&self, student: &str, exam: &str) -> Result<Verdict> {
        let conversations: Vec<Conversation> = read_records(
            self.store.as_ref(),
            CollectionName::Conversations,
            &student_exam_filter(student, exam),
        )
        .await?;
        if conversations.is_empty() {
            return Ok(Verdict::success_with("No conversations found."));
        }

        let themes = self.themes(student, exam).await?;
        if themes.is_empty() {
            return Ok(Verdict::success_with("No themes detected."));
        }

        for snippet in &conversations {
            if let Some(verdict) = self
                .detect(&snippet.conversation, &themes, "conversation snippet")
                .await?
            {
                return Ok(verdict);
            }
        }

        let transcript = conversations
            .iter()
            .map(|c| c.conversation.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(verdict) = self.detect(&transcript, &themes, "merged transcript").await? {
            return Ok(verdict);
        }

        Ok(Verdict::success_with("No themes detected."))
    }
}

#[async_trait]
impl SignalEvaluator for SpeechTopicEvaluator {
    fn signal(&self) -> Signal {
        Signal::Speech
    }

    async fn evaluate(&self, student: &str, exam: &str) -> Result<Verdict> {
        match self.try_evaluate(student, exam).await {
            Ok(verdict) => Ok(verdict),
            Err(e @ ProctorError::InvalidCollection(_)) => Err(e),
            Err(e) => Ok(Verdict::error(format!(
                "An error occurred while processing speech report: {e}"
            ))),
        }
    }
}
