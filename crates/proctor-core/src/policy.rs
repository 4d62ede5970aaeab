//! Decision constants of the signal evaluators.

use serde::{Deserialize, Serialize};

/// Thresholds and labels used when turning model output into verdicts.
///
/// Comparisons are fixed: a title answer is rejected when its confidence is
/// strictly below `title_min_confidence`; phones and themes count when their
/// score is strictly above the respective minimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPolicy {
    /// Question asked about the most recent screenshot.
    pub title_question: String,
    pub title_min_confidence: f64,
    /// Detector label that counts as a violation.
    pub phone_label: String,
    pub phone_min_confidence: f64,
    pub theme_min_score: f64,
}

impl Default for EvaluationPolicy {
    fn default() -> Self {
        Self {
            title_question: "What does the title say?".to_string(),
            title_min_confidence: 0.5,
            phone_label: "cell phone".to_string(),
            phone_min_confidence: 0.9,
            theme_min_score: 0.5,
        }
    }
}

impl EvaluationPolicy {
    pub fn accepts_title(&self, confidence: f64) -> bool {
        confidence >= self.title_min_confidence
    }

    pub fn is_phone(&self, label: &str, confidence: f64) -> bool {
        label == self.phone_label && confidence > self.phone_min_confidence
    }

    pub fn is_theme_hit(&self, score: f64) -> bool {
        score > self.theme_min_score
    }
}
