//! Per-signal verdicts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome class of one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictTag {
    Success,
    Fail,
    Error,
}

impl VerdictTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictTag::Success => "SUCCESS",
            VerdictTag::Fail => "FAIL",
            VerdictTag::Error => "ERROR",
        }
    }
}

/// Verdict of one signal evaluator for one (student, exam).
///
/// Rendered as `TAG` or `TAG: reason`; that text is what reports carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub tag: VerdictTag,
    pub reason: Option<String>,
}

impl Verdict {
    pub fn success() -> Self {
        Self {
            tag: VerdictTag::Success,
            reason: None,
        }
    }

    pub fn success_with(reason: impl Into<String>) -> Self {
        Self {
            tag: VerdictTag::Success,
            reason: Some(reason.into()),
        }
    }

    pub fn fail() -> Self {
        Self {
            tag: VerdictTag::Fail,
            reason: None,
        }
    }

    pub fn fail_with(reason: impl Into<String>) -> Self {
        Self {
            tag: VerdictTag::Fail,
            reason: Some(reason.into()),
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            tag: VerdictTag::Error,
            reason: Some(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.tag == VerdictTag::Success
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{}: {}", self.tag.as_str(), reason),
            None => f.write_str(self.tag.as_str()),
        }
    }
}

/// The five monitored signals, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Signal {
    Screenshot,
    OutOfFrame,
    Blur,
    ObjectDetection,
    Speech,
}

impl Signal {
    pub const ORDER: [Signal; 5] = [
        Signal::Screenshot,
        Signal::OutOfFrame,
        Signal::Blur,
        Signal::ObjectDetection,
        Signal::Speech,
    ];

    /// Field name of this signal in a student report.
    pub fn name(&self) -> &'static str {
        match self {
            Signal::Screenshot => "screenshot",
            Signal::OutOfFrame => "outOfFrame",
            Signal::Blur => "blur",
            Signal::ObjectDetection => "objectDetection",
            Signal::Speech => "speech",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_tag_only_without_reason() {
        assert_eq!(Verdict::success().to_string(), "SUCCESS");
        assert_eq!(Verdict::fail().to_string(), "FAIL");
    }

    #[test]
    fn renders_tag_and_reason() {
        assert_eq!(
            Verdict::fail_with("No screenshot.").to_string(),
            "FAIL: No screenshot."
        );
        assert_eq!(
            Verdict::success_with("No themes detected.").to_string(),
            "SUCCESS: No themes detected."
        );
        assert_eq!(Verdict::error("boom").to_string(), "ERROR: boom");
    }

    #[test]
    fn signal_names_match_report_fields() {
        let names: Vec<&str> = Signal::ORDER.iter().map(Signal::name).collect();
        assert_eq!(
            names,
            vec!["screenshot", "outOfFrame", "blur", "objectDetection", "speech"]
        );
    }
}
