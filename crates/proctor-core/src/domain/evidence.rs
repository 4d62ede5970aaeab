//! Typed evidence records.
//!
//! Ingestion writes these documents; this crate only reads them, except for
//! flagged photos which the object-detection signal copies into quarantine.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use evidence_store::{CollectionName, Document, EvidenceStore, Filter, StorageError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ProctorError, Result};

/// A base64 image as stored by the capture clients, optionally wrapped in a
/// data URL (`data:image/jpeg;base64,...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    pub fn new(encoded: impl Into<String>) -> Self {
        EncodedImage(encoded.into())
    }

    /// Encode raw JPEG bytes as a data URL, the way capture clients send them.
    pub fn from_jpeg(bytes: &[u8]) -> Self {
        EncodedImage(format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode into raw image bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let payload = match self.0.strip_prefix("data:") {
            Some(rest) => rest
                .split_once(',')
                .map(|(_, data)| data)
                .ok_or_else(|| ProctorError::perception("data URL without payload"))?,
            None => self.0.as_str(),
        };
        STANDARD
            .decode(payload.trim())
            .map_err(|e| ProctorError::perception(format!("undecodable image: {e}")))
    }
}

/// A timestamped image: screenshots, periodic webcam photos, flagged photos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEvidence {
    pub student: String,
    pub exam: String,
    pub time: DateTime<Utc>,
    pub image: EncodedImage,
}

/// One transcribed conversation snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub student: String,
    pub exam: String,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub conversation: String,
}

/// A student's registration for an exam. `themes` is the comma-separated
/// list of forbidden conversation topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub student: String,
    pub exam: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub themes: Option<String>,
}

impl Registration {
    /// Forbidden themes, split on commas, trimmed, empties dropped.
    pub fn theme_list(&self) -> Vec<String> {
        self.themes
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Filter selecting one student's evidence for one exam.
pub fn student_exam_filter(student: &str, exam: &str) -> Filter {
    Filter::all().eq("student", student).eq("exam", exam)
}

/// A top-level string field of a raw document; `None` when absent or not a
/// string.
pub(crate) fn string_field(doc: &Document, field: &str) -> Option<String> {
    doc.get(field).and_then(|v| v.as_str()).map(str::to_string)
}

/// Read and deserialize every matching document of `collection`.
pub async fn read_records<T: DeserializeOwned>(
    store: &dyn EvidenceStore,
    collection: CollectionName,
    filter: &Filter,
) -> Result<Vec<T>> {
    store
        .read(collection, filter)
        .await?
        .into_iter()
        .map(|doc| {
            serde_json::from_value(serde_json::Value::Object(doc)).map_err(|e| {
                ProctorError::from(StorageError::Malformed(format!("{collection}: {e}")))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_data_url() {
        let image = EncodedImage::from_jpeg(&[0xff, 0xd8, 0xff, 0xe0]);
        assert!(image.as_str().starts_with("data:image/jpeg;base64,"));
        assert_eq!(image.decode().unwrap(), vec![0xff, 0xd8, 0xff, 0xe0]);
    }

    #[test]
    fn string_field_ignores_non_strings() {
        let doc = serde_json::json!({"exam": 7, "test": "Calculus"})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(string_field(&doc, "exam"), None);
        assert_eq!(string_field(&doc, "test").as_deref(), Some("Calculus"));
        assert_eq!(string_field(&doc, "student"), None);
    }

    #[test]
    fn decodes_bare_base64() {
        let image = EncodedImage::new("aGVsbG8=");
        assert_eq!(image.decode().unwrap(), b"hello");
    }

    #[test]
    fn undecodable_image_is_perception_fault() {
        let err = EncodedImage::new("data:image/png;base64,@@@").decode().unwrap_err();
        assert!(matches!(err, ProctorError::PerceptionFault(_)));

        let err = EncodedImage::new("data:image/png").decode().unwrap_err();
        assert!(matches!(err, ProctorError::PerceptionFault(_)));
    }

    #[test]
    fn theme_list_splits_and_trims() {
        let reg = Registration {
            student: "ana@uni.edu".to_string(),
            exam: "Calculus".to_string(),
            themes: Some("cheating, collusion,,".to_string()),
        };
        assert_eq!(reg.theme_list(), vec!["cheating", "collusion"]);
    }

    #[test]
    fn missing_themes_is_empty_list() {
        let reg: Registration =
            serde_json::from_value(serde_json::json!({"student": "a", "exam": "b"})).unwrap();
        assert!(reg.theme_list().is_empty());
    }
}
