//! Contract tests for EvidenceStore.
//!
//! The same behavioral contract is checked against the in-memory fake and
//! the SurrealDB backend (`mem://`). Any conforming implementation must pass.

use evidence_store::fakes::MemoryEvidenceStore;
use evidence_store::{
    document_from, CollectionName, Document, EvidenceStore, Filter, StorageError,
    SurrealEvidenceStore,
};
use serde_json::json;

fn doc(value: serde_json::Value) -> Document {
    document_from(&value).unwrap()
}

fn blur_event(student: &str, exam: &str, time: &str) -> Document {
    doc(json!({
        "student": student,
        "exam": exam,
        "time": time,
        "duration": 4.5,
    }))
}

macro_rules! evidence_store_contract {
    ($modname:ident, $make:expr) => {
        mod $modname {
            use super::*;

            #[tokio::test]
            async fn read_empty_collection_returns_nothing() {
                let store = $make;
                let docs = store
                    .read(CollectionName::Blur, &Filter::all())
                    .await
                    .unwrap();
                assert!(docs.is_empty());
            }

            #[tokio::test]
            async fn write_once_is_idempotent() {
                let store = $make;
                let event = blur_event("ana@uni.edu", "Calculus", "2024-05-02T10:00:00Z");

                store
                    .write_once(CollectionName::Blur, event.clone())
                    .await
                    .unwrap();
                store
                    .write_once(CollectionName::Blur, event.clone())
                    .await
                    .unwrap();

                let matches = store
                    .read(CollectionName::Blur, &Filter::from_document(&event))
                    .await
                    .unwrap();
                assert_eq!(matches.len(), 1);
                assert_eq!(matches[0], event);
            }

            #[tokio::test]
            async fn write_once_keeps_records_differing_in_one_field() {
                let store = $make;
                store
                    .write_once(
                        CollectionName::Blur,
                        blur_event("ana@uni.edu", "Calculus", "2024-05-02T10:00:00Z"),
                    )
                    .await
                    .unwrap();
                store
                    .write_once(
                        CollectionName::Blur,
                        blur_event("ana@uni.edu", "Calculus", "2024-05-02T10:05:00Z"),
                    )
                    .await
                    .unwrap();

                let all = store
                    .read(CollectionName::Blur, &Filter::all())
                    .await
                    .unwrap();
                assert_eq!(all.len(), 2);
            }

            #[tokio::test]
            async fn read_filters_by_equality_and_keeps_write_order() {
                let store = $make;
                for time in ["t1", "t2", "t3"] {
                    store
                        .write_once(
                            CollectionName::Screenshot,
                            doc(json!({"student": "ana@uni.edu", "exam": "Calculus", "time": time})),
                        )
                        .await
                        .unwrap();
                }
                store
                    .write_once(
                        CollectionName::Screenshot,
                        doc(json!({"student": "ben@uni.edu", "exam": "Calculus", "time": "t1"})),
                    )
                    .await
                    .unwrap();

                let filter = Filter::all()
                    .eq("student", "ana@uni.edu")
                    .eq("exam", "Calculus");
                let docs = store
                    .read(CollectionName::Screenshot, &filter)
                    .await
                    .unwrap();
                let times: Vec<&str> = docs.iter().map(|d| d["time"].as_str().unwrap()).collect();
                assert_eq!(times, vec!["t1", "t2", "t3"]);
            }

            #[tokio::test]
            async fn collections_are_isolated() {
                let store = $make;
                store
                    .write_once(
                        CollectionName::Blur,
                        blur_event("ana@uni.edu", "Calculus", "t1"),
                    )
                    .await
                    .unwrap();

                let other = store
                    .read(CollectionName::OutOfFrame, &Filter::all())
                    .await
                    .unwrap();
                assert!(other.is_empty());
            }

            #[tokio::test]
            async fn nested_report_documents_dedup_on_full_content() {
                let store = $make;
                let report = doc(json!({
                    "test": "Calculus",
                    "reports": [
                        {"student": "ana@uni.edu", "exam": "Calculus", "blur": "SUCCESS"}
                    ]
                }));

                store
                    .write_once(CollectionName::Report, report.clone())
                    .await
                    .unwrap();
                store
                    .write_once(CollectionName::Report, report.clone())
                    .await
                    .unwrap();

                let reports = store
                    .read(CollectionName::Report, &Filter::all().eq("test", "Calculus"))
                    .await
                    .unwrap();
                assert_eq!(reports.len(), 1);
                assert_eq!(reports[0], report);
            }

            #[tokio::test]
            async fn clear_removes_only_that_collection() {
                let store = $make;
                store
                    .write_once(
                        CollectionName::Report,
                        doc(json!({"test": "Calculus", "reports": []})),
                    )
                    .await
                    .unwrap();
                store
                    .write_once(
                        CollectionName::Registration,
                        doc(json!({"student": "ana@uni.edu", "exam": "Calculus"})),
                    )
                    .await
                    .unwrap();

                store.clear(CollectionName::Report).await.unwrap();

                assert!(store
                    .read(CollectionName::Report, &Filter::all())
                    .await
                    .unwrap()
                    .is_empty());
                assert_eq!(
                    store
                        .read(CollectionName::Registration, &Filter::all())
                        .await
                        .unwrap()
                        .len(),
                    1
                );
            }

            #[tokio::test]
            async fn clear_empty_collection_is_noop() {
                let store = $make;
                store.clear(CollectionName::FlaggedPhoto).await.unwrap();
            }
        }
    };
}

evidence_store_contract!(memory, MemoryEvidenceStore::new());
evidence_store_contract!(
    surreal,
    SurrealEvidenceStore::in_memory()
        .await
        .expect("in_memory() failed")
);

// ===========================================================================
// Fake-specific behavior
// ===========================================================================

#[tokio::test]
async fn unavailable_collection_fails_every_operation() {
    let store = MemoryEvidenceStore::new();
    store.set_unavailable(CollectionName::Registration, true);

    let err = store
        .read(CollectionName::Registration, &Filter::all())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Unavailable { .. }));

    let err = store
        .write_once(
            CollectionName::Registration,
            doc(json!({"student": "ana@uni.edu", "exam": "Calculus"})),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Unavailable { .. }));

    store.set_unavailable(CollectionName::Registration, false);
    assert!(store
        .read(CollectionName::Registration, &Filter::all())
        .await
        .is_ok());
}

#[tokio::test]
async fn seeded_duplicates_are_all_returned() {
    let store = MemoryEvidenceStore::new();
    let registration = doc(json!({"student": "ana@uni.edu", "exam": "Calculus"}));
    store.insert(CollectionName::Registration, registration.clone());
    store.insert(CollectionName::Registration, registration);

    assert_eq!(store.len(CollectionName::Registration), 2);
}

// ===========================================================================
// SurrealDB-specific behavior
// ===========================================================================

#[tokio::test]
async fn rows_created_by_other_writers_are_readable() {
    let store = SurrealEvidenceStore::in_memory().await.unwrap();
    let ingested = blur_event("ana@uni.edu", "Calculus", "2024-05-01T10:00:00Z");
    store
        .client()
        .query("CREATE type::table($table) CONTENT $row")
        .bind(("table", "blur".to_string()))
        .bind(("row", serde_json::Value::Object(ingested.clone())))
        .await
        .unwrap()
        .check()
        .unwrap();

    let docs = store
        .read(
            CollectionName::Blur,
            &Filter::all().eq("student", "ana@uni.edu"),
        )
        .await
        .unwrap();
    assert_eq!(docs, vec![ingested.clone()]);

    store
        .write_once(CollectionName::Blur, ingested)
        .await
        .unwrap();
    let docs = store
        .read(CollectionName::Blur, &Filter::all())
        .await
        .unwrap();
    assert_eq!(docs.len(), 1);
}
