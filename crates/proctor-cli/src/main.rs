//! Proctor - exam integrity report CLI
//!
//! ## Commands
//!
//! - `refresh`: build reports for exams that have none (`--full` rebuilds all)
//! - `report`: show an exam's report, building it if missing
//! - `student`: evaluate one student without caching the result
//! - `collection`: dump the raw documents of an evidence collection
//!
//! All output is JSON on stdout; logs go to stderr.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use evidence_store::{CollectionName, EvidenceStore, Filter, StoreConfig, SurrealEvidenceStore};
use proctor_core::{EvaluationPolicy, HttpPerception, Perception, ReportCache, METRICS};
use serde_json::Value;
use tracing::{debug, info, Level};

#[derive(Parser)]
#[command(name = "proctor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Exam integrity evidence aggregation and report cache", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Materialize reports for exams without a cached report
    Refresh {
        /// Clear every cached report and rebuild all of them
        #[arg(long)]
        full: bool,
    },

    /// Show the cached report of an exam, materializing it when absent
    Report {
        /// Exam identifier
        exam: String,
    },

    /// Evaluate one student for one exam (not cached)
    Student {
        /// Student identifier (email)
        student: String,

        /// Exam identifier
        exam: String,
    },

    /// List the documents of an evidence collection
    Collection {
        /// Collection name (e.g. screenshot, blur, registration, report)
        name: String,

        /// Only documents of this student
        #[arg(long)]
        student: Option<String>,

        /// Only documents of this exam
        #[arg(long)]
        exam: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    proctor_core::init_tracing(cli.json, level);

    debug!(store = %StoreConfig::from_env().describe(), "resolving evidence store");
    let store: Arc<dyn EvidenceStore> = Arc::new(
        SurrealEvidenceStore::from_env()
            .await
            .context("Failed to connect to evidence store")?,
    );

    let output = match cli.command {
        Commands::Refresh { full } => cmd_refresh(&report_cache(store)?, full).await?,
        Commands::Report { exam } => cmd_report(&report_cache(store)?, &exam).await?,
        Commands::Student { student, exam } => {
            cmd_student(&report_cache(store)?, &student, &exam).await?
        }
        Commands::Collection {
            name,
            student,
            exam,
        } => cmd_collection(store.as_ref(), &name, student.as_deref(), exam.as_deref()).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    METRICS.flush();
    Ok(())
}

/// Report cache backed by the inference server from the environment
fn report_cache(store: Arc<dyn EvidenceStore>) -> Result<ReportCache> {
    let client = HttpPerception::from_env().context("Failed to create perception client")?;
    debug!(url = %client.config().base_url, "perception client ready");
    Ok(ReportCache::new(
        store,
        &Perception::shared(Arc::new(client)),
        &EvaluationPolicy::default(),
    ))
}

/// Run a partial or full refresh and return its summary
async fn cmd_refresh(cache: &ReportCache, full: bool) -> Result<Value> {
    let summary = if full {
        cache.full_refresh().await.context("Full refresh failed")?
    } else {
        cache.refresh().await.context("Refresh failed")?
    };
    info!(
        materialized = summary.materialized.len(),
        failed = summary.failed.len(),
        "refresh complete"
    );
    Ok(serde_json::to_value(summary)?)
}

/// Exam report, or `null` when the exam has no roster
async fn cmd_report(cache: &ReportCache, exam: &str) -> Result<Value> {
    let report = cache
        .report(exam)
        .await
        .context(format!("Failed to load report for {}", exam))?;
    if report.is_none() {
        info!(exam = %exam, "no registered students; no report");
    }
    Ok(serde_json::to_value(report)?)
}

async fn cmd_student(cache: &ReportCache, student: &str, exam: &str) -> Result<Value> {
    let report = cache
        .student_report(student, exam)
        .await
        .context(format!("Failed to evaluate {} for {}", student, exam))?;
    Ok(serde_json::to_value(report)?)
}

/// Raw documents of a collection, optionally narrowed by student and exam
async fn cmd_collection(
    store: &dyn EvidenceStore,
    name: &str,
    student: Option<&str>,
    exam: Option<&str>,
) -> Result<Value> {
    let collection = CollectionName::from_str(name)?;

    let mut filter = Filter::all();
    if let Some(student) = student {
        filter = filter.eq("student", student);
    }
    if let Some(exam) = exam {
        filter = filter.eq("exam", exam);
    }

    let docs = store
        .read(collection, &filter)
        .await
        .context(format!("Failed to read {}", collection.logical_name()))?;
    Ok(Value::Array(docs.into_iter().map(Value::Object).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_store::fakes::MemoryEvidenceStore;
    use evidence_store::StorageError;
    use proctor_core::perception::fakes::{
        ScriptedDocumentQa, ScriptedObjectDetector, ScriptedTopicClassifier,
    };
    use serde_json::json;

    fn seeded_store() -> Arc<MemoryEvidenceStore> {
        let store = Arc::new(MemoryEvidenceStore::new());
        for (student, exam) in [
            ("ana@uni.edu", "Calculus"),
            ("ben@uni.edu", "Calculus"),
            ("ana@uni.edu", "Physics"),
        ] {
            store.insert(
                CollectionName::Registration,
                json!({"student": student, "exam": exam, "themes": "cheating"})
                    .as_object()
                    .cloned()
                    .unwrap(),
            );
        }
        store
    }

    fn cache(store: Arc<MemoryEvidenceStore>) -> ReportCache {
        let perception = Perception::new(
            Arc::new(ScriptedDocumentQa::answering("Calculus", 0.9)),
            Arc::new(ScriptedObjectDetector::new()),
            Arc::new(ScriptedTopicClassifier::new()),
        );
        ReportCache::new(store, &perception, &EvaluationPolicy::default())
    }

    #[tokio::test]
    async fn collection_accepts_logical_and_stored_names() {
        let store = seeded_store();
        let by_logical = cmd_collection(store.as_ref(), "registration", None, Some("Calculus"))
            .await
            .unwrap();
        let by_table = cmd_collection(store.as_ref(), "test", Some("ana@uni.edu"), None)
            .await
            .unwrap();
        assert_eq!(by_logical.as_array().unwrap().len(), 2);
        assert_eq!(by_table.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_collection_is_an_explicit_error() {
        let store = seeded_store();
        let err = cmd_collection(store.as_ref(), "grades", None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StorageError>(),
            Some(StorageError::InvalidCollection { .. })
        ));
    }

    #[tokio::test]
    async fn refresh_then_report_returns_cached_entry() {
        let store = seeded_store();
        let cache = cache(store.clone());

        let summary = cmd_refresh(&cache, false).await.unwrap();
        assert_eq!(summary["mode"], "partial");
        assert_eq!(summary["materialized"], json!(["Calculus", "Physics"]));

        let report = cmd_report(&cache, "Calculus").await.unwrap();
        assert_eq!(report["test"], "Calculus");
        assert_eq!(report["reports"].as_array().unwrap().len(), 2);
        assert_eq!(store.len(CollectionName::Report), 2);
    }

    #[tokio::test]
    async fn report_for_unknown_exam_is_null() {
        let cache = cache(seeded_store());
        assert_eq!(cmd_report(&cache, "Chemistry").await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn student_report_lists_every_signal() {
        let store = seeded_store();
        let report = cmd_student(&cache(store.clone()), "ana@uni.edu", "Calculus")
            .await
            .unwrap();
        assert_eq!(report["screenshot"], "FAIL: No screenshot.");
        assert_eq!(report["outOfFrame"], "SUCCESS");
        assert_eq!(report["speech"], "SUCCESS: No conversations found.");
        assert_eq!(store.len(CollectionName::Report), 0);
    }
}
