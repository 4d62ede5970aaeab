//! Report cache controller.
//!
//! An exam is either unreported (no entry in the report collection) or
//! reported. A partial refresh moves every unreported exam to reported; only
//! a full refresh replaces existing entries, by clearing the collection and
//! rebuilding everything.

use std::collections::BTreeSet;
use std::sync::Arc;

use evidence_store::{CollectionName, EvidenceStore, Filter};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::builder::StudentReportBuilder;
use crate::domain::{read_records, string_field, ExamReport, StudentReport};
use crate::error::Result;
use crate::materializer::ExamReportMaterializer;
use crate::obs;
use crate::perception::Perception;
use crate::policy::EvaluationPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshMode {
    Partial,
    Full,
}

impl RefreshMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshMode::Partial => "partial",
            RefreshMode::Full => "full",
        }
    }
}

/// Outcome of one refresh pass, per exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub mode: RefreshMode,
    /// Exams whose report was built and written.
    pub materialized: Vec<String>,
    /// Exams that produced no report (empty or unreadable roster).
    pub skipped: Vec<String>,
    /// Exams abandoned on a storage fault while building or writing.
    pub failed: Vec<String>,
}

impl RefreshSummary {
    fn new(mode: RefreshMode) -> Self {
        Self {
            mode,
            materialized: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }
}

pub struct ReportCache {
    store: Arc<dyn EvidenceStore>,
    materializer: ExamReportMaterializer,
}

impl ReportCache {
    pub fn new(
        store: Arc<dyn EvidenceStore>,
        perception: &Perception,
        policy: &EvaluationPolicy,
    ) -> Self {
        let builder = StudentReportBuilder::new(store.clone(), perception, policy);
        let materializer = ExamReportMaterializer::new(store.clone(), builder);
        Self::with_materializer(store, materializer)
    }

    pub fn with_materializer(
        store: Arc<dyn EvidenceStore>,
        materializer: ExamReportMaterializer,
    ) -> Self {
        Self {
            store,
            materializer,
        }
    }

    pub fn materializer(&self) -> &ExamReportMaterializer {
        &self.materializer
    }

    /// Distinct exam ids across all registrations (exact-case).
    pub async fn all_exams(&self) -> Result<BTreeSet<String>> {
        let docs = self
            .store
            .read(CollectionName::Registration, &Filter::all())
            .await?;
        Ok(docs.iter().filter_map(|d| string_field(d, "exam")).collect())
    }

    /// Exam ids that already have a cached report.
    pub async fn reported_exams(&self) -> Result<BTreeSet<String>> {
        let docs = self
            .store
            .read(CollectionName::Report, &Filter::all())
            .await?;
        Ok(docs.iter().filter_map(|d| string_field(d, "test")).collect())
    }

    /// Exams with registrations but no cached report.
    pub async fn missing_exams(&self) -> Result<BTreeSet<String>> {
        let all = self.all_exams().await?;
        let reported = self.reported_exams().await?;
        Ok(all.difference(&reported).cloned().collect())
    }

    /// Materialize every exam without a cached report. Cached reports are
    /// left untouched.
    pub async fn refresh(&self) -> Result<RefreshSummary> {
        let missing = self.missing_exams().await?;
        info!(exams = missing.len(), "partial refresh");
        self.materialize_all(missing, RefreshMode::Partial).await
    }

    /// Drop every cached report, then materialize every exam.
    pub async fn full_refresh(&self) -> Result<RefreshSummary> {
        self.store.clear(CollectionName::Report).await?;
        let all = self.all_exams().await?;
        info!(exams = all.len(), "full refresh");
        self.materialize_all(all, RefreshMode::Full).await
    }

    async fn materialize_all(
        &self,
        exams: BTreeSet<String>,
        mode: RefreshMode,
    ) -> Result<RefreshSummary> {
        let mut summary = RefreshSummary::new(mode);

        for exam in exams {
            match self.materializer.produce(&exam).await {
                Ok(Some(_)) => summary.materialized.push(exam),
                Ok(None) => summary.skipped.push(exam),
                Err(e) if e.is_storage_fault() => {
                    warn!(exam = %exam, "report not written: {e}");
                    obs::emit_report_skipped(&exam, &e);
                    summary.failed.push(exam);
                }
                Err(e) => return Err(e),
            }
        }

        obs::emit_refresh_finished(
            mode.as_str(),
            summary.materialized.len(),
            summary.skipped.len(),
            summary.failed.len(),
        );
        Ok(summary)
    }

    /// The cached report for `exam`, materializing it when absent.
    pub async fn report(&self, exam: &str) -> Result<Option<ExamReport>> {
        let cached: Vec<ExamReport> = read_records(
            self.store.as_ref(),
            CollectionName::Report,
            &Filter::all().eq("test", exam),
        )
        .await?;
        if let Some(report) = cached.into_iter().next() {
            return Ok(Some(report));
        }
        self.materializer.produce(exam).await
    }

    /// Evaluate one student without touching the report collection.
    pub async fn student_report(&self, student: &str, exam: &str) -> Result<StudentReport> {
        self.materializer.builder().build(student, exam).await
    }
}

impl std::fmt::Debug for ReportCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportCache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProctorError;

    #[test]
    fn summary_serializes_mode_lowercase() {
        let mut summary = RefreshSummary::new(RefreshMode::Full);
        summary.materialized.push("Calculus".to_string());
        let v = serde_json::to_value(&summary).unwrap();
        assert_eq!(v["mode"], "full");
        assert_eq!(v["materialized"][0], "Calculus");
    }

    #[test]
    fn invalid_collection_is_not_a_storage_fault() {
        assert!(!ProctorError::InvalidCollection("x".to_string()).is_storage_fault());
    }
}
