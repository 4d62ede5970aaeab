//! Exam report materializer.

use std::sync::Arc;

use evidence_store::{CollectionName, EvidenceStore, Filter};
use tracing::{debug, error, warn, Instrument};

use crate::builder::StudentReportBuilder;
use crate::domain::{string_field, ExamReport};
use crate::error::Result;
use crate::metrics::{Counter, METRICS};
use crate::obs;

/// Builds the report of every rostered student and caches the result.
///
/// Roster read and report write are two separate store round-trips with no
/// lock in between: concurrent calls for the same exam may both compute,
/// and `write_once` keeps a single copy when their content agrees.
#[derive(Clone)]
pub struct ExamReportMaterializer {
    store: Arc<dyn EvidenceStore>,
    builder: StudentReportBuilder,
}

impl ExamReportMaterializer {
    pub fn new(store: Arc<dyn EvidenceStore>, builder: StudentReportBuilder) -> Self {
        Self { store, builder }
    }

    pub fn builder(&self) -> &StudentReportBuilder {
        &self.builder
    }

    /// Students registered for `exam` (case-insensitive match), in
    /// registration order. Duplicate registrations are kept; a registration
    /// without a string `student` and `exam` is skipped.
    pub async fn roster(&self, exam: &str) -> Result<Vec<String>> {
        let docs = self
            .store
            .read(CollectionName::Registration, &Filter::all())
            .await?;
        let wanted = exam.to_lowercase();
        let mut roster = Vec::new();
        for doc in &docs {
            let (Some(student), Some(registered)) =
                (string_field(doc, "student"), string_field(doc, "exam"))
            else {
                warn!("skipping registration without student or exam");
                continue;
            };
            if registered.to_lowercase() == wanted {
                roster.push(student);
            }
        }
        Ok(roster)
    }

    /// Build, persist and return the report for `exam`.
    ///
    /// `Ok(None)` when the roster cannot be read this pass or is empty.
    pub async fn produce(&self, exam: &str) -> Result<Option<ExamReport>> {
        self.produce_inner(exam)
            .instrument(obs::exam_span(exam))
            .await
    }

    async fn produce_inner(&self, exam: &str) -> Result<Option<ExamReport>> {
        let roster = match self.roster(exam).await {
            Ok(roster) => roster,
            Err(e) if e.is_storage_fault() => {
                error!("roster unavailable: {e}");
                obs::emit_report_skipped(exam, &e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if roster.is_empty() {
            obs::emit_report_skipped(exam, &"empty roster");
            return Ok(None);
        }
        debug!(students = roster.len(), "roster resolved");

        let mut reports = Vec::with_capacity(roster.len());
        for student in &roster {
            reports.push(self.builder.build(student, exam).await?);
        }

        let report = ExamReport {
            test: exam.to_string(),
            reports,
        };
        self.store
            .write_once(CollectionName::Report, report.to_document()?)
            .await?;

        METRICS.incr(Counter::ReportsMaterialized);
        obs::emit_report_materialized(exam, report.reports.len(), &report.content_digest());
        Ok(Some(report))
    }
}
