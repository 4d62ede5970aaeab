//! Structured observability hooks for report lifecycle events.
//!
//! - Exam-scoped tracing spans via [`exam_span`]
//! - Emission functions for materialization, signal evaluation and refresh
//!
//! Events are emitted at `info!` level (filter with `PROCTOR_LOG`); faults at
//! `warn!`.

use tracing::{info, warn};

use crate::domain::{Signal, Verdict};

/// Span that scopes all events of one exam's report production.
///
/// ```ignore
/// produce(exam).instrument(exam_span("Calculus")).await
/// ```
pub fn exam_span(exam: &str) -> tracing::Span {
    tracing::info_span!("proctor.exam", exam = %exam)
}

/// Emit event: exam report assembled and handed to the report collection.
pub fn emit_report_materialized(exam: &str, students: usize, digest: &str) {
    info!(
        event = "report.materialized",
        exam = %exam,
        students = students,
        digest = %digest,
    );
}

/// Emit event: no report this pass.
pub fn emit_report_skipped(exam: &str, reason: &dyn std::fmt::Display) {
    warn!(event = "report.skipped", exam = %exam, reason = %reason);
}

/// Emit event: one signal evaluated for one student.
pub fn emit_signal_evaluated(student: &str, signal: Signal, verdict: &Verdict) {
    info!(
        event = "signal.evaluated",
        student = %student,
        signal = %signal,
        verdict = %verdict,
    );
}

/// Emit event: an evaluator fault cut a student report short.
pub fn emit_signal_fault(student: &str, signal: Signal, error: &dyn std::fmt::Display) {
    warn!(event = "signal.fault", student = %student, signal = %signal, error = %error);
}

/// Emit event: a refresh pass finished.
pub fn emit_refresh_finished(mode: &str, materialized: usize, skipped: usize, failed: usize) {
    info!(
        event = "refresh.finished",
        mode = %mode,
        materialized = materialized,
        skipped = skipped,
        failed = failed,
    );
}
