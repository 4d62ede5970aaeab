//! Student report builder.

use std::sync::Arc;

use evidence_store::EvidenceStore;
use tracing::error;

use crate::domain::StudentReport;
use crate::error::{ProctorError, Result};
use crate::metrics::{Counter, METRICS};
use crate::obs;
use crate::perception::Perception;
use crate::policy::EvaluationPolicy;
use crate::signals::{standard_evaluators, SignalEvaluator};

/// Runs the signal evaluators for one student in a fixed order.
///
/// The first evaluator fault ends the run: the report keeps the verdicts
/// gathered so far and later signals stay absent. An invalid collection is
/// a programming error and reaches the caller instead.
#[derive(Clone)]
pub struct StudentReportBuilder {
    evaluators: Vec<Arc<dyn SignalEvaluator>>,
}

impl StudentReportBuilder {
    pub fn new(
        store: Arc<dyn EvidenceStore>,
        perception: &Perception,
        policy: &EvaluationPolicy,
    ) -> Self {
        Self::with_evaluators(standard_evaluators(store, perception, policy))
    }

    pub fn with_evaluators(evaluators: Vec<Arc<dyn SignalEvaluator>>) -> Self {
        Self { evaluators }
    }

    pub async fn build(&self, student: &str, exam: &str) -> Result<StudentReport> {
        let mut report = StudentReport::new(student, exam);

        for evaluator in &self.evaluators {
            let signal = evaluator.signal();
            match evaluator.evaluate(student, exam).await {
                Ok(verdict) => {
                    obs::emit_signal_evaluated(student, signal, &verdict);
                    METRICS.incr(Counter::SignalsEvaluated);
                    report.set(signal, &verdict);
                }
                Err(e @ ProctorError::InvalidCollection(_)) => return Err(e),
                Err(e) => {
                    error!(student = %student, exam = %exam, signal = %signal, "evaluation aborted: {e}");
                    obs::emit_signal_fault(student, signal, &e);
                    METRICS.incr(Counter::SignalFaults);
                    break;
                }
            }
        }

        METRICS.incr(Counter::StudentsEvaluated);
        Ok(report)
    }
}
