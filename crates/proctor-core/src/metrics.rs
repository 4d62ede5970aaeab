//! Process-wide proctoring counters, flushed to the log at the end of a
//! command or refresh.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

pub static METRICS: Metrics = Metrics::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    SignalsEvaluated,
    SignalFaults,
    StudentsEvaluated,
    ReportsMaterialized,
    PhotosFlagged,
}

impl Counter {
    const COUNT: usize = 5;

    pub fn name(&self) -> &'static str {
        match self {
            Counter::SignalsEvaluated => "signals_evaluated",
            Counter::SignalFaults => "signal_faults",
            Counter::StudentsEvaluated => "students_evaluated",
            Counter::ReportsMaterialized => "reports_materialized",
            Counter::PhotosFlagged => "photos_flagged",
        }
    }
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub signals_evaluated: u64,
    pub signal_faults: u64,
    pub students_evaluated: u64,
    pub reports_materialized: u64,
    pub photos_flagged: u64,
}

pub struct Metrics {
    counters: [AtomicU64; Counter::COUNT],
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            counters: [const { AtomicU64::new(0) }; Counter::COUNT],
        }
    }

    pub fn incr(&self, counter: Counter) {
        self.counters[counter as usize].fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = counter.name(), "counter incremented");
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.counters[counter as usize].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            signals_evaluated: self.get(Counter::SignalsEvaluated),
            signal_faults: self.get(Counter::SignalFaults),
            students_evaluated: self.get(Counter::StudentsEvaluated),
            reports_materialized: self.get(Counter::ReportsMaterialized),
            photos_flagged: self.get(Counter::PhotosFlagged),
        }
    }

    pub fn flush(&self) {
        let s = self.snapshot();
        tracing::info!(
            metric = "flush",
            signals_evaluated = s.signals_evaluated,
            signal_faults = s.signal_faults,
            students_evaluated = s.students_evaluated,
            reports_materialized = s.reports_materialized,
            photos_flagged = s.photos_flagged,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_independent() {
        let m = Metrics::new();
        m.incr(Counter::SignalsEvaluated);
        m.incr(Counter::SignalsEvaluated);
        m.incr(Counter::PhotosFlagged);
        assert_eq!(m.get(Counter::SignalsEvaluated), 2);
        assert_eq!(m.get(Counter::PhotosFlagged), 1);
        assert_eq!(m.get(Counter::SignalFaults), 0);
    }

    #[test]
    fn snapshot_serializes_by_counter_name() {
        let m = Metrics::new();
        m.incr(Counter::ReportsMaterialized);
        let v = serde_json::to_value(m.snapshot()).unwrap();
        assert_eq!(v[Counter::ReportsMaterialized.name()], 1);
        assert_eq!(v[Counter::StudentsEvaluated.name()], 0);
    }
}
