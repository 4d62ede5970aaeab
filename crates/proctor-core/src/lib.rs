//! Proctor Core Library
//!
//! Turns raw exam-session evidence into per-student integrity verdicts and
//! caches one report per exam.
//!
//! Flow: [`ReportCache`] finds exams without a cached report and hands each
//! to the [`ExamReportMaterializer`], which resolves the roster and asks the
//! [`StudentReportBuilder`] to run every [`SignalEvaluator`] for each
//! student.

pub mod builder;
pub mod cache;
pub mod domain;
pub mod error;
pub mod materializer;
pub mod metrics;
pub mod obs;
pub mod perception;
pub mod policy;
pub mod signals;
pub mod telemetry;

pub use builder::StudentReportBuilder;

pub use cache::{RefreshMode, RefreshSummary, ReportCache};

pub use domain::{
    Conversation, EncodedImage, ExamReport, ImageEvidence, Registration, Signal, StudentReport,
    Verdict, VerdictTag,
};

pub use error::{ProctorError, Result};

pub use materializer::ExamReportMaterializer;

pub use metrics::{Counter, MetricsSnapshot, METRICS};

pub use perception::{
    Detection, DocumentAnswer, DocumentQuestionAnswering, HttpPerception, ObjectDetection,
    Perception, PerceptionConfig, TopicClassification, TopicScore,
};

pub use policy::EvaluationPolicy;

pub use signals::SignalEvaluator;

pub use telemetry::init_tracing;

/// Proctor version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
