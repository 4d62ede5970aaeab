//! Domain models for exam proctoring.
//!
//! - Evidence records: typed views over documents in the evidence store
//! - `Verdict` / `Signal`: the outcome of one signal for one student
//! - `StudentReport` / `ExamReport`: the aggregated, cached artifacts

pub mod evidence;
pub mod report;
pub mod verdict;

pub use evidence::{
    read_records, student_exam_filter, Conversation, EncodedImage, ImageEvidence, Registration,
};
pub(crate) use evidence::string_field;
pub use report::{ExamReport, StudentReport};
pub use verdict::{Signal, Verdict, VerdictTag};
