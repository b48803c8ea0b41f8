//! Error types for the grading layer.
//!
//! Judging itself never fails; these cover fixture parsing, engine setup and
//! worker tasks so callers can match on the failure instead of a string.

use thiserror::Error;

/// Errors raised around the judging engine.
#[derive(Debug, Error)]
pub enum TitlematchError {
    /// The grading engine needs at least one worker.
    #[error("parallelism must be at least 1, got {0}")]
    InvalidParallelism(usize),

    /// An output format name was not recognized.
    #[error("unknown output format '{0}' (expected text, json or markdown)")]
    UnknownFormat(String),

    /// A guess expectation string was neither `accept` nor `reject`.
    #[error("unknown expectation '{0}' (expected \"accept\" or \"reject\")")]
    UnknownExpectation(String),

    /// A blocking grading task panicked or was cancelled.
    #[error("grading task for case '{case_id}' failed: {message}")]
    TaskFailed { case_id: String, message: String },

    /// The worker semaphore was closed while tasks were pending.
    #[error("grading semaphore closed")]
    SemaphoreClosed,
}
