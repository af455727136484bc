//! Error types shared by every pipeline stage.

use std::path::PathBuf;
use thiserror::Error;

/// A single input row the loader refused.
///
/// `line` is the 1-based line in the source, so the header is line 1.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: invalid {field}: {reason}")]
pub struct RowError {
    pub line: u64,
    pub field: &'static str,
    pub reason: String,
}

impl RowError {
    pub fn new(line: u64, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            line,
            field,
            reason: reason.into(),
        }
    }
}

/// Main error type for grading operations
#[derive(Debug, Error)]
pub enum GradingError {
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Parse(#[from] RowError),

    #[error("weights must be non-negative and sum to 1.0 (exam {exam}, coursework {coursework})")]
    InvalidWeights { exam: f64, coursework: f64 },

    #[error("cannot assemble {records} scored records with {grades} grades")]
    LengthMismatch { records: usize, grades: usize },

    #[error("overall score for `{id}` is not finite: {value}")]
    NonFiniteScore { id: String, value: f64 },

    #[error("failed to write {}: {source}", path.display())]
    SinkWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, GradingError>;
