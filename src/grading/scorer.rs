use serde::Serialize;

use crate::error::{GradingError, Result};
use crate::grading::types::{ScoredRecord, StudentRecord};

/// How far the weight sum may drift from 1.0 before it is rejected.
const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Rounds to the two decimals the report stores.
///
/// Marks and overall scores pass through this before grading, so a report
/// holds exactly the values its grades were computed from.
pub fn to_report_precision(value: f64) -> f64 {
    // + 0.0 turns a rounded -0.0 into 0.0
    (value * 100.0).round() / 100.0 + 0.0
}

/// Exam and coursework weights. Always non-negative and summing to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Weights {
    exam: f64,
    coursework: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            exam: 0.6,
            coursework: 0.4,
        }
    }
}

impl Weights {
    /// Validates a weight pair. Pairs that do not sum to 1.0 are rejected, not normalized.
    ///
    /// # Errors
    ///
    /// Returns [`GradingError::InvalidWeights`] if either weight is negative or
    /// non-finite, or if the sum is not 1.0.
    pub fn new(exam: f64, coursework: f64) -> Result<Self> {
        let valid = exam.is_finite()
            && coursework.is_finite()
            && exam >= 0.0
            && coursework >= 0.0
            && ((exam + coursework) - 1.0).abs() <= WEIGHT_TOLERANCE;

        if !valid {
            return Err(GradingError::InvalidWeights { exam, coursework });
        }
        Ok(Weights { exam, coursework })
    }

    pub fn exam(&self) -> f64 {
        self.exam
    }

    pub fn coursework(&self) -> f64 {
        self.coursework
    }

    /// Weighted overall score for one pair of marks, at report precision.
    pub fn overall(&self, exam: f64, coursework: f64) -> f64 {
        let raw = exam * self.exam + coursework * self.coursework;
        if !raw.is_finite() {
            return raw;
        }
        // rounding can push the sum just past either mark
        to_report_precision(raw).clamp(exam.min(coursework), exam.max(coursework))
    }
}

/// Scores every student, keeping input order.
pub fn score_all(students: Vec<StudentRecord>, weights: &Weights) -> Vec<ScoredRecord> {
    students
        .into_iter()
        .map(|student| {
            let overall = weights.overall(student.exam, student.coursework);
            ScoredRecord { student, overall }
        })
        .collect()
}
