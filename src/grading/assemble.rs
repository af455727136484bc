use crate::error::{GradingError, Result};
use crate::grading::grade::Grade;
use crate::grading::types::{GradedRecord, ScoredRecord};

/// Pairs each scored record with the grade at the same position.
///
/// # Errors
///
/// Returns [`GradingError::LengthMismatch`] when the two sequences differ in length.
pub fn assemble(scored: Vec<ScoredRecord>, grades: Vec<Grade>) -> Result<Vec<GradedRecord>> {
    if scored.len() != grades.len() {
        return Err(GradingError::LengthMismatch {
            records: scored.len(),
            grades: grades.len(),
        });
    }

    Ok(scored
        .into_iter()
        .zip(grades)
        .map(|(scored, grade)| GradedRecord {
            student: scored.student,
            overall: scored.overall,
            grade,
        })
        .collect())
}
