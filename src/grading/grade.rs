use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GradingError, Result};
use crate::grading::types::ScoredRecord;

/// Letter grade, declared from best to worst so the derived `Ord` is rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
    D,
    F,
}

/// Inclusive lower bound of every grade above F, highest first.
///
/// | Range   | Grade |
/// |---------|-------|
/// | >= 90   | A+    |
/// | >= 80   | A     |
/// | >= 70   | B+    |
/// | >= 60   | B     |
/// | >= 50   | C     |
/// | >= 40   | D     |
/// | < 40    | F     |
const BOUNDARIES: [(f64, Grade); 6] = [
    (90.0, Grade::APlus),
    (80.0, Grade::A),
    (70.0, Grade::BPlus),
    (60.0, Grade::B),
    (50.0, Grade::C),
    (40.0, Grade::D),
];

impl Grade {
    /// Converts an overall score into a letter grade.
    ///
    /// Returns `None` for NaN and infinities; every finite score has exactly one grade.
    pub fn from_score(score: f64) -> Option<Grade> {
        if !score.is_finite() {
            return None;
        }
        let grade = BOUNDARIES
            .iter()
            .find(|(floor, _)| score >= *floor)
            .map_or(Grade::F, |(_, grade)| *grade);
        Some(grade)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grades every scored record, keeping input order.
pub fn classify_all(scored: &[ScoredRecord]) -> Result<Vec<Grade>> {
    scored
        .iter()
        .map(|record| {
            Grade::from_score(record.overall).ok_or_else(|| GradingError::NonFiniteScore {
                id: record.student.id.clone(),
                value: record.overall,
            })
        })
        .collect()
}
