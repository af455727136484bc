//! Data types used by the grading pipeline.

use serde::{Deserialize, Serialize, Serializer};

use crate::grading::grade::Grade;

/// One row of input marks.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub id: String,
    pub exam: f64,
    pub coursework: f64,
}

/// A student together with the weighted overall score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub student: StudentRecord,
    pub overall: f64,
}

/// A fully processed student: marks, overall score and letter grade.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedRecord {
    pub student: StudentRecord,
    pub overall: f64,
    pub grade: Grade,
}

/// The persisted shape of a [`GradedRecord`], in report column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "RegNo")]
    pub reg_no: String,
    #[serde(rename = "Exam", serialize_with = "two_decimals")]
    pub exam: f64,
    #[serde(rename = "Coursework", serialize_with = "two_decimals")]
    pub coursework: f64,
    #[serde(rename = "Overall", serialize_with = "two_decimals")]
    pub overall: f64,
    #[serde(rename = "Grade")]
    pub grade: Grade,
}

impl From<&GradedRecord> for ReportRow {
    fn from(record: &GradedRecord) -> Self {
        ReportRow {
            reg_no: record.student.id.clone(),
            exam: record.student.exam,
            coursework: record.student.coursework,
            overall: record.overall,
            grade: record.grade,
        }
    }
}

fn two_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{value:.2}"))
}
