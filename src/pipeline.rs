//! End-to-end grading runs and report verification.

use std::path::Path;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{GradingError, Result, RowError};
use crate::grading::assemble::assemble;
use crate::grading::grade::{Grade, classify_all};
use crate::grading::scorer::{Weights, score_all};
use crate::grading::types::{GradedRecord, StudentRecord};
use crate::output::{sort_by_overall, write_report, write_summary};
use crate::parser::{load_report, load_students};
use crate::stats::{GradeStats, ReportSummary};

/// Everything a grading run produced.
#[derive(Debug)]
pub struct PipelineReport {
    /// Graded records in report order.
    pub records: Vec<GradedRecord>,
    pub rejected: Vec<RowError>,
    pub stats: GradeStats,
    pub summary: ReportSummary,
}

/// Scores, grades and orders students without touching the filesystem.
pub fn grade_students(students: Vec<StudentRecord>, weights: &Weights) -> Result<Vec<GradedRecord>> {
    let scored = score_all(students, weights);
    let grades = classify_all(&scored)?;
    let mut graded = assemble(scored, grades)?;
    sort_by_overall(&mut graded);
    Ok(graded)
}

/// Loads the input, grades it, writes the report and computes statistics.
///
/// Nothing is written unless loading and grading both succeed.
#[tracing::instrument(
    skip_all,
    fields(input = %config.input.display(), output = %config.output.display())
)]
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let loaded = load_students(&config.input, config.on_malformed)?;
    if loaded.skipped() > 0 {
        warn!(skipped = loaded.skipped(), "Some input rows were skipped");
    }
    info!(records = loaded.records.len(), "Student marks loaded");

    let records = grade_students(loaded.records, &config.weights)?;
    write_report(&config.output, &records)?;

    let stats = GradeStats::from_records(&records);
    let summary = ReportSummary::new(&records, loaded.rejected.len(), config.weights);
    if let Some(path) = &config.summary {
        write_summary(path, &summary)?;
    }

    Ok(PipelineReport {
        records,
        rejected: loaded.rejected,
        stats,
        summary,
    })
}

/// A report row whose stored grade disagrees with its marks.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeMismatch {
    pub id: String,
    pub recorded: Grade,
    pub recomputed: Grade,
}

#[derive(Debug, Default)]
pub struct Verification {
    pub checked: usize,
    pub mismatches: Vec<GradeMismatch>,
}

impl Verification {
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Recomputes every grade in a written report from its exam and coursework columns.
#[tracing::instrument(skip_all, fields(report = %path.display()))]
pub fn verify_report(path: &Path, weights: &Weights) -> Result<Verification> {
    let rows = load_report(path)?;
    let mut verification = Verification::default();

    for row in rows {
        let overall = weights.overall(row.exam, row.coursework);
        let recomputed = Grade::from_score(overall).ok_or_else(|| GradingError::NonFiniteScore {
            id: row.reg_no.clone(),
            value: overall,
        })?;

        verification.checked += 1;
        if recomputed != row.grade {
            warn!(id = %row.reg_no, recorded = %row.grade, recomputed = %recomputed, "Grade mismatch");
            verification.mismatches.push(GradeMismatch {
                id: row.reg_no,
                recorded: row.grade,
                recomputed,
            });
        }
    }

    info!(
        checked = verification.checked,
        mismatches = verification.mismatches.len(),
        "Report verified"
    );
    Ok(verification)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: &str, exam: f64, coursework: f64) -> StudentRecord {
        StudentRecord {
            id: id.to_string(),
            exam,
            coursework,
        }
    }

    #[test]
    fn test_grade_students_scenario() {
        let graded = grade_students(
            vec![
                student("S2", 50.0, 50.0),
                student("S3", 39.0, 39.0),
                student("S1", 90.0, 90.0),
            ],
            &Weights::default(),
        )
        .unwrap();

        let summary: Vec<_> = graded
            .iter()
            .map(|r| (r.student.id.as_str(), r.overall, r.grade))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("S1", 90.0, Grade::APlus),
                ("S2", 50.0, Grade::C),
                ("S3", 39.0, Grade::F),
            ]
        );
    }

    #[test]
    fn test_grade_students_rejects_non_finite() {
        let err = grade_students(vec![student("S1", f64::NAN, 10.0)], &Weights::default())
            .unwrap_err();
        assert!(matches!(err, GradingError::NonFiniteScore { .. }));
    }

    #[test]
    fn test_grade_students_keeps_every_id_once() {
        let students: Vec<_> = (0..50)
            .map(|i| student(&format!("S{i}"), (i * 2) as f64, (100 - i) as f64))
            .collect();
        let graded = grade_students(students, &Weights::default()).unwrap();

        let mut ids: Vec<_> = graded.iter().map(|r| r.student.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
        assert!(graded.windows(2).all(|w| w[0].overall >= w[1].overall));
    }
}
