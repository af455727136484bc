use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::grading::grade::Grade;
use crate::grading::scorer::Weights;
use crate::grading::types::GradedRecord;

/// How many records received each grade, in grade-rank order.
///
/// Grades nobody received are absent rather than zero.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GradeStats {
    counts: BTreeMap<Grade, usize>,
}

impl GradeStats {
    pub fn from_records(records: &[GradedRecord]) -> Self {
        let mut counts = BTreeMap::new();
        for record in records {
            *counts.entry(record.grade).or_insert(0) += 1;
        }
        GradeStats { counts }
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Grades present in the result set, best first.
    pub fn iter(&self) -> impl Iterator<Item = (Grade, usize)> + '_ {
        self.counts.iter().map(|(grade, count)| (*grade, *count))
    }
}

/// Run-level summary written next to the report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub generated_at: DateTime<Utc>,
    pub records: usize,
    pub skipped_rows: usize,
    pub weights: Weights,
    pub mean_overall: f64,
    pub stddev_overall: f64,
    pub highest_overall: Option<f64>,
    pub lowest_overall: Option<f64>,
    pub grades: GradeStats,
}

impl ReportSummary {
    pub fn new(records: &[GradedRecord], skipped_rows: usize, weights: Weights) -> Self {
        let overalls: Vec<f64> = records.iter().map(|r| r.overall).collect();
        let (mean_overall, stddev_overall) = mean_and_stddev(&overalls);

        ReportSummary {
            generated_at: Utc::now(),
            records: records.len(),
            skipped_rows,
            weights,
            mean_overall,
            stddev_overall,
            highest_overall: overalls.iter().copied().reduce(f64::max),
            lowest_overall: overalls.iter().copied().reduce(f64::min),
            grades: GradeStats::from_records(records),
        }
    }
}

/// Arithmetic mean and population standard deviation. Both are 0.0 for empty input.
fn mean_and_stddev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    (mean, variance.sqrt())
}
