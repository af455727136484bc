//! Ordering, persistence and logging of grading results.
//!
//! Supports the CSV report, a JSON summary, and log output of the statistics.

use csv::WriterBuilder;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{GradingError, Result};
use crate::grading::types::{GradedRecord, ReportRow};
use crate::stats::{GradeStats, ReportSummary};

/// Column names of the persisted report, in order.
pub const REPORT_HEADER: [&str; 5] = ["RegNo", "Exam", "Coursework", "Overall", "Grade"];

/// Sorts records by overall score, highest first.
///
/// The sort is stable: equal scores keep their input order.
pub fn sort_by_overall(records: &mut [GradedRecord]) {
    records.sort_by(|a, b| b.overall.total_cmp(&a.overall));
}

/// Writes the report as CSV under [`REPORT_HEADER`], numbers to two decimals.
///
/// The file is rendered in memory first and written in a single call.
pub fn write_report(path: &Path, records: &[GradedRecord]) -> Result<()> {
    let sink_error = |source: std::io::Error| GradingError::SinkWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer
        .write_record(REPORT_HEADER)
        .map_err(|e| sink_error(e.into()))?;
    for record in records {
        writer
            .serialize(ReportRow::from(record))
            .map_err(|e| sink_error(e.into()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| sink_error(e.into_error()))?;

    fs::write(path, bytes).map_err(sink_error)?;
    info!(path = %path.display(), rows = records.len(), "Results written");
    Ok(())
}

/// Writes the summary as pretty-printed JSON.
pub fn write_summary(path: &Path, summary: &ReportSummary) -> Result<()> {
    let sink_error = |source: std::io::Error| GradingError::SinkWrite {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(summary).map_err(|e| sink_error(e.into()))?;
    fs::write(path, json).map_err(sink_error)?;
    debug!(path = %path.display(), "Summary written");
    Ok(())
}

/// Logs grade counts, one line per grade present.
pub fn print_stats(stats: &GradeStats) {
    info!(total = stats.total(), "Grade statistics");
    for (grade, count) in stats.iter() {
        info!(grade = %grade, count, "Grade");
    }
}

/// Logs the summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &ReportSummary) {
    debug!("{:#?}", summary);
}

/// Logs the summary as pretty-printed JSON.
pub fn print_json(summary: &ReportSummary) -> serde_json::Result<()> {
    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}
