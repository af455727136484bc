//! CSV loading for student marks and previously written reports.
//!
//! Input files carry a header row followed by `id,exam,coursework` rows.
//! Columns past the third are ignored, so a written report loads back as input.
//! Marks are rounded to the two decimals the report stores.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::MalformedRowPolicy;
use crate::error::{GradingError, Result, RowError};
use crate::grading::scorer::to_report_precision;
use crate::grading::types::{ReportRow, StudentRecord};

const INPUT_COLUMNS: usize = 3;

/// Records accepted by the loader and every row it turned away.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub records: Vec<StudentRecord>,
    pub rejected: Vec<RowError>,
}

impl LoadOutcome {
    /// Number of rows dropped under [`MalformedRowPolicy::Skip`].
    pub fn skipped(&self) -> usize {
        self.rejected.len()
    }
}

/// Loads student marks from a CSV file.
///
/// # Errors
///
/// Returns [`GradingError::InputNotFound`] if `path` does not exist,
/// [`GradingError::Read`] on I/O failure, and [`GradingError::Parse`] for a
/// missing header or, under [`MalformedRowPolicy::Abort`], the first bad row.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_students(path: &Path, policy: MalformedRowPolicy) -> Result<LoadOutcome> {
    let file = open(path)?;
    parse_students(file, path, policy)
}

/// Parses student marks from any reader. `origin` names the source in errors.
pub fn parse_students<R: io::Read>(
    reader: R,
    origin: &Path,
    policy: MalformedRowPolicy,
) -> Result<LoadOutcome> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let header_len = rdr
        .headers()
        .map_err(|source| GradingError::Read {
            path: origin.to_path_buf(),
            source,
        })?
        .len();
    if header_len < INPUT_COLUMNS {
        return Err(RowError::new(
            1,
            "header",
            format!("expected at least {INPUT_COLUMNS} columns, found {header_len}"),
        )
        .into());
    }

    let mut outcome = LoadOutcome::default();
    let mut seen: HashMap<String, u64> = HashMap::new();

    for result in rdr.records() {
        let row = match result {
            Ok(record) => {
                let line = record.position().map_or(0, |p| p.line());
                parse_row(&record, line, &seen).map(|student| (line, student))
            }
            Err(e) if e.is_io_error() => {
                return Err(GradingError::Read {
                    path: origin.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line());
                Err(RowError::new(line, "row", e.to_string()))
            }
        };

        match row {
            Ok((line, student)) => {
                seen.insert(student.id.clone(), line);
                outcome.records.push(student);
            }
            Err(err) => match policy {
                MalformedRowPolicy::Abort => return Err(err.into()),
                MalformedRowPolicy::Skip => {
                    warn!(line = err.line, field = err.field, reason = %err.reason, "Skipping malformed row");
                    outcome.rejected.push(err);
                }
            },
        }
    }

    debug!(
        records = outcome.records.len(),
        skipped = outcome.skipped(),
        "Student marks parsed"
    );
    Ok(outcome)
}

/// Loads a report written by [`crate::output::write_report`], including its derived columns.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_report(path: &Path) -> Result<Vec<ReportRow>> {
    let file = open(path)?;
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(file);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: ReportRow = result.map_err(|e| {
            if e.is_io_error() {
                GradingError::Read {
                    path: path.to_path_buf(),
                    source: e,
                }
            } else {
                let line = e.position().map_or(0, |p| p.line());
                RowError::new(line, "report row", e.to_string()).into()
            }
        })?;
        rows.push(row);
    }

    Ok(rows)
}

fn open(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(GradingError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    File::open(path).map_err(|e| GradingError::Read {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn parse_row(
    record: &StringRecord,
    line: u64,
    seen: &HashMap<String, u64>,
) -> std::result::Result<StudentRecord, RowError> {
    let field = |index: usize, name: &'static str| {
        record
            .get(index)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| RowError::new(line, name, "missing value"))
    };

    let id = field(0, "id")?;
    if id.contains([',', '"', '\n', '\r']) {
        return Err(RowError::new(
            line,
            "id",
            format!("`{id}` contains a delimiter, quote or line break"),
        ));
    }
    if let Some(first) = seen.get(id) {
        return Err(RowError::new(
            line,
            "id",
            format!("duplicate id `{id}`, first seen on line {first}"),
        ));
    }

    let exam = parse_score(field(1, "exam")?, line, "exam")?;
    let coursework = parse_score(field(2, "coursework")?, line, "coursework")?;

    Ok(StudentRecord {
        id: id.to_string(),
        exam,
        coursework,
    })
}

fn parse_score(raw: &str, line: u64, field: &'static str) -> std::result::Result<f64, RowError> {
    let value: f64 = raw
        .parse()
        .map_err(|_| RowError::new(line, field, format!("`{raw}` is not a number")))?;
    let value = to_report_precision(value);
    if !value.is_finite() {
        return Err(RowError::new(line, field, format!("`{raw}` is not finite")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &str, policy: MalformedRowPolicy) -> Result<LoadOutcome> {
        parse_students(data.as_bytes(), Path::new("inline.csv"), policy)
    }

    #[test]
    fn test_parse_valid_rows() {
        let outcome = parse(
            "reg_no,exam,coursework\nS1,90,85.5\nS2, 40 ,60\n",
            MalformedRowPolicy::Skip,
        )
        .unwrap();

        assert_eq!(outcome.skipped(), 0);
        assert_eq!(
            outcome.records,
            vec![
                StudentRecord {
                    id: "S1".to_string(),
                    exam: 90.0,
                    coursework: 85.5
                },
                StudentRecord {
                    id: "S2".to_string(),
                    exam: 40.0,
                    coursework: 60.0
                },
            ]
        );
    }

    #[test]
    fn test_skip_policy_drops_non_numeric_row() {
        let outcome = parse(
            "reg_no,exam,coursework\nS1,70,70\nS2,60,abc\nS3,50,50\n",
            MalformedRowPolicy::Skip,
        )
        .unwrap();

        let ids: Vec<_> = outcome.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["S1", "S3"]);
        assert_eq!(outcome.skipped(), 1);
        assert_eq!(outcome.rejected[0].line, 3);
        assert_eq!(outcome.rejected[0].field, "coursework");
    }

    #[test]
    fn test_abort_policy_fails_whole_load() {
        let err = parse(
            "reg_no,exam,coursework\nS1,70,70\nS2,60,abc\n",
            MalformedRowPolicy::Abort,
        )
        .unwrap_err();

        match err {
            GradingError::Parse(row) => {
                assert_eq!(row.line, 3);
                assert_eq!(row.field, "coursework");
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let outcome = parse(
            "reg_no,exam,coursework\nS1,70\nS2,60,\n",
            MalformedRowPolicy::Skip,
        )
        .unwrap();

        assert!(outcome.records.is_empty());
        assert_eq!(outcome.skipped(), 2);
        assert!(outcome.rejected.iter().all(|e| e.field == "coursework"));
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let outcome = parse(
            "reg_no,exam,coursework\nS1,70,70\nS1,10,10\n",
            MalformedRowPolicy::Skip,
        )
        .unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].exam, 70.0);
        assert_eq!(outcome.rejected[0].field, "id");
        assert!(outcome.rejected[0].reason.contains("line 2"));
    }

    #[test]
    fn test_non_finite_and_embedded_delimiter_rejected() {
        let outcome = parse(
            "reg_no,exam,coursework\nS1,NaN,70\n\"S,2\",50,50\nS3,inf,1\n",
            MalformedRowPolicy::Skip,
        )
        .unwrap();

        assert!(outcome.records.is_empty());
        let fields: Vec<_> = outcome.rejected.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["exam", "id", "exam"]);
    }

    #[test]
    fn test_blank_lines_quotes_and_bad_utf8() {
        let data: &[u8] = b"reg_no,exam,coursework\n\
            S1,70,70\n\
            \n\
            \"a\"\"b\",50,50\n\
            \"x\ny\",40,40\n\
            S\xff2,30,30\n\
            S3,60,60\n";
        let outcome =
            parse_students(data, Path::new("inline.csv"), MalformedRowPolicy::Skip).unwrap();

        let ids: Vec<_> = outcome.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["S1", "S3"]);
        assert_eq!(outcome.skipped(), 3);
        let fields: Vec<_> = outcome.rejected.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["id", "id", "row"]);
    }

    #[test]
    fn test_marks_are_rounded_to_two_decimals() {
        let outcome = parse(
            "reg_no,exam,coursework\nS1,89.996,79.994\n",
            MalformedRowPolicy::Abort,
        )
        .unwrap();
        assert_eq!(outcome.records[0].exam, 90.0);
        assert_eq!(outcome.records[0].coursework, 79.99);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let outcome = parse(
            "RegNo,Exam,Coursework,Overall,Grade\nS1,90.00,90.00,90.00,A+\n",
            MalformedRowPolicy::Abort,
        )
        .unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].coursework, 90.0);
    }

    #[test]
    fn test_short_header_is_an_error() {
        let err = parse("reg_no,exam\nS1,1\n", MalformedRowPolicy::Skip).unwrap_err();
        assert!(matches!(err, GradingError::Parse(RowError { field: "header", .. })));

        let err = parse("", MalformedRowPolicy::Skip).unwrap_err();
        assert!(matches!(err, GradingError::Parse(RowError { line: 1, .. })));
    }

    #[test]
    fn test_load_students_missing_file() {
        let err = load_students(
            Path::new("definitely/not/here.csv"),
            MalformedRowPolicy::Skip,
        )
        .unwrap_err();
        assert!(matches!(err, GradingError::InputNotFound { .. }));
    }
}
