//! CLI entry point for the student grader.
//!
//! Provides subcommands for grading a marks file into a sorted report and for
//! checking a previously written report against its own marks.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use student_grader::{
    config::{MalformedRowPolicy, PipelineConfig},
    grading::scorer::Weights,
    output::{print_json, print_pretty, print_stats},
    pipeline::{run, verify_report},
};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "student_grader")]
#[command(about = "Grade student marks and report grade statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct WeightArgs {
    /// Weight of the exam score in the overall score
    #[arg(long, env = "GRADER_EXAM_WEIGHT", default_value_t = 0.6)]
    exam_weight: f64,

    /// Weight of the coursework score in the overall score
    #[arg(long, env = "GRADER_COURSEWORK_WEIGHT", default_value_t = 0.4)]
    coursework_weight: f64,
}

impl WeightArgs {
    fn weights(&self) -> Result<Weights> {
        Ok(Weights::new(self.exam_weight, self.coursework_weight)?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a CSV of marks and write the sorted report
    Grade {
        /// CSV file with a header and reg_no,exam,coursework columns
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// CSV file to write the report to
        #[arg(short, long, default_value = "student_results.csv")]
        output: PathBuf,

        #[command(flatten)]
        weights: WeightArgs,

        /// What to do with rows that cannot be parsed
        #[arg(long, value_enum, default_value_t = MalformedRowPolicy::Skip)]
        on_malformed: MalformedRowPolicy,

        /// Optional: JSON file to write a run summary to
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// Recompute the grades in a written report and flag disagreements
    Verify {
        /// Report previously written by `grade`
        #[arg(value_name = "REPORT")]
        report: PathBuf,

        #[command(flatten)]
        weights: WeightArgs,
    },
}

/// Directory and file name for the rolling log. A bare file name logs into the working directory.
fn split_log_path(path: &Path) -> (&Path, &OsStr) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .unwrap_or(OsStr::new("student_grader.log"));
    (dir, file_name)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/student_grader.log".to_string());
    let (log_dir, log_file_name) = split_log_path(Path::new(&log_file_path));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Grade {
            input,
            output,
            weights,
            on_malformed,
            summary,
        } => {
            let mut config = PipelineConfig::new(input, output)
                .with_weights(weights.weights()?)
                .with_policy(on_malformed);
            if let Some(path) = summary {
                config = config.with_summary(path);
            }

            let report = run(&config).with_context(|| {
                format!("grading {} failed", config.input.display())
            })?;

            print_stats(&report.stats);
            print_pretty(&report.summary);
            print_json(&report.summary)?;
            info!(
                output = %config.output.display(),
                records = report.records.len(),
                skipped = report.rejected.len(),
                "Grading complete"
            );
        }
        Commands::Verify { report, weights } => {
            let verification = verify_report(&report, &weights.weights()?)
                .with_context(|| format!("verifying {} failed", report.display()))?;

            if !verification.is_consistent() {
                for mismatch in &verification.mismatches {
                    error!(
                        id = %mismatch.id,
                        recorded = %mismatch.recorded,
                        recomputed = %mismatch.recomputed,
                        "Stored grade does not match marks"
                    );
                }
                bail!(
                    "{} of {} grades in {} do not match their marks",
                    verification.mismatches.len(),
                    verification.checked,
                    report.display()
                );
            }
            info!(checked = verification.checked, "All grades consistent");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_log_path() {
        assert_eq!(
            split_log_path(Path::new("logs/student_grader.log")),
            (Path::new("logs"), OsStr::new("student_grader.log"))
        );
        assert_eq!(
            split_log_path(Path::new("grader.log")),
            (Path::new("."), OsStr::new("grader.log"))
        );
        assert_eq!(
            split_log_path(Path::new("/")),
            (Path::new("."), OsStr::new("student_grader.log"))
        );
    }
}
