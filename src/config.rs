//! Pipeline configuration.
//!
//! Every path and knob the pipeline uses arrives through [`PipelineConfig`].

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::grading::scorer::Weights;

/// What the loader does with a row it cannot parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedRowPolicy {
    /// Drop the row, record the reason and keep loading.
    #[default]
    Skip,
    /// Fail the whole load on the first malformed row.
    Abort,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub weights: Weights,
    pub on_malformed: MalformedRowPolicy,
    /// Where to write the JSON summary, if anywhere.
    pub summary: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            weights: Weights::default(),
            on_malformed: MalformedRowPolicy::default(),
            summary: None,
        }
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_policy(mut self, policy: MalformedRowPolicy) -> Self {
        self.on_malformed = policy;
        self
    }

    pub fn with_summary(mut self, path: impl Into<PathBuf>) -> Self {
        self.summary = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::new("in.csv", "out.csv");
        assert_eq!(config.weights, Weights::default());
        assert_eq!(config.on_malformed, MalformedRowPolicy::Skip);
        assert!(config.summary.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let weights = Weights::new(0.5, 0.5).unwrap();
        let config = PipelineConfig::new("in.csv", "out.csv")
            .with_weights(weights)
            .with_policy(MalformedRowPolicy::Abort)
            .with_summary("summary.json");

        assert_eq!(config.weights, weights);
        assert_eq!(config.on_malformed, MalformedRowPolicy::Abort);
        assert_eq!(config.summary, Some(PathBuf::from("summary.json")));
    }

    #[test]
    fn test_policy_serializes_kebab_case() {
        let json = serde_json::to_string(&MalformedRowPolicy::Abort).unwrap();
        assert_eq!(json, "\"abort\"");
    }
}
