//! Error taxonomy for a pipeline run.

use std::fmt;

use thiserror::Error;

/// A single problem found while parsing configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub field: String,
    pub reason: String,
}

impl ConfigIssue {
    pub fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Errors that abort a run. Filtered-out records are never errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {}", join_issues(.0))]
    InvalidConfiguration(Vec<ConfigIssue>),

    #[error("fetch failed for {url}: {reason}")]
    FetchFailure { url: String, reason: String },

    #[error("unexpected failure: {0}")]
    UnexpectedFailure(String),
}

impl PipelineError {
    /// Short machine-friendly name, used in the run log.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidConfiguration(_) => "invalid_configuration",
            PipelineError::FetchFailure { .. } => "fetch_failure",
            PipelineError::UnexpectedFailure(_) => "unexpected_failure",
        }
    }

    pub fn fetch(url: &str, reason: impl fmt::Display) -> Self {
        PipelineError::FetchFailure {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn unexpected(reason: impl fmt::Display) -> Self {
        PipelineError::UnexpectedFailure(reason.to_string())
    }
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, PipelineError>;
