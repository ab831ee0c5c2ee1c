//! Error types for instance loading and solver configuration.

use thiserror::Error;

/// Errors reported before the evolution starts.
///
/// Once an instance and a configuration have been accepted, the genetic
/// algorithm itself cannot fail.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("instance has no cities")]
    EmptyInstance,

    #[error("invalid configuration: {parameter} {reason}")]
    InvalidConfig {
        parameter: &'static str,
        reason: String,
    },

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SolverError {
    pub(crate) fn invalid_config(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            parameter,
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;
