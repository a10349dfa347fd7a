//! Error types for utility execution.
//!
//! Every variant raised after a command has run carries the ordered log of
//! executions up to the failure, so callers can report the full history and
//! not just the last step.

use cics_provision_core::{ExecutionRecord, ValidationError};
use thiserror::Error;

/// Errors raised while running and interpreting mainframe utilities.
#[derive(Debug, Error)]
pub enum UtilityError {
    /// The expected identifier never appeared in the command output.
    #[error("{message}")]
    OutputNotRecognized {
        message: String,
        executions: Vec<ExecutionRecord>,
    },

    /// A return code outside the success and known-failure set.
    #[error("{message}")]
    CommandFailed {
        message: String,
        rc: i32,
        executions: Vec<ExecutionRecord>,
    },

    /// Structural input error detected before anything ran.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Zero or several matches where exactly one was required.
    #[error("{message}")]
    Ambiguous {
        message: String,
        executions: Vec<ExecutionRecord>,
    },

    /// A polling deadline passed before the operation converged.
    #[error("{message}")]
    Timeout {
        message: String,
        executions: Vec<ExecutionRecord>,
    },

    /// The command could not be started at all.
    #[error("{message}")]
    Spawn {
        message: String,
        executions: Vec<ExecutionRecord>,
    },

    /// The request cannot be carried out as described.
    #[error("{message}")]
    InvalidRequest {
        message: String,
        executions: Vec<ExecutionRecord>,
    },
}

impl UtilityError {
    pub fn command_failed(message: impl Into<String>, rc: i32, executions: Vec<ExecutionRecord>) -> Self {
        Self::CommandFailed {
            message: message.into(),
            rc,
            executions,
        }
    }

    pub fn not_recognized(message: impl Into<String>, executions: Vec<ExecutionRecord>) -> Self {
        Self::OutputNotRecognized {
            message: message.into(),
            executions,
        }
    }

    pub fn invalid_request(message: impl Into<String>, executions: Vec<ExecutionRecord>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            executions,
        }
    }

    /// Executions recorded up to the failure.
    pub fn executions(&self) -> &[ExecutionRecord] {
        match self {
            Self::OutputNotRecognized { executions, .. }
            | Self::CommandFailed { executions, .. }
            | Self::Ambiguous { executions, .. }
            | Self::Timeout { executions, .. }
            | Self::Spawn { executions, .. }
            | Self::InvalidRequest { executions, .. } => executions,
            Self::Validation(_) => &[],
        }
    }

    /// Puts `earlier` in front of this error's executions.
    pub fn with_history(mut self, mut earlier: Vec<ExecutionRecord>) -> Self {
        match &mut self {
            Self::OutputNotRecognized { executions, .. }
            | Self::CommandFailed { executions, .. }
            | Self::Ambiguous { executions, .. }
            | Self::Timeout { executions, .. }
            | Self::Spawn { executions, .. }
            | Self::InvalidRequest { executions, .. } => {
                earlier.append(executions);
                *executions = earlier;
            }
            Self::Validation(_) => {}
        }
        self
    }

    /// Removes and returns the executions, leaving the error without history.
    pub fn take_executions(&mut self) -> Vec<ExecutionRecord> {
        match self {
            Self::OutputNotRecognized { executions, .. }
            | Self::CommandFailed { executions, .. }
            | Self::Ambiguous { executions, .. }
            | Self::Timeout { executions, .. }
            | Self::Spawn { executions, .. }
            | Self::InvalidRequest { executions, .. } => std::mem::take(executions),
            Self::Validation(_) => Vec::new(),
        }
    }
}

/// Convenience alias for results with [`UtilityError`].
pub type Result<T> = std::result::Result<T, UtilityError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> ExecutionRecord {
        ExecutionRecord::new(name, 0, "", "")
    }

    #[test]
    fn test_with_history_prepends() {
        let err = UtilityError::command_failed("RC 12 when creating data set", 12, vec![record("b")])
            .with_history(vec![record("a")]);
        let names: Vec<_> = err.executions().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(err.to_string(), "RC 12 when creating data set");
    }

    #[test]
    fn test_validation_has_no_history() {
        let err = UtilityError::from(ValidationError::DelimiterExhausted).with_history(vec![record("a")]);
        assert!(err.executions().is_empty());
    }
}
