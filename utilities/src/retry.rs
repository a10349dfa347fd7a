//! Bounded retry for commands whose output can lag behind their effect.
//!
//! Utilities such as IDCAMS and LISTDS occasionally return before their
//! output reflects the target. The runner repeats the command until a
//! recognition predicate accepts the response or the attempt bound is hit,
//! recording every attempt.
//!
//! ```
//! use cics_provision_utilities::{CommandResponse, RetryOutcome, RetryPolicy, run_with_retry};
//!
//! let mut calls = 0;
//! let run = run_with_retry(
//!     RetryPolicy::default(),
//!     |attempt| format!("LISTDS - Run {attempt}"),
//!     || {
//!         calls += 1;
//!         let stdout = if calls < 3 { "" } else { "CICS.GCD" };
//!         Ok(CommandResponse::new(0, stdout, ""))
//!     },
//!     |response| response.mentions("CICS.GCD"),
//! )
//! .unwrap();
//! assert!(matches!(run.outcome, RetryOutcome::Recognized(_)));
//! assert_eq!(run.executions.len(), 3);
//! ```

use std::io;

use cics_provision_core::ExecutionRecord;
use tracing::{debug, warn};

use crate::error::{Result, UtilityError};
use crate::executor::CommandResponse;

/// Attempts made before giving up on a command's output.
pub const MVS_CMD_RETRY_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MVS_CMD_RETRY_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// A policy that runs the command exactly once.
    pub fn once() -> Self {
        Self { max_attempts: 1 }
    }
}

/// Where the retry loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// About to make attempt `n`, counting from 1.
    Attempting(u32),
    Recognized,
    Exhausted,
}

/// How the loop ended, with the final response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome {
    Recognized(CommandResponse),
    Exhausted(CommandResponse),
}

impl RetryOutcome {
    pub fn response(&self) -> &CommandResponse {
        match self {
            Self::Recognized(response) | Self::Exhausted(response) => response,
        }
    }

    pub fn into_response(self) -> CommandResponse {
        match self {
            Self::Recognized(response) | Self::Exhausted(response) => response,
        }
    }
}

/// A finished retry loop and its execution log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryRun {
    pub outcome: RetryOutcome,
    pub executions: Vec<ExecutionRecord>,
}

impl RetryRun {
    /// The recognized response, or [`UtilityError::OutputNotRecognized`]
    /// carrying every attempt.
    pub fn recognized(self, message: &str) -> Result<(CommandResponse, Vec<ExecutionRecord>)> {
        match self.outcome {
            RetryOutcome::Recognized(response) => Ok((response, self.executions)),
            RetryOutcome::Exhausted(_) => Err(UtilityError::not_recognized(message, self.executions)),
        }
    }
}

/// Runs `execute` until `recognized` accepts a response.
///
/// `label` names each attempt's execution record from its 1-based attempt
/// number. A policy of zero attempts is treated as one. If `execute` itself
/// fails the loop stops with [`UtilityError::Spawn`].
pub fn run_with_retry<L, E, P>(
    policy: RetryPolicy,
    label: L,
    mut execute: E,
    recognized: P,
) -> Result<RetryRun>
where
    L: Fn(u32) -> String,
    E: FnMut() -> io::Result<CommandResponse>,
    P: Fn(&CommandResponse) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut executions = Vec::new();
    let mut state = RetryState::Attempting(1);
    let mut last: Option<CommandResponse> = None;

    loop {
        match state {
            RetryState::Attempting(attempt) => {
                let name = label(attempt);
                let response = match execute() {
                    Ok(response) => response,
                    Err(err) => {
                        warn!(execution = %name, error = %err, "Failed to run command");
                        return Err(UtilityError::Spawn {
                            message: format!("Failed to run {name}: {err}"),
                            executions,
                        });
                    }
                };
                debug!(execution = %name, attempt, rc = response.rc, "Command attempt finished");
                executions.push(response.record(name));

                state = if recognized(&response) {
                    RetryState::Recognized
                } else if attempt >= max_attempts {
                    RetryState::Exhausted
                } else {
                    RetryState::Attempting(attempt + 1)
                };
                last = Some(response);
            }
            RetryState::Recognized => {
                return Ok(RetryRun {
                    outcome: RetryOutcome::Recognized(last.take().unwrap_or_default()),
                    executions,
                });
            }
            RetryState::Exhausted => {
                warn!(attempts = max_attempts, "Command output not recognized after all attempts");
                return Ok(RetryRun {
                    outcome: RetryOutcome::Exhausted(last.take().unwrap_or_default()),
                    executions,
                });
            }
        }
    }
}
