//! Fixed-format utility output parsing.
//!
//! Mainframe utilities print for people, not programs. Each parser here
//! pulls a few facts out of that text. They are pure functions: callers run
//! the utility, then hand its output over, and turn a [`ParseError`] into a
//! [`UtilityError`](crate::UtilityError) carrying the execution log.
//!
//! Target identifiers (data set names, job names) are recognized by plain
//! substring search, since the output has no structure to anchor on.

pub mod console;
pub mod icetool;
pub mod idcams;
pub mod listds;
pub mod rmutl;
pub mod tso;
pub mod util;

use cics_provision_core::ExecutionRecord;
use thiserror::Error;

use crate::error::UtilityError;

pub use console::parse_console_errors;
pub use icetool::{icetool_reason_line, parse_record_count};
pub use idcams::{IdcamsAction, IdcamsOutcome, interpret_idcams};
pub use listds::{listds_command, parse_data_set_organization, parse_listds};
pub use rmutl::{RmutlStatus, parse_dfhrmutl, rmutl_reason_code, rmutl_status};
pub use tso::{
    JobStatusEntry, parse_job_name_for_id, parse_job_status_for_id, parse_job_status_lines,
};

/// Why a piece of output could not be turned into facts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The target never appeared in the output.
    #[error("{0}")]
    NotRecognized(String),

    /// The output reports a failure.
    #[error("{message}")]
    CommandFailed { message: String, rc: i32 },

    /// Zero or several matches where one was required.
    #[error("{0}")]
    Ambiguous(String),
}

impl ParseError {
    /// Attaches the execution log.
    pub fn into_utility_error(self, executions: Vec<ExecutionRecord>) -> UtilityError {
        match self {
            Self::NotRecognized(message) => UtilityError::not_recognized(message, executions),
            Self::CommandFailed { message, rc } => {
                UtilityError::command_failed(message, rc, executions)
            }
            Self::Ambiguous(message) => UtilityError::Ambiguous {
                message,
                executions,
            },
        }
    }
}
