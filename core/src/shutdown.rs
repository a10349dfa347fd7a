//! Region shutdown and status command text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// How a running region is brought down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StopMode {
    #[default]
    Normal,
    Immediate,
    /// Cancel the job instead of asking CICS to shut down.
    Cancel,
}

impl StopMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Immediate => "immediate",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for StopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shutdown transaction selection.
///
/// A named transaction and `NOSDTRAN` exclude each other, so both cannot be
/// requested at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownTransaction {
    /// Let CICS run its configured shutdown transaction.
    #[default]
    Default,
    Named(String),
    /// `NOSDTRAN`: run no shutdown transaction.
    Suppressed,
}

impl ShutdownTransaction {
    /// Validates a transaction id of 1 to 4 characters.
    ///
    /// ```
    /// use cics_provision_core::ShutdownTransaction;
    ///
    /// assert!(ShutdownTransaction::named("DEFG").is_ok());
    /// assert!(ShutdownTransaction::named("TOOLONG").is_err());
    /// ```
    pub fn named(transaction: &str) -> Result<Self, ValidationError> {
        validate_sdtran(transaction)?;
        Ok(Self::Named(transaction.to_string()))
    }

    fn suffix(&self) -> Option<String> {
        match self {
            Self::Default => None,
            Self::Named(transaction) => Some(format!(" SDTRAN({})", transaction.to_uppercase())),
            Self::Suppressed => Some(" NOSDTRAN".to_string()),
        }
    }
}

pub fn validate_sdtran(transaction: &str) -> Result<(), ValidationError> {
    let length = transaction.chars().count();
    if length == 0 || length > 4 {
        return Err(ValidationError::InvalidSdtran(transaction.to_string()));
    }
    Ok(())
}

/// Builds the operator command that asks a region to shut down.
///
/// `Cancel` mode has no console form; it is rendered as a normal shutdown
/// and callers use [`format_cancel_command`] instead.
///
/// ```
/// use cics_provision_core::*;
///
/// assert_eq!(
///     format_shutdown_command("LINKJOB", StopMode::Immediate, &ShutdownTransaction::Default).unwrap(),
///     "MODIFY LINKJOB,CEMT PERFORM SHUTDOWN IMMEDIATE"
/// );
/// ```
pub fn format_shutdown_command(
    job_name: &str,
    mode: StopMode,
    transaction: &ShutdownTransaction,
) -> Result<String, ValidationError> {
    if let ShutdownTransaction::Named(name) = transaction {
        validate_sdtran(name)?;
    }
    let mut command = format!("MODIFY {job_name},CEMT PERFORM SHUTDOWN");
    if mode == StopMode::Immediate {
        command.push_str(" IMMEDIATE");
    }
    if let Some(suffix) = transaction.suffix() {
        command.push_str(&suffix);
    }
    Ok(command)
}

/// Shell command cancelling a job.
pub fn format_cancel_command(job_name: &str, job_id: &str) -> String {
    format!("jcan C {job_name} {job_id}")
}

/// TSO `STATUS` for every job with a name.
pub fn tso_status_command(job_name: &str) -> String {
    format!("STATUS {job_name}")
}

/// TSO `STATUS` for one job.
pub fn tso_status_id_command(job_name: &str, job_id: &str) -> String {
    format!("STATUS {job_name}({job_id})")
}
