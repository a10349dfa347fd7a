//! Stopping a running CICS region.
//!
//! The region's job is located with TSO `STATUS` (or, given only a job id,
//! the ZOAU `jls` listing), asked to shut down through
//! an operator `MODIFY` (or cancelled outright), then polled until it is no
//! longer executing or the deadline passes.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use cics_provision_core::{
    ExecutionRecord, ShutdownTransaction, StopMode, ValidationError, format_cancel_command,
    format_shutdown_command, tso_status_command, tso_status_id_command, validate_name,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, UtilityError};
use crate::executor::{CommandResponse, ShellRunner};
use crate::parser::tso::EXECUTING;
use crate::parser::{
    parse_console_errors, parse_job_name_for_id, parse_job_status_for_id, parse_job_status_lines,
};

/// Time between status checks while waiting for shutdown.
pub const POLL_INTERVAL: Duration = Duration::from_secs(15);

const JOB_LISTING_COMMAND: &str = "jls";

/// Source of wall-clock time and sleeping.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
    fn sleep(&mut self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Which region to stop and how. At least one of `job_name` and `job_id`
/// must be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopRequest {
    #[serde(default)]
    pub job_name: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub mode: StopMode,
    #[serde(default)]
    pub transaction: ShutdownTransaction,
    /// Seconds to wait for the job to end. Zero or less waits forever.
    #[serde(default = "default_timeout")]
    pub timeout: i64,
}

fn default_timeout() -> i64 {
    -1
}

impl StopRequest {
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: Some(job_name.into().to_uppercase()),
            ..Self::unidentified()
        }
    }

    /// A request for the job with this id, whatever its name.
    pub fn by_id(job_id: impl Into<String>) -> Self {
        Self::unidentified().with_job_id(job_id)
    }

    fn unidentified() -> Self {
        Self {
            job_name: None,
            job_id: None,
            mode: StopMode::default(),
            transaction: ShutdownTransaction::default(),
            timeout: default_timeout(),
        }
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into().to_uppercase());
        self
    }

    pub fn with_mode(mut self, mode: StopMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_transaction(mut self, transaction: ShutdownTransaction) -> Self {
        self.transaction = transaction;
        self
    }

    pub fn with_timeout(mut self, seconds: i64) -> Self {
        self.timeout = seconds;
        self
    }

    fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.job_name.is_none() && self.job_id.is_none() {
            return Err(ValidationError::MissingJobIdentity);
        }
        if let Some(job_name) = &self.job_name {
            validate_name(job_name)?;
        }
        if let Some(job_id) = &self.job_id {
            validate_name(job_id)?;
        }
        if let ShutdownTransaction::Named(transaction) = &self.transaction {
            cics_provision_core::validate_sdtran(transaction)?;
        }
        Ok(())
    }
}

/// What happened to the region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopReport {
    pub changed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub executions: Vec<ExecutionRecord>,
    pub msg: String,
}

/// Stops the region described by `request`.
///
/// A job that is not executing is left alone and reported unchanged.
pub fn stop_region<R: ShellRunner, C: Clock>(
    runner: &mut R,
    clock: &mut C,
    request: &StopRequest,
) -> Result<StopReport> {
    request.validate()?;
    let mut stopper = Stopper {
        runner,
        clock,
        request,
        job_name: request.job_name.clone().unwrap_or_default(),
        executions: Vec::new(),
    };
    stopper.run()
}

struct Stopper<'a, R, C> {
    runner: &'a mut R,
    clock: &'a mut C,
    request: &'a StopRequest,
    /// Known from the request, or looked up from the job id.
    job_name: String,
    executions: Vec<ExecutionRecord>,
}

impl<R: ShellRunner, C: Clock> Stopper<'_, R, C> {
    fn run(&mut self) -> Result<StopReport> {
        let request = self.request;
        if let (None, Some(job_id)) = (&request.job_name, &request.job_id) {
            self.job_name = self.job_name_for_id(job_id)?;
        }
        let job_name = self.job_name.clone();

        let (job_id, status) = match &request.job_id {
            Some(job_id) => {
                let status = self.status_by_id(job_id)?;
                (job_id.clone(), status)
            }
            None => match self.running_job()? {
                Some(found) => found,
                None => {
                    debug!(job_name = %job_name, "No executing job to stop");
                    return Ok(self.report(false, None));
                }
            },
        };

        if status != EXECUTING {
            debug!(job_name = %job_name, job_id = %job_id, status = %status, "Job is not executing");
            return Ok(self.report(false, Some(job_id)));
        }

        info!(job_name = %job_name, job_id = %job_id, mode = %request.mode, "CICS is running, attempting to stop CICS.");
        match request.mode {
            StopMode::Cancel => self.cancel(&job_id)?,
            StopMode::Normal | StopMode::Immediate => self.shutdown()?,
        }
        self.wait_for_shutdown(&job_id)?;
        info!(job_name = %job_name, job_id = %job_id, "CICS has been shutdown.");
        Ok(self.report(true, Some(job_id)))
    }

    fn report(&mut self, changed: bool, job_id: Option<String>) -> StopReport {
        StopReport {
            changed,
            job_name: Some(self.job_name.clone()).filter(|name| !name.is_empty()),
            job_id,
            executions: std::mem::take(&mut self.executions),
            msg: String::new(),
        }
    }

    fn shell(&mut self, command: &str, input: Option<&str>) -> Result<CommandResponse> {
        self.runner.run(command, input).map_err(|err| UtilityError::Spawn {
            message: format!("Failed to run {command}: {err}"),
            executions: std::mem::take(&mut self.executions),
        })
    }

    fn tso(&mut self, command: &str) -> Result<CommandResponse> {
        self.shell(&format!("tsocmd '{command}'"), None)
    }

    fn status_record(&self, job: &str, response: &CommandResponse) -> ExecutionRecord {
        response.record(format!("Checking status of job {job}"))
    }

    /// The name of the job with this id, from the job listing.
    fn job_name_for_id(&mut self, job_id: &str) -> Result<String> {
        let response = self.shell(JOB_LISTING_COMMAND, None)?;
        self.executions
            .push(response.record(format!("Get job name and status for job ID {job_id}")));
        if response.rc != 0 {
            return Err(UtilityError::command_failed(
                "Failure getting job name and status from ID",
                response.rc,
                std::mem::take(&mut self.executions),
            ));
        }
        let job_name = parse_job_name_for_id(&response.stdout, job_id)
            .map_err(|err| err.into_utility_error(std::mem::take(&mut self.executions)))?;
        debug!(job_id, job_name = %job_name, "Found job name for job id");
        Ok(job_name)
    }

    fn status_by_id(&mut self, job_id: &str) -> Result<String> {
        let job_name = self.job_name.clone();
        let response = self.tso(&tso_status_id_command(&job_name, job_id))?;
        let record = self.status_record(&format!("{job_name}({job_id})"), &response);
        self.executions.push(record);
        parse_job_status_for_id(&response.stdout, &job_name, job_id)
            .map_err(|err| err.into_utility_error(std::mem::take(&mut self.executions)))
    }

    /// The single executing job with the requested name, if any.
    fn running_job(&mut self) -> Result<Option<(String, String)>> {
        let job_name = self.job_name.clone();
        let response = self.tso(&tso_status_command(&job_name))?;
        let record = self.status_record(&job_name, &response);
        self.executions.push(record);

        let jobs = parse_job_status_lines(&response.stdout, &job_name);
        if jobs.is_empty() {
            return Err(UtilityError::Ambiguous {
                message: format!("Job with name {job_name} not found"),
                executions: std::mem::take(&mut self.executions),
            });
        }
        let mut running: Vec<_> = jobs.into_iter().filter(|job| job.is_executing()).collect();
        match running.len() {
            0 => Ok(None),
            1 => {
                let job = running.remove(0);
                Ok(Some((job.job_id, job.status)))
            }
            _ => Err(UtilityError::Ambiguous {
                message: format!(
                    "Cannot disambiguate between multiple running jobs with the same name ({job_name}). Use `job_id` as a parameter to specify the correct job."
                ),
                executions: std::mem::take(&mut self.executions),
            }),
        }
    }

    fn cancel(&mut self, job_id: &str) -> Result<()> {
        let job_name = self.job_name.clone();
        let response = self.shell(&format_cancel_command(&job_name, job_id), None)?;
        self.executions
            .push(response.record(format!("Cancel command - {job_name}({job_id})")));
        if response.rc != 0 {
            return Err(UtilityError::command_failed(
                "Error running job cancel command",
                response.rc,
                std::mem::take(&mut self.executions),
            ));
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        let request = self.request;
        let command = format_shutdown_command(&self.job_name, request.mode, &request.transaction)?;
        let response = self.shell(&format!("opercmd \"{command}\""), None)?;
        self.executions
            .push(response.record(format!("ZOS Operator Command - {command}")));
        parse_console_errors(&response.stdout, response.rc)
            .map_err(|err| err.into_utility_error(std::mem::take(&mut self.executions)))
    }

    /// Polls until the job stops executing. Each poll replaces the previous
    /// poll's execution record.
    fn wait_for_shutdown(&mut self, job_id: &str) -> Result<()> {
        let request = self.request;
        let job_name = self.job_name.clone();
        let deadline = match request.timeout {
            seconds if seconds > 0 => TimeDelta::try_seconds(seconds)
                .and_then(|timeout| self.clock.now().checked_add_signed(timeout)),
            _ => None,
        };

        let first_poll = self.executions.len();
        let mut status = EXECUTING.to_string();
        while status == EXECUTING && deadline.is_none_or(|deadline| self.clock.now() < deadline) {
            debug!(job_name = %job_name, job_id, "CICS is still active... waiting for successful shutdown.");
            self.clock.sleep(POLL_INTERVAL);

            let response = self.tso(&tso_status_id_command(&job_name, job_id))?;
            let record = self.status_record(job_id, &response);
            self.executions.truncate(first_poll);
            self.executions.push(record);
            status = parse_job_status_for_id(&response.stdout, &job_name, job_id)
                .map_err(|err| err.into_utility_error(std::mem::take(&mut self.executions)))?;
        }

        if status == EXECUTING {
            return Err(UtilityError::Timeout {
                message: "Timeout reached before region successfully stopped".to_string(),
                executions: std::mem::take(&mut self.executions),
            });
        }
        Ok(())
    }
}
