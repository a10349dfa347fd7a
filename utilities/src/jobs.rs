//! Job submission and JCL data set updates through the z/OS UNIX shell.

use std::io::Write;

use cics_provision_core::validate_data_set_name;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Result, UtilityError};
use crate::executor::{CommandResponse, ShellRunner};
use crate::programs::Executed;

fn run<R: ShellRunner>(runner: &mut R, name: &str, command: &str, input: Option<&str>) -> Result<CommandResponse> {
    runner.run(command, input).map_err(|err| UtilityError::Spawn {
        message: format!("Failed to run {name}: {err}"),
        executions: Vec::new(),
    })
}

/// Submits `jcl` with `jsub` and returns the job id it printed.
pub fn submit_jcl<R: ShellRunner>(runner: &mut R, jcl: &str) -> Result<Executed<String>> {
    const NAME: &str = "z/OS Job Submit - Submit CICS Startup JCL";
    let response = run(runner, NAME, "jsub", Some(jcl))?;
    let executions = vec![response.record(NAME)];
    if response.rc != 0 {
        return Err(UtilityError::command_failed(
            format!("RC {} when submitting JCL", response.rc),
            response.rc,
            executions,
        ));
    }

    let job_id = response.stdout.trim().to_string();
    if job_id.is_empty() {
        return Err(UtilityError::not_recognized(
            "Job submission output not recognised",
            executions,
        ));
    }
    info!(job_id = %job_id, "Submitted job");
    Ok(Executed::new(job_id, executions))
}

/// Replaces the contents of `dsn` with `jcl`.
pub fn write_jcl_to_data_set<R: ShellRunner>(runner: &mut R, jcl: &str, dsn: &str) -> Result<Executed<()>> {
    const NAME: &str = "Copy JCL contents to data set";
    validate_data_set_name(dsn)?;

    let mut file = NamedTempFile::new().map_err(|err| temp_file_error(&err))?;
    file.write_all(jcl.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|err| temp_file_error(&err))?;

    let command = format!("cp -O u {} \"//'{}'\"", file.path().display(), dsn.to_uppercase());
    let response = run(runner, NAME, &command, None)?;
    let executions = vec![response.record(NAME)];
    if response.rc != 0 {
        return Err(UtilityError::command_failed(
            "Failed to copy JCL content to data set",
            response.rc,
            executions,
        ));
    }
    debug!(dsn, "Wrote JCL to data set");
    Ok(Executed::new((), executions))
}

fn temp_file_error(err: &std::io::Error) -> UtilityError {
    UtilityError::Spawn {
        message: format!("Failed to write JCL to a temporary file: {err}"),
        executions: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    struct Recorder {
        response: CommandResponse,
        commands: Vec<(String, Option<String>)>,
    }

    impl Recorder {
        fn new(response: CommandResponse) -> Self {
            Self {
                response,
                commands: Vec::new(),
            }
        }
    }

    impl ShellRunner for Recorder {
        fn run(&mut self, command: &str, input: Option<&str>) -> io::Result<CommandResponse> {
            self.commands.push((command.to_string(), input.map(str::to_string)));
            Ok(self.response.clone())
        }
    }

    #[test]
    fn test_submit_returns_job_id() {
        let mut runner = Recorder::new(CommandResponse::new(0, "JOB01234\n", ""));
        let result = submit_jcl(&mut runner, "//CICSJOB JOB\n//").unwrap();
        assert_eq!(result.value, "JOB01234");
        assert_eq!(result.executions[0].name, "z/OS Job Submit - Submit CICS Startup JCL");
        assert_eq!(
            runner.commands[0],
            ("jsub".to_string(), Some("//CICSJOB JOB\n//".to_string()))
        );
    }

    #[test]
    fn test_submit_without_job_id() {
        let mut runner = Recorder::new(CommandResponse::new(0, "  \n", ""));
        let err = submit_jcl(&mut runner, "//").unwrap_err();
        assert!(matches!(err, UtilityError::OutputNotRecognized { .. }));
    }

    #[test]
    fn test_write_jcl_copies_temp_file() {
        let mut runner = Recorder::new(CommandResponse::new(0, "", ""));
        write_jcl_to_data_set(&mut runner, "//JOB", "cics.jcl(start)").unwrap();
        let (command, input) = &runner.commands[0];
        assert!(command.starts_with("cp -O u "));
        assert!(command.ends_with("\"//'CICS.JCL(START)'\""));
        assert_eq!(input, &None);
    }

    #[test]
    fn test_write_jcl_rejects_quoted_name() {
        let mut runner = Recorder::new(CommandResponse::new(0, "", ""));
        let err = write_jcl_to_data_set(&mut runner, "//JOB", "CICS.JCL(A'B)").unwrap_err();
        assert!(matches!(err, UtilityError::Validation(_)));
        assert!(runner.commands.is_empty());
    }
}
