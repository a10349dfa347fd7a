//! Process-backed collaborators using Z Open Automation Utilities.
//!
//! Programs run through `mvscmd` (or `mvscmdauth` for APF-authorized
//! programs), shell commands through `sh -c`. Every child is bounded by a
//! wall-clock timeout and its pipes are drained on background threads so a
//! chatty utility cannot fill a pipe buffer and stall.

use std::io::{self, ErrorKind, Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use cics_provision_core::{
    DataSetDefinition, DdKind, DdStatement, ProgramInvocation, SequentialAllocation, SpaceUnit,
};
use tempfile::NamedTempFile;
use tracing::debug;
use wait_timeout::ChildExt;

use crate::executor::{CommandResponse, ProgramExecutor, ShellRunner};

/// Default bound on a single command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

/// Runs programs and shell commands on the local z/OS UNIX shell.
#[derive(Debug, Clone)]
pub struct ZoauExecutor {
    timeout: Duration,
    shell: PathBuf,
}

impl Default for ZoauExecutor {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_COMMAND_TIMEOUT,
            shell: PathBuf::from("/bin/sh"),
        }
    }
}

impl ZoauExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    pub fn with_shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    fn wait(&self, mut child: Child, input: Option<String>, what: &str) -> io::Result<CommandResponse> {
        let stdin_thread = match (child.stdin.take(), input) {
            (Some(mut pipe), Some(input)) => Some(std::thread::spawn(move || {
                pipe.write_all(input.as_bytes())
            })),
            _ => None,
        };
        let stdout_thread = child.stdout.take().map(drain);
        let stderr_thread = child.stderr.take().map(drain);

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                debug!(command = what, timeout_secs = self.timeout.as_secs(), "Command timed out, killing process");
                let _ = child.kill();
                let _ = child.wait();
                return Err(io::Error::new(
                    ErrorKind::TimedOut,
                    format!("{what} did not finish within {}s", self.timeout.as_secs()),
                ));
            }
        };

        if let Some(handle) = stdin_thread {
            match handle.join() {
                Ok(Err(err)) if err.kind() != ErrorKind::BrokenPipe => return Err(err),
                _ => {}
            }
        }
        let stdout = collect(stdout_thread)?;
        let stderr = collect(stderr_thread)?;
        let rc = status.code().unwrap_or(-1);
        debug!(command = what, rc, "Command finished");
        Ok(CommandResponse::new(rc, stdout, stderr))
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(handle: Option<JoinHandle<io::Result<Vec<u8>>>>) -> io::Result<String> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    let buf = handle
        .join()
        .map_err(|_| io::Error::other("output reader thread panicked"))??;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn space_unit_suffix(unit: SpaceUnit) -> &'static str {
    match unit {
        SpaceUnit::Kilobytes => "k",
        SpaceUnit::Megabytes => "m",
        SpaceUnit::Records => "rec",
        SpaceUnit::Cylinders => "cyl",
        SpaceUnit::Tracks => "trk",
    }
}

/// Allocation keywords appended to a new data set's DD value.
fn allocation_keywords(allocation: &SequentialAllocation) -> String {
    let space = &allocation.space;
    let unit = space_unit_suffix(space.unit);
    let mut keywords = format!(
        "primary={}{unit},secondary={}{unit},type=seq,recfm={},lrecl={},blksize={}",
        space.primary,
        space.secondary,
        allocation.record_format.to_lowercase(),
        allocation.record_length,
        allocation.block_size,
    );
    match allocation.volumes.as_slice() {
        [] => {}
        [volume] => keywords.push_str(&format!(",volumes={}", volume.to_lowercase())),
        volumes => keywords.push_str(&format!(
            ",volumes=({})",
            volumes.join(",").to_lowercase()
        )),
    }
    keywords
}

/// `mvscmd` DD value for one data set.
fn data_set_argument(definition: &DataSetDefinition) -> String {
    let disposition = definition.disposition.as_str().to_lowercase();
    match &definition.allocation {
        Some(allocation) => format!(
            "{},{disposition},catalog,delete,{}",
            definition.name.to_uppercase(),
            allocation_keywords(allocation)
        ),
        None => format!("{},{disposition}", definition.name.to_uppercase()),
    }
}

/// `--ddname=value` arguments, plus the temporary files backing in-stream
/// input. The files must outlive the command.
fn dd_arguments(dds: &[DdStatement]) -> io::Result<(Vec<String>, Vec<NamedTempFile>)> {
    let mut arguments = Vec::with_capacity(dds.len());
    let mut inputs = Vec::new();
    for dd in dds {
        let value = match &dd.kind {
            DdKind::DataSet(definition) => data_set_argument(definition),
            DdKind::Concatenation(members) => members
                .iter()
                .map(|member| member.name.to_uppercase())
                .collect::<Vec<_>>()
                .join(":"),
            DdKind::Input(lines) => {
                let mut file = NamedTempFile::new()?;
                for line in lines {
                    writeln!(file, "{line}")?;
                }
                file.flush()?;
                let path = file.path().display().to_string();
                inputs.push(file);
                path
            }
            DdKind::Output => "*".to_string(),
        };
        arguments.push(format!("--{}={value}", dd.name.to_lowercase()));
    }
    Ok((arguments, inputs))
}

impl ProgramExecutor for ZoauExecutor {
    fn execute(&mut self, invocation: &ProgramInvocation) -> io::Result<CommandResponse> {
        let launcher = if invocation.authorized { "mvscmdauth" } else { "mvscmd" };
        let (arguments, _inputs) = dd_arguments(&invocation.dds)?;
        debug!(launcher, program = %invocation.program, dds = arguments.len(), "Running program");

        let mut command = Command::new(launcher);
        command.arg(format!("--pgm={}", invocation.program.to_uppercase()));
        if let Some(parm) = &invocation.parm {
            command.arg(format!("--args={parm}"));
        }
        let child = command
            .args(&arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        self.wait(child, None, &invocation.program)
    }
}

impl ShellRunner for ZoauExecutor {
    fn run(&mut self, command: &str, input: Option<&str>) -> io::Result<CommandResponse> {
        debug!(command, "Running shell command");
        let child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        self.wait(child, input.map(str::to_string), command)
    }
}
