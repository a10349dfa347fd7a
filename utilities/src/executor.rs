//! Collaborators that actually run things on the target system.
//!
//! Everything above this layer talks to the system only through these two
//! traits, so tests substitute scripted fakes and the process-backed
//! [`ZoauExecutor`](crate::process::ZoauExecutor) is the only type that
//! spawns anything.

use std::io;

use cics_provision_core::{ExecutionRecord, ProgramInvocation};
use serde::{Deserialize, Serialize};

/// Return code and captured output of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub rc: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResponse {
    pub fn new(rc: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            rc,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Audit record of this response under `name`.
    pub fn record(&self, name: impl Into<String>) -> ExecutionRecord {
        ExecutionRecord::new(name, self.rc, self.stdout.as_str(), self.stderr.as_str())
    }

    /// True when the command wrote nothing at all.
    pub fn is_silent(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }

    /// Case-insensitive check that `needle` was echoed on stdout.
    pub fn mentions(&self, needle: &str) -> bool {
        self.stdout.to_uppercase().contains(&needle.to_uppercase())
    }
}

/// Runs a batch program with its DD bindings.
pub trait ProgramExecutor {
    fn execute(&mut self, invocation: &ProgramInvocation) -> io::Result<CommandResponse>;
}

/// Runs a shell command line, optionally feeding `input` on stdin.
pub trait ShellRunner {
    fn run(&mut self, command: &str, input: Option<&str>) -> io::Result<CommandResponse>;
}

impl<T: ProgramExecutor + ?Sized> ProgramExecutor for &mut T {
    fn execute(&mut self, invocation: &ProgramInvocation) -> io::Result<CommandResponse> {
        (**self).execute(invocation)
    }
}

impl<T: ShellRunner + ?Sized> ShellRunner for &mut T {
    fn run(&mut self, command: &str, input: Option<&str>) -> io::Result<CommandResponse> {
        (**self).run(command, input)
    }
}
