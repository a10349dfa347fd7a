//! Console responses to operator commands sent to a region.

use std::sync::LazyLock;

use regex::Regex;

use super::ParseError;
use super::util::squash;

static AUTOINSTALL_FAILED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"CICSAUTOINSTALLFORCONSOLE[A-Z]{4}\d{4}HASFAILED")
        .expect("static regex must compile")
});
static CONSOLE_NOT_DEFINED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"CONSOLE[A-Z]{4}\d{4}HASNOTBEENDEFINEDTOCICS.INPUTISIGNORED")
        .expect("static regex must compile")
});

/// Fails when CICS rejected the console that issued a command.
pub fn parse_console_errors(stdout: &str, rc: i32) -> Result<(), ParseError> {
    let squashed = squash(stdout);
    if AUTOINSTALL_FAILED_RE.is_match(&squashed) {
        return Err(ParseError::CommandFailed {
            message: "Shutdown command failed because the auto-install of the console was unsuccessful. See executions for full command output.".to_string(),
            rc,
        });
    }
    if CONSOLE_NOT_DEFINED_RE.is_match(&squashed) {
        return Err(ParseError::CommandFailed {
            message: "Shutdown command failed because the console used was not defined. See executions for full command output.".to_string(),
            rc,
        });
    }
    Ok(())
}
