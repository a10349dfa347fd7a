//! DFHRMUTL report output.

use cics_provision_core::{AutoStartOverride, CatalogAutoStartState, NextStartType};

use super::ParseError;
use super::util::{reason_code, squashed_lines};

const AUTOSTART_LABEL: &str = "AUTO-STARTOVERRIDE:";
const NEXT_START_LABEL: &str = "NEXTSTARTTYPE:";

/// Reason code DFHRMUTL reports when the catalog is briefly in use.
pub const TRANSIENT_REASON_CODE: &str = "A8";

/// What a DFHRMUTL return code means for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RmutlStatus {
    Success,
    /// RC 16 with reason A8: run the job again.
    Transient,
    Failed(ParseError),
}

/// Auto-start override and next start type from a DFHRMUTL report.
///
/// A label that is missing, or printed more than once, leaves its value
/// unset.
///
/// ```
/// use cics_provision_core::{AutoStartOverride, NextStartType};
/// use cics_provision_utilities::parser::parse_dfhrmutl;
///
/// let stdout = "Recovery manager auto-start override   : AUTOASIS\n\
///               Recovery manager next start type       : WARM\n";
/// let state = parse_dfhrmutl(stdout);
/// assert_eq!(state.autostart_override, Some(AutoStartOverride::AutoAsis));
/// assert_eq!(state.next_start, Some(NextStartType::Warm));
/// ```
pub fn parse_dfhrmutl(stdout: &str) -> CatalogAutoStartState {
    let lines = squashed_lines(stdout);
    CatalogAutoStartState {
        autostart_override: labelled_value(&lines, AUTOSTART_LABEL)
            .and_then(|value| AutoStartOverride::parse(&value)),
        next_start: labelled_value(&lines, NEXT_START_LABEL)
            .and_then(|value| NextStartType::parse(&value)),
    }
}

fn labelled_value(lines: &[String], label: &str) -> Option<String> {
    let matching: Vec<&String> = lines.iter().filter(|line| line.contains(label)).collect();
    match matching.as_slice() {
        [line] => line.split(':').nth(1).map(str::to_string),
        _ => None,
    }
}

/// The squashed line carrying `REASON:X'..'` and its reason code.
pub fn rmutl_reason_code(stdout: &str) -> Option<(String, Option<String>)> {
    let line = squashed_lines(stdout)
        .into_iter()
        .find(|line| line.contains("REASON:X"))?;
    let code = reason_code(&line);
    Some((line, code))
}

/// Classifies a DFHRMUTL run by return code and reason.
pub fn rmutl_status(rc: i32, stdout: &str) -> RmutlStatus {
    match rc {
        0 => RmutlStatus::Success,
        16 => match rmutl_reason_code(stdout) {
            Some((_, Some(code))) if code == TRANSIENT_REASON_CODE => RmutlStatus::Transient,
            Some((line, Some(_))) => RmutlStatus::Failed(ParseError::CommandFailed {
                message: format!("DFHRMUTL failed with RC 16 - {line}"),
                rc,
            }),
            _ => RmutlStatus::Failed(ParseError::CommandFailed {
                message: "DFHRMUTL failed with RC 16 but no reason code was found".to_string(),
                rc,
            }),
        },
        rc => RmutlStatus::Failed(ParseError::CommandFailed {
            message: format!("DFHRMUTL failed with RC {rc}"),
            rc,
        }),
    }
}
