//! TSO `LISTDS` output.

use std::sync::LazyLock;

use cics_provision_core::{DataSetOrganization, DataSetState};
use regex::Regex;

use super::ParseError;
use crate::executor::CommandResponse;

static DSORG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(PS|PO|IS|DA|VSAM|\?\?)\s+").expect("static regex must compile")
});

/// SYSTSIN card for a data set query.
pub fn listds_command(dsn: &str) -> String {
    format!(" LISTDS '{dsn}'")
}

/// Organization from the first DSORG token, or `Unspecified` when none is
/// printed.
pub fn parse_data_set_organization(stdout: &str) -> DataSetOrganization {
    DSORG_RE
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .map(|code| DataSetOrganization::from_listds_code(code.as_str()))
        .unwrap_or(DataSetOrganization::Unspecified)
}

/// Existence and organization of `dsn` from a LISTDS response.
///
/// ```
/// use cics_provision_core::{DataSetOrganization, DataSetState};
/// use cics_provision_utilities::CommandResponse;
/// use cics_provision_utilities::parser::parse_listds;
///
/// let response = CommandResponse::new(8, "DATA SET 'CICS.GCD' NOT IN CATALOG", "");
/// let state = parse_listds(&response, "CICS.GCD").unwrap();
/// assert_eq!(state, DataSetState::absent());
/// assert_eq!(state.data_set_organization, DataSetOrganization::None);
/// ```
pub fn parse_listds(response: &CommandResponse, dsn: &str) -> Result<DataSetState, ParseError> {
    if !response.mentions(dsn) {
        return Err(ParseError::NotRecognized(
            "LISTDS Command output not recognised".to_string(),
        ));
    }

    match response.rc {
        8 if response.stdout.contains("NOT IN CATALOG") => Ok(DataSetState::absent()),
        4 if response.stdout.contains("MEMBER NAME NOT FOUND") => Ok(DataSetState::absent()),
        0 => Ok(DataSetState::present(parse_data_set_organization(
            &response.stdout,
        ))),
        rc => Err(ParseError::CommandFailed {
            message: format!("RC {rc} running LISTDS Command"),
            rc,
        }),
    }
}
