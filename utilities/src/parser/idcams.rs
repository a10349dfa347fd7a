//! IDCAMS `DEFINE` and `DELETE` results.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ParseError;
use super::util::squash;
use crate::executor::CommandResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdcamsAction {
    Define,
    Delete,
}

/// What an IDCAMS run did to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdcamsOutcome {
    Defined,
    AlreadyDefined,
    Deleted,
    NotFound,
}

/// Interprets an IDCAMS response for `dsn`.
pub fn interpret_idcams(
    response: &CommandResponse,
    dsn: &str,
    action: IdcamsAction,
) -> Result<IdcamsOutcome, ParseError> {
    if !response.mentions(dsn) {
        return Err(ParseError::NotRecognized(
            "IDCAMS Command output not recognised".to_string(),
        ));
    }

    let squashed = squash(&response.stdout);
    let dsn = dsn.to_uppercase();
    match action {
        IdcamsAction::Define => {
            if response.rc == 12
                && squashed.contains("NOTDEFINEDBECAUSEDUPLICATENAMEEXISTSINCATALOG")
            {
                return Ok(IdcamsOutcome::AlreadyDefined);
            }
            if response.rc != 0 {
                return Err(ParseError::CommandFailed {
                    message: format!("RC {} when creating data set", response.rc),
                    rc: response.rc,
                });
            }
            Ok(IdcamsOutcome::Defined)
        }
        IdcamsAction::Delete => {
            if response.rc == 8 && squashed.contains(&format!("ENTRY{dsn}NOTFOUND")) {
                return Ok(IdcamsOutcome::NotFound);
            }
            let deleted = Regex::new(&format!(r"ENTRY\([ACDI]\){}DELETED", regex::escape(&dsn)))
                .is_ok_and(|re| re.is_match(&squashed));
            if response.rc != 0 || !deleted {
                return Err(ParseError::CommandFailed {
                    message: format!("RC {} when deleting data set", response.rc),
                    rc: response.rc,
                });
            }
            Ok(IdcamsOutcome::Deleted)
        }
    }
}
