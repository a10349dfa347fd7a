use std::collections::VecDeque;
use std::io;

use cics_provision_core::{DataSetOrganization, ProgramInvocation};
use cics_provision_utilities::{
    CommandResponse, DataSetKind, DataSetRequest, MVS_CMD_RETRY_ATTEMPTS, ProgramExecutor,
    RetryPolicy, TargetState, UtilityError, Utilities, provision_data_set,
};

const DSN: &str = "CICS.REGION.DFHLCD";

/// Replays canned responses in order and remembers which programs ran.
#[derive(Default)]
struct ReplayExecutor {
    responses: VecDeque<CommandResponse>,
    programs: Vec<String>,
}

impl ReplayExecutor {
    fn new(responses: impl IntoIterator<Item = CommandResponse>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            programs: Vec::new(),
        }
    }
}

impl ProgramExecutor for ReplayExecutor {
    fn execute(&mut self, invocation: &ProgramInvocation) -> io::Result<CommandResponse> {
        self.programs.push(invocation.program.clone());
        Ok(self.responses.pop_front().unwrap_or_default())
    }
}

fn silent() -> CommandResponse {
    CommandResponse::default()
}

fn listed(rc: i32, stdout: &str) -> CommandResponse {
    CommandResponse::new(rc, format!(" LISTDS '{DSN}'\n{stdout}"), "")
}

fn present() -> CommandResponse {
    listed(0, &format!("{DSN}\n--RECFM-LRECL-BLKSIZE-DSORG\n  VSAM\nREADY"))
}

fn absent() -> CommandResponse {
    listed(8, &format!("DATA SET '{DSN}' NOT IN CATALOG\nREADY"))
}

#[test]
fn test_recognized_on_last_allowed_attempt() {
    let misses = (1..MVS_CMD_RETRY_ATTEMPTS).map(|_| silent());
    let executor = ReplayExecutor::new(misses.chain([present()]));
    let mut utilities = Utilities::new(executor);

    let executed = utilities.listds(DSN).unwrap();
    assert!(executed.value.exists);
    assert_eq!(executed.value.data_set_organization, DataSetOrganization::Vsam);
    assert_eq!(executed.executions.len(), 10);
    assert_eq!(
        executed.executions[9].name,
        "IKJEFT01 - Get Data Set Status - Run 10"
    );
}

#[test]
fn test_exhausted_attempts_report_every_run() {
    let executor = ReplayExecutor::new((0..MVS_CMD_RETRY_ATTEMPTS).map(|_| silent()));
    let mut utilities = Utilities::new(executor);

    let err = utilities.listds(DSN).unwrap_err();
    assert!(matches!(err, UtilityError::OutputNotRecognized { .. }));
    assert_eq!(err.to_string(), "LISTDS Command output not recognised");
    assert_eq!(err.executions().len(), 10);
    assert_eq!(utilities.into_inner().programs.len(), 10);
}

#[test]
fn test_policy_bounds_attempts() {
    let executor = ReplayExecutor::new((0..5).map(|_| silent()));
    let mut utilities = Utilities::new(executor).with_policy(RetryPolicy { max_attempts: 2 });

    let err = utilities.listds(DSN).unwrap_err();
    assert_eq!(err.executions().len(), 2);
}

#[test]
fn test_local_catalog_initial_keeps_full_history() {
    let define = CommandResponse::new(
        0,
        format!("DEFINE CLUSTER (NAME({DSN}) -\nIDC0001I FUNCTION COMPLETED, HIGHEST CONDITION CODE WAS 0"),
        "",
    );
    let executor = ReplayExecutor::new([
        silent(),
        absent(),
        define,
        CommandResponse::new(0, "DFHCCUTL complete", ""),
        present(),
    ]);
    let mut utilities = Utilities::new(executor);
    let request = DataSetRequest::new(DataSetKind::LocalCatalog, DSN, TargetState::Initial)
        .with_sdfhload("CICSTS61.CICS.SDFHLOAD");

    let report = provision_data_set(&mut utilities, &request).unwrap();
    assert!(report.changed);
    assert!(!report.start_state.exists);
    assert!(report.end_state.exists);

    let names: Vec<_> = report.executions.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "IKJEFT01 - Get Data Set Status - Run 1",
            "IKJEFT01 - Get Data Set Status - Run 2",
            "IDCAMS - Creating CICS.REGION.DFHLCD data set - Run 1",
            "DFHCCUTL - Initialise Local Catalog",
            "IKJEFT01 - Get Data Set Status - Run 1",
        ]
    );
    assert_eq!(
        utilities.into_inner().programs,
        ["IKJEFT01", "IKJEFT01", "IDCAMS", "DFHCCUTL", "IKJEFT01"]
    );
}

#[test]
fn test_failure_carries_earlier_executions() {
    let executor = ReplayExecutor::new([
        absent(),
        CommandResponse::new(12, format!("DEFINE CLUSTER (NAME({DSN}))\nIDC3009I VSAM CATALOG RETURN CODE IS 68"), ""),
    ]);
    let mut utilities = Utilities::new(executor);
    let request = DataSetRequest::new(DataSetKind::LocalCatalog, DSN, TargetState::Initial)
        .with_sdfhload("CICSTS61.CICS.SDFHLOAD");

    let err = provision_data_set(&mut utilities, &request).unwrap_err();
    assert_eq!(err.to_string(), "RC 12 when creating data set");
    assert_eq!(err.executions().len(), 2);
    assert!(!err.start_state.exists);
}
