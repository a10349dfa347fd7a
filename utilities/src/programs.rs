//! Wrappers that run one mainframe utility and interpret what it printed.
//!
//! Each wrapper builds a [`ProgramInvocation`], runs it through the retry
//! loop with a utility-specific recognition predicate, and parses the final
//! response. Successful calls hand back the value together with every
//! execution they recorded; failures carry the same log inside the
//! [`UtilityError`].

use cics_provision_core::{
    AutoStartOverride, CatalogAutoStartState, CsdupOptions, DataSetDefinition, DataSetState,
    DdStatement, ExecutionRecord, ProgramInvocation, dfhrmutl_invocation, validate_data_set_name,
};
use tracing::{debug, info};

use crate::error::{Result, UtilityError};
use crate::executor::{CommandResponse, ProgramExecutor};
use crate::parser::icetool::ICETOOL_COUNT;
use crate::parser::{
    IdcamsAction, IdcamsOutcome, RmutlStatus, icetool_reason_line, interpret_idcams,
    listds_command, parse_dfhrmutl, parse_listds, parse_record_count, rmutl_reason_code,
    rmutl_status,
};
use crate::retry::{RetryOutcome, RetryPolicy, run_with_retry};

/// A value produced by running utilities, with the executions behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executed<T> {
    pub value: T,
    pub executions: Vec<ExecutionRecord>,
}

impl<T> Executed<T> {
    pub fn new(value: T, executions: Vec<ExecutionRecord>) -> Self {
        Self { value, executions }
    }

    /// Moves the executions onto `log` and returns the value.
    pub fn into_value(self, log: &mut Vec<ExecutionRecord>) -> T {
        log.extend(self.executions);
        self.value
    }
}

/// Runs CICS and z/OS utilities through a [`ProgramExecutor`].
#[derive(Debug)]
pub struct Utilities<E> {
    executor: E,
    policy: RetryPolicy,
}

impl<E: ProgramExecutor> Utilities<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn into_inner(self) -> E {
        self.executor
    }

    /// Catalog status and organization of `dsn` via TSO `LISTDS`.
    pub fn listds(&mut self, dsn: &str) -> Result<Executed<DataSetState>> {
        validate_data_set_name(dsn)?;
        let invocation = ProgramInvocation::new("IKJEFT01")
            .authorized()
            .with_dd(DdStatement::input("SYSTSIN", vec![listds_command(dsn)]))
            .with_dd(DdStatement::output("SYSTSPRT"));

        let executor = &mut self.executor;
        let (response, executions) = run_with_retry(
            self.policy,
            |attempt| format!("IKJEFT01 - Get Data Set Status - Run {attempt}"),
            || executor.execute(&invocation),
            |response| response.mentions(dsn),
        )?
        .recognized("LISTDS Command output not recognised")?;

        match parse_listds(&response, dsn) {
            Ok(state) => {
                debug!(dsn, exists = state.exists, organization = %state.data_set_organization, "Data set status");
                Ok(Executed::new(state, executions))
            }
            Err(err) => Err(err.into_utility_error(executions)),
        }
    }

    /// Runs an IDCAMS `DEFINE` or `DELETE` command against `dsn`.
    ///
    /// `label` names the executions, for example "Create global catalog
    /// data set".
    pub fn idcams(
        &mut self,
        command: &str,
        label: &str,
        dsn: &str,
        action: IdcamsAction,
    ) -> Result<Executed<IdcamsOutcome>> {
        let invocation = ProgramInvocation::new("IDCAMS")
            .authorized()
            .with_dd(DdStatement::input_text("SYSIN", command))
            .with_dd(DdStatement::output("SYSPRINT"));

        let executor = &mut self.executor;
        let (response, executions) = run_with_retry(
            self.policy,
            |attempt| format!("IDCAMS - {label} - Run {attempt}"),
            || executor.execute(&invocation),
            |response| response.mentions(dsn),
        )?
        .recognized("IDCAMS Command output not recognised")?;

        match interpret_idcams(&response, dsn, action) {
            Ok(outcome) => {
                info!(dsn, ?outcome, "IDCAMS finished");
                Ok(Executed::new(outcome, executions))
            }
            Err(err) => Err(err.into_utility_error(executions)),
        }
    }

    /// Allocates a sequential data set with an IEFBR14 step.
    pub fn iefbr14(&mut self, ddname: &str, definition: DataSetDefinition) -> Result<Executed<()>> {
        validate_data_set_name(&definition.name)?;
        let invocation =
            ProgramInvocation::new("IEFBR14").with_dd(DdStatement::data_set(ddname, definition));

        let executor = &mut self.executor;
        let (response, executions) = run_with_retry(
            self.policy,
            |attempt| format!("IEFBR14 - {ddname} - Run {attempt}"),
            || executor.execute(&invocation),
            |response| !response.is_silent(),
        )?
        .recognized("IEFBR14 Command output not recognised")?;

        if response.rc != 0 {
            return Err(UtilityError::command_failed(
                format!("RC {} when creating sequential data set", response.rc),
                response.rc,
                executions,
            ));
        }
        Ok(Executed::new((), executions))
    }

    /// Number of records in `dsn`, counted by ICETOOL. -1 when the count
    /// line is missing from the report.
    pub fn icetool(&mut self, dsn: &str) -> Result<Executed<i64>> {
        validate_data_set_name(dsn)?;
        let invocation = ProgramInvocation::new("ICETOOL")
            .authorized()
            .with_dd(DdStatement::output("SYSPRINT"))
            .with_dd(DdStatement::data_set("DD1", DataSetDefinition::shared(dsn)))
            .with_dd(DdStatement::output("TOOLMSG"))
            .with_dd(DdStatement::output("DFSMSG"))
            .with_dd(DdStatement::output("SHOWDEF"))
            .with_dd(DdStatement::input("TOOLIN", vec![ICETOOL_COUNT.to_string()]));

        let executor = &mut self.executor;
        let (response, executions) = run_with_retry(
            self.policy,
            |attempt| format!("ICETOOL - Get record count - Run {attempt}"),
            || executor.execute(&invocation),
            |response| response.rc != 0 || !response.stdout.is_empty(),
        )?
        .recognized("ICETOOL Command output not recognised")?;

        if response.rc != 0 {
            let message = match icetool_reason_line(&response.stdout) {
                Some(line) => format!("ICETOOL failed with RC {} - {line}", response.rc),
                None => format!("ICETOOL failed with RC {}", response.rc),
            };
            return Err(UtilityError::command_failed(message, response.rc, executions));
        }

        let count = parse_record_count(&response.stdout);
        debug!(dsn, count, "ICETOOL record count");
        Ok(Executed::new(count, executions))
    }

    /// Reads the global catalog auto-start record, optionally setting the
    /// override first.
    ///
    /// RC 16 with reason `X'A8'` means the catalog was briefly busy; the job
    /// is run again within the same attempt bound. Any other RC 16 reason is
    /// fatal straight away.
    pub fn dfhrmutl(
        &mut self,
        global_catalog: &str,
        sdfhload: &str,
        set_auto_start: Option<AutoStartOverride>,
    ) -> Result<Executed<CatalogAutoStartState>> {
        let invocation = dfhrmutl_invocation(global_catalog, sdfhload, set_auto_start)?;
        let purpose = match set_auto_start {
            Some(_) => "Updating autostart override",
            None => "Get current catalog",
        };

        let executor = &mut self.executor;
        let run = run_with_retry(
            self.policy,
            |attempt| format!("DFHRMUTL - {purpose} - Run {attempt}"),
            || executor.execute(&invocation),
            |response| {
                !response.is_silent()
                    && rmutl_status(response.rc, &response.stdout) != RmutlStatus::Transient
            },
        )?;

        let executions = run.executions;
        let response = match run.outcome {
            RetryOutcome::Recognized(response) => response,
            RetryOutcome::Exhausted(response) => return Err(rmutl_exhausted(&response, executions)),
        };

        match rmutl_status(response.rc, &response.stdout) {
            RmutlStatus::Success => {
                let state = parse_dfhrmutl(&response.stdout);
                debug!(
                    global_catalog,
                    autostart_override = ?state.autostart_override,
                    next_start = ?state.next_start,
                    "Global catalog state"
                );
                Ok(Executed::new(state, executions))
            }
            RmutlStatus::Transient => Err(rmutl_exhausted(&response, executions)),
            RmutlStatus::Failed(err) => Err(err.into_utility_error(executions)),
        }
    }

    /// Formats a local catalog with DFHCCUTL.
    pub fn dfhccutl(&mut self, local_catalog: &str, sdfhload: &str) -> Result<Executed<()>> {
        validate_data_set_name(local_catalog)?;
        validate_data_set_name(sdfhload)?;
        let invocation = ProgramInvocation::new("DFHCCUTL")
            .with_dd(DdStatement::data_set("STEPLIB", DataSetDefinition::shared(sdfhload)))
            .with_dd(DdStatement::output("SYSPRINT"))
            .with_dd(DdStatement::output("SYSUDUMP"))
            .with_dd(DdStatement::data_set("DFHLCD", DataSetDefinition::shared(local_catalog)));

        let response = self.run_once("DFHCCUTL - Initialise Local Catalog", &invocation)?;
        let executions = vec![response.record("DFHCCUTL - Initialise Local Catalog")];
        if response.rc != 0 {
            return Err(UtilityError::command_failed(
                format!("DFHCCUTL failed with RC {}", response.rc),
                response.rc,
                executions,
            ));
        }
        Ok(Executed::new((), executions))
    }

    /// Runs DFHCSDUP against `csd` with the given SYSIN commands.
    ///
    /// RC 4 (warnings) is accepted. RC 8 and above fail.
    pub fn dfhcsdup(
        &mut self,
        csd: &str,
        sdfhload: &str,
        sysin: Vec<String>,
        options: &CsdupOptions,
    ) -> Result<Executed<CommandResponse>> {
        validate_data_set_name(csd)?;
        validate_data_set_name(sdfhload)?;
        let invocation = ProgramInvocation::new("DFHCSDUP")
            .with_parm(options.parm())
            .with_dd(DdStatement::data_set("STEPLIB", DataSetDefinition::shared(sdfhload)))
            .with_dd(DdStatement::data_set("DFHCSD", DataSetDefinition::shared(csd)))
            .with_dd(DdStatement::output("SYSPRINT"))
            .with_dd(DdStatement::output("SYSUDUMP"))
            .with_dd(DdStatement::input("SYSIN", sysin));

        let response = self.run_once("Run DFHCSDUP", &invocation)?;
        let executions = vec![response.record("Run DFHCSDUP")];
        if response.rc >= 8 {
            return Err(UtilityError::command_failed(
                format!("DFHCSDUP failed with RC {}", response.rc),
                response.rc,
                executions,
            ));
        }
        Ok(Executed::new(response, executions))
    }

    fn run_once(&mut self, name: &str, invocation: &ProgramInvocation) -> Result<CommandResponse> {
        let response = self.executor.execute(invocation).map_err(|err| UtilityError::Spawn {
            message: format!("Failed to run {name}: {err}"),
            executions: Vec::new(),
        })?;
        debug!(execution = name, rc = response.rc, "Command finished");
        Ok(response)
    }
}

fn rmutl_exhausted(response: &CommandResponse, executions: Vec<ExecutionRecord>) -> UtilityError {
    match rmutl_reason_code(&response.stdout) {
        Some((line, Some(_))) if response.rc == 16 => UtilityError::command_failed(
            format!("DFHRMUTL failed with RC 16 - {line}"),
            16,
            executions,
        ),
        _ => UtilityError::not_recognized("DFHRMUTL Command output not recognised", executions),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;

    use cics_provision_core::{DataSetOrganization, NextStartType, SpaceAllocation, SpaceUnit};

    use super::*;

    #[derive(Default)]
    struct Scripted {
        responses: VecDeque<CommandResponse>,
        seen: Vec<ProgramInvocation>,
    }

    impl Scripted {
        fn new(responses: Vec<CommandResponse>) -> Self {
            Self {
                responses: responses.into(),
                seen: Vec::new(),
            }
        }
    }

    impl ProgramExecutor for Scripted {
        fn execute(&mut self, invocation: &ProgramInvocation) -> io::Result<CommandResponse> {
            self.seen.push(invocation.clone());
            Ok(self.responses.pop_front().unwrap_or_default())
        }
    }

    fn ok(stdout: &str) -> CommandResponse {
        CommandResponse::new(0, stdout, "")
    }

    #[test]
    fn test_listds_retries_until_echoed() {
        let mut utilities = Utilities::new(Scripted::new(vec![
            ok(""),
            ok("READY"),
            ok("CICS.GCD\n--DSORG\n   VSAM  \n"),
        ]));
        let result = utilities.listds("CICS.GCD").unwrap();
        assert_eq!(result.value, DataSetState::present(DataSetOrganization::Vsam));
        let names: Vec<_> = result.executions.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "IKJEFT01 - Get Data Set Status - Run 1",
                "IKJEFT01 - Get Data Set Status - Run 2",
                "IKJEFT01 - Get Data Set Status - Run 3",
            ]
        );
        let invocation = &utilities.executor_mut().seen[0];
        assert!(invocation.authorized);
        assert_eq!(
            invocation.dds[0],
            DdStatement::input("SYSTSIN", vec![" LISTDS 'CICS.GCD'".to_string()])
        );
    }

    #[test]
    fn test_listds_bad_rc_keeps_history() {
        let mut utilities = Utilities::new(Scripted::new(vec![CommandResponse::new(
            12,
            "CICS.GCD broken",
            "",
        )]));
        let err = utilities.listds("CICS.GCD").unwrap_err();
        assert_eq!(err.to_string(), "RC 12 running LISTDS Command");
        assert_eq!(err.executions().len(), 1);
    }

    #[test]
    fn test_idcams_delete_not_found() {
        let mut utilities = Utilities::new(Scripted::new(vec![CommandResponse::new(
            8,
            "IDC3012I ENTRY CICS.CSD NOT FOUND",
            "",
        )]));
        let result = utilities
            .idcams("DELETE CICS.CSD", "Removing CSD data set", "CICS.CSD", IdcamsAction::Delete)
            .unwrap();
        assert_eq!(result.value, IdcamsOutcome::NotFound);
        assert_eq!(result.executions[0].name, "IDCAMS - Removing CSD data set - Run 1");
    }

    #[test]
    fn test_iefbr14_failure() {
        let definition = DataSetDefinition::sequential(
            "CICS.DFHAUXT",
            SpaceAllocation::new(SpaceUnit::Megabytes, 20, 4),
            vec![],
        );
        let mut utilities =
            Utilities::new(Scripted::new(vec![CommandResponse::new(8, "", "IEF253I DUPLICATE NAME")]));
        let err = utilities.iefbr14("DFHAUXT", definition).unwrap_err();
        assert_eq!(err.to_string(), "RC 8 when creating sequential data set");
        assert_eq!(err.executions()[0].name, "IEFBR14 - DFHAUXT - Run 1");
    }

    #[test]
    fn test_icetool_count_and_failure() {
        let mut utilities = Utilities::new(Scripted::new(vec![
            ok("ICE628I 0 RECORD COUNT: 000000000000003"),
            CommandResponse::new(12, "IEC161I RC: 8, REASON: X'0038'", ""),
        ]));
        assert_eq!(utilities.icetool("CICS.LCD").unwrap().value, 3);
        let err = utilities.icetool("CICS.LCD").unwrap_err();
        assert_eq!(err.to_string(), "ICETOOL failed with RC 12 - IEC161IRC:8,REASON:X'0038'");
    }

    #[test]
    fn test_icetool_silent() {
        let mut utilities =
            Utilities::new(Scripted::new(vec![])).with_policy(RetryPolicy { max_attempts: 2 });
        let err = utilities.icetool("CICS.LCD").unwrap_err();
        assert!(matches!(err, UtilityError::OutputNotRecognized { .. }));
        assert_eq!(err.executions().len(), 2);
    }

    const REPORT: &str = "Recovery manager auto-start override   : AUTOASIS\n\
                          Recovery manager next start type       : WARM\n";
    const BUSY: &str = "DFHRM0001 RC: 16, REASON: X'00A8'";

    #[test]
    fn test_dfhrmutl_retries_busy_catalog() {
        let mut utilities = Utilities::new(Scripted::new(vec![
            CommandResponse::new(16, BUSY, ""),
            ok(REPORT),
        ]));
        let result = utilities.dfhrmutl("CICS.GCD", "CICS.SDFHLOAD", None).unwrap();
        assert_eq!(result.value.next_start, Some(NextStartType::Warm));
        assert_eq!(result.executions.len(), 2);
        assert_eq!(result.executions[1].name, "DFHRMUTL - Get current catalog - Run 2");
    }

    #[test]
    fn test_dfhrmutl_busy_until_exhausted() {
        let mut utilities = Utilities::new(Scripted::new(vec![
            CommandResponse::new(16, BUSY, ""),
            CommandResponse::new(16, BUSY, ""),
        ]))
        .with_policy(RetryPolicy { max_attempts: 2 });
        let err = utilities
            .dfhrmutl("CICS.GCD", "CICS.SDFHLOAD", Some(AutoStartOverride::AutoInit))
            .unwrap_err();
        assert_eq!(err.to_string(), "DFHRMUTL failed with RC 16 - DFHRM0001RC:16,REASON:X'00A8'");
        assert_eq!(err.executions()[0].name, "DFHRMUTL - Updating autostart override - Run 1");
    }

    #[test]
    fn test_dfhrmutl_other_reason_is_fatal() {
        let mut utilities = Utilities::new(Scripted::new(vec![CommandResponse::new(
            16,
            "RC: 16, REASON: X'0C'",
            "",
        )]));
        let err = utilities.dfhrmutl("CICS.GCD", "CICS.SDFHLOAD", None).unwrap_err();
        assert!(matches!(err, UtilityError::CommandFailed { rc: 16, .. }));
        assert_eq!(err.executions().len(), 1);
    }

    #[test]
    fn test_dfhccutl_failure() {
        let mut utilities = Utilities::new(Scripted::new(vec![CommandResponse::new(12, "", "")]));
        let err = utilities.dfhccutl("CICS.LCD", "CICS.SDFHLOAD").unwrap_err();
        assert_eq!(err.to_string(), "DFHCCUTL failed with RC 12");
        assert_eq!(err.executions()[0].name, "DFHCCUTL - Initialise Local Catalog");
    }

    #[test]
    fn test_dfhcsdup_accepts_warnings() {
        let mut utilities = Utilities::new(Scripted::new(vec![
            CommandResponse::new(4, "DFH5120 I PRIMARY CSD OPENED", ""),
            CommandResponse::new(8, "DFH5180 E", ""),
        ]));
        let options = CsdupOptions::default();
        let result = utilities
            .dfhcsdup("CICS.CSD", "CICS.SDFHLOAD", vec!["INITIALIZE".to_string()], &options)
            .unwrap();
        assert_eq!(result.value.rc, 4);
        assert_eq!(
            utilities.executor_mut().seen[0].parm.as_deref(),
            Some(options.parm().as_str())
        );
        let err = utilities
            .dfhcsdup("CICS.CSD", "CICS.SDFHLOAD", vec![], &options)
            .unwrap_err();
        assert_eq!(err.to_string(), "DFHCSDUP failed with RC 8");
    }
}
