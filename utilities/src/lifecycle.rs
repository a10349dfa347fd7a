//! Target-state management for the data sets a CICS region owns.
//!
//! Every run brackets its work with a LISTDS query: the state before anything
//! changes is reported as `start_state`, the state afterwards as `end_state`.
//! Nothing is cached between runs; the catalog is the only source of truth.
//!
//! ```no_run
//! use cics_provision_utilities::*;
//!
//! let mut utilities = Utilities::new(ZoauExecutor::default());
//! let request = DataSetRequest::new(DataSetKind::LocalCatalog, "CICS.REGION.DFHLCD", TargetState::Initial)
//!     .with_sdfhload("CICSTS61.CICS.SDFHLOAD");
//! let report = provision_data_set(&mut utilities, &request).unwrap();
//! assert!(report.end_state.exists);
//! ```

use std::fmt;

use cics_provision_core::{
    AutoStartOverride, CatalogAutoStartState, CsdCommand, CsdupOptions, DataSetDefinition,
    DataSetOrganization, DataSetState, ExecutionRecord, NextStartType, RecoveryLog,
    SpaceAllocation, SpaceUnit, VsamDefinition, delete_command, validate_data_set_name,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::UtilityError;
use crate::executor::ProgramExecutor;
use crate::parser::{IdcamsAction, IdcamsOutcome};
use crate::programs::{Executed, Utilities};

/// The region data sets this crate can manage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum DataSetKind {
    GlobalCatalog,
    LocalCatalog,
    Csd,
    LocalRequestQueue,
    AuxiliaryTempStorage,
    Intrapartition,
    AuxiliaryTrace,
    TransactionDump,
}

impl DataSetKind {
    /// DD name the region uses for this data set.
    pub fn ddname(self, destination: Destination) -> &'static str {
        match (self, destination) {
            (Self::GlobalCatalog, _) => "DFHGCD",
            (Self::LocalCatalog, _) => "DFHLCD",
            (Self::Csd, _) => "DFHCSD",
            (Self::LocalRequestQueue, _) => "DFHLRQ",
            (Self::AuxiliaryTempStorage, _) => "DFHTEMP",
            (Self::Intrapartition, _) => "DFHINTRA",
            (Self::AuxiliaryTrace, Destination::A) => "DFHAUXT",
            (Self::AuxiliaryTrace, Destination::B) => "DFHBUXT",
            (Self::TransactionDump, Destination::A) => "DFHDMPA",
            (Self::TransactionDump, Destination::B) => "DFHDMPB",
        }
    }

    pub fn expected_organization(self) -> DataSetOrganization {
        match self {
            Self::AuxiliaryTrace | Self::TransactionDump => DataSetOrganization::Sequential,
            _ => DataSetOrganization::Vsam,
        }
    }

    pub fn default_space(self) -> SpaceAllocation {
        match self {
            Self::GlobalCatalog => SpaceAllocation::new(SpaceUnit::Megabytes, 5, 1),
            Self::LocalCatalog => SpaceAllocation::new(SpaceUnit::Records, 200, 5),
            Self::Csd | Self::LocalRequestQueue => SpaceAllocation::new(SpaceUnit::Megabytes, 4, 1),
            Self::AuxiliaryTempStorage => SpaceAllocation::new(SpaceUnit::Records, 200, 10),
            Self::Intrapartition => SpaceAllocation::new(SpaceUnit::Records, 100, 10),
            Self::AuxiliaryTrace | Self::TransactionDump => {
                SpaceAllocation::new(SpaceUnit::Megabytes, 20, 4)
            }
        }
    }

    fn needs_sdfhload(self, state: TargetState) -> bool {
        match self {
            Self::GlobalCatalog => state != TargetState::Absent,
            Self::LocalCatalog | Self::Csd => state == TargetState::Initial,
            _ => false,
        }
    }
}

impl fmt::Display for DataSetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GlobalCatalog => "global catalog",
            Self::LocalCatalog => "local catalog",
            Self::Csd => "CSD",
            Self::LocalRequestQueue => "local request queue",
            Self::AuxiliaryTempStorage => "auxiliary temporary storage",
            Self::Intrapartition => "transient data intrapartition",
            Self::AuxiliaryTrace => "auxiliary trace",
            Self::TransactionDump => "transaction dump",
        })
    }
}

/// Which of the A/B pair of trace or dump data sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Destination {
    #[default]
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum TargetState {
    Absent,
    Initial,
    Warm,
    /// Global catalog only.
    Cold,
}

impl TargetState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Initial => "initial",
            Self::Warm => "warm",
            Self::Cold => "cold",
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One data set and the state it should be brought to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetRequest {
    pub kind: DataSetKind,
    pub name: String,
    pub state: TargetState,
    pub space: SpaceAllocation,
    #[serde(default)]
    pub volumes: Vec<String>,
    #[serde(default)]
    pub destination: Destination,
    #[serde(default)]
    pub sdfhload: Option<String>,
    /// CSD recovery logging.
    #[serde(default)]
    pub log: Option<RecoveryLog>,
    #[serde(default)]
    pub logstream_id: Option<String>,
}

impl DataSetRequest {
    pub fn new(kind: DataSetKind, name: impl Into<String>, state: TargetState) -> Self {
        Self {
            kind,
            name: name.into().to_uppercase(),
            state,
            space: kind.default_space(),
            volumes: Vec::new(),
            destination: Destination::default(),
            sdfhload: None,
            log: None,
            logstream_id: None,
        }
    }

    pub fn with_space(mut self, space: SpaceAllocation) -> Self {
        self.space = space;
        self
    }

    pub fn with_volumes(mut self, volumes: Vec<String>) -> Self {
        self.volumes = volumes;
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_sdfhload(mut self, sdfhload: impl Into<String>) -> Self {
        self.sdfhload = Some(sdfhload.into().to_uppercase());
        self
    }

    pub fn with_log(mut self, log: RecoveryLog, logstream_id: Option<String>) -> Self {
        self.log = Some(log);
        self.logstream_id = logstream_id;
        self
    }

    fn sdfhload(&self) -> &str {
        self.sdfhload.as_deref().unwrap_or_default()
    }

    /// IDCAMS definition, or `None` for the sequential kinds.
    fn vsam_definition(&self) -> Option<VsamDefinition> {
        let name = self.name.as_str();
        let volumes = self.volumes.clone();
        let definition = match self.kind {
            DataSetKind::GlobalCatalog => VsamDefinition::global_catalog(name, self.space, volumes),
            DataSetKind::LocalCatalog => VsamDefinition::local_catalog(name, self.space, volumes),
            DataSetKind::Csd => VsamDefinition::csd(
                name,
                self.space,
                volumes,
                self.log,
                self.logstream_id.as_deref(),
            ),
            DataSetKind::LocalRequestQueue => {
                VsamDefinition::local_request_queue(name, self.space, volumes)
            }
            DataSetKind::AuxiliaryTempStorage => {
                VsamDefinition::auxiliary_temp_storage(name, self.space, volumes)
            }
            DataSetKind::Intrapartition => VsamDefinition::intrapartition(name, self.space, volumes),
            DataSetKind::AuxiliaryTrace | DataSetKind::TransactionDump => return None,
        };
        Some(definition)
    }
}

/// Data set state as reported at the start or end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleState {
    pub exists: bool,
    pub data_set_organization: DataSetOrganization,
    /// Global catalog only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autostart_override: Option<AutoStartOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_start: Option<NextStartType>,
}

impl LifecycleState {
    fn catalog(&self) -> CatalogAutoStartState {
        CatalogAutoStartState {
            autostart_override: self.autostart_override,
            next_start: self.next_start,
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleReport {
    pub changed: bool,
    pub executions: Vec<ExecutionRecord>,
    pub start_state: LifecycleState,
    pub end_state: LifecycleState,
    pub msg: String,
}

/// A failed run, with the states seen before the failure.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct LifecycleError {
    #[source]
    pub error: UtilityError,
    pub start_state: LifecycleState,
    pub end_state: LifecycleState,
}

impl LifecycleError {
    pub fn executions(&self) -> &[ExecutionRecord] {
        self.error.executions()
    }
}

/// Brings `request.name` to `request.state`.
pub fn provision_data_set<E: ProgramExecutor>(
    utilities: &mut Utilities<E>,
    request: &DataSetRequest,
) -> Result<LifecycleReport, LifecycleError> {
    let mut run = Run {
        utilities,
        request,
        executions: Vec::new(),
        changed: false,
        state: LifecycleState::default(),
        start: LifecycleState::default(),
    };
    match run.execute() {
        Ok(()) => Ok(LifecycleReport {
            changed: run.changed,
            executions: run.executions,
            start_state: run.start,
            end_state: run.state,
            msg: String::new(),
        }),
        Err(error) => {
            warn!(dsn = %request.name, error = %error, "Data set operation failed");
            Err(LifecycleError {
                error,
                start_state: run.start,
                end_state: run.state,
            })
        }
    }
}

type Step<T = ()> = Result<T, UtilityError>;

struct Run<'a, E> {
    utilities: &'a mut Utilities<E>,
    request: &'a DataSetRequest,
    executions: Vec<ExecutionRecord>,
    changed: bool,
    state: LifecycleState,
    start: LifecycleState,
}

impl<E: ProgramExecutor> Run<'_, E> {
    fn execute(&mut self) -> Step {
        let request = self.request;
        validate_data_set_name(&request.name)?;
        if request.state == TargetState::Cold && request.kind != DataSetKind::GlobalCatalog {
            return Err(self.fail(format!("{} is not a valid target state.", request.state)));
        }
        if request.kind.needs_sdfhload(request.state) && request.sdfhload.is_none() {
            return Err(self.fail(format!(
                "An SDFHLOAD library is required to manage the {} data set.",
                request.kind
            )));
        }
        info!(dsn = %request.name, kind = %request.kind, state = %request.state, "Managing data set");

        self.refresh()?;
        self.start = self.state;

        let expected = request.kind.expected_organization();
        if self.state.exists && self.state.data_set_organization != expected {
            return Err(self.fail(format!(
                "Data set {} is not in expected format {expected}.",
                request.name
            )));
        }
        if request.kind == DataSetKind::GlobalCatalog
            && self.state.next_start == Some(NextStartType::Emergency)
        {
            return Err(self.fail(format!(
                "Next start type is {}, potential dataloss prevented",
                NextStartType::Emergency
            )));
        }

        match request.state {
            TargetState::Absent => self.delete()?,
            TargetState::Initial => self.initial()?,
            TargetState::Warm => self.warm()?,
            TargetState::Cold => self.set_catalog_start(AutoStartOverride::AutoCold, "cold")?,
        }

        self.refresh()
    }

    fn fail(&mut self, message: String) -> UtilityError {
        UtilityError::invalid_request(message, std::mem::take(&mut self.executions))
    }

    fn record<T>(&mut self, result: crate::Result<Executed<T>>) -> Step<T> {
        match result {
            Ok(executed) => Ok(executed.into_value(&mut self.executions)),
            Err(err) => Err(err.with_history(std::mem::take(&mut self.executions))),
        }
    }

    /// Re-reads existence and organization, plus the auto-start record for
    /// an existing global catalog.
    fn refresh(&mut self) -> Step {
        let request = self.request;
        let name = request.name.as_str();
        let result = self.utilities.listds(name);
        let DataSetState {
            exists,
            data_set_organization,
        } = self.record(result)?;
        self.state = LifecycleState {
            exists,
            data_set_organization,
            ..LifecycleState::default()
        };

        if exists && request.kind == DataSetKind::GlobalCatalog {
            let result = self.utilities.dfhrmutl(name, request.sdfhload(), None);
            let catalog = self.record(result)?;
            self.state.autostart_override = catalog.autostart_override;
            self.state.next_start = catalog.next_start;
        }
        debug!(dsn = name, exists, organization = %data_set_organization, "Refreshed data set state");
        Ok(())
    }

    fn delete(&mut self) -> Step {
        if !self.state.exists {
            return Ok(());
        }
        let name = self.request.name.as_str();
        let command = delete_command(name);
        let result = self
            .utilities
            .idcams(&command, name, name, IdcamsAction::Delete);
        if self.record(result)? == IdcamsOutcome::Deleted {
            self.changed = true;
        }
        Ok(())
    }

    fn create(&mut self) -> Step {
        let request = self.request;
        match request.vsam_definition() {
            Some(definition) => {
                let command = definition.define_command();
                let label = format!("Creating {} data set", request.name);
                let result = self.utilities.idcams(
                    &command,
                    &label,
                    &request.name,
                    IdcamsAction::Define,
                );
                self.record(result)?;
            }
            None => {
                let definition = DataSetDefinition::sequential(
                    request.name.as_str(),
                    request.space,
                    request.volumes.clone(),
                );
                let result = self
                    .utilities
                    .iefbr14(request.kind.ddname(request.destination), definition);
                self.record(result)?;
            }
        }
        self.changed = true;
        Ok(())
    }

    fn record_count(&mut self) -> Step<i64> {
        let result = self.utilities.icetool(&self.request.name);
        self.record(result)
    }

    fn initial(&mut self) -> Step {
        let request = self.request;
        if request.kind == DataSetKind::GlobalCatalog
            && self.state.exists
            && self.state.autostart_override == Some(AutoStartOverride::AutoInit)
        {
            debug!(dsn = %request.name, "Global catalog already set to AUTOINIT");
            return Ok(());
        }

        if self.state.exists {
            if self.record_count()? > 0 {
                self.delete()?;
                self.refresh()?;
                self.create()?;
            }
        } else {
            self.create()?;
        }

        match request.kind {
            DataSetKind::GlobalCatalog => {
                let result = self.utilities.dfhrmutl(
                    &request.name,
                    request.sdfhload(),
                    Some(AutoStartOverride::AutoInit),
                );
                self.record(result)?;
                self.changed = true;
            }
            DataSetKind::LocalCatalog => {
                let result = self.utilities.dfhccutl(&request.name, request.sdfhload());
                self.record(result)?;
                self.changed = true;
            }
            DataSetKind::Csd => {
                let result = self.utilities.dfhcsdup(
                    &request.name,
                    request.sdfhload(),
                    vec![CsdCommand::Initialize.render()],
                    &CsdupOptions::default(),
                );
                self.record(result)?;
                self.changed = true;
            }
            _ => {}
        }
        Ok(())
    }

    fn warm(&mut self) -> Step {
        let request = self.request;
        if !self.state.exists {
            return Err(self.fail(format!("Data set {} does not exist.", request.name)));
        }
        match request.kind {
            DataSetKind::GlobalCatalog => {
                self.set_catalog_start(AutoStartOverride::AutoAsis, "warm")
            }
            DataSetKind::LocalCatalog => {
                if self.record_count()? <= 0 {
                    return Err(self.fail(format!("Data set {} is empty.", request.name)));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Points the global catalog at a warm or cold start.
    fn set_catalog_start(&mut self, target: AutoStartOverride, start: &str) -> Step {
        let request = self.request;
        if !self.state.exists {
            return Err(self.fail(format!("Data set {} does not exist.", request.name)));
        }
        let catalog = self.state.catalog();
        if catalog.autostart_override == Some(target) {
            return Ok(());
        }
        if catalog.autostart_override == Some(AutoStartOverride::AutoInit)
            && catalog.next_start == Some(NextStartType::Unknown)
        {
            return Err(self.fail(format!(
                "Unused Catalog - it must be used by CICS before doing a {start} start"
            )));
        }
        let result = self
            .utilities
            .dfhrmutl(&request.name, request.sdfhload(), Some(target));
        self.record(result)?;
        self.changed = true;
        Ok(())
    }
}
