//! Shared data model for provisioning operations.
//!
//! These types travel between the renderers in this crate, the command
//! runners that execute utilities, and the reports handed back to callers.
//! All of them serialize with [`serde`] so results can be emitted as JSON or
//! YAML unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::Parameters;
use crate::jcl::{DdContent, DdEntry, ExecStep, InstreamData, JobCard, JobDescription};
use crate::validate::ValidationError;

/// Data set organization as reported by LISTDS.
///
/// # Examples
///
/// ```
/// use cics_provision_core::DataSetOrganization;
///
/// assert_eq!(DataSetOrganization::from_listds_code("PS"), DataSetOrganization::Sequential);
/// assert_eq!(DataSetOrganization::from_listds_code("XX"), DataSetOrganization::Unspecified);
/// assert_eq!(DataSetOrganization::Vsam.to_string(), "VSAM");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DataSetOrganization {
    Sequential,
    Partitioned,
    #[serde(rename = "Indexed Sequential")]
    IndexedSequential,
    #[serde(rename = "Direct Access")]
    DirectAccess,
    #[serde(rename = "VSAM")]
    Vsam,
    Other,
    Unspecified,
    /// The data set does not exist.
    #[default]
    #[serde(rename = "NONE")]
    None,
}

impl DataSetOrganization {
    /// Decodes a LISTDS `DSORG` column value.
    pub fn from_listds_code(code: &str) -> Self {
        match code {
            "PS" => Self::Sequential,
            "PO" => Self::Partitioned,
            "IS" => Self::IndexedSequential,
            "DA" => Self::DirectAccess,
            "VSAM" => Self::Vsam,
            "??" => Self::Other,
            _ => Self::Unspecified,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "Sequential",
            Self::Partitioned => "Partitioned",
            Self::IndexedSequential => "Indexed Sequential",
            Self::DirectAccess => "Direct Access",
            Self::Vsam => "VSAM",
            Self::Other => "Other",
            Self::Unspecified => "Unspecified",
            Self::None => "NONE",
        }
    }
}

impl fmt::Display for DataSetOrganization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of a primary/secondary space allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SpaceUnit {
    #[serde(rename = "K")]
    Kilobytes,
    #[default]
    #[serde(rename = "M")]
    Megabytes,
    #[serde(rename = "REC")]
    Records,
    #[serde(rename = "CYL")]
    Cylinders,
    #[serde(rename = "TRK")]
    Tracks,
}

impl SpaceUnit {
    /// IDCAMS `DEFINE CLUSTER` space keyword.
    pub fn idcams_keyword(self) -> &'static str {
        match self {
            Self::Kilobytes => "KILOBYTES",
            Self::Megabytes => "MEGABYTES",
            Self::Records => "RECORDS",
            Self::Cylinders => "CYLINDERS",
            Self::Tracks => "TRACKS",
        }
    }
}

/// Primary and secondary space in one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceAllocation {
    pub unit: SpaceUnit,
    pub primary: u32,
    pub secondary: u32,
}

impl SpaceAllocation {
    pub fn new(unit: SpaceUnit, primary: u32, secondary: u32) -> Self {
        Self {
            unit,
            primary,
            secondary,
        }
    }

    /// JCL keywords requesting this allocation.
    ///
    /// Track and cylinder requests map directly onto `SPACE`; byte and
    /// record requests use a one-byte average record with `AVGREC`.
    fn jcl_parameters(&self) -> Parameters {
        let amounts = format!("({},{})", self.primary, self.secondary);
        match self.unit {
            SpaceUnit::Tracks => Parameters::new().with("SPACE", format!("(TRK,{amounts})")),
            SpaceUnit::Cylinders => Parameters::new().with("SPACE", format!("(CYL,{amounts})")),
            SpaceUnit::Kilobytes => Parameters::new()
                .with("SPACE", format!("(1,{amounts})"))
                .with("AVGREC", "K"),
            SpaceUnit::Megabytes => Parameters::new()
                .with("SPACE", format!("(1,{amounts})"))
                .with("AVGREC", "M"),
            SpaceUnit::Records => Parameters::new()
                .with("SPACE", format!("(1,{amounts})"))
                .with("AVGREC", "U"),
        }
    }
}

/// Autostart override record stored in the global catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AutoStartOverride {
    AutoInit,
    AutoAsis,
    AutoCold,
}

impl AutoStartOverride {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AutoInit => "AUTOINIT",
            Self::AutoAsis => "AUTOASIS",
            Self::AutoCold => "AUTOCOLD",
        }
    }

    /// Parses DFHRMUTL output text, ignoring case.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_uppercase().as_str() {
            "AUTOINIT" => Some(Self::AutoInit),
            "AUTOASIS" => Some(Self::AutoAsis),
            "AUTOCOLD" => Some(Self::AutoCold),
            _ => None,
        }
    }

    /// DFHRMUTL control statement that sets this override.
    pub fn set_command(self) -> String {
        format!("SET_AUTO_START={}", self.as_str())
    }
}

impl fmt::Display for AutoStartOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Next start type recorded in the global catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NextStartType {
    Warm,
    Cold,
    Emergency,
    Unknown,
}

impl NextStartType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warm => "WARM",
            Self::Cold => "COLD",
            Self::Emergency => "EMERGENCY",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_uppercase().as_str() {
            "WARM" => Some(Self::Warm),
            "COLD" => Some(Self::Cold),
            "EMERGENCY" => Some(Self::Emergency),
            "UNKNOWN" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for NextStartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Autostart override and next start type read from a global catalog.
///
/// `None` means the value was not reported, which is the case for a catalog
/// that does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogAutoStartState {
    pub autostart_override: Option<AutoStartOverride>,
    pub next_start: Option<NextStartType>,
}

/// Existence and organization of a data set at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetState {
    pub exists: bool,
    pub data_set_organization: DataSetOrganization,
}

impl DataSetState {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn present(organization: DataSetOrganization) -> Self {
        Self {
            exists: true,
            data_set_organization: organization,
        }
    }
}

/// One external command invocation, kept for audit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub name: String,
    pub rc: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionRecord {
    pub fn new(
        name: impl Into<String>,
        rc: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            rc,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// Data set disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Disposition {
    #[default]
    Shr,
    Old,
    Mod,
    New,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shr => "SHR",
            Self::Old => "OLD",
            Self::Mod => "MOD",
            Self::New => "NEW",
        }
    }
}

/// Attributes of a new sequential data set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialAllocation {
    pub space: SpaceAllocation,
    pub record_format: String,
    pub record_length: u32,
    pub block_size: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
}

/// A DD pointing at a cataloged data set, or allocating a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetDefinition {
    pub name: String,
    pub disposition: Disposition,
    /// Present only for `DISP=NEW`, where the data set is cataloged on
    /// success and deleted on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation: Option<SequentialAllocation>,
}

impl DataSetDefinition {
    pub fn shared(name: impl Into<String>) -> Self {
        Self::existing(name, Disposition::Shr)
    }

    pub fn existing(name: impl Into<String>, disposition: Disposition) -> Self {
        Self {
            name: name.into(),
            disposition,
            allocation: None,
        }
    }

    /// A new variable-blocked sequential data set, as used for auxiliary
    /// trace and transaction dump data sets.
    pub fn sequential(name: impl Into<String>, space: SpaceAllocation, volumes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            disposition: Disposition::New,
            allocation: Some(SequentialAllocation {
                space,
                record_format: "VB".to_string(),
                record_length: 4092,
                block_size: 4096,
                volumes,
            }),
        }
    }

    /// DD statement keywords for this data set.
    ///
    /// ```
    /// use cics_provision_core::{DataSetDefinition, join_parameters};
    ///
    /// let dd = DataSetDefinition::shared("CICSTS61.CICS.SDFHLOAD");
    /// assert_eq!(join_parameters(&dd.jcl_parameters()), "DSN=CICSTS61.CICS.SDFHLOAD,DISP=SHR");
    /// ```
    pub fn jcl_parameters(&self) -> Parameters {
        let mut parameters = Parameters::new().with("DSN", self.name.to_uppercase());
        match &self.allocation {
            None => parameters.push("DISP", self.disposition.as_str()),
            Some(allocation) => {
                parameters.push("DISP", format!("({},CATLG,DELETE)", self.disposition.as_str()));
                for (key, value) in allocation.space.jcl_parameters().iter() {
                    parameters.push(key, value);
                }
                parameters.push("DSORG", "PS");
                parameters.push("RECFM", allocation.record_format.as_str());
                parameters.push("LRECL", allocation.record_length.to_string());
                parameters.push("BLKSIZE", allocation.block_size.to_string());
                match allocation.volumes.as_slice() {
                    [] => {}
                    [volume] => parameters.push("VOL", format!("SER={volume}")),
                    volumes => parameters.push("VOL", format!("SER=({})", volumes.join(","))),
                }
            }
        }
        parameters
    }
}

/// What a program's DD is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DdKind {
    DataSet(DataSetDefinition),
    Concatenation(Vec<DataSetDefinition>),
    /// In-stream input lines.
    Input(Vec<String>),
    /// Output captured into the response (`SYSOUT=*` in JCL).
    Output,
}

/// A named DD binding for a program invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdStatement {
    pub name: String,
    pub kind: DdKind,
}

impl DdStatement {
    pub fn data_set(name: impl Into<String>, definition: DataSetDefinition) -> Self {
        Self {
            name: name.into(),
            kind: DdKind::DataSet(definition),
        }
    }

    pub fn input(name: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: DdKind::Input(lines),
        }
    }

    /// In-stream input from a block of text, one line per card.
    pub fn input_text(name: impl Into<String>, text: &str) -> Self {
        Self::input(name, text.lines().map(str::to_string).collect())
    }

    pub fn output(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DdKind::Output,
        }
    }

    fn to_dd_entry(&self) -> DdEntry {
        let content = match &self.kind {
            DdKind::DataSet(definition) => DdContent::Parameters(definition.jcl_parameters()),
            DdKind::Concatenation(members) => DdContent::Concatenation(
                members.iter().map(DataSetDefinition::jcl_parameters).collect(),
            ),
            DdKind::Input(lines) => DdContent::Instream(InstreamData {
                lines: lines.clone(),
                ..InstreamData::default()
            }),
            DdKind::Output => DdContent::Parameters(Parameters::new().with("SYSOUT", "*")),
        };
        DdEntry {
            name: self.name.to_uppercase(),
            content,
        }
    }
}

/// A batch program run with its DD bindings.
///
/// This is what the command execution collaborator receives. Any invocation
/// can also be rendered as a standalone job with [`to_job`](Self::to_job).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramInvocation {
    pub program: String,
    /// Run through the APF-authorized launcher.
    pub authorized: bool,
    /// Program parameter string (`PARM=` in JCL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parm: Option<String>,
    pub dds: Vec<DdStatement>,
}

impl ProgramInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            authorized: false,
            parm: None,
            dds: Vec::new(),
        }
    }

    pub fn authorized(mut self) -> Self {
        self.authorized = true;
        self
    }

    pub fn with_parm(mut self, parm: impl Into<String>) -> Self {
        self.parm = Some(parm.into());
        self
    }

    pub fn with_dd(mut self, dd: DdStatement) -> Self {
        self.dds.push(dd);
        self
    }

    /// Wraps the invocation in a one-step job.
    pub fn to_job(&self, job_name: &str) -> Result<JobDescription, ValidationError> {
        let mut step = ExecStep::new("STEP1").with_program(self.program.as_str());
        if let Some(parm) = &self.parm {
            step = if parm.contains([',', ' ', '=']) {
                step.with_parm(format!("'{}'", parm.replace('\'', "''")))
            } else {
                step.with_parm(parm.as_str())
            };
        }
        for dd in &self.dds {
            step = step.with_dd(dd.to_dd_entry());
        }
        let job = JobDescription::new(JobCard::new(job_name)).with_step(step);
        // Surface name errors now rather than at render time.
        job.render()?;
        Ok(job)
    }
}
