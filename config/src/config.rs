//! Provisioning configuration for one CICS region.
//!
//! Defines the YAML schema describing a region: its APPLID and job card,
//! the CICS, Language Environment and CPSM libraries, the per-region data
//! sets, JES output classes and SIT overrides. Library and data set names
//! can be given one by one or through a `<< variable >>` template.
//!
//! # Example YAML
//!
//! ```yaml
//! applid: CICSA
//! job_parameters:
//!   class: A
//!   msgclass: X
//! cics_data_sets:
//!   template: CICSTS61.CICS.<< lib_name >>
//! le_data_sets:
//!   template: CEE.<< lib_name >>
//! region_data_sets:
//!   template: REGIONS.CICSA.<< data_set_name >>
//!   dfhcsd:
//!     dsn: SHARED.CICS.DFHCSD
//! output_data_sets:
//!   default_sysout_class: A
//!   logusr:
//!     omit: true
//! sit_parameters:
//!   start: AUTO
//!   sit: 6$
//! ```

use std::fmt;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use cics_provision_core::{
    AccountingInformation, CsdupOptions, MsgLevel, RecoveryLog, SitParameters, SpaceAllocation,
    SpaceUnit, validate_qualifier,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::template::{DATA_SET_NAME_VARIABLE, LIB_NAME_VARIABLE, check_data_set, resolve_data_set};

/// Keyword parameters of the region's JOB statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobParameters {
    /// Defaults to the APPLID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounting_information: Option<AccountingInformation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub programmer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memlimit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msgclass: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msglevel: Option<MsgLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Libraries shipped with CICS and Language Environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Library {
    Sdfhload,
    Sdfhauth,
    Sdfhlic,
    Sceecics,
    Sceerun,
    Sceerun2,
    Seyuauth,
    Seyuload,
}

impl Library {
    pub fn key(self) -> &'static str {
        match self {
            Self::Sdfhload => "sdfhload",
            Self::Sdfhauth => "sdfhauth",
            Self::Sdfhlic => "sdfhlic",
            Self::Sceecics => "sceecics",
            Self::Sceerun => "sceerun",
            Self::Sceerun2 => "sceerun2",
            Self::Seyuauth => "seyuauth",
            Self::Seyuload => "seyuload",
        }
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CicsDataSets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdfhload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdfhauth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdfhlic: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LeDataSets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sceecics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sceerun: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sceerun2: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CpsmDataSets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seyuauth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seyuload: Option<String>,
}

/// Extra libraries around the generated STEPLIB or DFHRPL concatenation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibraryConcatenation {
    /// Placed before the CICS and LE libraries.
    pub top_data_sets: Vec<String>,
    /// Placed after them.
    pub data_sets: Vec<String>,
}

/// Data sets owned by one region, keyed by their DD name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionDataSet {
    Dfhauxt,
    Dfhbuxt,
    Dfhcsd,
    Dfhgcd,
    Dfhintra,
    Dfhlcd,
    Dfhlrq,
    Dfhtemp,
    Dfhdmpa,
    Dfhdmpb,
    /// Where the generated start JCL is kept. Not a DD of the region.
    Dfhstart,
}

impl RegionDataSet {
    /// DD order in the start JCL.
    pub const REGION_DDS: [Self; 10] = [
        Self::Dfhauxt,
        Self::Dfhbuxt,
        Self::Dfhcsd,
        Self::Dfhgcd,
        Self::Dfhintra,
        Self::Dfhlcd,
        Self::Dfhlrq,
        Self::Dfhtemp,
        Self::Dfhdmpa,
        Self::Dfhdmpb,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Dfhauxt => "dfhauxt",
            Self::Dfhbuxt => "dfhbuxt",
            Self::Dfhcsd => "dfhcsd",
            Self::Dfhgcd => "dfhgcd",
            Self::Dfhintra => "dfhintra",
            Self::Dfhlcd => "dfhlcd",
            Self::Dfhlrq => "dfhlrq",
            Self::Dfhtemp => "dfhtemp",
            Self::Dfhdmpa => "dfhdmpa",
            Self::Dfhdmpb => "dfhdmpb",
            Self::Dfhstart => "dfhstart",
        }
    }

    pub fn ddname(self) -> String {
        self.key().to_uppercase()
    }
}

impl fmt::Display for RegionDataSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One region data set: its name plus allocation overrides used when it
/// is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegionDataSetEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dsn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_primary: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_secondary: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_type: Option<SpaceUnit>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    /// CSD only: recovery logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<RecoveryLog>,
    /// CSD only: log stream when `log` is `ALL`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logstream_id: Option<String>,
}

impl RegionDataSetEntry {
    /// `default` with any configured overrides applied. A primary given
    /// without a unit keeps the default unit.
    pub fn space(&self, default: SpaceAllocation) -> SpaceAllocation {
        SpaceAllocation::new(
            self.space_type.unwrap_or(default.unit),
            self.space_primary.unwrap_or(default.primary),
            self.space_secondary.unwrap_or(default.secondary),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegionDataSets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dfhauxt: Option<RegionDataSetEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dfhbuxt: Option<RegionDataSetEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dfhcsd: Option<RegionDataSetEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dfhgcd: Option<RegionDataSetEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dfhintra: Option<RegionDataSetEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dfhlcd: Option<RegionDataSetEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dfhlrq: Option<RegionDataSetEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dfhtemp: Option<RegionDataSetEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dfhdmpa: Option<RegionDataSetEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dfhdmpb: Option<RegionDataSetEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dfhstart: Option<RegionDataSetEntry>,
}

impl RegionDataSets {
    pub fn entry(&self, data_set: RegionDataSet) -> Option<&RegionDataSetEntry> {
        match data_set {
            RegionDataSet::Dfhauxt => self.dfhauxt.as_ref(),
            RegionDataSet::Dfhbuxt => self.dfhbuxt.as_ref(),
            RegionDataSet::Dfhcsd => self.dfhcsd.as_ref(),
            RegionDataSet::Dfhgcd => self.dfhgcd.as_ref(),
            RegionDataSet::Dfhintra => self.dfhintra.as_ref(),
            RegionDataSet::Dfhlcd => self.dfhlcd.as_ref(),
            RegionDataSet::Dfhlrq => self.dfhlrq.as_ref(),
            RegionDataSet::Dfhtemp => self.dfhtemp.as_ref(),
            RegionDataSet::Dfhdmpa => self.dfhdmpa.as_ref(),
            RegionDataSet::Dfhdmpb => self.dfhdmpb.as_ref(),
            RegionDataSet::Dfhstart => self.dfhstart.as_ref(),
        }
    }
}

/// A JES output class: one letter, digit or `*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SysoutClass(String);

impl SysoutClass {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SysoutClass {
    fn default() -> Self {
        Self("*".to_string())
    }
}

impl TryFrom<String> for SysoutClass {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c == '*' || c.is_ascii_alphanumeric() => {
                Ok(Self(c.to_ascii_uppercase().to_string()))
            }
            _ => Err(ConfigError::InvalidArgument {
                value,
                kind: "sysout_class",
            }),
        }
    }
}

impl From<SysoutClass> for String {
    fn from(class: SysoutClass) -> Self {
        class.0
    }
}

/// JES output DDs the region writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputDd {
    Ceemsg,
    Ceeout,
    Msgusr,
    Sysprint,
    Sysudump,
    Sysabend,
    Sysout,
    Dfhcxrf,
    Logusr,
}

impl OutputDd {
    pub const ALL: [Self; 9] = [
        Self::Ceemsg,
        Self::Ceeout,
        Self::Msgusr,
        Self::Sysprint,
        Self::Sysudump,
        Self::Sysabend,
        Self::Sysout,
        Self::Dfhcxrf,
        Self::Logusr,
    ];

    pub fn ddname(self) -> &'static str {
        match self {
            Self::Ceemsg => "CEEMSG",
            Self::Ceeout => "CEEOUT",
            Self::Msgusr => "MSGUSR",
            Self::Sysprint => "SYSPRINT",
            Self::Sysudump => "SYSUDUMP",
            Self::Sysabend => "SYSABEND",
            Self::Sysout => "SYSOUT",
            Self::Dfhcxrf => "DFHCXRF",
            Self::Logusr => "LOGUSR",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputDataSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sysout: Option<SysoutClass>,
    /// Leaves the DD out of the JCL.
    pub omit: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputDataSets {
    pub default_sysout_class: SysoutClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ceemsg: Option<OutputDataSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ceeout: Option<OutputDataSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msgusr: Option<OutputDataSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sysprint: Option<OutputDataSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sysudump: Option<OutputDataSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sysabend: Option<OutputDataSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sysout: Option<OutputDataSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dfhcxrf: Option<OutputDataSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logusr: Option<OutputDataSet>,
}

impl OutputDataSets {
    pub fn entry(&self, dd: OutputDd) -> Option<&OutputDataSet> {
        match dd {
            OutputDd::Ceemsg => self.ceemsg.as_ref(),
            OutputDd::Ceeout => self.ceeout.as_ref(),
            OutputDd::Msgusr => self.msgusr.as_ref(),
            OutputDd::Sysprint => self.sysprint.as_ref(),
            OutputDd::Sysudump => self.sysudump.as_ref(),
            OutputDd::Sysabend => self.sysabend.as_ref(),
            OutputDd::Sysout => self.sysout.as_ref(),
            OutputDd::Dfhcxrf => self.dfhcxrf.as_ref(),
            OutputDd::Logusr => self.logusr.as_ref(),
        }
    }

    /// The class for `dd`, or `None` when it is omitted.
    pub fn class_for(&self, dd: OutputDd) -> Option<&SysoutClass> {
        match self.entry(dd) {
            Some(entry) if entry.omit => None,
            Some(OutputDataSet {
                sysout: Some(class),
                ..
            }) => Some(class),
            _ => Some(&self.default_sysout_class),
        }
    }
}

/// Everything needed to provision and start one CICS region.
///
/// # Examples
///
/// ```
/// use cics_provision_config::ProvisionConfig;
///
/// let config: ProvisionConfig = serde_yaml::from_str(
///     "applid: CICSA\ncics_data_sets:\n  template: CICS.<< lib_name >>\n",
/// )
/// .unwrap();
/// config.validate().unwrap();
/// assert_eq!(config.job_name(), "CICSA");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvisionConfig {
    pub applid: String,
    #[serde(default)]
    pub job_parameters: JobParameters,
    #[serde(default)]
    pub cics_data_sets: CicsDataSets,
    #[serde(default)]
    pub le_data_sets: LeDataSets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpsm_data_sets: Option<CpsmDataSets>,
    #[serde(default)]
    pub region_data_sets: RegionDataSets,
    #[serde(default)]
    pub steplib: LibraryConcatenation,
    #[serde(default)]
    pub dfhrpl: LibraryConcatenation,
    #[serde(default)]
    pub output_data_sets: OutputDataSets,
    /// Absent leaves the region on its default SIT: no `PARM=SI`, no SYSIN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sit_parameters: Option<SitParameters>,
    #[serde(default)]
    pub csdup: CsdupOptions,
}

impl ProvisionConfig {
    /// A configuration with only an APPLID.
    pub fn new(applid: impl Into<String>) -> Self {
        Self {
            applid: applid.into(),
            job_parameters: JobParameters::default(),
            cics_data_sets: CicsDataSets::default(),
            le_data_sets: LeDataSets::default(),
            cpsm_data_sets: None,
            region_data_sets: RegionDataSets::default(),
            steplib: LibraryConcatenation::default(),
            dfhrpl: LibraryConcatenation::default(),
            output_data_sets: OutputDataSets::default(),
            sit_parameters: None,
            csdup: CsdupOptions::default(),
        }
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ConfigError::IoError) if the file cannot be
    /// read, or [`YamlError`](crate::ConfigError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// The region's job name: the configured one, else the APPLID.
    pub fn job_name(&self) -> &str {
        self.job_parameters
            .job_name
            .as_deref()
            .unwrap_or(&self.applid)
    }

    /// Checks the values that are fixed in the file. Names that come from
    /// templates are checked when they are resolved.
    pub fn validate(&self) -> Result<()> {
        check_qualifier(&self.applid)?;
        if let Some(job_name) = &self.job_parameters.job_name {
            check_qualifier(job_name)?;
        }

        let explicit_libraries = [
            &self.cics_data_sets.sdfhload,
            &self.cics_data_sets.sdfhauth,
            &self.cics_data_sets.sdfhlic,
            &self.le_data_sets.sceecics,
            &self.le_data_sets.sceerun,
            &self.le_data_sets.sceerun2,
        ];
        for name in explicit_libraries.into_iter().flatten() {
            check_data_set(name)?;
        }
        if let Some(cpsm) = &self.cpsm_data_sets {
            for name in [&cpsm.seyuauth, &cpsm.seyuload].into_iter().flatten() {
                check_data_set(name)?;
            }
        }

        for concatenation in [&self.steplib, &self.dfhrpl] {
            for name in concatenation
                .top_data_sets
                .iter()
                .chain(&concatenation.data_sets)
            {
                check_data_set(name)?;
            }
        }

        for data_set in RegionDataSet::REGION_DDS
            .into_iter()
            .chain([RegionDataSet::Dfhstart])
        {
            if let Some(dsn) = self
                .region_data_sets
                .entry(data_set)
                .and_then(|entry| entry.dsn.as_deref())
            {
                check_data_set(dsn)?;
            }
        }
        Ok(())
    }

    /// Fully qualified name of a CICS, LE or CPSM library.
    ///
    /// CPSM libraries resolve only when `cpsm_data_sets` is configured.
    pub fn library(&self, library: Library) -> Result<String> {
        let (explicit, template) = match library {
            Library::Sdfhload => (&self.cics_data_sets.sdfhload, &self.cics_data_sets.template),
            Library::Sdfhauth => (&self.cics_data_sets.sdfhauth, &self.cics_data_sets.template),
            Library::Sdfhlic => (&self.cics_data_sets.sdfhlic, &self.cics_data_sets.template),
            Library::Sceecics => (&self.le_data_sets.sceecics, &self.le_data_sets.template),
            Library::Sceerun => (&self.le_data_sets.sceerun, &self.le_data_sets.template),
            Library::Sceerun2 => (&self.le_data_sets.sceerun2, &self.le_data_sets.template),
            Library::Seyuauth | Library::Seyuload => {
                let cpsm = self.cpsm_data_sets.as_ref().ok_or(ConfigError::MissingDataSet {
                    group: "library",
                    name: library.key().to_string(),
                })?;
                let explicit = if library == Library::Seyuauth {
                    &cpsm.seyuauth
                } else {
                    &cpsm.seyuload
                };
                return resolve_data_set(
                    explicit.as_deref(),
                    cpsm.template.as_deref(),
                    LIB_NAME_VARIABLE,
                    library.key(),
                    "library",
                );
            }
        };
        resolve_data_set(
            explicit.as_deref(),
            template.as_deref(),
            LIB_NAME_VARIABLE,
            library.key(),
            "library",
        )
    }

    /// Fully qualified name of a region data set.
    pub fn region_data_set(&self, data_set: RegionDataSet) -> Result<String> {
        let explicit = self
            .region_data_sets
            .entry(data_set)
            .and_then(|entry| entry.dsn.as_deref());
        resolve_data_set(
            explicit,
            self.region_data_sets.template.as_deref(),
            DATA_SET_NAME_VARIABLE,
            data_set.key(),
            "data set",
        )
    }
}

fn check_qualifier(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ConfigError::InvalidArgument {
            value: value.to_string(),
            kind: "qualifier",
        });
    }
    validate_qualifier(value).map_err(|_| ConfigError::InvalidArgument {
        value: value.to_string(),
        kind: "qualifier",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ProvisionConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = parse("applid: CICSA");
        assert_eq!(config.job_name(), "CICSA");
        assert_eq!(config.output_data_sets.default_sysout_class.as_str(), "*");
        assert!(config.sit_parameters.is_none());
        assert!(config.cpsm_data_sets.is_none());
        assert_eq!(config.csdup, CsdupOptions::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: std::result::Result<ProvisionConfig, _> =
            serde_yaml::from_str("applid: CICSA\nnot_an_option: 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_job_name_override() {
        let config = parse("applid: CICSA\njob_parameters:\n  job_name: strtcics\n  region: 0M");
        assert_eq!(config.job_name(), "strtcics");
        assert_eq!(config.job_parameters.region.as_deref(), Some("0M"));
    }

    #[test]
    fn test_applid_too_long() {
        let config = parse("applid: APPLIDTOOLONG");
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "Invalid argument \"APPLIDTOOLONG\" for type \"qualifier\"."
        );
    }

    #[test]
    fn test_job_name_too_long() {
        let config = parse("applid: CICSA\njob_parameters:\n  job_name: TOOOOLONGGGJOB");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidArgument { kind: "qualifier", .. })
        ));
    }

    #[test]
    fn test_explicit_library_validated() {
        let config = parse("applid: CICSA\ncics_data_sets:\n  sdfhauth: TOOOOLONGG.DATA");
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "Invalid argument \"TOOOOLONGG.DATA\" for type \"data_set_base\"."
        );
    }

    #[test]
    fn test_steplib_library_validated() {
        let config = parse("applid: CICSA\nsteplib:\n  top_data_sets:\n    - LIB.TOOO.LONGQUALIFIER");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_library_resolution() {
        let config = parse(
            "applid: CICSA\ncics_data_sets:\n  template: CICSTS61.CICS.<< lib_name >>\n  sdfhlic: my.sdfhlic",
        );
        assert_eq!(config.library(Library::Sdfhload).unwrap(), "CICSTS61.CICS.SDFHLOAD");
        assert_eq!(config.library(Library::Sdfhlic).unwrap(), "MY.SDFHLIC");
        assert_eq!(
            config.library(Library::Sceerun).unwrap_err().to_string(),
            "No template or library override found for sceerun"
        );
        assert!(config.library(Library::Seyuload).is_err());
    }

    #[test]
    fn test_region_data_set_resolution() {
        let config = parse(
            "applid: CICSA\nregion_data_sets:\n  template: REGIONS.CICSA.<< data_set_name >>\n  dfhcsd:\n    dsn: SHARED.DFHCSD",
        );
        assert_eq!(
            config.region_data_set(RegionDataSet::Dfhgcd).unwrap(),
            "REGIONS.CICSA.DFHGCD"
        );
        assert_eq!(
            config.region_data_set(RegionDataSet::Dfhcsd).unwrap(),
            "SHARED.DFHCSD"
        );
    }

    #[test]
    fn test_space_overrides() {
        let entry = RegionDataSetEntry {
            space_primary: Some(10),
            ..Default::default()
        };
        let space = entry.space(SpaceAllocation::new(SpaceUnit::Records, 200, 5));
        assert_eq!(space, SpaceAllocation::new(SpaceUnit::Records, 10, 5));
    }

    #[test]
    fn test_sysout_class() {
        let config = parse(
            "applid: CICSA\noutput_data_sets:\n  default_sysout_class: a\n  ceemsg:\n    sysout: B\n  logusr:\n    omit: true",
        );
        let outputs = &config.output_data_sets;
        assert_eq!(outputs.class_for(OutputDd::Ceeout).map(SysoutClass::as_str), Some("A"));
        assert_eq!(outputs.class_for(OutputDd::Ceemsg).map(SysoutClass::as_str), Some("B"));
        assert_eq!(outputs.class_for(OutputDd::Logusr), None);
    }

    #[test]
    fn test_invalid_sysout_class() {
        let result: std::result::Result<ProvisionConfig, _> =
            serde_yaml::from_str("applid: CICSA\noutput_data_sets:\n  default_sysout_class: AB");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("region.yml");
        let mut config = ProvisionConfig::new("CICSA");
        config.le_data_sets.template = Some("CEE.<< lib_name >>".to_string());
        config.save(&path).unwrap();

        let loaded = ProvisionConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
