//! IDCAMS command rendering for CICS VSAM data sets.
//!
//! A [`VsamDefinition`] carries the name, space and volumes of a cluster
//! plus ordered `CLUSTER`, `DATA` and optional `INDEX` clause parameters.
//! Constructors supply the parameters each CICS data set kind needs; callers
//! may replace any clause wholesale before rendering.
//!
//! # Examples
//!
//! ```
//! use cics_provision_core::*;
//!
//! let def = VsamDefinition::intrapartition(
//!     "CICS.DFHINTRA",
//!     SpaceAllocation::new(SpaceUnit::Megabytes, 100, 10),
//!     vec![],
//! );
//! assert_eq!(
//!     def.define_command(),
//!     "\n    DEFINE CLUSTER (NAME(CICS.DFHINTRA) -\n    MEGABYTES(100 10) -\n    RECORDSIZE(1529 1529) -\n    NONINDEXED -\n    CONTROLINTERVALSIZE(1536)) -\n    DATA (NAME(CICS.DFHINTRA.DATA))\n    "
//! );
//! ```

use serde::{Deserialize, Serialize};

use crate::format::Parameters;
use crate::types::SpaceAllocation;

const CLAUSE_SEPARATOR: &str = " -\n    ";

/// Recovery logging for a recoverable CSD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecoveryLog {
    None,
    Undo,
    All,
}

impl RecoveryLog {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Undo => "UNDO",
            Self::All => "ALL",
        }
    }
}

/// A VSAM cluster to be defined with IDCAMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VsamDefinition {
    pub name: String,
    pub space: SpaceAllocation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    pub cluster: Parameters,
    pub data: Parameters,
    /// `None` for non-indexed clusters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Parameters>,
}

impl VsamDefinition {
    /// A cluster with no clause parameters.
    pub fn new(name: impl Into<String>, space: SpaceAllocation, volumes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            space,
            volumes,
            cluster: Parameters::new(),
            data: Parameters::new(),
            index: None,
        }
    }

    fn keyed(
        name: impl Into<String>,
        space: SpaceAllocation,
        volumes: Vec<String>,
        key_layout: KeyedLayout,
    ) -> Self {
        let mut cluster = Parameters::new()
            .with("RECORDSIZE", key_layout.record_size)
            .with("INDEXED", "")
            .with("KEYS", key_layout.keys)
            .with("FREESPACE", key_layout.free_space)
            .with("SHAREOPTIONS", key_layout.share_options)
            .with("REUSE", "");
        if let Some(log) = key_layout.log {
            cluster.push("LOG", log);
        }
        Self {
            cluster,
            data: Parameters::new().with("CONTROLINTERVALSIZE", key_layout.control_interval),
            index: Some(Parameters::new()),
            ..Self::new(name, space, volumes)
        }
    }

    /// Global catalog (DFHGCD).
    pub fn global_catalog(name: impl Into<String>, space: SpaceAllocation, volumes: Vec<String>) -> Self {
        Self::keyed(
            name,
            space,
            volumes,
            KeyedLayout {
                record_size: "4089 32760",
                keys: "52 0",
                free_space: "10 10",
                share_options: "2",
                log: None,
                control_interval: "32768",
            },
        )
    }

    /// Local catalog (DFHLCD).
    pub fn local_catalog(name: impl Into<String>, space: SpaceAllocation, volumes: Vec<String>) -> Self {
        Self::keyed(
            name,
            space,
            volumes,
            KeyedLayout {
                record_size: "70 2041",
                keys: "52 0",
                free_space: "10 10",
                share_options: "2",
                log: None,
                control_interval: "2048",
            },
        )
    }

    /// CICS system definition file (DFHCSD).
    ///
    /// `LOGSTREAMID` is only written when the log is `ALL`.
    pub fn csd(
        name: impl Into<String>,
        space: SpaceAllocation,
        volumes: Vec<String>,
        log: Option<RecoveryLog>,
        logstream_id: Option<&str>,
    ) -> Self {
        let mut definition = Self::keyed(
            name,
            space,
            volumes,
            KeyedLayout {
                record_size: "200 2000",
                keys: "22 0",
                free_space: "10 10",
                share_options: "2",
                log: None,
                control_interval: "8192",
            },
        );
        if let Some(log) = log {
            definition.cluster.push("LOG", log.as_str());
            if let (RecoveryLog::All, Some(logstream_id)) = (log, logstream_id) {
                definition.cluster.push("LOGSTREAMID", logstream_id);
            }
        }
        definition
    }

    /// Local request queue (DFHLRQ).
    pub fn local_request_queue(
        name: impl Into<String>,
        space: SpaceAllocation,
        volumes: Vec<String>,
    ) -> Self {
        Self::keyed(
            name,
            space,
            volumes,
            KeyedLayout {
                record_size: "2232 2400",
                keys: "40 0",
                free_space: "0 10",
                share_options: "2 3",
                log: Some("UNDO"),
                control_interval: "2560",
            },
        )
    }

    /// Auxiliary temporary storage (DFHTEMP).
    pub fn auxiliary_temp_storage(
        name: impl Into<String>,
        space: SpaceAllocation,
        volumes: Vec<String>,
    ) -> Self {
        Self {
            cluster: Parameters::new()
                .with("RECORDSIZE", "4089 4089")
                .with("NONINDEXED", "")
                .with("CONTROLINTERVALSIZE", "4096")
                .with("SHAREOPTIONS", "2 3"),
            data: Parameters::new().with("UNIQUE", ""),
            ..Self::new(name, space, volumes)
        }
    }

    /// Transient data intrapartition (DFHINTRA).
    pub fn intrapartition(name: impl Into<String>, space: SpaceAllocation, volumes: Vec<String>) -> Self {
        Self {
            cluster: Parameters::new()
                .with("RECORDSIZE", "1529 1529")
                .with("NONINDEXED", "")
                .with("CONTROLINTERVALSIZE", "1536"),
            ..Self::new(name, space, volumes)
        }
    }

    /// Renders the `DEFINE CLUSTER` command as IDCAMS SYSIN text.
    pub fn define_command(&self) -> String {
        let mut command = String::from("\n    DEFINE");
        command.push_str(&format!(
            " CLUSTER (NAME({}) -\n    {}({} {}){}{})",
            self.name,
            self.space.unit.idcams_keyword(),
            self.space.primary,
            self.space.secondary,
            clause_parameters(&self.cluster),
            volumes_clause(&self.volumes),
        ));
        command.push_str(&format!(
            "{CLAUSE_SEPARATOR}DATA (NAME({}.DATA){})",
            self.name,
            clause_parameters(&self.data)
        ));
        if let Some(index) = &self.index {
            command.push_str(&format!(
                "{CLAUSE_SEPARATOR}INDEX (NAME({}.INDEX){})",
                self.name,
                clause_parameters(index)
            ));
        }
        command.push_str("\n    ");
        command
    }
}

struct KeyedLayout {
    record_size: &'static str,
    keys: &'static str,
    free_space: &'static str,
    share_options: &'static str,
    log: Option<&'static str>,
    control_interval: &'static str,
}

/// Renders the IDCAMS `DELETE` command for a data set.
pub fn delete_command(name: &str) -> String {
    format!("\n    DELETE {name}\n    ")
}

fn clause_parameters(parameters: &Parameters) -> String {
    parameters
        .iter()
        .map(|(key, value)| {
            if value.is_empty() {
                format!("{CLAUSE_SEPARATOR}{key}")
            } else {
                format!("{CLAUSE_SEPARATOR}{key}({value})")
            }
        })
        .collect()
}

fn volumes_clause(volumes: &[String]) -> String {
    if volumes.is_empty() {
        String::new()
    } else {
        format!("{CLAUSE_SEPARATOR}VOLUMES({})", volumes.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SpaceUnit;

    fn space(unit: SpaceUnit, primary: u32, secondary: u32) -> SpaceAllocation {
        SpaceAllocation::new(unit, primary, secondary)
    }

    #[test]
    fn test_global_catalog_define() {
        let def = VsamDefinition::global_catalog("ANSI.TEST.DFHGCD", space(SpaceUnit::Megabytes, 5, 1), vec![]);
        assert_eq!(
            def.define_command(),
            "
    DEFINE CLUSTER (NAME(ANSI.TEST.DFHGCD) -
    MEGABYTES(5 1) -
    RECORDSIZE(4089 32760) -
    INDEXED -
    KEYS(52 0) -
    FREESPACE(10 10) -
    SHAREOPTIONS(2) -
    REUSE) -
    DATA (NAME(ANSI.TEST.DFHGCD.DATA) -
    CONTROLINTERVALSIZE(32768)) -
    INDEX (NAME(ANSI.TEST.DFHGCD.INDEX))
    "
        );
    }

    #[test]
    fn test_local_catalog_define_with_volumes() {
        let def = VsamDefinition::local_catalog(
            "ANSI.TEST.DFHLCD",
            space(SpaceUnit::Records, 200, 10),
            vec!["vserv1".to_string(), "vserv2".to_string()],
        );
        assert_eq!(
            def.define_command(),
            "
    DEFINE CLUSTER (NAME(ANSI.TEST.DFHLCD) -
    RECORDS(200 10) -
    RECORDSIZE(70 2041) -
    INDEXED -
    KEYS(52 0) -
    FREESPACE(10 10) -
    SHAREOPTIONS(2) -
    REUSE -
    VOLUMES(vserv1 vserv2)) -
    DATA (NAME(ANSI.TEST.DFHLCD.DATA) -
    CONTROLINTERVALSIZE(2048)) -
    INDEX (NAME(ANSI.TEST.DFHLCD.INDEX))
    "
        );
    }

    #[test]
    fn test_single_volume_rendered_bare() {
        let def = VsamDefinition::local_catalog(
            "ANSI.TEST.DFHLCD",
            space(SpaceUnit::Cylinders, 1, 1),
            vec!["VOL001".to_string()],
        );
        assert!(def.define_command().contains(" -\n    VOLUMES(VOL001))"));
    }

    #[test]
    fn test_csd_log_all_with_logstream() {
        let def = VsamDefinition::csd(
            "ANSI.TEST.DFHCSD",
            space(SpaceUnit::Megabytes, 4, 1),
            vec![],
            Some(RecoveryLog::All),
            Some("LOG.STREAM.ID"),
        );
        assert_eq!(
            def.define_command(),
            "
    DEFINE CLUSTER (NAME(ANSI.TEST.DFHCSD) -
    MEGABYTES(4 1) -
    RECORDSIZE(200 2000) -
    INDEXED -
    KEYS(22 0) -
    FREESPACE(10 10) -
    SHAREOPTIONS(2) -
    REUSE -
    LOG(ALL) -
    LOGSTREAMID(LOG.STREAM.ID)) -
    DATA (NAME(ANSI.TEST.DFHCSD.DATA) -
    CONTROLINTERVALSIZE(8192)) -
    INDEX (NAME(ANSI.TEST.DFHCSD.INDEX))
    "
        );
    }

    #[test]
    fn test_csd_logstream_ignored_unless_log_all() {
        let def = VsamDefinition::csd(
            "CSD",
            space(SpaceUnit::Megabytes, 4, 1),
            vec![],
            Some(RecoveryLog::Undo),
            Some("LOG.STREAM.ID"),
        );
        let command = def.define_command();
        assert!(command.contains("LOG(UNDO)"));
        assert!(!command.contains("LOGSTREAMID"));
    }

    #[test]
    fn test_local_request_queue_define() {
        let def = VsamDefinition::local_request_queue("ANSI.TEST.DFHLRQ", space(SpaceUnit::Megabytes, 4, 1), vec![]);
        assert_eq!(
            def.define_command(),
            "
    DEFINE CLUSTER (NAME(ANSI.TEST.DFHLRQ) -
    MEGABYTES(4 1) -
    RECORDSIZE(2232 2400) -
    INDEXED -
    KEYS(40 0) -
    FREESPACE(0 10) -
    SHAREOPTIONS(2 3) -
    REUSE -
    LOG(UNDO)) -
    DATA (NAME(ANSI.TEST.DFHLRQ.DATA) -
    CONTROLINTERVALSIZE(2560)) -
    INDEX (NAME(ANSI.TEST.DFHLRQ.INDEX))
    "
        );
    }

    #[test]
    fn test_auxiliary_temp_storage_define() {
        let def = VsamDefinition::auxiliary_temp_storage(
            "ANSI.TEST.DFHTEMP",
            space(SpaceUnit::Megabytes, 200, 10),
            vec![],
        );
        assert_eq!(
            def.define_command(),
            "
    DEFINE CLUSTER (NAME(ANSI.TEST.DFHTEMP) -
    MEGABYTES(200 10) -
    RECORDSIZE(4089 4089) -
    NONINDEXED -
    CONTROLINTERVALSIZE(4096) -
    SHAREOPTIONS(2 3)) -
    DATA (NAME(ANSI.TEST.DFHTEMP.DATA) -
    UNIQUE)
    "
        );
    }

    #[test]
    fn test_clause_override() {
        let mut def = VsamDefinition::global_catalog("GCD", space(SpaceUnit::Tracks, 10, 2), vec![]);
        def.data = Parameters::new().with("CONTROLINTERVALSIZE", "16384");
        def.index = None;
        let command = def.define_command();
        assert!(command.contains("TRACKS(10 2)"));
        assert!(command.contains("CONTROLINTERVALSIZE(16384)"));
        assert!(!command.contains("INDEX (NAME"));
    }

    #[test]
    fn test_delete_command() {
        assert_eq!(delete_command("ANSI.TEST.DFHGCD"), "\n    DELETE ANSI.TEST.DFHGCD\n    ");
    }
}
