use std::fs;

use cics_provision_config::{ConfigError, ProvisionConfig, RegionDataSet, render_region_jcl};
use tempfile::TempDir;

const REGION_YAML: &str = "\
applid: IYK2ZAB1
job_parameters:
  job_name: STRTZAB1
  accounting_information:
    pano: '1234'
  programmer_name: CICS TEAM
  class: A
  msgclass: X
cics_data_sets:
  template: CICSTS61.CICS.<< lib_name >>
le_data_sets:
  template: CEE.<< lib_name >>
cpsm_data_sets:
  template: CICSTS61.CPSM.<< lib_name >>
region_data_sets:
  template: REGIONS.IYK2ZAB1.<< data_set_name >>
  dfhcsd:
    dsn: SHARED.CICS.DFHCSD
steplib:
  top_data_sets:
    - USER.AUTHLIB
dfhrpl:
  data_sets:
    - USER.LOADLIB
output_data_sets:
  default_sysout_class: A
  msgusr:
    sysout: B
  sysudump:
    omit: true
sit_parameters:
  start: INITIAL
  sit: 6$
  stntrxx:
    ap: 1
    sm: 3
";

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("region.yml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_region_jcl_from_yaml_file() {
    let dir = TempDir::new().unwrap();
    let config = ProvisionConfig::load(write_config(&dir, REGION_YAML)).unwrap();
    let jcl = render_region_jcl(&config).unwrap();
    let lines: Vec<&str> = jcl.lines().collect();

    assert_eq!(
        lines[0],
        "//STRTZAB1 JOB 1234,'CICS TEAM',CLASS=A,MSGCLASS=X"
    );
    assert_eq!(lines[1], "//         EXEC PGM=DFHSIP,PARM=SI");
    assert_eq!(
        &lines[2..9],
        [
            "//STEPLIB  DD DSN=USER.AUTHLIB,DISP=SHR",
            "//         DD DSN=CICSTS61.CICS.SDFHAUTH,DISP=SHR",
            "//         DD DSN=CICSTS61.CICS.SDFHLIC,DISP=SHR",
            "//         DD DSN=CICSTS61.CPSM.SEYUAUTH,DISP=SHR",
            "//         DD DSN=CEE.SCEERUN,DISP=SHR",
            "//         DD DSN=CEE.SCEERUN2,DISP=SHR",
            "//DFHRPL   DD DSN=CICSTS61.CICS.SDFHLOAD,DISP=SHR",
        ]
    );
    assert!(lines.contains(&"//DFHCSD   DD DSN=SHARED.CICS.DFHCSD,DISP=SHR"));
    assert!(lines.contains(&"//DFHLCD   DD DSN=REGIONS.IYK2ZAB1.DFHLCD,DISP=SHR"));
    assert!(lines.contains(&"//         DD DSN=USER.LOADLIB,DISP=SHR"));
    assert!(lines.contains(&"//MSGUSR   DD SYSOUT=B"));
    assert!(lines.contains(&"//CEEMSG   DD SYSOUT=A"));
    assert!(!lines.iter().any(|line| line.starts_with("//SYSUDUMP")));

    let sysin = lines.iter().position(|line| *line == "//SYSIN    DD *").unwrap();
    assert_eq!(
        &lines[sysin + 1..],
        [
            "START=INITIAL",
            "SIT=6$",
            "APPLID=IYK2ZAB1",
            "STNTRAP=1",
            "STNTRSM=3",
            "/*",
            "//",
        ]
    );
}

#[test]
fn test_saved_config_round_trips_to_same_jcl() {
    let dir = TempDir::new().unwrap();
    let config = ProvisionConfig::load(write_config(&dir, REGION_YAML)).unwrap();
    let saved = dir.path().join("saved.yml");
    config.save(&saved).unwrap();

    let reloaded = ProvisionConfig::load(&saved).unwrap();
    assert_eq!(reloaded, config);
    assert_eq!(
        render_region_jcl(&reloaded).unwrap(),
        render_region_jcl(&config).unwrap()
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = ProvisionConfig::load(dir.path().join("absent.yml")).unwrap_err();
    assert!(matches!(err, ConfigError::IoError(_)));
}

#[test]
fn test_invalid_yaml_is_yaml_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "applid: [unterminated");
    let err = ProvisionConfig::load(path).unwrap_err();
    assert!(matches!(err, ConfigError::YamlError(_)));
}

#[test]
fn test_start_data_set_is_resolved_but_not_a_dd() {
    let dir = TempDir::new().unwrap();
    let config = ProvisionConfig::load(write_config(&dir, REGION_YAML)).unwrap();
    assert_eq!(
        config.region_data_set(RegionDataSet::Dfhstart).unwrap(),
        "REGIONS.IYK2ZAB1.DFHSTART"
    );
    let jcl = render_region_jcl(&config).unwrap();
    assert!(!jcl.contains("//DFHSTART"));
}
