//! Start-region JCL assembly.
//!
//! A region starts as a single-step job running `DFHSIP`. The step carries
//! the STEPLIB and DFHRPL library concatenations, one DD per region data
//! set, the JES output DDs and, when SIT overrides are configured, the
//! overrides as in-stream SYSIN with `PARM=SI`.

use cics_provision_core::{
    DdEntry, ExecStep, JobCard, JobDescription, Parameters, render_sit_parameters,
};
use tracing::debug;

use crate::config::{Library, OutputDd, ProvisionConfig, RegionDataSet};
use crate::error::Result;
use crate::template::check_data_set;

pub const DFHSIP: &str = "DFHSIP";

/// STEPLIB: top libraries, the authorized CICS (and CPSM) libraries, the
/// LE runtime, then the trailing libraries.
pub fn steplib_libraries(config: &ProvisionConfig) -> Result<Vec<String>> {
    let mut libraries = vec![Library::Sdfhauth, Library::Sdfhlic];
    if config.cpsm_data_sets.is_some() {
        libraries.push(Library::Seyuauth);
    }
    libraries.extend([Library::Sceerun, Library::Sceerun2]);
    concatenate(
        config,
        &config.steplib.top_data_sets,
        &libraries,
        &config.steplib.data_sets,
    )
}

/// DFHRPL: top libraries, SDFHLOAD (and SEYULOAD), the LE CICS and runtime
/// libraries, then the trailing libraries.
pub fn dfhrpl_libraries(config: &ProvisionConfig) -> Result<Vec<String>> {
    let mut libraries = vec![Library::Sdfhload];
    if config.cpsm_data_sets.is_some() {
        libraries.push(Library::Seyuload);
    }
    libraries.extend([Library::Sceecics, Library::Sceerun, Library::Sceerun2]);
    concatenate(
        config,
        &config.dfhrpl.top_data_sets,
        &libraries,
        &config.dfhrpl.data_sets,
    )
}

fn concatenate(
    config: &ProvisionConfig,
    top: &[String],
    libraries: &[Library],
    bottom: &[String],
) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(top.len() + libraries.len() + bottom.len());
    for name in top {
        check_data_set(name)?;
        names.push(name.to_uppercase());
    }
    for library in libraries {
        names.push(config.library(*library)?);
    }
    for name in bottom {
        check_data_set(name)?;
        names.push(name.to_uppercase());
    }
    Ok(names)
}

fn shared(dsn: &str) -> Parameters {
    Parameters::new().with("DSN", dsn).with("DISP", "SHR")
}

fn job_card(config: &ProvisionConfig) -> JobCard {
    let parameters = &config.job_parameters;
    let mut card = JobCard::new(config.job_name().to_uppercase());
    if let Some(accounting) = &parameters.accounting_information {
        card = card.with_accounting(accounting.clone());
    }
    if let Some(name) = &parameters.programmer_name {
        card = card.with_programmer_name(name.as_str());
    }
    for (key, value) in [
        ("CLASS", &parameters.class),
        ("MEMLIMIT", &parameters.memlimit),
        ("MSGCLASS", &parameters.msgclass),
    ] {
        if let Some(value) = value {
            card = card.with_parameter(key, value.as_str());
        }
    }
    if let Some(msglevel) = &parameters.msglevel {
        card = card.with_msglevel(msglevel);
    }
    for (key, value) in [("REGION", &parameters.region), ("USER", &parameters.user)] {
        if let Some(value) = value {
            card = card.with_parameter(key, value.as_str());
        }
    }
    card
}

/// The start job for the configured region.
///
/// Every region data set must resolve, explicitly or via the template.
///
/// ```
/// use cics_provision_config::{ProvisionConfig, region_job};
///
/// let config: ProvisionConfig = serde_yaml::from_str(
///     "applid: CICSA
/// cics_data_sets:
///   template: CICS.<< lib_name >>
/// le_data_sets:
///   template: CEE.<< lib_name >>
/// region_data_sets:
///   template: CICSA.<< data_set_name >>
/// ",
/// )
/// .unwrap();
/// let lines = region_job(&config).unwrap().render().unwrap();
/// assert_eq!(lines[0], "//CICSA    JOB");
/// assert_eq!(lines[1], "//         EXEC PGM=DFHSIP");
/// assert_eq!(lines[2], "//STEPLIB  DD DSN=CICS.SDFHAUTH,DISP=SHR");
/// ```
pub fn region_job(config: &ProvisionConfig) -> Result<JobDescription> {
    config.validate()?;

    let mut step = ExecStep::new("").with_program(DFHSIP);
    if config.sit_parameters.is_some() {
        step = step.with_parm("SI");
    }

    let steplib = steplib_libraries(config)?;
    step = step.with_dd(DdEntry::concatenation(
        "STEPLIB",
        steplib.iter().map(|dsn| shared(dsn)).collect(),
    ));
    let dfhrpl = dfhrpl_libraries(config)?;
    step = step.with_dd(DdEntry::concatenation(
        "DFHRPL",
        dfhrpl.iter().map(|dsn| shared(dsn)).collect(),
    ));

    for data_set in RegionDataSet::REGION_DDS {
        let dsn = config.region_data_set(data_set)?;
        step = step.with_dd(DdEntry::parameters(data_set.ddname(), shared(&dsn)));
    }

    for dd in OutputDd::ALL {
        if let Some(class) = config.output_data_sets.class_for(dd) {
            step = step.with_dd(DdEntry::parameters(
                dd.ddname(),
                Parameters::new().with("SYSOUT", class.as_str()),
            ));
        }
    }

    if let Some(sit) = &config.sit_parameters {
        let cards = render_sit_parameters(sit, Some(&config.applid.to_uppercase()))?;
        step = step.with_dd(DdEntry::instream("SYSIN", cards));
    }

    debug!(
        applid = %config.applid,
        job_name = config.job_name(),
        steplib = steplib.len(),
        dfhrpl = dfhrpl.len(),
        "Assembled region start job"
    );
    Ok(JobDescription::new(job_card(config)).with_step(step))
}

/// [`region_job`] rendered as newline-separated card images.
pub fn render_region_jcl(config: &ProvisionConfig) -> Result<String> {
    Ok(region_job(config)?.render_text()?)
}

#[cfg(test)]
mod tests {
    use cics_provision_core::{MsgLevel, SitParameters, ValidationError};

    use super::*;
    use crate::config::{CpsmDataSets, OutputDataSet};
    use crate::error::ConfigError;

    fn config() -> ProvisionConfig {
        serde_yaml::from_str(
            "applid: CICSA
cics_data_sets:
  template: CICSTS61.CICS.<< lib_name >>
le_data_sets:
  template: CEE.<< lib_name >>
region_data_sets:
  template: REGIONS.CICSA.<< data_set_name >>
  dfhstart:
    dsn: REGIONS.CICSA.START
",
        )
        .unwrap()
    }

    #[test]
    fn test_full_start_job() {
        let mut config = config();
        config.job_parameters.class = Some("A".to_string());
        config.job_parameters.msgclass = Some("X".to_string());
        config.sit_parameters = Some(SitParameters::new().with_scalar("start", "AUTO"));

        let jcl = render_region_jcl(&config).unwrap();
        let expected = "\
//CICSA    JOB CLASS=A,MSGCLASS=X
//         EXEC PGM=DFHSIP,PARM=SI
//STEPLIB  DD DSN=CICSTS61.CICS.SDFHAUTH,DISP=SHR
//         DD DSN=CICSTS61.CICS.SDFHLIC,DISP=SHR
//         DD DSN=CEE.SCEERUN,DISP=SHR
//         DD DSN=CEE.SCEERUN2,DISP=SHR
//DFHRPL   DD DSN=CICSTS61.CICS.SDFHLOAD,DISP=SHR
//         DD DSN=CEE.SCEECICS,DISP=SHR
//         DD DSN=CEE.SCEERUN,DISP=SHR
//         DD DSN=CEE.SCEERUN2,DISP=SHR
//DFHAUXT  DD DSN=REGIONS.CICSA.DFHAUXT,DISP=SHR
//DFHBUXT  DD DSN=REGIONS.CICSA.DFHBUXT,DISP=SHR
//DFHCSD   DD DSN=REGIONS.CICSA.DFHCSD,DISP=SHR
//DFHGCD   DD DSN=REGIONS.CICSA.DFHGCD,DISP=SHR
//DFHINTRA DD DSN=REGIONS.CICSA.DFHINTRA,DISP=SHR
//DFHLCD   DD DSN=REGIONS.CICSA.DFHLCD,DISP=SHR
//DFHLRQ   DD DSN=REGIONS.CICSA.DFHLRQ,DISP=SHR
//DFHTEMP  DD DSN=REGIONS.CICSA.DFHTEMP,DISP=SHR
//DFHDMPA  DD DSN=REGIONS.CICSA.DFHDMPA,DISP=SHR
//DFHDMPB  DD DSN=REGIONS.CICSA.DFHDMPB,DISP=SHR
//CEEMSG   DD SYSOUT=*
//CEEOUT   DD SYSOUT=*
//MSGUSR   DD SYSOUT=*
//SYSPRINT DD SYSOUT=*
//SYSUDUMP DD SYSOUT=*
//SYSABEND DD SYSOUT=*
//SYSOUT   DD SYSOUT=*
//DFHCXRF  DD SYSOUT=*
//LOGUSR   DD SYSOUT=*
//SYSIN    DD *
START=AUTO
APPLID=CICSA
/*
//";
        assert_eq!(jcl, expected);
    }

    #[test]
    fn test_no_sit_parameters_means_no_parm_or_sysin() {
        let lines = region_job(&config()).unwrap().render().unwrap();
        assert_eq!(lines[1], "//         EXEC PGM=DFHSIP");
        assert!(!lines.iter().any(|line| line.starts_with("//SYSIN")));
    }

    #[test]
    fn test_job_name_and_card_parameters() {
        let mut config = config();
        config.job_parameters.job_name = Some("strtcics".to_string());
        config.job_parameters.region = Some("0M".to_string());
        config.job_parameters.msglevel = Some(MsgLevel {
            statements: Some(1),
            messages: Some(1),
        });
        config.job_parameters.programmer_name = Some("CICS REGION".to_string());
        let lines = region_job(&config).unwrap().render().unwrap();
        assert!(lines[0].starts_with("//STRTCICS JOB "));
        assert!(lines[0].contains("MSGLEVEL=(1,1),REGION=0M"));
    }

    #[test]
    fn test_libraries_with_cpsm_and_extras() {
        let mut config = config();
        config.cpsm_data_sets = Some(CpsmDataSets {
            template: Some("CPSM.<< lib_name >>".to_string()),
            ..Default::default()
        });
        config.steplib.top_data_sets = vec!["some.top.lib".to_string()];
        config.dfhrpl.data_sets = vec!["user.load".to_string()];

        assert_eq!(
            steplib_libraries(&config).unwrap(),
            [
                "SOME.TOP.LIB",
                "CICSTS61.CICS.SDFHAUTH",
                "CICSTS61.CICS.SDFHLIC",
                "CPSM.SEYUAUTH",
                "CEE.SCEERUN",
                "CEE.SCEERUN2",
            ]
        );
        assert_eq!(
            dfhrpl_libraries(&config).unwrap(),
            [
                "CICSTS61.CICS.SDFHLOAD",
                "CPSM.SEYULOAD",
                "CEE.SCEECICS",
                "CEE.SCEERUN",
                "CEE.SCEERUN2",
                "USER.LOAD",
            ]
        );
    }

    #[test]
    fn test_output_overrides_and_omit() {
        let mut config = config();
        config.output_data_sets.ceemsg = Some(OutputDataSet {
            sysout: Some("B".to_string().try_into().unwrap()),
            omit: false,
        });
        config.output_data_sets.logusr = Some(OutputDataSet {
            sysout: None,
            omit: true,
        });
        let lines = region_job(&config).unwrap().render().unwrap();
        assert!(lines.contains(&"//CEEMSG   DD SYSOUT=B".to_string()));
        assert!(lines.contains(&"//CEEOUT   DD SYSOUT=*".to_string()));
        assert!(!lines.iter().any(|line| line.starts_with("//LOGUSR")));
    }

    #[test]
    fn test_missing_region_data_set() {
        let mut config = config();
        config.region_data_sets.template = None;
        let err = region_job(&config).unwrap_err();
        assert_eq!(err.to_string(), "No template or data set override found for dfhauxt");
    }

    #[test]
    fn test_sit_content_cannot_open_instream() {
        let mut config = config();
        config.sit_parameters = Some(SitParameters::new().with_scalar("gmtext", "//X DD *"));
        let err = region_job(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::InvalidInstreamContent(_))
        ));
    }
}
