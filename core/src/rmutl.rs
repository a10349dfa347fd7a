//! DFHRMUTL: reads and sets the global catalog auto-start override record.

use crate::format::Parameters;
use crate::jcl::{DdEntry, ExecStep, JobCard, JobDescription};
use crate::types::{
    AutoStartOverride, DataSetDefinition, DdStatement, Disposition, ProgramInvocation,
};
use crate::validate::{ValidationError, validate_data_set_name};

pub const DFHRMUTL: &str = "DFHRMUTL";

/// SYSIN cards for DFHRMUTL. Empty when only reading the catalog.
pub fn dfhrmutl_sysin(set_auto_start: Option<AutoStartOverride>) -> Vec<String> {
    set_auto_start
        .map(|value| vec![format!("    {}", value.set_command())])
        .unwrap_or_default()
}

/// Standalone DFHRMUTL job against a global catalog.
///
/// ```
/// use cics_provision_core::*;
///
/// let job = dfhrmutl_job("CICS.GCD", "CICS.SDFHLOAD", Some(AutoStartOverride::AutoInit)).unwrap();
/// let text = job.render_text().unwrap();
/// assert!(text.starts_with("//DFHRMUTL JOB\n//RMUTL    EXEC PGM=DFHRMUTL,REGION=1M"));
/// assert!(text.contains("\n    SET_AUTO_START=AUTOINIT\n/*\n"));
/// ```
pub fn dfhrmutl_job(
    global_catalog: &str,
    sdfhload: &str,
    set_auto_start: Option<AutoStartOverride>,
) -> Result<JobDescription, ValidationError> {
    validate_data_set_name(global_catalog)?;
    validate_data_set_name(sdfhload)?;

    let step = ExecStep::new("RMUTL")
        .with_program(DFHRMUTL)
        .with_parameter("REGION", "1M")
        .with_dd(DdEntry::parameters(
            "STEPLIB",
            Parameters::new()
                .with("DSNAME", sdfhload.to_uppercase())
                .with("DISP", "SHR"),
        ))
        .with_dd(DdEntry::parameters(
            "SYSPRINT",
            Parameters::new().with("SYSOUT", "*"),
        ))
        .with_dd(DdEntry::parameters(
            "DFHGCD",
            Parameters::new()
                .with("DSNAME", global_catalog.to_uppercase())
                .with("DISP", "OLD"),
        ))
        .with_dd(DdEntry::instream("SYSIN", dfhrmutl_sysin(set_auto_start)));

    Ok(JobDescription::new(JobCard::new(DFHRMUTL)).with_step(step))
}

/// The same DFHRMUTL run as a program invocation.
pub fn dfhrmutl_invocation(
    global_catalog: &str,
    sdfhload: &str,
    set_auto_start: Option<AutoStartOverride>,
) -> Result<ProgramInvocation, ValidationError> {
    validate_data_set_name(global_catalog)?;
    validate_data_set_name(sdfhload)?;

    Ok(ProgramInvocation::new(DFHRMUTL)
        .with_dd(DdStatement::data_set(
            "STEPLIB",
            DataSetDefinition::shared(sdfhload),
        ))
        .with_dd(DdStatement::output("SYSPRINT"))
        .with_dd(DdStatement::data_set(
            "DFHGCD",
            DataSetDefinition::existing(global_catalog, Disposition::Old),
        ))
        .with_dd(DdStatement::input("SYSIN", dfhrmutl_sysin(set_auto_start))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_job() {
        let job = dfhrmutl_job("cicsts.regiona.dfhgcd", "cicsts61.cics.sdfhload", None).unwrap();
        assert_eq!(
            job.render().unwrap(),
            vec![
                "//DFHRMUTL JOB",
                "//RMUTL    EXEC PGM=DFHRMUTL,REGION=1M",
                "//STEPLIB  DD DSNAME=CICSTS61.CICS.SDFHLOAD,DISP=SHR",
                "//SYSPRINT DD SYSOUT=*",
                "//DFHGCD   DD DSNAME=CICSTS.REGIONA.DFHGCD,DISP=OLD",
                "//SYSIN    DD *",
                "/*",
                "//",
            ]
        );
    }

    #[test]
    fn test_set_auto_start_job() {
        let job = dfhrmutl_job(
            "CICSTS.REGIONA.DFHGCD",
            "CICSTS61.CICS.SDFHLOAD",
            Some(AutoStartOverride::AutoCold),
        )
        .unwrap();
        let lines = job.render().unwrap();
        assert_eq!(lines[5], "//SYSIN    DD *");
        assert_eq!(lines[6], "    SET_AUTO_START=AUTOCOLD");
        assert_eq!(lines[7], "/*");
    }

    #[test]
    fn test_long_qualifier_rejected() {
        let err = dfhrmutl_job("CICSTS.REGIONABCD.DFHGCD", "CICSTS61.CICS.SDFHLOAD", None)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::QualifierTooLong("REGIONABCD".to_string())
        );
        assert!(dfhrmutl_invocation("A.B", "LONGQUALIFIER.X", None).is_err());
    }

    #[test]
    fn test_invocation_dds() {
        let invocation = dfhrmutl_invocation(
            "CICSTS.REGIONA.DFHGCD",
            "CICSTS61.CICS.SDFHLOAD",
            Some(AutoStartOverride::AutoAsis),
        )
        .unwrap();
        assert_eq!(invocation.program, "DFHRMUTL");
        let names: Vec<_> = invocation.dds.iter().map(|dd| dd.name.as_str()).collect();
        assert_eq!(names, vec!["STEPLIB", "SYSPRINT", "DFHGCD", "SYSIN"]);
        assert_eq!(
            invocation.dds[3],
            DdStatement::input("SYSIN", vec!["    SET_AUTO_START=AUTOASIS".to_string()])
        );
    }
}
