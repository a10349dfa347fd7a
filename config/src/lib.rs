//! Configuration for provisioning a CICS region.
//!
//! A region is described by one YAML file, loaded as a [`ProvisionConfig`].
//! Library and region data set names resolve through explicit overrides or
//! `<< variable >>` templates ([`render_template`]), and [`region_job`]
//! assembles the JCL that starts the region.
//!
//! # Example
//!
//! ```
//! use cics_provision_config::{ProvisionConfig, RegionDataSet, render_region_jcl};
//!
//! let mut config = ProvisionConfig::new("CICSA");
//! config.cics_data_sets.template = Some("CICSTS61.CICS.<< lib_name >>".into());
//! config.le_data_sets.template = Some("CEE.<< lib_name >>".into());
//! config.region_data_sets.template = Some("REGIONS.CICSA.<< data_set_name >>".into());
//!
//! assert_eq!(
//!     config.region_data_set(RegionDataSet::Dfhgcd).unwrap(),
//!     "REGIONS.CICSA.DFHGCD"
//! );
//! let jcl = render_region_jcl(&config).unwrap();
//! assert!(jcl.contains("//DFHGCD   DD DSN=REGIONS.CICSA.DFHGCD,DISP=SHR"));
//! ```

mod config;
mod error;
mod region;
mod template;

pub use config::{
    CicsDataSets, CpsmDataSets, JobParameters, LeDataSets, Library, LibraryConcatenation,
    OutputDataSet, OutputDataSets, OutputDd, ProvisionConfig, RegionDataSet, RegionDataSetEntry,
    RegionDataSets, SysoutClass,
};
pub use error::{ConfigError, Result};
pub use region::{DFHSIP, dfhrpl_libraries, region_job, render_region_jcl, steplib_libraries};
pub use template::{DATA_SET_NAME_VARIABLE, LIB_NAME_VARIABLE, render_template};
