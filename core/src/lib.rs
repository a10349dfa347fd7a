//! Rendering primitives for CICS region provisioning.
//!
//! This crate turns structured requests into the text mainframe utilities
//! consume. It performs no I/O:
//!
//! - [`JobDescription`] renders a JCL job stream: JOB and EXEC statements,
//!   DD concatenations and in-stream data, wrapped at 72 columns with a safe
//!   in-stream delimiter chosen when the content needs one.
//! - [`SitParameters`] renders CICS system initialization parameters as
//!   SYSIN card images, expanding component-indexed parameters such as
//!   `STNTRxx`.
//! - [`VsamDefinition`] renders IDCAMS `DEFINE CLUSTER` commands with the
//!   defaults for each CICS VSAM data set.
//! - [`CsdCommand`] renders DFHCSDUP commands.
//! - [`format_shutdown_command`] and [`dfhrmutl_job`] cover region shutdown
//!   and the global catalog auto-start record.
//!
//! Structural input problems are reported as [`ValidationError`] before
//! anything is rendered.
//!
//! # Example
//!
//! ```
//! use cics_provision_core::*;
//!
//! let job = JobDescription::new(JobCard::new("listjob").with_parameter("CLASS", "A"))
//!     .with_step(
//!         ExecStep::new("step1")
//!             .with_program("IDCAMS")
//!             .with_dd(DdEntry::parameters("SYSPRINT", Parameters::new().with("SYSOUT", "*")))
//!             .with_dd(DdEntry::instream("SYSIN", vec!["  LISTCAT ALL".to_string()])),
//!     );
//!
//! assert_eq!(
//!     job.render().unwrap(),
//!     vec![
//!         "//LISTJOB  JOB CLASS=A",
//!         "//STEP1    EXEC PGM=IDCAMS",
//!         "//SYSPRINT DD SYSOUT=*",
//!         "//SYSIN    DD *",
//!         "  LISTCAT ALL",
//!         "/*",
//!         "//",
//!     ]
//! );
//! ```

mod csdup;
mod format;
mod idcams;
mod jcl;
mod rmutl;
mod shutdown;
mod sit;
mod types;
mod validate;

pub use csdup::{
    AccessMode, CSDUP_LINE_LIMIT, CopyMode, CsdCommand, CsdOptions, CsdScript, CsdupOptions,
    DeleteTarget, ListDetail, ListPosition, ListTarget, Resource, ResourceDefinition,
    SUPPORTED_COMMANDS, Scope, Transfer, render_commands, split_command,
};
pub use format::{
    CARD_IMAGE_LENGTH, CONTINUATION_PREFIX, JCL_PREFIX, MAX_LINE_LENGTH, NAME_FIELD_WIDTH,
    Parameters, format_field_name, join_parameters, parameter_pairs, quote_programmer_name,
    quote_text, split_all, split_at_72, wrap_card_image,
};
pub use idcams::{RecoveryLog, VsamDefinition, delete_command};
pub use jcl::*;
pub use rmutl::{DFHRMUTL, dfhrmutl_invocation, dfhrmutl_job, dfhrmutl_sysin};
pub use shutdown::{
    ShutdownTransaction, StopMode, format_cancel_command, format_shutdown_command,
    tso_status_command, tso_status_id_command, validate_sdtran,
};
pub use sit::{
    SitParameters, SitValue, WRAPPABLE_SIT_PARAMETERS, render_sit_parameters,
    validate_indexed_key, wrap_sit_cards,
};
pub use types::*;
pub use validate::{
    MAX_DATA_SET_NAME_LENGTH, MAX_NAME_LENGTH, MAX_QUALIFIER_LENGTH, ValidationError,
    validate_data_set_name, validate_name, validate_qualifier,
};
