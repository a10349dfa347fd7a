//! Running and interpreting z/OS utilities for CICS region provisioning.
//!
//! This crate sits between the pure renderers in `cics-provision-core` and
//! the target system:
//!
//! - [`executor`] defines the two seams everything runs through:
//!   [`ProgramExecutor`] for batch programs and [`ShellRunner`] for z/OS
//!   UNIX commands. [`ZoauExecutor`] implements both with child processes.
//! - [`run_with_retry`] repeats commands whose output can lag behind their
//!   effect, recording every attempt.
//! - [`parser`] turns fixed-format utility output into facts.
//! - [`Utilities`] wraps each utility (LISTDS, IDCAMS, IEFBR14, ICETOOL,
//!   DFHRMUTL, DFHCCUTL, DFHCSDUP) with its DD bindings and recognition rule.
//! - [`provision_data_set`] drives a region data set to a target state and
//!   [`stop_region`] brings a running region down.
//!
//! Every failure after a command ran is a [`UtilityError`] carrying the
//! ordered execution log up to that point.
//!
//! # Example
//!
//! ```
//! use cics_provision_utilities::CommandResponse;
//! use cics_provision_utilities::parser::{IdcamsAction, IdcamsOutcome, interpret_idcams};
//!
//! let response = CommandResponse::new(
//!     8,
//!     "IDC3012I ENTRY CICS.GCD NOT FOUND\nIDC0551I ** ENTRY CICS.GCD NOT DELETED",
//!     "",
//! );
//! assert_eq!(
//!     interpret_idcams(&response, "CICS.GCD", IdcamsAction::Delete).unwrap(),
//!     IdcamsOutcome::NotFound
//! );
//! ```

pub mod error;
pub mod executor;
pub mod jobs;
pub mod lifecycle;
pub mod output;
pub mod parser;
pub mod process;
pub mod programs;
pub mod retry;
pub mod stop;

pub use error::{Result, UtilityError};
pub use executor::{CommandResponse, ProgramExecutor, ShellRunner};
pub use jobs::{submit_jcl, write_jcl_to_data_set};
pub use lifecycle::{
    DataSetKind, DataSetRequest, Destination, LifecycleError, LifecycleReport, LifecycleState,
    TargetState, provision_data_set,
};
pub use output::{OutputFormat, format_output};
pub use parser::ParseError;
pub use process::{DEFAULT_COMMAND_TIMEOUT, ZoauExecutor};
pub use programs::{Executed, Utilities};
pub use retry::{
    MVS_CMD_RETRY_ATTEMPTS, RetryOutcome, RetryPolicy, RetryRun, RetryState, run_with_retry,
};
pub use stop::{Clock, POLL_INTERVAL, StopReport, StopRequest, SystemClock, stop_region};
