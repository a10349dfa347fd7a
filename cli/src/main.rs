use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use clap::{ArgGroup, Args, Parser, Subcommand};
use cics_provision_config::{Library, ProvisionConfig, RegionDataSet, render_region_jcl};
use cics_provision_core::{
    AutoStartOverride, CsdScript, DataSetState, ExecutionRecord, ShutdownTransaction, StopMode,
    ValidationError, dfhrmutl_job,
};
use cics_provision_utilities::parser::{
    JobStatusEntry, icetool_reason_line, parse_console_errors, parse_dfhrmutl,
    parse_job_status_for_id, parse_job_status_lines, parse_listds, parse_record_count,
};
use cics_provision_utilities::{
    CommandResponse, DEFAULT_COMMAND_TIMEOUT, DataSetKind, DataSetRequest, Destination,
    LifecycleError, LifecycleState, OutputFormat, StopRequest, SystemClock, TargetState,
    UtilityError, Utilities, ZoauExecutor, format_output, provision_data_set, stop_region,
    submit_jcl, write_jcl_to_data_set,
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// CLI-side stop mode with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliStopMode {
    Normal,
    Immediate,
    Cancel,
}

impl From<CliStopMode> for StopMode {
    fn from(mode: CliStopMode) -> Self {
        match mode {
            CliStopMode::Normal => Self::Normal,
            CliStopMode::Immediate => Self::Immediate,
            CliStopMode::Cancel => Self::Cancel,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliAutoStart {
    Autoinit,
    Autoasis,
    Autocold,
}

impl From<CliAutoStart> for AutoStartOverride {
    fn from(value: CliAutoStart) -> Self {
        match value {
            CliAutoStart::Autoinit => Self::AutoInit,
            CliAutoStart::Autoasis => Self::AutoAsis,
            CliAutoStart::Autocold => Self::AutoCold,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "cics-provision")]
#[command(about = "Provision, start and stop CICS regions on z/OS")]
#[command(version)]
struct Cli {
    /// Output format for reports and parsed facts.
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: OutputFormat,
    /// Log debug detail to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Seconds a single z/OS command may run before it is killed.
    #[arg(long, global = true, default_value_t = DEFAULT_COMMAND_TIMEOUT.as_secs())]
    command_timeout: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render the JCL that starts the configured region.
    RegionJcl(RegionJclArgs),
    /// Render the start JCL and submit it.
    StartRegion(StartRegionArgs),
    /// Shut down or cancel a running region.
    StopRegion(StopRegionArgs),
    /// Bring one region data set to a target state.
    DataSet(DataSetArgs),
    /// Run DFHCSDUP commands from a YAML script against the region CSD.
    Csdup(CsdupArgs),
    /// Print a DFHRMUTL job for a global catalog.
    RmutlJcl(RmutlJclArgs),
    /// Parse saved utility output without touching the system.
    Parse(ParseArgs),
}

#[derive(Debug, Args)]
struct RegionJclArgs {
    /// Region configuration YAML.
    #[arg(long)]
    config: PathBuf,
    /// Write the JCL to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct StartRegionArgs {
    /// Region configuration YAML.
    #[arg(long)]
    config: PathBuf,
    /// Also copy the JCL into the region's DFHSTART data set.
    #[arg(long)]
    keep_jcl: bool,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("job").required(true).multiple(true).args(["job_name", "job_id"])))]
struct StopRegionArgs {
    /// Job name of the region.
    #[arg(long)]
    job_name: Option<String>,
    /// Job id, when several jobs share the name or the name is unknown.
    #[arg(long)]
    job_id: Option<String>,
    #[arg(long, value_enum, default_value = "normal")]
    mode: CliStopMode,
    /// Shutdown transaction to run (1-4 characters).
    #[arg(long, conflicts_with = "no_sdtran")]
    sdtran: Option<String>,
    /// Run no shutdown transaction.
    #[arg(long)]
    no_sdtran: bool,
    /// Seconds to wait for the region to end; zero or less waits forever.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    timeout: i64,
}

#[derive(Debug, Args)]
struct DataSetArgs {
    /// Region configuration YAML.
    #[arg(long)]
    config: PathBuf,
    #[arg(long, value_enum)]
    kind: DataSetKind,
    #[arg(long, value_enum)]
    state: TargetState,
    /// A or B, for trace and dump data sets.
    #[arg(long, value_enum, default_value = "a")]
    destination: Destination,
}

#[derive(Debug, Args)]
struct CsdupArgs {
    /// Region configuration YAML.
    #[arg(long)]
    config: PathBuf,
    /// YAML list of single-key command maps.
    #[arg(long)]
    script: PathBuf,
}

#[derive(Debug, Args)]
struct RmutlJclArgs {
    /// Global catalog data set.
    #[arg(long)]
    gcd: String,
    /// CICS SDFHLOAD library.
    #[arg(long)]
    sdfhload: String,
    /// Override to set; omit to only report the catalog state.
    #[arg(long, value_enum)]
    set_auto_start: Option<CliAutoStart>,
}

#[derive(Debug, Args)]
struct ParseArgs {
    #[command(subcommand)]
    target: ParseTarget,
}

#[derive(Debug, Subcommand)]
enum ParseTarget {
    /// TSO LISTDS output.
    Listds(ParseListdsArgs),
    /// TSO STATUS output.
    Status(ParseStatusArgs),
    /// DFHRMUTL report.
    Rmutl(InputArgs),
    /// ICETOOL COUNT report.
    Icetool(InputArgs),
    /// Console response to an operator command.
    Console(ParseConsoleArgs),
}

#[derive(Debug, Args)]
struct InputArgs {
    /// File holding the output; stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ParseListdsArgs {
    /// Data set the command listed.
    #[arg(long)]
    dsn: String,
    /// Return code of the command.
    #[arg(long, default_value_t = 0)]
    rc: i32,
    #[command(flatten)]
    input: InputArgs,
}

#[derive(Debug, Args)]
struct ParseStatusArgs {
    #[arg(long)]
    job_name: String,
    #[arg(long)]
    job_id: Option<String>,
    #[command(flatten)]
    input: InputArgs,
}

#[derive(Debug, Args)]
struct ParseConsoleArgs {
    #[arg(long, default_value_t = 0)]
    rc: i32,
    #[command(flatten)]
    input: InputArgs,
}

#[derive(Debug, Serialize)]
struct StartReport {
    changed: bool,
    job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    jcl_data_set: Option<String>,
    submitted_at: String,
    executions: Vec<ExecutionRecord>,
}

#[derive(Debug, Serialize)]
struct CsdupReport {
    changed: bool,
    csd: String,
    rc: i32,
    executions: Vec<ExecutionRecord>,
}

/// What a failed command ran before it failed.
#[derive(Debug, Serialize)]
struct FailureReport<'a> {
    failed: bool,
    msg: String,
    executions: &'a [ExecutionRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    start_state: Option<LifecycleState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_state: Option<LifecycleState>,
}

#[derive(Debug, Serialize)]
struct JobStatusReport {
    job_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_id: Option<String>,
    jobs: Vec<JobStatusEntry>,
}

#[derive(Debug, Serialize)]
struct RecordCountReport {
    record_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConsoleReport {
    accepted: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let format = cli.format;
    let timeout = Duration::from_secs(cli.command_timeout);
    let result = match cli.command {
        Command::RegionJcl(args) => run_region_jcl(args),
        Command::StartRegion(args) => run_start_region(args, format, timeout),
        Command::StopRegion(args) => run_stop_region(args, format, timeout),
        Command::DataSet(args) => run_data_set(args, format, timeout),
        Command::Csdup(args) => run_csdup(args, format, timeout),
        Command::RmutlJcl(args) => run_rmutl_jcl(args),
        Command::Parse(args) => run_parse(args, format),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: &Path) -> Result<ProvisionConfig, String> {
    let config = ProvisionConfig::load(path)
        .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;
    config.validate().map_err(|err| err.to_string())?;
    debug!(path = %path.display(), applid = %config.applid, "Loaded region configuration");
    Ok(config)
}

fn emit<T: Serialize>(value: &T, format: OutputFormat) -> Result<(), String> {
    let raw = format_output(value, format)?;
    println!("{}", raw.trim_end());
    Ok(())
}

/// Prints the executions behind a failure, then hands back its message.
fn report_failure(err: &UtilityError, format: OutputFormat) -> String {
    let report = FailureReport {
        failed: true,
        msg: err.to_string(),
        executions: err.executions(),
        start_state: None,
        end_state: None,
    };
    if let Err(format_err) = emit(&report, format) {
        eprintln!("{format_err}");
    }
    report.msg
}

fn report_lifecycle_failure(err: &LifecycleError, format: OutputFormat) -> String {
    let report = FailureReport {
        failed: true,
        msg: err.to_string(),
        executions: err.executions(),
        start_state: Some(err.start_state),
        end_state: Some(err.end_state),
    };
    if let Err(format_err) = emit(&report, format) {
        eprintln!("{format_err}");
    }
    report.msg
}

fn run_region_jcl(args: RegionJclArgs) -> Result<(), String> {
    let config = load_config(&args.config)?;
    let jcl = render_region_jcl(&config).map_err(|err| err.to_string())?;

    match args.output {
        Some(path) => {
            fs::write(&path, format!("{jcl}\n"))
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
            println!("Wrote start JCL for {} to '{}'.", config.applid, path.display());
        }
        None => println!("{jcl}"),
    }
    Ok(())
}

fn run_start_region(
    args: StartRegionArgs,
    format: OutputFormat,
    timeout: Duration,
) -> Result<(), String> {
    let config = load_config(&args.config)?;
    let jcl = render_region_jcl(&config).map_err(|err| err.to_string())?;
    let mut executor = ZoauExecutor::new(timeout);
    let mut executions = Vec::new();

    let jcl_data_set = if args.keep_jcl {
        let dsn = config
            .region_data_set(RegionDataSet::Dfhstart)
            .map_err(|err| err.to_string())?;
        write_jcl_to_data_set(&mut executor, &jcl, &dsn)
            .map_err(|err| report_failure(&err, format))?
            .into_value(&mut executions);
        Some(dsn)
    } else {
        None
    };

    let job_id = match submit_jcl(&mut executor, &jcl) {
        Ok(submitted) => submitted.into_value(&mut executions),
        Err(err) => return Err(report_failure(&err.with_history(executions), format)),
    };

    emit(
        &StartReport {
            changed: true,
            job_id,
            jcl_data_set,
            submitted_at: Utc::now().to_rfc3339(),
            executions,
        },
        format,
    )
}

fn run_stop_region(
    args: StopRegionArgs,
    format: OutputFormat,
    timeout: Duration,
) -> Result<(), String> {
    let transaction = match (args.sdtran.as_deref(), args.no_sdtran) {
        (Some(name), _) => ShutdownTransaction::named(name).map_err(|err| err.to_string())?,
        (None, true) => ShutdownTransaction::Suppressed,
        (None, false) => ShutdownTransaction::Default,
    };
    let request = match (args.job_name, args.job_id) {
        (Some(job_name), Some(job_id)) => StopRequest::new(job_name).with_job_id(job_id),
        (Some(job_name), None) => StopRequest::new(job_name),
        (None, Some(job_id)) => StopRequest::by_id(job_id),
        (None, None) => return Err(ValidationError::MissingJobIdentity.to_string()),
    }
    .with_mode(args.mode.into())
    .with_transaction(transaction)
    .with_timeout(args.timeout);

    let mut executor = ZoauExecutor::new(timeout);
    let report = stop_region(&mut executor, &mut SystemClock, &request)
        .map_err(|err| report_failure(&err, format))?;
    emit(&report, format)
}

/// The configuration entry that names a lifecycle target.
fn region_data_set_for(kind: DataSetKind, destination: Destination) -> RegionDataSet {
    match (kind, destination) {
        (DataSetKind::GlobalCatalog, _) => RegionDataSet::Dfhgcd,
        (DataSetKind::LocalCatalog, _) => RegionDataSet::Dfhlcd,
        (DataSetKind::Csd, _) => RegionDataSet::Dfhcsd,
        (DataSetKind::LocalRequestQueue, _) => RegionDataSet::Dfhlrq,
        (DataSetKind::AuxiliaryTempStorage, _) => RegionDataSet::Dfhtemp,
        (DataSetKind::Intrapartition, _) => RegionDataSet::Dfhintra,
        (DataSetKind::AuxiliaryTrace, Destination::A) => RegionDataSet::Dfhauxt,
        (DataSetKind::AuxiliaryTrace, Destination::B) => RegionDataSet::Dfhbuxt,
        (DataSetKind::TransactionDump, Destination::A) => RegionDataSet::Dfhdmpa,
        (DataSetKind::TransactionDump, Destination::B) => RegionDataSet::Dfhdmpb,
    }
}

fn data_set_request(config: &ProvisionConfig, args: &DataSetArgs) -> Result<DataSetRequest, String> {
    let target = region_data_set_for(args.kind, args.destination);
    let name = config
        .region_data_set(target)
        .map_err(|err| err.to_string())?;

    let mut request =
        DataSetRequest::new(args.kind, name, args.state).with_destination(args.destination);
    if let Some(entry) = config.region_data_sets.entry(target) {
        request = request
            .with_space(entry.space(args.kind.default_space()))
            .with_volumes(entry.volumes.clone());
        if let Some(log) = entry.log {
            request = request.with_log(log, entry.logstream_id.clone());
        }
    }
    // Kinds that run CICS utilities need SDFHLOAD; the others never read it.
    if let Ok(sdfhload) = config.library(Library::Sdfhload) {
        request = request.with_sdfhload(sdfhload);
    }
    Ok(request)
}

fn run_data_set(args: DataSetArgs, format: OutputFormat, timeout: Duration) -> Result<(), String> {
    let config = load_config(&args.config)?;
    let request = data_set_request(&config, &args)?;
    debug!(kind = %request.kind, dsn = %request.name, state = %request.state, "Provisioning data set");

    let mut utilities = Utilities::new(ZoauExecutor::new(timeout));
    let report = provision_data_set(&mut utilities, &request)
        .map_err(|err| report_lifecycle_failure(&err, format))?;
    emit(&report, format)
}

fn run_csdup(args: CsdupArgs, format: OutputFormat, timeout: Duration) -> Result<(), String> {
    let config = load_config(&args.config)?;
    let file = fs::File::open(&args.script)
        .map_err(|err| format!("Failed to open '{}': {err}", args.script.display()))?;
    let script: CsdScript = serde_yaml::from_reader(std::io::BufReader::new(file))
        .map_err(|err| format!("Failed to parse '{}': {err}", args.script.display()))?;
    if script.0.is_empty() {
        return Err(format!("No DFHCSDUP commands in '{}'", args.script.display()));
    }

    let csd = config
        .region_data_set(RegionDataSet::Dfhcsd)
        .map_err(|err| err.to_string())?;
    let sdfhload = config
        .library(Library::Sdfhload)
        .map_err(|err| err.to_string())?;
    let sysin = script.render().lines().map(str::to_string).collect();

    let mut utilities = Utilities::new(ZoauExecutor::new(timeout));
    let executed = utilities
        .dfhcsdup(&csd, &sdfhload, sysin, &config.csdup)
        .map_err(|err| report_failure(&err, format))?;
    emit(
        &CsdupReport {
            changed: true,
            csd,
            rc: executed.value.rc,
            executions: executed.executions,
        },
        format,
    )
}

fn run_rmutl_jcl(args: RmutlJclArgs) -> Result<(), String> {
    let job = dfhrmutl_job(
        &args.gcd.to_uppercase(),
        &args.sdfhload.to_uppercase(),
        args.set_auto_start.map(Into::into),
    )
    .map_err(|err| err.to_string())?;
    println!("{}", job.render_text().map_err(|err| err.to_string())?);
    Ok(())
}

fn read_input(args: &InputArgs) -> Result<String, String> {
    match &args.input {
        Some(path) => fs::read_to_string(path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|err| format!("Failed to read stdin: {err}"))?;
            Ok(text)
        }
    }
}

fn run_parse(args: ParseArgs, format: OutputFormat) -> Result<(), String> {
    match args.target {
        ParseTarget::Listds(args) => {
            let stdout = read_input(&args.input)?;
            let dsn = args.dsn.to_uppercase();
            let response = CommandResponse::new(args.rc, stdout, "");
            let state: DataSetState =
                parse_listds(&response, &dsn).map_err(|err| err.to_string())?;
            emit(&state, format)
        }
        ParseTarget::Status(args) => {
            let stdout = read_input(&args.input)?;
            let job_name = args.job_name.to_uppercase();
            let jobs = match &args.job_id {
                Some(job_id) => {
                    let status = parse_job_status_for_id(&stdout, &job_name, job_id)
                        .map_err(|err| err.to_string())?;
                    vec![JobStatusEntry {
                        job_name: job_name.clone(),
                        job_id: job_id.clone(),
                        status,
                    }]
                }
                None => parse_job_status_lines(&stdout, &job_name),
            };
            emit(
                &JobStatusReport {
                    job_name,
                    job_id: args.job_id,
                    jobs,
                },
                format,
            )
        }
        ParseTarget::Rmutl(args) => {
            let stdout = read_input(&args)?;
            emit(&parse_dfhrmutl(&stdout), format)
        }
        ParseTarget::Icetool(args) => {
            let stdout = read_input(&args)?;
            emit(
                &RecordCountReport {
                    record_count: parse_record_count(&stdout),
                    reason: icetool_reason_line(&stdout),
                },
                format,
            )
        }
        ParseTarget::Console(args) => {
            let stdout = read_input(&args.input)?;
            parse_console_errors(&stdout, args.rc).map_err(|err| err.to_string())?;
            emit(&ConsoleReport { accepted: true }, format)
        }
    }
}
