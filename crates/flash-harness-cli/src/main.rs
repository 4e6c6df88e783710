// crates/flash-harness-cli/src/main.rs
// ============================================================================
// Module: Flash Harness CLI Entry Point
// Description: Command dispatcher for offline checks and mainnet-fork runs.
// Purpose: Judge captured liquidator logs and drive regression scenarios.
// Dependencies: clap, flash-harness, liquidator-oracle, tracing-subscriber
// ============================================================================

//! ## Overview
//! `flash-harness` has three jobs:
//!
//! - `check` evaluates an expectation file against a captured liquidator log,
//!   with no node involved;
//! - `run` forks mainnet at a block, deploys the flash liquidator, runs the
//!   liquidator once, and evaluates the expectation (optionally replaying the
//!   buy orders on a later block);
//! - `config validate` loads and validates a harness config.
//!
//! Exit codes: 0 when the expectation holds, 1 when it does not (including a
//! replayed buy order that reverts), 2 for usage, configuration, or input
//! errors.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use flash_harness::HarnessError;
use flash_harness::RpcClient;
use flash_harness::Scenario;
use flash_harness::ScenarioReporter;
use flash_harness::ScenarioRunner;
use flash_harness::ensure_node;
use flash_harness_config::HarnessConfig;
use flash_harness_config::HarnessEnvConfig;
use liquidator_oracle::EvaluationReport;
use liquidator_oracle::ExpectationError;
use liquidator_oracle::ScenarioExpectation;
use liquidator_oracle::evaluate;
use liquidator_oracle::read_records;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding the harness log filter.
const LOG_ENV: &str = "FLASH_HARNESS_LOG";
/// Filter used when [`LOG_ENV`] is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "info";
/// Exit code for an unmet expectation.
const EXIT_UNMET: u8 = 1;
/// Exit code for usage, configuration, or input errors.
const EXIT_ERROR: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "flash-harness", version, about = "Flash liquidator regression harness")]
struct Cli {
    /// Emit harness logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate an expectation against a captured liquidator log.
    Check(CheckCommand),
    /// Run one scenario against a mainnet fork.
    Run(RunCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Report output formats.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Canonical JSON output.
    Json,
}

/// Arguments for `check`.
#[derive(Args, Debug)]
struct CheckCommand {
    /// Captured liquidator stdout (JSON lines).
    #[arg(long, value_name = "PATH")]
    log: PathBuf,
    /// Expectation TOML file.
    #[arg(long, value_name = "PATH")]
    expect: PathBuf,
    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Mainnet block to fork.
    #[arg(long, value_name = "BLOCK")]
    block: u64,
    /// Expectation TOML file.
    #[arg(long, value_name = "PATH")]
    expect: PathBuf,
    /// Harness config file (defaults to flash-harness.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Scenario name used for the artifact directory.
    #[arg(long)]
    name: Option<String>,
    /// Replay the submitted buy orders on this later block.
    #[arg(long, value_name = "BLOCK")]
    replay_at: Option<u64>,
    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a harness config.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to flash-harness.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper; always maps to exit code 2.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

impl From<HarnessError> for CliError {
    fn from(err: HarnessError) -> Self {
        Self::new(err.to_string())
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_json)?;
    match cli.command {
        Commands::Check(command) => command_check(&command),
        Commands::Run(command) => command_run(&command),
        Commands::Config {
            command: ConfigCommand::Validate(command),
        } => command_config_validate(&command),
    }
}

/// Installs the stderr `tracing` subscriber.
fn init_logging(json: bool) -> CliResult<()> {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let installed = if json { builder.json().try_init() } else { builder.try_init() };
    installed.map_err(|err| CliError::new(format!("failed to install logger: {err}")))
}

// ============================================================================
// SECTION: Check Command
// ============================================================================

/// Executes `check`.
fn command_check(command: &CheckCommand) -> CliResult<ExitCode> {
    let expectation = load_expectation(&command.expect)?;
    let file = File::open(&command.log).map_err(|err| {
        CliError::new(format!("cannot open log {}: {err}", command.log.display()))
    })?;
    let records = read_records(BufReader::new(file))
        .map_err(|err| CliError::new(format!("{}: {err}", command.log.display())))?;
    let report = evaluate(&expectation, &records);
    info!(records = records.len(), passed = report.passed(), "log evaluated");
    write_report(&report, command.format)?;
    Ok(verdict_code(&report))
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes `run`.
fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let expectation = load_expectation(&command.expect)?;
    let env = HarnessEnvConfig::load().map_err(CliError::new)?;
    let mut config = HarnessConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    config.apply_env(&env).map_err(|err| CliError::new(format!("config load failed: {err}")))?;

    let rpc = RpcClient::new(&config.node.url, config.node.rpc_timeout())
        .map_err(|err| CliError::new(err.to_string()))?;
    let _node = ensure_node(&config.node, &rpc)?;
    let runner = ScenarioRunner::new(config)?;

    let name = command.name.clone().unwrap_or_else(|| format!("block-{}", command.block));
    let mut reporter = ScenarioReporter::new(&name, &env)?;
    let scenario = Scenario::new(name, command.block, expectation);
    let result = match command.replay_at {
        Some(executed_at) => runner
            .replay_buy_orders(&scenario, executed_at, reporter.artifacts())
            .map(|replay| {
                let note = format!(
                    "{} buy orders replayed at block {executed_at}",
                    replay.replayed.len()
                );
                (replay.issued, Some(note))
            }),
        None => runner.run(&scenario, reporter.artifacts()).map(|outcome| (outcome, None)),
    };
    let (outcome, replay_note) = match result {
        Ok(done) => done,
        Err(err) if is_regression_failure(&err) => {
            let message = err.to_string();
            reporter.finish("failed", vec![message.clone()], Vec::new())?;
            write_run_failure(&message, command.format)?;
            return Ok(ExitCode::from(EXIT_UNMET));
        }
        Err(err) => {
            reporter.finish("error", vec![err.to_string()], Vec::new())?;
            return Err(err.into());
        }
    };

    let mut notes = vec![
        format!("fork: {}", outcome.fork),
        format!("flash liquidator: {}", outcome.flash),
        format!("records: {}", outcome.records.len()),
        format!("eth spent: {} micro-ETH", outcome.eth_spent_micro),
    ];
    notes.extend(replay_note);
    notes.extend(outcome.report.failures().map(|failure| failure.detail.clone()));
    let status = if outcome.passed() { "passed" } else { "failed" };
    let artifacts = ["stdout", "stderr", "report.json", "liquidator/config.json"]
        .into_iter()
        .map(str::to_string)
        .chain(command.replay_at.map(|_| "replay.json".to_string()))
        .collect();
    reporter.finish(status, notes, artifacts)?;

    write_report(&outcome.report, command.format)?;
    if command.format == OutputFormat::Text {
        write_stdout(&format!("eth spent: {} micro-ETH\n", outcome.eth_spent_micro))?;
    }
    Ok(verdict_code(&outcome.report))
}

/// Returns true for errors that mean the liquidator regressed, as opposed to
/// a harness or environment fault.
const fn is_regression_failure(err: &HarnessError) -> bool {
    matches!(
        err,
        HarnessError::Replay(_) | HarnessError::Expectation(ExpectationError::Unmet { .. })
    )
}

/// Machine-readable verdict of a run that ended in a regression failure.
#[derive(Debug, Serialize)]
struct RunFailure<'a> {
    /// Always false.
    passed: bool,
    /// Failure description.
    failure: &'a str,
}

/// Writes the verdict of a run that ended in a regression failure.
fn write_run_failure(message: &str, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Text => write_stdout(&format!("FAIL {message}\nfailed\n")),
        OutputFormat::Json => {
            let failure = RunFailure {
                passed: false,
                failure: message,
            };
            let mut json = serde_jcs::to_string(&failure)
                .map_err(|err| CliError::new(format!("report serialization failed: {err}")))?;
            json.push('\n');
            write_stdout(&json)
        }
    }
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Executes `config validate`.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    HarnessConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    write_stdout("config ok\n")?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads an expectation file.
fn load_expectation(path: &Path) -> CliResult<ScenarioExpectation> {
    ScenarioExpectation::load(path)
        .map_err(|err| CliError::new(format!("expectation {}: {err}", path.display())))
}

/// Maps a report to the process exit code.
fn verdict_code(report: &EvaluationReport) -> ExitCode {
    if report.passed() { ExitCode::SUCCESS } else { ExitCode::from(EXIT_UNMET) }
}

/// Writes `report` to stdout in `format`.
fn write_report(report: &EvaluationReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Text => write_stdout(&render_text(report)),
        OutputFormat::Json => {
            let mut json = serde_jcs::to_string(report)
                .map_err(|err| CliError::new(format!("report serialization failed: {err}")))?;
            json.push('\n');
            write_stdout(&json)
        }
    }
}

/// Renders a report for humans, one predicate per line.
fn render_text(report: &EvaluationReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        let mark = if outcome.passed { "PASS" } else { "FAIL" };
        let _ = write!(out, "{mark} {}: {}", outcome.predicate, outcome.detail);
        if let Some(offense) = &outcome.offense {
            let _ = write!(out, " (record #{}: {})", offense.index + 1, offense.record.to_json_line());
        }
        out.push('\n');
    }
    let verdict = if report.passed() { "passed" } else { "failed" };
    let _ = writeln!(out, "{} records, {verdict}", report.records_seen);
    out
}

/// Writes text to stdout.
fn write_stdout(text: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    stdout
        .write_all(text.as_bytes())
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns the error exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(&format!("error: {message}"));
    ExitCode::from(EXIT_ERROR)
}
