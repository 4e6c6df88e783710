// system-tests/src/bin/scripted_liquidator.rs
// ============================================================================
// Module: Scripted Liquidator
// Description: Stand-in for the liquidator binary with canned output.
// Purpose: Exercise the harness process path offline.
// Dependencies: clap, serde_json, system-tests
// ============================================================================

//! ## Overview
//! Accepts the liquidator's regression command line, checks the config and
//! key files the harness wrote, then prints the transcript selected by
//! `--instance-name` (default `ens`). Unknown flags are rejected the way the
//! real binary rejects them, so a drifting argument layout fails loudly.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;
use serde_json::Value;
use system_tests::scripted::Script;
use system_tests::scripted::record;
use system_tests::scripted::startup;

/// How long the `hang` script sleeps.
const HANG_DURATION: Duration = Duration::from_secs(600);

/// Liquidator command line.
#[derive(Parser, Debug)]
#[command(name = "scripted-liquidator")]
struct LiquidatorArgs {
    /// Liquidator config JSON.
    #[arg(short = 'c', long)]
    config: PathBuf,
    /// Node URL.
    #[arg(short = 'u', long)]
    url: String,
    /// Chain id.
    #[arg(short = 'C', long)]
    chain_id: u64,
    /// Private key file.
    #[arg(short = 'p', long)]
    private_key: PathBuf,
    /// Gas boost percentage.
    #[arg(long)]
    gas_boost: u16,
    /// Exit after one pass.
    #[arg(long)]
    one_shot: bool,
    /// Log as JSON lines.
    #[arg(long)]
    json_log: bool,
    /// Persistence file.
    #[arg(long)]
    file: String,
    /// Minimum collateral ratio.
    #[arg(long)]
    min_ratio: Option<u16>,
    /// Gas bump delay in seconds.
    #[arg(long)]
    bump_gas_delay: Option<u64>,
    /// Multicall batch size.
    #[arg(long)]
    multicall_batch_size: Option<usize>,
    /// Poll interval in milliseconds.
    #[arg(long)]
    interval: Option<u64>,
    /// Starting block.
    #[arg(long)]
    start_block: Option<u64>,
    /// Transcript to replay.
    #[arg(long, default_value = "ens")]
    instance_name: String,
}

/// Entry point; startup failures are reported as an ERROR record.
fn main() -> ExitCode {
    let args = LiquidatorArgs::parse();
    let mut stdout = std::io::stdout();
    match run(&args, &mut stdout) {
        Ok(code) => code,
        Err(message) => {
            let line = record("ERROR", "liquidator", "Startup failed", &[("error", message)]);
            let _ = writeln!(stdout, "{line}");
            ExitCode::FAILURE
        }
    }
}

/// Validates inputs and prints the selected transcript.
fn run(args: &LiquidatorArgs, out: &mut impl Write) -> Result<ExitCode, String> {
    if !args.one_shot || !args.json_log {
        return Err("regression runs require --one-shot and --json-log".to_string());
    }
    let script: Script = args.instance_name.parse::<Script>().map_err(|err| err.to_string())?;
    let flash = read_flash(&args.config)?;
    check_key(&args.private_key)?;
    let rust_log = std::env::var("RUST_LOG").unwrap_or_default();

    let mut emit = |line: &str| writeln!(out, "{line}").map_err(|err| err.to_string());
    emit(&startup(&flash, args.chain_id, args.gas_boost, &rust_log))?;
    emit(&options_record(args))?;
    for line in script.transcript() {
        emit(&line)?;
    }
    out.flush().map_err(|err| err.to_string())?;
    if script == Script::Hang {
        thread::sleep(HANG_DURATION);
    }
    Ok(ExitCode::from(script.exit_code()))
}

/// DEBUG record echoing the remaining options.
fn options_record(args: &LiquidatorArgs) -> String {
    let optional = |value: Option<String>| value.unwrap_or_else(|| "default".to_string());
    record(
        "DEBUG",
        "liquidator",
        "Options",
        &[
            ("url", args.url.clone()),
            ("file", args.file.clone()),
            ("min_ratio", optional(args.min_ratio.map(|v| v.to_string()))),
            ("bump_gas_delay", optional(args.bump_gas_delay.map(|v| v.to_string()))),
            ("multicall_batch_size", optional(args.multicall_batch_size.map(|v| v.to_string()))),
            ("interval", optional(args.interval.map(|v| v.to_string()))),
            ("start_block", optional(args.start_block.map(|v| v.to_string()))),
        ],
    )
}

/// Returns the `Flash` address from the config file.
fn read_flash(path: &Path) -> Result<String, String> {
    let text = fs::read_to_string(path).map_err(|err| format!("{}: {err}", path.display()))?;
    let config: Value = serde_json::from_str(&text).map_err(|err| format!("config: {err}"))?;
    for key in ["Witch", "Multicall2"] {
        if config.get(key).and_then(Value::as_str).is_none() {
            return Err(format!("config is missing {key}"));
        }
    }
    config
        .get("Flash")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| "config is missing Flash".to_string())
}

/// Checks the key file holds 64 bare hex digits.
fn check_key(path: &Path) -> Result<(), String> {
    let key = fs::read_to_string(path).map_err(|err| format!("{}: {err}", path.display()))?;
    let key = key.trim();
    if key.len() == 64 && key.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err("private key must be 64 hex digits without 0x".to_string())
    }
}
