// crates/flash-harness/src/process.rs
// ============================================================================
// Module: Liquidator Process
// Description: Builds, launches, and captures one liquidator run.
// Purpose: Turn harness config into an exact command line and captured output.
// Dependencies: flash-harness-config, liquidator-oracle, tracing
// ============================================================================

//! ## Overview
//! A run writes the liquidator's JSON config and key file, launches the
//! configured command with the regression arguments (`--one-shot`,
//! `--json-log`, ...), and captures stdout and stderr in full. Exit status is
//! recorded but never judged here. A run that outlives its timeout is killed
//! and reported as an error.
//!
//! On unix the liquidator leads its own process group. A timeout kills the
//! whole group, so `cargo run` cannot leave the real binary behind, and
//! processes still in the group when the leader exits are killed too.
//!
//! Environment defaults (`RUST_BACKTRACE`, `RUST_LOG`) only apply when the
//! harness's own environment does not already set them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::io::Read;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::path::PathBuf;
use std::process::Child;
use std::process::Command;
use std::process::Stdio;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;
use std::time::Instant;

use flash_harness_config::DeployerConfig;
use flash_harness_config::LiquidatorConfig;
use flash_harness_config::LiquidatorSettings;
use liquidator_oracle::LogRecord;
use liquidator_oracle::ParseError;
use liquidator_oracle::read_records;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::error::HarnessError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Name of the liquidator config file inside the run directory.
pub const CONFIG_FILE_NAME: &str = "config.json";
/// Name of the private key file inside the run directory.
pub const KEY_FILE_NAME: &str = "private_key";
/// Delay between exit polls.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// SECTION: Workspace Files
// ============================================================================

/// Writes the liquidator config and key file into `dir`.
///
/// Returns `(config_path, key_path)`.
///
/// # Errors
///
/// Returns [`HarnessError`] when either file cannot be written.
pub fn prepare_liquidator_files(
    dir: &Path,
    config: &LiquidatorConfig,
    deployer: &DeployerConfig,
) -> Result<(PathBuf, PathBuf), HarnessError> {
    fs::create_dir_all(dir)?;
    let config_path = dir.join(CONFIG_FILE_NAME);
    config.write(&config_path)?;
    let key_path = dir.join(KEY_FILE_NAME);
    fs::write(&key_path, deployer.key_file_contents())?;
    Ok((config_path, key_path))
}

// ============================================================================
// SECTION: Invocation
// ============================================================================

/// Fully resolved liquidator command line and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidatorInvocation {
    /// Program to execute.
    program: String,
    /// Arguments in order.
    args: Vec<String>,
    /// Environment defaults, applied only when unset in the harness.
    env_defaults: Vec<(String, String)>,
    /// Working directory.
    working_dir: Option<PathBuf>,
}

impl LiquidatorInvocation {
    /// Builds the regression command line.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Process`] when the configured command is empty.
    pub fn new(
        settings: &LiquidatorSettings,
        config_path: &Path,
        node_url: &str,
        chain_id: u64,
        key_path: &Path,
    ) -> Result<Self, HarnessError> {
        let (program, leading) = settings
            .command
            .split_first()
            .ok_or_else(|| HarnessError::Process("liquidator command is empty".to_string()))?;
        let mut args: Vec<String> = leading.to_vec();
        args.extend([
            "-c".to_string(),
            config_path.display().to_string(),
            "-u".to_string(),
            node_url.to_string(),
            "-C".to_string(),
            chain_id.to_string(),
            "-p".to_string(),
            key_path.display().to_string(),
            "--gas-boost".to_string(),
            settings.gas_boost.to_string(),
            "--one-shot".to_string(),
            "--json-log".to_string(),
            "--file".to_string(),
            settings.file.clone(),
        ]);
        push_option(&mut args, "--min-ratio", settings.min_ratio);
        push_option(&mut args, "--bump-gas-delay", settings.bump_gas_delay);
        push_option(&mut args, "--multicall-batch-size", settings.multicall_batch_size);
        push_option(&mut args, "--interval", settings.interval);
        push_option(&mut args, "--start-block", settings.start_block);
        push_option(&mut args, "--instance-name", settings.instance_name.as_deref());
        args.extend(settings.extra_args.iter().cloned());
        Ok(Self {
            program: program.clone(),
            args,
            env_defaults: vec![
                ("RUST_BACKTRACE".to_string(), "1".to_string()),
                ("RUST_LOG".to_string(), settings.rust_log.clone()),
            ],
            working_dir: settings.working_dir.clone(),
        })
    }

    /// Returns the program.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the environment that will be applied, after precedence.
    #[must_use]
    pub fn effective_env(&self) -> Vec<(String, String)> {
        self.env_defaults
            .iter()
            .filter(|(key, _)| env::var_os(key).is_none())
            .cloned()
            .collect()
    }

    /// Runs the liquidator to completion or until `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Process`] when the command cannot be spawned and
    /// [`HarnessError::Timeout`] when it outlives `timeout` (it is killed).
    pub fn run(&self, timeout: Duration) -> Result<CapturedRun, HarnessError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.effective_env())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        #[cfg(unix)]
        command.process_group(0);
        info!(program = self.program.as_str(), args = %self.args.join(" "), "launching liquidator");
        let started = Instant::now();
        let mut child = command.spawn().map_err(|err| {
            HarnessError::Process(format!("failed to spawn `{}`: {err}", self.program))
        })?;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_with_timeout(&mut child, timeout, started)?;
        let elapsed = started.elapsed();
        if kill_process_group(child.id()) {
            warn!("killed processes the liquidator left running");
        }
        let stdout = join_drain(stdout)?;
        let stderr = join_drain(stderr)?;
        let exit_code = status.code();
        if status.success() {
            info!(elapsed_ms = elapsed.as_millis(), "liquidator exited");
        } else {
            warn!(exit_code, elapsed_ms = elapsed.as_millis(), "liquidator exited with failure");
        }
        Ok(CapturedRun {
            exit_code,
            success: status.success(),
            stdout,
            stderr,
            elapsed,
        })
    }
}

/// Appends `flag value` when `value` is set.
fn push_option<T: ToString>(args: &mut Vec<String>, flag: &str, value: Option<T>) {
    if let Some(value) = value {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}

/// Polls the child until it exits or the deadline passes.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    started: Instant,
) -> Result<std::process::ExitStatus, HarnessError> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if started.elapsed() > timeout {
                    kill_tree(child);
                    return Err(HarnessError::Timeout {
                        what: "liquidator run".to_string(),
                        elapsed: started.elapsed(),
                    });
                }
                thread::sleep(EXIT_POLL_INTERVAL);
            }
            Err(err) => {
                kill_tree(child);
                return Err(HarnessError::Process(format!("wait on liquidator failed: {err}")));
            }
        }
    }
}

/// Kills the child together with every process in its group.
fn kill_tree(child: &mut Child) {
    kill_process_group(child.id());
    let _ = child.kill();
    let _ = child.wait();
}

/// Sends SIGKILL to the process group led by `leader`.
///
/// Returns true when at least one process was signalled.
#[cfg(unix)]
fn kill_process_group(leader: u32) -> bool {
    Command::new("kill")
        .args(["-KILL", "--", &format!("-{leader}")])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Process groups are unix-only; the direct child is killed instead.
#[cfg(not(unix))]
const fn kill_process_group(_leader: u32) -> bool {
    false
}

/// Reads a pipe to the end on a background thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<std::io::Result<Vec<u8>>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

/// Collects the bytes read by [`drain`].
fn join_drain(
    handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
) -> Result<Vec<u8>, HarnessError> {
    let Some(handle) = handle else {
        return Ok(Vec::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| HarnessError::Process("output reader panicked".to_string()))??;
    debug!(bytes = bytes.len(), "captured pipe");
    Ok(bytes)
}

// ============================================================================
// SECTION: Captured Output
// ============================================================================

/// Exit status and full output of one liquidator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRun {
    /// Exit code, absent when killed by a signal.
    pub exit_code: Option<i32>,
    /// Whether the process reported success.
    pub success: bool,
    /// Raw standard output.
    pub stdout: Vec<u8>,
    /// Raw standard error.
    pub stderr: Vec<u8>,
    /// Wall time from spawn to exit.
    pub elapsed: Duration,
}

impl CapturedRun {
    /// Parses stdout into log records, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when stdout is not UTF-8 or holds a malformed line.
    pub fn records(&self) -> Result<Vec<LogRecord>, ParseError> {
        read_records(self.stdout.as_slice())
    }

    /// Returns stdout as text, replacing invalid UTF-8.
    #[must_use]
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Returns stderr as text, replacing invalid UTF-8.
    #[must_use]
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}
