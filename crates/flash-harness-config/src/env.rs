// crates/flash-harness-config/src/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed overrides for harness runs.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 or empty values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for harness overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Optional run root override for artifacts.
    RunRoot,
    /// Optional liquidator timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Optional node JSON-RPC endpoint override.
    NodeUrl,
    /// Optional archive endpoint override.
    ArchiveUrl,
    /// Allow reusing an existing run root (`true`/`false` or `1`/`0`).
    AllowOverwrite,
}

impl HarnessEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "FLASH_HARNESS_RUN_ROOT",
            Self::TimeoutSeconds => "FLASH_HARNESS_TIMEOUT_SEC",
            Self::NodeUrl => "FLASH_HARNESS_NODE_URL",
            Self::ArchiveUrl => "FLASH_HARNESS_ARCHIVE_URL",
            Self::AllowOverwrite => "FLASH_HARNESS_ALLOW_OVERWRITE",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed overrides derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HarnessEnvConfig {
    /// Optional run root override.
    pub run_root: Option<PathBuf>,
    /// Optional liquidator timeout override.
    pub timeout: Option<Duration>,
    /// Optional node endpoint override.
    pub node_url: Option<String>,
    /// Optional archive endpoint override.
    pub archive_url: Option<String>,
    /// Allow reusing an existing run root.
    pub allow_overwrite: bool,
}

impl HarnessEnvConfig {
    /// Loads overrides from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, an invalid timeout or boolean value).
    pub fn load() -> Result<Self, String> {
        let run_root = read_env_nonempty(HarnessEnv::RunRoot.as_str())?.map(PathBuf::from);
        let timeout = read_env_nonempty(HarnessEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(HarnessEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let node_url = read_env_nonempty(HarnessEnv::NodeUrl.as_str())?;
        let archive_url = read_env_nonempty(HarnessEnv::ArchiveUrl.as_str())?;
        let allow_overwrite = parse_bool_env(
            HarnessEnv::AllowOverwrite.as_str(),
            read_env_nonempty(HarnessEnv::AllowOverwrite.as_str())?,
        )?;
        Ok(Self {
            run_root,
            timeout,
            node_url,
            archive_url,
            allow_overwrite,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a boolean environment variable, defaulting to false when unset.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}
