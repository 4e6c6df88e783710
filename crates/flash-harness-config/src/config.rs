// crates/flash-harness-config/src/config.rs
// ============================================================================
// Module: Flash Harness Configuration
// Description: Configuration loading and validation for the regression harness.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section has defaults matching the Dec-04-2021 mainnet regression
//! runs, so an empty file is a valid configuration. Unknown keys and
//! malformed values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::address::Address;
use crate::env::HarnessEnvConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "flash-harness.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "FLASH_HARNESS_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 256 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a URL.
const MAX_URL_LENGTH: usize = 2048;
/// Maximum number of liquidator command or extra-argument entries.
const MAX_COMMAND_ARGS: usize = 64;
/// Maximum number of base-to-debt threshold entries.
const MAX_THRESHOLDS: usize = 256;
/// Maximum digits in a threshold (fits a uint256).
const MAX_THRESHOLD_DIGITS: usize = 78;
/// Hex digits in a base identifier (bytes6).
const BASE_ID_HEX_DIGITS: usize = 12;
/// Hex digits in a private key.
const PRIVATE_KEY_HEX_DIGITS: usize = 64;
/// Upper bound for any configured timeout.
const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Default node JSON-RPC endpoint.
pub const DEFAULT_NODE_URL: &str = "http://127.0.0.1:8545/";
/// Default chain id of a local development node.
pub const DEFAULT_CHAIN_ID: u64 = 31_337;
/// Default archive endpoint template; the API key is appended.
pub const ALCHEMY_MAINNET_URL: &str = "https://eth-mainnet.alchemyapi.io/v2/";
/// Default file holding the archive API key.
const DEFAULT_ALCHEMY_KEY_PATH: &str = ".alchemyKey";
/// Default liquidator log filter.
pub const DEFAULT_RUST_LOG: &str = "liquidator,yield_liquidator=debug";
/// Default persistence sink handed to the liquidator.
const DEFAULT_PERSISTENCE_FILE: &str = "/dev/null";
/// Default gas boost percentage.
const DEFAULT_GAS_BOOST: u16 = 10;
/// Default liquidator timeout (the mainnet runs take several minutes).
const DEFAULT_LIQUIDATOR_TIMEOUT_SECS: u64 = 1800;
/// Default node readiness timeout.
const DEFAULT_READY_TIMEOUT_SECS: u64 = 60;
/// Default per-request RPC timeout (fork resets can be slow).
const DEFAULT_RPC_TIMEOUT_SECS: u64 = 300;

/// Yield v2 Witch on mainnet.
const MAINNET_WITCH: &str = "0x53C3760670f6091E1eC76B4dd27f73ba4CAd5061";
/// Multicall2 on mainnet.
const MAINNET_MULTICALL2: &str = "0x5ba1e12693dc8f9c48aad8770482f4739beed696";
/// Uniswap v3 factory on mainnet.
const MAINNET_UNISWAP_FACTORY: &str = "0x1F98431c8aD98523631AE4a59f267346ea31F984";
/// Uniswap v3 swap router on mainnet.
const MAINNET_UNISWAP_ROUTER: &str = "0xE592427A0AEce92De3Edee1F18E0157C05861564";
/// Hardhat artifact of the flash liquidator contract.
const DEFAULT_FLASH_ARTIFACT: &str = "artifacts/contracts/FlashLiquidator.sol/FlashLiquidator.json";
/// Private key of development node account #0.
pub const DEV_ACCOUNT_0_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Regression harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Local forking node.
    #[serde(default)]
    pub node: NodeConfig,
    /// Archive source for mainnet forks.
    #[serde(default)]
    pub fork: ForkConfig,
    /// Liquidator launch settings.
    #[serde(default)]
    pub liquidator: LiquidatorSettings,
    /// Mainnet contract addresses and the flash liquidator artifact.
    #[serde(default)]
    pub contracts: ContractsConfig,
    /// Account that deploys contracts and runs the liquidator.
    #[serde(default)]
    pub deployer: DeployerConfig,
}

impl HarnessConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.node.validate()?;
        self.fork.validate()?;
        self.liquidator.validate()?;
        self.contracts.validate()?;
        self.deployer.validate()?;
        Ok(())
    }

    /// Applies environment overrides and re-validates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an override produces an invalid config.
    pub fn apply_env(&mut self, overrides: &HarnessEnvConfig) -> Result<(), ConfigError> {
        if let Some(url) = &overrides.node_url {
            self.node.url.clone_from(url);
        }
        if let Some(url) = &overrides.archive_url {
            self.fork.archive_url = Some(url.clone());
        }
        if let Some(timeout) = overrides.timeout {
            self.liquidator.timeout_secs = timeout.as_secs();
        }
        self.validate()
    }
}

/// Local node settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    /// JSON-RPC endpoint handed to the liquidator and used by the harness.
    #[serde(default = "default_node_url")]
    pub url: String,
    /// Chain id the node reports.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Optional command that starts the node; the harness expects a running
    /// node when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    /// Seconds to wait for the node to answer.
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,
    /// Per-request RPC timeout in seconds.
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: default_node_url(),
            chain_id: default_chain_id(),
            command: None,
            ready_timeout_secs: default_ready_timeout_secs(),
            rpc_timeout_secs: default_rpc_timeout_secs(),
        }
    }
}

impl NodeConfig {
    /// Returns the readiness timeout.
    #[must_use]
    pub const fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    /// Returns the per-request RPC timeout.
    #[must_use]
    pub const fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    /// Validates node settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("node.url", &self.url)?;
        if self.chain_id == 0 {
            return Err(ConfigError::Invalid("node.chain_id must be non-zero".to_string()));
        }
        if let Some(command) = &self.command {
            validate_command("node.command", command)?;
        }
        validate_timeout("node.ready_timeout_secs", self.ready_timeout_secs)?;
        validate_timeout("node.rpc_timeout_secs", self.rpc_timeout_secs)
    }
}

/// Archive source used to fork mainnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForkConfig {
    /// Full archive endpoint; takes precedence over the key file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_url: Option<String>,
    /// File holding an Alchemy API key, relative to the working directory.
    #[serde(default = "default_alchemy_key_path")]
    pub alchemy_key_path: PathBuf,
}

impl Default for ForkConfig {
    fn default() -> Self {
        Self {
            archive_url: None,
            alchemy_key_path: default_alchemy_key_path(),
        }
    }
}

impl ForkConfig {
    /// Resolves the archive endpoint, reading the key file when no URL is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the key file cannot be read and
    /// [`ConfigError::Invalid`] when it is empty.
    pub fn resolve_archive_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.archive_url {
            return Ok(url.clone());
        }
        let key = fs::read_to_string(&self.alchemy_key_path).map_err(|err| {
            ConfigError::Io(format!(
                "cannot read archive key {}: {err}",
                self.alchemy_key_path.display()
            ))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::Invalid("archive key file is empty".to_string()));
        }
        Ok(format!("{ALCHEMY_MAINNET_URL}{key}"))
    }

    /// Validates fork settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.archive_url {
            validate_http_url("fork.archive_url", url)?;
        }
        validate_path_string("fork.alchemy_key_path", &self.alchemy_key_path.to_string_lossy())
    }
}

/// How the liquidator under test is launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LiquidatorSettings {
    /// Program and leading arguments (for example `cargo run --`).
    #[serde(default = "default_liquidator_command")]
    pub command: Vec<String>,
    /// Working directory for the liquidator process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    /// Extra gas, percent of the estimate.
    #[serde(default = "default_gas_boost")]
    pub gas_boost: u16,
    /// Log filter passed as `RUST_LOG` unless the environment sets one.
    #[serde(default = "default_rust_log")]
    pub rust_log: String,
    /// Persistence file argument.
    #[serde(default = "default_persistence_file")]
    pub file: String,
    /// Seconds before the liquidator is killed.
    #[serde(default = "default_liquidator_timeout_secs")]
    pub timeout_secs: u64,
    /// Minimum collateral/debt ratio, percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ratio: Option<u16>,
    /// Seconds before gas is bumped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bump_gas_delay: Option<u64>,
    /// Multicall batch size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multicall_batch_size: Option<usize>,
    /// Polling interval in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    /// Block to start watching from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_block: Option<u64>,
    /// Instance name used in liquidator logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,
    /// Arguments appended verbatim.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,
}

impl Default for LiquidatorSettings {
    fn default() -> Self {
        Self {
            command: default_liquidator_command(),
            working_dir: None,
            gas_boost: default_gas_boost(),
            rust_log: default_rust_log(),
            file: default_persistence_file(),
            timeout_secs: default_liquidator_timeout_secs(),
            min_ratio: None,
            bump_gas_delay: None,
            multicall_batch_size: None,
            interval: None,
            start_block: None,
            instance_name: None,
            extra_args: Vec::new(),
        }
    }
}

impl LiquidatorSettings {
    /// Returns the liquidator timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validates launch settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_command("liquidator.command", &self.command)?;
        if self.extra_args.len() > MAX_COMMAND_ARGS {
            return Err(ConfigError::Invalid("liquidator.extra_args has too many entries".to_string()));
        }
        if let Some(dir) = &self.working_dir {
            validate_path_string("liquidator.working_dir", &dir.to_string_lossy())?;
        }
        if self.rust_log.trim().is_empty() {
            return Err(ConfigError::Invalid("liquidator.rust_log must be non-empty".to_string()));
        }
        validate_path_string("liquidator.file", &self.file)?;
        validate_timeout("liquidator.timeout_secs", self.timeout_secs)?;
        if self.multicall_batch_size == Some(0) {
            return Err(ConfigError::Invalid(
                "liquidator.multicall_batch_size must be greater than zero".to_string(),
            ));
        }
        if self.interval == Some(0) {
            return Err(ConfigError::Invalid(
                "liquidator.interval must be greater than zero".to_string(),
            ));
        }
        if let Some(name) = &self.instance_name {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "liquidator.instance_name must be non-empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Contract addresses the scenario deploys against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractsConfig {
    /// Yield v2 Witch (auction house).
    #[serde(default = "default_witch")]
    pub witch: Address,
    /// Multicall2 aggregator.
    #[serde(default = "default_multicall2")]
    pub multicall2: Address,
    /// Uniswap v3 factory, a flash liquidator constructor argument.
    #[serde(default = "default_uniswap_factory")]
    pub uniswap_factory: Address,
    /// Uniswap v3 router, a flash liquidator constructor argument.
    #[serde(default = "default_uniswap_router")]
    pub uniswap_router: Address,
    /// Optional Uniswap SwapRouter02 handed to the liquidator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_router02: Option<Address>,
    /// Hardhat artifact JSON holding the flash liquidator bytecode.
    #[serde(default = "default_flash_artifact")]
    pub flash_liquidator_artifact: PathBuf,
    /// Base id (`0x` + 12 hex digits) to minimum debt, as a decimal string.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub base_to_debt_threshold: BTreeMap<String, String>,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            witch: default_witch(),
            multicall2: default_multicall2(),
            uniswap_factory: default_uniswap_factory(),
            uniswap_router: default_uniswap_router(),
            swap_router02: None,
            flash_liquidator_artifact: default_flash_artifact(),
            base_to_debt_threshold: BTreeMap::new(),
        }
    }
}

impl ContractsConfig {
    /// Returns the flash liquidator constructor arguments in order.
    #[must_use]
    pub fn flash_constructor_args(&self) -> [&Address; 3] {
        [&self.witch, &self.uniswap_factory, &self.uniswap_router]
    }

    /// Validates contract settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string(
            "contracts.flash_liquidator_artifact",
            &self.flash_liquidator_artifact.to_string_lossy(),
        )?;
        if self.base_to_debt_threshold.len() > MAX_THRESHOLDS {
            return Err(ConfigError::Invalid(
                "contracts.base_to_debt_threshold has too many entries".to_string(),
            ));
        }
        for (base_id, threshold) in &self.base_to_debt_threshold {
            validate_base_id(base_id)?;
            validate_threshold(base_id, threshold)?;
        }
        Ok(())
    }
}

/// Deploying account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployerConfig {
    /// `0x`-prefixed private key; also handed to the liquidator.
    #[serde(default = "default_private_key")]
    pub private_key: String,
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self {
            private_key: default_private_key(),
        }
    }
}

impl DeployerConfig {
    /// Returns the key as written to the liquidator's key file (no `0x`).
    #[must_use]
    pub fn key_file_contents(&self) -> &str {
        let trimmed = self.private_key.trim();
        trimmed.strip_prefix("0x").unwrap_or(trimmed)
    }

    /// Validates the deployer key.
    fn validate(&self) -> Result<(), ConfigError> {
        let digits = self.key_file_contents();
        if digits.len() != PRIVATE_KEY_HEX_DIGITS || !digits.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(ConfigError::Invalid(
                "deployer.private_key must be 32 bytes of hex".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default node JSON-RPC endpoint.
fn default_node_url() -> String {
    DEFAULT_NODE_URL.to_string()
}

/// Default node chain id.
const fn default_chain_id() -> u64 {
    DEFAULT_CHAIN_ID
}

/// Default node readiness timeout in seconds.
const fn default_ready_timeout_secs() -> u64 {
    DEFAULT_READY_TIMEOUT_SECS
}

/// Default per-request RPC timeout in seconds.
const fn default_rpc_timeout_secs() -> u64 {
    DEFAULT_RPC_TIMEOUT_SECS
}

/// Default archive key file.
fn default_alchemy_key_path() -> PathBuf {
    PathBuf::from(DEFAULT_ALCHEMY_KEY_PATH)
}

/// Default liquidator launch command.
fn default_liquidator_command() -> Vec<String> {
    vec!["cargo".to_string(), "run".to_string(), "--".to_string()]
}

/// Default gas boost percentage.
const fn default_gas_boost() -> u16 {
    DEFAULT_GAS_BOOST
}

/// Default liquidator log filter.
fn default_rust_log() -> String {
    DEFAULT_RUST_LOG.to_string()
}

/// Default persistence sink.
fn default_persistence_file() -> String {
    DEFAULT_PERSISTENCE_FILE.to_string()
}

/// Default liquidator timeout in seconds.
const fn default_liquidator_timeout_secs() -> u64 {
    DEFAULT_LIQUIDATOR_TIMEOUT_SECS
}

/// Wraps a built-in mainnet address constant.
fn builtin_address(value: &'static str) -> Address {
    Address::from_literal(value)
}

/// Mainnet Witch.
fn default_witch() -> Address {
    builtin_address(MAINNET_WITCH)
}

/// Mainnet Multicall2.
fn default_multicall2() -> Address {
    builtin_address(MAINNET_MULTICALL2)
}

/// Mainnet Uniswap v3 factory.
fn default_uniswap_factory() -> Address {
    builtin_address(MAINNET_UNISWAP_FACTORY)
}

/// Mainnet Uniswap v3 router.
fn default_uniswap_router() -> Address {
    builtin_address(MAINNET_UNISWAP_ROUTER)
}

/// Default flash liquidator artifact path.
fn default_flash_artifact() -> PathBuf {
    PathBuf::from(DEFAULT_FLASH_ARTIFACT)
}

/// Development node account #0 key.
fn default_private_key() -> String {
    DEV_ACCOUNT_0_KEY.to_string()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Requires an `http://` or `https://` URL within the length limit.
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| ConfigError::Invalid(format!("{field} must be an http(s) url")))?;
    if rest.is_empty() || rest.starts_with('/') {
        return Err(ConfigError::Invalid(format!("{field} must include a host")));
    }
    Ok(())
}

/// Requires a non-empty program followed by a bounded argument list.
fn validate_command(field: &str, command: &[String]) -> Result<(), ConfigError> {
    let Some(program) = command.first() else {
        return Err(ConfigError::Invalid(format!("{field} must name a program")));
    };
    if program.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} program must be non-empty")));
    }
    if command.len() > MAX_COMMAND_ARGS {
        return Err(ConfigError::Invalid(format!("{field} has too many entries")));
    }
    Ok(())
}

/// Requires a positive timeout within the global bound.
fn validate_timeout(field: &str, secs: u64) -> Result<(), ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid(format!("{field} must be greater than zero")));
    }
    if secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Invalid(format!("{field} exceeds {MAX_TIMEOUT_SECS} seconds")));
    }
    Ok(())
}

/// Requires `0x` followed by 12 hex digits.
fn validate_base_id(base_id: &str) -> Result<(), ConfigError> {
    let valid = base_id.strip_prefix("0x").is_some_and(|digits| {
        digits.len() == BASE_ID_HEX_DIGITS && digits.chars().all(|c| c.is_ascii_hexdigit())
    });
    if !valid {
        return Err(ConfigError::Invalid(format!(
            "contracts.base_to_debt_threshold key `{base_id}` must be 0x + 12 hex digits"
        )));
    }
    Ok(())
}

/// Requires a decimal integer that fits a uint256.
fn validate_threshold(base_id: &str, threshold: &str) -> Result<(), ConfigError> {
    if threshold.is_empty()
        || threshold.len() > MAX_THRESHOLD_DIGITS
        || !threshold.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ConfigError::Invalid(format!(
            "contracts.base_to_debt_threshold[{base_id}] must be a decimal integer"
        )));
    }
    Ok(())
}
