// system-tests/tests/helpers/runner.rs
// ============================================================================
// Module: Scenario Runner Setup
// Description: Builds reporters and node-backed runners for system-tests.
// ============================================================================

use std::path::Path;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use flash_harness::NodeHandle;
use flash_harness::RpcClient;
use flash_harness::ScenarioReporter;
use flash_harness::ScenarioRunner;
use flash_harness::ensure_node;
use flash_harness_config::HarnessConfig;
use flash_harness_config::HarnessEnvConfig;

/// Config file read when `FLASH_HARNESS_CONFIG` is unset.
const LOCAL_CONFIG: &str = "flash-harness.toml";

/// Serializes tests that reset the shared node.
static FORK_LOCK: Mutex<()> = Mutex::new(());

/// Holds the node for one scenario; a failed test does not poison it.
pub fn fork_lock() -> MutexGuard<'static, ()> {
    FORK_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Loads the harness environment overrides.
pub fn env_config() -> HarnessEnvConfig {
    HarnessEnvConfig::load().expect("harness env")
}

/// Creates a reporter writing under the run root.
pub fn reporter(scenario: &str) -> ScenarioReporter {
    ScenarioReporter::new(scenario, &env_config()).expect("scenario reporter")
}

/// Loads the harness config from the environment or the local file, with
/// defaults when neither exists.
pub fn harness_config() -> HarnessConfig {
    let explicit = std::env::var_os("FLASH_HARNESS_CONFIG").is_some();
    let mut config = if explicit || Path::new(LOCAL_CONFIG).exists() {
        HarnessConfig::load(None).expect("harness config")
    } else {
        HarnessConfig::default()
    };
    config.apply_env(&env_config()).expect("env overrides");
    config
}

/// Starts or attaches to the node and returns a runner bound to it.
pub fn node_runner() -> (NodeHandle, ScenarioRunner) {
    let config = harness_config();
    let rpc = RpcClient::new(&config.node.url, config.node.rpc_timeout()).expect("rpc client");
    let node = ensure_node(&config.node, &rpc).expect("node");
    let runner = ScenarioRunner::new(config).expect("scenario runner");
    (node, runner)
}
