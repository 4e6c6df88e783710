// system-tests/tests/helpers/liquidator.rs
// ============================================================================
// Module: Scripted Liquidator Launcher
// Description: Runs `scripted-liquidator` through the harness process path.
// ============================================================================

use std::path::Path;
use std::time::Duration;

use flash_harness::CapturedRun;
use flash_harness::HarnessError;
use flash_harness::LiquidatorInvocation;
use flash_harness::prepare_liquidator_files;
use flash_harness_config::Address;
use flash_harness_config::HarnessConfig;
use flash_harness_config::LiquidatorConfig;
use flash_harness_config::LiquidatorSettings;
use system_tests::scripted::Script;

/// Address the scripted runs pretend the flash liquidator was deployed at.
pub const FLASH: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

/// Timeout used for scripts expected to exit on their own.
pub const RUN_TIMEOUT: Duration = Duration::from_secs(30);

/// Launch settings pointing at the scripted binary.
pub fn settings(instance_name: &str) -> LiquidatorSettings {
    LiquidatorSettings {
        command: vec![env!("CARGO_BIN_EXE_scripted-liquidator").to_string()],
        instance_name: Some(instance_name.to_string()),
        ..LiquidatorSettings::default()
    }
}

/// Builds the invocation for `instance_name`, writing its files under `dir`.
pub fn invocation(dir: &Path, instance_name: &str) -> LiquidatorInvocation {
    let config = HarnessConfig::default();
    let flash: Address = FLASH.parse().expect("flash address");
    let liquidator = LiquidatorConfig::for_deployment(&config.contracts, flash);
    let (config_path, key_path) =
        prepare_liquidator_files(dir, &liquidator, &config.deployer).expect("prepare files");
    LiquidatorInvocation::new(
        &settings(instance_name),
        &config_path,
        &config.node.url,
        config.node.chain_id,
        &key_path,
    )
    .expect("invocation")
}

/// Runs `script` to completion.
pub fn run_script(dir: &Path, script: Script, timeout: Duration) -> Result<CapturedRun, HarnessError> {
    invocation(dir, script.as_str()).run(timeout)
}
