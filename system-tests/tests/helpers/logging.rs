// system-tests/tests/helpers/logging.rs
// ============================================================================
// Module: Test Logging
// Description: One-time tracing subscriber for system-tests.
// ============================================================================

use tracing_subscriber::EnvFilter;

/// Routes harness logs to the test writer, filtered by `FLASH_HARNESS_LOG`.
pub fn init() {
    let filter = EnvFilter::try_from_env("FLASH_HARNESS_LOG")
        .unwrap_or_else(|_| EnvFilter::new("flash_harness=debug"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}
