//! Tracing setup for tests

use tracing_subscriber::EnvFilter;

/// Installs a per-test tracing subscriber.
///
/// Output goes through the test writer so it only shows for failing tests;
/// filter with `RUST_LOG` as usual. Safe to call from every test - later
/// calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
