//! Tracing subscriber setup shared by the CLI and tests.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_DIRECTIVES: &str = "info";

/// Install a global `fmt` subscriber. `RUST_LOG` wins over `default_level`.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_tracing(default_level: Option<&str>) {
    let directives = default_level.unwrap_or(DEFAULT_DIRECTIVES);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();
}

/// Subscriber for tests: captures output through the test harness writer.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(filter)
        .try_init();
}
