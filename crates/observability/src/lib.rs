//! Process-wide logging setup.

/// Structured logging configuration.
pub mod logging;

pub use logging::LogFormat;

/// Initialize JSON logging filtered by `RUST_LOG` (default `info`).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    logging::init(LogFormat::Json, "info");
}

/// Human-readable logs captured by the test harness.
pub fn init_for_tests() {
    logging::init_test_writer("debug");
}
