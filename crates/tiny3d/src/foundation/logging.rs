//! Logging utilities and structured logging support
//!
//! The engine logs through the `log` facade; applications pick the backend.
//! These helpers wire up `env_logger` for tools and tests.

pub use log::{debug, info, warn, error, trace};

use crate::core::config::LoggingConfig;

/// Initialize the logging system from `RUST_LOG`
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let _ = env_logger::Builder::from_default_env().try_init();
}

/// Initialize the logging system with an explicit filter such as `"debug"`
/// or `"tiny3d::scene=trace"`. `RUST_LOG` still takes precedence when set.
pub fn init_with_level(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Initialize logging from the `[logging]` section of a scene configuration
pub fn init_from_config(config: &LoggingConfig) {
    init_with_level(&config.level);
}

/// Initialize logging for unit tests (captured by the test harness)
#[cfg(test)]
pub fn init_for_tests() {
    let _ = env_logger::Builder::from_default_env().is_test(true).try_init();
}
