//! Logging bootstrap.
//!
//! Thin wrapper over `env_logger` so host applications and tests initialize
//! logging the same way. Filtering follows `RUST_LOG`, defaulting to `info`.

use env_logger::Env;

/// Initialize global logging. Panics if a logger is already installed.
pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Initialize global logging, doing nothing if a logger is already
/// installed. Suitable for tests.
pub fn try_init() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init();
}
