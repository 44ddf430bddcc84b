//! Logging bootstrap for wirelog binaries and tests

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;

/// Install a stderr subscriber filtered at `level`. Panics if a global
/// subscriber is already set; use [`try_init_logging`] where that can happen.
pub fn init_logging(level: Level) {
    if let Err(err) = try_init_logging(level) {
        panic!("failed to install tracing subscriber: {err}");
    }
}

/// Install a stderr subscriber filtered at `level`, failing if one is already set.
pub fn try_init_logging(level: Level) -> Result<(), TryInitError> {
    let formatting_layer = fmt::layer()
        .with_ansi(true)
        .with_level(true)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr);

    let filter_layer = tracing_subscriber::filter::LevelFilter::from_level(level);

    tracing_subscriber::registry()
        .with(formatting_layer)
        .with(filter_layer)
        .try_init()
}
