//! Logger initialisation.
//!
//! Call sites use the `log` facade. Records reach the `tracing-subscriber`
//! formatter through its `tracing-log` bridge and are written to stderr, so
//! stdout carries only summaries and JSON.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Filter directive for the requested verbosity.
///
/// `quiet` wins over any `-v` count.
#[must_use]
pub fn filter_directive(verbosity: u8, quiet: bool) -> &'static str {
    match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the verbosity flags when set. Calling this more than
/// once is harmless; later calls leave the first subscriber in place.
pub fn init(verbosity: u8, quiet: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbosity, quiet)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .without_time();

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        // A subscriber is already installed, e.g. by a test harness.
    }
}
