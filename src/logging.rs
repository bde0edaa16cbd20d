//! Tracing subscriber setup for hosts that do not install their own.

use tracing::Level;

/// Install a stderr fmt subscriber.
///
/// `debug` enables per-stage timing events. Does nothing if a global
/// subscriber is already set, so hosts and tests can call it freely.
pub fn init(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
