//! Subscriber configuration.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber: JSON lines on stderr, filtered through
/// `RUST_LOG` with an `info` fallback.
///
/// Repeated calls are no-ops; the first subscriber wins.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .json()
        .flatten_event(true)
        .with_target(false)
        .try_init();
}
