//! `orderflow-observability` — process-wide logging setup.
//!
//! One call to [`init`] wires structured JSON logging for every other crate;
//! nothing here knows about the domain.

pub mod tracing;

/// Initialize process-wide logging.
///
/// Safe to call repeatedly; only the first call installs a subscriber.
pub fn init() {
    tracing::init();
}
