//! Shared tracing setup for the console core and its test harnesses.

pub mod tracing;

/// Initialize process-wide tracing with the default filter.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}
