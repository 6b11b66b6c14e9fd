//! Tracing and logging setup shared by the binaries.

pub mod logging;

/// Initialize process-wide logging with `default_filter` as the fallback
/// directive when `RUST_LOG` is unset.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init(default_filter: &str) {
    logging::init(default_filter);
}
