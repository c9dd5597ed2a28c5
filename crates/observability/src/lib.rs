//! Tracing/logging setup shared by the binaries.

/// Initialize process-wide observability (JSON logs filtered by `RUST_LOG`).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Subscriber configuration (filters, output format).
pub mod tracing;
