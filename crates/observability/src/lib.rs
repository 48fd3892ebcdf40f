//! Tracing, logging (shared setup).

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// The `Logger` collaborator handed to services.
pub mod logger;

pub use logger::{LogEntry, LogLevel, Logger, RecordingLogger, TracingLogger};
pub use tracing::LogFormat;
