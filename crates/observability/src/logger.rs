//! Logger collaborator.
//!
//! Services receive an `Arc<dyn Logger>` at construction and report through
//! it with the name of the emitting component as `source`. Logging is
//! fire-and-forget: nothing the logger does can fail a service call.

use std::sync::Mutex;

/// Severity of a recorded entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

/// Structured logger used by the service layer.
pub trait Logger: Send + Sync {
    fn log(&self, message: &str, source: &str);
    fn error(&self, message: &str, source: &str);
}

/// Production logger: forwards to `tracing` with the source as a field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str, source: &str) {
        tracing::info!(source, "{message}");
    }

    fn error(&self, message: &str, source: &str) {
        tracing::error!(source, "{message}");
    }
}

/// A single captured log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub source: String,
    pub message: String,
}

/// In-memory logger for tests/dev: keeps every entry for later inspection.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    /// Messages logged at info level, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == LogLevel::Info)
            .map(|e| e.message)
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == LogLevel::Error)
            .map(|e| e.message)
            .collect()
    }

    fn push(&self, level: LogLevel, message: &str, source: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                level,
                source: source.to_string(),
                message: message.to_string(),
            });
        }
    }
}

impl Logger for RecordingLogger {
    fn log(&self, message: &str, source: &str) {
        self.push(LogLevel::Info, message, source);
    }

    fn error(&self, message: &str, source: &str) {
        self.push(LogLevel::Error, message, source);
    }
}
