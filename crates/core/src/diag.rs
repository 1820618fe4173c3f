use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// Severity threshold for one processing pass.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Lenient parse; unknown values fall back to INFO.
    pub fn parse(value: &str) -> LogLevel {
        match value.to_ascii_uppercase().as_str() {
            "DEBUG" => LogLevel::Debug,
            "WARN" => LogLevel::Warn,
            "ERROR" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Pass-scoped leveled reporting channel.
///
/// Forwards to `tracing` under the `wireup` target. Messages below the
/// threshold are dropped, except ERROR which is always emitted. Never panics
/// and never blocks; counters are plain cells under the pipeline's
/// single-writer assumption.
#[derive(Debug)]
pub struct Diagnostics {
    threshold: LogLevel,
    warnings: Cell<usize>,
    errors: Cell<usize>,
}

impl Diagnostics {
    pub fn new(threshold: LogLevel) -> Self {
        Self {
            threshold,
            warnings: Cell::new(0),
            errors: Cell::new(0),
        }
    }

    pub fn threshold(&self) -> LogLevel {
        self.threshold
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.get()
    }

    pub fn error_count(&self) -> usize {
        self.errors.get()
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.threshold
    }

    pub fn debug(&self, message: &str) {
        if self.enabled(LogLevel::Debug) {
            tracing::debug!(target: "wireup", "{message}");
        }
    }

    pub fn info(&self, message: &str) {
        if self.enabled(LogLevel::Info) {
            tracing::info!(target: "wireup", "{message}");
        }
    }

    pub fn warn(&self, message: &str) {
        self.warnings.set(self.warnings.get() + 1);
        if self.enabled(LogLevel::Warn) {
            tracing::warn!(target: "wireup", "{message}");
        }
    }

    /// ERROR bypasses the threshold; a hard failure must never be silent.
    pub fn error(&self, message: &str) {
        self.errors.set(self.errors.get() + 1);
        tracing::error!(target: "wireup", "{message}");
    }

    pub fn progress(&self, current: usize, total: usize, item: &str) {
        let percentage = if total > 0 { current * 100 / total } else { 0 };
        self.info(&format!("progress: [{current}/{total}] ({percentage}%) - {item}"));
    }

    pub fn performance(&self, operation: &str, elapsed: std::time::Duration) {
        self.debug(&format!("{operation} took {}ms", elapsed.as_millis()));
    }

    pub fn statistics(&self, entries: &[(&str, String)]) {
        self.info("========== pass statistics ==========");
        for (key, value) in entries {
            self.info(&format!("  {key}: {value}"));
        }
        self.info("=====================================");
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}
