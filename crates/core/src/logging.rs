use crate::diag::LogLevel;
use once_cell::sync::OnceCell;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Keeps the non-blocking writer alive for the process lifetime; the host
// never hands us a shutdown hook.
static GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Install the file subscriber for processor log output, once per process.
///
/// Passes run embedded in a host build, so nothing goes to stdout: entries
/// roll daily under `~/.wireup/logs`. `RUST_LOG` overrides the pass's
/// configured level. If the host already installed a global subscriber this
/// quietly yields to it.
pub fn ensure_initialized(level: LogLevel) {
    GUARD.get_or_init(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let log_dir = Path::new(&home).join(".wireup/logs");
        let _ = std::fs::create_dir_all(&log_dir);

        let file_appender = tracing_appender::rolling::daily(&log_dir, "registry");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true);

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .try_init();

        guard
    });
}

fn default_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}
