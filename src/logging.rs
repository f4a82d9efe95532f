//! Optional file logging
//!
//! The TUI owns the terminal, so diagnostics never go to stdout. When the
//! `SKYWATCH_LOG` environment variable is set (to an env-filter directive
//! such as `debug` or `skywatch=trace`), tracing output is written to a
//! daily-rolling `skywatch.*.log` file in the current directory.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable enabling file logging
pub const LOG_ENV: &str = "SKYWATCH_LOG";

/// Keeps the non-blocking writer alive for the lifetime of the process
pub struct LoggerGuard(#[allow(dead_code)] WorkerGuard);

/// Initializes file logging when `SKYWATCH_LOG` is set.
///
/// Returns `None` (and logs nothing) when the variable is absent or the log
/// file cannot be created; a broken logging setup must never stop the UI.
pub fn init_logging() -> Option<LoggerGuard> {
    let directive = std::env::var(LOG_ENV).ok()?;

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(&directive);

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("skywatch")
        .filename_suffix("log")
        .build(".")
        .ok()?;
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter),
        )
        .init();

    Some(LoggerGuard(guard))
}
