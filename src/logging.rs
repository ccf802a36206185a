use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_PREFIX: &str = "keytempo.log";

/// Install a daily-rolling file logger. The terminal is owned by the UI so
/// nothing is written to stdout/stderr.
///
/// The returned guard flushes pending lines on drop and must outlive the app.
pub fn setup_logging(log_dir: &Path, debug_mode: bool) -> io::Result<WorkerGuard> {
    fs::create_dir_all(log_dir)?;

    let file_appender = rolling::daily(log_dir, LOG_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = if debug_mode {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // try_init so a second call (tests) is harmless
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .try_init();

    tracing::info!(dir = %log_dir.display(), debug = debug_mode, "logging initialized");

    Ok(guard)
}
