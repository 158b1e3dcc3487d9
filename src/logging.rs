//! Log output for the server process.
//!
//! Events fan out to two sinks: a daily-rotated JSON file under the
//! configured logs directory, and human-readable stderr. `RUST_LOG`
//! controls the filter; the default keeps `info` and above.

use std::io;
use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "outcall.log";

/// Keeps the background log writer alive.
///
/// Dropping the guard flushes buffered entries, so the binary holds one
/// for the whole serve loop.
#[must_use]
pub struct LogGuard(WorkerGuard);

/// Install the global subscriber for the serve loop.
///
/// File entries land in `{logs_dir}/outcall.log.YYYY-MM-DD`.
///
/// # Errors
///
/// Fails when the logs directory cannot be created.
pub fn init(logs_dir: &Path) -> anyhow::Result<LogGuard> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("creating logs directory {}", logs_dir.display()))?;

    let (file_writer, guard) =
        tracing_appender::non_blocking(rolling::daily(logs_dir, LOG_FILE_PREFIX));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    Ok(LogGuard(guard))
}
