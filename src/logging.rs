//! # Logging Setup
//!
//! Console logging through `tracing-subscriber`, filtered by `RUST_LOG`
//! (default `info`). When `[logging] dir` is set, the same events are also
//! written to a daily rolling file through `tracing-appender`.

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber
///
/// The returned guard flushes the log file when dropped; keep it alive for
/// the lifetime of the process.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    match file_writer(config) {
        Some((writer, guard)) => {
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

fn file_writer(config: &LoggingConfig) -> Option<(NonBlocking, WorkerGuard)> {
    let dir = config.dir.as_ref()?;
    let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
    Some(tracing_appender::non_blocking(appender))
}
