//! Tracing setup for the binary.
//!
//! The library only emits events; installing a subscriber is the caller's job.

use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "warn,arbor=info";

/// Installs the global subscriber.
///
/// With `log_dir`, events go to a daily rolling `arbor.log` there and the
/// returned guard must be kept alive to flush them. Without it they go to
/// stderr. Calling this twice is harmless; the second call is ignored.
pub fn init_logging(log_dir: Option<&Path>) -> io::Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "arbor.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false);

            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .try_init();

            tracing::info!(dir = %dir.display(), "logging to file");
            Ok(Some(guard))
        }
        None => {
            let console_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_ansi(false);

            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init();

            Ok(None)
        }
    }
}
