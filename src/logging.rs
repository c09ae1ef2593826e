//! File-based logging for the daemon.
//!
//! The daemon has no terminal of its own to speak of, so everything goes
//! to `apollo.log` in the data directory instead.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// The name of the log file, inside of [`crate::data_dir`].
const LOG_FILE: &str = "apollo.log";

/// Initializes the logging system.
///
/// The level can be controlled with `RUST_LOG`, otherwise it's
/// `info` for apollo itself, or `debug` with `--debug`.
///
/// The returned guard flushes the log when dropped, so it has to
/// live for as long as the daemon does.
pub fn init(debug: bool) -> crate::Result<WorkerGuard> {
    let directory = crate::data_dir()?;
    let appender = tracing_appender::rolling::never(&directory, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug {
            "apollo=debug,warn"
        } else {
            "apollo=info,warn"
        })
    });

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;

    tracing::info!("logging to {}", directory.join(LOG_FILE).display());
    Ok(guard)
}
