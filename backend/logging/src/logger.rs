//! Structured Logger
//!
//! Wraps `tracing` to provide console output, a daily-rotated NDJSON log file,
//! and environment-based level control.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global structured logger.
///
/// `RUST_LOG` wins over `level` when set. With `json_console` the console gets
/// the same JSON lines as the file; otherwise it gets human-readable output.
/// Calling this twice is harmless: the second call is ignored.
pub fn init_logger<P: AsRef<Path>>(log_dir: P, level: &str, json_console: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // logs/morejpeg.log.YYYY-MM-DD
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "morejpeg.log");
    let file_layer = fmt::layer()
        .json()
        .with_writer(file_appender)
        .with_ansi(false);

    let json_console_layer = json_console.then(|| fmt::layer().json().with_writer(std::io::stdout));
    let plain_console_layer = (!json_console).then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .with_ansi(true)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_console_layer)
        .with(plain_console_layer)
        .with(file_layer)
        .try_init();
}
