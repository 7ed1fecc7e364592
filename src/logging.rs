use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system
///
/// Logs go to a daily-rotated file; the terminal belongs to the UI, so
/// nothing is written to stderr. Keep the returned guard alive until exit
/// or buffered lines are lost.
///
/// # Arguments
/// * `level` - Default level for this crate, overridden by `RUST_LOG`
/// * `log_file` - Path of the log file; a date suffix is appended on rotation
pub fn init(level: &str, log_file: &Path) -> WorkerGuard {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ttodo={level}")));

    if let Some(parent) = log_file.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file_appender = tracing_appender::rolling::daily(
        log_file.parent().unwrap_or_else(|| Path::new(".")),
        log_file
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("ttodo.log")),
    );
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_names(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init();

    guard
}
