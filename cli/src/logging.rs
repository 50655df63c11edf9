use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_PATH_VAR: &str = "EQTRAK_LOG_PATH";
const LOG_FILE_PREFIX: &str = "eqtrak.log";

/// Initialize tracing. Level comes from `RUST_LOG`, defaulting to info.
///
/// Output goes to `EQTRAK_LOG_PATH` when set, else a daily file under the
/// platform data directory, else stderr. Keep the returned guard alive for
/// the life of the process so buffered lines are flushed.
pub fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var(LOG_PATH_VAR)
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return None;
    }

    if let Some(dir) = log_directory()
        && std::fs::create_dir_all(&dir).is_ok()
    {
        let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer)
            .init();
        return Some(guard);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    None
}

fn log_directory() -> Option<PathBuf> {
    dirs::data_local_dir().map(|base| base.join("eqtrak").join("logs"))
}
