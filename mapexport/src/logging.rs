//! Logging infrastructure for MapExport.
//!
//! Structured logging to stderr, optionally mirrored to a log file.
//! Configurable via the RUST_LOG environment variable.

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Builds the level filter, defaulting to `default_level` when RUST_LOG is unset.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize logging system.
///
/// Logs go to stderr so that stdout stays free for command output. When
/// `log_file` is given its directory is created, the file is truncated and a
/// second, uncoloured layer writes to it.
///
/// # Errors
///
/// Returns error if the log directory cannot be created or the log file
/// cannot be cleared.
pub fn init_logging(default_level: &str, log_file: Option<&Path>) -> Result<LoggingGuard, io::Error> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    let (file_layer, file_guard) = match log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let file_name = path.file_name().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name")
            })?;
            fs::create_dir_all(dir)?;
            fs::write(path, "")?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Get default log file name.
pub fn default_log_file() -> &'static str {
    "mapexport.log"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_file() {
        assert_eq!(default_log_file(), "mapexport.log");
    }

    #[test]
    fn test_env_filter_default_level() {
        // RUST_LOG may be set by the developer; only check construction.
        let filter = env_filter("debug");
        assert!(!filter.to_string().is_empty());
    }

    #[test]
    fn test_init_logging_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("export.log");

        // A global subscriber may already be installed by another test
        let _guard = init_logging("info", Some(&path));
        assert!(path.exists());
    }
}
