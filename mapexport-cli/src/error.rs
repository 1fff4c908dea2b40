//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use mapexport::compositor::ExportError;
use mapexport::config::ConfigError;
use mapexport::coord::CoordError;
use mapexport::provider::ProviderError;

/// Failed tiles listed before the rest are summarized.
const MAX_LISTED_FAILURES: usize = 10;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file error
    Config(ConfigError),
    /// Source key not in the source table
    UnknownSource { key: String, available: Vec<String> },
    /// Bounding box or zoom rejected
    Selection(CoordError),
    /// Failed to create the HTTP client
    HttpClient(ProviderError),
    /// Export failed
    Export(ExportError),
    /// Failed to write output file
    FileWrite { path: PathBuf, error: std::io::Error },
    /// Failed to install the Ctrl-C handler or start the runtime
    Runtime(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::UnknownSource { available, .. } => {
                eprintln!();
                eprintln!("Available sources: {}", available.join(", "));
                eprintln!("Run 'mapexport sources' for details.");
            }
            CliError::Export(ExportError::PartialTileFailure { failed, .. }) => {
                eprintln!();
                eprintln!("Failed tiles:");
                for failure in failed.iter().take(MAX_LISTED_FAILURES) {
                    eprintln!("  {}", failure);
                }
                if failed.len() > MAX_LISTED_FAILURES {
                    eprintln!("  ... and {} more", failed.len() - MAX_LISTED_FAILURES);
                }
            }
            CliError::Export(ExportError::GridTooLarge { .. }) => {
                eprintln!();
                eprintln!("Select a smaller region, lower --zoom, or raise --max-tiles.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::UnknownSource { key, .. } => write!(f, "Unknown tile source '{}'", key),
            CliError::Selection(e) => write!(f, "Invalid selection: {}", e),
            CliError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Export(e) => write!(f, "Export failed: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path.display(), error)
            }
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Selection(e) => Some(e),
            CliError::HttpClient(e) => Some(e),
            CliError::Export(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        CliError::Export(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Selection(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_source_display() {
        let err = CliError::UnknownSource {
            key: "satellite".to_string(),
            available: vec!["osm".to_string()],
        };
        assert_eq!(err.to_string(), "Unknown tile source 'satellite'");
    }

    #[test]
    fn test_export_error_converts() {
        let err: CliError = ExportError::Cancelled.into();
        assert!(matches!(err, CliError::Export(ExportError::Cancelled)));
        assert!(err.to_string().contains("Export cancelled"));
    }

    #[test]
    fn test_file_write_has_source() {
        use std::error::Error;
        let err = CliError::FileWrite {
            path: PathBuf::from("/nope/map.png"),
            error: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/nope/map.png"));
    }
}
