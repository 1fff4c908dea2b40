//! Common helpers shared across CLI commands.

use std::path::Path;

use mapexport::config::ConfigFile;
use mapexport::source::{TileSourceConfig, TileSourceRegistry};

use crate::error::CliError;

/// Load the config file: an explicit path must exist, the default may not.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}

/// Look up a source by key, listing the alternatives on failure.
pub fn resolve_source(registry: &TileSourceRegistry, key: &str) -> Result<TileSourceConfig, CliError> {
    registry
        .get(key)
        .cloned()
        .ok_or_else(|| CliError::UnknownSource {
            key: key.to_string(),
            available: registry.keys().map(str::to_string).collect(),
        })
}
