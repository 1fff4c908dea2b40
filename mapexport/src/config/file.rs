//! INI configuration file.
//!
//! ```ini
//! [export]
//! tile_size = 256
//! max_tiles = 1024
//! timeout = 30
//! max_concurrent = 32
//!
//! [source.topo]
//! url = https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png
//! attribution = OpenTopoMap (CC-BY-SA)
//! name = OpenTopoMap
//! ```
//!
//! Every key is optional. `[source.<key>]` sections add sources to the
//! built-in table, or replace a built-in with the same key.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::{Ini, Properties};
use thiserror::Error;

use super::ExportConfig;
use crate::source::{TileSourceConfig, TileSourceRegistry};

const EXPORT_SECTION: &str = "export";
const SOURCE_SECTION_PREFIX: &str = "source.";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Config file is not valid INI
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A key holds a value that cannot be used
    #[error("Invalid value '{value}' for [{section}] {key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// A required key is absent
    #[error("Missing [{section}] {key}")]
    MissingValue { section: String, key: String },

    /// Settings are individually valid but unusable together
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings loaded from the INI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub export: ExportConfig,
    /// Extra tile sources in file order.
    pub sources: Vec<(String, TileSourceConfig)>,
}

impl ConfigFile {
    /// Default location: `<config dir>/mapexport/config.ini`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mapexport").join("config.ini"))
    }

    /// Loads the file at the default location, or defaults if there is none.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads and parses the file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = parse_ini(&ini)?;
        tracing::debug!(
            path = %path.display(),
            sources = config.sources.len(),
            "Loaded config file"
        );
        Ok(config)
    }

    /// Parses configuration from INI text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        parse_ini(&ini)
    }

    /// Builds the source table: built-ins overlaid with the file's sources.
    pub fn registry(&self) -> TileSourceRegistry {
        self.sources
            .iter()
            .fold(TileSourceRegistry::builtin(), |registry, (key, source)| {
                registry.with_source(key.clone(), source.clone())
            })
    }
}

/// Starts from defaults and overlays any values found in the INI.
fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigError> {
    let mut config = ConfigFile::default();

    if let Some(section) = ini.section(Some(EXPORT_SECTION)) {
        let mut export = config.export;
        if let Some(v) = parse_positive::<u32>(section, "tile_size", "pixels")? {
            export = export.with_tile_size(v);
        }
        if let Some(v) = parse_positive::<u64>(section, "max_tiles", "tiles")? {
            export = export.with_max_tiles(v);
        }
        if let Some(v) = parse_positive::<u64>(section, "timeout", "seconds")? {
            export = export.with_request_timeout(Duration::from_secs(v));
        }
        if let Some(v) = parse_positive::<usize>(section, "max_concurrent", "requests")? {
            export = export.with_max_concurrent(v);
        }
        if let Some(v) = section.get("user_agent").map(str::trim) {
            if !v.is_empty() {
                export = export.with_user_agent(v);
            }
        }
        config.export = export;
    }

    for (name, section) in ini.iter() {
        let Some(key) = name.and_then(|n| n.strip_prefix(SOURCE_SECTION_PREFIX)) else {
            continue;
        };
        let section_name = format!("{}{}", SOURCE_SECTION_PREFIX, key);
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::InvalidValue {
                section: section_name,
                key: "<section name>".to_string(),
                value: String::new(),
                reason: "source key must not be empty".to_string(),
            });
        }

        let url = section
            .get("url")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingValue {
                section: section_name.clone(),
                key: "url".to_string(),
            })?;
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !url.contains(placeholder) {
                return Err(ConfigError::InvalidValue {
                    section: section_name,
                    key: "url".to_string(),
                    value: url.to_string(),
                    reason: format!("template must contain {}", placeholder),
                });
            }
        }

        let attribution = section.get("attribution").unwrap_or("").trim();
        let name = section.get("name").map(str::trim).unwrap_or(key);
        config.sources.push((
            key.to_string(),
            TileSourceConfig::new(url, attribution, name),
        ));
    }

    config.export.validate()?;
    Ok(config)
}

fn parse_positive<T>(section: &Properties, key: &str, unit: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    let Some(raw) = section.get(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<T>() {
        Ok(v) if v > T::default() => Ok(Some(v)),
        _ => Err(ConfigError::InvalidValue {
            section: EXPORT_SECTION.to_string(),
            key: key.to_string(),
            value: raw.to_string(),
            reason: format!("must be a positive integer ({})", unit),
        }),
    }
}
