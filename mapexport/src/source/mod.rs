//! Tile source configuration
//!
//! A tile source is a URL template plus the text needed to credit it. The
//! built-in table carries the three basemaps the exporter offers; a
//! [`TileSourceRegistry`] is built once at startup (optionally extended from
//! the config file) and only read afterwards.
//!
//! # URL Templates
//!
//! - `{z}`, `{x}`, `{y}` - tile zoom, column and row
//! - `{s}` - load-balancing subdomain, always [`DEFAULT_SUBDOMAIN`]
//! - `{r}` - retina suffix, always empty (standard-density tiles only)

use std::collections::BTreeMap;
use std::fmt;

use crate::coord::TileIndex;

/// Subdomain substituted for `{s}`.
pub const DEFAULT_SUBDOMAIN: &str = "a";

/// Key of the source used when none is selected.
pub const DEFAULT_SOURCE_KEY: &str = "osm";

const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
const CARTO_ATTRIBUTION: &str = "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors &copy; <a href=\"https://carto.com/attributions\">CARTO</a>";

/// A slippy-map tile source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSourceConfig {
    /// URL template with `{z}`/`{x}`/`{y}` and optional `{s}`/`{r}` placeholders.
    pub url_template: String,
    /// Attribution text to show alongside exported maps.
    pub attribution: String,
    /// Human readable name.
    pub display_name: String,
}

impl TileSourceConfig {
    pub fn new(
        url_template: impl Into<String>,
        attribution: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            url_template: url_template.into(),
            attribution: attribution.into(),
            display_name: display_name.into(),
        }
    }

    /// OpenStreetMap standard tiles.
    pub fn osm() -> Self {
        Self::new(
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            OSM_ATTRIBUTION,
            "OpenStreetMap Standard",
        )
    }

    /// CARTO light basemap.
    pub fn carto_light() -> Self {
        Self::new(
            "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
            CARTO_ATTRIBUTION,
            "CartoDB Light",
        )
    }

    /// CARTO dark basemap.
    pub fn carto_dark() -> Self {
        Self::new(
            "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
            CARTO_ATTRIBUTION,
            "CartoDB Dark",
        )
    }

    /// Builds the URL of `tile` for this source.
    #[inline]
    pub fn tile_url(&self, tile: &TileIndex) -> String {
        tile_url(tile, self)
    }
}

impl fmt::Display for TileSourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// Substitutes a tile's coordinates into a source's URL template.
///
/// Pure string substitution; the URL is not checked for reachability.
pub fn tile_url(tile: &TileIndex, source: &TileSourceConfig) -> String {
    source
        .url_template
        .replace("{z}", &tile.zoom().to_string())
        .replace("{x}", &tile.x().to_string())
        .replace("{y}", &tile.y().to_string())
        .replace("{s}", DEFAULT_SUBDOMAIN)
        .replace("{r}", "")
}

/// Immutable mapping of source key to [`TileSourceConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSourceRegistry {
    sources: BTreeMap<String, TileSourceConfig>,
}

impl TileSourceRegistry {
    /// The built-in sources: `osm`, `cartoLight` and `cartoDark`.
    pub fn builtin() -> Self {
        let mut sources = BTreeMap::new();
        sources.insert("osm".to_string(), TileSourceConfig::osm());
        sources.insert("cartoLight".to_string(), TileSourceConfig::carto_light());
        sources.insert("cartoDark".to_string(), TileSourceConfig::carto_dark());
        Self { sources }
    }

    /// Returns a registry with `source` added under `key`, replacing any
    /// existing entry.
    pub fn with_source(mut self, key: impl Into<String>, source: TileSourceConfig) -> Self {
        self.sources.insert(key.into(), source);
        self
    }

    /// Looks up a source by key.
    pub fn get(&self, key: &str) -> Option<&TileSourceConfig> {
        self.sources.get(key)
    }

    /// Iterates over `(key, source)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TileSourceConfig)> {
        self.sources.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Source keys in key order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for TileSourceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
