//! Output formats and encoded images.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::{ImageFormat, RgbaImage};

use super::types::ExportError;
use crate::coord::ZoomLevel;

/// Output format selector.
///
/// `Svg` is recognized so that it can be reported as unsupported rather
/// than silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, OutputFormat::Png)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// A finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub format: OutputFormat,
    pub zoom: ZoomLevel,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl EncodedImage {
    /// Suggested file name, e.g. `map_export_15.png`.
    pub fn file_name(&self) -> String {
        format!("map_export_{}.{}", self.zoom, self.format.extension())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Encodes a raster as PNG.
pub(crate) fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}
