//! MapExport - slippy-map region export
//!
//! Converts a geographic bounding box and zoom level into the grid of
//! Web Mercator tiles covering it, retrieves the tiles concurrently from a
//! tile server and composites them into a single PNG image.
//!
//! ```ignore
//! use mapexport::compositor::{ExportRequest, TileCompositor};
//! use mapexport::config::ExportConfig;
//! use mapexport::coord::{BoundingBox, ZoomLevel};
//! use mapexport::provider::AsyncReqwestClient;
//! use mapexport::source::TileSourceRegistry;
//!
//! let sources = TileSourceRegistry::builtin();
//! let request = ExportRequest::new(
//!     BoundingBox::from_edges(51.51, -0.12, 51.50, -0.10)?,
//!     ZoomLevel::new(15)?,
//!     sources.get("osm").cloned().unwrap(),
//! );
//! let compositor = TileCompositor::new(AsyncReqwestClient::new()?, ExportConfig::default());
//! let image = compositor.export_region(&request).await?;
//! ```

pub mod compositor;
pub mod config;
pub mod coord;
pub mod logging;
pub mod provider;
pub mod source;
