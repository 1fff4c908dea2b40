//! Tile compositing
//!
//! Turns a bounding box and zoom into a tile grid, fetches every tile of the
//! grid concurrently and assembles them into one image.

mod export;
mod format;
mod raster;
mod types;

pub use export::TileCompositor;
pub use format::{EncodedImage, OutputFormat};
pub use raster::OutputRaster;
pub use types::{
    ExportError, ExportProgress, ExportRequest, ProgressCallback, TileFetchFailure,
};
