//! Export command - fetch a region's tiles and write one map image.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use mapexport::compositor::{ExportProgress, ExportRequest, OutputFormat, TileCompositor};
use mapexport::config::ExportConfig;
use mapexport::coord::{BoundingBox, ZoomLevel};
use mapexport::provider::AsyncReqwestClient;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::common::{load_config, resolve_source};
use crate::error::CliError;

/// Arguments for the export command.
pub struct ExportArgs {
    pub north: f64,
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub zoom: i64,
    pub source: String,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub tile_size: Option<u32>,
    pub max_tiles: Option<u64>,
    pub timeout: Option<u64>,
    pub max_concurrent: Option<usize>,
    pub quiet: bool,
}

impl ExportArgs {
    /// Command-line values take precedence over the config file.
    fn apply_overrides(&self, mut config: ExportConfig) -> ExportConfig {
        if let Some(v) = self.tile_size {
            config = config.with_tile_size(v);
        }
        if let Some(v) = self.max_tiles {
            config = config.with_max_tiles(v);
        }
        if let Some(v) = self.timeout {
            config = config.with_request_timeout(Duration::from_secs(v));
        }
        if let Some(v) = self.max_concurrent {
            config = config.with_max_concurrent(v);
        }
        config
    }

    fn request(&self, source: mapexport::source::TileSourceConfig) -> Result<ExportRequest, CliError> {
        let bounds = BoundingBox::from_edges(self.north, self.west, self.south, self.east)?;
        let zoom = ZoomLevel::clamped(self.zoom);
        if i64::from(zoom.get()) != self.zoom {
            warn!(requested = self.zoom, zoom = %zoom, "Zoom level clamped");
        }
        Ok(ExportRequest::new(bounds, zoom, source).with_format(self.format))
    }
}

/// Run the export command.
pub async fn run(args: ExportArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let config_file = load_config(config_path)?;
    let registry = config_file.registry();
    let source = resolve_source(&registry, &args.source)?;
    let export_config = args.apply_overrides(config_file.export.clone());
    export_config.validate()?;

    let request = args.request(source)?;

    let client =
        AsyncReqwestClient::with_options(export_config.request_timeout(), export_config.user_agent())
            .map_err(CliError::HttpClient)?;
    let compositor = TileCompositor::new(client, export_config);

    // Reject bad selections before anything is printed or fetched
    let grid = compositor.plan(&request)?;
    let (width, height) = grid.pixel_size(compositor.config().tile_size());

    println!("Exporting {} at zoom {}", request.source, request.zoom);
    println!(
        "  Tiles:  {} ({} x {})",
        grid.tile_count(),
        grid.columns(),
        grid.rows()
    );
    println!("  Size:   {} x {} px", width, height);
    println!();

    let bar = progress_bar(grid.tile_count(), args.quiet);
    let progress_bar = bar.clone();
    let compositor = compositor.with_progress(Arc::new(move |progress: ExportProgress| {
        progress_bar.set_position(progress.settled());
        if progress.failed > 0 {
            progress_bar.set_message(format!("{} failed", progress.failed));
        }
    }));

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received interrupt, cancelling export...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::Runtime(format!("Failed to set signal handler: {}", e)))?;

    let result = compositor.export_region_with_cancel(&request, cancel).await;
    bar.finish_and_clear();
    let image = result?;

    let path = args.output.clone().unwrap_or_else(|| PathBuf::from(image.file_name()));
    std::fs::write(&path, image.bytes()).map_err(|error| CliError::FileWrite {
        path: path.clone(),
        error,
    })?;
    info!(path = %path.display(), bytes = image.bytes().len(), "Wrote map image");

    println!("Saved {} ({} x {} px)", path.display(), image.width, image.height);
    if !request.source.attribution.is_empty() {
        println!("Map data: {}", request.source.attribution);
    }
    Ok(())
}

fn progress_bar(total: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total);
    let style = ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    bar.set_style(style);
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapexport::source::TileSourceConfig;

    fn args() -> ExportArgs {
        ExportArgs {
            north: 51.51,
            west: -0.12,
            south: 51.50,
            east: -0.10,
            zoom: 15,
            source: "osm".to_string(),
            format: OutputFormat::Png,
            output: None,
            tile_size: None,
            max_tiles: None,
            timeout: None,
            max_concurrent: None,
            quiet: true,
        }
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let args = ExportArgs {
            max_tiles: Some(12),
            timeout: Some(3),
            ..args()
        };
        let config = args.apply_overrides(ExportConfig::default());

        assert_eq!(config.max_tiles(), 12);
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.tile_size(), ExportConfig::default().tile_size());
    }

    #[test]
    fn test_request_from_args() {
        let request = args().request(TileSourceConfig::osm()).unwrap();
        assert_eq!(request.zoom.get(), 15);
        assert_eq!(request.format, OutputFormat::Png);
        assert!(request.bounds.is_some());
    }

    #[test]
    fn test_zoom_out_of_range_is_clamped() {
        let args = ExportArgs { zoom: 25, ..args() };
        let request = args.request(TileSourceConfig::osm()).unwrap();
        assert_eq!(request.zoom.get(), 19);

        let args = ExportArgs { zoom: 0, ..self::args() };
        assert_eq!(args.request(TileSourceConfig::osm()).unwrap().zoom.get(), 1);
    }

    #[test]
    fn test_latitude_out_of_range_is_rejected() {
        let args = ExportArgs { north: 95.0, ..args() };
        assert!(matches!(
            args.request(TileSourceConfig::osm()),
            Err(CliError::Selection(_))
        ));
    }
}
