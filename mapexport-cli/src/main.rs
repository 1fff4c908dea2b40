//! MapExport CLI - export a map region as a single image.
//!
//! Fetches the slippy-map tiles covering a bounding box and composites them
//! into one PNG.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mapexport::compositor::OutputFormat;
use mapexport::logging::{default_log_file, init_logging};
use mapexport::source::DEFAULT_SOURCE_KEY;

use commands::export::ExportArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "mapexport")]
#[command(about = "Export slippy-map regions as composited images", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/mapexport/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to a file (default file: mapexport.log)
    #[arg(long, global = true)]
    log: bool,

    /// Log file path, implies --log
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a bounding box at one zoom level
    Export(ExportCommand),

    /// List the available tile sources
    Sources,
}

#[derive(Args)]
struct ExportCommand {
    /// Northern edge latitude
    #[arg(long, allow_hyphen_values = true)]
    north: f64,

    /// Western edge longitude
    #[arg(long, allow_hyphen_values = true)]
    west: f64,

    /// Southern edge latitude
    #[arg(long, allow_hyphen_values = true)]
    south: f64,

    /// Eastern edge longitude
    #[arg(long, allow_hyphen_values = true)]
    east: f64,

    /// Zoom level (1-19, out-of-range values are clamped)
    #[arg(short, long, allow_hyphen_values = true)]
    zoom: i64,

    /// Tile source key
    #[arg(short, long, default_value = DEFAULT_SOURCE_KEY)]
    source: String,

    /// Output format
    #[arg(short, long, default_value = "png")]
    format: OutputFormat,

    /// Output file (default: map_export_<zoom>.<ext>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Tile edge length in pixels
    #[arg(long)]
    tile_size: Option<u32>,

    /// Refuse grids with more tiles than this
    #[arg(long)]
    max_tiles: Option<u64>,

    /// Per-tile timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Maximum concurrent tile requests
    #[arg(long)]
    max_concurrent: Option<usize>,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

impl From<ExportCommand> for ExportArgs {
    fn from(cmd: ExportCommand) -> Self {
        ExportArgs {
            north: cmd.north,
            west: cmd.west,
            south: cmd.south,
            east: cmd.east,
            zoom: cmd.zoom,
            source: cmd.source,
            format: cmd.format,
            output: cmd.output,
            tile_size: cmd.tile_size,
            max_tiles: cmd.max_tiles,
            timeout: cmd.timeout,
            max_concurrent: cmd.max_concurrent,
            quiet: cmd.quiet,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| cli.log.then(|| PathBuf::from(default_log_file())));
    let _guard = match init_logging(level, log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e.to_string()).exit(),
    };

    let result = match cli.command {
        Commands::Export(cmd) => commands::export::run(cmd.into(), cli.config.as_deref()).await,
        Commands::Sources => commands::sources::run(cli.config.as_deref()),
    };

    if let Err(e) = result {
        e.exit();
    }
}
