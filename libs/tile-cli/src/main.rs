//! terrain-tiler - cut a terrain mesh into magnetic print tiles
//!
//! Reads an optional JSON configuration, applies command-line overrides and
//! writes one `tile_{col}_{row}.stl` per populated tile.
//!
//! ```text
//! terrain-tiler --config tiling.json --all --jobs 8
//! terrain-tiler --input scaled_mesh.stl --output tiles --tile 1,2
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::TileConfig;

#[derive(Parser, Debug)]
#[command(name = "terrain-tiler")]
#[command(about = "Cut a terrain mesh into magnetic print tiles", long_about = None)]
struct Cli {
    /// JSON configuration file (defaults are used for missing fields)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input STL mesh, overrides `input_mesh`
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory, overrides `output_dir`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Process only this tile, given as ROW,COL
    #[arg(long, value_parser = parse_tile, conflicts_with = "all")]
    tile: Option<(usize, usize)>,

    /// Process the whole grid
    #[arg(long)]
    all: bool,

    /// Worker threads (default: one per core)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Log per-tile details
    #[arg(short, long)]
    verbose: bool,
}

fn parse_tile(value: &str) -> Result<(usize, usize), String> {
    let (row, col) = value
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got '{value}'"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|e| format!("invalid row '{row}': {e}"))?;
    let col = col
        .trim()
        .parse()
        .map_err(|e| format!("invalid column '{col}': {e}"))?;
    Ok((row, col))
}

impl Cli {
    /// Configuration file (or defaults) with command-line overrides applied.
    fn resolve_config(&self) -> Result<TileConfig> {
        let mut config = match &self.config {
            Some(path) => TileConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => TileConfig::default(),
        };

        if let Some(input) = &self.input {
            config.input_mesh = input.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some((row, col)) = self.tile {
            config.single_tile_mode = true;
            config.single_tile_row = row;
            config.single_tile_col = col;
        }
        if self.all {
            config.single_tile_mode = false;
        }

        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.resolve_config()?;

    let report = match cli.jobs {
        Some(0) => bail!("--jobs must be at least 1"),
        Some(jobs) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .context("Failed to build worker pool")?;
            pool.install(|| tile_core::run(&config))
        }
        None => tile_core::run(&config),
    }
    .context("Tiling failed")?;

    println!(
        "{} tile(s) written to {}",
        report.exported(),
        config.output_dir.display()
    );

    if report.failed() > 0 {
        bail!("{} tile(s) failed", report.failed());
    }
    Ok(())
}
