//! # Pipeline Entry Point
//!
//! Loads the terrain mesh named in the configuration and tiles it into the
//! configured output directory.

use config::constants::{PLANE_EPSILON, WELD_DISTANCE};
use config::TileConfig;
use tile_mesh::io::load_stl;
use tile_mesh::Mesh;

use crate::batch::{run_batch, BatchReport};
use crate::combine::BspKernel;
use crate::error::TileError;
use crate::export::StlDirExporter;

/// Runs a full tiling job with the BSP kernel and STL export.
///
/// Fails before any tile is processed when the configuration is invalid, the
/// input mesh is missing or unreadable, or the output directory cannot be
/// created. Tile-level problems are reported in the returned [`BatchReport`].
pub fn run(config: &TileConfig) -> Result<BatchReport, TileError> {
    config.validate()?;
    let mesh = load_terrain(config)?;
    let exporter = StlDirExporter::create(&config.output_dir)?;

    let report = run_batch(&mesh, config, &BspKernel::new(PLANE_EPSILON), &exporter);
    log_summary(&report);
    Ok(report)
}

/// Reads the input mesh, welds it and turns its faces outward.
///
/// An open ground surface ends up facing up, which is the orientation
/// [`combine_tile`](crate::combine::combine_tile) expects.
pub fn load_terrain(config: &TileConfig) -> Result<Mesh, TileError> {
    let path = &config.input_mesh;
    if !path.is_file() {
        return Err(TileError::MissingInput { path: path.clone() });
    }

    let raw = load_stl(path)?;
    let mut mesh = raw.weld(WELD_DISTANCE);
    let flipped = mesh.orient_consistently();
    if flipped > 0 {
        log::debug!("reoriented {flipped} terrain triangles");
    }
    log::info!(
        "loaded {}: {} triangles, {} vertices after welding ({} before)",
        path.display(),
        mesh.triangle_count(),
        mesh.vertex_count(),
        raw.vertex_count()
    );
    Ok(mesh)
}

fn log_summary(report: &BatchReport) {
    log::info!(
        "done: {} exported, {} skipped, {} failed",
        report.exported(),
        report.skipped(),
        report.failed()
    );
    if report.degraded() > 0 {
        log::warn!(
            "{} exported tile(s) are missing at least one cut",
            report.degraded()
        );
    }
}
