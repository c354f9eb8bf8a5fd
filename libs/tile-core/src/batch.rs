//! # Batch Orchestrator
//!
//! Runs the tile pipeline over the whole grid or a single tile.
//!
//! ## Tile lifecycle
//!
//! ```text
//! Profiled ──┬─> Sized ─> Fixtured ─> Combined ─> Exported
//!            └─> Skipped (no mesh vertices under the footprint)
//! ```
//!
//! Tiles run in parallel on the current rayon pool. They share the terrain
//! mesh read-only and own everything else, so a failing tile never affects
//! its neighbours.

use std::fmt;
use std::path::PathBuf;

use config::TileConfig;
use rayon::prelude::*;
use tile_mesh::Mesh;

use crate::combine::{combine_tile, BooleanKernel, CsgStep};
use crate::error::TileError;
use crate::export::TileExporter;
use crate::fixtures::place_sockets;
use crate::grid::{TileGrid, TileIndex};
use crate::profile::profile;
use crate::quantize::Enclosure;

// =============================================================================
// MODE AND STATE
// =============================================================================

/// Which tiles a batch covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileMode {
    FullGrid,
    Single(TileIndex),
}

impl TileMode {
    pub fn from_config(config: &TileConfig) -> Self {
        match config.single_tile() {
            Some((row, col)) => TileMode::Single(TileIndex::new(row, col)),
            None => TileMode::FullGrid,
        }
    }

    /// Selected indices in row-major order.
    pub fn indices(&self, grid: &TileGrid) -> Vec<TileIndex> {
        match self {
            TileMode::FullGrid => grid.indices().collect(),
            TileMode::Single(index) => vec![*index],
        }
    }
}

/// Pipeline stages of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileStage {
    Profiled,
    Sized,
    Fixtured,
    Combined,
    Exported,
    Skipped,
}

impl fmt::Display for TileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TileStage::Profiled => "profiled",
            TileStage::Sized => "sized",
            TileStage::Fixtured => "fixtured",
            TileStage::Combined => "combined",
            TileStage::Exported => "exported",
            TileStage::Skipped => "skipped",
        };
        f.write_str(name)
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// How a tile ended.
#[derive(Debug)]
pub enum TileOutcome {
    /// Written out, possibly missing some cuts.
    Exported {
        path: PathBuf,
        skipped_steps: Vec<CsgStep>,
    },
    /// Nothing under the footprint.
    Skipped,
    /// Abandoned after `stage`, the last stage the tile completed.
    Failed { stage: TileStage, error: TileError },
}

impl TileOutcome {
    /// Terminal stage of the tile, `None` for a failed tile.
    pub fn stage(&self) -> Option<TileStage> {
        match self {
            TileOutcome::Exported { .. } => Some(TileStage::Exported),
            TileOutcome::Skipped => Some(TileStage::Skipped),
            TileOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug)]
pub struct TileReport {
    pub index: TileIndex,
    pub outcome: TileOutcome,
}

/// Per-tile outcomes of a batch, sorted by index.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub tiles: Vec<TileReport>,
}

impl BatchReport {
    pub fn exported(&self) -> usize {
        self.count(|o| matches!(o, TileOutcome::Exported { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TileOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TileOutcome::Failed { .. }))
    }

    /// Exported tiles that lost at least one cut.
    pub fn degraded(&self) -> usize {
        self.count(|o| {
            matches!(o, TileOutcome::Exported { skipped_steps, .. } if !skipped_steps.is_empty())
        })
    }

    pub fn outcome(&self, index: TileIndex) -> Option<&TileOutcome> {
        self.tiles
            .binary_search_by_key(&index, |t| t.index)
            .ok()
            .map(|i| &self.tiles[i].outcome)
    }

    fn count(&self, pred: impl Fn(&TileOutcome) -> bool) -> usize {
        self.tiles.iter().filter(|t| pred(&t.outcome)).count()
    }
}

// =============================================================================
// BATCH
// =============================================================================

/// Tiles `mesh` according to `config`.
///
/// Per-tile errors are recorded in the report; this function itself does
/// not fail.
pub fn run_batch<K, E>(mesh: &Mesh, config: &TileConfig, kernel: &K, exporter: &E) -> BatchReport
where
    K: BooleanKernel + ?Sized,
    E: TileExporter + ?Sized,
{
    let grid = TileGrid::from_config(config);
    let indices = TileMode::from_config(config).indices(&grid);
    log::info!("processing {} tile(s) on {} thread(s)", indices.len(), rayon::current_num_threads());

    let mut tiles: Vec<TileReport> = indices
        .par_iter()
        .map(|&index| TileReport {
            index,
            outcome: process_tile(mesh, config, kernel, exporter, index),
        })
        .collect();
    tiles.sort_by_key(|t| t.index);

    BatchReport { tiles }
}

/// Runs the whole pipeline for one tile.
pub fn process_tile<K, E>(
    mesh: &Mesh,
    config: &TileConfig,
    kernel: &K,
    exporter: &E,
    index: TileIndex,
) -> TileOutcome
where
    K: BooleanKernel + ?Sized,
    E: TileExporter + ?Sized,
{
    let tile_profile = profile(mesh, index, config.tile_size);
    let Some(min_z) = tile_profile.min_z else {
        log::debug!("tile {index}: unpopulated, skipping");
        return TileOutcome::Skipped;
    };

    let enclosure = match Enclosure::new(index, tile_profile.footprint, min_z, config) {
        Ok(enclosure) => enclosure,
        Err(error) => return failed(TileStage::Profiled, error),
    };
    log::debug!(
        "tile {index}: min_z {min_z:.4}, base {:.4}..{:.4}",
        enclosure.bottom_z,
        enclosure.top_z
    );

    let sockets = place_sockets(enclosure.center(), enclosure.height(), config);

    let combined = match combine_tile(kernel, mesh, &enclosure, &sockets, config.segments) {
        Ok(combined) => combined,
        Err(error) => return failed(TileStage::Fixtured, error),
    };

    match exporter.export(index, &combined.mesh) {
        Ok(path) => {
            log::info!(
                "tile {index}: exported {} ({} triangles)",
                path.display(),
                combined.mesh.triangle_count()
            );
            TileOutcome::Exported {
                path,
                skipped_steps: combined.skipped_steps,
            }
        }
        Err(source) => failed(TileStage::Combined, TileError::Export { index, source }),
    }
}

fn failed(stage: TileStage, error: TileError) -> TileOutcome {
    log::warn!("{error}; tile abandoned");
    TileOutcome::Failed { stage, error }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::BspKernel;
    use glam::DVec3;
    use std::sync::Mutex;
    use tile_mesh::io::IoError;
    use tile_mesh::MeshError;

    /// Subtraction that leaves `a` untouched.
    struct IdentityKernel;

    impl BooleanKernel for IdentityKernel {
        fn subtract(&self, a: &Mesh, _b: &Mesh) -> Result<Mesh, MeshError> {
            Ok(a.clone())
        }
    }

    #[derive(Default)]
    struct MemoryExporter {
        tiles: Mutex<Vec<TileIndex>>,
    }

    impl TileExporter for MemoryExporter {
        fn export(&self, index: TileIndex, _mesh: &Mesh) -> Result<PathBuf, IoError> {
            self.tiles.lock().unwrap().push(index);
            Ok(PathBuf::from(crate::export::file_name(index)))
        }
    }

    struct BrokenExporter;

    impl TileExporter for BrokenExporter {
        fn export(&self, _index: TileIndex, _mesh: &Mesh) -> Result<PathBuf, IoError> {
            Err(IoError::invalid_content("disk full"))
        }
    }

    /// One vertex in the middle of each listed tile.
    fn points_in(tiles: &[(usize, usize)]) -> Mesh {
        let mut mesh = Mesh::new();
        for &(row, col) in tiles {
            mesh.add_vertex(DVec3::new(col as f64 * 0.2 + 0.1, row as f64 * 0.2 + 0.1, 0.05));
        }
        mesh
    }

    fn full_grid() -> TileConfig {
        TileConfig {
            single_tile_mode: false,
            segments: 8,
            ..TileConfig::default()
        }
    }

    #[test]
    fn test_mode_from_config() {
        assert_eq!(
            TileMode::from_config(&TileConfig::default()),
            TileMode::Single(TileIndex::new(1, 2))
        );
        assert_eq!(TileMode::from_config(&full_grid()), TileMode::FullGrid);
    }

    #[test]
    fn test_full_grid_skips_unpopulated() {
        let mesh = points_in(&[(0, 0), (4, 2)]);
        let exporter = MemoryExporter::default();
        let report = run_batch(&mesh, &full_grid(), &IdentityKernel, &exporter);

        assert_eq!(report.tiles.len(), 15);
        assert_eq!(report.exported(), 2);
        assert_eq!(report.skipped(), 13);
        assert_eq!(report.failed(), 0);

        let mut written = exporter.tiles.into_inner().unwrap();
        written.sort();
        assert_eq!(written, vec![TileIndex::new(0, 0), TileIndex::new(4, 2)]);
    }

    #[test]
    fn test_report_is_sorted() {
        let mesh = points_in(&[(2, 1)]);
        let report = run_batch(&mesh, &full_grid(), &IdentityKernel, &MemoryExporter::default());
        assert!(report.tiles.windows(2).all(|w| w[0].index < w[1].index));
        assert!(matches!(
            report.outcome(TileIndex::new(2, 1)),
            Some(TileOutcome::Exported { .. })
        ));
        assert_eq!(
            report.outcome(TileIndex::new(0, 0)).and_then(TileOutcome::stage),
            Some(TileStage::Skipped)
        );
    }

    #[test]
    fn test_single_tile_mode() {
        let mesh = points_in(&[(0, 0), (1, 2)]);
        let exporter = MemoryExporter::default();
        let report = run_batch(&mesh, &TileConfig::default(), &IdentityKernel, &exporter);

        assert_eq!(report.tiles.len(), 1);
        assert_eq!(report.tiles[0].index, TileIndex::new(1, 2));
        assert_eq!(exporter.tiles.into_inner().unwrap(), vec![TileIndex::new(1, 2)]);
    }

    #[test]
    fn test_invalid_enclosure_fails_only_that_tile() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(DVec3::new(0.1, 0.1, 0.0));
        mesh.add_vertex(DVec3::new(0.3, 0.1, 0.015));
        // negative base depth lifts the base above the top for z = 0.015 only
        let config = TileConfig {
            min_model_base_depth: -0.11,
            ..full_grid()
        };

        let report = run_batch(&mesh, &config, &IdentityKernel, &MemoryExporter::default());
        assert_eq!(report.exported(), 1);
        assert_eq!(report.failed(), 1);
        match report.outcome(TileIndex::new(0, 1)) {
            Some(TileOutcome::Failed { stage, error }) => {
                assert_eq!(*stage, TileStage::Profiled);
                assert!(matches!(error, TileError::InvalidEnclosure { .. }));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_export_failure_is_tile_local() {
        let mesh = points_in(&[(0, 0), (0, 1)]);
        let report = run_batch(&mesh, &full_grid(), &IdentityKernel, &BrokenExporter);

        assert_eq!(report.failed(), 2);
        assert_eq!(report.skipped(), 13);
        match report.outcome(TileIndex::new(0, 0)) {
            Some(TileOutcome::Failed { stage, error }) => {
                assert_eq!(*stage, TileStage::Combined);
                assert!(matches!(error, TileError::Export { .. }));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_bsp_kernel_on_point_terrain() {
        // no terrain triangles: only the sockets are cut
        let mesh = points_in(&[(1, 2)]);
        let exporter = MemoryExporter::default();
        let report = run_batch(&mesh, &TileConfig::default(), &BspKernel::default(), &exporter);

        match report.outcome(TileIndex::new(1, 2)) {
            Some(TileOutcome::Exported { skipped_steps, .. }) => assert!(skipped_steps.is_empty()),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(report.degraded(), 0);
    }
}
