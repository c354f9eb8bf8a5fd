//! End-to-end tiling runs over a small synthetic terrain.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use approx::assert_relative_eq;
use config::constants::{BORE_OVERCUT, COUNTERSINK_OVERLAP};
use config::TileConfig;
use glam::DVec3;
use tile_core::{
    effective_offset, footprint, min_z_in_footprint, quantized_bottom, run, run_batch,
    BooleanKernel, BspKernel, CsgStep, Enclosure, StlDirExporter, TileExporter, TileFootprint,
    TileGrid, TileIndex, TileOutcome,
};
use tile_mesh::io::{load_stl, save_stl, IoError};
use tile_mesh::{Mesh, MeshError};

/// Tiles that carry a patch of ground.
const POPULATED: [(usize, usize); 4] = [(0, 0), (1, 2), (2, 1), (4, 0)];

/// Height of the ground patch of the `i`-th populated tile.
fn patch_height(i: usize) -> f64 {
    0.02 + i as f64 * 0.01
}

/// A flat ground patch facing up inside each populated tile, clear of the
/// tile edges so no neighbour is populated.
fn terrain() -> Mesh {
    let mut mesh = Mesh::new();
    for (i, &(row, col)) in POPULATED.iter().enumerate() {
        let x = col as f64 * 0.2;
        let y = row as f64 * 0.2;
        let z = patch_height(i);
        let base = mesh.vertex_count() as u32;
        for (dx, dy) in [(0.05, 0.05), (0.15, 0.05), (0.15, 0.15), (0.05, 0.15)] {
            mesh.add_vertex(DVec3::new(x + dx, y + dy, z));
        }
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base, base + 2, base + 3);
    }
    mesh
}

/// Ground rising along +x, `z = 0.02 + 0.05 x`, covering the whole grid on a
/// 0.1 m lattice so every tile edge is crossed by triangles.
fn hillside() -> Mesh {
    let height = |x: f64| 0.02 + 0.05 * x;
    let (nx, ny) = (7, 11);
    let mut mesh = Mesh::new();
    for j in 0..ny {
        for i in 0..nx {
            let x = i as f64 * 0.1;
            mesh.add_vertex(DVec3::new(x, j as f64 * 0.1, height(x)));
        }
    }
    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            let v = (j * nx + i) as u32;
            let up = v + nx as u32;
            mesh.add_triangle(v, v + 1, up + 1);
            mesh.add_triangle(v, up + 1, up);
        }
    }
    mesh
}

/// Keeps exported tiles in memory.
#[derive(Default)]
struct MemoryTiles {
    meshes: Mutex<BTreeMap<TileIndex, Mesh>>,
}

impl TileExporter for MemoryTiles {
    fn export(&self, index: TileIndex, mesh: &Mesh) -> Result<PathBuf, IoError> {
        self.meshes.lock().unwrap().insert(index, mesh.clone());
        Ok(PathBuf::from(format!("memory/{index}")))
    }
}

/// Volume one magnet socket takes out of a base: the bore above the
/// underside plus the countersink cone above the bore.
fn socket_volume(config: &TileConfig) -> f64 {
    let n = config.segments as f64;
    let ngon = |r: f64| 0.5 * n * r * r * (2.0 * PI / n).sin();
    let radius = config.magnet_radius - config.countersink_shoulder;
    let exposed = radius - COUNTERSINK_OVERLAP;
    ngon(config.magnet_radius) * config.magnet_height
        + ngon(radius) * radius / 3.0 * (exposed / radius).powi(3)
}

fn full_grid(output: &Path) -> TileConfig {
    TileConfig {
        single_tile_mode: false,
        segments: 12,
        output_dir: output.to_path_buf(),
        ..TileConfig::default()
    }
}

fn written_files(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

/// BSP subtraction that refuses every bore cut inside one footprint.
struct FailingBores {
    inner: BspKernel,
    footprint: TileFootprint,
    bore_depth: f64,
}

impl BooleanKernel for FailingBores {
    fn subtract(&self, a: &Mesh, b: &Mesh) -> Result<Mesh, MeshError> {
        if let Some((min, max)) = b.bounding_box() {
            let inside = self.footprint.contains(min.x, min.y) && self.footprint.contains(max.x, max.y);
            let is_bore = ((max.z - min.z) - self.bore_depth).abs() < 1e-9;
            if inside && is_bore {
                return Err(MeshError::boolean_failed("forced bore failure"));
            }
        }
        self.inner.subtract(a, b)
    }
}

#[test]
fn scenario_a_quantized_base() {
    let config = TileConfig::default();
    let bottom = quantized_bottom(0.137, &config.base_params());
    assert_relative_eq!(bottom, 0.12 - config.eps, epsilon = 1e-12);
    assert!(bottom <= 0.137 - config.min_model_base_depth);
}

#[test]
fn scenario_b_empty_tiles_write_nothing() {
    let out = tempfile::tempdir().unwrap();
    let config = full_grid(out.path());
    let exporter = StlDirExporter::create(out.path()).unwrap();

    let report = run_batch(&terrain(), &config, &BspKernel::default(), &exporter);

    assert_eq!(report.exported(), POPULATED.len());
    assert_eq!(report.skipped(), 15 - POPULATED.len());
    assert_eq!(report.failed(), 0);

    let expected: BTreeSet<String> = POPULATED
        .iter()
        .map(|&(row, col)| format!("tile_{col}_{row}.stl"))
        .collect();
    assert_eq!(written_files(out.path()), expected);
}

#[test]
fn scenario_c_offset_clamp() {
    let config = TileConfig {
        magnet_radius: 0.005,
        magnet_safety: 0.001,
        magnet_perim_offset: 0.001,
        ..TileConfig::default()
    };
    assert_relative_eq!(effective_offset(&config.magnet_params()), 0.006, epsilon = 1e-12);
}

#[test]
fn scenario_d_bore_failure_is_isolated() {
    let out = tempfile::tempdir().unwrap();
    let config = full_grid(out.path());
    let exporter = StlDirExporter::create(out.path()).unwrap();
    let broken = TileIndex::new(1, 2);
    let kernel = FailingBores {
        inner: BspKernel::default(),
        footprint: footprint(broken, config.tile_size),
        bore_depth: config.magnet_height + BORE_OVERCUT,
    };

    let report = run_batch(&terrain(), &config, &kernel, &exporter);

    assert_eq!(report.exported(), POPULATED.len());
    assert_eq!(report.degraded(), 1);
    for tile in &report.tiles {
        match &tile.outcome {
            TileOutcome::Exported { path, skipped_steps } => {
                assert!(path.is_file());
                if tile.index == broken {
                    assert_eq!(
                        skipped_steps,
                        &vec![CsgStep::Bore(0), CsgStep::Bore(1), CsgStep::Bore(2), CsgStep::Bore(3)]
                    );
                } else {
                    assert!(skipped_steps.is_empty());
                }
            }
            TileOutcome::Skipped => {}
            TileOutcome::Failed { error, .. } => panic!("tile {} failed: {error}", tile.index),
        }
    }
}

#[test]
fn tiles_keep_their_footprint_and_height() {
    let out = tempfile::tempdir().unwrap();
    let config = TileConfig {
        single_tile_mode: true,
        single_tile_row: 2,
        single_tile_col: 1,
        ..full_grid(out.path())
    };
    let exporter = StlDirExporter::create(out.path()).unwrap();

    let report = run_batch(&terrain(), &config, &BspKernel::default(), &exporter);
    assert_eq!(report.tiles.len(), 1);

    let tile = load_stl(out.path().join("tile_1_2.stl")).unwrap();
    let (min, max) = tile.bounding_box().unwrap();
    // ground patch of tile (2, 1)
    let ground = patch_height(2);
    let bottom = quantized_bottom(ground, &config.base_params());
    assert_relative_eq!(min.x, 0.2, epsilon = 1e-6);
    assert_relative_eq!(max.x, 0.4, epsilon = 1e-6);
    assert_relative_eq!(min.y, 0.4, epsilon = 1e-6);
    assert_relative_eq!(max.y, 0.6, epsilon = 1e-6);
    assert_relative_eq!(min.z, bottom, epsilon = 1e-6);
    assert_relative_eq!(max.z, ground, epsilon = 1e-6);
}

#[test]
fn hillside_tiles_keep_relief_base_and_sockets() {
    let config = TileConfig {
        single_tile_mode: false,
        segments: 12,
        ..TileConfig::default()
    };
    let mesh = hillside();
    let exporter = MemoryTiles::default();

    let report = run_batch(&mesh, &config, &BspKernel::default(), &exporter);
    assert_eq!(report.exported(), 15);
    assert_eq!(report.degraded(), 0);

    let tiles = exporter.meshes.into_inner().unwrap();
    for index in TileGrid::from_config(&config).indices() {
        let fp = footprint(index, config.tile_size);
        let min_z = min_z_in_footprint(&mesh, &fp).unwrap();
        let enclosure = Enclosure::new(index, fp, min_z, &config).unwrap();
        let tile = &tiles[&index];

        // the top follows the ground, the underside is the quantized base
        let (min, max) = tile.bounding_box().unwrap();
        assert_relative_eq!(min.x, fp.min_x, epsilon = 1e-9);
        assert_relative_eq!(max.x, fp.max_x, epsilon = 1e-9);
        assert_relative_eq!(min.y, fp.min_y, epsilon = 1e-9);
        assert_relative_eq!(max.y, fp.max_y, epsilon = 1e-9);
        assert_relative_eq!(min.z, enclosure.bottom_z, epsilon = 1e-9);
        assert_relative_eq!(max.z, 0.02 + 0.05 * fp.max_x, epsilon = 1e-9);

        // relief over the base, minus four sockets
        let mean_ground = 0.02 + 0.05 * fp.center().x;
        let block = config.tile_size * config.tile_size * (mean_ground - enclosure.bottom_z);
        let expected = block - 4.0 * socket_volume(&config);
        assert_relative_eq!(tile.signed_volume(), expected, epsilon = 1e-10);
    }
}

#[test]
fn runs_are_deterministic() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let mesh = terrain();

    for dir in [first.path(), second.path()] {
        let exporter = StlDirExporter::create(dir).unwrap();
        run_batch(&mesh, &full_grid(dir), &BspKernel::default(), &exporter);
    }

    for name in written_files(first.path()) {
        let a = fs::read(first.path().join(&name)).unwrap();
        let b = fs::read(second.path().join(&name)).unwrap();
        assert_eq!(a, b, "{name} differs between runs");
    }
}

#[test]
fn run_from_config_file_paths() {
    let work = tempfile::tempdir().unwrap();
    let input = work.path().join("scaled_mesh.stl");
    save_stl(&terrain(), &input).unwrap();

    let config = TileConfig {
        input_mesh: input,
        ..full_grid(&work.path().join("output").join("tiles"))
    };

    let report = run(&config).unwrap();
    assert_eq!(report.exported(), POPULATED.len());
    assert!(config.output_dir.join("tile_2_1.stl").is_file());
    assert!(!config.output_dir.join("tile_1_1.stl").exists());
}
