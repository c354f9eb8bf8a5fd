//! # CSG Combiner
//!
//! Carves one tile out of its enclosure block. Subtractions run in a fixed
//! order: terrain, then the four bores, then the four countersinks.
//!
//! The terrain is a ground surface whose faces point up, away from the
//! ground. It is flipped before the cut so that its solid side is the air
//! above it: the tile keeps the relief and the base below it.
//!
//! A failed subtraction does not abort the tile. The step is logged, the
//! geometry from before the step is kept, and the step is listed in
//! [`CombinedTile::skipped_steps`].

use std::fmt;

use config::constants::PLANE_EPSILON;
use tile_mesh::{difference, Mesh, MeshError};

use crate::error::TileError;
use crate::fixtures::MagnetSocket;
use crate::quantize::Enclosure;

// =============================================================================
// BOOLEAN KERNEL
// =============================================================================

/// Solid subtraction backend.
///
/// Shared by every worker thread of a batch.
pub trait BooleanKernel: Send + Sync {
    /// Computes `a - b`.
    fn subtract(&self, a: &Mesh, b: &Mesh) -> Result<Mesh, MeshError>;
}

/// BSP-tree subtraction from `tile-mesh`. Stateless.
#[derive(Debug, Clone, Copy)]
pub struct BspKernel {
    epsilon: f64,
}

impl BspKernel {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }
}

impl Default for BspKernel {
    fn default() -> Self {
        Self::new(PLANE_EPSILON)
    }
}

impl BooleanKernel for BspKernel {
    fn subtract(&self, a: &Mesh, b: &Mesh) -> Result<Mesh, MeshError> {
        difference(a, b, self.epsilon)
    }
}

// =============================================================================
// STEPS
// =============================================================================

/// One subtraction in the tile recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsgStep {
    Terrain,
    /// Bore of the socket at this corner position.
    Bore(usize),
    /// Countersink of the socket at this corner position.
    Countersink(usize),
}

impl fmt::Display for CsgStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsgStep::Terrain => write!(f, "terrain"),
            CsgStep::Bore(i) => write!(f, "bore {i}"),
            CsgStep::Countersink(i) => write!(f, "countersink {i}"),
        }
    }
}

/// Finished tile solid.
#[derive(Debug, Clone)]
pub struct CombinedTile {
    pub mesh: Mesh,
    /// Steps whose subtraction failed, in execution order.
    pub skipped_steps: Vec<CsgStep>,
}

// =============================================================================
// COMBINER
// =============================================================================

/// Builds the tile solid `enclosure - terrain - bores - countersinks`.
///
/// Only the terrain triangles whose bounds touch the enclosure are handed to
/// the kernel, flipped to face down. Fails only if the enclosure block
/// itself cannot be built.
pub fn combine_tile<K: BooleanKernel + ?Sized>(
    kernel: &K,
    terrain: &Mesh,
    enclosure: &Enclosure,
    sockets: &[MagnetSocket; 4],
    segments: u32,
) -> Result<CombinedTile, TileError> {
    let index = enclosure.index;
    let mut solid = enclosure
        .to_mesh()
        .map_err(|source| TileError::Geometry { index, source })?;
    let mut skipped_steps = Vec::new();

    let mut nearby = terrain.crop_to_bounds(enclosure.min(), enclosure.max());
    nearby.flip_normals();
    log::debug!(
        "tile {index}: {} of {} terrain triangles near enclosure",
        nearby.triangle_count(),
        terrain.triangle_count()
    );
    if !nearby.is_empty() {
        solid = apply_step(kernel, enclosure, CsgStep::Terrain, solid, Ok(nearby), &mut skipped_steps);
    }

    for (i, socket) in sockets.iter().enumerate() {
        let cutter = socket.bore.to_mesh(segments);
        solid = apply_step(kernel, enclosure, CsgStep::Bore(i), solid, cutter, &mut skipped_steps);
    }

    for (i, socket) in sockets.iter().enumerate() {
        let cutter = socket.countersink.to_mesh(segments);
        solid = apply_step(kernel, enclosure, CsgStep::Countersink(i), solid, cutter, &mut skipped_steps);
    }

    Ok(CombinedTile {
        mesh: solid,
        skipped_steps,
    })
}

/// Runs one subtraction, keeping `solid` unchanged on failure.
fn apply_step<K: BooleanKernel + ?Sized>(
    kernel: &K,
    enclosure: &Enclosure,
    step: CsgStep,
    solid: Mesh,
    cutter: Result<Mesh, MeshError>,
    skipped_steps: &mut Vec<CsgStep>,
) -> Mesh {
    let index = enclosure.index;
    match cutter.and_then(|cutter| kernel.subtract(&solid, &cutter)) {
        Ok(result) => {
            log::debug!(
                "tile {index}: {step} -> {} triangles",
                result.triangle_count()
            );
            result
        }
        Err(err) => {
            log::warn!("tile {index}: {step} subtraction failed, keeping previous geometry: {err}");
            skipped_steps.push(step);
            solid
        }
    }
}
