//! # Height Profiler
//!
//! Finds the lowest point of the global mesh under a tile. Only vertices are
//! sampled: a triangle that crosses the footprint without a vertex inside it
//! does not contribute.

use tile_mesh::Mesh;

use crate::grid::{footprint, TileFootprint, TileIndex};

/// Height summary of one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileProfile {
    pub index: TileIndex,
    pub footprint: TileFootprint,
    /// Lowest vertex Z under the footprint, `None` when unpopulated.
    pub min_z: Option<f64>,
}

impl TileProfile {
    pub fn is_populated(&self) -> bool {
        self.min_z.is_some()
    }
}

/// Minimum Z over the vertices whose XY lies inside `footprint` (inclusive).
pub fn min_z_in_footprint(mesh: &Mesh, footprint: &TileFootprint) -> Option<f64> {
    mesh.vertices()
        .iter()
        .filter(|v| footprint.contains(v.x, v.y))
        .map(|v| v.z)
        .reduce(f64::min)
}

/// Profiles the tile at `index`.
pub fn profile(mesh: &Mesh, index: TileIndex, tile_size: f64) -> TileProfile {
    let footprint = footprint(index, tile_size);
    TileProfile {
        index,
        footprint,
        min_z: min_z_in_footprint(mesh, &footprint),
    }
}
