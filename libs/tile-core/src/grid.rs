//! # Grid Partitioner
//!
//! Maps tile indices to their rectangular footprints in the XY plane.
//! Tile `(row, col)` covers `[col·S, (col+1)·S] × [row·S, (row+1)·S]`.

use std::fmt;

use config::TileConfig;
use glam::{DVec2, DVec3};

/// Position of a tile in the grid.
///
/// Orders row-major, which is also the order of [`TileGrid::indices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileIndex {
    pub row: usize,
    pub col: usize,
}

impl TileIndex {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Axis-aligned XY rectangle covered by one tile. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileFootprint {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl TileFootprint {
    /// Center of the rectangle.
    pub fn center(&self) -> DVec2 {
        DVec2::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    /// Whether `(x, y)` lies inside or on the boundary.
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }

    /// Lower corner lifted to `z`.
    pub fn min_at(&self, z: f64) -> DVec3 {
        DVec3::new(self.min_x, self.min_y, z)
    }

    /// Upper corner lifted to `z`.
    pub fn max_at(&self, z: f64) -> DVec3 {
        DVec3::new(self.max_x, self.max_y, z)
    }
}

/// Footprint of `index` on a grid of `tile_size` squares anchored at the origin.
pub fn footprint(index: TileIndex, tile_size: f64) -> TileFootprint {
    TileFootprint {
        min_x: index.col as f64 * tile_size,
        max_x: (index.col + 1) as f64 * tile_size,
        min_y: index.row as f64 * tile_size,
        max_y: (index.row + 1) as f64 * tile_size,
    }
}

/// Grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub tiles_x: usize,
    pub tiles_y: usize,
}

impl TileGrid {
    pub fn new(tiles_x: usize, tiles_y: usize) -> Self {
        Self { tiles_x, tiles_y }
    }

    pub fn from_config(config: &TileConfig) -> Self {
        Self::new(config.tiles_x, config.tiles_y)
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.tiles_x * self.tiles_y
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, index: TileIndex) -> bool {
        index.row < self.tiles_y && index.col < self.tiles_x
    }

    /// All indices, row outer and column inner.
    pub fn indices(&self) -> impl Iterator<Item = TileIndex> {
        let tiles_x = self.tiles_x;
        (0..self.tiles_y).flat_map(move |row| (0..tiles_x).map(move |col| TileIndex::new(row, col)))
    }
}
