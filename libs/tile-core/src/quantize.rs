//! # Base Quantizer
//!
//! Places the underside of each tile. With quantization on, bottoms snap down
//! to a fixed step grid so neighbouring tiles share a handful of depths.

use config::{BaseParams, TileConfig};
use glam::{DVec2, DVec3};
use tile_mesh::primitives::create_box;
use tile_mesh::{Mesh, MeshError};

use crate::error::TileError;
use crate::grid::{TileFootprint, TileIndex};

/// Underside height for a tile whose lowest model point is `min_z`.
///
/// Never above `min_z - min_model_base_depth`.
pub fn quantized_bottom(min_z: f64, params: &BaseParams) -> f64 {
    if !params.quantize_fill {
        return min_z - params.min_model_base_depth - params.fill_layer_thickness;
    }

    let pre_base = min_z - params.min_model_base_depth;
    let anchor = params.quantize_anchor_z;
    let step = params.fill_layer_thickness;
    let snapped = anchor + ((pre_base - anchor) / step).floor() * step;
    snapped - params.eps
}

/// Raw tile block before any subtraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enclosure {
    pub index: TileIndex,
    pub footprint: TileFootprint,
    pub bottom_z: f64,
    pub top_z: f64,
}

impl Enclosure {
    /// Sizes the enclosure of a populated tile.
    ///
    /// The top sits half a tile above `min_z`. Returns
    /// [`TileError::InvalidEnclosure`] when the base does not end up strictly
    /// below the top.
    pub fn new(
        index: TileIndex,
        footprint: TileFootprint,
        min_z: f64,
        config: &TileConfig,
    ) -> Result<Self, TileError> {
        let bottom_z = quantized_bottom(min_z, &config.base_params());
        let top_z = min_z + config.tile_size * 0.5;

        // negated so NaN is rejected too
        if !(bottom_z < top_z) {
            return Err(TileError::InvalidEnclosure {
                index,
                bottom_z,
                top_z,
            });
        }

        Ok(Self {
            index,
            footprint,
            bottom_z,
            top_z,
        })
    }

    pub fn height(&self) -> f64 {
        self.top_z - self.bottom_z
    }

    /// Center of the block.
    pub fn center(&self) -> DVec3 {
        let DVec2 { x, y } = self.footprint.center();
        DVec3::new(x, y, (self.bottom_z + self.top_z) * 0.5)
    }

    pub fn min(&self) -> DVec3 {
        self.footprint.min_at(self.bottom_z)
    }

    pub fn max(&self) -> DVec3 {
        self.footprint.max_at(self.top_z)
    }

    /// Closed box mesh of the block.
    pub fn to_mesh(&self) -> Result<Mesh, MeshError> {
        create_box(self.min(), self.max())
    }
}
