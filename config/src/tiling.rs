//! # Tiling Configuration
//!
//! The run configuration record. Every option of the tiling pipeline is a
//! field of [`TileConfig`]; components receive either the whole record or one
//! of the narrower parameter views ([`BaseParams`], [`MagnetParams`]).
//!
//! Lengths are in meters. Missing JSON fields fall back to the defaults of
//! the reference print setup (20 cm tiles, 2 cm fill steps, 5 mm magnets).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_SEGMENTS, MAX_FILE_SIZE, MIN_SEGMENTS};

// =============================================================================
// ERRORS
// =============================================================================

/// Error returned when a configuration cannot be loaded or is invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A length that must be strictly positive is zero, negative or not finite.
    #[error("{field} must be a positive finite length: {value}")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Value that was supplied.
        value: f64,
    },

    /// A length that must be non-negative is negative or not finite.
    #[error("{field} must be a non-negative finite length: {value}")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// Value that was supplied.
        value: f64,
    },

    /// A value that only has to be finite is NaN or infinite.
    #[error("{field} must be finite: {value}")]
    NotFinite {
        /// Name of the offending field.
        field: &'static str,
        /// Value that was supplied.
        value: f64,
    },

    /// The grid has no columns or no rows.
    #[error("tile grid must be at least 1x1: {tiles_x}x{tiles_y}")]
    EmptyGrid {
        /// Configured column count.
        tiles_x: usize,
        /// Configured row count.
        tiles_y: usize,
    },

    /// Too few segments to tessellate a round cutter.
    #[error("segments must be >= 3: {0}")]
    InvalidSegments(u32),

    /// Single-tile mode points outside the grid.
    #[error("single tile (row {row}, col {col}) is outside the {tiles_x}x{tiles_y} grid")]
    SingleTileOutOfGrid {
        /// Selected row.
        row: usize,
        /// Selected column.
        col: usize,
        /// Configured column count.
        tiles_x: usize,
        /// Configured row count.
        tiles_y: usize,
    },

    /// Corner sockets are inset so far that neighbouring bores meet.
    #[error(
        "magnet inset {inset} on a {tile_size} tile leaves no room between bores of radius {magnet_radius}"
    )]
    SocketsOverlap {
        /// Effective inset of the socket centers.
        inset: f64,
        /// Configured tile size.
        tile_size: f64,
        /// Configured magnet radius.
        magnet_radius: f64,
    },

    /// Configuration file exceeds the size limit.
    #[error("config file too large: {size} bytes (max: {max})")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Maximum accepted size.
        max: u64,
    },

    /// Configuration file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration text is not valid JSON for [`TileConfig`].
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

// =============================================================================
// TILE CONFIG
// =============================================================================

/// Complete configuration for one tiling run.
///
/// # Examples
/// ```
/// use config::tiling::TileConfig;
///
/// let cfg = TileConfig::from_json_str(r#"{ "tiles_x": 4, "single_tile_mode": false }"#).unwrap();
/// assert_eq!(cfg.tiles_x, 4);
/// assert_eq!(cfg.tiles_y, 5);
/// assert!(cfg.single_tile().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Edge length of one square tile.
    pub tile_size: f64,
    /// Number of tile columns (X).
    pub tiles_x: usize,
    /// Number of tile rows (Y).
    pub tiles_y: usize,
    /// Material kept under the lowest model point of a tile.
    pub min_model_base_depth: f64,
    /// Quantization step of the underside (or the single fill layer).
    pub fill_layer_thickness: f64,
    /// Snap undersides to multiples of `fill_layer_thickness`.
    pub quantize_fill: bool,
    /// Z level the quantization grid is measured from.
    pub quantize_anchor_z: f64,
    /// Downward nudge applied after snapping.
    pub eps: f64,
    /// Magnet radius.
    pub magnet_radius: f64,
    /// Magnet thickness (pocket depth into the block).
    pub magnet_height: f64,
    /// Requested inset of the magnet centers from the tile edges.
    pub magnet_perim_offset: f64,
    /// Minimum wall left between a bore and the tile edge.
    pub magnet_safety: f64,
    /// Radial shoulder between bore wall and countersink base.
    pub countersink_shoulder: f64,
    /// Process only the tile at (`single_tile_row`, `single_tile_col`).
    pub single_tile_mode: bool,
    /// Row of the single tile.
    pub single_tile_row: usize,
    /// Column of the single tile.
    pub single_tile_col: usize,
    /// Source mesh (STL).
    pub input_mesh: PathBuf,
    /// Directory receiving `tile_{col}_{row}.stl` files.
    pub output_dir: PathBuf,
    /// Segments around bores and countersinks.
    pub segments: u32,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            tile_size: 0.20,
            tiles_x: 3,
            tiles_y: 5,
            min_model_base_depth: 0.005,
            fill_layer_thickness: 0.02,
            quantize_fill: true,
            quantize_anchor_z: 0.0,
            eps: 1e-6,
            magnet_radius: 0.005,
            magnet_height: 0.002,
            magnet_perim_offset: 0.004,
            magnet_safety: 0.001,
            countersink_shoulder: 0.001,
            single_tile_mode: true,
            single_tile_row: 1,
            single_tile_col: 2,
            input_mesh: PathBuf::from("./output/scaled_mesh.stl"),
            output_dir: PathBuf::from("./output/tiles"),
            segments: DEFAULT_SEGMENTS,
        }
    }
}

impl TileConfig {
    /// Parses a configuration from JSON text and validates it.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: TileConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        let size = fs::metadata(path).map_err(io_err)?.len();
        if size > MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge {
                size,
                max: MAX_FILE_SIZE,
            });
        }

        let text = fs::read_to_string(path).map_err(io_err)?;
        Self::from_json_str(&text)
    }

    /// Checks every option against its physical constraints.
    ///
    /// `min_model_base_depth` only has to be finite: a depth that collapses
    /// an enclosure is reported per tile by the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tile_size", self.tile_size)?;
        positive("fill_layer_thickness", self.fill_layer_thickness)?;
        positive("magnet_radius", self.magnet_radius)?;
        positive("magnet_height", self.magnet_height)?;

        non_negative("eps", self.eps)?;
        non_negative("magnet_perim_offset", self.magnet_perim_offset)?;
        non_negative("magnet_safety", self.magnet_safety)?;
        non_negative("countersink_shoulder", self.countersink_shoulder)?;

        finite("min_model_base_depth", self.min_model_base_depth)?;
        finite("quantize_anchor_z", self.quantize_anchor_z)?;

        // bores of neighbouring corners sit tile_size - 2 * inset apart
        let inset = self.magnet_params().effective_offset();
        if self.tile_size - 2.0 * inset <= 2.0 * self.magnet_radius {
            return Err(ConfigError::SocketsOverlap {
                inset,
                tile_size: self.tile_size,
                magnet_radius: self.magnet_radius,
            });
        }

        if self.tiles_x == 0 || self.tiles_y == 0 {
            return Err(ConfigError::EmptyGrid {
                tiles_x: self.tiles_x,
                tiles_y: self.tiles_y,
            });
        }

        if self.segments < MIN_SEGMENTS {
            return Err(ConfigError::InvalidSegments(self.segments));
        }

        if self.single_tile_mode
            && (self.single_tile_row >= self.tiles_y || self.single_tile_col >= self.tiles_x)
        {
            return Err(ConfigError::SingleTileOutOfGrid {
                row: self.single_tile_row,
                col: self.single_tile_col,
                tiles_x: self.tiles_x,
                tiles_y: self.tiles_y,
            });
        }

        Ok(())
    }

    /// Selected `(row, col)` when single-tile mode is on.
    pub fn single_tile(&self) -> Option<(usize, usize)> {
        self.single_tile_mode
            .then_some((self.single_tile_row, self.single_tile_col))
    }

    /// Parameters of the underside quantizer.
    pub fn base_params(&self) -> BaseParams {
        BaseParams {
            min_model_base_depth: self.min_model_base_depth,
            fill_layer_thickness: self.fill_layer_thickness,
            quantize_fill: self.quantize_fill,
            quantize_anchor_z: self.quantize_anchor_z,
            eps: self.eps,
        }
    }

    /// Parameters of the magnet fixture placer.
    pub fn magnet_params(&self) -> MagnetParams {
        MagnetParams {
            magnet_radius: self.magnet_radius,
            magnet_height: self.magnet_height,
            magnet_perim_offset: self.magnet_perim_offset,
            magnet_safety: self.magnet_safety,
            countersink_shoulder: self.countersink_shoulder,
            tile_size: self.tile_size,
        }
    }
}

// =============================================================================
// PARAMETER VIEWS
// =============================================================================

/// Inputs of the underside quantizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseParams {
    /// Material kept under the lowest model point.
    pub min_model_base_depth: f64,
    /// Quantization step (or single fill layer).
    pub fill_layer_thickness: f64,
    /// Whether to snap to the step grid.
    pub quantize_fill: bool,
    /// Origin of the step grid.
    pub quantize_anchor_z: f64,
    /// Downward nudge after snapping.
    pub eps: f64,
}

/// Inputs of the magnet fixture placer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnetParams {
    /// Magnet radius.
    pub magnet_radius: f64,
    /// Magnet thickness.
    pub magnet_height: f64,
    /// Requested inset from the tile edges.
    pub magnet_perim_offset: f64,
    /// Minimum wall between bore and edge.
    pub magnet_safety: f64,
    /// Radial shoulder before the countersink.
    pub countersink_shoulder: f64,
    /// Tile edge length.
    pub tile_size: f64,
}

impl MagnetParams {
    /// Inset of socket centers from the tile edges.
    ///
    /// Clamped so a bore never comes closer to an edge than
    /// `magnet_radius + magnet_safety`.
    pub fn effective_offset(&self) -> f64 {
        self.magnet_perim_offset
            .max(self.magnet_radius + self.magnet_safety)
    }
}

// =============================================================================
// VALIDATION HELPERS
// =============================================================================

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}
