//! # Tile Core
//!
//! Cuts a large terrain mesh into a grid of printable tiles with corner
//! magnet sockets.
//!
//! ## Architecture
//!
//! ```text
//! grid → profile → quantize → fixtures → combine → export
//!                                   batch (rayon) drives every tile
//! ```
//!
//! ## Example
//!
//! ```rust
//! use config::TileConfig;
//! use tile_core::{footprint, quantized_bottom, TileIndex};
//!
//! let config = TileConfig::default();
//! let fp = footprint(TileIndex::new(1, 2), config.tile_size);
//! assert!(fp.contains(0.5, 0.3));
//!
//! let bottom = quantized_bottom(0.137, &config.base_params());
//! assert!((bottom - (0.12 - 1e-6)).abs() < 1e-12);
//! ```

pub mod batch;
pub mod combine;
pub mod error;
pub mod export;
pub mod fixtures;
pub mod grid;
pub mod pipeline;
pub mod profile;
pub mod quantize;

pub use batch::{run_batch, BatchReport, TileMode, TileOutcome, TileReport, TileStage};
pub use combine::{combine_tile, BooleanKernel, BspKernel, CombinedTile, CsgStep};
pub use error::TileError;
pub use export::{StlDirExporter, TileExporter};
pub use fixtures::{effective_offset, place_sockets, Bore, Countersink, MagnetSocket};
pub use grid::{footprint, TileFootprint, TileGrid, TileIndex};
pub use pipeline::{load_terrain, run};
pub use profile::{min_z_in_footprint, profile, TileProfile};
pub use quantize::{quantized_bottom, Enclosure};
