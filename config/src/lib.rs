//! # Config Crate
//!
//! Centralized configuration for the terrain tiling pipeline.
//! Precision tolerances, fixture geometry constants and the per-run
//! [`TileConfig`](tiling::TileConfig) record all live here so the mesh
//! kernel and the tiling core never carry their own literals.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{approx_equal, BORE_OVERCUT};
//! use config::tiling::TileConfig;
//!
//! let cfg = TileConfig::default();
//! assert!(cfg.validate().is_ok());
//! assert!(approx_equal(cfg.tile_size, 0.20));
//! assert!(BORE_OVERCUT > cfg.magnet_height);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Explicit Record**: Run options travel as a value, never as globals
//! - **Validated Early**: A loaded config is checked before any tile runs

pub mod constants;
pub mod tiling;

pub use tiling::{BaseParams, ConfigError, MagnetParams, TileConfig};
