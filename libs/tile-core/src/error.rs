//! # Pipeline Errors
//!
//! Error types for the tiling pipeline. Only [`TileError::MissingInput`],
//! [`TileError::Config`], [`TileError::Load`] and [`TileError::OutputDir`]
//! end a run; every other variant is confined to the tile it names.

use std::path::PathBuf;

use config::ConfigError;
use thiserror::Error;
use tile_mesh::io::IoError;
use tile_mesh::MeshError;

use crate::grid::TileIndex;

/// Errors that can occur while tiling a mesh.
#[derive(Debug, Error)]
pub enum TileError {
    /// Input mesh does not exist.
    #[error("input mesh not found: {}", path.display())]
    MissingInput { path: PathBuf },

    /// Configuration rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Input mesh could not be read.
    #[error("failed to load input mesh: {0}")]
    Load(#[from] IoError),

    /// Output directory could not be created.
    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Quantized base is not below the enclosure top.
    #[error("tile {index}: enclosure bottom {bottom_z} is not below top {top_z}")]
    InvalidEnclosure {
        index: TileIndex,
        bottom_z: f64,
        top_z: f64,
    },

    /// Enclosure block could not be built.
    #[error("tile {index}: {source}")]
    Geometry {
        index: TileIndex,
        #[source]
        source: MeshError,
    },

    /// Finished tile could not be written.
    #[error("tile {index}: export failed: {source}")]
    Export {
        index: TileIndex,
        #[source]
        source: IoError,
    },
}
