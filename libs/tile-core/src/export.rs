//! # Tile Export
//!
//! Writes finished tiles. Files are named by grid position as
//! `tile_{col}_{row}.stl`.

use std::fs;
use std::path::{Path, PathBuf};

use tile_mesh::io::{save_stl, IoError};
use tile_mesh::Mesh;

use crate::error::TileError;
use crate::grid::TileIndex;

/// Destination for finished tiles.
///
/// Called concurrently from the batch workers.
pub trait TileExporter: Send + Sync {
    /// Stores the tile and returns where it went.
    fn export(&self, index: TileIndex, mesh: &Mesh) -> Result<PathBuf, IoError>;
}

/// Writes each tile as a binary STL into one directory.
#[derive(Debug, Clone)]
pub struct StlDirExporter {
    dir: PathBuf,
}

impl StlDirExporter {
    /// Exporter for `dir`, creating it (and its parents) if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, TileError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| TileError::OutputDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Target path of a tile.
    pub fn path_for(&self, index: TileIndex) -> PathBuf {
        self.dir.join(file_name(index))
    }
}

impl TileExporter for StlDirExporter {
    fn export(&self, index: TileIndex, mesh: &Mesh) -> Result<PathBuf, IoError> {
        let path = self.path_for(index);
        save_stl(mesh, &path)?;
        Ok(path)
    }
}

/// File name of a tile, column first.
pub fn file_name(index: TileIndex) -> String {
    format!("tile_{}_{}.stl", index.col, index.row)
}
