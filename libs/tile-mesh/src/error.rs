//! # Mesh Errors
//!
//! Error types for mesh construction and boolean operations.

use thiserror::Error;

use crate::io::IoError;

/// Errors that can occur during mesh generation and CSG.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Degenerate geometry
    #[error("Degenerate geometry: {message}")]
    DegenerateGeometry { message: String },

    /// Boolean operation failed
    #[error("Boolean operation failed: {message}")]
    BooleanFailed { message: String },

    /// Mesh file could not be read or written
    #[error("Mesh I/O failed: {0}")]
    Io(#[from] IoError),
}

impl MeshError {
    /// Creates a degenerate geometry error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            message: message.into(),
        }
    }

    /// Creates a boolean operation failed error.
    pub fn boolean_failed(message: impl Into<String>) -> Self {
        Self::BooleanFailed {
            message: message.into(),
        }
    }
}
