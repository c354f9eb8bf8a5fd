//! # Primitives
//!
//! Mesh generation for the solids a tile is carved from and with.

pub mod cube;
pub mod frustum;

pub use cube::create_box;
pub use frustum::create_frustum;
