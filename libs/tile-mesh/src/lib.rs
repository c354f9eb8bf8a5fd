//! # Tile Mesh
//!
//! Mesh storage and solid modelling for terrain tiles.
//!
//! ## Architecture
//!
//! ```text
//! STL file → io::load_stl → Mesh ─┐
//! primitives (box, frustum) ──────┼→ ops::difference → Mesh → io::save_stl
//! ```
//!
//! ## Algorithms
//!
//! All algorithms are pure Rust:
//! - **Boolean Difference**: BSP trees (csg.js algorithm)
//! - **Triangulation**: Fan triangulation of convex BSP fragments
//! - **Welding**: Grid hashing at a fixed distance
//!
//! ## Usage
//!
//! ```rust
//! use glam::DVec3;
//! use tile_mesh::primitives::{create_box, create_frustum};
//! use tile_mesh::difference;
//!
//! let block = create_box(DVec3::ZERO, DVec3::splat(1.0)).unwrap();
//! let hole = create_frustum(DVec3::new(0.5, 0.5, -0.5), 2.0, 0.2, 0.2, 16).unwrap();
//! let drilled = difference(&block, &hole, 1e-7).unwrap();
//! assert!(drilled.triangle_count() > block.triangle_count());
//! ```

pub mod error;
pub mod io;
pub mod mesh;
pub mod ops;
pub mod primitives;

pub use error::MeshError;
pub use mesh::Mesh;
pub use ops::boolean::difference;
