//! # Mesh Operations
//!
//! Operations on meshes: boolean subtraction (CSG).

pub mod boolean;

pub use boolean::difference;
