//! # Mesh I/O
//!
//! Reading and writing STL files. Imported surfaces arrive as triangle soup;
//! callers weld them with [`Mesh::weld`](crate::Mesh::weld) when shared
//! vertices matter.

mod error;
mod stl;

pub use error::{IoError, IoResult};
pub use stl::{load_stl, parse_stl, save_stl, write_stl_binary};
