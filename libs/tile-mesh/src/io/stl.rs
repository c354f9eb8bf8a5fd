//! STL (Stereolithography) file format support.
//!
//! Reads ASCII and binary STL, writes binary STL.
//!
//! # Format Detection
//!
//! A buffer whose length matches `84 + 50 * face_count` is binary, whatever
//! its header says. Otherwise a buffer starting with "solid" is parsed as
//! ASCII, and anything else as (possibly truncated) binary.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count
//! end
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use config::constants::MAX_FILE_SIZE;
use glam::DVec3;

use super::error::{IoError, IoResult};
use crate::mesh::Mesh;

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Load a mesh from an STL file.
///
/// # Errors
///
/// - [`IoError::FileNotFound`] if `path` does not exist
/// - [`IoError::TooLarge`] if the file is bigger than `MAX_FILE_SIZE`
/// - any parse error from [`parse_stl`]
pub fn load_stl<P: AsRef<Path>>(path: P) -> IoResult<Mesh> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;

    if metadata.len() > MAX_FILE_SIZE {
        return Err(IoError::TooLarge {
            size: metadata.len(),
            max: MAX_FILE_SIZE,
        });
    }

    let bytes = fs::read(path)?;
    let mesh = parse_stl(&bytes)?;
    log::debug!(
        "loaded {} ({} triangles)",
        path.display(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Parse STL content from memory.
pub fn parse_stl(bytes: &[u8]) -> IoResult<Mesh> {
    if bytes.len() < 6 {
        return Err(IoError::invalid_content("file too small to be valid STL"));
    }

    let binary_size_matches = bytes.len() >= HEADER_SIZE + 4
        && bytes.len() == HEADER_SIZE + 4 + face_count(bytes) as usize * TRIANGLE_SIZE;

    if !binary_size_matches && is_ascii(bytes) {
        parse_ascii(bytes)
    } else {
        parse_binary(bytes)
    }
}

fn is_ascii(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(HEADER_SIZE)];
    String::from_utf8_lossy(head).trim_start().starts_with("solid")
}

fn face_count(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ])
}

fn parse_binary(bytes: &[u8]) -> IoResult<Mesh> {
    if bytes.len() < HEADER_SIZE + 4 {
        return Err(IoError::InvalidHeader {
            expected: HEADER_SIZE + 4,
            got: bytes.len(),
        });
    }

    let expected = face_count(bytes);
    let body = &bytes[HEADER_SIZE + 4..];
    let available = (body.len() / TRIANGLE_SIZE) as u32;
    if available < expected {
        return Err(IoError::InvalidFaceCount {
            expected,
            got: available,
        });
    }

    let mesh = Mesh::from_triangles(
        body.chunks_exact(TRIANGLE_SIZE)
            .take(expected as usize)
            .map(|tri| {
                // Skip normal (12 bytes)
                [
                    read_vertex(&tri[12..24]),
                    read_vertex(&tri[24..36]),
                    read_vertex(&tri[36..48]),
                ]
            }),
    );
    Ok(mesh)
}

/// Read a vertex from 12 bytes (3 f32s).
fn read_vertex(buf: &[u8]) -> DVec3 {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    DVec3::new(f64::from(x), f64::from(y), f64::from(z))
}

fn parse_ascii(bytes: &[u8]) -> IoResult<Mesh> {
    let text = String::from_utf8_lossy(bytes);
    let mut triangles = Vec::new();
    let mut corners: Vec<DVec3> = Vec::with_capacity(3);
    let mut in_loop = false;

    for line in text.lines() {
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "outer" => {
                in_loop = true;
                corners.clear();
            }
            "vertex" if in_loop => {
                let coords: Vec<&str> = parts.collect();
                if coords.len() < 3 {
                    return Err(IoError::invalid_content(format!(
                        "vertex line has {} coordinates",
                        coords.len()
                    )));
                }
                corners.push(DVec3::new(
                    coords[0].parse()?,
                    coords[1].parse()?,
                    coords[2].parse()?,
                ));
            }
            "endloop" => in_loop = false,
            "endfacet" => {
                if let &[a, b, c] = corners.as_slice() {
                    triangles.push([a, b, c]);
                } else {
                    return Err(IoError::invalid_content(format!(
                        "facet with {} vertices",
                        corners.len()
                    )));
                }
                corners.clear();
            }
            "endsolid" => break,
            _ => {}
        }
    }

    Ok(Mesh::from_triangles(triangles))
}

/// Save a mesh to a binary STL file.
pub fn save_stl<P: AsRef<Path>>(mesh: &Mesh, path: P) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_stl_binary(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write mesh as binary STL.
pub fn write_stl_binary<W: Write>(mesh: &Mesh, mut writer: W) -> IoResult<()> {
    let mut header = [b' '; HEADER_SIZE];
    let text = b"Binary STL generated by terrain-tiler";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    let face_count = u32::try_from(mesh.triangle_count())
        .map_err(|_| IoError::invalid_content("mesh has more than u32::MAX triangles"))?;
    writer.write_all(&face_count.to_le_bytes())?;

    for [v0, v1, v2] in mesh.iter_triangles() {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        for v in [normal, v0, v1, v2] {
            writer.write_all(&(v.x as f32).to_le_bytes())?;
            writer.write_all(&(v.y as f32).to_le_bytes())?;
            writer.write_all(&(v.z as f32).to_le_bytes())?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }

    Ok(())
}
