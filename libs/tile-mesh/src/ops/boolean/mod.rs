//! # Boolean Difference (CSG)
//!
//! Solid subtraction using BSP trees.
//!
//! ## Algorithm
//!
//! Based on the csg.js algorithm by Evan Wallace:
//! A − B = ~(~A ∪ B), computed as
//! `A.invert(); A.clipTo(B); B.clipTo(A); B.invert(); B.clipTo(A); B.invert()`,
//! then the surviving polygons of both trees are combined and flipped back.
//!
//! Polygons are fan-triangulated on output; vertices are not shared between
//! output triangles.
//!
//! ## Example
//!
//! ```rust
//! use tile_mesh::ops::boolean::difference;
//! use tile_mesh::primitives::create_box;
//! use glam::DVec3;
//!
//! let a = create_box(DVec3::ZERO, DVec3::splat(2.0)).unwrap();
//! let b = create_box(DVec3::splat(1.0), DVec3::splat(3.0)).unwrap();
//! let result = difference(&a, &b, 1e-7).unwrap();
//! assert!(!result.is_empty());
//! ```

mod bsp;
mod plane;
mod polygon;

use crate::error::MeshError;
use crate::Mesh;
use bsp::BspNode;
use polygon::Polygon;

// =============================================================================
// PUBLIC API
// =============================================================================

/// Compute the difference of two closed meshes (A − B).
///
/// `b` may also be an open surface. Its solid side is then the half-space
/// behind its faces, so a ground surface facing down removes everything
/// above it.
///
/// ## Parameters
///
/// - `a`: Solid to cut from
/// - `b`: Solid to remove
/// - `epsilon`: Plane thickness for coplanarity tests
///
/// ## Returns
///
/// - `Ok(a.clone())` when `b` is empty or cannot touch `a`
/// - `Err(MeshError::BooleanFailed)` when `a` has no usable faces or nothing
///   of `a` survives the cut
pub fn difference(a: &Mesh, b: &Mesh, epsilon: f64) -> Result<Mesh, MeshError> {
    let polys_a = mesh_to_polygons(a);
    if polys_a.is_empty() {
        return Err(MeshError::boolean_failed(
            "difference: first operand has no non-degenerate faces",
        ));
    }

    let polys_b = mesh_to_polygons(b);
    if polys_b.is_empty() || !bounds_overlap(a, b) {
        log::trace!("difference: operands are disjoint, returning first operand");
        return Ok(a.clone());
    }

    let (count_a, count_b) = (polys_a.len(), polys_b.len());
    let mut bsp_a = BspNode::new(polys_a, epsilon);
    let mut bsp_b = BspNode::new(polys_b, epsilon);

    bsp_a.invert();
    bsp_a.clip_to(&bsp_b);
    bsp_b.clip_to(&bsp_a);
    bsp_b.invert();
    bsp_b.clip_to(&bsp_a);
    bsp_b.invert();

    let mut result_polys = bsp_a.all_polygons();
    result_polys.extend(bsp_b.all_polygons());
    for poly in &mut result_polys {
        poly.flip();
    }

    let result = polygons_to_mesh(&result_polys);
    log::debug!(
        "difference: {count_a} - {count_b} polygons -> {} triangles (depth {}/{})",
        result.triangle_count(),
        bsp_a.depth(),
        bsp_b.depth()
    );

    if result.is_empty() {
        return Err(MeshError::boolean_failed("difference produced an empty mesh"));
    }

    Ok(result)
}

// =============================================================================
// CONVERSION HELPERS
// =============================================================================

fn bounds_overlap(a: &Mesh, b: &Mesh) -> bool {
    match (a.bounding_box(), b.bounding_box()) {
        (Some((a_min, a_max)), Some((b_min, b_max))) => {
            a_min.cmple(b_max).all() && b_min.cmple(a_max).all()
        }
        _ => false,
    }
}

/// Convert mesh to list of polygons, skipping degenerate triangles.
fn mesh_to_polygons(mesh: &Mesh) -> Vec<Polygon> {
    mesh.iter_triangles()
        .filter_map(|tri| Polygon::from_vertices(tri.to_vec()))
        .collect()
}

/// Convert list of polygons back to mesh.
fn polygons_to_mesh(polygons: &[Polygon]) -> Mesh {
    let mut mesh = Mesh::new();

    for poly in polygons {
        let vertices = poly.vertices();
        if vertices.len() < 3 {
            continue;
        }

        let base_idx = mesh.vertex_count() as u32;
        for v in vertices {
            mesh.add_vertex(*v);
        }

        // Fan triangulation
        for i in 1..(vertices.len() as u32 - 1) {
            mesh.add_triangle(base_idx, base_idx + i, base_idx + i + 1);
        }
    }

    mesh
}

// =============================================================================
// TESTS
// =============================================================================
