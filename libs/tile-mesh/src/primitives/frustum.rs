//! # Frustum Primitive
//!
//! Generates vertical cylinders and cones, the cutters for magnet bores and
//! countersinks.

use crate::error::MeshError;
use crate::mesh::Mesh;
use config::constants::{approx_zero, MIN_SEGMENTS};
use glam::DVec3;
use std::f64::consts::PI;

/// Creates a vertical cylinder, cone or truncated cone.
///
/// # Arguments
///
/// * `base_center` - Center of the bottom cap
/// * `height` - Extent along +Z
/// * `radius_bottom` - Radius at `base_center.z`
/// * `radius_top` - Radius at `base_center.z + height` (0 for an apex)
/// * `segments` - Number of segments around the circumference
///
/// # Example
///
/// ```rust
/// use tile_mesh::primitives::create_frustum;
/// use glam::DVec3;
///
/// // 5 mm bore, 12 mm deep
/// let bore = create_frustum(DVec3::new(0.1, 0.1, -0.01), 0.012, 0.005, 0.005, 32).unwrap();
/// let (min, max) = bore.bounding_box().unwrap();
/// assert!((min.z + 0.01).abs() < 1e-12);
/// assert!((max.z - 0.002).abs() < 1e-12);
///
/// // 45 degree countersink cone
/// let cone = create_frustum(DVec3::ZERO, 0.004, 0.004, 0.0, 32).unwrap();
/// assert_eq!(cone.vertex_count(), 33);
/// ```
pub fn create_frustum(
    base_center: DVec3,
    height: f64,
    radius_bottom: f64,
    radius_top: f64,
    segments: u32,
) -> Result<Mesh, MeshError> {
    if !(height.is_finite() && height > 0.0) {
        return Err(MeshError::degenerate(format!(
            "Frustum height must be positive: {height}"
        )));
    }

    if radius_bottom < 0.0 || radius_top < 0.0 {
        return Err(MeshError::degenerate(format!(
            "Frustum radii must be non-negative: r1={radius_bottom}, r2={radius_top}"
        )));
    }

    if approx_zero(radius_bottom) && approx_zero(radius_top) {
        return Err(MeshError::degenerate(
            "Frustum must have at least one non-zero radius",
        ));
    }

    if segments < MIN_SEGMENTS {
        return Err(MeshError::degenerate(format!(
            "Frustum segments must be at least {MIN_SEGMENTS}: {segments}"
        )));
    }

    let mut mesh = Mesh::new();
    let z_bottom = base_center.z;
    let z_top = base_center.z + height;

    let bottom = ring(&mut mesh, base_center, z_bottom, radius_bottom, segments);
    let top = ring(&mut mesh, base_center, z_top, radius_top, segments);

    // Sides
    match (bottom.len(), top.len()) {
        (1, _) => {
            let apex = bottom[0];
            for j in 0..top.len() {
                let next = (j + 1) % top.len();
                mesh.add_triangle(apex, top[next], top[j]);
            }
        }
        (_, 1) => {
            let apex = top[0];
            for j in 0..bottom.len() {
                let next = (j + 1) % bottom.len();
                mesh.add_triangle(bottom[j], bottom[next], apex);
            }
        }
        _ => {
            for j in 0..bottom.len() {
                let next = (j + 1) % bottom.len();
                mesh.add_triangle(bottom[j], bottom[next], top[next]);
                mesh.add_triangle(bottom[j], top[next], top[j]);
            }
        }
    }

    // Caps, fanned from the first ring vertex
    if bottom.len() > 1 {
        for j in 1..bottom.len() - 1 {
            mesh.add_triangle(bottom[0], bottom[j + 1], bottom[j]);
        }
    }
    if top.len() > 1 {
        for j in 1..top.len() - 1 {
            mesh.add_triangle(top[0], top[j], top[j + 1]);
        }
    }

    Ok(mesh)
}

/// Adds a ring of vertices (or a single apex for radius 0).
fn ring(mesh: &mut Mesh, center: DVec3, z: f64, radius: f64, segments: u32) -> Vec<u32> {
    if approx_zero(radius) {
        return vec![mesh.add_vertex(DVec3::new(center.x, center.y, z))];
    }

    (0..segments)
        .map(|j| {
            let theta = 2.0 * PI * j as f64 / segments as f64;
            mesh.add_vertex(DVec3::new(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
                z,
            ))
        })
        .collect()
}
