//! # Plane for BSP Operations
//!
//! Plane representation with point classification.

use glam::DVec3;

/// Cross-product length under which three points are treated as collinear.
const DEGENERATE_CROSS: f64 = 1e-18;

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Classification of a point relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Point is in front of plane (positive side).
    Front,
    /// Point is behind plane (negative side).
    Back,
    /// Point is within the plane's thickness.
    Coplanar,
}

// =============================================================================
// PLANE
// =============================================================================

/// A plane in 3D space defined by unit normal and distance from origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (unit length).
    normal: DVec3,
    /// Distance from origin along normal.
    w: f64,
}

impl Plane {
    /// Create plane from a unit normal and distance.
    pub fn new(normal: DVec3, w: f64) -> Self {
        Self { normal, w }
    }

    /// Create plane from three points, counter-clockwise seen from the front.
    ///
    /// Returns `None` for collinear points.
    pub fn from_points(a: DVec3, b: DVec3, c: DVec3) -> Option<Self> {
        let cross = (b - a).cross(c - a);
        let length = cross.length();
        if !(length > DEGENERATE_CROSS) {
            return None;
        }

        let normal = cross / length;
        Some(Self {
            normal,
            w: normal.dot(a),
        })
    }

    /// Get the plane normal.
    #[inline]
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    /// Flip the plane (reverse normal).
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Signed distance from point to plane.
    ///
    /// Positive = front, negative = back, zero = on plane.
    #[inline]
    pub fn signed_distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) - self.w
    }

    /// Classify a point relative to this plane with thickness `epsilon`.
    pub fn classify_point(&self, point: DVec3, epsilon: f64) -> Classification {
        let dist = self.signed_distance(point);
        if dist > epsilon {
            Classification::Front
        } else if dist < -epsilon {
            Classification::Back
        } else {
            Classification::Coplanar
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-7;

    #[test]
    fn test_plane_from_points() {
        let plane = Plane::from_points(DVec3::ZERO, DVec3::X, DVec3::Y).unwrap();
        assert!((plane.normal().z - 1.0).abs() < EPS);
        assert!(plane.normal().x.abs() < EPS);
    }

    #[test]
    fn test_plane_from_collinear_points() {
        assert!(Plane::from_points(DVec3::ZERO, DVec3::X, DVec3::X * 2.0).is_none());
    }

    #[test]
    fn test_plane_small_triangle_is_valid() {
        // sub-millimeter triangle in meter units
        let plane = Plane::from_points(DVec3::ZERO, DVec3::X * 1e-5, DVec3::Y * 1e-5);
        assert!(plane.is_some());
    }

    #[test]
    fn test_plane_classify_point() {
        let plane = Plane::new(DVec3::Z, 0.0);
        assert_eq!(plane.classify_point(DVec3::Z, EPS), Classification::Front);
        assert_eq!(plane.classify_point(-DVec3::Z, EPS), Classification::Back);
        assert_eq!(
            plane.classify_point(DVec3::new(1.0, 1.0, EPS / 2.0), EPS),
            Classification::Coplanar
        );
    }

    #[test]
    fn test_plane_flip() {
        let mut plane = Plane::new(DVec3::Z, 5.0);
        plane.flip();
        assert_eq!(plane.normal(), -DVec3::Z);
        assert_eq!(plane.signed_distance(DVec3::new(0.0, 0.0, 5.0)), 0.0);
        assert!(plane.signed_distance(DVec3::ZERO) > 0.0);
    }
}
