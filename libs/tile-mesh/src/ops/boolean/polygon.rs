//! # Polygon for BSP Operations
//!
//! Convex polygon with plane and splitting support.

use glam::DVec3;

use super::plane::{Classification, Plane};

// =============================================================================
// SPLIT RESULT
// =============================================================================

/// Where a polygon ended up after splitting by a plane.
#[derive(Debug, Clone)]
pub enum Split {
    /// In the plane, facing the same way.
    CoplanarFront(Polygon),
    /// In the plane, facing the opposite way.
    CoplanarBack(Polygon),
    /// Entirely in front.
    Front(Polygon),
    /// Entirely behind.
    Back(Polygon),
    /// Cut in two; either half may vanish if it degenerates.
    Spanning {
        /// Part in front of the plane.
        front: Option<Polygon>,
        /// Part behind the plane.
        back: Option<Polygon>,
    },
}

// =============================================================================
// POLYGON
// =============================================================================

/// A convex polygon with associated plane.
#[derive(Debug, Clone)]
pub struct Polygon {
    /// Vertices in counter-clockwise order.
    vertices: Vec<DVec3>,
    /// Plane containing this polygon.
    plane: Plane,
}

impl Polygon {
    /// Create polygon from vertices.
    ///
    /// Returns None if vertices don't span a plane.
    pub fn from_vertices(vertices: Vec<DVec3>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }

        let plane = Plane::from_points(vertices[0], vertices[1], vertices[2])?;
        Some(Self { vertices, plane })
    }

    /// Polygon fragment that keeps the plane of its parent.
    fn fragment(vertices: Vec<DVec3>, plane: Plane) -> Option<Self> {
        (vertices.len() >= 3).then_some(Self { vertices, plane })
    }

    /// Get polygon vertices.
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Get polygon plane.
    pub fn plane(&self) -> Plane {
        self.plane
    }

    /// Flip the polygon (reverse winding order and plane).
    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }

    /// Split polygon by a plane of thickness `epsilon`.
    pub fn split(self, plane: &Plane, epsilon: f64) -> Split {
        let sides: Vec<Classification> = self
            .vertices
            .iter()
            .map(|v| plane.classify_point(*v, epsilon))
            .collect();

        let has_front = sides.contains(&Classification::Front);
        let has_back = sides.contains(&Classification::Back);

        match (has_front, has_back) {
            (false, false) => {
                if self.plane.normal().dot(plane.normal()) > 0.0 {
                    Split::CoplanarFront(self)
                } else {
                    Split::CoplanarBack(self)
                }
            }
            (true, false) => Split::Front(self),
            (false, true) => Split::Back(self),
            (true, true) => {
                let n = self.vertices.len();
                let mut front_verts = Vec::with_capacity(n + 1);
                let mut back_verts = Vec::with_capacity(n + 1);

                for i in 0..n {
                    let j = (i + 1) % n;
                    let (vi, vj) = (self.vertices[i], self.vertices[j]);
                    let (ti, tj) = (sides[i], sides[j]);

                    if ti != Classification::Back {
                        front_verts.push(vi);
                    }
                    if ti != Classification::Front {
                        back_verts.push(vi);
                    }

                    let crosses = matches!(
                        (ti, tj),
                        (Classification::Front, Classification::Back)
                            | (Classification::Back, Classification::Front)
                    );
                    if crosses {
                        let di = plane.signed_distance(vi);
                        let dj = plane.signed_distance(vj);
                        let point = vi.lerp(vj, di / (di - dj));
                        front_verts.push(point);
                        back_verts.push(point);
                    }
                }

                Split::Spanning {
                    front: Polygon::fragment(front_verts, self.plane),
                    back: Polygon::fragment(back_verts, self.plane),
                }
            }
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

    fn triangle_at(z: f64) -> Polygon {
        Polygon::from_vertices(vec![
            DVec3::new(0.0, 0.0, z),
            DVec3::new(1.0, 0.0, z),
            DVec3::new(0.5, 1.0, z),
        ])
        .unwrap()
    }

    #[test]
    fn test_polygon_from_too_few_vertices() {
        assert!(Polygon::from_vertices(vec![DVec3::ZERO, DVec3::X]).is_none());
    }

    #[test]
    fn test_polygon_flip() {
        let poly = triangle_at(0.0);
        let mut flipped = poly.clone();
        flipped.flip();

        assert_eq!(flipped.vertices()[0], poly.vertices()[2]);
        assert_eq!(flipped.plane().normal(), -poly.plane().normal());
    }

    #[test]
    fn test_polygon_split_front_back() {
        let plane = Plane::new(DVec3::Z, 0.0);
        assert!(matches!(triangle_at(1.0).split(&plane, EPS), Split::Front(_)));
        assert!(matches!(triangle_at(-1.0).split(&plane, EPS), Split::Back(_)));
    }

    #[test]
    fn test_polygon_split_coplanar() {
        let plane = Plane::new(DVec3::Z, 0.0);
        assert!(matches!(
            triangle_at(0.0).split(&plane, EPS),
            Split::CoplanarFront(_)
        ));

        let mut flipped = triangle_at(0.0);
        flipped.flip();
        assert!(matches!(flipped.split(&plane, EPS), Split::CoplanarBack(_)));
    }

    #[test]
    fn test_polygon_split_spanning() {
        // vertical triangle crossing z = 0
        let poly = Polygon::from_vertices(vec![
            DVec3::new(0.0, 0.0, -1.0),
            DVec3::new(1.0, 0.0, -1.0),
            DVec3::new(0.5, 0.0, 1.0),
        ])
        .unwrap();
        let plane = Plane::new(DVec3::Z, 0.0);

        match poly.split(&plane, EPS) {
            Split::Spanning {
                front: Some(front),
                back: Some(back),
            } => {
                assert_eq!(front.vertices().len(), 3);
                assert_eq!(back.vertices().len(), 4);
                assert!(front.vertices().iter().all(|v| v.z >= -EPS));
                assert!(back.vertices().iter().all(|v| v.z <= EPS));
                // fragments keep the parent's orientation
                assert_eq!(front.plane(), back.plane());
            }
            other => panic!("expected spanning split, got {other:?}"),
        }
    }
}
