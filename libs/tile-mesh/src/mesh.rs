//! # Mesh Data Structure
//!
//! Core mesh representation: f64 vertex positions and triangle indices.

use std::collections::{HashMap, VecDeque};

use config::constants::VERTEX_MERGE_EPSILON;
use glam::DVec3;

/// A triangle mesh with vertices and indices.
///
/// All geometry calculations use f64. Conversion to f32 only happens when
/// writing STL files.
///
/// # Example
///
/// ```rust
/// use tile_mesh::Mesh;
/// use glam::DVec3;
///
/// let mut mesh = Mesh::new();
/// mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
/// mesh.add_triangle(0, 1, 2);
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions (f64 for precision)
    vertices: Vec<DVec3>,
    /// Triangle indices, counter-clockwise seen from outside
    triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Builds an unshared mesh from a triangle soup (three vertices per face).
    pub fn from_triangles<I>(triangles: I) -> Self
    where
        I: IntoIterator<Item = [DVec3; 3]>,
    {
        let mut mesh = Mesh::new();
        for [a, b, c] in triangles {
            let i0 = mesh.add_vertex(a);
            let i1 = mesh.add_vertex(b);
            let i2 = mesh.add_vertex(c);
            mesh.add_triangle(i0, i1, i2);
        }
        mesh
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    /// Adds a triangle by vertex indices.
    pub fn add_triangle(&mut self, v0: u32, v1: u32, v2: u32) {
        self.triangles.push([v0, v1, v2]);
    }

    /// Returns a reference to the vertices.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Returns a reference to the triangles.
    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Returns the vertex at the given index.
    #[inline]
    pub fn vertex(&self, index: u32) -> DVec3 {
        self.vertices[index as usize]
    }

    /// Returns the three corner positions of a triangle.
    #[inline]
    pub fn triangle_positions(&self, index: usize) -> [DVec3; 3] {
        let [a, b, c] = self.triangles[index];
        [self.vertex(a), self.vertex(b), self.vertex(c)]
    }

    /// Iterates over the corner positions of every triangle.
    pub fn iter_triangles(&self) -> impl Iterator<Item = [DVec3; 3]> + '_ {
        (0..self.triangles.len()).map(|i| self.triangle_positions(i))
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns (min, max) corners, or `None` for a mesh without vertices.
    pub fn bounding_box(&self) -> Option<(DVec3, DVec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices[1..]
                .iter()
                .fold((first, first), |(min, max), v| (min.min(*v), max.max(*v))),
        )
    }

    /// Translates the mesh by a vector.
    pub fn translate(&mut self, offset: DVec3) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Merges another mesh into this one.
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]),
        );
    }

    /// Keeps only the triangles whose bounding box overlaps `[min, max]`.
    ///
    /// Used to hand a boolean kernel the part of a large surface that can
    /// actually touch a small solid. Unused vertices are dropped.
    pub fn crop_to_bounds(&self, min: DVec3, max: DVec3) -> Mesh {
        let mut remap: HashMap<u32, u32> = HashMap::new();
        let mut cropped = Mesh::new();

        for (i, tri) in self.triangles.iter().enumerate() {
            let [a, b, c] = self.triangle_positions(i);
            let tri_min = a.min(b).min(c);
            let tri_max = a.max(b).max(c);
            let overlaps = tri_min.cmple(max).all() && tri_max.cmpge(min).all();
            if !overlaps {
                continue;
            }

            let mut indices = [0u32; 3];
            for (slot, &old) in indices.iter_mut().zip(tri) {
                *slot = *remap
                    .entry(old)
                    .or_insert_with(|| cropped.add_vertex(self.vertices[old as usize]));
            }
            cropped.add_triangle(indices[0], indices[1], indices[2]);
        }

        cropped
    }

    /// Merges vertices closer than `distance` and drops collapsed triangles.
    ///
    /// Vertices are visited in order; each one joins the first kept vertex
    /// within `distance` or becomes a kept vertex itself. Candidates come
    /// from a spatial hash of cell size `distance`, searched over the 3x3x3
    /// neighbourhood.
    pub fn weld(&self, distance: f64) -> Mesh {
        let mut cells: HashMap<[i64; 3], Vec<u32>> = HashMap::new();
        let mut remap = Vec::with_capacity(self.vertices.len());
        let mut welded = Mesh::with_capacity(self.vertices.len(), self.triangles.len());
        let limit = distance * distance;

        for v in &self.vertices {
            let cell = (*v / distance).floor();
            let key = [cell.x as i64, cell.y as i64, cell.z as i64];

            let mut found = None;
            'search: for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let neighbour = [key[0] + dx, key[1] + dy, key[2] + dz];
                        let Some(candidates) = cells.get(&neighbour) else {
                            continue;
                        };
                        for &kept in candidates {
                            if welded.vertex(kept).distance_squared(*v) <= limit {
                                found = Some(kept);
                                break 'search;
                            }
                        }
                    }
                }
            }

            let index = match found {
                Some(kept) => kept,
                None => {
                    let kept = welded.add_vertex(*v);
                    cells.entry(key).or_default().push(kept);
                    kept
                }
            };
            remap.push(index);
        }

        for tri in &self.triangles {
            let [a, b, c] = tri.map(|i| remap[i as usize]);
            if a != b && b != c && a != c {
                welded.add_triangle(a, b, c);
            }
        }

        welded
    }

    /// Reverses the winding of every triangle.
    pub fn flip_normals(&mut self) {
        for tri in &mut self.triangles {
            tri.swap(1, 2);
        }
    }

    /// Signed volume enclosed by the mesh, positive for outward winding.
    ///
    /// Only meaningful for closed meshes.
    pub fn signed_volume(&self) -> f64 {
        self.iter_triangles()
            .map(|[a, b, c]| a.dot(b.cross(c)) / 6.0)
            .sum()
    }

    /// Makes the winding consistent across shared edges and turns every
    /// connected patch outward.
    ///
    /// A closed patch faces outward when its signed volume is positive. An
    /// open patch, like a ground surface, faces outward when its area
    /// weighted normal points up. Returns the number of triangles flipped.
    pub fn orient_consistently(&mut self) -> usize {
        let count = self.triangles.len();
        let mut edge_faces: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
        for (face, tri) in self.triangles.iter().enumerate() {
            for (a, b) in directed_edges(*tri) {
                edge_faces.entry((a.min(b), a.max(b))).or_default().push(face);
            }
        }

        let mut flipped = vec![false; count];
        let mut visited = vec![false; count];

        for seed in 0..count {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;
            let mut patch = vec![seed];
            let mut queue = VecDeque::from([seed]);
            let mut closed = true;

            while let Some(face) = queue.pop_front() {
                let tri = oriented(self.triangles[face], flipped[face]);
                for (a, b) in directed_edges(tri) {
                    let Some(neighbours) = edge_faces.get(&(a.min(b), a.max(b))) else {
                        continue;
                    };
                    closed &= neighbours.len() == 2;
                    for &other in neighbours {
                        if visited[other] {
                            continue;
                        }
                        visited[other] = true;
                        // a consistent neighbour walks the shared edge as b -> a
                        flipped[other] = directed_edges(self.triangles[other]).contains(&(a, b));
                        patch.push(other);
                        queue.push_back(other);
                    }
                }
            }

            let outward = if closed {
                patch
                    .iter()
                    .map(|&f| {
                        let [a, b, c] = oriented(self.triangles[f], flipped[f])
                            .map(|i| self.vertices[i as usize]);
                        a.dot(b.cross(c))
                    })
                    .sum::<f64>()
                    >= 0.0
            } else {
                patch
                    .iter()
                    .map(|&f| {
                        let [a, b, c] = oriented(self.triangles[f], flipped[f])
                            .map(|i| self.vertices[i as usize]);
                        (b - a).cross(c - a).z
                    })
                    .sum::<f64>()
                    >= 0.0
            };
            if !outward {
                for &f in &patch {
                    flipped[f] = !flipped[f];
                }
            }
        }

        let mut changed = 0;
        for (tri, flip) in self.triangles.iter_mut().zip(flipped) {
            if flip {
                tri.swap(1, 2);
                changed += 1;
            }
        }
        changed
    }

    /// Validates the mesh for correctness.
    ///
    /// Checks:
    /// - All triangle indices are valid
    /// - No triangle repeats a vertex
    /// - No zero-area triangles
    /// - All coordinates are finite
    pub fn validate(&self) -> bool {
        let vertex_count = self.vertices.len() as u32;

        if !self.vertices.iter().all(|v| v.is_finite()) {
            return false;
        }

        self.triangles.iter().all(|tri| {
            if tri.iter().any(|&i| i >= vertex_count) {
                return false;
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                return false;
            }
            let [v0, v1, v2] = tri.map(|i| self.vertices[i as usize]);
            (v1 - v0).cross(v2 - v0).length() >= VERTEX_MERGE_EPSILON * VERTEX_MERGE_EPSILON
        })
    }
}

fn directed_edges([a, b, c]: [u32; 3]) -> [(u32, u32); 3] {
    [(a, b), (b, c), (c, a)]
}

fn oriented(tri: [u32; 3], flip: bool) -> [u32; 3] {
    if flip {
        [tri[0], tri[2], tri[1]]
    } else {
        tri
    }
}
