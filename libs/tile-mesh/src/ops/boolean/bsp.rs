//! # BSP Tree
//!
//! Binary Space Partitioning tree for CSG boolean operations.
//! Based on the csg.js algorithm by Evan Wallace.
//!
//! ## Algorithm
//!
//! Each BSP node contains:
//! - A dividing plane
//! - Polygons coplanar with the plane
//! - Front subtree (polygons in front of plane)
//! - Back subtree (polygons behind plane)
//!
//! ## Stack Safety
//!
//! Tree depth follows the input, and terrain patches can produce deep trees.
//! Recursive operations run inside `stacker::maybe_grow`, which moves onto a
//! fresh heap-allocated stack segment when the red zone is reached. Drop is
//! iterative.

use config::constants::{STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES};

use super::plane::Plane;
use super::polygon::{Polygon, Split};

/// A node in the BSP tree.
///
/// A node without a plane is empty: it holds no polygons and no children.
#[derive(Debug)]
pub struct BspNode {
    /// Dividing plane, taken from the first polygon inserted.
    plane: Option<Plane>,
    /// Polygons coplanar with this node's plane
    polygons: Vec<Polygon>,
    /// Front subtree (polygons in front of plane)
    front: Option<Box<BspNode>>,
    /// Back subtree (polygons behind plane)
    back: Option<Box<BspNode>>,
    /// Plane thickness used for classification.
    epsilon: f64,
}

impl BspNode {
    /// Creates a new BSP tree from polygons.
    pub fn new(polygons: Vec<Polygon>, epsilon: f64) -> Self {
        let mut node = Self::empty(epsilon);
        node.build(polygons);
        node
    }

    fn empty(epsilon: f64) -> Self {
        Self {
            plane: None,
            polygons: Vec::new(),
            front: None,
            back: None,
            epsilon,
        }
    }

    /// Inserts polygons into the tree, splitting them along existing planes.
    pub fn build(&mut self, polygons: Vec<Polygon>) {
        stacker::maybe_grow(STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES, || {
            let Some(first) = polygons.first() else {
                return;
            };
            let plane = *self.plane.get_or_insert_with(|| first.plane());

            let estimated_size = polygons.len() / 2 + 1;
            let mut front_polys = Vec::with_capacity(estimated_size);
            let mut back_polys = Vec::with_capacity(estimated_size);

            for poly in polygons {
                match poly.split(&plane, self.epsilon) {
                    Split::CoplanarFront(p) | Split::CoplanarBack(p) => self.polygons.push(p),
                    Split::Front(p) => front_polys.push(p),
                    Split::Back(p) => back_polys.push(p),
                    Split::Spanning { front, back } => {
                        front_polys.extend(front);
                        back_polys.extend(back);
                    }
                }
            }

            let epsilon = self.epsilon;
            if !front_polys.is_empty() {
                self.front
                    .get_or_insert_with(|| Box::new(BspNode::empty(epsilon)))
                    .build(front_polys);
            }
            if !back_polys.is_empty() {
                self.back
                    .get_or_insert_with(|| Box::new(BspNode::empty(epsilon)))
                    .build(back_polys);
            }
        });
    }

    /// Converts solid space to empty space and empty space to solid space.
    pub fn invert(&mut self) {
        stacker::maybe_grow(STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES, || {
            for poly in &mut self.polygons {
                poly.flip();
            }
            if let Some(plane) = &mut self.plane {
                plane.flip();
            }
            if let Some(front) = &mut self.front {
                front.invert();
            }
            if let Some(back) = &mut self.back {
                back.invert();
            }
            std::mem::swap(&mut self.front, &mut self.back);
        });
    }

    /// Removes the parts of `polygons` that lie inside this tree's solid.
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        stacker::maybe_grow(STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES, || {
            let Some(plane) = self.plane else {
                return polygons;
            };

            let mut front_polys = Vec::new();
            let mut back_polys = Vec::new();

            for poly in polygons {
                match poly.split(&plane, self.epsilon) {
                    Split::CoplanarFront(p) | Split::Front(p) => front_polys.push(p),
                    Split::CoplanarBack(p) | Split::Back(p) => back_polys.push(p),
                    Split::Spanning { front, back } => {
                        front_polys.extend(front);
                        back_polys.extend(back);
                    }
                }
            }

            let mut result = match &self.front {
                Some(front) => front.clip_polygons(front_polys),
                None => front_polys,
            };
            // Behind a leaf plane is solid: those fragments are dropped.
            if let Some(back) = &self.back {
                result.extend(back.clip_polygons(back_polys));
            }
            result
        })
    }

    /// Removes every polygon of this tree that is inside `other`.
    pub fn clip_to(&mut self, other: &BspNode) {
        stacker::maybe_grow(STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES, || {
            let polygons = std::mem::take(&mut self.polygons);
            self.polygons = other.clip_polygons(polygons);
            if let Some(front) = &mut self.front {
                front.clip_to(other);
            }
            if let Some(back) = &mut self.back {
                back.clip_to(other);
            }
        });
    }

    /// Collects all polygons from this tree.
    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = Vec::new();
        let mut stack: Vec<&BspNode> = vec![self];

        while let Some(node) = stack.pop() {
            result.extend(node.polygons.iter().cloned());

            if let Some(front) = &node.front {
                stack.push(front.as_ref());
            }
            if let Some(back) = &node.back {
                stack.push(back.as_ref());
            }
        }

        result
    }

    /// Returns the depth of this tree.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(&BspNode, usize)> = vec![(self, 1)];

        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);

            if let Some(front) = &node.front {
                stack.push((front.as_ref(), depth + 1));
            }
            if let Some(back) = &node.back {
                stack.push((back.as_ref(), depth + 1));
            }
        }

        max_depth
    }
}

impl Drop for BspNode {
    fn drop(&mut self) {
        let mut stack = Vec::new();

        if let Some(front) = self.front.take() {
            stack.push(front);
        }
        if let Some(back) = self.back.take() {
            stack.push(back);
        }

        while let Some(mut node) = stack.pop() {
            // Detach children so dropping `node` does not recurse
            if let Some(front) = node.front.take() {
                stack.push(front);
            }
            if let Some(back) = node.back.take() {
                stack.push(back);
            }
        }
    }
}
