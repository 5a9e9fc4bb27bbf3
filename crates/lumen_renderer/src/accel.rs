//! Bounding Volume Hierarchy over indexed primitives.
//!
//! The tree stores primitive *indices*, never the primitives themselves;
//! callers supply an intersection closure at traversal time. The same
//! structure accelerates triangle lookups inside a mesh and instance lookups
//! inside the scene.

use lumen_math::{Aabb, Ray, EPSILON};

use crate::shape::Intersection;

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

enum Node {
    Branch {
        left: Box<Node>,
        right: Box<Node>,
        bbox: Aabb,
    },
    Leaf {
        indices: Vec<u32>,
        bbox: Aabb,
    },
    Empty,
}

/// Cached per-primitive data used while building.
#[derive(Clone, Copy)]
struct BuildPrimitive {
    index: u32,
    bbox: Aabb,
    centroid: lumen_math::Vec3,
}

/// A binary BVH built by median split along the widest centroid axis.
pub struct Bvh {
    root: Node,
}

impl Bvh {
    /// Build from per-primitive bounds; `bounds[i]` belongs to primitive `i`.
    pub fn build(bounds: &[Aabb]) -> Self {
        if bounds.is_empty() {
            return Self { root: Node::Empty };
        }

        let primitives: Vec<BuildPrimitive> = bounds
            .iter()
            .enumerate()
            .map(|(i, bbox)| BuildPrimitive {
                index: i as u32,
                bbox: *bbox,
                centroid: bbox.centroid(),
            })
            .collect();

        Self {
            root: Self::build_node(primitives),
        }
    }

    fn build_node(mut primitives: Vec<BuildPrimitive>) -> Node {
        let bounds = primitives
            .iter()
            .fold(Aabb::EMPTY, |acc, p| acc.union(&p.bbox));

        if primitives.len() <= LEAF_MAX_SIZE {
            return Node::Leaf {
                indices: primitives.iter().map(|p| p.index).collect(),
                bbox: bounds,
            };
        }

        // Split on the axis where centroids spread the most.
        let centroid_bounds = primitives.iter().fold(Aabb::EMPTY, |mut acc, p| {
            acc.extend(p.centroid);
            acc
        });
        let axis = centroid_bounds.longest_axis();

        primitives.sort_unstable_by(|a, b| {
            a.centroid[axis]
                .partial_cmp(&b.centroid[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let right = primitives.split_off(primitives.len() / 2);
        Node::Branch {
            left: Box::new(Self::build_node(primitives)),
            right: Box::new(Self::build_node(right)),
            bbox: bounds,
        }
    }

    /// The bounds of everything in the tree.
    pub fn bounding_box(&self) -> Aabb {
        match &self.root {
            Node::Empty => Aabb::EMPTY,
            Node::Leaf { bbox, .. } | Node::Branch { bbox, .. } => *bbox,
        }
    }

    /// Find the nearest accepted hit.
    ///
    /// `intersect_prim(i, ray, its)` must follow the shape contract: update
    /// `its` only for a closer hit with `t >= EPSILON` and report whether it
    /// did. The shrinking `its.t` budget prunes subtrees automatically.
    pub fn intersect<F>(&self, ray: &Ray, its: &mut Intersection, mut intersect_prim: F) -> bool
    where
        F: FnMut(usize, &Ray, &mut Intersection) -> bool,
    {
        Self::intersect_node(&self.root, ray, its, &mut intersect_prim)
    }

    fn intersect_node<F>(node: &Node, ray: &Ray, its: &mut Intersection, f: &mut F) -> bool
    where
        F: FnMut(usize, &Ray, &mut Intersection) -> bool,
    {
        its.stats.nodes_visited += 1;

        match node {
            Node::Empty => false,

            Node::Leaf { indices, bbox } => {
                if !bbox.intersects_ray(ray, EPSILON, its.t) {
                    return false;
                }

                let mut hit_anything = false;
                for &i in indices {
                    its.stats.primitive_tests += 1;
                    if f(i as usize, ray, its) {
                        hit_anything = true;
                    }
                }
                hit_anything
            }

            Node::Branch { left, right, bbox } => {
                if !bbox.intersects_ray(ray, EPSILON, its.t) {
                    return false;
                }

                // The left traversal shrinks its.t, tightening the right's
                // bbox test.
                let hit_left = Self::intersect_node(left, ray, its, f);
                let hit_right = Self::intersect_node(right, ray, its, f);
                hit_left || hit_right
            }
        }
    }
}
