//! Geometric primitives and the ray-intersection record.

mod mesh;
mod sphere;
mod volume;

pub use mesh::{TriangleMesh, Vertex};
pub use sphere::Sphere;
pub use volume::Volume;

use crate::Sampler;
use lumen_math::{Aabb, Frame, Ray, Vec2, Vec3};

/// Counters accumulated during acceleration-structure traversal,
/// visualized by the `bvh` AOV.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraversalStats {
    /// BVH nodes visited across all queries for this record.
    pub nodes_visited: u32,
    /// Primitive intersection tests performed.
    pub primitive_tests: u32,
}

/// Record of the closest accepted hit along a ray.
///
/// `t` starts at infinity for each query and only ever decreases as closer
/// hits are found; a record is valid once `t` is finite. Shapes must leave
/// the record untouched unless they found a closer hit with `t >= EPSILON`.
#[derive(Debug, Clone, Copy)]
pub struct Intersection {
    /// Distance along the (unit-direction) ray; infinity while invalid.
    pub t: f32,
    /// World-space hit position.
    pub position: Vec3,
    /// Normal of the underlying geometry, unit length.
    pub geometry_normal: Vec3,
    /// Interpolated shading normal, unit length.
    pub shading_normal: Vec3,
    /// Surface tangent, orthonormal to the shading normal.
    pub tangent: Vec3,
    /// Texture coordinates.
    pub uv: Vec2,
    /// Direction toward the viewer (world space, unit length).
    pub wo: Vec3,
    /// Area pdf of this point when produced by area sampling.
    pub pdf: f32,
    /// Index of the owning instance in the scene's instance array.
    pub instance: Option<usize>,
    /// Traversal counters for debug output.
    pub stats: TraversalStats,
}

impl Intersection {
    /// A fresh record with an infinite closest-hit budget.
    pub fn new() -> Self {
        Self {
            t: f32::INFINITY,
            position: Vec3::ZERO,
            geometry_normal: Vec3::Z,
            shading_normal: Vec3::Z,
            tangent: Vec3::X,
            uv: Vec2::ZERO,
            wo: Vec3::Z,
            pdf: 0.0,
            instance: None,
            stats: TraversalStats::default(),
        }
    }

    /// True once a hit has been recorded.
    pub fn is_valid(&self) -> bool {
        self.t.is_finite()
    }

    /// The orthonormal shading frame at the hit point.
    pub fn shading_frame(&self) -> Frame {
        Frame::with_tangent(self.shading_normal, self.tangent)
    }
}

impl Default for Intersection {
    fn default() -> Self {
        Self::new()
    }
}

/// A point sampled uniformly on a shape's surface.
#[derive(Debug, Clone, Copy)]
pub struct AreaSample {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    /// Density with respect to surface area.
    pub pdf: f32,
}

/// A geometric primitive in its local coordinate system.
pub trait Shape: Send + Sync {
    /// Intersect, updating `its` only on a closer hit with `t >= EPSILON`.
    fn intersect(&self, ray: &Ray, its: &mut Intersection, sampler: &mut Sampler) -> bool;

    /// Fraction of light surviving along `[0, t_max]` of the ray: 1 when
    /// unoccluded, 0 when surface-blocked, fractional inside media.
    ///
    /// The default treats the shape as an opaque occluder.
    fn transmittance(&self, ray: &Ray, t_max: f32, sampler: &mut Sampler) -> f32 {
        let mut its = Intersection::new();
        its.t = t_max;
        if self.intersect(ray, &mut its, sampler) {
            0.0
        } else {
            1.0
        }
    }

    /// Local-space bounds.
    fn bounding_box(&self) -> Aabb;

    /// Local-space centroid.
    fn centroid(&self) -> Vec3;

    /// Uniform surface sample, if the shape has a surface area.
    fn sample_area(&self, _sampler: &mut Sampler) -> Option<AreaSample> {
        None
    }

    /// Short identifier used in diagnostics.
    fn type_name(&self) -> &'static str {
        "shape"
    }
}
