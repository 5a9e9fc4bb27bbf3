use crate::{Aabb, Mat4, Ray, Vec3, Vec4};

/// An invertible affine transform with its inverse precomputed.
///
/// Instances apply transforms on every ray, so the inverse is paid for once
/// at construction rather than per query. Points, vectors and normals each
/// transform by a different rule; normals use the inverse-transpose so they
/// stay perpendicular under non-uniform scale.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    matrix: Mat4,
    inverse: Mat4,
}

impl Transform {
    /// Wrap a matrix, computing its inverse once.
    pub fn new(matrix: Mat4) -> Self {
        Self {
            matrix,
            inverse: matrix.inverse(),
        }
    }

    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
            inverse: Mat4::IDENTITY,
        }
    }

    /// The underlying local-to-world matrix.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Transform a point from local to world space.
    #[inline]
    pub fn apply_point(&self, p: Vec3) -> Vec3 {
        self.matrix.transform_point3(p)
    }

    /// Transform a direction from local to world space (no translation).
    #[inline]
    pub fn apply_vector(&self, v: Vec3) -> Vec3 {
        let t = self.matrix * Vec4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(t.x, t.y, t.z)
    }

    /// Transform a surface normal from local to world space.
    ///
    /// Normals transform by the inverse-transpose of the matrix. The result
    /// is not normalized; callers re-normalize when unit length matters.
    #[inline]
    pub fn apply_normal(&self, n: Vec3) -> Vec3 {
        let t = self.inverse.transpose() * Vec4::new(n.x, n.y, n.z, 0.0);
        Vec3::new(t.x, t.y, t.z)
    }

    /// Transform a point from world to local space.
    #[inline]
    pub fn inverse_point(&self, p: Vec3) -> Vec3 {
        self.inverse.transform_point3(p)
    }

    /// Transform a direction from world to local space (no translation).
    #[inline]
    pub fn inverse_vector(&self, v: Vec3) -> Vec3 {
        let t = self.inverse * Vec4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(t.x, t.y, t.z)
    }

    /// Transform a world ray into local space. The direction is NOT
    /// re-normalized; its length carries the world-to-local scale so callers
    /// can convert distance budgets.
    #[inline]
    pub fn inverse_ray(&self, ray: &Ray) -> Ray {
        Ray::new(self.inverse_point(ray.origin), self.inverse_vector(ray.direction))
    }

    /// Transform an axis-aligned bounding box by walking all 8 corners.
    pub fn apply_aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_unbounded() {
            return Aabb::UNIVERSE;
        }

        let mut lo = Vec3::INFINITY;
        let mut hi = Vec3::NEG_INFINITY;
        for corner in 0..8 {
            let p = self.apply_point(Vec3::new(
                if corner & 1 != 0 { aabb.max.x } else { aabb.min.x },
                if corner & 2 != 0 { aabb.max.y } else { aabb.min.y },
                if corner & 4 != 0 { aabb.max.z } else { aabb.min.z },
            ));
            lo = lo.min(p);
            hi = hi.max(p);
        }
        // Rebuilding from points restores the minimum slab thickness a
        // rotation can squeeze away.
        Aabb::from_points(lo, hi)
    }
}
