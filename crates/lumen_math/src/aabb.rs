use crate::{Ray, Vec3, EPSILON};

/// Axis-aligned bounding box stored as its two corners.
///
/// Boxes bound BVH subtrees, so the operations here are the ones traversal
/// and construction need: merging, growing by a point, the split-axis
/// heuristics, and a ray overlap test over a `[t_min, t_max]` budget.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// A box containing nothing; growing it by any point yields that point.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// A box containing everything (unbounded volumes).
    pub const UNIVERSE: Aabb = Aabb {
        min: Vec3::NEG_INFINITY,
        max: Vec3::INFINITY,
    };

    /// The box spanned by two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
        .with_min_thickness()
    }

    /// The smallest box containing both inputs.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow the box to include a point.
    pub fn extend(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Extent along all three axes.
    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    /// Midpoint of the box, the primitive position used for BVH splits.
    pub fn centroid(&self) -> Vec3 {
        0.5 * (self.min + self.max)
    }

    /// Axis index (0..3) with the largest extent, the BVH split axis.
    pub fn longest_axis(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    /// True for boxes reaching infinity on any axis (unbounded volumes).
    pub fn is_unbounded(&self) -> bool {
        !(self.min.is_finite() && self.max.is_finite())
    }

    /// Does the ray pass through this box somewhere in `[t_min, t_max]`?
    ///
    /// Slab test over all three axes at once: per-axis entry and exit
    /// parameters, then the ray overlaps the box iff the latest entry lies
    /// before the earliest exit within the budget. A zero direction
    /// component yields infinite (or NaN) slab times, which the
    /// component-wise min/max discard.
    pub fn intersects_ray(&self, ray: &Ray, t_min: f32, t_max: f32) -> bool {
        let inv = ray.direction.recip();
        let t0 = (self.min - ray.origin) * inv;
        let t1 = (self.max - ray.origin) * inv;

        let entry = t0.min(t1);
        let exit = t0.max(t1);

        let near = entry.max_element().max(t_min);
        let far = exit.min_element().min(t_max);
        near < far
    }

    /// Guarantee every axis has extent of at least the intersection
    /// epsilon. Flat geometry (an axis-aligned quad) otherwise produces a
    /// degenerate slab whose entry and exit coincide, and
    /// [`Aabb::intersects_ray`] would report an empty overlap.
    fn with_min_thickness(mut self) -> Self {
        for axis in 0..3 {
            if self.max[axis] - self.min[axis] < EPSILON {
                self.min[axis] -= 0.5 * EPSILON;
                self.max[axis] += 0.5 * EPSILON;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_orders_corners() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 5.0), Vec3::new(0.0, 10.0, -5.0));
        assert_eq!(aabb.min, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(aabb.max, Vec3::new(10.0, 10.0, 5.0));
    }

    #[test]
    fn test_ray_overlap() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));

        // Toward the box, away from it, and offset past its side.
        let hit = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(aabb.intersects_ray(&hit, 0.0, 100.0));

        let away = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        assert!(!aabb.intersects_ray(&away, 0.0, 100.0));

        let offset = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Z);
        assert!(!aabb.intersects_ray(&offset, 0.0, 100.0));
    }

    #[test]
    fn test_ray_overlap_respects_budget() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, 4.0), Vec3::new(1.0, 1.0, 6.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);

        assert!(aabb.intersects_ray(&ray, 0.0, 100.0));
        // Budget ends before the box starts: a closer hit already exists.
        assert!(!aabb.intersects_ray(&ray, 0.0, 3.0));
    }

    #[test]
    fn test_flat_box_is_still_hittable() {
        // An axis-aligned quad's box has zero thickness in z before padding.
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);
        assert!(aabb.intersects_ray(&ray, 0.0, 100.0));
    }

    #[test]
    fn test_axis_parallel_ray_outside_slab_misses() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        // Parallel to z with x outside: zero direction components on x/y.
        let ray = Ray::new(Vec3::new(5.0, 0.0, -5.0), Vec3::Z);
        assert!(!aabb.intersects_ray(&ray, 0.0, 100.0));
    }

    #[test]
    fn test_union_and_extend_agree() {
        let a = Aabb::from_points(Vec3::ZERO, Vec3::splat(5.0));
        let b = Aabb::from_points(Vec3::splat(3.0), Vec3::splat(10.0));

        let merged = a.union(&b);
        assert_eq!(merged.min, Vec3::ZERO);
        assert_eq!(merged.max, Vec3::splat(10.0));

        let mut grown = Aabb::EMPTY;
        grown.extend(Vec3::ZERO);
        grown.extend(Vec3::splat(10.0));
        assert_eq!(grown.min, merged.min);
        assert_eq!(grown.max, merged.max);
    }

    #[test]
    fn test_centroid_and_longest_axis() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(2.0, 8.0, 4.0));
        assert_eq!(aabb.centroid(), Vec3::new(1.0, 4.0, 2.0));
        assert_eq!(aabb.longest_axis(), 1);
    }

    #[test]
    fn test_unbounded() {
        assert!(Aabb::UNIVERSE.is_unbounded());
        assert!(Aabb::EMPTY.is_unbounded());
        assert!(!Aabb::from_points(Vec3::ZERO, Vec3::ONE).is_unbounded());
    }
}
