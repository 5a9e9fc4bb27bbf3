use crate::Vec3;

/// A ray in 3D space with origin and direction.
///
/// The renderer assumes `direction` has unit length: intersection routines
/// interpret `t` as metric distance. Any code that scales a direction (for
/// example when moving a ray into an instance's local frame) must call
/// [`Ray::normalized`] before handing the ray back to the core.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// The point `origin + t * direction`; with a unit direction, `t` is
    /// the metric distance along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Return a copy of this ray with a unit-length direction.
    #[inline]
    pub fn normalized(&self) -> Self {
        Self {
            origin: self.origin,
            direction: self.direction.normalize(),
        }
    }
}
