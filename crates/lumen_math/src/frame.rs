use crate::Vec3;

/// An orthonormal shading basis `(tangent, bitangent, normal)`.
///
/// Local shading coordinates put the surface normal on `+z`, so for a local
/// vector `v` the cosine of its polar angle is simply `v.z`.
#[derive(Debug, Copy, Clone)]
pub struct Frame {
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub normal: Vec3,
}

impl Frame {
    /// Build a frame from a unit normal alone.
    ///
    /// Uses the branchless listing of Duff et al. to pick a tangent that is
    /// numerically stable for every normal orientation.
    pub fn new(normal: Vec3) -> Self {
        let sign = if normal.z >= 0.0 { 1.0 } else { -1.0 };
        let a = -1.0 / (sign + normal.z);
        let b = normal.x * normal.y * a;

        let tangent = Vec3::new(
            1.0 + sign * normal.x * normal.x * a,
            sign * b,
            -sign * normal.x,
        );
        let bitangent = Vec3::new(b, sign + normal.y * normal.y * a, -normal.y);

        Self {
            tangent,
            bitangent,
            normal,
        }
    }

    /// Build a frame from a unit normal and a (possibly non-orthogonal)
    /// tangent hint, Gram-Schmidt orthonormalizing the tangent.
    ///
    /// Falls back to [`Frame::new`] when the hint is parallel to the normal.
    pub fn with_tangent(normal: Vec3, tangent: Vec3) -> Self {
        let t = tangent - normal * normal.dot(tangent);
        let len_sq = t.length_squared();
        if len_sq < 1e-10 {
            return Self::new(normal);
        }
        let tangent = t / len_sq.sqrt();
        Self {
            tangent,
            bitangent: normal.cross(tangent),
            normal,
        }
    }

    /// Transform a local-space vector into world space.
    #[inline]
    pub fn to_world(&self, v: Vec3) -> Vec3 {
        self.tangent * v.x + self.bitangent * v.y + self.normal * v.z
    }

    /// Transform a world-space vector into this frame's local space.
    #[inline]
    pub fn to_local(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            v.dot(self.tangent),
            v.dot(self.bitangent),
            v.dot(self.normal),
        )
    }
}

/// Cosine of the polar angle of a local-space vector.
#[inline]
pub fn cos_theta(v: Vec3) -> f32 {
    v.z
}

/// Absolute cosine of the polar angle of a local-space vector.
#[inline]
pub fn abs_cos_theta(v: Vec3) -> f32 {
    v.z.abs()
}

/// True if two local-space vectors lie on the same side of the surface.
#[inline]
pub fn same_hemisphere(a: Vec3, b: Vec3) -> bool {
    a.z * b.z > 0.0
}

/// Reflect `v` about the unit vector `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    2.0 * v.dot(n) * n - v
}
