//! Isotropic GGX microfacet distribution with Smith shadowing.
//!
//! `alpha` is the distribution width; perceptual roughness maps onto it as
//! `alpha = max(1e-3, roughness^2)`.

use lumen_math::{Vec2, Vec3};
use std::f32::consts::PI;

/// Map perceptual roughness to the GGX width, clamped away from zero.
#[inline]
pub fn roughness_to_alpha(roughness: f32) -> f32 {
    (roughness * roughness).max(1e-3)
}

/// GGX normal distribution `D(h)` for a local half-vector.
pub fn ggx_ndf(alpha: f32, h: Vec3) -> f32 {
    if h.z <= 1e-10 {
        return 0.0;
    }
    let a2 = alpha * alpha;
    let k = (h.x * h.x + h.y * h.y) / a2 + h.z * h.z;
    1.0 / (PI * a2 * k * k)
}

/// Smith `G1` masking term for one direction against a half-vector.
///
/// Zero when `w` lies on the far side of the microfacet (backfacing).
pub fn smith_g1(alpha: f32, h: Vec3, w: Vec3) -> f32 {
    if w.dot(h) * w.z <= 0.0 {
        return 0.0;
    }
    if w.z.abs() < 1e-10 {
        return 0.0;
    }
    let a2 = alpha * alpha;
    let tan2 = (w.x * w.x + w.y * w.y) / (w.z * w.z);
    2.0 / (1.0 + (1.0 + a2 * tan2).sqrt())
}

/// Sample a half-vector from the distribution of visible normals.
///
/// Heitz's 2018 construction: stretch `wo` into the hemisphere
/// configuration, sample a projected disk, unstretch. Sampling only facets
/// visible from `wo` makes the standard VNDF estimator weight collapse to
/// `reflectance * G1(wi, h)`.
pub fn sample_ggx_vndf(alpha: f32, wo: Vec3, u: Vec2) -> Vec3 {
    // Stretched view direction.
    let vh = Vec3::new(alpha * wo.x, alpha * wo.y, wo.z).normalize();

    // Orthonormal basis around vh; degenerate at the pole.
    let len_sq = vh.x * vh.x + vh.y * vh.y;
    let t1 = if len_sq > 1e-10 {
        Vec3::new(-vh.y, vh.x, 0.0) / len_sq.sqrt()
    } else {
        Vec3::X
    };
    let t2 = vh.cross(t1);

    // Sample the projected disk, warped toward the visible half.
    let r = u.x.sqrt();
    let phi = 2.0 * PI * u.y;
    let p1 = r * phi.cos();
    let mut p2 = r * phi.sin();
    let s = 0.5 * (1.0 + vh.z);
    p2 = (1.0 - s) * (1.0 - p1 * p1).max(0.0).sqrt() + s * p2;

    // Project back onto the hemisphere and unstretch.
    let p3 = (1.0 - p1 * p1 - p2 * p2).max(0.0).sqrt();
    let nh = p1 * t1 + p2 * t2 + p3 * vh;

    Vec3::new(alpha * nh.x, alpha * nh.y, nh.z.max(0.0)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sampler;

    #[test]
    fn test_roughness_remap_clamps() {
        assert_eq!(roughness_to_alpha(0.0), 1e-3);
        assert!((roughness_to_alpha(0.5) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_ndf_peaks_at_normal() {
        let alpha = 0.1;
        let at_normal = ggx_ndf(alpha, Vec3::Z);
        let tilted = ggx_ndf(alpha, Vec3::new(0.3, 0.0, 0.954).normalize());
        assert!(at_normal > tilted);
        assert_eq!(ggx_ndf(alpha, Vec3::new(0.0, 0.0, -1.0)), 0.0);
    }

    #[test]
    fn test_smith_g1_bounds() {
        let alpha = 0.3;
        let h = Vec3::Z;
        for wz in [0.1f32, 0.5, 0.9, 1.0] {
            let w = Vec3::new((1.0 - wz * wz).sqrt(), 0.0, wz);
            let g = smith_g1(alpha, h, w);
            assert!((0.0..=1.0).contains(&g), "g = {g}");
        }
        // Backfacing direction masks out entirely.
        assert_eq!(smith_g1(alpha, h, Vec3::new(0.0, 0.0, -1.0)), 0.0);
    }

    #[test]
    fn test_smith_g1_smooth_limit() {
        // As alpha -> 0 the surface is smooth and nothing is shadowed.
        let g = smith_g1(1e-4, Vec3::Z, Vec3::new(0.6, 0.0, 0.8));
        assert!(g > 0.999);
    }

    #[test]
    fn test_vndf_samples_are_unit_and_visible() {
        let mut sampler = Sampler::seeded(42);
        let wo = Vec3::new(0.4, -0.2, 0.89).normalize();
        for _ in 0..1000 {
            let h = sample_ggx_vndf(0.2, wo, sampler.next_2d());
            assert!((h.length() - 1.0).abs() < 1e-4);
            assert!(h.z >= 0.0);
            // Visible-normal sampling never draws facets backfacing to wo.
            assert!(wo.dot(h) >= 0.0);
        }
    }

    #[test]
    fn test_vndf_tightens_with_small_alpha() {
        let mut sampler = Sampler::seeded(3);
        let wo = Vec3::new(0.0, 0.0, 1.0);
        let mut min_z: f32 = 1.0;
        for _ in 0..1000 {
            let h = sample_ggx_vndf(1e-3, wo, sampler.next_2d());
            min_z = min_z.min(h.z);
        }
        // Near-mirror roughness keeps all half-vectors close to the normal.
        assert!(min_z > 0.9, "min_z = {min_z}");
    }
}
