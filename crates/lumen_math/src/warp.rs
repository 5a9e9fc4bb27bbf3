//! Warps from the unit square to useful sampling domains.
//!
//! Every warp consumes a uniform point in `[0, 1)^2` and returns a direction
//! together with (via the matching `*_pdf` function) the density it was drawn
//! from, measured with respect to solid angle.

use crate::{Vec2, Vec3};
use std::f32::consts::PI;

/// Warp a uniform square sample to a cosine-weighted direction on the
/// upper hemisphere (`z >= 0`). Density: `cos(theta) / pi`.
pub fn square_to_cosine_hemisphere(u: Vec2) -> Vec3 {
    // Clamping keeps the pdf strictly positive so callers can divide by it.
    let r2 = u.x.clamp(1e-6, 1.0);
    let cos_theta = r2.sqrt();
    let sin_theta = (1.0 - r2).sqrt();

    let phi = 2.0 * PI * u.y;
    let (sin_phi, cos_phi) = phi.sin_cos();

    Vec3::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}

/// Density of [`square_to_cosine_hemisphere`] for a local direction.
pub fn cosine_hemisphere_pdf(v: Vec3) -> f32 {
    (v.z / PI).max(0.0)
}

/// Warp a uniform square sample to a uniform direction on the unit sphere.
/// Density: `1 / (4 pi)`.
pub fn square_to_uniform_sphere(u: Vec2) -> Vec3 {
    let cos_theta = 1.0 - 2.0 * u.x;
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    let phi = 2.0 * PI * u.y;
    let (sin_phi, cos_phi) = phi.sin_cos();

    Vec3::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}

/// Density of [`square_to_uniform_sphere`].
pub fn uniform_sphere_pdf() -> f32 {
    1.0 / (4.0 * PI)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halton_like(i: u32) -> Vec2 {
        // Cheap low-discrepancy-ish sequence, good enough for smoke tests.
        let a = (i as f32 * 0.754877) % 1.0;
        let b = (i as f32 * 0.569840) % 1.0;
        Vec2::new(a, b)
    }

    #[test]
    fn test_cosine_hemisphere_unit_and_upper() {
        for i in 0..256 {
            let v = square_to_cosine_hemisphere(halton_like(i));
            assert!((v.length() - 1.0).abs() < 1e-4);
            assert!(v.z >= 0.0);
            assert!(cosine_hemisphere_pdf(v) > 0.0);
        }
    }

    #[test]
    fn test_uniform_sphere_unit_length() {
        for i in 0..256 {
            let v = square_to_uniform_sphere(halton_like(i));
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_uniform_sphere_covers_both_hemispheres() {
        let mut up = 0;
        let mut down = 0;
        for i in 0..512 {
            let v = square_to_uniform_sphere(halton_like(i));
            if v.z > 0.0 {
                up += 1;
            } else {
                down += 1;
            }
        }
        assert!(up > 100 && down > 100);
    }

    #[test]
    fn test_cosine_hemisphere_mean_matches_pdf() {
        // E[cos(theta)] under the cos/pi density is 2/3.
        let n = 4096;
        let mut sum = 0.0;
        for i in 0..n {
            sum += square_to_cosine_hemisphere(halton_like(i)).z;
        }
        let mean = sum / n as f32;
        assert!((mean - 2.0 / 3.0).abs() < 0.02, "mean = {mean}");
    }
}
