//! Fresnel reflectance helpers.

/// Schlick's approximation `F0 + (1 - F0)(1 - cos)^5`.
pub fn schlick(f0: f32, cos_theta: f32) -> f32 {
    let m = (1.0 - cos_theta).clamp(0.0, 1.0);
    let m2 = m * m;
    f0 + (1.0 - f0) * m2 * m2 * m
}

/// Unpolarized dielectric Fresnel reflectance.
///
/// `eta_ratio` is the relative index entering the transmitted medium
/// (`1/eta` when entering, `eta` when exiting); `cos_theta_o` is the signed
/// cosine on the incident side. Returns 1 under total internal reflection.
pub fn fresnel_dielectric(cos_theta_o: f32, eta_ratio: f32) -> f32 {
    let abs_cos = cos_theta_o.abs();
    let sin2_theta_t = eta_ratio * eta_ratio * (1.0 - cos_theta_o * cos_theta_o);
    if sin2_theta_t >= 1.0 {
        return 1.0;
    }
    let cos_theta_t = (1.0 - sin2_theta_t).sqrt();

    // Parallel and perpendicular polarized amplitudes, averaged in power.
    let r_s = (eta_ratio * abs_cos - cos_theta_t) / (eta_ratio * abs_cos + cos_theta_t);
    let r_p = (abs_cos - eta_ratio * cos_theta_t) / (abs_cos + eta_ratio * cos_theta_t);
    0.5 * (r_s * r_s + r_p * r_p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schlick_limits() {
        assert!((schlick(0.04, 1.0) - 0.04).abs() < 1e-6);
        assert!((schlick(0.04, 0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fresnel_normal_incidence_glass() {
        // eta = 1.5: ((1 - 1.5)/(1 + 1.5))^2 = 0.04
        let f = fresnel_dielectric(1.0, 1.0 / 1.5);
        assert!((f - 0.04).abs() < 1e-3, "f = {f}");
    }

    #[test]
    fn test_fresnel_grazing_goes_to_one() {
        let f = fresnel_dielectric(1e-4, 1.0 / 1.5);
        assert!(f > 0.99, "f = {f}");
    }

    #[test]
    fn test_fresnel_tir() {
        // Exiting glass at a shallow angle: sin^2(theta_t) >= 1.
        let f = fresnel_dielectric(0.2, 1.5);
        assert_eq!(f, 1.0);
    }
}
