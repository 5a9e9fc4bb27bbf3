use std::sync::Arc;

use crate::bsdf::fresnel::fresnel_dielectric;
use crate::bsdf::{Bsdf, BsdfEval, BsdfSample};
use crate::Sampler;
use lumen_core::{Properties, PropertyResult, Texture};
use lumen_math::{cos_theta, reflect, Vec2, Vec3};

/// Smooth dielectric interface (glass): perfect reflection and refraction,
/// chosen by Russian roulette on the Fresnel term.
pub struct Dielectric {
    ior: Arc<dyn Texture>,
    reflectance: Arc<dyn Texture>,
    transmittance: Arc<dyn Texture>,
}

impl Dielectric {
    pub fn new(
        ior: Arc<dyn Texture>,
        reflectance: Arc<dyn Texture>,
        transmittance: Arc<dyn Texture>,
    ) -> Self {
        Self {
            ior,
            reflectance,
            transmittance,
        }
    }

    pub fn from_properties(properties: &Properties) -> PropertyResult<Self> {
        Ok(Self::new(
            properties.get_texture("ior")?,
            properties.get_texture("reflectance")?,
            properties.get_texture("transmittance")?,
        ))
    }
}

impl Bsdf for Dielectric {
    fn evaluate(&self, _uv: Vec2, _wo: Vec3, _wi: Vec3) -> BsdfEval {
        // The probability of a light sample hitting exactly the reflected or
        // refracted delta direction is zero.
        BsdfEval::invalid()
    }

    fn sample(&self, uv: Vec2, wo: Vec3, sampler: &mut Sampler) -> BsdfSample {
        let eta = self.ior.scalar(uv).max(1e-5);

        let cos_o = cos_theta(wo);
        let entering = cos_o > 0.0;
        let eta_ratio = if entering { 1.0 / eta } else { eta };

        // 1 under total internal reflection, so the roulette below always
        // takes the reflection branch there.
        let fresnel = fresnel_dielectric(cos_o, eta_ratio);

        if sampler.next() < fresnel {
            // Reflection. The Fresnel term cancels against the branch
            // probability and the cosine against the pdf.
            BsdfSample {
                wi: reflect(wo, Vec3::Z),
                weight: self.reflectance.evaluate(uv),
            }
        } else {
            // Refraction, with the eta^2 radiance compression across the
            // interface. This branch is unreachable under TIR, so the
            // transmitted cosine is well defined.
            let sin2_theta_t = eta_ratio * eta_ratio * (1.0 - cos_o * cos_o);
            let cos_theta_t = (1.0 - sin2_theta_t).sqrt();

            let sign = if entering { 1.0 } else { -1.0 };
            let wi = Vec3::new(
                -eta_ratio * wo.x,
                -eta_ratio * wo.y,
                -sign * cos_theta_t,
            );
            BsdfSample {
                wi,
                weight: self.transmittance.evaluate(uv) * (eta_ratio * eta_ratio),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Color, ConstantTexture};

    fn glass(eta: f32) -> Dielectric {
        Dielectric::new(
            Arc::new(ConstantTexture::scalar_value(eta)),
            Arc::new(ConstantTexture::new(Color::ONE)),
            Arc::new(ConstantTexture::new(Color::ONE)),
        )
    }

    #[test]
    fn test_evaluate_is_always_invalid() {
        let bsdf = glass(1.5);
        assert!(bsdf
            .evaluate(Vec2::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, -1.0))
            .is_invalid());
    }

    #[test]
    fn test_tir_always_reflects() {
        let bsdf = glass(1.5);
        let mut sampler = Sampler::seeded(42);

        // Exiting glass beyond the critical angle: cos below
        // sqrt(1 - 1/eta^2) ~ 0.745.
        let wo = Vec3::new(0.8, 0.0, -0.6).normalize();
        for _ in 0..200 {
            let s = bsdf.sample(Vec2::ZERO, wo, &mut sampler);
            assert!(!s.is_invalid());
            // Reflection stays on wo's side.
            assert!(s.wi.z < 0.0);
            assert_eq!(s.weight, Color::ONE);
        }
    }

    #[test]
    fn test_refracted_direction_obeys_snell() {
        let bsdf = glass(1.5);
        let mut sampler = Sampler::seeded(1);
        let wo = Vec3::new(0.5, 0.0, (1.0f32 - 0.25).sqrt());

        let mut saw_refraction = false;
        for _ in 0..500 {
            let s = bsdf.sample(Vec2::ZERO, wo, &mut sampler);
            if s.wi.z < 0.0 {
                saw_refraction = true;
                let sin_i = wo.x;
                let sin_t = (s.wi.x * s.wi.x + s.wi.y * s.wi.y).sqrt();
                assert!((sin_t - sin_i / 1.5).abs() < 1e-3);
                assert!((s.wi.length() - 1.0).abs() < 1e-3);
            }
        }
        assert!(saw_refraction);
    }

    #[test]
    fn test_reflection_fraction_matches_fresnel_at_normal_incidence() {
        let bsdf = glass(1.5);
        let mut sampler = Sampler::seeded(5);

        let n = 50_000;
        let mut reflected = 0u32;
        for _ in 0..n {
            let s = bsdf.sample(Vec2::ZERO, Vec3::Z, &mut sampler);
            if s.wi.z > 0.0 {
                reflected += 1;
            }
        }
        let fraction = reflected as f32 / n as f32;
        // F(0 deg) for eta 1.5 is 0.04.
        assert!((fraction - 0.04).abs() < 0.005, "fraction = {fraction}");
    }
}
