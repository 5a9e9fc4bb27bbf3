use std::sync::Arc;

use crate::bsdf::microfacet::{ggx_ndf, roughness_to_alpha, sample_ggx_vndf, smith_g1};
use crate::bsdf::{Bsdf, BsdfEval, BsdfSample};
use crate::Sampler;
use lumen_core::{Properties, PropertyResult, Texture};
use lumen_math::{cos_theta, reflect, same_hemisphere, Vec2, Vec3};

/// Angles closer to the horizon than this are treated as unscatterable.
const GRAZING_COS: f32 = 1e-4;

/// A rough metallic surface: GGX distribution with Smith shadowing,
/// sampled through the visible-normal distribution.
pub struct RoughConductor {
    reflectance: Arc<dyn Texture>,
    roughness: Arc<dyn Texture>,
}

impl RoughConductor {
    pub fn new(reflectance: Arc<dyn Texture>, roughness: Arc<dyn Texture>) -> Self {
        Self {
            reflectance,
            roughness,
        }
    }

    pub fn from_properties(properties: &Properties) -> PropertyResult<Self> {
        Ok(Self::new(
            properties.get_texture("reflectance")?,
            properties.get_texture("roughness")?,
        ))
    }
}

impl Bsdf for RoughConductor {
    fn evaluate(&self, uv: Vec2, wo: Vec3, wi: Vec3) -> BsdfEval {
        let alpha = roughness_to_alpha(self.roughness.scalar(uv));

        let cos_i = cos_theta(wi);
        let cos_o = cos_theta(wo);
        if !same_hemisphere(wo, wi) || cos_i.abs() <= GRAZING_COS || cos_o.abs() <= GRAZING_COS {
            return BsdfEval::invalid();
        }

        let h = (wo + wi).normalize();
        if cos_theta(h) <= 0.0 {
            return BsdfEval::invalid();
        }

        let d = ggx_ndf(alpha, h);
        let g = smith_g1(alpha, h, wi) * smith_g1(alpha, h, wo);

        // f * |cos_i| = reflectance * D G / (4 |cos_o|)
        let value = self.reflectance.evaluate(uv) * (d * g / (4.0 * cos_o.abs()));
        BsdfEval { value }
    }

    fn sample(&self, uv: Vec2, wo: Vec3, sampler: &mut Sampler) -> BsdfSample {
        let alpha = roughness_to_alpha(self.roughness.scalar(uv));

        if cos_theta(wo) <= GRAZING_COS {
            return BsdfSample::invalid();
        }

        let h = sample_ggx_vndf(alpha, wo, sampler.next_2d());
        let wi = reflect(wo, h);
        if !same_hemisphere(wo, wi) {
            return BsdfSample::invalid();
        }

        // VNDF sampling: everything cancels except the masking of wi.
        BsdfSample {
            wi,
            weight: self.reflectance.evaluate(uv) * smith_g1(alpha, h, wi),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Color, ConstantTexture};

    fn conductor(roughness: f32) -> RoughConductor {
        RoughConductor::new(
            Arc::new(ConstantTexture::new(Color::ONE)),
            Arc::new(ConstantTexture::scalar_value(roughness)),
        )
    }

    #[test]
    fn test_grazing_evaluation_is_invalid() {
        let bsdf = conductor(0.3);
        let wo = Vec3::new(1.0, 0.0, 5e-5).normalize();
        let wi = Vec3::new(-1.0, 0.0, 5e-5).normalize();
        assert!(bsdf.evaluate(Vec2::ZERO, wo, wi).is_invalid());
    }

    #[test]
    fn test_opposite_hemispheres_invalid() {
        let bsdf = conductor(0.3);
        assert!(bsdf
            .evaluate(Vec2::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, -1.0))
            .is_invalid());
    }

    #[test]
    fn test_samples_are_unit_reflections() {
        let bsdf = conductor(0.2);
        let mut sampler = Sampler::seeded(42);
        let wo = Vec3::new(0.3, -0.1, 0.95).normalize();

        for _ in 0..1000 {
            let s = bsdf.sample(Vec2::ZERO, wo, &mut sampler);
            if s.is_invalid() {
                continue;
            }
            assert!((s.wi.length() - 1.0).abs() < 1e-4);
            assert!(same_hemisphere(wo, s.wi));
        }
    }

    #[test]
    fn test_near_mirror_sampling_matches_reflection() {
        // Tiny roughness: sampled directions collapse onto the mirror ray.
        let bsdf = conductor(0.0);
        let mut sampler = Sampler::seeded(9);
        let wo = Vec3::new(0.5, 0.0, (1.0f32 - 0.25).sqrt());
        let mirror = reflect(wo, Vec3::Z);

        for _ in 0..100 {
            let s = bsdf.sample(Vec2::ZERO, wo, &mut sampler);
            assert!(!s.is_invalid());
            assert!(s.wi.dot(mirror) > 0.999);
        }
    }

    #[test]
    fn test_energy_bounded_by_reflectance() {
        let bsdf = conductor(0.4);
        let mut sampler = Sampler::seeded(11);
        for _ in 0..1000 {
            let s = bsdf.sample(Vec2::ZERO, Vec3::Z, &mut sampler);
            // weight = reflectance * G1 <= reflectance
            assert!(s.weight.x <= 1.0 + 1e-4);
        }
    }
}
