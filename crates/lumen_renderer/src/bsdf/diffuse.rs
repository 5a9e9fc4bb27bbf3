use std::f32::consts::PI;
use std::sync::Arc;

use crate::bsdf::{Bsdf, BsdfEval, BsdfSample};
use crate::Sampler;
use lumen_core::{Properties, PropertyResult, Texture};
use lumen_math::warp::square_to_cosine_hemisphere;
use lumen_math::{abs_cos_theta, cos_theta, same_hemisphere, Vec2, Vec3};

/// Ideal diffuse (Lambertian) reflection, `f = albedo / pi`.
pub struct Diffuse {
    albedo: Arc<dyn Texture>,
}

impl Diffuse {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    pub fn from_properties(properties: &Properties) -> PropertyResult<Self> {
        Ok(Self::new(properties.get_texture("albedo")?))
    }
}

impl Bsdf for Diffuse {
    fn evaluate(&self, uv: Vec2, wo: Vec3, wi: Vec3) -> BsdfEval {
        if !same_hemisphere(wo, wi) {
            return BsdfEval::invalid();
        }

        let albedo = self.albedo.evaluate(uv);
        BsdfEval {
            value: albedo * (abs_cos_theta(wi) / PI),
        }
    }

    fn sample(&self, uv: Vec2, wo: Vec3, sampler: &mut Sampler) -> BsdfSample {
        let mut wi = square_to_cosine_hemisphere(sampler.next_2d());

        // Mirror below-surface queries so wi shares wo's hemisphere.
        if cos_theta(wo) < 0.0 {
            wi.z = -wi.z;
        }

        // Cosine-weighted sampling cancels both the pi and the cosine:
        // weight = (albedo/pi * cos) / (cos/pi) = albedo.
        BsdfSample {
            wi: wi.normalize(),
            weight: self.albedo.evaluate(uv),
        }
    }
}
