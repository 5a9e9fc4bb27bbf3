use std::f32::consts::PI;
use std::sync::Arc;

use crate::bsdf::fresnel::schlick;
use crate::bsdf::microfacet::{ggx_ndf, roughness_to_alpha, sample_ggx_vndf, smith_g1};
use crate::bsdf::{Bsdf, BsdfEval, BsdfSample};
use crate::Sampler;
use lumen_core::{Color, ColorExt, Properties, PropertyResult, Texture};
use lumen_math::warp::square_to_cosine_hemisphere;
use lumen_math::{abs_cos_theta, cos_theta, reflect, same_hemisphere, Vec2, Vec3};

struct DiffuseLobe {
    color: Color,
}

impl DiffuseLobe {
    fn evaluate(&self, wo: Vec3, wi: Vec3) -> BsdfEval {
        if !same_hemisphere(wo, wi) {
            return BsdfEval::invalid();
        }
        BsdfEval {
            value: self.color * (abs_cos_theta(wi) / PI),
        }
    }

    fn sample(&self, wo: Vec3, sampler: &mut Sampler) -> BsdfSample {
        let mut wi = square_to_cosine_hemisphere(sampler.next_2d());
        if cos_theta(wo) < 0.0 {
            wi.z = -wi.z;
        }
        BsdfSample {
            wi: wi.normalize(),
            weight: self.color,
        }
    }
}

struct MetallicLobe {
    alpha: f32,
    color: Color,
}

impl MetallicLobe {
    fn evaluate(&self, wo: Vec3, wi: Vec3) -> BsdfEval {
        let cos_i = cos_theta(wi);
        let cos_o = cos_theta(wo);
        if cos_i <= 1e-4 || cos_o <= 1e-4 {
            return BsdfEval::invalid();
        }

        let h = (wo + wi).normalize();
        if cos_theta(h) <= 0.0 {
            return BsdfEval::invalid();
        }

        let d = ggx_ndf(self.alpha, h);
        let g = smith_g1(self.alpha, h, wi) * smith_g1(self.alpha, h, wo);
        BsdfEval {
            value: self.color * (d * g / (4.0 * cos_o)),
        }
    }

    fn sample(&self, wo: Vec3, sampler: &mut Sampler) -> BsdfSample {
        if cos_theta(wo) <= 1e-4 {
            return BsdfSample::invalid();
        }

        let h = sample_ggx_vndf(self.alpha, wo, sampler.next_2d());
        let wi = reflect(wo, h);
        if !same_hemisphere(wo, wi) {
            return BsdfSample::invalid();
        }

        BsdfSample {
            wi,
            weight: self.color * smith_g1(self.alpha, h, wi),
        }
    }
}

struct Combination {
    diffuse_selection_prob: f32,
    diffuse: DiffuseLobe,
    metallic: MetallicLobe,
}

/// Artist-facing two-lobe material: a diffuse base and a GGX metallic lobe
/// blended by `metallic` and a Schlick specular term.
pub struct Principled {
    base_color: Arc<dyn Texture>,
    roughness: Arc<dyn Texture>,
    metallic: Arc<dyn Texture>,
    specular: Arc<dyn Texture>,
}

impl Principled {
    pub fn new(
        base_color: Arc<dyn Texture>,
        roughness: Arc<dyn Texture>,
        metallic: Arc<dyn Texture>,
        specular: Arc<dyn Texture>,
    ) -> Self {
        Self {
            base_color,
            roughness,
            metallic,
            specular,
        }
    }

    pub fn from_properties(properties: &Properties) -> PropertyResult<Self> {
        Ok(Self::new(
            properties.get_texture("baseColor")?,
            properties.get_texture("roughness")?,
            properties.get_texture("metallic")?,
            properties.get_texture("specular")?,
        ))
    }

    /// Resolve textures at `uv` and split the response into the two lobes.
    fn combine(&self, uv: Vec2, wo: Vec3) -> Combination {
        let base_color = self.base_color.evaluate(uv);
        let alpha = roughness_to_alpha(self.roughness.scalar(uv));
        let specular = self.specular.scalar(uv);
        let metallic = self.metallic.scalar(uv);

        let f = specular * schlick((1.0 - metallic) * 0.08, cos_theta(wo));

        let diffuse = DiffuseLobe {
            color: (1.0 - f) * (1.0 - metallic) * base_color,
        };
        let metallic = MetallicLobe {
            alpha,
            color: Color::splat(f) + (1.0 - f) * metallic * base_color,
        };

        let diffuse_albedo = diffuse.color.mean();
        let total_albedo = diffuse.color.mean() + metallic.color.mean();
        Combination {
            diffuse_selection_prob: if total_albedo > 0.0 {
                diffuse_albedo / total_albedo
            } else {
                1.0
            },
            diffuse,
            metallic,
        }
    }
}

impl Bsdf for Principled {
    fn evaluate(&self, uv: Vec2, wo: Vec3, wi: Vec3) -> BsdfEval {
        let combination = self.combine(uv, wo);

        // Lobes sum; an invalid lobe contributes zero.
        let diffuse = combination.diffuse.evaluate(wo, wi);
        let metallic = combination.metallic.evaluate(wo, wi);
        BsdfEval {
            value: diffuse.value + metallic.value,
        }
    }

    fn sample(&self, uv: Vec2, wo: Vec3, sampler: &mut Sampler) -> BsdfSample {
        let combination = self.combine(uv, wo);

        if sampler.next() < combination.diffuse_selection_prob {
            let mut sample = combination.diffuse.sample(wo, sampler);
            sample.weight /= combination.diffuse_selection_prob;
            sample
        } else {
            let mut sample = combination.metallic.sample(wo, sampler);
            sample.weight /= 1.0 - combination.diffuse_selection_prob;
            sample
        }
    }
}
