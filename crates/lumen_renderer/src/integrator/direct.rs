use crate::integrator::Integrator;
use crate::{Sampler, Scene};
use lumen_core::Color;
use lumen_math::Ray;

/// One-bounce estimator: surface emission, one NEE sample and one
/// BSDF-sampled emission gather.
pub struct DirectIntegrator;

impl DirectIntegrator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DirectIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Integrator for DirectIntegrator {
    fn li(&self, scene: &Scene, ray: &Ray, sampler: &mut Sampler) -> Color {
        let its = scene.intersect(ray, sampler);
        if !its.is_valid() {
            return scene.evaluate_emission(&its);
        }

        let mut result = scene.evaluate_emission(&its);

        // Next-event estimation toward one sampled light.
        if let Some(light_sample) = scene.sample_light(sampler) {
            let direct = light_sample.light.sample_direct(its.position, sampler);
            if !direct.is_invalid() {
                let shadow_ray = Ray::new(its.position, direct.wi);
                let transmittance = scene.transmittance(&shadow_ray, direct.distance, sampler);
                if transmittance > 0.0 {
                    let bsdf = scene.evaluate_bsdf(&its, direct.wi);
                    if !bsdf.is_invalid() {
                        result += bsdf.value * direct.weight * transmittance
                            / light_sample.probability;
                    }
                }
            }
        }

        // One BSDF-sampled bounce picks up area lights and the background.
        let bsdf_sample = scene.sample_bsdf(&its, sampler);
        if !bsdf_sample.is_invalid() {
            let bounce_ray = Ray::new(its.position, bsdf_sample.wi);
            let bounce_its = scene.intersect(&bounce_ray, sampler);
            result += bsdf_sample.weight * scene.evaluate_emission(&bounce_its);
        }

        result
    }
}
