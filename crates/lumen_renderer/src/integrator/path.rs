use crate::integrator::Integrator;
use crate::{Sampler, Scene};
use lumen_core::Color;
use lumen_math::Ray;

/// Unbiased path tracer with optional next-event estimation.
///
/// No multiple importance sampling between NEE and BSDF paths: NEE covers
/// exactly the non-intersectable lights, BSDF sampling covers emissive
/// geometry and the background, so neither strategy double-counts.
pub struct PathTracer {
    max_depth: u32,
    nee: bool,
}

impl PathTracer {
    /// `max_depth` is the number of path segments and must be at least 1;
    /// `nee` enables explicit light sampling (ignored in scenes without
    /// NEE-eligible lights).
    pub fn new(max_depth: u32, nee: bool) -> Self {
        Self {
            max_depth: max_depth.max(1),
            nee,
        }
    }
}

impl Integrator for PathTracer {
    fn li(&self, scene: &Scene, primary: &Ray, sampler: &mut Sampler) -> Color {
        let use_nee = self.nee && scene.has_lights();

        let mut radiance = Color::ZERO;
        let mut throughput = Color::ONE;
        let mut ray = *primary;

        for bounce in 0.. {
            let its = scene.intersect(&ray, sampler);

            if !its.is_valid() {
                radiance += throughput * scene.evaluate_emission(&its);
                break;
            }

            radiance += throughput * scene.evaluate_emission(&its);

            // The last segment only gathers emission.
            if bounce >= self.max_depth - 1 {
                break;
            }

            if use_nee {
                if let Some(light_sample) = scene.sample_light(sampler) {
                    let direct = light_sample.light.sample_direct(its.position, sampler);
                    if !direct.is_invalid() {
                        let shadow_ray = Ray::new(its.position, direct.wi);
                        let transmittance =
                            scene.transmittance(&shadow_ray, direct.distance, sampler);
                        if transmittance > 0.0 {
                            let bsdf = scene.evaluate_bsdf(&its, direct.wi);
                            if !bsdf.is_invalid() {
                                radiance += throughput
                                    * (transmittance * bsdf.value)
                                    * direct.weight
                                    / light_sample.probability;
                            }
                        }
                    }
                }
            }

            let bsdf_sample = scene.sample_bsdf(&its, sampler);
            if bsdf_sample.is_invalid() {
                break;
            }

            throughput *= bsdf_sample.weight;
            // No epsilon offset: shapes already refuse hits below EPSILON.
            ray = Ray::new(its.position, bsdf_sample.wi);
        }

        radiance
    }
}
