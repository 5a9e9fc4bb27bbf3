//! The scene: instances behind a BVH, a light set and an optional
//! environment background.

use std::sync::Arc;

use crate::accel::Bvh;
use crate::bsdf::{BsdfEval, BsdfSample};
use crate::instance::Instance;
use crate::light::{EnvironmentMap, Light};
use crate::shape::Intersection;
use crate::Sampler;
use lumen_core::Color;
use lumen_math::Ray;

/// A light chosen for next-event estimation, with its selection probability.
pub struct LightSample<'a> {
    pub light: &'a dyn Light,
    pub probability: f32,
}

/// Immutable world description shared by all render workers.
pub struct Scene {
    instances: Vec<Instance>,
    lights: Vec<Arc<dyn Light>>,
    /// Indices into `lights` eligible for NEE (non-intersectable lights).
    nee_lights: Vec<usize>,
    background: Option<Arc<EnvironmentMap>>,
    accel: Bvh,
}

impl Scene {
    pub fn new(
        instances: Vec<Instance>,
        lights: Vec<Arc<dyn Light>>,
        background: Option<Arc<EnvironmentMap>>,
    ) -> Self {
        let bounds: Vec<_> = instances.iter().map(|i| i.bounding_box()).collect();
        let accel = Bvh::build(&bounds);

        // The environment map is queried by missed rays, not by NEE, so the
        // sampling pool holds only lights rays cannot find on their own.
        let nee_lights = lights
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.can_be_intersected())
            .map(|(i, _)| i)
            .collect();

        log::info!(
            "scene: {} instances, {} lights ({} background)",
            instances.len(),
            lights.len(),
            if background.is_some() { "with" } else { "no" }
        );

        Self {
            instances,
            lights,
            nee_lights,
            background,
            accel,
        }
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Find the nearest accepted hit; the returned record is invalid on miss.
    pub fn intersect(&self, ray: &Ray, sampler: &mut Sampler) -> Intersection {
        let mut its = Intersection::new();
        its.wo = -ray.direction;

        self.accel.intersect(ray, &mut its, |index, ray, its| {
            if self.instances[index].intersect(ray, its, sampler) {
                its.instance = Some(index);
                true
            } else {
                false
            }
        });
        its
    }

    /// Emission seen along a completed query: surface emission for hits,
    /// background radiance for misses.
    pub fn evaluate_emission(&self, its: &Intersection) -> Color {
        match its.instance {
            Some(index) => self.instances[index].evaluate_emission(its),
            None => match &self.background {
                Some(environment) => environment.evaluate(-its.wo),
                None => Color::ZERO,
            },
        }
    }

    /// Evaluate the hit instance's BSDF for a world-space direction.
    pub fn evaluate_bsdf(&self, its: &Intersection, wi_world: lumen_math::Vec3) -> BsdfEval {
        match its.instance {
            Some(index) => self.instances[index].evaluate_bsdf(its, wi_world),
            None => BsdfEval::invalid(),
        }
    }

    /// Sample a world-space scattering direction at the hit.
    pub fn sample_bsdf(&self, its: &Intersection, sampler: &mut Sampler) -> BsdfSample {
        match its.instance {
            Some(index) => self.instances[index].sample_bsdf(its, sampler),
            None => BsdfSample::invalid(),
        }
    }

    /// Pick one NEE-eligible light uniformly.
    pub fn sample_light(&self, sampler: &mut Sampler) -> Option<LightSample<'_>> {
        if self.nee_lights.is_empty() {
            return None;
        }
        let choice = ((sampler.next() * self.nee_lights.len() as f32) as usize)
            .min(self.nee_lights.len() - 1);
        Some(LightSample {
            light: self.lights[self.nee_lights[choice]].as_ref(),
            probability: 1.0 / self.nee_lights.len() as f32,
        })
    }

    /// True when NEE has anything to sample. A scene with only a background
    /// light reports false.
    pub fn has_lights(&self) -> bool {
        !self.nee_lights.is_empty()
    }

    /// The background environment light, if any.
    pub fn background(&self) -> Option<&EnvironmentMap> {
        self.background.as_deref()
    }

    /// Product of all instance transmittances along `[0, t_max]`.
    pub fn transmittance(&self, ray: &Ray, t_max: f32, sampler: &mut Sampler) -> f32 {
        let mut result = 1.0;
        for instance in &self.instances {
            result *= instance.transmittance(ray, t_max, sampler);
            if result == 0.0 {
                break;
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsdf::Diffuse;
    use crate::light::{DirectionalLight, PointLight};
    use crate::shape::{Shape, Sphere};
    use lumen_core::ConstantTexture;
    use lumen_math::{Mat4, Transform, Vec3};

    fn diffuse_sphere(transform: Option<Transform>) -> Instance {
        Instance::new(
            Arc::new(Sphere::new()),
            transform,
            Arc::new(Diffuse::new(Arc::new(ConstantTexture::new(Color::splat(
                0.5,
            ))))),
            None,
            None,
        )
    }

    fn translate(v: Vec3) -> Transform {
        Transform::new(Mat4::from_translation(v))
    }

    #[test]
    fn test_intersect_picks_nearest_instance() {
        let scene = Scene::new(
            vec![
                diffuse_sphere(Some(translate(Vec3::new(0.0, 0.0, 10.0)))),
                diffuse_sphere(Some(translate(Vec3::new(0.0, 0.0, 5.0)))),
            ],
            vec![],
            None,
        );
        let mut sampler = Sampler::seeded(42);

        let its = scene.intersect(&Ray::new(Vec3::ZERO, Vec3::Z), &mut sampler);
        assert!(its.is_valid());
        assert_eq!(its.instance, Some(1));
        assert!((its.t - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_miss_returns_invalid_record() {
        let scene = Scene::new(
            vec![diffuse_sphere(Some(translate(Vec3::new(0.0, 0.0, 5.0))))],
            vec![],
            None,
        );
        let mut sampler = Sampler::seeded(42);

        let its = scene.intersect(&Ray::new(Vec3::ZERO, Vec3::Y), &mut sampler);
        assert!(!its.is_valid());
        assert_eq!(its.instance, None);
        assert_eq!(scene.evaluate_emission(&its), Color::ZERO);
    }

    #[test]
    fn test_background_answers_missed_rays() {
        let background = Arc::new(EnvironmentMap::new(
            Arc::new(ConstantTexture::new(Color::new(0.3, 0.5, 0.8))),
            None,
        ));
        let scene = Scene::new(vec![], vec![], Some(background));
        let mut sampler = Sampler::seeded(42);

        let its = scene.intersect(&Ray::new(Vec3::ZERO, Vec3::Z), &mut sampler);
        assert!(!its.is_valid());
        assert!((scene.evaluate_emission(&its) - Color::new(0.3, 0.5, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_light_selection_probability() {
        let lights: Vec<Arc<dyn Light>> = vec![
            Arc::new(PointLight::new(Vec3::Y, Color::ONE)),
            Arc::new(DirectionalLight::new(Vec3::Y, Color::ONE)),
        ];
        let scene = Scene::new(vec![], lights, None);
        let mut sampler = Sampler::seeded(42);

        assert!(scene.has_lights());
        let sample = scene.sample_light(&mut sampler).unwrap();
        assert!((sample.probability - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_background_only_scene_has_no_nee_lights() {
        let environment = Arc::new(EnvironmentMap::new(
            Arc::new(ConstantTexture::new(Color::ONE)),
            None,
        ));
        let lights: Vec<Arc<dyn Light>> = vec![environment.clone()];
        let scene = Scene::new(vec![], lights, Some(environment));
        let mut sampler = Sampler::seeded(42);

        assert!(!scene.has_lights());
        assert!(scene.sample_light(&mut sampler).is_none());
    }

    #[test]
    fn test_transmittance_is_product_over_instances() {
        use crate::shape::Volume;
        let volume_instance = |density: f32| {
            Instance::new(
                Arc::new(Volume::new(density, None)) as Arc<dyn Shape>,
                None,
                Arc::new(Diffuse::new(Arc::new(ConstantTexture::new(Color::ONE)))),
                None,
                None,
            )
        };
        let scene = Scene::new(
            vec![volume_instance(0.5), volume_instance(0.25)],
            vec![],
            None,
        );
        let mut sampler = Sampler::seeded(42);

        let tr = scene.transmittance(&Ray::new(Vec3::ZERO, Vec3::Z), 2.0, &mut sampler);
        let expected = (-0.5f32 * 2.0).exp() * (-0.25f32 * 2.0).exp();
        assert!((tr - expected).abs() < 1e-5);
    }

    #[test]
    fn test_no_self_intersection_from_surface_hit() {
        let scene = Scene::new(
            vec![diffuse_sphere(Some(translate(Vec3::new(0.0, 0.0, 5.0))))],
            vec![],
            None,
        );
        let mut sampler = Sampler::seeded(42);

        let first = scene.intersect(&Ray::new(Vec3::ZERO, Vec3::Z), &mut sampler);
        assert!(first.is_valid());

        // Re-shoot from the hit point, away from the sphere: the epsilon
        // rule must prevent finding the same surface again.
        let bounce = Ray::new(first.position, -Vec3::Z);
        let second = scene.intersect(&bounce, &mut sampler);
        assert!(!second.is_valid());
    }
}
