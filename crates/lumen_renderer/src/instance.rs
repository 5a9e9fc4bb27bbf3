//! Instances: shapes placed in the world with a transform, a material, an
//! optional emission profile and an optional stochastic alpha mask.

use std::sync::Arc;

use crate::bsdf::{Bsdf, BsdfEval, BsdfSample};
use crate::emission::Emission;
use crate::shape::{AreaSample, Intersection, Shape};
use crate::Sampler;
use lumen_core::{Color, Texture};
use lumen_math::{Aabb, Ray, Transform, Vec3, EPSILON};

/// Upper bound on stochastic-alpha continuations per query, guarding
/// against pathological masks that reject forever.
const MAX_ALPHA_BOUNCES: u32 = 256;

/// A shape placed into the scene.
///
/// The shape, BSDF, emission and textures are shared immutable assets; the
/// instance itself is immutable after construction.
pub struct Instance {
    shape: Arc<dyn Shape>,
    transform: Option<Transform>,
    bsdf: Arc<dyn Bsdf>,
    emission: Option<Arc<dyn Emission>>,
    alpha: Option<Arc<dyn Texture>>,
}

impl Instance {
    pub fn new(
        shape: Arc<dyn Shape>,
        transform: Option<Transform>,
        bsdf: Arc<dyn Bsdf>,
        emission: Option<Arc<dyn Emission>>,
        alpha: Option<Arc<dyn Texture>>,
    ) -> Self {
        Self {
            shape,
            transform,
            bsdf,
            emission,
            alpha,
        }
    }

    /// True when this instance emits light.
    pub fn is_emissive(&self) -> bool {
        self.emission.is_some()
    }

    /// Intersect the instance with a world-space ray.
    ///
    /// Contract: on miss (or stochastic-alpha rejection) the caller's record
    /// is left exactly as it was; on acceptance the record holds the
    /// world-space event and a world `t` strictly below the previous budget.
    pub fn intersect(&self, world_ray: &Ray, its: &mut Intersection, sampler: &mut Sampler) -> bool {
        let snapshot = *its;
        let t_max_world = its.t;

        // Move the query into the shape's local frame. The direction is
        // re-normalized so local t stays metric; the previous world hit is
        // converted into a local budget the same way.
        let mut local_ray = *world_ray;
        if let Some(transform) = &self.transform {
            let scaled = transform.inverse_ray(world_ray);
            let len = scaled.direction.length();
            if len == 0.0 {
                return false;
            }
            local_ray = Ray::new(scaled.origin, scaled.direction / len);
        }

        let mut local_budget = if its.is_valid() {
            match &self.transform {
                Some(transform) => {
                    (transform.inverse_point(its.position) - local_ray.origin).length()
                }
                None => its.t,
            }
        } else {
            f32::INFINITY
        };

        for _ in 0..MAX_ALPHA_BOUNCES {
            its.t = local_budget;
            if !self.shape.intersect(&local_ray, its, sampler) {
                return self.reject(its, snapshot);
            }
            let hit_t_local = its.t;

            // Stochastic transparency: accept this surface hit with
            // probability alpha(uv).
            let alpha = match &self.alpha {
                Some(mask) => mask.scalar(its.uv).clamp(0.0, 1.0),
                None => 1.0,
            };
            if alpha >= 1.0 || sampler.next() < alpha {
                if let Some(transform) = &self.transform {
                    self.to_world(transform, its);
                }
                its.t = (its.position - world_ray.origin).length();
                if its.t >= t_max_world || !self.validate(its) {
                    return self.reject(its, snapshot);
                }
                return true;
            }

            // Rejected: resume the query just past the transparent surface.
            // The fresh origin keeps the shape's own traversal starting from
            // a full budget.
            let step = hit_t_local + EPSILON;
            local_ray.origin += local_ray.direction * step;
            if local_budget.is_finite() {
                local_budget -= step;
                if local_budget <= EPSILON {
                    return self.reject(its, snapshot);
                }
            }
        }

        self.reject(its, snapshot)
    }

    /// Restore the caller's record, keeping accumulated traversal counters.
    fn reject(&self, its: &mut Intersection, snapshot: Intersection) -> bool {
        let stats = its.stats;
        *its = snapshot;
        its.stats = stats;
        false
    }

    /// Geometry validation per the error-handling policy: a bad record is a
    /// shape bug, logged and discarded rather than propagated.
    fn validate(&self, its: &Intersection) -> bool {
        if !its.t.is_finite() || its.t < EPSILON {
            log::error!(
                "intersection with distance t = {:.3e} is susceptible to self-intersection (offending shape: {})",
                its.t,
                self.shape.type_name()
            );
            return false;
        }
        let normals_unit = (its.geometry_normal.length() - 1.0).abs() < 1e-3
            && (its.shading_normal.length() - 1.0).abs() < 1e-3;
        if !normals_unit {
            log::error!(
                "intersection produced non-unit normals (offending shape: {})",
                self.shape.type_name()
            );
            return false;
        }
        true
    }

    /// Map a local surface event into world space, keeping the shading
    /// frame orthonormal.
    fn to_world(&self, transform: &Transform, its: &mut Intersection) {
        its.position = transform.apply_point(its.position);
        its.geometry_normal = transform.apply_normal(its.geometry_normal).normalize();
        its.shading_normal = transform.apply_normal(its.shading_normal).normalize();

        let world_tangent = transform.apply_vector(its.tangent);
        its.tangent = lumen_math::Frame::with_tangent(its.shading_normal, world_tangent).tangent;
    }

    /// Fraction of light passing this instance along `[0, t_max]`.
    pub fn transmittance(&self, world_ray: &Ray, t_max: f32, sampler: &mut Sampler) -> f32 {
        // An alpha mask makes occlusion stochastic, so consult the full
        // intersection test.
        if self.alpha.is_some() {
            let mut its = Intersection::new();
            if self.intersect(world_ray, &mut its, sampler) && its.t < t_max {
                return 0.0;
            }
            return 1.0;
        }

        match &self.transform {
            None => self.shape.transmittance(world_ray, t_max, sampler),
            Some(transform) => {
                let scaled = transform.inverse_ray(world_ray);
                let len = scaled.direction.length();
                if len == 0.0 {
                    return 0.0;
                }
                // Scaling the direction rescales the ray parameter; the
                // budget must follow.
                let local_ray = Ray::new(scaled.origin, scaled.direction / len);
                self.shape.transmittance(&local_ray, t_max * len, sampler)
            }
        }
    }

    /// World-space bounds.
    pub fn bounding_box(&self) -> Aabb {
        match &self.transform {
            Some(transform) => transform.apply_aabb(&self.shape.bounding_box()),
            None => self.shape.bounding_box(),
        }
    }

    /// World-space centroid.
    pub fn centroid(&self) -> Vec3 {
        match &self.transform {
            Some(transform) => transform.apply_point(self.shape.centroid()),
            None => self.shape.centroid(),
        }
    }

    /// Sample a world-space point on the surface.
    pub fn sample_area(&self, sampler: &mut Sampler) -> Option<AreaSample> {
        let mut sample = self.shape.sample_area(sampler)?;
        if let Some(transform) = &self.transform {
            sample.position = transform.apply_point(sample.position);
            sample.normal = transform.apply_normal(sample.normal).normalize();
        }
        Some(sample)
    }

    /// Emitted radiance toward the viewer at a hit on this instance.
    pub fn evaluate_emission(&self, its: &Intersection) -> Color {
        match &self.emission {
            Some(emission) => {
                let wo_local = its.shading_frame().to_local(its.wo);
                emission.evaluate(its.uv, wo_local).value
            }
            None => Color::ZERO,
        }
    }

    /// Evaluate the BSDF for a world-space incident direction.
    pub fn evaluate_bsdf(&self, its: &Intersection, wi_world: Vec3) -> BsdfEval {
        let frame = its.shading_frame();
        self.bsdf
            .evaluate(its.uv, frame.to_local(its.wo), frame.to_local(wi_world))
    }

    /// Sample a world-space scattering direction at a hit on this instance.
    pub fn sample_bsdf(&self, its: &Intersection, sampler: &mut Sampler) -> BsdfSample {
        let frame = its.shading_frame();
        let sample = self.bsdf.sample(its.uv, frame.to_local(its.wo), sampler);
        if sample.is_invalid() {
            return sample;
        }
        BsdfSample {
            wi: frame.to_world(sample.wi).normalize(),
            weight: sample.weight,
        }
    }
}
