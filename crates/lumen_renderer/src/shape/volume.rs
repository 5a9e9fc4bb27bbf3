use std::sync::Arc;

use crate::shape::{Intersection, Shape};
use crate::Sampler;
use lumen_math::{Aabb, Frame, Ray, Vec2, Vec3, EPSILON};

/// A homogeneous participating medium with extinction `density`, optionally
/// bounded by another shape.
///
/// Intersection samples a free-flight scattering event inside the medium;
/// transmittance follows Beer-Lambert over the ray/volume overlap. The
/// scattering itself lives in the instance's phase-function BSDF.
pub struct Volume {
    density: f32,
    boundary: Option<Arc<dyn Shape>>,
}

impl Volume {
    pub fn new(density: f32, boundary: Option<Arc<dyn Shape>>) -> Self {
        Self { density, boundary }
    }

    /// The parametric interval `[t_entry, t_exit]` the ray spends inside the
    /// medium, or `None` if it never enters.
    fn interval(&self, ray: &Ray, sampler: &mut Sampler) -> Option<(f32, f32)> {
        let boundary = match &self.boundary {
            Some(b) => b,
            None => return Some((0.0, f32::INFINITY)),
        };

        let mut boundary_its = Intersection::new();
        if !boundary.intersect(ray, &mut boundary_its, sampler) {
            return None;
        }

        // A hit whose normal faces the ray is an entry; otherwise the origin
        // is already inside and the hit is our exit.
        if boundary_its.geometry_normal.dot(ray.direction) < 0.0 {
            let t_entry = boundary_its.t;

            // Continue from just past the entry to find the exit.
            let inside_ray = Ray::new(ray.at(t_entry + EPSILON), ray.direction);
            let mut exit_its = Intersection::new();
            let t_exit = if boundary.intersect(&inside_ray, &mut exit_its, sampler) {
                t_entry + exit_its.t
            } else {
                f32::INFINITY
            };
            Some((t_entry, t_exit))
        } else {
            Some((0.0, boundary_its.t))
        }
    }
}

impl Shape for Volume {
    fn intersect(&self, ray: &Ray, its: &mut Intersection, sampler: &mut Sampler) -> bool {
        let (t_entry, t_exit) = match self.interval(ray, sampler) {
            Some(interval) => interval,
            None => return false,
        };

        // Free-flight distance t = -ln(1 - u) / sigma_t, kept away from the
        // log singularity and from zero.
        let u = sampler.next().min(1.0 - EPSILON);
        let distance = (-(1.0 - u).ln() / self.density).max(EPSILON);

        let t_hit = t_entry + distance;
        if t_hit >= t_exit || t_hit >= its.t {
            return false;
        }

        its.t = t_hit;
        its.position = ray.at(t_hit);

        // The scattering event has no surface; orient the frame back along
        // the ray.
        let normal = -ray.direction;
        its.geometry_normal = normal;
        its.shading_normal = normal;
        its.tangent = Frame::new(normal).tangent;
        its.uv = Vec2::ZERO;
        its.pdf = 1.0;

        true
    }

    fn transmittance(&self, ray: &Ray, t_max: f32, sampler: &mut Sampler) -> f32 {
        let (t_entry, t_exit) = match self.interval(ray, sampler) {
            Some(interval) => interval,
            None => return 1.0,
        };

        let t0 = t_entry.max(0.0);
        let t1 = t_exit.min(t_max);
        if t0 >= t1 {
            return 1.0;
        }

        (-self.density * (t1 - t0)).exp()
    }

    fn bounding_box(&self) -> Aabb {
        match &self.boundary {
            Some(b) => b.bounding_box(),
            None => Aabb::UNIVERSE,
        }
    }

    fn centroid(&self) -> Vec3 {
        match &self.boundary {
            Some(b) => b.centroid(),
            None => Vec3::ZERO,
        }
    }

    fn type_name(&self) -> &'static str {
        "volume"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Sphere;

    fn unit_sphere_volume(density: f32) -> Volume {
        Volume::new(density, Some(Arc::new(Sphere::new())))
    }

    #[test]
    fn test_transmittance_along_diameter() {
        let volume = unit_sphere_volume(1.0);
        let mut sampler = Sampler::seeded(42);

        // A diameter crosses 2 units of density-1 medium: exp(-2).
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);
        let tr = volume.transmittance(&ray, 10.0, &mut sampler);
        assert!((tr - (-2.0f32).exp()).abs() < 0.01 * (-2.0f32).exp(), "tr = {tr}");
    }

    #[test]
    fn test_transmittance_composes_multiplicatively() {
        let volume = Volume::new(0.7, None);
        let mut sampler = Sampler::seeded(42);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);

        let t_short = volume.transmittance(&ray, 1.0, &mut sampler);
        let t_long = volume.transmittance(&ray, 2.5, &mut sampler);
        let t_rest = (-0.7f32 * 1.5).exp();
        assert!((t_short * t_rest - t_long).abs() < 1e-5);
    }

    #[test]
    fn test_missing_the_boundary_is_transparent() {
        let volume = unit_sphere_volume(5.0);
        let mut sampler = Sampler::seeded(42);

        let ray = Ray::new(Vec3::new(0.0, 3.0, -3.0), Vec3::Z);
        assert_eq!(volume.transmittance(&ray, 100.0, &mut sampler), 1.0);

        let mut its = Intersection::new();
        assert!(!volume.intersect(&ray, &mut its, &mut sampler));
    }

    #[test]
    fn test_scatter_events_stay_inside_boundary() {
        let volume = unit_sphere_volume(10.0);
        let mut sampler = Sampler::seeded(42);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);

        let mut scattered = 0;
        for _ in 0..500 {
            let mut its = Intersection::new();
            if volume.intersect(&ray, &mut its, &mut sampler) {
                scattered += 1;
                assert!(its.position.length() <= 1.0 + 1e-3);
                assert!((its.geometry_normal + ray.direction).length() < 1e-5);
            }
        }
        // Dense medium: nearly every ray scatters inside.
        assert!(scattered > 450, "scattered = {scattered}");
    }

    #[test]
    fn test_scatter_frequency_matches_density() {
        // P(scatter before exit) = 1 - exp(-sigma * 2) along a diameter.
        let volume = unit_sphere_volume(1.0);
        let mut sampler = Sampler::seeded(7);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);

        let n = 20_000;
        let mut scattered = 0;
        for _ in 0..n {
            let mut its = Intersection::new();
            if volume.intersect(&ray, &mut its, &mut sampler) {
                scattered += 1;
            }
        }
        let expected = 1.0 - (-2.0f32).exp();
        let observed = scattered as f32 / n as f32;
        assert!((observed - expected).abs() < 0.01, "observed = {observed}");
    }

    #[test]
    fn test_origin_inside_uses_exit_interval() {
        let volume = unit_sphere_volume(1000.0);
        let mut sampler = Sampler::seeded(42);

        // From the center outward the medium is 1 unit thick.
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let tr = volume.transmittance(&ray, 10.0, &mut sampler);
        assert!((tr - (-1000.0f32).exp()).abs() < 1e-6);

        let mut its = Intersection::new();
        assert!(volume.intersect(&ray, &mut its, &mut sampler));
        assert!(its.t <= 1.0 + 1e-3);
    }
}
