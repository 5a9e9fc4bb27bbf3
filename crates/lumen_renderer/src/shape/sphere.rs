use std::f32::consts::PI;

use crate::shape::{AreaSample, Intersection, Shape};
use crate::Sampler;
use lumen_math::warp::square_to_uniform_sphere;
use lumen_math::{Aabb, Ray, Vec2, Vec3, EPSILON};

/// The unit sphere centered at the origin.
///
/// Position and scale come from the owning instance's transform.
pub struct Sphere;

impl Sphere {
    pub fn new() -> Self {
        Self
    }

    /// Equirectangular texture coordinates of a point on the surface.
    fn uv_of(point: Vec3) -> Vec2 {
        let theta = point.z.atan2(point.x);
        let phi = point.y.clamp(-1.0, 1.0).acos();
        Vec2::new(1.0 - (theta + PI) / (2.0 * PI), phi / PI)
    }

    /// Tangent along increasing azimuth, with a pole fallback.
    fn tangent_of(normal: Vec3) -> Vec3 {
        let tangent = Vec3::new(-normal.z, 0.0, normal.x);
        let len = tangent.length();
        if len > 1e-8 {
            tangent / len
        } else {
            Vec3::X
        }
    }

    fn populate(&self, its: &mut Intersection, position: Vec3) {
        let normal = position.normalize();
        its.position = position;
        its.geometry_normal = normal;
        its.shading_normal = normal;
        its.tangent = Self::tangent_of(normal);
        its.uv = Self::uv_of(normal);
        its.pdf = 1.0 / (4.0 * PI);
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new()
    }
}

impl Shape for Sphere {
    fn intersect(&self, ray: &Ray, its: &mut Intersection, _sampler: &mut Sampler) -> bool {
        // Unit direction makes the quadratic monic: t^2 + b t + c = 0.
        let b = 2.0 * ray.origin.dot(ray.direction);
        let c = ray.origin.length_squared() - 1.0;

        let discriminant = b * b - 4.0 * c;
        if discriminant < 0.0 {
            return false;
        }
        let sqrt_disc = discriminant.sqrt();

        let t_near = (-b - sqrt_disc) * 0.5;
        let t_far = (-b + sqrt_disc) * 0.5;

        // Prefer the closer root that respects the epsilon and budget rules.
        let t = if t_near >= EPSILON && t_near <= its.t {
            t_near
        } else if t_far >= EPSILON && t_far <= its.t {
            t_far
        } else {
            return false;
        };

        its.t = t;
        self.populate(its, ray.at(t));
        true
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    fn centroid(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn sample_area(&self, sampler: &mut Sampler) -> Option<AreaSample> {
        let normal = square_to_uniform_sphere(sampler.next_2d());
        Some(AreaSample {
            position: normal,
            normal,
            uv: Self::uv_of(normal),
            pdf: 1.0 / (4.0 * PI),
        })
    }

    fn type_name(&self) -> &'static str {
        "sphere"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_from_outside() {
        let sphere = Sphere::new();
        let mut sampler = Sampler::seeded(42);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);

        let mut its = Intersection::new();
        assert!(sphere.intersect(&ray, &mut its, &mut sampler));
        assert!((its.t - 2.0).abs() < 1e-5);
        assert!((its.geometry_normal - -Vec3::Z).length() < 1e-4);
        assert!((its.position.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hit_from_inside_picks_far_root() {
        let sphere = Sphere::new();
        let mut sampler = Sampler::seeded(42);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);

        let mut its = Intersection::new();
        assert!(sphere.intersect(&ray, &mut its, &mut sampler));
        assert!((its.t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_miss() {
        let sphere = Sphere::new();
        let mut sampler = Sampler::seeded(42);
        let ray = Ray::new(Vec3::new(0.0, 2.0, -3.0), Vec3::Z);

        let mut its = Intersection::new();
        assert!(!sphere.intersect(&ray, &mut its, &mut sampler));
        assert!(!its.is_valid());
    }

    #[test]
    fn test_closer_budget_is_respected() {
        let sphere = Sphere::new();
        let mut sampler = Sampler::seeded(42);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);

        let mut its = Intersection::new();
        its.t = 1.5; // an existing closer hit
        assert!(!sphere.intersect(&ray, &mut its, &mut sampler));
        assert_eq!(its.t, 1.5);
    }

    #[test]
    fn test_no_self_intersection_from_surface() {
        let sphere = Sphere::new();
        let mut sampler = Sampler::seeded(42);

        // Grazing ray starting exactly on the surface, pointing away.
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), -Vec3::Z);
        let mut its = Intersection::new();
        assert!(!sphere.intersect(&ray, &mut its, &mut sampler));
    }

    #[test]
    fn test_tangent_perpendicular_to_normal() {
        let sphere = Sphere::new();
        let mut sampler = Sampler::seeded(42);
        let ray = Ray::new(Vec3::new(0.3, 0.2, -3.0), Vec3::Z);

        let mut its = Intersection::new();
        assert!(sphere.intersect(&ray, &mut its, &mut sampler));
        assert!(its.tangent.dot(its.shading_normal).abs() < 1e-4);
        assert!((its.tangent.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_uv_in_unit_square() {
        let sphere = Sphere::new();
        let mut sampler = Sampler::seeded(42);
        for _ in 0..100 {
            let s = sphere.sample_area(&mut sampler).unwrap();
            assert!((0.0..=1.0).contains(&s.uv.x));
            assert!((0.0..=1.0).contains(&s.uv.y));
            assert!((s.pdf - 1.0 / (4.0 * PI)).abs() < 1e-6);
        }
    }
}
