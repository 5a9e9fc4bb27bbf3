//! Ray-generating cameras.

use lumen_core::{Color, Properties, PropertyResult};
use lumen_math::{Ray, Transform, UVec2, Vec2, Vec3};

/// Which image axis the field-of-view angle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FovAxis {
    X,
    Y,
}

/// A camera ray with its importance weight.
#[derive(Debug, Clone, Copy)]
pub struct CameraSample {
    pub ray: Ray,
    pub weight: Color,
}

/// Pinhole perspective camera.
///
/// In local coordinates the camera looks along +z; normalized image
/// coordinates span [-1, 1] on both axes with +y up. The world placement
/// comes from a world-from-camera transform.
pub struct PerspectiveCamera {
    resolution: UVec2,
    transform: Transform,
    /// tan(fov/2) per axis, aspect-corrected.
    scale: Vec2,
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, fov_axis: FovAxis, resolution: UVec2, transform: Transform) -> Self {
        let aspect = resolution.x as f32 / resolution.y as f32;
        let tan_half = (fov_degrees.to_radians() / 2.0).tan();

        let scale = match fov_axis {
            FovAxis::X => Vec2::new(tan_half, tan_half / aspect),
            FovAxis::Y => Vec2::new(tan_half * aspect, tan_half),
        };

        Self {
            resolution,
            transform,
            scale,
        }
    }

    pub fn from_properties(
        properties: &Properties,
        resolution: UVec2,
        transform: Transform,
    ) -> PropertyResult<Self> {
        let fov = properties.get_float("fov")?;
        let axis = properties.get_enum("fovAxis", FovAxis::Y, &[("x", FovAxis::X), ("y", FovAxis::Y)])?;
        Ok(Self::new(fov, axis, resolution, transform))
    }

    pub fn resolution(&self) -> UVec2 {
        self.resolution
    }

    /// Generate the world-space ray through a normalized image coordinate.
    pub fn sample(&self, normalized: Vec2) -> CameraSample {
        let local_direction = Vec3::new(
            normalized.x * self.scale.x,
            normalized.y * self.scale.y,
            1.0,
        );

        let ray = Ray::new(
            self.transform.apply_point(Vec3::ZERO),
            self.transform.apply_vector(local_direction),
        );

        CameraSample {
            ray: ray.normalized(),
            weight: Color::ONE,
        }
    }
}
