//! Light sources for next-event estimation and background illumination.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::Sampler;
use lumen_core::{Color, ColorExt, Properties, PropertyResult, Texture};
use lumen_math::warp::square_to_uniform_sphere;
use lumen_math::{Transform, Vec2, Vec3};

/// A direct-lighting sample toward a light source.
///
/// `weight` folds emitted radiance, geometry term and directional pdf, so an
/// integrator multiplies it straight into the estimate.
#[derive(Debug, Clone, Copy)]
pub struct DirectLightSample {
    /// Unit world-space direction from the surface toward the light.
    pub wi: Vec3,
    /// `Le * G / pdf`, already folded.
    pub weight: Color,
    /// Distance to the light; infinite for directional and environment lights.
    pub distance: f32,
}

impl DirectLightSample {
    pub fn invalid() -> Self {
        Self {
            wi: Vec3::ZERO,
            weight: Color::ZERO,
            distance: 0.0,
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.weight.is_black()
    }
}

/// A light source that can be sampled for next-event estimation.
pub trait Light: Send + Sync {
    /// Sample a direction from `origin` toward this light.
    fn sample_direct(&self, origin: Vec3, sampler: &mut Sampler) -> DirectLightSample;

    /// True when the light has geometry rays can hit. Intersectable lights
    /// are found by BSDF sampling and are excluded from NEE.
    fn can_be_intersected(&self) -> bool {
        false
    }
}

/// An isotropic point emitter with total power `phi`.
pub struct PointLight {
    position: Vec3,
    power_over_four_pi: Color,
}

impl PointLight {
    pub fn new(position: Vec3, power: Color) -> Self {
        Self {
            position,
            power_over_four_pi: power / (4.0 * PI),
        }
    }

    pub fn from_properties(properties: &Properties) -> PropertyResult<Self> {
        Ok(Self::new(
            properties.get_vector("position")?,
            properties.get_color("power")?,
        ))
    }
}

impl Light for PointLight {
    fn sample_direct(&self, origin: Vec3, _sampler: &mut Sampler) -> DirectLightSample {
        let to_light = self.position - origin;
        let distance = to_light.length();
        if distance == 0.0 {
            return DirectLightSample::invalid();
        }

        DirectLightSample {
            wi: to_light / distance,
            weight: self.power_over_four_pi / (distance * distance),
            distance,
        }
    }
}

/// A light infinitely far away shining along a fixed direction.
pub struct DirectionalLight {
    /// Unit direction pointing toward the light.
    direction: Vec3,
    intensity: Color,
}

impl DirectionalLight {
    pub fn new(direction: Vec3, intensity: Color) -> Self {
        Self {
            direction: direction.normalize(),
            intensity,
        }
    }

    pub fn from_properties(properties: &Properties) -> PropertyResult<Self> {
        Ok(Self::new(
            properties.get_vector("direction")?,
            properties.get_color("intensity")?,
        ))
    }
}

impl Light for DirectionalLight {
    fn sample_direct(&self, _origin: Vec3, _sampler: &mut Sampler) -> DirectLightSample {
        DirectLightSample {
            wi: self.direction,
            weight: self.intensity,
            distance: f32::INFINITY,
        }
    }
}

/// An equirectangular environment map surrounding the scene.
///
/// Missed rays query [`EnvironmentMap::evaluate`] directly, so the light
/// reports itself as intersectable and stays out of the NEE light set.
pub struct EnvironmentMap {
    texture: Arc<dyn Texture>,
    transform: Option<Transform>,
}

impl EnvironmentMap {
    pub fn new(texture: Arc<dyn Texture>, transform: Option<Transform>) -> Self {
        Self { texture, transform }
    }

    pub fn from_properties(properties: &Properties) -> PropertyResult<Self> {
        Ok(Self::new(
            properties.get_texture("texture")?,
            properties.get_transform_opt("transform")?,
        ))
    }

    /// Background radiance arriving from `direction` (pointing away from the
    /// scene).
    pub fn evaluate(&self, direction: Vec3) -> Color {
        let local = match &self.transform {
            Some(t) => t.inverse_vector(direction),
            None => direction,
        };

        // Equirectangular mapping: azimuth from the x axis in the xz plane,
        // elevation from the y axis.
        let phi = (-local.z).atan2(local.x) + PI;
        let theta = (local.x * local.x + local.z * local.z).sqrt().atan2(local.y);

        let uv = Vec2::new(phi / (2.0 * PI), theta / PI);
        self.texture.evaluate(uv)
    }
}

impl Light for EnvironmentMap {
    fn sample_direct(&self, _origin: Vec3, sampler: &mut Sampler) -> DirectLightSample {
        let direction = square_to_uniform_sphere(sampler.next_2d());
        let radiance = self.evaluate(direction);

        // Uniform sphere sampling: weight = Le / (1 / 4pi) = Le * 4pi.
        DirectLightSample {
            wi: direction,
            weight: radiance * (4.0 * PI),
            distance: f32::INFINITY,
        }
    }

    fn can_be_intersected(&self) -> bool {
        true
    }
}
