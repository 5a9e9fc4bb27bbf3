//! Surface emission attached to instances.

use std::sync::Arc;

use lumen_core::{Color, ColorExt, Properties, PropertyResult, Texture};
use lumen_math::{cos_theta, Vec2, Vec3};

/// Radiance emitted toward an outgoing direction.
#[derive(Debug, Clone, Copy)]
pub struct EmissionEval {
    pub value: Color,
}

impl EmissionEval {
    pub fn none() -> Self {
        Self { value: Color::ZERO }
    }

    pub fn is_none(&self) -> bool {
        self.value.is_black()
    }
}

/// An emission profile evaluated at a surface point.
///
/// `wo` is the direction toward the viewer in local shading coordinates.
pub trait Emission: Send + Sync {
    fn evaluate(&self, uv: Vec2, wo: Vec3) -> EmissionEval;
}

/// Diffuse area emission: constant radiance over the front hemisphere,
/// black on the back side.
pub struct AreaEmission {
    emission: Arc<dyn Texture>,
}

impl AreaEmission {
    pub fn new(emission: Arc<dyn Texture>) -> Self {
        Self { emission }
    }

    pub fn from_properties(properties: &Properties) -> PropertyResult<Self> {
        Ok(Self::new(properties.get_texture("emission")?))
    }
}

impl Emission for AreaEmission {
    fn evaluate(&self, uv: Vec2, wo: Vec3) -> EmissionEval {
        if cos_theta(wo) <= 0.0 {
            return EmissionEval::none();
        }
        EmissionEval {
            value: self.emission.evaluate(uv),
        }
    }
}
