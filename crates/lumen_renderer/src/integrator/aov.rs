use crate::integrator::Integrator;
use crate::{Sampler, Scene};
use lumen_core::{Color, Properties, PropertyResult};
use lumen_math::{Ray, Vec3};

/// Which debug quantity to visualize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AovVariable {
    /// Shading normals remapped from [-1, 1] to [0, 1].
    Normals,
    /// BVH traversal cost, scaled into a grayscale value.
    Bvh,
}

/// Arbitrary-output-variable integrator: renders internal quantities
/// instead of light transport.
pub struct AovIntegrator {
    variable: AovVariable,
    /// Node count mapped to white for the `bvh` variable.
    bvh_scale: f32,
}

impl AovIntegrator {
    pub fn new(variable: AovVariable) -> Self {
        Self {
            variable,
            bvh_scale: 64.0,
        }
    }

    pub fn from_properties(properties: &Properties) -> PropertyResult<Self> {
        let variable = properties.get_enum(
            "variable",
            AovVariable::Normals,
            &[("normals", AovVariable::Normals), ("bvh", AovVariable::Bvh)],
        )?;
        Ok(Self::new(variable))
    }
}

impl Integrator for AovIntegrator {
    fn li(&self, scene: &Scene, ray: &Ray, sampler: &mut Sampler) -> Color {
        let its = scene.intersect(ray, sampler);

        match self.variable {
            AovVariable::Normals => {
                let normal = if its.is_valid() {
                    its.shading_normal
                } else {
                    Vec3::ZERO
                };
                (normal + Vec3::ONE) / 2.0
            }
            AovVariable::Bvh => Color::splat(its.stats.nodes_visited as f32 / self.bvh_scale),
        }
    }
}
