//! Surface and phase scattering models.
//!
//! Directions handed to a [`Bsdf`] are in local shading-frame coordinates:
//! `z` is the shading normal, `wo` points toward the viewer, and the
//! returned `wi` points toward the light. The evaluate/sample contract folds
//! factors so integrators never divide by a pdf:
//!
//! * [`BsdfEval::value`] stores `f(wo, wi) * |cos(theta_wi)|`
//! * [`BsdfSample::weight`] stores `f * |cos(theta)| / pdf`
//!
//! Invalid sentinels (zero value / zero weight) signal that the direction
//! pair is unphysical or that sampling failed; integrators terminate the
//! path segment instead of treating this as an error.

mod dielectric;
mod diffuse;
pub mod fresnel;
mod hg;
pub mod microfacet;
mod principled;
mod rough_conductor;

pub use dielectric::Dielectric;
pub use diffuse::Diffuse;
pub use hg::HenyeyGreenstein;
pub use principled::Principled;
pub use rough_conductor::RoughConductor;

use crate::Sampler;
use lumen_core::{Color, ColorExt};
use lumen_math::{Vec2, Vec3};

/// Result of evaluating a BSDF for a concrete direction pair.
#[derive(Debug, Clone, Copy)]
pub struct BsdfEval {
    /// `f(wo, wi) * |cos(theta_wi)|`, or zero for unphysical pairs.
    pub value: Color,
}

impl BsdfEval {
    /// Sentinel for direction pairs the BSDF cannot scatter between.
    pub fn invalid() -> Self {
        Self { value: Color::ZERO }
    }

    /// True when this evaluation carries no energy.
    pub fn is_invalid(&self) -> bool {
        self.value.is_black()
    }
}

/// Result of importance-sampling a BSDF.
#[derive(Debug, Clone, Copy)]
pub struct BsdfSample {
    /// Sampled incident direction, unit length, local shading-frame coords.
    pub wi: Vec3,
    /// Monte Carlo estimator factor `f * |cos(theta)| / pdf`.
    pub weight: Color,
}

impl BsdfSample {
    /// Sentinel for failed sampling; terminates the path segment.
    pub fn invalid() -> Self {
        Self {
            wi: Vec3::ZERO,
            weight: Color::ZERO,
        }
    }

    /// True when sampling failed or produced a zero-throughput direction.
    pub fn is_invalid(&self) -> bool {
        self.weight.is_black()
    }
}

/// A bidirectional scattering distribution function.
pub trait Bsdf: Send + Sync {
    /// Evaluate the BSDF at texture coordinate `uv` for the pair `(wo, wi)`.
    ///
    /// Delta distributions (smooth dielectric) always return the invalid
    /// sentinel: the probability of `wi` landing exactly on the delta lobe
    /// is zero.
    fn evaluate(&self, uv: Vec2, wo: Vec3, wi: Vec3) -> BsdfEval;

    /// Draw an incident direction for the given outgoing direction.
    fn sample(&self, uv: Vec2, wo: Vec3, sampler: &mut Sampler) -> BsdfSample;
}
