//! Radiance estimators.

mod aov;
mod direct;
mod path;

pub use aov::{AovIntegrator, AovVariable};
pub use direct::DirectIntegrator;
pub use path::PathTracer;

use crate::{Sampler, Scene};
use lumen_core::Color;
use lumen_math::Ray;

/// Estimates incident radiance along a primary ray.
///
/// One `li` call is strictly sequential and CPU-bound; parallelism happens
/// at the tile level above this trait.
pub trait Integrator: Send + Sync {
    fn li(&self, scene: &Scene, ray: &Ray, sampler: &mut Sampler) -> Color;
}
