// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod frame;
mod ray;
mod transform;
pub mod warp;

pub use aabb::Aabb;
pub use frame::{abs_cos_theta, cos_theta, reflect, same_hemisphere, Frame};
pub use ray::Ray;
pub use transform::Transform;

/// Smallest intersection distance the renderer will report.
///
/// Chosen so that rays spawned from a hit point never re-intersect the
/// surface they originated from. Every intersection routine rejects
/// `t < EPSILON`.
pub const EPSILON: f32 = 1e-4;
