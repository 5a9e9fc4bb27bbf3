//! Per-worker random number generation.
//!
//! Each render task owns one `Sampler`; samplers are never shared across
//! threads. Seeding is deterministic per tile so renders are reproducible.

use lumen_math::Vec2;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// A stream of uniform random numbers for one worker.
pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    /// Create a sampler from an explicit seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Next uniform f32 in [0, 1).
    ///
    /// Built from the top 24 bits of a draw so the result is exactly
    /// representable and strictly below 1.
    #[inline]
    pub fn next(&mut self) -> f32 {
        let bits = self.rng.next_u32();
        (bits >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
    }

    /// Next uniform point in [0, 1)^2.
    #[inline]
    pub fn next_2d(&mut self) -> Vec2 {
        Vec2::new(self.next(), self.next())
    }
}
