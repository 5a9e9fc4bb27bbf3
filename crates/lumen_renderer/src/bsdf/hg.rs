use std::f32::consts::PI;

use crate::bsdf::{Bsdf, BsdfEval, BsdfSample};
use crate::Sampler;
use lumen_core::{Color, Properties, PropertyResult};
use lumen_math::{Frame, Vec2, Vec3};

/// Henyey-Greenstein phase function, the scattering model of volume
/// primitives. `g` in (-1, 1) steers between back- (negative) and
/// forward-scattering (positive); `g = 0` is isotropic.
pub struct HenyeyGreenstein {
    g: f32,
    albedo: Color,
}

impl HenyeyGreenstein {
    pub fn new(g: f32, albedo: Color) -> Self {
        Self { g, albedo }
    }

    pub fn from_properties(properties: &Properties) -> PropertyResult<Self> {
        Ok(Self::new(
            properties.get_float("g")?,
            properties.get_color("albedo")?,
        ))
    }
}

impl Bsdf for HenyeyGreenstein {
    fn evaluate(&self, _uv: Vec2, wo: Vec3, wi: Vec3) -> BsdfEval {
        let cos_theta = wo.dot(wi);

        let denom = (1.0 + self.g * self.g + 2.0 * self.g * cos_theta).max(1e-5);
        let phase = (1.0 - self.g * self.g) / (4.0 * PI * denom.powf(1.5));

        BsdfEval {
            value: self.albedo * phase,
        }
    }

    fn sample(&self, _uv: Vec2, wo: Vec3, sampler: &mut Sampler) -> BsdfSample {
        let u = sampler.next_2d();

        // Inverse CDF of the phase function; isotropic branch avoids the
        // division blowup for tiny g.
        let cos_theta = if self.g.abs() < 1e-3 {
            1.0 - 2.0 * u.x
        } else {
            let sqr_term = (1.0 - self.g * self.g) / (1.0 + self.g - 2.0 * self.g * u.x);
            (1.0 + self.g * self.g - sqr_term * sqr_term) / (2.0 * self.g)
        };

        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = 2.0 * PI * u.y;
        let local = Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);

        // Forward scattering continues along -wo.
        let wi = Frame::new(-wo).to_world(local);

        // Sampled exactly from the phase function, so phase/pdf cancels.
        BsdfSample {
            wi,
            weight: self.albedo,
        }
    }
}
