//! Texture evaluation: constant colors, procedural checkerboards and
//! filtered image lookups.

use std::sync::Arc;

use crate::{Color, ColorExt, Image, Properties, PropertyResult};
use lumen_math::Vec2;

/// A 2D texture evaluated at UV coordinates.
pub trait Texture: Send + Sync {
    /// The color of the texture at `uv`.
    fn evaluate(&self, uv: Vec2) -> Color;

    /// Scalar lookup in [0, 1], used for roughness, metallic and alpha maps.
    ///
    /// Defaults to the channel mean of [`Texture::evaluate`]; image textures
    /// override this with their alpha channel.
    fn scalar(&self, uv: Vec2) -> f32 {
        self.evaluate(uv).mean().clamp(0.0, 1.0)
    }
}

/// A texture returning a single stored color everywhere.
pub struct ConstantTexture {
    value: Color,
}

impl ConstantTexture {
    pub fn new(value: Color) -> Self {
        Self { value }
    }

    /// Convenience for scalar parameters (roughness, metallic, alpha).
    pub fn scalar_value(value: f32) -> Self {
        Self {
            value: Color::splat(value),
        }
    }

    pub fn from_properties(properties: &Properties) -> PropertyResult<Self> {
        Ok(Self::new(properties.get_color("value")?))
    }
}

impl Texture for ConstantTexture {
    fn evaluate(&self, _uv: Vec2) -> Color {
        self.value
    }
}

/// Alternating grid of two colors.
pub struct CheckerboardTexture {
    color0: Color,
    color1: Color,
    scale: Vec2,
}

impl CheckerboardTexture {
    pub fn new(color0: Color, color1: Color, scale: Vec2) -> Self {
        Self {
            color0,
            color1,
            scale,
        }
    }

    pub fn from_properties(properties: &Properties) -> PropertyResult<Self> {
        let color0 = properties.get_color_or("color0", Color::ZERO)?;
        let color1 = properties.get_color_or("color1", Color::ONE)?;
        let scale = if properties.has("scale") {
            let v = properties.get_vector("scale")?;
            Vec2::new(v.x, v.y)
        } else {
            Vec2::ONE
        };
        Ok(Self::new(color0, color1, scale))
    }
}

impl Texture for CheckerboardTexture {
    fn evaluate(&self, uv: Vec2) -> Color {
        let grid_x = (uv.x * self.scale.x).floor() as i64;
        let grid_y = (uv.y * self.scale.y).floor() as i64;

        if (grid_x + grid_y).rem_euclid(2) == 0 {
            self.color0
        } else {
            self.color1
        }
    }
}

/// How texel coordinates outside the image are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderMode {
    Clamp,
    Repeat,
}

/// Reconstruction filter for image lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Bilinear,
}

/// A filtered image texture with border handling and an exposure multiplier.
pub struct ImageTexture {
    image: Arc<Image>,
    exposure: f32,
    border: BorderMode,
    filter: FilterMode,
}

impl ImageTexture {
    pub fn new(image: Arc<Image>, exposure: f32, border: BorderMode, filter: FilterMode) -> Self {
        Self {
            image,
            exposure,
            border,
            filter,
        }
    }

    pub fn from_properties(properties: &Properties, image: Arc<Image>) -> PropertyResult<Self> {
        let exposure = properties.get_float_or("exposure", 1.0)?;
        let border = properties.get_enum(
            "border",
            BorderMode::Repeat,
            &[
                ("clamp", BorderMode::Clamp),
                ("repeat", BorderMode::Repeat),
            ],
        )?;
        let filter = properties.get_enum(
            "filter",
            FilterMode::Bilinear,
            &[
                ("nearest", FilterMode::Nearest),
                ("bilinear", FilterMode::Bilinear),
            ],
        )?;
        Ok(Self::new(image, exposure, border, filter))
    }

    /// Map UV in [0, 1]^2 onto continuous pixel coordinates.
    ///
    /// Subtracting 0.5 accounts for the pixel-center convention; v is
    /// flipped because image rows grow downward.
    fn pixel_coords(&self, uv: Vec2) -> (f32, f32) {
        let x = uv.x * self.image.width() as f32 - 0.5;
        let y = (1.0 - uv.y) * self.image.height() as f32 - 0.5;
        (x, y)
    }

    /// Apply the border mode to an integer texel coordinate.
    fn resolve(&self, coord: i64, size: u32) -> u32 {
        let size = size as i64;
        let resolved = match self.border {
            BorderMode::Clamp => coord.clamp(0, size - 1),
            BorderMode::Repeat => coord.rem_euclid(size),
        };
        resolved as u32
    }

    fn fetch(&self, x: i64, y: i64) -> [f32; 4] {
        let ix = self.resolve(x, self.image.width());
        let iy = self.resolve(y, self.image.height());
        self.image.texel(ix, iy)
    }

    fn sample_nearest(&self, x: f32, y: f32) -> [f32; 4] {
        self.fetch(x.round() as i64, y.round() as i64)
    }

    fn sample_bilinear(&self, x: f32, y: f32) -> [f32; 4] {
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let tx = x - x.floor();
        let ty = y - y.floor();

        let t00 = self.fetch(x0, y0);
        let t10 = self.fetch(x0 + 1, y0);
        let t01 = self.fetch(x0, y0 + 1);
        let t11 = self.fetch(x0 + 1, y0 + 1);

        let mut out = [0.0; 4];
        for c in 0..4 {
            let top = t00[c] * (1.0 - tx) + t10[c] * tx;
            let bottom = t01[c] * (1.0 - tx) + t11[c] * tx;
            out[c] = top * (1.0 - ty) + bottom * ty;
        }
        out
    }
}

impl Texture for ImageTexture {
    fn evaluate(&self, uv: Vec2) -> Color {
        let (x, y) = self.pixel_coords(uv);
        let texel = match self.filter {
            FilterMode::Nearest => self.sample_nearest(x, y),
            FilterMode::Bilinear => self.sample_bilinear(x, y),
        };
        Color::new(texel[0], texel[1], texel[2]) * self.exposure
    }

    /// Alpha channel, always bilinearly reconstructed.
    fn scalar(&self, uv: Vec2) -> f32 {
        let (x, y) = self.pixel_coords(uv);
        self.sample_bilinear(x, y)[3].clamp(0.0, 1.0)
    }
}
