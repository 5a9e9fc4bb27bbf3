//! Decoded images: texture sources and render targets.
//!
//! Pixels are stored as linear RGBA floats in row-major order. LDR files are
//! converted from sRGB on load; PNG output applies the inverse transfer
//! curve, EXR output stays linear.

use std::path::Path;

use crate::Color;
use thiserror::Error;

/// Errors that can occur while loading or saving images.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image decoding error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("EXR error: {0}")]
    Exr(#[from] exr::error::Error),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
}

pub type ImageResult<T> = Result<T, ImageError>;

/// A linear RGBA float image.
#[derive(Clone, Debug)]
pub struct Image {
    width: u32,
    height: u32,
    /// `[R, G, B, A]` per pixel, row-major order.
    pixels: Vec<[f32; 4]>,
}

impl Image {
    /// Create a black, fully opaque image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0, 0.0, 0.0, 1.0]; (width * height) as usize],
        }
    }

    /// Create a 1x1 image of a single color.
    pub fn solid(color: Color) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![[color.x, color.y, color.z, 1.0]],
        }
    }

    /// Wrap existing pixel data. `pixels.len()` must equal `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<[f32; 4]>) -> Self {
        assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA texel at integer coordinates. Out-of-range reads return opaque black.
    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or([0.0, 0.0, 0.0, 1.0])
    }

    /// RGB texel as a [`Color`].
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Color {
        let p = self.texel(x, y);
        Color::new(p[0], p[1], p[2])
    }

    /// Overwrite one pixel, keeping it opaque.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = [color.x, color.y, color.z, 1.0];
    }

    /// Load an image from disk.
    ///
    /// `.exr` goes through the OpenEXR reader and stays linear; everything
    /// else decodes via the `image` crate with sRGB-to-linear conversion on
    /// the color channels (alpha is linear already).
    pub fn load(path: impl AsRef<Path>) -> ImageResult<Self> {
        let path = path.as_ref();
        let is_exr = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("exr"))
            .unwrap_or(false);

        let image = if is_exr {
            Self::load_exr(path)?
        } else {
            Self::load_ldr(path)?
        };
        log::debug!(
            "loaded image {} ({}x{})",
            path.display(),
            image.width,
            image.height
        );
        Ok(image)
    }

    fn load_ldr(path: &Path) -> ImageResult<Self> {
        let decoded = image::open(path)?.to_rgba8();
        let (width, height) = decoded.dimensions();

        let pixels = decoded
            .pixels()
            .map(|p| {
                [
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                    p[3] as f32 / 255.0,
                ]
            })
            .collect();

        Ok(Self::from_pixels(width, height, pixels))
    }

    fn load_exr(path: &Path) -> ImageResult<Self> {
        let loaded = exr::prelude::read_first_rgba_layer_from_file(
            path,
            |resolution, _channels| {
                Image::new(resolution.width() as u32, resolution.height() as u32)
            },
            |image, position, (r, g, b, a): (f32, f32, f32, f32)| {
                let index = position.y() * image.width as usize + position.x();
                image.pixels[index] = [r, g, b, a];
            },
        )?;
        Ok(loaded.layer_data.channel_data.pixels)
    }

    /// Save as OpenEXR, preserving the full dynamic range.
    pub fn save_exr(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        let path = path.as_ref();
        exr::prelude::write_rgb_file(
            path,
            self.width as usize,
            self.height as usize,
            |x, y| {
                let p = self.texel(x as u32, y as u32);
                (p[0], p[1], p[2])
            },
        )?;
        log::info!("HDR image saved as {}", path.display());
        Ok(())
    }

    /// Save as 8-bit PNG with the sRGB transfer curve applied.
    ///
    /// Values outside [0, 1] are clamped, so overexposed areas turn white.
    pub fn save_png(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        let path = path.as_ref();
        let encoded = image::ImageBuffer::from_fn(self.width, self.height, |x, y| {
            let p = self.texel(x, y);
            image::Rgb([
                (linear_to_srgb(p[0].clamp(0.0, 1.0)) * 255.0) as u8,
                (linear_to_srgb(p[1].clamp(0.0, 1.0)) * 255.0) as u8,
                (linear_to_srgb(p[2].clamp(0.0, 1.0)) * 255.0) as u8,
            ])
        });
        encoded.save(path)?;
        log::info!("image saved as {}", path.display());
        Ok(())
    }
}

/// Convert an sRGB byte value to a linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert a linear float in [0, 1] to the sRGB transfer curve.
fn linear_to_srgb(linear: f32) -> f32 {
    if linear <= 0.0 {
        0.0
    } else if linear <= 0.0031308 {
        12.92 * linear
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_image() {
        let img = Image::solid(Color::new(1.0, 0.5, 0.0));
        assert_eq!(img.width(), 1);
        assert_eq!(img.get(0, 0), Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_set_get_roundtrip() {
        let mut img = Image::new(4, 2);
        img.set(3, 1, Color::new(0.25, 0.5, 0.75));
        assert_eq!(img.get(3, 1), Color::new(0.25, 0.5, 0.75));
        assert_eq!(img.get(0, 0), Color::ZERO);
    }

    #[test]
    fn test_out_of_range_texel_is_black() {
        let img = Image::new(2, 2);
        assert_eq!(img.texel(10, 10), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_srgb_endpoints() {
        assert!((srgb_to_linear(0) - 0.0).abs() < 1e-6);
        assert!((srgb_to_linear(255) - 1.0).abs() < 1e-4);

        // Mid-gray is darker in linear space.
        let mid = srgb_to_linear(128);
        assert!(mid > 0.1 && mid < 0.5);
    }

    #[test]
    fn test_srgb_roundtrip() {
        for v in [0.0f32, 0.002, 0.1, 0.5, 0.9, 1.0] {
            let back = srgb_to_linear((linear_to_srgb(v) * 255.0).round() as u8);
            assert!((back - v).abs() < 0.01, "v = {v}, back = {back}");
        }
    }
}
