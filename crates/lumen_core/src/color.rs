use lumen_math::Vec3;

/// Linear RGB radiance/reflectance triple.
pub type Color = Vec3;

/// Color-flavored helpers on top of the plain vector type.
pub trait ColorExt {
    /// Arithmetic mean of the three channels.
    fn mean(self) -> f32;

    /// Perceived brightness of the color.
    fn luminance(self) -> f32;

    /// True when every channel is exactly zero.
    fn is_black(self) -> bool;
}

impl ColorExt for Color {
    fn mean(self) -> f32 {
        (self.x + self.y + self.z) / 3.0
    }

    fn luminance(self) -> f32 {
        self.dot(Vec3::new(0.2126, 0.7152, 0.0722))
    }

    fn is_black(self) -> bool {
        self == Vec3::ZERO
    }
}
