//! Shared assets for the lumen renderer.
//!
//! Everything here is constructed at scene-load time and immutable while
//! rendering: colors, typed property maps, decoded images and the texture
//! suite. Render threads read these types without synchronization.

mod color;
mod image;
mod properties;
pub mod texture;

pub use crate::image::{Image, ImageError};
pub use color::{Color, ColorExt};
pub use properties::{Properties, PropertyError, PropertyResult, Value};
pub use texture::{
    BorderMode, CheckerboardTexture, ConstantTexture, FilterMode, ImageTexture, Texture,
};
