//! Typed property maps handed to plugin constructors.
//!
//! Scene descriptions are parsed outside the core; the parser produces one
//! `Properties` per object, and the object's `from_properties` constructor
//! pulls out typed values by name. Getters come in two flavors: required
//! (missing key is an error) and defaulting.

use std::collections::HashMap;
use std::sync::Arc;

use crate::texture::Texture;
use crate::Color;
use lumen_math::{Transform, Vec3};
use thiserror::Error;

/// Errors produced while reading a [`Properties`] map.
#[derive(Error, Debug)]
pub enum PropertyError {
    #[error("missing required property '{0}'")]
    Missing(String),

    #[error("property '{name}' has the wrong type (expected {expected})")]
    TypeMismatch { name: String, expected: &'static str },

    #[error("property '{name}' has unknown value '{value}'")]
    UnknownVariant { name: String, value: String },
}

pub type PropertyResult<T> = Result<T, PropertyError>;

/// A single typed property value.
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Float(f32),
    Color(Color),
    Vector(Vec3),
    Text(String),
    Transform(Transform),
    Texture(Arc<dyn Texture>),
}

/// A name-to-value map describing one scene object.
#[derive(Clone, Default)]
pub struct Properties {
    values: HashMap<String, Value>,
}

impl Properties {
    /// Create an empty property map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous one under the same name.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.values.insert(name.into(), value);
        self
    }

    /// True when a property of the given name exists.
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn raw(&self, name: &str) -> PropertyResult<&Value> {
        self.values
            .get(name)
            .ok_or_else(|| PropertyError::Missing(name.to_string()))
    }

    fn mismatch(name: &str, expected: &'static str) -> PropertyError {
        PropertyError::TypeMismatch {
            name: name.to_string(),
            expected,
        }
    }

    /// Required boolean.
    pub fn get_bool(&self, name: &str) -> PropertyResult<bool> {
        match self.raw(name)? {
            Value::Bool(b) => Ok(*b),
            _ => Err(Self::mismatch(name, "bool")),
        }
    }

    /// Boolean with a default.
    pub fn get_bool_or(&self, name: &str, default: bool) -> PropertyResult<bool> {
        if self.has(name) {
            self.get_bool(name)
        } else {
            Ok(default)
        }
    }

    /// Required integer. Floats are not silently truncated.
    pub fn get_int(&self, name: &str) -> PropertyResult<i32> {
        match self.raw(name)? {
            Value::Int(i) => Ok(*i),
            _ => Err(Self::mismatch(name, "int")),
        }
    }

    /// Integer with a default.
    pub fn get_int_or(&self, name: &str, default: i32) -> PropertyResult<i32> {
        if self.has(name) {
            self.get_int(name)
        } else {
            Ok(default)
        }
    }

    /// Required float. Integers widen implicitly.
    pub fn get_float(&self, name: &str) -> PropertyResult<f32> {
        match self.raw(name)? {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f32),
            _ => Err(Self::mismatch(name, "float")),
        }
    }

    /// Float with a default.
    pub fn get_float_or(&self, name: &str, default: f32) -> PropertyResult<f32> {
        if self.has(name) {
            self.get_float(name)
        } else {
            Ok(default)
        }
    }

    /// Required color. A lone float spreads across all channels.
    pub fn get_color(&self, name: &str) -> PropertyResult<Color> {
        match self.raw(name)? {
            Value::Color(c) => Ok(*c),
            Value::Float(f) => Ok(Color::splat(*f)),
            _ => Err(Self::mismatch(name, "color")),
        }
    }

    /// Color with a default.
    pub fn get_color_or(&self, name: &str, default: Color) -> PropertyResult<Color> {
        if self.has(name) {
            self.get_color(name)
        } else {
            Ok(default)
        }
    }

    /// Required vector.
    pub fn get_vector(&self, name: &str) -> PropertyResult<Vec3> {
        match self.raw(name)? {
            Value::Vector(v) => Ok(*v),
            _ => Err(Self::mismatch(name, "vector")),
        }
    }

    /// Required string.
    pub fn get_str(&self, name: &str) -> PropertyResult<&str> {
        match self.raw(name)? {
            Value::Text(s) => Ok(s),
            _ => Err(Self::mismatch(name, "string")),
        }
    }

    /// String with a default.
    pub fn get_str_or<'a>(&'a self, name: &str, default: &'a str) -> PropertyResult<&'a str> {
        if self.has(name) {
            self.get_str(name)
        } else {
            Ok(default)
        }
    }

    /// Required texture sub-object.
    pub fn get_texture(&self, name: &str) -> PropertyResult<Arc<dyn Texture>> {
        match self.raw(name)? {
            Value::Texture(t) => Ok(t.clone()),
            _ => Err(Self::mismatch(name, "texture")),
        }
    }

    /// Optional texture sub-object.
    pub fn get_texture_opt(&self, name: &str) -> PropertyResult<Option<Arc<dyn Texture>>> {
        if self.has(name) {
            self.get_texture(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Optional transform sub-object.
    pub fn get_transform_opt(&self, name: &str) -> PropertyResult<Option<Transform>> {
        if !self.has(name) {
            return Ok(None);
        }
        match self.raw(name)? {
            Value::Transform(t) => Ok(Some(*t)),
            _ => Err(Self::mismatch(name, "transform")),
        }
    }

    /// Map a string property onto one of a closed set of variants.
    pub fn get_enum<T: Copy>(
        &self,
        name: &str,
        default: T,
        variants: &[(&str, T)],
    ) -> PropertyResult<T> {
        if !self.has(name) {
            return Ok(default);
        }
        let text = self.get_str(name)?;
        variants
            .iter()
            .find(|(key, _)| *key == text)
            .map(|(_, v)| *v)
            .ok_or_else(|| PropertyError::UnknownVariant {
                name: name.to_string(),
                value: text.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_and_default_getters() {
        let mut props = Properties::new();
        props.set("density", Value::Float(1.5));
        props.set("depth", Value::Int(8));

        assert_eq!(props.get_float("density").unwrap(), 1.5);
        assert_eq!(props.get_int("depth").unwrap(), 8);
        assert_eq!(props.get_int_or("depth", 2).unwrap(), 8);
        assert_eq!(props.get_int_or("missing", 2).unwrap(), 2);
        assert!(matches!(
            props.get_float("missing"),
            Err(PropertyError::Missing(_))
        ));
    }

    #[test]
    fn test_int_widens_to_float() {
        let mut props = Properties::new();
        props.set("fov", Value::Int(45));
        assert_eq!(props.get_float("fov").unwrap(), 45.0);
    }

    #[test]
    fn test_scalar_spreads_to_color() {
        let mut props = Properties::new();
        props.set("albedo", Value::Float(0.5));
        assert_eq!(props.get_color("albedo").unwrap(), Color::splat(0.5));
    }

    #[test]
    fn test_type_mismatch() {
        let mut props = Properties::new();
        props.set("name", Value::Text("sphere".into()));
        assert!(matches!(
            props.get_float("name"),
            Err(PropertyError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_enum_lookup() {
        #[derive(Copy, Clone, PartialEq, Debug)]
        enum Axis {
            X,
            Y,
        }

        let mut props = Properties::new();
        props.set("fovAxis", Value::Text("y".into()));

        let axis = props
            .get_enum("fovAxis", Axis::X, &[("x", Axis::X), ("y", Axis::Y)])
            .unwrap();
        assert_eq!(axis, Axis::Y);

        let missing = props
            .get_enum("border", Axis::X, &[("x", Axis::X), ("y", Axis::Y)])
            .unwrap();
        assert_eq!(missing, Axis::X);

        props.set("fovAxis", Value::Text("diagonal".into()));
        assert!(matches!(
            props.get_enum("fovAxis", Axis::X, &[("x", Axis::X), ("y", Axis::Y)]),
            Err(PropertyError::UnknownVariant { .. })
        ));
    }
}
