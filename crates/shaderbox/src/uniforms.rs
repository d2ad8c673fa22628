use std::collections::HashMap;

use indexmap::IndexMap;

/// Uniform the host always declares and feeds from [`crate::ShaderBox::resize`].
pub const RESOLUTION_UNIFORM: &str = "iResolution";

/// Last value pushed for a float uniform, tagged with its arity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

impl UniformValue {
    /// Number of components (1-4).
    pub fn arity(&self) -> usize {
        self.as_slice().len()
    }

    pub fn as_slice(&self) -> &[f32] {
        match self {
            UniformValue::Float(value) => std::slice::from_ref(value),
            UniformValue::Vec2(value) => value,
            UniformValue::Vec3(value) => value,
            UniformValue::Vec4(value) => value,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(value: [f32; 2]) -> Self {
        UniformValue::Vec2(value)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(value: [f32; 3]) -> Self {
        UniformValue::Vec3(value)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(value: [f32; 4]) -> Self {
        UniformValue::Vec4(value)
    }
}

/// Declared uniforms in declaration order, their GPU locations, and the value
/// cache.
///
/// A declared name may lack a location (only `iResolution` is kept that way);
/// writes to it still land in the cache.
#[derive(Debug)]
pub(crate) struct UniformRegistry<L> {
    locations: IndexMap<String, Option<L>>,
    values: HashMap<String, UniformValue>,
}

impl<L> UniformRegistry<L> {
    pub fn new() -> Self {
        Self {
            locations: IndexMap::new(),
            values: HashMap::new(),
        }
    }

    /// Declares `name`. Re-declaring keeps the original position.
    pub fn declare(&mut self, name: &str, location: Option<L>) {
        self.locations.insert(name.to_string(), location);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }

    /// `None` when undeclared; `Some(None)` when declared without a location.
    pub fn location(&self, name: &str) -> Option<Option<&L>> {
        self.locations.get(name).map(Option::as_ref)
    }

    pub fn value(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    pub fn store(&mut self, name: &str, value: UniformValue) {
        match self.values.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(name.to_string(), value);
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.locations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn clear(&mut self) {
        self.locations.clear();
        self.values.clear();
    }
}

/// Caller-declared names followed by `iResolution` unless already listed.
pub(crate) fn declaration_order(requested: &[String]) -> Vec<&str> {
    let mut names: Vec<&str> = requested.iter().map(String::as_str).collect();
    if !names.contains(&RESOLUTION_UNIFORM) {
        names.push(RESOLUTION_UNIFORM);
    }
    names
}
