use crate::core::types::Number;
use std::sync::Arc;

/// Properties of the inside of an object
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Interior {
    /// Index of refraction, at least 1.0
    pub ior: Number,
}

impl Default for Interior {
    fn default() -> Self {
        Self { ior: 1.0 }
    }
}

impl Interior {
    pub fn new(ior: Number) -> Self {
        Self { ior }
    }
}

/// Cascades a parent interior into an empty child slot
pub fn cascade(parent: Option<&Arc<Interior>>, child: &mut Option<Arc<Interior>>) {
    if child.is_none() {
        *child = parent.cloned();
    }
}
