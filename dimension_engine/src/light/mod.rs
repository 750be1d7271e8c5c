//! Light sources.
//!
//! A light answers three questions about a surface point: which way the
//! shadow feeler points, what colour arrives there, and whether a hit along
//! the feeler at a given `t` actually occludes the light.

use crate::core::colour::Colour;
use crate::core::types::{Number, Point3, Vector3};
use enum_dispatch::enum_dispatch;

pub mod point;

#[allow(unused_imports)]
use self::point::PointLight;

#[enum_dispatch]
pub trait Light {
    /// The un-normalised direction of the shadow feeler from `point` toward
    /// the light
    fn direction(&self, point: Point3) -> Vector3;

    /// The light's colour as seen from `point`
    fn illumination(&self, point: Point3) -> Colour;

    /// Whether an intersection at `t` along the feeler blocks the light
    fn occludes(&self, t: Number) -> bool;
}

#[enum_dispatch(Light)]
#[derive(Clone, Debug)]
pub enum LightInstance {
    PointLight,
}
