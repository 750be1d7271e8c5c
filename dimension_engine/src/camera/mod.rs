//! Cameras: functions from normalised image coordinates to world rays.

use crate::core::types::Number;
use crate::shared::ray::Ray;
use enum_dispatch::enum_dispatch;

pub mod perspective;

#[allow(unused_imports)]
use self::perspective::PerspectiveCamera;

#[enum_dispatch]
pub trait Camera {
    /// The world-space ray through the image point `(x, y)`, both in
    /// `[0, 1]` with the origin at the bottom-left
    fn camera_ray(&self, x: Number, y: Number) -> Ray;
}

#[enum_dispatch(Camera)]
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum CameraInstance {
    PerspectiveCamera,
}
