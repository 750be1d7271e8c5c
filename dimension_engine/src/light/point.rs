use crate::core::colour::Colour;
use crate::core::types::{Number, Point3, Vector3};
use crate::light::Light;

/// An isotropic point light
#[derive(Copy, Clone, Debug)]
pub struct PointLight {
    pub origin: Point3,
    pub colour: Colour,
}

impl PointLight {
    pub fn new(origin: Point3, colour: Colour) -> Self {
        Self { origin, colour }
    }
}

impl Light for PointLight {
    fn direction(&self, point: Point3) -> Vector3 {
        self.origin - point
    }

    fn illumination(&self, _point: Point3) -> Colour {
        self.colour
    }

    /// The feeler direction reaches exactly to the light, so only hits short
    /// of `t = 1` are in the way
    fn occludes(&self, t: Number) -> bool {
        t < 1.0
    }
}
