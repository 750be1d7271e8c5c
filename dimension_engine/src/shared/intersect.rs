use crate::core::types::{Number, Point3, Vector3};
use crate::object::Object;
use crate::shared::ray::Ray;

/// A ray-object intersection.
///
/// `t` is measured along the incident ray as given to
/// [`Object::intersection`]; affine ray transforms preserve the parameter, so
/// the world-space hit point is always `ray.at(t)`.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    /// Distance along `ray` at which the intersection occurred
    pub t: Number,
    /// World-space surface normal (normalised)
    pub normal: Vector3,
    /// The incident ray, in world space
    pub ray: Ray,
    /// The object that was hit; for CSG composites, the primitive child
    pub object: &'a Object,
}

impl<'a> Intersection<'a> {
    /// The world-space hit point, `ray.at(t)`
    pub fn position(&self) -> Point3 {
        self.ray.at(self.t)
    }
}
