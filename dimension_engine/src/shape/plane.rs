use crate::core::types::{Point3, Transform, Vector3};
use crate::shape::{Shape, ShapeIntersection};
use crate::shared::aabb::Aabb;
use crate::shared::ray::Ray;

/// The half-space boundary through the origin with the given normal.
///
/// Everything on the far side of the normal counts as inside, which also
/// makes planes useful as "universe" operands for CSG.
#[derive(Copy, Clone, Debug)]
pub struct Plane {
    pub normal: Vector3,
}

impl Plane {
    pub fn new(normal: Vector3) -> Self {
        Self { normal }
    }
}

impl Shape for Plane {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        let den = ray.n().dot(self.normal);
        if den != 0.0 {
            let t = -ray.x0().dot(self.normal) / den;
            if t >= 0.0 {
                return Some(ShapeIntersection::local(t, self.normal));
            }
        }
        None
    }

    fn inside(&self, point: Point3) -> bool {
        point.dot(self.normal) < 0.0
    }

    fn bound(&self, _trans: &Transform) -> Aabb {
        Aabb::INFINITE
    }
}
