//! Shape geometry.
//!
//! Every shape is defined in a canonical local frame (unit sphere at the
//! origin, cube `[-1, 1]^3`, cone from `y = -1` to `y = +1`, ...); the engine
//! transforms rays into local space before querying a shape, and maps normals
//! back with the inverse-transpose. The shape set is closed and dispatched
//! statically; [`DynamicShape`] is the escape hatch for anything else.

use crate::core::types::{Number, Point3, Transform, Vector3};
use crate::object::Object;
use crate::shared::aabb::Aabb;
use crate::shared::ray::Ray;
use enum_dispatch::enum_dispatch;

// noinspection: used by the enum_dispatch macro
#[allow(unused_imports)]
use self::{
    cone::{Cone, ConeCap},
    csg::{CsgDifference, CsgIntersection, CsgMerge, Union},
    cube::Cube,
    cylinder::Cylinder,
    dynamic::DynamicShape,
    plane::Plane,
    sphere::Sphere,
    torus::Torus,
    triangle::{SmoothTriangle, Triangle},
    triangle_fan::{SmoothTriangleFan, TriangleFan},
};

pub mod cone;
pub mod csg;
pub mod cube;
pub mod cylinder;
pub mod dynamic;
pub mod plane;
pub mod sphere;
pub mod torus;
pub mod triangle;
pub mod triangle_fan;

/// The result of a shape intersection query.
///
/// For primitives, `t` and `normal` are in the shape's local frame and
/// `child` is `None`; CSG shapes return fully world-resolved hits against one
/// of their children.
#[derive(Copy, Clone, Debug)]
pub struct ShapeIntersection<'a> {
    pub t: Number,
    pub normal: Vector3,
    pub child: Option<&'a Object>,
}

impl ShapeIntersection<'_> {
    /// A primitive hit, in shape-local space
    pub fn local(t: Number, normal: Vector3) -> Self {
        Self { t, normal, child: None }
    }
}

/// The capability set every shape provides
#[enum_dispatch]
pub trait Shape {
    /// The nearest intersection with a ray at `t > 0`, if any.
    ///
    /// The ray is in shape-local coordinates (for CSG shapes, whose
    /// transforms are spent on their children at precompute, this coincides
    /// with the parent frame).
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>>;

    /// Whether a local-space point lies strictly inside the shape
    fn inside(&self, point: Point3) -> bool;

    /// A world-space bound of the shape under the given combined transform.
    ///
    /// CSG shapes derive their bound from their already-precomputed children
    /// and ignore the transform.
    fn bound(&self, trans: &Transform) -> Aabb;
}

#[enum_dispatch(Shape)]
#[derive(Clone, Debug)]
pub enum ShapeInstance {
    Sphere,
    Cube,
    Plane,
    Cone,
    ConeCap,
    Cylinder,
    Torus,
    Triangle,
    SmoothTriangle,
    TriangleFan,
    SmoothTriangleFan,
    Union,
    CsgIntersection,
    CsgDifference,
    CsgMerge,
    DynamicShape,
}
