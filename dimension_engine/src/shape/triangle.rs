use crate::core::types::{Number, Point3, Transform, Vector3};
use crate::shape::{Shape, ShapeIntersection};
use crate::shared::aabb::Aabb;
use crate::shared::ray::Ray;

/// The canonical ray/triangle test, against the triangle with corners
/// `(0,0)`, `(1,0)` and `(0,1)` in the local `xy` plane.
///
/// Returns `(t, u, v)` with `u`, `v` the barycentric coordinates.
pub(crate) fn ray_triangle_intersection(ray: &Ray) -> Option<(Number, Number, Number)> {
    let (x0, n) = (ray.x0(), ray.n());
    let t = -x0.z / n.z;
    let u = x0.x + t * n.x;
    let v = x0.y + t * n.y;
    if t >= 0.0 && u >= 0.0 && v >= 0.0 && u + v <= 1.0 {
        Some((t, u, v))
    } else {
        None
    }
}

/// Makes the change-of-basis matrix taking the canonical triangle onto the
/// triangle `a`, `a + ab`, `a + ac`: the basis `(ab, ac, ab x ac)` at `a`
pub(crate) fn triangle_basis(a: Vector3, ab: Vector3, ac: Vector3) -> Transform {
    Transform::from_cols(ab, ac, ab.cross(ac), a)
}

/// A flat triangle. The geometry lives entirely in the object's intrinsic
/// change-of-basis transform; see
/// [`Object::triangle`](crate::object::Object::triangle).
#[derive(Copy, Clone, Debug, Default)]
pub struct Triangle;

impl Shape for Triangle {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        let (t, _, _) = ray_triangle_intersection(ray)?;
        Some(ShapeIntersection::local(t, Vector3::Z))
    }

    fn inside(&self, _point: Point3) -> bool {
        false
    }

    fn bound(&self, trans: &Transform) -> Aabb {
        bound_canonical_triangle(trans)
    }
}

/// A triangle with per-vertex normals, stored in the canonical basis as
/// `na`, `nab = nb - na`, `nac = nc - na`; the surface normal at `(u, v)` is
/// `na + u*nab + v*nac`
#[derive(Copy, Clone, Debug)]
pub struct SmoothTriangle {
    pub na: Vector3,
    pub nab: Vector3,
    pub nac: Vector3,
}

impl Shape for SmoothTriangle {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        let (t, u, v) = ray_triangle_intersection(ray)?;
        Some(ShapeIntersection::local(t, self.na + self.nab * u + self.nac * v))
    }

    fn inside(&self, _point: Point3) -> bool {
        false
    }

    fn bound(&self, trans: &Transform) -> Aabb {
        bound_canonical_triangle(trans)
    }
}

/// Bounds the canonical triangle's three corners under `trans`
pub(crate) fn bound_canonical_triangle(trans: &Transform) -> Aabb {
    let a = trans.transform_point3(Point3::ZERO);
    let b = trans.transform_point3(Point3::X);
    let c = trans.transform_point3(Point3::Y);
    Aabb::new(a, a).swallow(b).swallow(c)
}
