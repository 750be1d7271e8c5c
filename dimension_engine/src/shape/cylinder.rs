use crate::core::types::{Number, Point3, Transform, Vector3};
use crate::shape::{Shape, ShapeIntersection};
use crate::shared::aabb::Aabb;
use crate::shared::polynomial;
use crate::shared::ray::Ray;

/// An open cylinder of the given radius from `y = -1` to `y = +1`.
///
/// Closed cylinders are built as a union with two
/// [`ConeCap`](crate::shape::cone::ConeCap)s; see
/// [`Object::cylinder`](crate::object::Object::cylinder).
#[derive(Copy, Clone, Debug)]
pub struct Cylinder {
    pub r: Number,
}

impl Shape for Cylinder {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        let (x0, n) = (ray.x0(), ray.n());

        // Solve (x0 + nx*t)^2 + (z0 + nz*t)^2 == r^2
        let poly = [
            x0.x * x0.x + x0.z * x0.z - self.r * self.r,
            2.0 * (n.x * x0.x + n.z * x0.z),
            n.x * n.x + n.z * n.z,
        ];
        let roots = polynomial::solve(&poly);

        let mut t = *roots.first()?;
        let mut p = ray.at(t);
        if roots.len() == 2 && (p.y <= -1.0 || p.y >= 1.0) {
            t = roots[1];
            p = ray.at(t);
        }

        if p.y > -1.0 && p.y < 1.0 {
            Some(ShapeIntersection::local(t, Vector3::new(p.x, 0.0, p.z)))
        } else {
            None
        }
    }

    fn inside(&self, point: Point3) -> bool {
        point.x * point.x + point.z * point.z < self.r * self.r && point.y > -1.0 && point.y < 1.0
    }

    fn bound(&self, trans: &Transform) -> Aabb {
        Aabb::symmetric(Vector3::new(self.r, 1.0, self.r)).transformed(trans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hits_the_wall() {
        let cylinder = Cylinder { r: 2.0 };
        let ray = Ray::new(Point3::new(0.0, 0.5, -5.0), Vector3::Z);
        let hit = cylinder.intersect(&ray).expect("should hit");
        assert_relative_eq!(hit.t, 3.0);
        assert_relative_eq!(hit.normal.z, -2.0);
    }

    #[test]
    fn open_ends_pass_axial_rays() {
        let cylinder = Cylinder { r: 2.0 };
        let ray = Ray::new(Point3::new(0.0, -5.0, 0.0), Vector3::Y);
        assert!(cylinder.intersect(&ray).is_none());
    }
}
