use crate::core::types::{Number, Point3, Transform, Vector3};
use crate::shape::{Shape, ShapeIntersection};
use crate::shared::aabb::Aabb;
use crate::shared::polynomial;
use crate::shared::ray::Ray;

/// A cone frustum from `y = -1` (radius `r1`) to `y = +1` (radius `r2`).
///
/// Closed cones are built as a union with two [`ConeCap`]s; see
/// [`Object::cone`](crate::object::Object::cone).
#[derive(Copy, Clone, Debug)]
pub struct Cone {
    pub r1: Number,
    pub r2: Number,
}

impl Shape for Cone {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        let (r1, r2) = (self.r1, self.r2);
        let (x0, n) = (ray.x0(), ray.n());

        // Solve (x0 + nx*t)^2 + (z0 + nz*t)^2
        //       == (((r2 - r1)*(y0 + ny*t) + r1 + r2)/2)^2
        let poly = [
            x0.x * x0.x + x0.z * x0.z - (x0.y * (r2 - r1) + r2 + r1) * (x0.y * (r2 - r1) + r2 + r1) / 4.0,
            2.0 * (n.x * x0.x + n.z * x0.z) - n.y * (r2 - r1) * (x0.y * (r2 - r1) + r2 + r1) / 2.0,
            n.x * n.x + n.z * n.z - n.y * n.y * (r2 - r1) * (r2 - r1) / 4.0,
        ];
        let roots = polynomial::solve(&poly);

        let mut t = *roots.first()?;
        let mut p = ray.at(t);
        if roots.len() == 2 && (p.y <= -1.0 || p.y >= 1.0) {
            // The near hit lands outside the [-1, 1] band; try the far wall
            t = roots[1];
            p = ray.at(t);
        }

        if p.y > -1.0 && p.y < 1.0 {
            let r = ((r2 - r1) * p.y + r1 + r2) / 2.0;
            let normal = Vector3::new(p.x, -r * (r2 - r1) / 2.0, p.z);
            Some(ShapeIntersection::local(t, normal))
        } else {
            None
        }
    }

    fn inside(&self, point: Point3) -> bool {
        let r = (point.y * (self.r2 - self.r1) + self.r1 + self.r2) / 2.0;
        point.x * point.x + point.z * point.z < r * r && point.y > -1.0 && point.y < 1.0
    }

    fn bound(&self, trans: &Transform) -> Aabb {
        let rmax = Number::max(self.r1, self.r2);
        Aabb::symmetric(Vector3::new(rmax, 1.0, rmax)).transformed(trans)
    }
}

/// A disc in the `y = 0` plane, capping an open cone or cylinder end
#[derive(Copy, Clone, Debug)]
pub struct ConeCap {
    pub r: Number,
}

impl Shape for ConeCap {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        let (x0, n) = (ray.x0(), ray.n());
        if n.y != 0.0 {
            let t = -x0.y / n.y;
            let p = ray.at(t);
            if t >= 0.0 && p.x * p.x + p.z * p.z <= self.r * self.r {
                return Some(ShapeIntersection::local(t, -Vector3::Y));
            }
        }
        None
    }

    fn inside(&self, _point: Point3) -> bool {
        false
    }

    fn bound(&self, trans: &Transform) -> Aabb {
        Aabb::symmetric(Vector3::new(self.r, 0.0, self.r)).transformed(trans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hits_the_waist() {
        // A symmetric double cone with waist radius 1 at y = 0
        let cone = Cone { r1: 1.0, r2: 1.0 };
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::Z);
        let hit = cone.intersect(&ray).expect("should hit");
        assert_relative_eq!(hit.t, 4.0);
    }

    #[test]
    fn misses_above_the_band() {
        let cone = Cone { r1: 1.0, r2: 1.0 };
        let ray = Ray::new(Point3::new(0.0, 2.0, -5.0), Vector3::Z);
        assert!(cone.intersect(&ray).is_none());
    }

    #[test]
    fn cap_catches_axial_rays() {
        let cap = ConeCap { r: 0.5 };
        let ray = Ray::new(Point3::new(0.25, -3.0, 0.0), Vector3::Y);
        let hit = cap.intersect(&ray).expect("should hit");
        assert_relative_eq!(hit.t, 3.0);
        assert_eq!(hit.normal, -Vector3::Y);
    }
}
