use crate::core::types::{Point3, Transform, Vector3};
use crate::shape::{Shape, ShapeIntersection};
use crate::shared::aabb::Aabb;
use crate::shared::polynomial;
use crate::shared::ray::Ray;

/// The unit sphere at the origin
#[derive(Copy, Clone, Debug, Default)]
pub struct Sphere;

impl Shape for Sphere {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        // Solve (x0 + nx*t)^2 + (y0 + ny*t)^2 + (z0 + nz*t)^2 == 1
        let (x0, n) = (ray.x0(), ray.n());
        let poly = [x0.dot(x0) - 1.0, 2.0 * n.dot(x0), n.dot(n)];

        let t = *polynomial::solve(&poly).first()?;
        // The hit point doubles as the normal on a unit sphere
        Some(ShapeIntersection::local(t, ray.at(t)))
    }

    fn inside(&self, point: Point3) -> bool {
        point.length_squared() < 1.0
    }

    fn bound(&self, trans: &Transform) -> Aabb {
        // A tight bound from the quadric representation of the sphere:
        // per-axis centre c_i and half-extent sqrt(sum_j m[i][j]^2)
        let m = trans.matrix3;
        let rows = [
            Vector3::new(m.x_axis.x, m.y_axis.x, m.z_axis.x),
            Vector3::new(m.x_axis.y, m.y_axis.y, m.z_axis.y),
            Vector3::new(m.x_axis.z, m.y_axis.z, m.z_axis.z),
        ];
        let centre = trans.translation;
        let extent = Vector3::new(rows[0].length(), rows[1].length(), rows[2].length());
        Aabb::new(centre - extent, centre + extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vector3;
    use approx::assert_relative_eq;

    #[test]
    fn hits_head_on() {
        let ray = Ray::new(Point3::new(0.0, 0.0, -3.0), Vector3::Z);
        let hit = Sphere.intersect(&ray).expect("should hit");
        assert_relative_eq!(hit.t, 2.0);
        assert_relative_eq!(hit.normal.z, -1.0);
    }

    #[test]
    fn tangent_ray_grazes_once() {
        let ray = Ray::new(Point3::new(1.0, 0.0, -5.0), Vector3::Z);
        let hit = Sphere.intersect(&ray).expect("tangent hit");
        let p = ray.at(hit.t);
        assert_relative_eq!(p.length(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn misses_wide() {
        let ray = Ray::new(Point3::new(2.0, 0.0, -5.0), Vector3::Z);
        assert!(Sphere.intersect(&ray).is_none());
    }

    #[test]
    fn tight_bound_under_scaling() {
        let trans = Transform::from_scale(Vector3::new(2.0, 1.0, 3.0));
        let bound = Sphere.bound(&trans);
        assert_relative_eq!(bound.min().x, -2.0);
        assert_relative_eq!(bound.max().z, 3.0);
    }
}
