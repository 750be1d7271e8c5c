use crate::core::types::{Point3, Transform, Vector3};
use crate::shape::{Shape, ShapeIntersection};
use crate::shared::aabb::Aabb;
use crate::shared::ray::Ray;

/// The axis-aligned cube spanning `[-1, 1]^3`
#[derive(Copy, Clone, Debug, Default)]
pub struct Cube;

impl Shape for Cube {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        // Clip the ray against the X, Y, and Z slabs, tracking the surface
        // normal of each clipping plane
        let (x0, n) = (ray.x0(), ray.n());

        let tx1 = (-1.0 - x0.x) / n.x;
        let tx2 = (1.0 - x0.x) / n.x;

        let (mut tmin, mut tmax, mut nmin, mut nmax);
        if tx1 < tx2 {
            tmin = tx1;
            tmax = tx2;
            nmin = -Vector3::X;
            nmax = Vector3::X;
        } else {
            tmin = tx2;
            tmax = tx1;
            nmin = Vector3::X;
            nmax = -Vector3::X;
        }

        if tmin > tmax {
            return None;
        }

        let ty1 = (-1.0 - x0.y) / n.y;
        let ty2 = (1.0 - x0.y) / n.y;

        if ty1 < ty2 {
            if ty1 > tmin {
                tmin = ty1;
                nmin = -Vector3::Y;
            }
            if ty2 < tmax {
                tmax = ty2;
                nmax = Vector3::Y;
            }
        } else {
            if ty2 > tmin {
                tmin = ty2;
                nmin = Vector3::Y;
            }
            if ty1 < tmax {
                tmax = ty1;
                nmax = -Vector3::Y;
            }
        }

        if tmin > tmax {
            return None;
        }

        let tz1 = (-1.0 - x0.z) / n.z;
        let tz2 = (1.0 - x0.z) / n.z;

        if tz1 < tz2 {
            if tz1 > tmin {
                tmin = tz1;
                nmin = -Vector3::Z;
            }
            if tz2 < tmax {
                tmax = tz2;
                nmax = Vector3::Z;
            }
        } else {
            if tz2 > tmin {
                tmin = tz2;
                nmin = Vector3::Z;
            }
            if tz1 < tmax {
                tmax = tz1;
                nmax = -Vector3::Z;
            }
        }

        if tmin > tmax {
            return None;
        }

        // A ray starting inside the cube exits through the far face
        if tmin < 0.0 {
            tmin = tmax;
            nmin = nmax;
        }

        if tmin >= 0.0 {
            Some(ShapeIntersection::local(tmin, nmin))
        } else {
            None
        }
    }

    fn inside(&self, point: Point3) -> bool {
        point.x > -1.0 && point.x < 1.0 && point.y > -1.0 && point.y < 1.0 && point.z > -1.0 && point.z < 1.0
    }

    fn bound(&self, trans: &Transform) -> Aabb {
        Aabb::symmetric(Vector3::ONE).transformed(trans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hits_front_face() {
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::Z);
        let hit = Cube.intersect(&ray).expect("should hit");
        assert_relative_eq!(hit.t, 4.0);
        assert_eq!(hit.normal, -Vector3::Z);
    }

    #[test]
    fn exits_through_far_face_from_inside() {
        let ray = Ray::new(Point3::ZERO, Vector3::Z);
        let hit = Cube.intersect(&ray).expect("should hit");
        assert_relative_eq!(hit.t, 1.0);
        assert_eq!(hit.normal, Vector3::Z);
    }

    #[test]
    fn misses_alongside() {
        let ray = Ray::new(Point3::new(3.0, 0.0, -5.0), Vector3::Z);
        assert!(Cube.intersect(&ray).is_none());
    }
}
