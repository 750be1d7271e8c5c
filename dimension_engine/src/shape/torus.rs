use crate::core::types::{Number, Point3, Transform, Vector3};
use crate::shape::{Shape, ShapeIntersection};
use crate::shared::aabb::Aabb;
use crate::shared::polynomial;
use crate::shared::ray::Ray;

/// A torus in the `xy`-plane: the circle of radius `major` about the origin,
/// swept by a tube of radius `minor`. The hole runs along the `z` axis.
///
/// The only quartic in the shape set; a cheap cylindrical-shell test rejects
/// most rays before the quartic is solved.
#[derive(Copy, Clone, Debug)]
pub struct Torus {
    pub major: Number,
    pub minor: Number,
}

impl Torus {
    /// Tests the ray against the torus's bounding cylindrical shell
    fn shell_intersection(&self, ray: &Ray) -> bool {
        let (big_r, r) = (self.major, self.minor);
        let (rmax, rmin) = (big_r + r, big_r - r);
        let (rmax2, rmin2) = (rmax * rmax, rmin * rmin);
        let (x0, n) = (ray.x0(), ray.n());

        // Try the caps first
        let tlower = (-r - x0.z) / n.z;
        let tupper = (r - x0.z) / n.z;
        let lower = ray.at(tlower);
        let upper = ray.at(tupper);
        let ldist2 = lower.x * lower.x + lower.y * lower.y;
        let udist2 = upper.x * upper.x + upper.y * upper.y;
        if (ldist2 >= rmin2 && ldist2 <= rmax2) || (udist2 >= rmin2 && udist2 <= rmax2) {
            return true;
        }

        // No valid intersection with the caps; try the shell walls
        let dist2 = x0.x * x0.x + x0.y * x0.y;
        let quadratic = n.x * n.x + n.y * n.y;
        let linear = 2.0 * (n.x * x0.x + n.y * x0.y);
        let mut candidates = polynomial::solve(&[dist2 - rmax2, linear, quadratic]);
        candidates.extend(polynomial::solve(&[dist2 - rmin2, linear, quadratic]));

        candidates.iter().any(|&t| {
            let p = ray.at(t);
            p.z >= -r && p.z <= r
        })
    }
}

impl Shape for Torus {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        if !self.shell_intersection(ray) {
            return None;
        }

        let (big_r, r) = (self.major, self.minor);
        let (rr_maj, rr_min) = (big_r * big_r, r * r);
        let (x0, n) = (ray.x0(), ray.n());

        // ((x^2 + y^2 + z^2) + R^2 - r^2)^2 == 4 R^2 (x^2 + y^2), expanded
        // along the ray. The "mod" vectors negate the axis component.
        let x0mod = Vector3::new(x0.x, x0.y, -x0.z);
        let nmod = Vector3::new(n.x, n.y, -n.z);
        let nn = n.dot(n);
        let nx0 = n.dot(x0);
        let x0x0 = x0.dot(x0);
        let x0x0mod = x0.dot(x0mod);
        let nx0mod = n.dot(x0mod);
        let nnmod = n.dot(nmod);

        let poly = [
            x0x0 * x0x0 + rr_maj * (rr_maj - 2.0 * x0x0mod) - rr_min * (2.0 * (rr_maj + x0x0) - rr_min),
            4.0 * (nx0 * (x0x0 - rr_min) - rr_maj * nx0mod),
            2.0 * (nn * (x0x0 - rr_min) + 2.0 * nx0 * nx0 - rr_maj * nnmod),
            4.0 * nn * nx0,
            nn * nn,
        ];

        let t = *polynomial::solve(&poly).first()?;
        let p = ray.at(t);
        let centre = Vector3::new(p.x, p.y, 0.0).normalize() * big_r;
        Some(ShapeIntersection::local(t, p - centre))
    }

    fn inside(&self, point: Point3) -> bool {
        let dmajor = self.major - (point.x * point.x + point.y * point.y).sqrt();
        dmajor * dmajor + point.z * point.z < self.minor * self.minor
    }

    fn bound(&self, trans: &Transform) -> Aabb {
        let extent = self.major + self.minor;
        Aabb::symmetric(Vector3::new(extent, extent, self.minor)).transformed(trans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TORUS: Torus = Torus { major: 2.0, minor: 0.5 };

    #[test]
    fn ray_through_the_hole_misses() {
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::Z);
        assert!(TORUS.intersect(&ray).is_none());
    }

    #[test]
    fn offset_ray_hits_the_tube() {
        let ray = Ray::new(Point3::new(2.0, 0.0, -5.0), Vector3::Z);
        let hit = TORUS.intersect(&ray).expect("should hit");
        assert_relative_eq!(hit.t, 4.5, epsilon = 1e-6);
    }

    #[test]
    fn inside_the_tube() {
        assert!(TORUS.inside(Point3::new(2.0, 0.0, 0.1)));
        assert!(!TORUS.inside(Point3::ZERO));
        assert!(!TORUS.inside(Point3::new(2.0, 0.0, 0.6)));
    }
}
