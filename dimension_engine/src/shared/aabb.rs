use crate::core::types::{Number, Point3, Transform, Vector3};
use crate::shared::ray::Ray;
use getset::CopyGetters;

/// An **Axis-Aligned Bounding Box** (AABB), spanning `min` to `max`
#[derive(Copy, Clone, Debug, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Aabb {
    min: Point3,
    max: Point3,
}

// region Constructors

impl Aabb {
    /// A bounding box that contains nothing
    pub const ZERO: Self = Self {
        min: Point3::ZERO,
        max: Point3::ZERO,
    };

    /// The unbounded box, for shapes like planes that cannot be bounded.
    ///
    /// Recognised by `min == -INFINITY`.
    pub const INFINITE: Self = Self {
        min: Point3::NEG_INFINITY,
        max: Point3::INFINITY,
    };

    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// A box symmetric about the origin, with the given corner
    pub fn symmetric(extent: impl Into<Vector3>) -> Self {
        let extent = extent.into();
        Self::new((-extent).into(), extent.into())
    }

    /// The smallest box containing both `a` and `b`
    pub fn encompass(a: &Self, b: &Self) -> Self {
        Self::new(a.min.min(b.min), a.max.max(b.max))
    }
}

// endregion Constructors

// region Queries

impl Aabb {
    pub fn is_infinite(&self) -> bool {
        self.min.x == Number::NEG_INFINITY
    }

    pub fn contains(&self, p: Point3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Expands the box to contain the point `p`
    pub fn swallow(&self, p: Point3) -> Self {
        Self::new(self.min.min(p), self.max.max(p))
    }

    /// Ray/AABB intersection by the slab method.
    ///
    /// Returns whether the ray enters the box somewhere in `(0, t)`.
    ///
    /// This is actually correct, even though it appears not to handle edge
    /// cases (`ray.n.{x,y,z} == 0`). It works because the infinities that
    /// result from dividing by zero will still behave correctly in the
    /// comparisons. Rays which are parallel to an axis and outside the box
    /// will have `tmin == INFINITY` or `tmax == -INFINITY`, while rays inside
    /// the box will have `tmin` and `tmax` unchanged.
    pub fn intersects_ray(&self, ray: &Ray, t: Number) -> bool {
        let (x0, n_inv) = (ray.x0(), ray.n_inv());

        let tx1 = (self.min.x - x0.x) * n_inv.x;
        let tx2 = (self.max.x - x0.x) * n_inv.x;

        let mut tmin = Number::min(tx1, tx2);
        let mut tmax = Number::max(tx1, tx2);

        let ty1 = (self.min.y - x0.y) * n_inv.y;
        let ty2 = (self.max.y - x0.y) * n_inv.y;

        tmin = Number::max(tmin, Number::min(ty1, ty2));
        tmax = Number::min(tmax, Number::max(ty1, ty2));

        let tz1 = (self.min.z - x0.z) * n_inv.z;
        let tz2 = (self.max.z - x0.z) * n_inv.z;

        tmin = Number::max(tmin, Number::min(tz1, tz2));
        tmax = Number::min(tmax, Number::max(tz1, tz2));

        tmax >= Number::max(0.0, tmin) && tmin < t
    }

    /// An axis-aligned box containing this box transformed by `trans`.
    ///
    /// Transforms the eight corners; infinite boxes pass through untouched.
    pub fn transformed(&self, trans: &Transform) -> Aabb {
        if self.is_infinite() {
            return *self;
        }

        let (l, h) = (self.min, self.max);
        let corners = [
            Point3::new(l.x, l.y, l.z),
            Point3::new(l.x, l.y, h.z),
            Point3::new(l.x, h.y, l.z),
            Point3::new(l.x, h.y, h.z),
            Point3::new(h.x, l.y, l.z),
            Point3::new(h.x, l.y, h.z),
            Point3::new(h.x, h.y, l.z),
            Point3::new(h.x, h.y, h.z),
        ];

        let first = trans.transform_point3(corners[0]);
        let mut ret = Aabb::new(first, first);
        for corner in &corners[1..] {
            ret = ret.swallow(trans.transform_point3(*corner));
        }
        ret
    }
}

// endregion Queries

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Transform;

    #[test]
    fn slab_hits_straight_through() {
        let box_ = Aabb::symmetric(Vector3::ONE);
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::Z);
        assert!(box_.intersects_ray(&ray, Number::INFINITY));
        // Entry at t = 4; a tighter bound must reject it
        assert!(box_.intersects_ray(&ray, 4.5));
        assert!(!box_.intersects_ray(&ray, 3.5));
    }

    #[test]
    fn slab_parallel_ray_outside_misses() {
        let box_ = Aabb::symmetric(Vector3::ONE);
        // Parallel to the z axis, outside the box in x
        let ray = Ray::new(Point3::new(2.0, 0.0, -5.0), Vector3::Z);
        assert!(!box_.intersects_ray(&ray, Number::INFINITY));
    }

    #[test]
    fn slab_parallel_ray_inside_hits() {
        let box_ = Aabb::symmetric(Vector3::ONE);
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.0), Vector3::Z);
        assert!(box_.intersects_ray(&ray, Number::INFINITY));
    }

    #[test]
    fn slab_behind_origin_misses() {
        let box_ = Aabb::symmetric(Vector3::ONE);
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::Z);
        assert!(!box_.intersects_ray(&ray, Number::INFINITY));
    }

    #[test]
    fn transform_remains_tight_bound() {
        let box_ = Aabb::symmetric(Vector3::ONE);
        let trans = Transform::from_scale(Vector3::new(2.0, 1.0, 3.0));
        let out = box_.transformed(&trans);
        assert_eq!(out.min(), Point3::new(-2.0, -1.0, -3.0));
        assert_eq!(out.max(), Point3::new(2.0, 1.0, 3.0));
    }

    #[test]
    fn infinite_passes_through_transform() {
        let out = Aabb::INFINITE.transformed(&Transform::from_translation(Vector3::ONE));
        assert!(out.is_infinite());
    }
}
