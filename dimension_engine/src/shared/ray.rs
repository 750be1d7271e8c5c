use crate::core::types::{Number, Point3, Transform, Vector3, EPSILON};
use getset::CopyGetters;

/// A ray (or line) `x0 + t*n`.
///
/// The direction is deliberately *not* normalised: `t` values keep their
/// meaning under affine transforms, and point-light shadow feelers test
/// occlusion against `t < 1` along the un-normalised direction to the light.
#[derive(Copy, Clone, PartialEq, Debug, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Ray {
    /// The origin of the ray
    x0: Point3,
    /// The direction of the ray
    n: Vector3,
    /// Cached component-wise reciprocal of `n`, for slab tests
    n_inv: Vector3,
}

impl Ray {
    pub fn new(x0: impl Into<Point3>, n: impl Into<Vector3>) -> Self {
        let (x0, n) = (x0.into(), n.into());
        Self { x0, n, n_inv: n.recip() }
    }

    /// The position at distance `t` along the ray, `x0 + t*n`
    pub fn at(&self, t: Number) -> Point3 {
        self.x0 + self.n * t
    }

    /// Transforms the ray, preserving the meaning of `t` values
    pub fn transformed(&self, trans: &Transform) -> Ray {
        Ray::new(trans.transform_point3(self.x0), trans.transform_vector3(self.n))
    }

    /// Nudges the origin forward along the direction, so that a ray starting
    /// on a surface does not immediately re-intersect it
    pub fn add_epsilon(&self) -> Ray {
        Ray::new(self.x0 + self.n * EPSILON, self.n)
    }
}
