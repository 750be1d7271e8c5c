//! Pigments: functions from points to colours.

use crate::core::colour::Colour;
use crate::core::error::engine_assert;
use crate::core::types::{Number, Point3, Transform, Vector3};
use crate::shared::transform;
use enum_dispatch::enum_dispatch;
use std::fmt;
use std::sync::Arc;

/// The colour pattern of a pigment, evaluated in pigment-local space
#[enum_dispatch]
pub trait PigmentFn {
    fn colour(&self, point: Point3) -> Colour;
}

#[enum_dispatch(PigmentFn)]
#[derive(Clone, Debug)]
pub enum PigmentInstance {
    SolidPigment,
    CheckerPigment,
    GradientPigment,
    DynamicPigment,
}

/// A pigment pattern plus its affine transform and quick-colour fallback
#[derive(Clone, Debug)]
pub struct Pigment {
    pub kind: PigmentInstance,
    pub trans: Transform,
    trans_inv: Transform,
    /// Fallback used when pigment evaluation is disabled by quality flags
    pub quick_colour: Colour,
    initialized: bool,
}

impl Pigment {
    pub fn new(kind: impl Into<PigmentInstance>) -> Self {
        Self {
            kind: kind.into(),
            trans: Transform::IDENTITY,
            trans_inv: Transform::IDENTITY,
            quick_colour: Colour::BLACK,
            initialized: false,
        }
    }

    /// A single solid colour; the quick colour matches
    pub fn solid(colour: Colour) -> Self {
        let mut ret = Self::new(SolidPigment { colour });
        ret.quick_colour = colour;
        ret
    }

    pub fn with_trans(mut self, trans: Transform) -> Self {
        self.trans = trans;
        self
    }

    pub fn with_quick_colour(mut self, colour: Colour) -> Self {
        self.quick_colour = colour;
        self
    }

    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Precomputes the inverse transform. One-shot; initializing twice is a
    /// fatal error.
    pub fn initialize(&mut self) {
        engine_assert!(!self.initialized, "pigment double-initialized");
        self.initialized = true;
        self.trans_inv = transform::inverse(&self.trans);
    }

    /// Evaluates the pigment at a point, mapping it into pigment space first
    pub fn evaluate(&self, point: Point3) -> Colour {
        self.kind.colour(self.trans_inv.transform_point3(point))
    }
}

// region Solid

#[derive(Copy, Clone, Debug)]
pub struct SolidPigment {
    pub colour: Colour,
}

impl PigmentFn for SolidPigment {
    fn colour(&self, _point: Point3) -> Colour {
        self.colour
    }
}

// endregion Solid

// region Checker

/// Alternating unit cubes of two colours
#[derive(Copy, Clone, Debug)]
pub struct CheckerPigment {
    pub a: Colour,
    pub b: Colour,
}

impl PigmentFn for CheckerPigment {
    fn colour(&self, point: Point3) -> Colour {
        let parity = point.x.floor() + point.y.floor() + point.z.floor();
        if (parity as i64).rem_euclid(2) == 0 {
            self.a
        } else {
            self.b
        }
    }
}

// endregion Checker

// region Gradient

/// A repeating linear blend along an orientation axis
#[derive(Copy, Clone, Debug)]
pub struct GradientPigment {
    pub orientation: Vector3,
    pub a: Colour,
    pub b: Colour,
}

impl PigmentFn for GradientPigment {
    fn colour(&self, point: Point3) -> Colour {
        let n: Number = point.dot(self.orientation).rem_euclid(1.0);
        self.a.gradient(self.b, n)
    }
}

// endregion Gradient

// region Dynamic

/// Escape hatch for pigments outside the closed set, boxing any [`PigmentFn`]
#[derive(Clone)]
pub struct DynamicPigment {
    inner: Arc<dyn PigmentFn + Send + Sync>,
}

impl DynamicPigment {
    pub fn new(inner: impl PigmentFn + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

impl PigmentFn for DynamicPigment {
    fn colour(&self, point: Point3) -> Colour {
        self.inner.colour(point)
    }
}

impl fmt::Debug for DynamicPigment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicPigment").finish_non_exhaustive()
    }
}

// endregion Dynamic

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checker_alternates() {
        let pigment = Pigment::new(CheckerPigment {
            a: Colour::WHITE,
            b: Colour::BLACK,
        });
        assert_eq!(pigment.evaluate(Point3::new(0.5, 0.5, 0.5)), Colour::WHITE);
        assert_eq!(pigment.evaluate(Point3::new(1.5, 0.5, 0.5)), Colour::BLACK);
        assert_eq!(pigment.evaluate(Point3::new(-0.5, 0.5, 0.5)), Colour::BLACK);
    }

    #[test]
    fn evaluation_respects_transform() {
        let mut pigment = Pigment::new(CheckerPigment {
            a: Colour::WHITE,
            b: Colour::BLACK,
        })
        .with_trans(Transform::from_scale(Vector3::splat(2.0)));
        pigment.initialize();
        // The checker cell spans two units after scaling
        assert_eq!(pigment.evaluate(Point3::new(1.5, 0.5, 0.5)), Colour::WHITE);
    }
}
