//! Linear-light RGB colours with transparency channels.
//!
//! A [`Colour`] carries two transparency channels on top of its RGB
//! components: `filter` is wavelength-selective (light passing through is
//! tinted by the colour), `transmit` is neutral. Both are stored in absolute
//! space, so `filter + transmit <= 1` for any physically meaningful colour.

use crate::core::types::{Number, EPSILON};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Colour {
    pub r: Number,
    pub g: Number,
    pub b: Number,
    /// Wavelength-selective transparency, in `[0, 1]`
    pub filter: Number,
    /// Neutral transparency, in `[0, 1]`
    pub transmit: Number,
}

// region Constructors & constants

impl Colour {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Fully transparent black
    pub const CLEAR: Self = Self::new(0.0, 0.0, 0.0, 0.0, 1.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);

    pub const fn new(r: Number, g: Number, b: Number, filter: Number, transmit: Number) -> Self {
        Self { r, g, b, filter, transmit }
    }

    /// An opaque colour
    pub const fn rgb(r: Number, g: Number, b: Number) -> Self {
        Self::new(r, g, b, 0.0, 0.0)
    }

    pub const fn with_filter(mut self, filter: Number) -> Self {
        self.filter = filter;
        self
    }

    pub const fn with_transmit(mut self, transmit: Number) -> Self {
        self.transmit = transmit;
        self
    }

    /// Drop the transparency channels, leaving an opaque colour
    pub const fn solid(mut self) -> Self {
        self.filter = 0.0;
        self.transmit = 0.0;
        self
    }
}

// endregion Constructors & constants

// region Queries

impl Colour {
    /// Greyscale intensity (CIE luminance of the linear RGB components)
    pub fn intensity(&self) -> Number {
        0.2126198631048975 * self.r + 0.7151387878413206 * self.g + 0.0721499433963131 * self.b
    }

    /// Total transparency, `filter + transmit`
    pub fn trans(&self) -> Number {
        self.filter + self.transmit
    }

    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    fn map_rgb(&self, op: impl Fn(Number) -> Number) -> Self {
        Self {
            r: op(self.r),
            g: op(self.g),
            b: op(self.b),
            ..*self
        }
    }
}

// endregion Queries

// region Operators

/// Adds two colours.
///
/// The RGB components add; the transparency channels combine with the filter
/// contributions weighted by each colour's intensity.
impl Add for Colour {
    type Output = Colour;

    fn add(self, rhs: Colour) -> Colour {
        let (n1, n2) = (self.intensity(), rhs.intensity());
        let filter = if n1 + n2 >= EPSILON {
            (n1 * self.filter + n2 * rhs.filter) / (n1 + n2)
        } else {
            0.0
        };

        Colour {
            r: self.r + rhs.r,
            g: self.g + rhs.g,
            b: self.b + rhs.b,
            filter,
            transmit: self.transmit + rhs.transmit,
        }
    }
}

impl AddAssign for Colour {
    fn add_assign(&mut self, rhs: Colour) {
        *self = *self + rhs;
    }
}

/// Subtracts two colours, the inverse of [`Add`]
impl std::ops::Sub for Colour {
    type Output = Colour;

    fn sub(self, rhs: Colour) -> Colour {
        let (n1, n2) = (self.intensity(), rhs.intensity());
        let filter = if n1 - n2 >= EPSILON {
            (n1 * self.filter - n2 * rhs.filter) / (n1 - n2)
        } else {
            0.0
        };

        Colour {
            r: self.r - rhs.r,
            g: self.g - rhs.g,
            b: self.b - rhs.b,
            filter,
            transmit: self.transmit - rhs.transmit,
        }
    }
}

/// Scales a colour's components, transparency included
impl Mul<Number> for Colour {
    type Output = Colour;

    fn mul(self, n: Number) -> Colour {
        Colour {
            r: n * self.r,
            g: n * self.g,
            b: n * self.b,
            filter: n * self.filter,
            transmit: n * self.transmit,
        }
    }
}

impl Sum for Colour {
    fn sum<I: Iterator<Item = Colour>>(iter: I) -> Colour {
        iter.fold(Colour::BLACK, Colour::add)
    }
}

// endregion Operators

// region Colour algebra

impl Colour {
    /// Illuminates `self` with a light of colour `light`, keeping `self`'s
    /// transparency channels
    pub fn illuminate(&self, light: Colour) -> Colour {
        Colour {
            r: light.r * self.r,
            g: light.g * self.g,
            b: light.b * self.b,
            ..*self
        }
    }

    /// For `n` in `[0, 1]`, the colour in a gradient between `self` and `c2`
    pub fn gradient(&self, c2: Colour, n: Number) -> Colour {
        Colour {
            r: n * (c2.r - self.r) + self.r,
            g: n * (c2.g - self.g) + self.g,
            b: n * (c2.b - self.b) + self.b,
            filter: n * (c2.filter - self.filter) + self.filter,
            transmit: n * (c2.transmit - self.transmit) + self.transmit,
        }
    }

    /// Filters a light of colour `self` through `filter`.
    ///
    /// The transmitted part passes through unchanged, the filtered part is
    /// tinted by the filter's own colour.
    pub fn filter_light(&self, filter: Colour) -> Colour {
        let light = *self;
        let transmitted = light.map_rgb(|c| filter.transmit * c);
        let filtered = filter.illuminate(light).map_rgb(|c| filter.filter * c);

        let ret_filter = light.filter * (filtered.intensity() + filter.transmit)
            + light.transmit * filter.filter;
        Colour {
            r: transmitted.r + filtered.r,
            g: transmitted.g + filtered.g,
            b: transmitted.b + filtered.b,
            filter: ret_filter,
            transmit: filter.transmit * light.transmit,
        }
    }

    /// Composes the transmitted colour `filtered` with the surface colour
    /// `self`, keeping the transmitted transparency
    pub fn apply_transparency(&self, filtered: Colour) -> Colour {
        let surface = *self;
        let mut ret = surface * (1.0 - surface.trans()) + filtered;
        ret.filter = filtered.filter;
        ret.transmit = filtered.transmit;
        ret
    }

    /// Folds the filter channel into plain transmittance
    pub fn remove_filter(&self) -> Colour {
        let new_transmit = self.transmit + self.intensity() * self.filter;
        let mut ret = *self;
        if 1.0 - new_transmit >= EPSILON {
            let scale = (1.0 - self.trans()) / (1.0 - new_transmit);
            ret = ret.map_rgb(|c| scale * c);
        }
        ret.transmit = new_transmit;
        ret.filter = 0.0;
        ret
    }

    /// Clamps all components into `[0, 1]`, scaling the transparency channels
    /// down together if their sum exceeds one
    pub fn saturated(&self) -> Colour {
        let mut ret = self.map_rgb(|c| c.clamp(0.0, 1.0));
        ret.filter = ret.filter.clamp(0.0, 1.0);
        ret.transmit = ret.transmit.clamp(0.0, 1.0);
        let trans = ret.filter + ret.transmit;
        if trans > 1.0 {
            ret.filter /= trans;
            ret.transmit /= trans;
        }
        ret
    }
}

// endregion Colour algebra

// region sRGB

/// The sRGB `C` function
fn srgb_c(c_linear: Number) -> Number {
    if c_linear == 1.0 {
        1.0 // Map 1.0 to 1.0 instead of 0.9999999999999999
    } else if c_linear <= 0.0031308 {
        12.92 * c_linear
    } else {
        1.055 * c_linear.powf(1.0 / 2.4) - 0.055
    }
}

/// Inverse of the sRGB `C` function
fn srgb_c_inv(c_srgb: Number) -> Number {
    if c_srgb == 1.0 {
        1.0
    } else if c_srgb <= 0.040449936 {
        c_srgb / 12.92
    } else {
        ((c_srgb + 0.055) / 1.055).powf(2.4)
    }
}

impl Colour {
    /// Converts linear-light components to sRGB
    pub fn to_srgb(&self) -> Colour {
        self.map_rgb(srgb_c)
    }

    /// Converts sRGB components to linear light
    pub fn from_srgb(&self) -> Colour {
        self.map_rgb(srgb_c_inv)
    }
}

// endregion sRGB

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn srgb_round_trip() {
        for i in 0..=100 {
            let c = i as Number / 100.0;
            let colour = Colour::rgb(c, c / 2.0, 1.0 - c);
            let back = colour.to_srgb().from_srgb();
            assert_relative_eq!(colour.r, back.r, epsilon = 1e-12);
            assert_relative_eq!(colour.g, back.g, epsilon = 1e-12);
            assert_relative_eq!(colour.b, back.b, epsilon = 1e-12);
        }
    }

    #[test]
    fn saturation_invariant() {
        let over = Colour::new(1.5, -0.25, 0.5, 0.8, 0.8).saturated();
        assert!((0.0..=1.0).contains(&over.r));
        assert!((0.0..=1.0).contains(&over.g));
        assert!((0.0..=1.0).contains(&over.b));
        assert!(over.filter + over.transmit <= 1.0 + EPSILON);
    }

    #[test]
    fn filter_preserves_transparency_invariant() {
        let light = Colour::WHITE;
        let filter = Colour::rgb(0.2, 0.9, 0.3).with_filter(0.3).with_transmit(0.5);
        let out = light.filter_light(filter).saturated();
        assert!(out.filter + out.transmit <= 1.0 + EPSILON);
    }

    #[test]
    fn add_is_componentwise_on_rgb() {
        let a = Colour::rgb(0.25, 0.5, 0.125);
        let b = Colour::rgb(0.125, 0.25, 0.25);
        let sum = a + b;
        assert_relative_eq!(sum.r, 0.375);
        assert_relative_eq!(sum.g, 0.75);
        assert_relative_eq!(sum.b, 0.375);
    }
}
