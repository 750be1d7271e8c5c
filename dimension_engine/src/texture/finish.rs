//! Finishes: how a surface interacts with light.
//!
//! The four sub-components are orthogonal and individually optional; a child
//! texture inherits any component its parent sets that it leaves unset.

use crate::core::colour::Colour;
use crate::core::types::{Number, Vector3};

#[derive(Copy, Clone, Debug, Default)]
pub struct Finish {
    pub ambient: Option<Ambient>,
    pub diffuse: Option<Diffuse>,
    pub specular: Option<Specular>,
    pub reflection: Option<Reflection>,
}

impl Finish {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ambient(mut self, ambient: Ambient) -> Self {
        self.ambient = Some(ambient);
        self
    }

    pub fn with_diffuse(mut self, diffuse: Diffuse) -> Self {
        self.diffuse = Some(diffuse);
        self
    }

    pub fn with_specular(mut self, specular: Specular) -> Self {
        self.specular = Some(specular);
        self
    }

    pub fn with_reflection(mut self, reflection: Reflection) -> Self {
        self.reflection = Some(reflection);
        self
    }

    /// Fills unset components from a parent finish
    pub fn cascade_from(&mut self, parent: &Finish) {
        if self.ambient.is_none() {
            self.ambient = parent.ambient;
        }
        if self.diffuse.is_none() {
            self.diffuse = parent.diffuse;
        }
        if self.specular.is_none() {
            self.specular = parent.specular;
        }
        if self.reflection.is_none() {
            self.reflection = parent.reflection;
        }
    }
}

/// Uniform ambient light contribution
#[derive(Copy, Clone, Debug)]
pub struct Ambient {
    pub light: Colour,
}

impl Ambient {
    pub fn new(light: Colour) -> Self {
        Self { light }
    }

    pub fn colour(&self, pigment: Colour) -> Colour {
        pigment.illuminate(self.light).solid()
    }
}

/// Lambertian diffuse reflection
#[derive(Copy, Clone, Debug)]
pub struct Diffuse {
    pub coeff: Number,
}

impl Diffuse {
    pub fn new(coeff: Number) -> Self {
        Self { coeff }
    }

    /// `light` and `normal` must be normalised
    pub fn colour(&self, light_colour: Colour, pigment: Colour, light: Vector3, normal: Vector3) -> Colour {
        let factor = (self.coeff * light.dot(normal)).abs();
        pigment.illuminate(light_colour) * factor
    }
}

/// Phong specular highlights
#[derive(Copy, Clone, Debug)]
pub struct Specular {
    pub coeff: Number,
    pub exponent: Number,
}

impl Specular {
    pub fn new(coeff: Number, exponent: Number) -> Self {
        Self { coeff, exponent }
    }

    pub fn colour(
        &self,
        light_colour: Colour,
        _pigment: Colour,
        light: Vector3,
        normal: Vector3,
        viewer: Vector3,
    ) -> Colour {
        let reflected = normal * (2.0 * light.dot(normal)) - light;
        let factor = reflected.dot(viewer);
        if factor < 0.0 {
            return Colour::BLACK;
        }
        light_colour * (self.coeff * factor.powf(self.exponent))
    }
}

/// Specular reflection, blending between `min` (head-on) and `max` (grazing)
/// by the angle of incidence
#[derive(Copy, Clone, Debug)]
pub struct Reflection {
    pub min: Colour,
    pub max: Colour,
    pub falloff: Number,
}

impl Reflection {
    pub fn new(min: Colour, max: Colour, falloff: Number) -> Self {
        Self { min, max, falloff }
    }

    /// The reflected contribution of `reflect`, for a reflected direction
    /// `ray` off a surface with the given `normal`
    pub fn colour(&self, reflect: Colour, _pigment: Colour, ray: Vector3, normal: Vector3) -> Colour {
        let coeff = ray.dot(normal).abs().powf(self.falloff);
        reflect.illuminate(self.min.gradient(self.max, coeff))
    }
}
