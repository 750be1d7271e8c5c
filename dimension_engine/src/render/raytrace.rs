//! The recursive shading pipeline.
//!
//! Each pixel's primary ray is traced through the BVH; a hit is shaded from
//! its pigment, the scene lights (through shadow feelers that filter through
//! transparent occluders), a reflected ray, and a transmitted ray. Recursion
//! is bounded both by the scene's depth limit and by **Adaptive Depth
//! Control**: `adc_value` tracks the maximum contribution a recursive ray
//! can still make to the pixel, and rays that can no longer matter are
//! pruned.

use crate::bvh::Bvh;
use crate::core::colour::Colour;
use crate::core::types::{Number, Point3, Vector3, EPSILON};
use crate::light::{Light, LightInstance};
use crate::scene::Quality;
use crate::shared::intersect::Intersection;
use crate::shared::ray::Ray;
use crate::texture::finish::Finish;
use crate::texture::interior::Interior;
use crate::texture::pigment::Pigment;
use crate::texture::Texture;

/// One frame of the nested-dielectric chain: the refractive index in effect
/// and the enclosing medium. Frames live on the recursion stack.
struct IorFrame<'p> {
    ior: Number,
    parent: Option<&'p IorFrame<'p>>,
}

/// Open air
const OUTERMOST: IorFrame<'static> = IorFrame { ior: 1.0, parent: None };

/// Everything derived from one intersection that the shading steps share
struct ShadeState<'a> {
    /// World-space hit point
    r: Point3,
    /// Hit point in pigment space
    pigment_r: Point3,
    /// Unit vector back toward the ray origin
    viewer: Vector3,
    /// Mirror direction of the viewer about the normal
    reflected: Vector3,
    normal: Vector3,
    texture: Option<&'a Texture>,
    interior: Option<&'a Interior>,
}

impl<'a> ShadeState<'a> {
    fn new(intersection: &Intersection<'a>) -> Self {
        let object = intersection.object;
        let r = intersection.position();
        let normal = intersection.normal;
        let viewer = (-intersection.ray.n()).normalize();
        let reflected = normal * (2.0 * viewer.dot(normal)) - viewer;

        Self {
            r,
            pigment_r: object.pigment_trans().transform_point3(r),
            viewer,
            reflected,
            normal,
            texture: object.texture.as_deref(),
            interior: object.interior.as_deref(),
        }
    }

    fn finish(&self) -> Finish {
        self.texture.map_or_else(Finish::new, |t| t.finish)
    }
}

/// The per-render shading context, shared read-only between workers
pub(crate) struct Raytracer<'a> {
    pub lights: &'a [LightInstance],
    pub background: &'a Pigment,
    pub quality: Quality,
    pub reclimit: u32,
    pub adc_bailout: Number,
    pub bvh: &'a Bvh,
}

impl Raytracer<'_> {
    /// Traces one primary ray, resetting this thread's intersection cache
    pub(crate) fn shoot_pixel(&self, ray: &Ray) -> Colour {
        self.shoot(ray, self.reclimit, &OUTERMOST, Colour::WHITE)
    }

    fn shoot<'p>(&self, ray: &Ray, reclevel: u32, ior: &'p IorFrame<'p>, adc_value: Colour) -> Colour {
        if reclevel == 0 || adc_value.intensity() < self.adc_bailout {
            return Colour::BLACK;
        }
        let reclevel = reclevel - 1;
        let reset = reclevel == self.reclimit - 1;

        match self.bvh.intersection(ray, reset) {
            Some(intersection) => self.shade(&intersection, reclevel, ior, adc_value),
            None => self.background_colour(ray),
        }
    }

    fn background_colour(&self, ray: &Ray) -> Colour {
        if self.quality.contains(Quality::PIGMENT) {
            self.background.evaluate(ray.n().normalize())
        } else {
            self.background.quick_colour
        }
    }

    fn shade<'p>(
        &self,
        intersection: &Intersection<'_>,
        reclevel: u32,
        ior: &'p IorFrame<'p>,
        adc_value: Colour,
    ) -> Colour {
        let state = ShadeState::new(intersection);

        let pigment = self.pigment(&state);
        let mut diffuse = pigment;
        let mut additional = Colour::BLACK;

        if self.quality.contains(Quality::LIGHTS) {
            (diffuse, additional) = self.lighting(&state, pigment, reclevel);
        }

        if self.quality.contains(Quality::REFLECTION) {
            additional = self.reflection(&state, pigment, reclevel, ior, adc_value) + additional;
        }

        if self.quality.contains(Quality::TRANSPARENCY) {
            diffuse = self.transparency(&state, intersection, pigment, diffuse, reclevel, ior, adc_value);
        }

        diffuse + additional
    }

    /// The base pigment at the intersection
    fn pigment(&self, state: &ShadeState) -> Colour {
        let Some(texture) = state.texture else {
            return Colour::BLACK;
        };
        match &texture.pigment {
            Some(pigment) if self.quality.contains(Quality::PIGMENT) => pigment.evaluate(state.pigment_r),
            Some(pigment) => pigment.quick_colour,
            None => Colour::BLACK,
        }
    }

    /// Light, shadow, and shading; returns the new diffuse and additional
    /// (specular) accumulators
    fn lighting(&self, state: &ShadeState, pigment: Colour, reclevel: u32) -> (Colour, Colour) {
        let finish = state.finish();

        let mut diffuse = match finish.ambient {
            Some(ambient) => ambient.colour(pigment),
            None => Colour::BLACK,
        };
        let mut additional = Colour::BLACK;

        for light in self.lights {
            let mut light_colour = self.light_ray(state, light, reclevel);
            if light_colour.is_black() {
                continue;
            }

            if self.quality.contains(Quality::FINISH) {
                // Light claimed by specular reflection is not available for
                // diffuse shading
                if self.quality.contains(Quality::REFLECTION) {
                    if let Some(reflection) = finish.reflection {
                        light_colour = light_colour
                            - reflection.colour(light_colour, pigment, state.reflected, state.normal);
                    }
                }

                let light_dir = light.direction(state.r).normalize();
                if let Some(d) = finish.diffuse {
                    diffuse = d.colour(light_colour, pigment, light_dir, state.normal) + diffuse;
                }
                if let Some(s) = finish.specular {
                    additional =
                        s.colour(light_colour, pigment, light_dir, state.normal, state.viewer) + additional;
                }
            } else {
                diffuse = pigment.solid();
            }
        }

        (diffuse, additional)
    }

    /// The colour of one light as seen from the hit point, walking the
    /// shadow feeler through (possibly transparent) occluders
    fn light_ray(&self, state: &ShadeState, light: &LightInstance, reclevel: u32) -> Colour {
        let mut shadow_ray = Ray::new(state.r, light.direction(state.r)).add_epsilon();

        // A light on the other side of the surface from the viewer casts no
        // light on this face
        if shadow_ray.n().dot(state.normal) * state.viewer.dot(state.normal) < 0.0 {
            return Colour::BLACK;
        }

        let mut colour = light.illumination(state.r);

        let mut remaining = reclevel;
        while remaining > 0 && colour.intensity() >= self.adc_bailout {
            remaining -= 1;

            let Some(shadow_caster) = self.bvh.intersection(&shadow_ray, false) else {
                return colour;
            };
            if !light.occludes(shadow_caster.t) {
                return colour;
            }

            if self.quality.contains(Quality::TRANSPARENCY) {
                let shadow_state = ShadeState::new(&shadow_caster);
                let shadow_pigment = self.pigment(&shadow_state);

                if shadow_pigment.trans() >= EPSILON {
                    // The occluder reflects part of the light away before
                    // transmitting the rest
                    if self.quality.contains(Quality::REFLECTION) {
                        if let Some(reflection) = shadow_state.finish().reflection {
                            colour = colour
                                - reflection.colour(
                                    colour,
                                    shadow_pigment,
                                    shadow_state.reflected,
                                    shadow_state.normal,
                                );
                        }
                    }

                    colour = colour.filter_light(shadow_pigment);
                    let origin = shadow_ray.at(shadow_caster.t);
                    shadow_ray = Ray::new(origin, light.direction(origin)).add_epsilon();
                    continue;
                }
            }

            break;
        }

        Colour::BLACK
    }

    /// Traces the reflected ray, attenuating the ADC value by the surface's
    /// reflectivity
    fn reflection<'p>(
        &self,
        state: &ShadeState,
        pigment: Colour,
        reclevel: u32,
        ior: &'p IorFrame<'p>,
        adc_value: Colour,
    ) -> Colour {
        let Some(reflection) = state.finish().reflection else {
            return Colour::BLACK;
        };

        let refl_ray = Ray::new(state.r, state.reflected).add_epsilon();
        let new_adc = reflection.colour(adc_value, pigment, state.reflected, state.normal);
        let rec = self.shoot(&refl_ray, reclevel, ior, new_adc);
        reflection
            .colour(rec, pigment, state.reflected, state.normal)
            .solid()
    }

    /// Traces the transmitted ray and composes it under the surface colour.
    /// Must run after lighting and reflection to compose correctly.
    #[allow(clippy::too_many_arguments)]
    fn transparency<'p>(
        &self,
        state: &ShadeState,
        intersection: &Intersection<'_>,
        pigment: Colour,
        diffuse: Colour,
        reclevel: u32,
        ior: &'p IorFrame<'p>,
        adc_value: Colour,
    ) -> Colour {
        if pigment.trans() < EPSILON {
            return diffuse;
        }

        let trans_ray = Ray::new(state.r, intersection.ray.n()).add_epsilon();
        let r = trans_ray.n().normalize();
        let n = state.normal;

        // Entering or leaving the object decides the new medium; the chain
        // of enclosing media lives on the recursion stack
        let frame = if r.dot(n) < 0.0 {
            IorFrame {
                ior: state.interior.map_or(1.0, |i| i.ior),
                parent: Some(ior),
            }
        } else {
            IorFrame {
                ior: ior.parent.map_or(1.0, |p| p.ior),
                parent: ior.parent.and_then(|p| p.parent),
            }
        };

        // Snell's law, with the total-internal-reflection check
        let iorr = ior.ior / frame.ior;
        let c1 = -r.dot(n);
        let c2 = 1.0 - iorr * iorr * (1.0 - c1 * c1);
        if c2 <= 0.0 {
            return diffuse;
        }
        let c2 = c2.sqrt();
        let dir = if c1 >= 0.0 {
            r * iorr + n * (iorr * c1 - c2)
        } else {
            r * iorr + n * (iorr * c1 + c2)
        };
        let trans_ray = Ray::new(trans_ray.x0(), dir);

        let new_adc = adc_value.filter_light(pigment);
        let rec = self.shoot(&trans_ray, reclevel, &frame, new_adc);
        let mut filtered = rec.filter_light(pigment);

        // Conserve energy against the reflected share
        if self.quality.contains(Quality::REFLECTION) {
            if let Some(reflection) = state.finish().reflection {
                filtered = filtered - reflection.colour(filtered, pigment, state.reflected, state.normal);
            }
        }

        diffuse
            .with_filter(pigment.filter)
            .with_transmit(pigment.transmit)
            .apply_transparency(filtered)
    }
}
