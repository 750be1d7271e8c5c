//! Scenes: everything the renderer needs, bundled.

use crate::camera::CameraInstance;
use crate::canvas::Canvas;
use crate::core::colour::Colour;
use crate::core::types::Number;
use crate::light::LightInstance;
use crate::object::Object;
use crate::texture::pigment::Pigment;
use crate::texture::{self, Texture};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

bitflags! {
    /// Which rendering features are enabled
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Quality: u32 {
        /// Evaluate pigments rather than quick colours
        const PIGMENT = 1 << 0;
        /// Cast shadow feelers and shade with lights
        const LIGHTS = 1 << 1;
        /// Evaluate finish components per light
        const FINISH = 1 << 2;
        /// Trace transmitted rays through transparent surfaces
        const TRANSPARENCY = 1 << 3;
        /// Trace reflected rays
        const REFLECTION = 1 << 4;
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::all()
    }
}

/// Placement of the canvas within a larger virtual image, for tiled renders
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub outer_width: usize,
    pub outer_height: usize,
}

pub struct Scene {
    pub camera: CameraInstance,
    pub objects: Vec<Object>,
    pub lights: Vec<LightInstance>,
    pub canvas: Canvas,
    /// Cascaded into every object that leaves texture slots unset
    pub default_texture: Arc<Texture>,
    /// Evaluated at the ray direction when nothing is hit
    pub background: Pigment,
    pub quality: Quality,
    /// Maximum ray recursion depth
    pub reclimit: u32,
    /// Recursion is pruned once a ray's maximum possible contribution drops
    /// below this
    pub adc_bailout: Number,
    /// Worker thread count; zero means one per hardware thread
    pub nthreads: usize,
    pub region: Option<Region>,
}

impl Scene {
    pub fn new(camera: CameraInstance, canvas: Canvas) -> Self {
        Self {
            camera,
            objects: Vec::new(),
            lights: Vec::new(),
            canvas,
            default_texture: Arc::new(Texture::new().with_pigment(Pigment::solid(Colour::BLACK))),
            background: Pigment::solid(Colour::BLACK),
            quality: Quality::default(),
            reclimit: 5,
            adc_bailout: 1.0 / 255.0,
            nthreads: 0,
            region: None,
        }
    }

    /// Prepares the scene for rendering: initializes the default texture and
    /// background pigment, cascades the default into every object, and
    /// precomputes the object tree
    pub fn initialize(&mut self) {
        if !self.default_texture.initialized() {
            let mut owned = Texture::clone(&self.default_texture);
            owned.initialize();
            self.default_texture = Arc::new(owned);
        }

        if !self.background.initialized() {
            self.background.initialize();
        }

        for object in &mut self.objects {
            texture::cascade(Some(&self.default_texture), &mut object.texture);
            object.precompute();
        }
    }
}
