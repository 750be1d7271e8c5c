//! Surface appearance: textures bundle a pigment (intrinsic colour pattern)
//! with a finish (interaction with light) and an affine transform.

pub mod finish;
pub mod interior;
pub mod pigment;

use crate::core::error::engine_assert;
use crate::core::types::Transform;
use crate::shared::transform;
use finish::Finish;
use pigment::Pigment;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct Texture {
    pub pigment: Option<Pigment>,
    pub finish: Finish,
    pub trans: Transform,
    trans_inv: Transform,
    initialized: bool,
}

impl Default for Texture {
    fn default() -> Self {
        Self::new()
    }
}

impl Texture {
    pub fn new() -> Self {
        Self {
            pigment: None,
            finish: Finish::new(),
            trans: Transform::IDENTITY,
            trans_inv: Transform::IDENTITY,
            initialized: false,
        }
    }

    pub fn with_pigment(mut self, pigment: Pigment) -> Self {
        self.pigment = Some(pigment);
        self
    }

    pub fn with_finish(mut self, finish: Finish) -> Self {
        self.finish = finish;
        self
    }

    pub fn with_trans(mut self, trans: Transform) -> Self {
        self.trans = trans;
        self
    }

    pub fn initialized(&self) -> bool {
        self.initialized
    }

    pub fn trans_inv(&self) -> &Transform {
        &self.trans_inv
    }

    /// Precomputes the texture for rendering: the texture transform is
    /// multiplied into the pigment transform, then the pigment itself is
    /// initialized. One-shot; initializing twice is a fatal error.
    pub fn initialize(&mut self) {
        engine_assert!(!self.initialized, "texture double-initialized");
        self.initialized = true;

        self.trans_inv = transform::inverse(&self.trans);

        if let Some(pigment) = &mut self.pigment {
            if !pigment.initialized() {
                pigment.trans = self.trans * pigment.trans;
                pigment.initialize();
            }
        }
    }

    /// Fills this texture's unset slots from a parent texture
    pub fn cascade_from(&mut self, parent: &Texture) {
        if self.pigment.is_none() {
            self.pigment = parent.pigment.clone();
        }
        self.finish.cascade_from(&parent.finish);
    }
}

/// Cascades a parent texture into a child slot.
///
/// A child with no texture of its own shares the parent's outright; a child
/// with an uninitialized texture has its unset slots filled from the parent,
/// is initialized, and is frozen. Textures deliberately shared between
/// objects are initialized once and pass through untouched afterwards.
pub fn cascade(parent: Option<&Arc<Texture>>, child: &mut Option<Arc<Texture>>) {
    match (child.as_ref(), parent) {
        (None, Some(parent)) => *child = Some(parent.clone()),
        (None, None) => {}
        (Some(tex), parent) => {
            if !tex.initialized() {
                let mut owned = Texture::clone(tex);
                if let Some(parent) = parent {
                    owned.cascade_from(parent);
                }
                owned.initialize();
                *child = Some(Arc::new(owned));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::colour::Colour;
    use crate::texture::finish::{Ambient, Diffuse};
    use crate::texture::pigment::Pigment;

    #[test]
    fn cascade_fills_unset_slots_only() {
        let parent = Texture::new()
            .with_pigment(Pigment::solid(Colour::RED))
            .with_finish(Finish::new().with_ambient(Ambient::new(Colour::WHITE * 0.1)));
        let mut child = Texture::new().with_finish(Finish::new().with_diffuse(Diffuse::new(0.7)));

        child.cascade_from(&parent);
        assert!(child.pigment.is_some());
        assert!(child.finish.ambient.is_some());
        let diffuse = child.finish.diffuse.expect("child diffuse kept");
        assert_eq!(diffuse.coeff, 0.7);
    }

    #[test]
    fn whole_texture_shared_when_child_has_none() {
        let parent = Arc::new({
            let mut t = Texture::new().with_pigment(Pigment::solid(Colour::GREEN));
            t.initialize();
            t
        });
        let mut slot = None;
        cascade(Some(&parent), &mut slot);
        assert!(Arc::ptr_eq(&parent, slot.as_ref().expect("slot filled")));
    }

    #[test]
    #[should_panic(expected = "double-initialized")]
    fn double_initialize_is_fatal() {
        let mut texture = Texture::new().with_pigment(Pigment::solid(Colour::BLUE));
        texture.initialize();
        texture.initialize();
    }
}
