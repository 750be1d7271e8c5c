use crate::core::types::{Point3, Transform};
use crate::shape::{Shape, ShapeIntersection};
use crate::shared::aabb::Aabb;
use crate::shared::ray::Ray;
use std::fmt;
use std::sync::Arc;

/// Escape hatch for geometry outside the closed shape set.
///
/// Boxes any [`Shape`] behind dynamic dispatch; the rest of the engine treats
/// it exactly like a built-in primitive. Also handy for instrumented shapes
/// in tests.
#[derive(Clone)]
pub struct DynamicShape {
    inner: Arc<dyn Shape + Send + Sync>,
}

impl DynamicShape {
    pub fn new(inner: impl Shape + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

impl Shape for DynamicShape {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        self.inner.intersect(ray)
    }

    fn inside(&self, point: Point3) -> bool {
        self.inner.inside(point)
    }

    fn bound(&self, trans: &Transform) -> Aabb {
        self.inner.bound(trans)
    }
}

impl fmt::Debug for DynamicShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicShape").finish_non_exhaustive()
    }
}
