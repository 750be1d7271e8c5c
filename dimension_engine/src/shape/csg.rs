//! Constructive solid geometry.
//!
//! Unions delegate to a bounding-volume hierarchy over any number of
//! children. Intersections, differences and merges are two-child composites
//! sharing one advance-past-the-surface loop, parameterised by which side of
//! each child's surface is allowed.

use crate::bvh::{Bvh, BvhKind};
use crate::core::error::fatal_error;
use crate::core::types::{Point3, Transform, EPSILON};
use crate::object::Object;
use crate::shape::{Shape, ShapeIntersection};
use crate::shared::aabb::Aabb;
use crate::shared::intersect::Intersection;
use crate::shared::ray::Ray;
use std::sync::Arc;

// region Union

/// A union of any number of children, intersected through an inner BVH.
///
/// Unions are flagged `split_children`: an enclosing BVH consumes the
/// children directly instead of nesting a second traversal.
#[derive(Clone, Debug, Default)]
pub struct Union {
    pub(crate) children: Vec<Object>,
    pub(crate) bvh: Option<Arc<Bvh>>,
}

impl Union {
    pub fn new(children: Vec<Object>) -> Self {
        Self { children, bvh: None }
    }

    pub(crate) fn built_bvh(&self) -> &Bvh {
        match &self.bvh {
            Some(bvh) => bvh,
            None => fatal_error("union queried before precompute"),
        }
    }

    /// Builds the inner BVH over the precomputed children
    pub(crate) fn build(&mut self, children: Vec<Arc<Object>>) {
        self.bvh = Some(Arc::new(Bvh::new(children, BvhKind::Prtree)));
    }
}

impl Shape for Union {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        // A fresh cache walk: union traversals nest inside the outer one
        let hit = self.built_bvh().intersection(ray, true)?;
        Some(ShapeIntersection {
            t: hit.t,
            normal: hit.normal,
            child: Some(hit.object),
        })
    }

    fn inside(&self, point: Point3) -> bool {
        self.built_bvh().inside(point)
    }

    fn bound(&self, _trans: &Transform) -> Aabb {
        self.built_bvh().bounding_box()
    }
}

// endregion Union

// region Two-child composites

/// The two children of a binary CSG composite
#[derive(Clone, Debug)]
pub struct CsgPair {
    pub(crate) a: Box<Object>,
    pub(crate) b: Box<Object>,
}

impl CsgPair {
    pub fn new(a: Object, b: Object) -> Self {
        Self {
            a: Box::new(a),
            b: Box::new(b),
        }
    }
}

/// Walks `child`'s surface along the ray until a hit lands in the allowed
/// region of `other` (`allowed ^ other.inside(..)` is false), advancing past
/// each rejected hit by epsilon.
fn advance_to_allowed<'o>(
    child: &'o Object,
    other: &Object,
    ray: &Ray,
    allowed_inside: bool,
) -> Option<Intersection<'o>> {
    let mut hit = child.intersection(ray);
    let mut oldt = 0.0;

    while let Some(mut i) = hit {
        // Hits from re-shot rays are re-expressed on the original ray
        i.ray = *ray;
        i.t += oldt;
        oldt = i.t + EPSILON;

        let point = ray.at(i.t);
        if allowed_inside ^ other.inside(point) {
            let newray = Ray::new(ray.at(i.t), ray.n()).add_epsilon();
            hit = child.intersection(&newray);
        } else {
            return Some(i);
        }
    }

    None
}

/// Shared intersection for the two-child composites. `inside1` (`inside2`)
/// say whether child A (B) surface points inside the other child survive.
fn csg_intersect<'p>(
    pair: &'p CsgPair,
    ray: &Ray,
    inside1: bool,
    inside2: bool,
) -> Option<ShapeIntersection<'p>> {
    let ia = advance_to_allowed(&pair.a, &pair.b, ray, inside2);
    let ib = advance_to_allowed(&pair.b, &pair.a, ray, inside1);

    // Ties prefer child A
    let best = match (ia, ib) {
        (Some(ia), Some(ib)) => Some(if ia.t <= ib.t { ia } else { ib }),
        (ia, ib) => ia.or(ib),
    }?;

    Some(ShapeIntersection {
        t: best.t,
        normal: best.normal,
        child: Some(best.object),
    })
}

/// The region inside both children
#[derive(Clone, Debug)]
pub struct CsgIntersection {
    pub(crate) pair: CsgPair,
}

impl CsgIntersection {
    pub fn new(a: Object, b: Object) -> Self {
        Self { pair: CsgPair::new(a, b) }
    }
}

impl Shape for CsgIntersection {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        csg_intersect(&self.pair, ray, true, true)
    }

    fn inside(&self, point: Point3) -> bool {
        self.pair.a.inside(point) && self.pair.b.inside(point)
    }

    fn bound(&self, _trans: &Transform) -> Aabb {
        let (a, b) = (self.pair.a.aabb(), self.pair.b.aabb());
        Aabb::new(a.min().max(b.min()), a.max().min(b.max()))
    }
}

/// The region inside child A but outside child B
#[derive(Clone, Debug)]
pub struct CsgDifference {
    pub(crate) pair: CsgPair,
}

impl CsgDifference {
    pub fn new(a: Object, b: Object) -> Self {
        Self { pair: CsgPair::new(a, b) }
    }
}

impl Shape for CsgDifference {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        csg_intersect(&self.pair, ray, true, false)
    }

    fn inside(&self, point: Point3) -> bool {
        self.pair.a.inside(point) && !self.pair.b.inside(point)
    }

    fn bound(&self, _trans: &Transform) -> Aabb {
        self.pair.a.aabb()
    }
}

/// The union of both children without internal surfaces: only the outer
/// boundary survives, so transparent merges show no internal seams
#[derive(Clone, Debug)]
pub struct CsgMerge {
    pub(crate) pair: CsgPair,
}

impl CsgMerge {
    pub fn new(a: Object, b: Object) -> Self {
        Self { pair: CsgPair::new(a, b) }
    }
}

impl Shape for CsgMerge {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        csg_intersect(&self.pair, ray, false, false)
    }

    fn inside(&self, point: Point3) -> bool {
        self.pair.a.inside(point) || self.pair.b.inside(point)
    }

    fn bound(&self, _trans: &Transform) -> Aabb {
        Aabb::encompass(&self.pair.a.aabb(), &self.pair.b.aabb())
    }
}

// endregion Two-child composites
