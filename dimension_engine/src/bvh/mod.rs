//! Bounding-volume hierarchies over scene objects.
//!
//! The tree is bulk-built (see [`prtree`]), then flattened into a pre-order
//! array where each record knows the displacement to its next sibling, so
//! traversal is a branch-free loop over the array with no stack. These are
//! the hottest code paths in the engine.

mod cache;
pub(crate) mod prtree;

use crate::core::types::{Number, Point3};
use crate::object::Object;
use crate::shape::ShapeInstance;
use crate::shared::aabb::Aabb;
use crate::shared::intersect::Intersection;
use crate::shared::ray::Ray;
use prtree::BuildNode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// How the bounded objects are organised
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BvhKind {
    /// Every object under a single root; a linear scan with one extra box
    /// test, useful as a baseline
    None,
    /// The bulk-loaded priority R-tree
    #[default]
    Prtree,
}

/// A flat BVH node, stored in an array for fast pre-order traversal
#[derive(Copy, Clone, Debug)]
struct FlatNode {
    aabb: Aabb,
    /// The referenced object, for leaf nodes
    object: Option<u32>,
    /// Displacement to the next sibling
    skip: u32,
}

static NEXT_BVH_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
pub struct Bvh {
    /// Identity key for the per-thread intersection caches
    id: u64,
    /// Objects that cannot be bounded, scanned on every query
    unbounded: Vec<Arc<Object>>,
    /// Bounded objects, indexed by the flat nodes and the caches
    objects: Vec<Arc<Object>>,
    flat: Vec<FlatNode>,
}

// region Construction

/// Adds an object, or the children it was split into, to the leaf list
fn split_add_object(leaves: &mut Vec<Arc<Object>>, object: &Arc<Object>) {
    if object.split_children {
        if let ShapeInstance::Union(union) = &object.shape {
            let inner = union.built_bvh();
            for child in inner.objects().iter().chain(inner.unbounded()) {
                split_add_object(leaves, child);
            }
            return;
        }
    }
    leaves.push(Arc::clone(object));
}

impl Bvh {
    /// Builds a BVH over the given precomputed objects. Unions flagged
    /// `split_children` are dissolved into their children first.
    pub fn new(objects: Vec<Arc<Object>>, kind: BvhKind) -> Self {
        let mut split = Vec::with_capacity(objects.len());
        for object in &objects {
            split_add_object(&mut split, object);
        }

        let (bounded, unbounded): (Vec<_>, Vec<_>) =
            split.into_iter().partition(|o| !o.aabb().is_infinite());

        let mut nodes: Vec<BuildNode> = bounded
            .iter()
            .enumerate()
            .map(|(i, o)| BuildNode::leaf(o.aabb(), i as u32))
            .collect();
        let leaves: Vec<u32> = (0..nodes.len() as u32).collect();

        let root = if nodes.is_empty() {
            None
        } else {
            Some(match kind {
                BvhKind::Prtree => prtree::build(&mut nodes, leaves),
                BvhKind::None => {
                    let root = BuildNode::interior(&nodes, leaves);
                    nodes.push(root);
                    (nodes.len() - 1) as u32
                }
            })
        };

        let mut flat = Vec::with_capacity(nodes.len());
        if let Some(root) = root {
            flatten_recursive(&nodes, root, &mut flat);
        }

        debug!(
            target: "dimension::bvh",
            objects = bounded.len(),
            unbounded = unbounded.len(),
            nodes = flat.len(),
            ?kind,
            "built BVH"
        );

        Self {
            id: NEXT_BVH_ID.fetch_add(1, Ordering::Relaxed),
            unbounded,
            objects: bounded,
            flat,
        }
    }

    pub(crate) fn objects(&self) -> &[Arc<Object>] {
        &self.objects
    }

    pub(crate) fn unbounded(&self) -> &[Arc<Object>] {
        &self.unbounded
    }
}

/// Flattens the tree into pre-order, recording each node's sibling skip
fn flatten_recursive(nodes: &[BuildNode], index: u32, flat: &mut Vec<FlatNode>) {
    let current = flat.len();
    let node = &nodes[index as usize];
    flat.push(FlatNode {
        aabb: node.aabb,
        object: node.object,
        skip: 0,
    });

    for &child in &node.children {
        flatten_recursive(nodes, child, flat);
    }

    flat[current].skip = (flat.len() - current) as u32;
}

// endregion Construction

// region Queries

/// Tests for a closer intersection than the best found so far
fn closer_intersection<'a>(
    object: &'a Object,
    ray: &Ray,
    best: &mut Option<Intersection<'a>>,
    t: &mut Number,
) -> bool {
    if let Some(intersection) = object.intersection(ray) {
        if intersection.t < *t {
            *t = intersection.t;
            *best = Some(intersection);
            return true;
        }
    }
    false
}

impl Bvh {
    /// The nearest intersection of the ray with any object in the tree.
    ///
    /// `reset` marks the start of a primary ray, rewinding this thread's
    /// intersection cache.
    pub fn intersection(&self, ray: &Ray, reset: bool) -> Option<Intersection<'_>> {
        let mut best = None;
        let mut t = Number::INFINITY;

        // Unbounded objects are tested every time
        for object in &self.unbounded {
            closer_intersection(object, ray, &mut best, &mut t);
        }

        // Try this slot's cached object first: a hit seeds `t` and prunes
        // most of the traversal
        let (slot, cached) = cache::begin(self.id, reset);
        let mut found = None;
        if let Some(index) = cached {
            let object = &self.objects[index as usize];
            if object.aabb().intersects_ray(ray, t)
                && closer_intersection(object, ray, &mut best, &mut t)
            {
                found = Some(index);
            }
        }

        // Branch-free pre-order walk of the bounded objects
        let mut i = 0;
        while i < self.flat.len() {
            let node = &self.flat[i];
            if node.aabb.intersects_ray(ray, t) {
                if let Some(index) = node.object {
                    if Some(index) != cached
                        && closer_intersection(&self.objects[index as usize], ray, &mut best, &mut t)
                    {
                        found = Some(index);
                    }
                }
                i += 1;
            } else {
                i += node.skip as usize;
            }
        }

        cache::finish(self.id, slot, found);
        best
    }

    /// Whether the point is inside any object in the tree
    pub fn inside(&self, point: Point3) -> bool {
        if self.unbounded.iter().any(|o| o.inside(point)) {
            return true;
        }

        let mut i = 0;
        while i < self.flat.len() {
            let node = &self.flat[i];
            if node.aabb.contains(point) {
                if let Some(index) = node.object {
                    if self.objects[index as usize].inside(point) {
                        return true;
                    }
                }
                i += 1;
            } else {
                i += node.skip as usize;
            }
        }

        false
    }

    /// The bound of everything in the tree
    pub fn bounding_box(&self) -> Aabb {
        if !self.unbounded.is_empty() {
            Aabb::INFINITE
        } else if let Some(root) = self.flat.first() {
            root.aabb
        } else {
            Aabb::ZERO
        }
    }
}

// endregion Queries
