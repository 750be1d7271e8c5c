//! The per-thread intersection cache.
//!
//! Neighbouring pixels usually hit the same object, so each thread remembers
//! the winning object of every traversal along a primary ray's recursion
//! trail. Seeding the next traversal's `t` bound with the cached object's hit
//! prunes most of the tree before it is walked. Slots are indexed by a
//! monotonic per-ray counter, reset at each primary ray; caches are keyed by
//! BVH so nested union traversals stay independent.

use std::cell::RefCell;
use std::collections::HashMap;

pub(crate) const CACHE_SIZE: usize = 32;

#[derive(Default)]
struct IntersectionCache {
    counter: usize,
    objects: [Option<u32>; CACHE_SIZE],
}

thread_local! {
    static CACHES: RefCell<HashMap<u64, IntersectionCache>> = RefCell::new(HashMap::new());
}

/// Starts a traversal: returns the slot index and its cached object, if any.
/// `reset` rewinds the counter for a fresh primary ray.
pub(crate) fn begin(bvh_id: u64, reset: bool) -> (usize, Option<u32>) {
    CACHES.with(|caches| {
        let mut caches = caches.borrow_mut();
        let cache = caches.entry(bvh_id).or_default();
        if reset {
            cache.counter = 0;
        }
        let slot = cache.counter;
        let cached = if slot < CACHE_SIZE { cache.objects[slot] } else { None };
        (slot, cached)
    })
}

/// Finishes a traversal, storing the winning object (or none) and advancing
/// the counter
pub(crate) fn finish(bvh_id: u64, slot: usize, found: Option<u32>) {
    CACHES.with(|caches| {
        let mut caches = caches.borrow_mut();
        let cache = caches.entry(bvh_id).or_default();
        if slot < CACHE_SIZE {
            cache.objects[slot] = found;
            cache.counter = slot + 1;
        }
    });
}
