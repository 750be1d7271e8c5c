//! PR-tree correctness and efficiency tests: the tree must agree with a
//! brute-force scan on every query, while touching almost none of the
//! objects.

use dimension_engine::bvh::{Bvh, BvhKind};
use dimension_engine::core::types::{Number, Point3, Transform, Vector3};
use dimension_engine::object::Object;
use dimension_engine::shape::dynamic::DynamicShape;
use dimension_engine::shape::{Shape, ShapeIntersection};
use dimension_engine::shared::aabb::Aabb;
use dimension_engine::shared::intersect::Intersection;
use dimension_engine::shared::ray::Ray;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn random_vector(rng: &mut SmallRng, scale: Number) -> Vector3 {
    Vector3::new(
        rng.gen_range(-scale..scale),
        rng.gen_range(-scale..scale),
        rng.gen_range(-scale..scale),
    )
}

/// A random small cube somewhere in the scene
fn random_box(rng: &mut SmallRng) -> Object {
    let size = rng.gen_range(0.05..0.3);
    let trans = Transform::from_translation(random_vector(rng, 4.0))
        * Transform::from_scale(Vector3::splat(size));
    let mut object = Object::cube().with_trans(trans);
    object.precompute();
    object
}

fn random_ray(rng: &mut SmallRng) -> Ray {
    Ray::new(random_vector(rng, 6.0), random_vector(rng, 1.0))
}

/// The nearest hit over a plain scan of every object
fn brute_force<'a>(objects: &'a [Arc<Object>], ray: &Ray) -> Option<Intersection<'a>> {
    let mut best: Option<Intersection> = None;
    for object in objects {
        if let Some(hit) = object.intersection(ray) {
            if best.as_ref().map_or(true, |b| hit.t < b.t) {
                best = Some(hit);
            }
        }
    }
    best
}

#[test]
fn nearest_hit_matches_brute_force() {
    let mut rng = SmallRng::seed_from_u64(0x0dd5eed);
    let objects: Vec<Arc<Object>> = (0..1000).map(|_| Arc::new(random_box(&mut rng))).collect();
    let bvh = Bvh::new(objects.clone(), BvhKind::Prtree);

    for _ in 0..500 {
        let ray = random_ray(&mut rng);
        let expected = brute_force(&objects, &ray);
        let found = bvh.intersection(&ray, true);

        match (expected, found) {
            (None, None) => {}
            (Some(e), Some(f)) => {
                assert!((e.t - f.t).abs() < 1e-9, "{} != {} for {ray:?}", e.t, f.t)
            }
            (e, f) => panic!(
                "tree and scan disagree for {ray:?}: scan {:?}, tree {:?}",
                e.map(|i| i.t),
                f.map(|i| i.t)
            ),
        }
    }
}

#[test]
fn construction_is_permutation_independent() {
    let mut rng = SmallRng::seed_from_u64(42);
    let objects: Vec<Arc<Object>> = (0..300).map(|_| Arc::new(random_box(&mut rng))).collect();

    let mut shuffled = objects.clone();
    // Fisher-Yates with the seeded generator
    for i in (1..shuffled.len()).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }

    let forward = Bvh::new(objects, BvhKind::Prtree);
    let backward = Bvh::new(shuffled, BvhKind::Prtree);

    for _ in 0..200 {
        let ray = random_ray(&mut rng);
        let a = forward.intersection(&ray, true).map(|i| i.t);
        let b = backward.intersection(&ray, true).map(|i| i.t);
        match (a, b) {
            (None, None) => {}
            (Some(a), Some(b)) => assert!((a - b).abs() < 1e-9),
            (a, b) => panic!("permuted trees disagree: {a:?} vs {b:?}"),
        }
    }
}

#[test]
fn point_inside_matches_brute_force() {
    let mut rng = SmallRng::seed_from_u64(7);
    let objects: Vec<Arc<Object>> = (0..500).map(|_| Arc::new(random_box(&mut rng))).collect();
    let bvh = Bvh::new(objects.clone(), BvhKind::Prtree);

    for _ in 0..500 {
        let point = random_vector(&mut rng, 5.0);
        let expected = objects.iter().any(|o| o.inside(point));
        assert_eq!(bvh.inside(point), expected, "disagree at {point:?}");
    }
}

/// A unit cube that counts how often its intersection callback runs
#[derive(Clone)]
struct CountingBox {
    calls: Arc<AtomicUsize>,
}

impl Shape for CountingBox {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        const CUBE: dimension_engine::shape::cube::Cube = dimension_engine::shape::cube::Cube;
        CUBE.intersect(ray)
    }

    fn inside(&self, point: Point3) -> bool {
        dimension_engine::shape::cube::Cube::default().inside(point)
    }

    fn bound(&self, trans: &Transform) -> Aabb {
        dimension_engine::shape::cube::Cube::default().bound(trans)
    }
}

fn counting_box(calls: &Arc<AtomicUsize>, at: Vector3) -> Object {
    let mut object = Object::new(DynamicShape::new(CountingBox { calls: Arc::clone(calls) }))
        .with_trans(Transform::from_translation(at));
    object.precompute();
    object
}

#[test]
fn query_touches_at_most_fanout_objects() {
    let calls = Arc::new(AtomicUsize::new(0));

    // 128 disjoint unit cubes on an 8x4x4 grid
    let mut objects = Vec::new();
    for i in 0..8 {
        for j in 0..4 {
            for k in 0..4 {
                let at = Vector3::new(i as Number * 3.0, j as Number * 3.0, k as Number * 3.0);
                objects.push(Arc::new(counting_box(&calls, at)));
            }
        }
    }
    let bvh = Bvh::new(objects, BvhKind::Prtree);

    // Down one grid column: four boxes lie along the ray, the rest must be
    // pruned without ever calling their intersection tests
    let ray = Ray::new(Point3::new(3.0, 3.0, -5.0), Vector3::Z);
    calls.store(0, Ordering::Relaxed);
    let hit = bvh.intersection(&ray, true).expect("should hit the column");
    assert!((hit.t - 4.0).abs() < 1e-9);

    let tested = calls.load(Ordering::Relaxed);
    assert!(tested <= 8, "tested {tested} objects, expected at most the fanout");
}

#[test]
fn plane_wins_over_ten_thousand_boxes() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut rng = SmallRng::seed_from_u64(1234);

    // Small counted boxes scattered clear of the x = 0 corridor
    let mut objects = Vec::new();
    for _ in 0..10_000 {
        let at = Vector3::new(
            rng.gen_range(1.0..5.0),
            rng.gen_range(-0.5..8.0),
            rng.gen_range(-5.0..5.0),
        );
        let scale = Transform::from_scale(Vector3::splat(rng.gen_range(0.01..0.1)));
        let mut object = Object::new(DynamicShape::new(CountingBox { calls: Arc::clone(&calls) }))
            .with_trans(Transform::from_translation(at) * scale);
        object.precompute();
        objects.push(Arc::new(object));
    }

    // One large floor below everything
    let mut floor = Object::plane(Vector3::Y).with_trans(Transform::from_translation(-Vector3::Y));
    floor.precompute();
    objects.push(Arc::new(floor));

    let bvh = Bvh::new(objects, BvhKind::Prtree);

    let ray = Ray::new(Point3::new(0.0, 10.0, 0.0), -Vector3::Y);
    calls.store(0, Ordering::Relaxed);
    let hit = bvh.intersection(&ray, true).expect("the floor is always hit");

    assert!((hit.t - 11.0).abs() < 1e-9, "hit should be the floor, t = {}", hit.t);
    assert_eq!(
        calls.load(Ordering::Relaxed),
        0,
        "no box off the ray's corridor should be tested"
    );
}
