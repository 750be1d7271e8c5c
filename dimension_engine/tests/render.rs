//! End-to-end renders of small seeded scenes.

use approx::assert_relative_eq;
use dimension_engine::camera::perspective::PerspectiveCamera;
use dimension_engine::canvas::rgba::Rgba8Optimizer;
use dimension_engine::canvas::Canvas;
use dimension_engine::core::colour::Colour;
use dimension_engine::core::types::{Number, Point3, Transform, Vector3};
use dimension_engine::light::point::PointLight;
use dimension_engine::object::Object;
use dimension_engine::render::raytrace_scene_sync;
use dimension_engine::scene::Scene;
use dimension_engine::texture::finish::{Ambient, Diffuse, Finish, Reflection};
use dimension_engine::texture::pigment::Pigment;
use dimension_engine::texture::Texture;
use std::sync::Arc;

fn camera_at(z: Number) -> PerspectiveCamera {
    PerspectiveCamera::new(Transform::from_translation(Vector3::new(0.0, 0.0, z)))
}

#[test]
fn lit_red_sphere() {
    // An odd canvas size puts the centre pixel exactly on the optical axis
    let mut scene = Scene::new(camera_at(-3.0).into(), Canvas::new(101, 101));

    scene.objects.push(Object::sphere().with_texture(
        Texture::new().with_pigment(Pigment::solid(Colour::RED)).with_finish(
            Finish::new()
                .with_ambient(Ambient::new(Colour::WHITE * 0.1))
                .with_diffuse(Diffuse::new(0.6)),
        ),
    ));
    scene
        .lights
        .push(PointLight::new(Point3::new(5.0, 5.0, -5.0), Colour::WHITE).into());

    let canvas = raytrace_scene_sync(scene).expect("render should succeed");
    let centre = canvas.pixel(50, 50);

    // Lambert's law at the hit point (0, 0, -1): the light direction is
    // (5, 5, -4)/sqrt(66), so cos(theta) = 4/sqrt(66)
    let cos_theta = 4.0 / Number::sqrt(66.0);
    let expected = 0.1 + 0.6 * cos_theta;
    assert_relative_eq!(centre.r, expected, epsilon = 1e-6);
    assert_relative_eq!(centre.g, 0.0);
    assert_relative_eq!(centre.b, 0.0);

    // Off the sphere entirely: background black
    let corner = canvas.pixel(0, 0);
    assert_eq!(corner, Colour::BLACK);
}

#[test]
fn empty_scene_is_black() {
    let mut scene = Scene::new(camera_at(0.0).into(), Canvas::new(16, 16));
    let rgba = Arc::new(Rgba8Optimizer::new(16, 16));
    scene.canvas.add_optimizer(rgba.clone());

    let canvas = raytrace_scene_sync(scene).expect("render should succeed");

    for y in 0..16 {
        for x in 0..16 {
            assert_eq!(canvas.pixel(x, y), Colour::BLACK);
            assert_eq!(rgba.pixel(x, y), [0, 0, 0, 0]);
        }
    }
}

#[test]
fn facing_mirrors_terminate_at_the_recursion_limit() {
    let mut scene = Scene::new(camera_at(0.0).into(), Canvas::new(8, 8));

    let mirror = Texture::new()
        .with_pigment(Pigment::solid(Colour::rgb(0.1, 0.1, 0.1)))
        .with_finish(Finish::new().with_reflection(Reflection::new(
            Colour::WHITE * 0.5,
            Colour::WHITE * 0.5,
            1.0,
        )));

    scene.objects.push(
        Object::plane(-Vector3::Z)
            .with_trans(Transform::from_translation(Vector3::Z * 4.0))
            .with_texture(mirror.clone()),
    );
    scene.objects.push(
        Object::plane(Vector3::Z)
            .with_trans(Transform::from_translation(Vector3::Z * -4.0))
            .with_texture(mirror),
    );

    scene.reclimit = 5;
    let canvas = raytrace_scene_sync(scene).expect("bounded recursion must terminate");
    assert!(canvas.pixel(4, 4).r.is_finite());
}

#[test]
fn adc_prunes_even_with_a_deep_recursion_limit() {
    let mut scene = Scene::new(camera_at(0.0).into(), Canvas::new(4, 4));

    let mirror = Texture::new()
        .with_pigment(Pigment::solid(Colour::BLACK))
        .with_finish(Finish::new().with_reflection(Reflection::new(
            Colour::WHITE * 0.5,
            Colour::WHITE * 0.5,
            1.0,
        )));

    scene.objects.push(
        Object::plane(-Vector3::Z)
            .with_trans(Transform::from_translation(Vector3::Z * 4.0))
            .with_texture(mirror.clone()),
    );
    scene.objects.push(
        Object::plane(Vector3::Z)
            .with_trans(Transform::from_translation(Vector3::Z * -4.0))
            .with_texture(mirror),
    );

    // Even a practically unbounded depth limit terminates: the mirrors
    // reflect half the light per bounce, so the ADC value decays to nothing
    scene.reclimit = 100;
    scene.adc_bailout = 1e-12;
    let canvas = raytrace_scene_sync(scene).expect("ADC must prune the recursion");
    assert!(canvas.pixel(2, 2).r.is_finite());
}

#[test]
fn transparency_shows_the_inner_sphere() {
    let mut scene = Scene::new(camera_at(-6.0).into(), Canvas::new(31, 31));

    // Outer glass shell: neutral 90% transmit
    scene.objects.push(
        Object::sphere()
            .with_trans(Transform::from_scale(Vector3::splat(2.0)))
            .with_texture(Texture::new().with_pigment(Pigment::solid(
                Colour::WHITE.with_transmit(0.9),
            ))),
    );
    // Opaque red core, lit by its own ambient term
    scene.objects.push(Object::sphere().with_texture(
        Texture::new()
            .with_pigment(Pigment::solid(Colour::RED))
            .with_finish(Finish::new().with_ambient(Ambient::new(Colour::WHITE * 0.8))),
    ));
    scene
        .lights
        .push(PointLight::new(Point3::new(0.0, 0.0, 5.0), Colour::WHITE).into());

    let canvas = raytrace_scene_sync(scene).expect("render should succeed");
    let centre = canvas.pixel(15, 15);

    assert!(centre.r >= 0.5, "inner sphere should glow through, r = {}", centre.r);
    assert!(centre.transmit <= 0.1, "core is opaque, transmit = {}", centre.transmit);
    assert!(centre.g < 0.05, "the core is red, g = {}", centre.g);
}
