//! Render orchestration.
//!
//! [`raytrace_scene`] hands back a [`Future`] immediately; a background
//! thread precomputes the scene, builds the PR-tree, and forks one worker
//! per hardware thread. Workers own the image rows congruent to their index
//! modulo the worker count, so no two threads ever touch the same pixel, and
//! report each finished row through the future.

mod raytrace;

use crate::bvh::{Bvh, BvhKind};
use crate::canvas::{Canvas, CanvasBand};
use crate::camera::{Camera, CameraInstance};
use crate::concurrent::{execute_concurrently, threads::hardware_concurrency, Future, FutureCore};
use crate::core::error::EngineError;
use crate::core::types::Number;
use crate::object::Object;
use crate::scene::{Region, Scene};
use itertools::Itertools;
use raytrace::Raytracer;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Renders a scene in the background.
///
/// The future's progress runs from zero to the canvas height as rows
/// complete; joining yields the fully-populated canvas, or the first error
/// (in which case the canvas contents are undefined).
pub fn raytrace_scene(scene: Scene) -> Future<Canvas> {
    Future::spawn(move |core| render_thread(scene, core))
}

/// Renders a scene, blocking until it completes
pub fn raytrace_scene_sync(scene: Scene) -> Result<Canvas, EngineError> {
    raytrace_scene(scene).join()
}

fn render_thread(mut scene: Scene, core: &Arc<FutureCore>) -> Result<Canvas, EngineError> {
    // Precompute transforms, cascade textures, and build the spatial index
    let start = Instant::now();
    scene.initialize();
    let objects: Vec<Arc<Object>> = scene.objects.drain(..).map(Arc::new).collect();
    let bvh = Bvh::new(objects, BvhKind::Prtree);
    debug!(target: "dimension::render", elapsed = ?start.elapsed(), "bounding hierarchy ready");

    let height = scene.canvas.height();
    core.set_total(height);

    let nthreads = match scene.nthreads {
        0 => hardware_concurrency(),
        n => n,
    }
    .clamp(1, height.max(1));

    let width = scene.canvas.width();
    let region = scene.region.unwrap_or(Region {
        x: 0,
        y: 0,
        outer_width: width,
        outer_height: height,
    });

    let start = Instant::now();
    {
        let tracer = Raytracer {
            lights: &scene.lights,
            background: &scene.background,
            quality: scene.quality,
            reclimit: scene.reclimit,
            adc_bailout: scene.adc_bailout,
            bvh: &bvh,
        };
        let camera = &scene.camera;
        let tracer = &tracer;
        let region = &region;

        let tasks = scene
            .canvas
            .bands(nthreads)
            .into_iter()
            .map(|band| {
                let core = Arc::clone(core);
                move |_thread: usize, _nthreads: usize| render_band(band, camera, tracer, region, &core)
            })
            .collect_vec();

        execute_concurrently(Some(core), tasks)?;
    }
    debug!(target: "dimension::render", elapsed = ?start.elapsed(), nthreads, "render complete");

    Ok(scene.canvas)
}

/// Renders one worker's rows, reporting each completed row
fn render_band(
    band: CanvasBand<'_>,
    camera: &CameraInstance,
    tracer: &Raytracer<'_>,
    region: &Region,
    core: &FutureCore,
) -> Result<(), EngineError> {
    let (optimizers, rows) = band.into_parts();
    let x_scale = (region.outer_width.saturating_sub(1)).max(1) as Number;
    let y_scale = (region.outer_height.saturating_sub(1)).max(1) as Number;

    for (y, row) in rows {
        for (x, pixel) in row.iter_mut().enumerate() {
            let ray = camera.camera_ray(
                (x + region.x) as Number / x_scale,
                (y + region.y) as Number / y_scale,
            );
            let colour = tracer.shoot_pixel(&ray);
            *pixel = colour;
            for optimizer in optimizers {
                optimizer.pixel_written(x, y, colour);
            }
        }

        // The cancellation and pause point, once per row
        core.increment()?;
    }

    Ok(())
}
