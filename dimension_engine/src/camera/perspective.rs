use crate::camera::Camera;
use crate::core::types::{Number, Point3, Transform, Vector3};
use crate::shared::ray::Ray;
use serde::{Deserialize, Serialize};

/// A perspective camera at the origin looking down `+z`, with a unit focal
/// plane; the transform places it in the world
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    pub trans: Transform,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self { trans: Transform::IDENTITY }
    }
}

impl PerspectiveCamera {
    pub fn new(trans: Transform) -> Self {
        Self { trans }
    }
}

impl Camera for PerspectiveCamera {
    fn camera_ray(&self, x: Number, y: Number) -> Ray {
        let local = Ray::new(Point3::ZERO, Vector3::new(x - 0.5, y - 0.5, 1.0));
        local.transformed(&self.trans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn centre_ray_goes_straight_ahead() {
        let camera = PerspectiveCamera::default();
        let ray = camera.camera_ray(0.5, 0.5);
        assert_eq!(ray.x0(), Point3::ZERO);
        assert_relative_eq!(ray.n().x, 0.0);
        assert_relative_eq!(ray.n().y, 0.0);
        assert_relative_eq!(ray.n().z, 1.0);
    }

    #[test]
    fn transform_moves_the_eye() {
        let camera = PerspectiveCamera::new(Transform::from_translation(Vector3::new(0.0, 0.0, -3.0)));
        let ray = camera.camera_ray(0.5, 0.5);
        assert_eq!(ray.x0(), Point3::new(0.0, 0.0, -3.0));
    }
}
