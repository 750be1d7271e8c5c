//! Triangle fans.
//!
//! A fan of `k` triangles sharing a vertex stores one full change-of-basis
//! transform (on the owning object) for the first triangle, and six doubles
//! per extra triangle: the non-trivial entries of the *incremental* basis
//! change from one triangle to the next. Rays are re-based incrementally, so
//! each additional triangle costs a handful of multiplies and no extra
//! storage beyond its coefficients. Smooth fans carry three more doubles per
//! triangle for the next vertex normal.

use crate::core::types::{Number, Point3, Transform, Vector3};
use crate::shape::triangle::{bound_canonical_triangle, ray_triangle_intersection};
use crate::shape::{Shape, ShapeIntersection};
use crate::shared::aabb::Aabb;
use crate::shared::ray::Ray;
use crate::shared::transform;

/// Change basis from one triangle to the next. Only the first six
/// coefficients are used, so smooth-fan coefficient rows work too.
#[inline]
fn change_basis(coeffs: &[Number], v: Vector3) -> Vector3 {
    Vector3::new(
        coeffs[0] * v.x + coeffs[1] * v.z + v.y,
        coeffs[2] * v.x + coeffs[3] * v.z,
        coeffs[4] * v.x + coeffs[5] * v.z,
    )
}

/// Change basis from one triangle to the next for a normal vector
#[inline]
fn change_normal_basis(coeffs: &[Number], n: Vector3) -> Vector3 {
    Vector3::new(
        coeffs[0] * n.x + coeffs[2] * n.y + coeffs[4] * n.z,
        n.x,
        coeffs[1] * n.x + coeffs[3] * n.y + coeffs[5] * n.z,
    )
}

/// Change basis from one triangle to the next for a whole ray
#[inline]
fn change_ray_basis(coeffs: &[Number], ray: &Ray) -> Ray {
    Ray::new(change_basis(coeffs, ray.x0()), change_basis(coeffs, ray.n()))
}

/// Extracts the six non-trivial entries of an incremental basis change
fn compress_coeffs(incremental: &Transform) -> [Number; 6] {
    let m = incremental.matrix3;
    [
        m.x_axis.x, m.z_axis.x,
        m.x_axis.y, m.z_axis.y,
        m.x_axis.z, m.z_axis.z,
    ]
}

/// Rebuilds the incremental matrix from its compressed coefficients
fn decompress_coeffs(coeffs: &[Number; 6]) -> Transform {
    Transform::from_cols(
        Vector3::new(coeffs[0], coeffs[2], coeffs[4]),
        Vector3::X,
        Vector3::new(coeffs[1], coeffs[3], coeffs[5]),
        Vector3::ZERO,
    )
}

/// Accumulates the bound over every vertex of the fan: the first triangle's
/// corners, then each further vertex recovered by inverting the incremental
/// basis changes
fn bound_fan(trans: &Transform, coeffs: impl Iterator<Item = [Number; 6]>) -> Aabb {
    let mut box_ = bound_canonical_triangle(trans);
    let mut trans = *trans;
    for c in coeffs {
        let incremental = decompress_coeffs(&c);
        trans = trans * transform::inverse(&incremental);
        box_ = box_.swallow(trans.transform_point3(Point3::Y));
    }
    box_
}

/// A fan of flat triangles
#[derive(Clone, Debug)]
pub struct TriangleFan {
    pub(crate) coeffs: Vec<[Number; 6]>,
}

impl TriangleFan {
    /// Builds the fan over the given vertices (at least three), returning the
    /// shape and the intrinsic transform of the first triangle
    pub(crate) fn build(vertices: &[Point3]) -> (Self, Transform) {
        let a = vertices[0];
        let mut ab = vertices[1] - a;
        let mut ac = vertices[2] - a;
        let mut basis = super::triangle::triangle_basis(a, ab, ac);
        let intrinsic = basis;

        let mut coeffs = Vec::with_capacity(vertices.len() - 3);
        for vertex in &vertices[3..] {
            ab = ac;
            ac = *vertex - a;

            let new_basis = super::triangle::triangle_basis(a, ab, ac);
            let incremental = transform::inverse(&new_basis) * basis;
            coeffs.push(compress_coeffs(&incremental));

            basis = new_basis;
        }

        (Self { coeffs }, intrinsic)
    }
}

impl Shape for TriangleFan {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        let mut ray = *ray;
        let mut best_t = Number::INFINITY;

        if let Some((t, _, _)) = ray_triangle_intersection(&ray) {
            best_t = t;
        }

        let mut normal = Vector3::Z;
        let mut best_normal = normal;

        for coeffs in &self.coeffs {
            ray = change_ray_basis(coeffs, &ray);
            normal = change_normal_basis(coeffs, normal);

            if let Some((t, _, _)) = ray_triangle_intersection(&ray) {
                if t < best_t {
                    best_t = t;
                    best_normal = normal;
                }
            }
        }

        if best_t.is_finite() {
            Some(ShapeIntersection::local(best_t, best_normal))
        } else {
            None
        }
    }

    fn inside(&self, _point: Point3) -> bool {
        false
    }

    fn bound(&self, trans: &Transform) -> Aabb {
        bound_fan(trans, self.coeffs.iter().copied())
    }
}

/// A fan of triangles with per-vertex normals. The normals live in the first
/// triangle's basis; each extra triangle stores its far vertex normal
/// relative to `na` alongside the basis-change coefficients.
#[derive(Clone, Debug)]
pub struct SmoothTriangleFan {
    pub(crate) na: Vector3,
    pub(crate) nab: Vector3,
    pub(crate) nac: Vector3,
    pub(crate) coeffs: Vec<[Number; 9]>,
}

impl SmoothTriangleFan {
    pub(crate) fn build(vertices: &[Point3], normals: &[Vector3]) -> (Self, Transform) {
        let a = vertices[0];
        let mut ab = vertices[1] - a;
        let mut ac = vertices[2] - a;
        let mut basis = super::triangle::triangle_basis(a, ab, ac);
        let first_basis = basis;

        // The first three normals, in the first triangle's basis. Normals
        // are covariant: they enter the local frame through the transpose of
        // the forward basis matrix.
        let na = transform::normal(&first_basis, normals[0]);
        let nb = transform::normal(&first_basis, normals[1]);
        let nc = transform::normal(&first_basis, normals[2]);

        let mut fan = Self {
            na,
            nab: nb - na,
            nac: nc - na,
            coeffs: Vec::with_capacity(vertices.len() - 3),
        };

        for (vertex, vnormal) in vertices[3..].iter().zip(&normals[3..]) {
            ab = ac;
            ac = *vertex - a;

            let new_basis = super::triangle::triangle_basis(a, ab, ac);
            let incremental = transform::inverse(&new_basis) * basis;
            let c = compress_coeffs(&incremental);

            // The far normal also lives in the *first* basis
            let nc = transform::normal(&first_basis, *vnormal);
            let nac = nc - na;
            fan.coeffs.push([c[0], c[1], c[2], c[3], c[4], c[5], nac.x, nac.y, nac.z]);

            basis = new_basis;
        }

        (fan, first_basis)
    }
}

impl Shape for SmoothTriangleFan {
    fn intersect<'s>(&'s self, ray: &Ray) -> Option<ShapeIntersection<'s>> {
        let mut ray = *ray;
        let mut nab = self.nab;
        let mut nac = self.nac;

        let mut best_t = Number::INFINITY;
        let mut best_normal = Vector3::ZERO;
        if let Some((t, u, v)) = ray_triangle_intersection(&ray) {
            best_t = t;
            best_normal = nab * u + nac * v;
        }

        for coeffs in &self.coeffs {
            ray = change_ray_basis(&coeffs[..6], &ray);
            nab = nac;
            nac = Vector3::new(coeffs[6], coeffs[7], coeffs[8]);

            if let Some((t, u, v)) = ray_triangle_intersection(&ray) {
                if t < best_t {
                    best_t = t;
                    best_normal = nab * u + nac * v;
                }
            }
        }

        if best_t.is_finite() {
            Some(ShapeIntersection::local(best_t, self.na + best_normal))
        } else {
            None
        }
    }

    fn inside(&self, _point: Point3) -> bool {
        false
    }

    fn bound(&self, trans: &Transform) -> Aabb {
        bound_fan(
            trans,
            self.coeffs
                .iter()
                .map(|c| [c[0], c[1], c[2], c[3], c[4], c[5]]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// A quad in the z = 2 plane, fanned from its first corner
    fn quad() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(1.0, 1.0, 2.0),
            Point3::new(0.0, 1.0, 2.0),
        ]
    }

    #[test]
    fn fan_covers_both_triangles() {
        let (fan, intrinsic) = TriangleFan::build(&quad());
        let to_local = transform::inverse(&intrinsic);

        // One point in each half of the quad
        for point in [Point3::new(0.75, 0.25, 2.0), Point3::new(0.25, 0.75, 2.0)] {
            let world = Ray::new(Point3::new(point.x, point.y, 0.0), Vector3::Z);
            let hit = fan
                .intersect(&world.transformed(&to_local))
                .unwrap_or_else(|| panic!("fan should cover {point:?}"));
            assert_relative_eq!(hit.t, 2.0, epsilon = 1e-9);
        }

        // And a miss just outside
        let outside = Ray::new(Point3::new(1.25, 0.5, 0.0), Vector3::Z);
        assert!(fan.intersect(&outside.transformed(&to_local)).is_none());
    }

    #[test]
    fn fan_bound_covers_all_vertices() {
        let (fan, intrinsic) = TriangleFan::build(&quad());
        let bound = fan.bound(&intrinsic);
        for v in quad() {
            assert!(bound.contains(v), "bound should contain {v:?}");
        }
    }

    #[test]
    fn smooth_fan_interpolates_normals() {
        let normals = vec![Vector3::Z; 4];
        let (fan, intrinsic) = SmoothTriangleFan::build(&quad(), &normals);
        let to_local = transform::inverse(&intrinsic);

        let world = Ray::new(Point3::new(0.25, 0.75, 0.0), Vector3::Z);
        let hit = fan.intersect(&world.transformed(&to_local)).expect("should hit");
        // All vertex normals agree, so the interpolated local normal maps
        // back to +z in world space
        let world_normal = transform::normal(&to_local, hit.normal);
        assert_relative_eq!(world_normal.z, 1.0, epsilon = 1e-9);
    }
}
