//! Affine transform helpers on top of [`glam::DAffine3`].

use crate::core::types::{Number, Transform, Vector3, EPSILON};

/// Inverts a transform, recovering with the identity if it is singular.
///
/// A singular object or texture transform is a degenerate scene description,
/// not a reason to abort a render.
pub fn inverse(trans: &Transform) -> Transform {
    if trans.matrix3.determinant().abs() < EPSILON {
        tracing::warn!(target: "dimension::maths", "singular transform; using identity");
        return Transform::IDENTITY;
    }
    trans.inverse()
}

/// Transforms a surface normal, given the *inverse* of the transform that
/// moves the surface. Normals map through the inverse transpose of the
/// linear part, then re-normalise.
pub fn normal(trans_inv: &Transform, n: Vector3) -> Vector3 {
    (trans_inv.matrix3.transpose() * n).normalize()
}

/// A rotation about `axis_angle.normalize()` by `axis_angle.length()` radians
pub fn rotation(axis_angle: Vector3) -> Transform {
    let angle = axis_angle.length();
    if angle.abs() < EPSILON {
        return Transform::IDENTITY;
    }
    Transform::from_axis_angle(axis_angle / angle, angle)
}

/// The largest absolute difference between `m * inverse(m)` and the identity
#[cfg(test)]
pub fn inverse_residual(trans: &Transform) -> Number {
    let prod = *trans * inverse(trans);
    let diff = |a: Vector3, b: Vector3| (a - b).abs().max_element();
    diff(prod.matrix3.x_axis, Vector3::X)
        .max(diff(prod.matrix3.y_axis, Vector3::Y))
        .max(diff(prod.matrix3.z_axis, Vector3::Z))
        .max(prod.translation.abs().max_element())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn inverse_contract() {
        let cases = [
            Transform::from_scale(Vector3::new(2.0, 3.0, 0.5)),
            Transform::from_translation(Vector3::new(1.0, -2.0, 7.0)),
            rotation(Vector3::new(0.3, 1.2, -0.7)),
            Transform::from_scale(Vector3::new(2.0, 3.0, 0.5))
                * rotation(Vector3::new(0.3, 1.2, -0.7))
                * Transform::from_translation(Vector3::new(1.0, -2.0, 7.0)),
        ];
        for trans in cases {
            assert!(
                inverse_residual(&trans) < 1e-9,
                "inverse contract violated for {trans:?}"
            );
        }
    }

    #[test]
    fn singular_recovers_with_identity() {
        let singular = Transform::from_scale(Vector3::new(1.0, 1.0, 0.0));
        assert_eq!(inverse(&singular), Transform::IDENTITY);
    }

    #[test]
    fn normals_follow_inverse_transpose() {
        // Scaling a surface by (2, 1, 1) leaves the x-facing normal x-facing
        let trans = Transform::from_scale(Vector3::new(2.0, 1.0, 1.0));
        let n = normal(&inverse(&trans), Vector3::X);
        assert_relative_eq!(n.x, 1.0);

        // But a 45-degree-slanted normal shears towards y
        let slanted = normal(&inverse(&trans), Vector3::new(1.0, 1.0, 0.0).normalize());
        assert!(slanted.y > slanted.x);
    }

    #[test]
    fn rotation_moves_points() {
        let trans = rotation(Vector3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2));
        let p = trans.transform_point3(Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }
}
