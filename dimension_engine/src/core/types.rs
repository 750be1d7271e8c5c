use crate::core::colour::Colour;

/// Numeric type used for all geometric calculations in the engine
pub type Number = f64;
pub type Vector3 = glam::DVec3;
pub type Point3 = glam::DVec3;
/// Column-major 3x4 affine transform; the implicit last row is `[0 0 0 1]`
pub type Transform = glam::DAffine3;

/// The colour of a pixel, including its transparency channels
pub type Tcolour = Colour;

/// Tolerance for geometric comparisons.
///
/// Secondary rays are offset by this much along their direction to avoid
/// re-intersecting the surface they originate from.
pub const EPSILON: Number = 1e-9;
