//! Scene objects: a shape plus its transforms, texture and interior.
//!
//! Objects are assembled freely, then **precomputed** once before rendering:
//! precompute combines the user and intrinsic transforms (folding parent
//! transforms into CSG children), caches the inverse, computes a world-space
//! bounding box, cascades textures and interiors into children, and builds
//! the inner BVH of unions. Precomputing an object twice is a fatal error.

use crate::core::error::engine_assert;
use crate::core::types::{Number, Point3, Transform, Vector3};
use crate::shape::cone::{Cone, ConeCap};
use crate::shape::cube::Cube;
use crate::shape::csg::{CsgDifference, CsgIntersection, CsgMerge, Union};
use crate::shape::cylinder::Cylinder;
use crate::shape::plane::Plane;
use crate::shape::sphere::Sphere;
use crate::shape::torus::Torus;
use crate::shape::triangle::{triangle_basis, SmoothTriangle, Triangle};
use crate::shape::triangle_fan::{SmoothTriangleFan, TriangleFan};
use crate::shape::{Shape, ShapeInstance};
use crate::shared::aabb::Aabb;
use crate::shared::intersect::Intersection;
use crate::shared::ray::Ray;
use crate::shared::transform;
use crate::texture::interior::{self, Interior};
use crate::texture::{self, Texture};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct Object {
    pub shape: ShapeInstance,
    /// Surface appearance; cascaded from the parent or scene default if unset
    pub texture: Option<Arc<Texture>>,
    /// Inside properties; cascaded like the texture
    pub interior: Option<Arc<Interior>>,
    /// The user transform
    pub trans: Transform,
    /// The shape-intrinsic transform, e.g. the change of basis of a triangle
    pub intrinsic_trans: Transform,
    /// Unions hoist their children into the enclosing BVH
    pub split_children: bool,
    trans_inv: Transform,
    pigment_trans: Transform,
    aabb: Aabb,
    precomputed: bool,
}

// region Construction

impl Object {
    pub fn new(shape: impl Into<ShapeInstance>) -> Self {
        Self {
            shape: shape.into(),
            texture: None,
            interior: None,
            trans: Transform::IDENTITY,
            intrinsic_trans: Transform::IDENTITY,
            split_children: false,
            trans_inv: Transform::IDENTITY,
            pigment_trans: Transform::IDENTITY,
            aabb: Aabb::ZERO,
            precomputed: false,
        }
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(Arc::new(texture));
        self
    }

    pub fn with_interior(mut self, interior: Interior) -> Self {
        self.interior = Some(Arc::new(interior));
        self
    }

    pub fn with_trans(mut self, trans: Transform) -> Self {
        self.trans = trans;
        self
    }

    /// The unit sphere
    pub fn sphere() -> Self {
        Self::new(Sphere)
    }

    /// The cube spanning `[-1, 1]^3`
    pub fn cube() -> Self {
        Self::new(Cube::default())
    }

    /// The half-space boundary through the origin
    pub fn plane(normal: Vector3) -> Self {
        Self::new(Plane::new(normal))
    }

    /// A torus in the `xy`-plane
    pub fn torus(major: Number, minor: Number) -> Self {
        Self::new(Torus { major, minor })
    }

    /// A cone frustum from radius `r1` at `y = -1` to `r2` at `y = +1`;
    /// closed cones become a union with their two caps
    pub fn cone(r1: Number, r2: Number, open: bool) -> Self {
        let cone = Self::new(Cone { r1, r2 });
        if open {
            return cone;
        }
        Self::union(vec![cone, Self::cap(r1, -1.0), Self::cap(r2, 1.0)])
    }

    /// A cylinder of radius `r` from `y = -1` to `y = +1`
    pub fn cylinder(r: Number, open: bool) -> Self {
        let cylinder = Self::new(Cylinder { r });
        if open {
            return cylinder;
        }
        Self::union(vec![cylinder, Self::cap(r, -1.0), Self::cap(r, 1.0)])
    }

    /// An end cap at `y = offset`; the top cap's normal is flipped outward
    fn cap(r: Number, offset: Number) -> Self {
        let mut cap = Self::new(ConeCap { r });
        let flip = if offset > 0.0 { -1.0 } else { 1.0 };
        cap.intrinsic_trans = Transform::from_mat3_translation(
            glam::DMat3::from_diagonal(Vector3::new(1.0, flip, 1.0)),
            Vector3::new(0.0, offset, 0.0),
        );
        cap
    }

    /// A flat triangle over the given vertices
    pub fn triangle(vertices: [Point3; 3]) -> Self {
        let [a, b, c] = vertices;
        let mut object = Self::new(Triangle::default());
        object.intrinsic_trans = triangle_basis(a, b - a, c - a);
        object
    }

    /// A triangle with per-vertex normals
    pub fn smooth_triangle(vertices: [Point3; 3], normals: [Vector3; 3]) -> Self {
        let [a, b, c] = vertices;
        let basis = triangle_basis(a, b - a, c - a);

        let na = transform::normal(&basis, normals[0]);
        let nb = transform::normal(&basis, normals[1]);
        let nc = transform::normal(&basis, normals[2]);

        let mut object = Self::new(SmoothTriangle {
            na,
            nab: nb - na,
            nac: nc - na,
        });
        object.intrinsic_trans = basis;
        object
    }

    /// A fan of triangles over at least three vertices
    pub fn triangle_fan(vertices: &[Point3]) -> Self {
        engine_assert!(vertices.len() >= 3, "not enough vertices for one triangle");
        let (fan, intrinsic) = TriangleFan::build(vertices);
        let mut object = Self::new(fan);
        object.intrinsic_trans = intrinsic;
        object
    }

    /// A fan of triangles with per-vertex normals
    pub fn smooth_triangle_fan(vertices: &[Point3], normals: &[Vector3]) -> Self {
        engine_assert!(vertices.len() >= 3, "not enough vertices for one triangle");
        engine_assert!(vertices.len() == normals.len(), "one normal per vertex");
        let (fan, intrinsic) = SmoothTriangleFan::build(vertices, normals);
        let mut object = Self::new(fan);
        object.intrinsic_trans = intrinsic;
        object
    }

    /// A bulk union of any number of children
    pub fn union(children: Vec<Object>) -> Self {
        let mut object = Self::new(Union::new(children));
        object.split_children = true;
        object
    }

    /// The region inside both `a` and `b`
    pub fn csg_intersection(a: Object, b: Object) -> Self {
        Self::new(CsgIntersection::new(a, b))
    }

    /// The region inside `a` but outside `b`
    pub fn csg_difference(a: Object, b: Object) -> Self {
        Self::new(CsgDifference::new(a, b))
    }

    /// The union of `a` and `b` without internal surfaces
    pub fn csg_merge(a: Object, b: Object) -> Self {
        Self::new(CsgMerge::new(a, b))
    }
}

// endregion Construction

// region Precompute

impl Object {
    pub fn precomputed(&self) -> bool {
        self.precomputed
    }

    /// The world-space bounding box, valid after precompute
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// The inverse of the combined world transform, valid after precompute
    pub fn trans_inv(&self) -> &Transform {
        &self.trans_inv
    }

    /// The world-to-pigment-space transform, valid after precompute
    pub fn pigment_trans(&self) -> &Transform {
        &self.pigment_trans
    }

    /// Precomputes this object (and its children) for rendering.
    /// Precomputing twice is a fatal error.
    pub fn precompute(&mut self) {
        let pigment_trans = transform::inverse(&self.trans);
        self.precompute_recursive(&Transform::IDENTITY, pigment_trans);
    }

    fn precompute_recursive(&mut self, parent_trans: &Transform, pigment_trans: Transform) {
        engine_assert!(!self.precomputed, "object double-precomputed");
        self.precomputed = true;

        // Initialize our own texture if the parent has not already done so
        texture::cascade(None, &mut self.texture);

        let total_trans = *parent_trans * self.trans * self.intrinsic_trans;

        // Precompute the children, folding our transform into theirs
        let is_csg = match &mut self.shape {
            ShapeInstance::Union(union) => {
                let children = std::mem::take(&mut union.children);
                let mut precomputed = Vec::with_capacity(children.len());
                for mut child in children {
                    Self::precompute_child(&mut child, self.texture.as_ref(), self.interior.as_ref(), &total_trans, pigment_trans);
                    precomputed.push(Arc::new(child));
                }
                union.build(precomputed);
                true
            }
            ShapeInstance::CsgIntersection(CsgIntersection { pair })
            | ShapeInstance::CsgDifference(CsgDifference { pair })
            | ShapeInstance::CsgMerge(CsgMerge { pair }) => {
                Self::precompute_child(&mut pair.a, self.texture.as_ref(), self.interior.as_ref(), &total_trans, pigment_trans);
                Self::precompute_child(&mut pair.b, self.texture.as_ref(), self.interior.as_ref(), &total_trans, pigment_trans);
                true
            }
            _ => false,
        };

        self.pigment_trans = pigment_trans;
        // CSG children have absorbed the whole transform chain, so composite
        // queries already run in the parent frame
        self.trans_inv = if is_csg {
            Transform::IDENTITY
        } else {
            transform::inverse(&total_trans)
        };
        self.aabb = self.shape.bound(&total_trans);
    }

    fn precompute_child(
        child: &mut Object,
        texture: Option<&Arc<Texture>>,
        interior: Option<&Arc<Interior>>,
        total_trans: &Transform,
        pigment_trans: Transform,
    ) {
        // A child with its own pigment evaluates it in its own frame;
        // cascaded pigments stay in the ancestor's pigment space
        let has_own_pigment = child
            .texture
            .as_ref()
            .is_some_and(|t| t.pigment.is_some());
        let child_pigment_trans = if has_own_pigment {
            transform::inverse(&(*total_trans * child.trans))
        } else {
            pigment_trans
        };

        texture::cascade(texture, &mut child.texture);
        interior::cascade(interior, &mut child.interior);
        child.precompute_recursive(total_trans, child_pigment_trans);
    }
}

// endregion Precompute

// region Queries

impl Object {
    /// The nearest intersection of a world-space ray with this object.
    ///
    /// The ray is mapped into shape-local space, and the surface normal back
    /// out through the inverse transpose. For CSG composites the hit reports
    /// the primitive child that was struck.
    pub fn intersection(&self, ray: &Ray) -> Option<Intersection<'_>> {
        let local = ray.transformed(&self.trans_inv);
        let hit = self.shape.intersect(&local)?;

        Some(match hit.child {
            Some(child) => Intersection {
                t: hit.t,
                normal: hit.normal,
                ray: *ray,
                object: child,
            },
            None => Intersection {
                t: hit.t,
                normal: transform::normal(&self.trans_inv, hit.normal),
                ray: *ray,
                object: self,
            },
        })
    }

    /// Whether a world-space point lies inside this object
    pub fn inside(&self, point: Point3) -> bool {
        self.shape.inside(self.trans_inv.transform_point3(point))
    }
}

// endregion Queries

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn scaled_cube_hit() {
        let mut cube = Object::cube().with_trans(Transform::from_scale(Vector3::new(2.0, 1.0, 1.0)));
        cube.precompute();

        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::Z);
        let hit = cube.intersection(&ray).expect("should hit");
        assert_relative_eq!(hit.t, 4.0);
        assert_relative_eq!(hit.normal.z, -1.0);
        assert_eq!(hit.position(), Point3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn translated_sphere_bound() {
        let mut sphere = Object::sphere().with_trans(Transform::from_translation(Vector3::new(3.0, 0.0, 0.0)));
        sphere.precompute();
        assert_relative_eq!(sphere.aabb().min().x, 2.0);
        assert_relative_eq!(sphere.aabb().max().x, 4.0);
    }

    #[test]
    fn transformed_normals_are_renormalised() {
        let mut sphere = Object::sphere().with_trans(Transform::from_scale(Vector3::new(4.0, 1.0, 1.0)));
        sphere.precompute();
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::Z);
        let hit = sphere.intersection(&ray).expect("should hit");
        assert_relative_eq!(hit.normal.length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    #[should_panic(expected = "double-precomputed")]
    fn double_precompute_is_fatal() {
        let mut sphere = Object::sphere();
        sphere.precompute();
        sphere.precompute();
    }
}
