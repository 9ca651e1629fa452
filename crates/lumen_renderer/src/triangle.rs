//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use lumen_math::{Aabb, Interval, Vec3};

use crate::{Hit, Material, Primitive, Ray};

/// A triangle primitive. Double sided: the winding order `v0 -> v1 -> v2`
/// defines the outward normal and therefore the hit side.
#[derive(Debug, Clone)]
pub struct Triangle {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length)
    normal: Vec3,
    material: Material,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Material) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        Self::with_normal(v0, v1, v2, normal, material)
    }

    /// Create a triangle with an explicit normal (e.g. from a mesh file).
    pub fn with_normal(v0: Vec3, v1: Vec3, v2: Vec3, normal: Vec3, material: Material) -> Self {
        Self {
            v0,
            v1,
            v2,
            normal: normal.normalize_or_zero(),
            material,
            bbox: Self::bounds(v0, v1, v2),
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    fn bounds(v0: Vec3, v1: Vec3, v2: Vec3) -> Aabb {
        // from_points pads thin dimensions, so axis-aligned triangles still
        // get a box with volume
        Aabb::from_points(v0.min(v1).min(v2), v0.max(v1).max(v2))
    }
}

impl Primitive for Triangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, hit: &mut Hit<'a>) -> bool {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return false;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let t = f * edge2.dot(q);
        if !ray_t.surrounds(t) {
            return false;
        }

        hit.t = t;
        hit.point = ray.at(t);
        hit.set_face_normal(ray, self.normal);
        hit.u = u;
        hit.v = v;
        hit.material = &self.material;

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn translate(&mut self, offset: Vec3) {
        self.v0 += offset;
        self.v1 += offset;
        self.v2 += offset;
        self.bbox = Self::bounds(self.v0, self.v1, self.v2);
    }
}
