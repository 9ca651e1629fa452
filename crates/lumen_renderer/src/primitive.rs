//! Primitive trait and the `Hit` record for ray-object intersection.

use lumen_math::{Aabb, Interval, Vec3};

use crate::material::NO_MATERIAL;
use crate::{Material, Ray};

/// Which side of the surface the ray arrived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitType {
    /// Ray struck the surface from outside (against the outward normal).
    Outside,
    /// Ray struck the surface from inside the primitive.
    Inside,
}

impl HitType {
    /// `+1` for outside hits, `-1` for inside hits.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            HitType::Outside => 1.0,
            HitType::Inside => -1.0,
        }
    }
}

/// Record of a ray-object intersection.
///
/// A miss is the value returned by [`Hit::default`]: `t = +inf`.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    /// Distance along the ray, `f32::INFINITY` when nothing was hit
    pub t: f32,
    /// World-space point of intersection
    pub point: Vec3,
    /// Outward geometric normal (unit length)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a Material,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
    pub hit_type: HitType,
}

impl<'a> Default for Hit<'a> {
    fn default() -> Self {
        Self {
            t: f32::INFINITY,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            material: &NO_MATERIAL,
            u: 0.0,
            v: 0.0,
            hit_type: HitType::Outside,
        }
    }
}

impl<'a> Hit<'a> {
    /// True when this record holds an actual intersection.
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.t.is_finite()
    }

    /// Fill in normal and hit side from the ray and the outward normal.
    #[inline]
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.normal = outward_normal;
        self.hit_type = if ray.direction().dot(outward_normal) < 0.0 {
            HitType::Outside
        } else {
            HitType::Inside
        };
    }

    /// Normal flipped to face against the incoming ray.
    #[inline]
    pub fn facing_normal(&self) -> Vec3 {
        self.normal * self.hit_type.sign()
    }
}

/// Geometric object that can be intersected by rays.
pub trait Primitive: Send + Sync {
    /// Test if a ray hits this object strictly inside `ray_t`.
    ///
    /// Returns true if hit, and overwrites `hit` with the intersection.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, hit: &mut Hit<'a>) -> bool;

    /// Axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;

    /// Move the primitive by `offset`. Only valid before the BVH is built.
    fn translate(&mut self, offset: Vec3);
}

/// Nearest hit over a slice of primitives by linear scan.
///
/// This is the O(N) reference the BVH must agree with.
pub fn intersect_all<'a>(primitives: &'a [Box<dyn Primitive>], ray: &Ray, ray_t: Interval) -> Hit<'a> {
    let mut closest = Hit::default();
    let mut interval = ray_t;
    for primitive in primitives {
        if primitive.hit(ray, interval, &mut closest) {
            interval = interval.with_max(closest.t);
        }
    }
    closest
}

/// Bounding box of a set of primitives.
pub fn bounds_of(primitives: &[Box<dyn Primitive>]) -> Aabb {
    primitives
        .iter()
        .fold(Aabb::EMPTY, |acc, p| Aabb::surrounding(&acc, &p.bounding_box()))
}
