//! Sphere primitive for ray tracing.

use std::f32::consts::PI;

use lumen_math::{Aabb, Interval, Vec3};

use crate::{Hit, Material, Primitive, Ray};

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Material,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        let radius = radius.max(0.0);
        Self {
            center,
            radius,
            material,
            bbox: Self::bounds(center, radius),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    fn bounds(center: Vec3, radius: f32) -> Aabb {
        let rvec = Vec3::splat(radius);
        Aabb::from_points(center - rvec, center + rvec)
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // theta: angle down from +Y, phi: angle around Y from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }
}

impl Primitive for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, hit: &mut Hit<'a>) -> bool {
        // Direction is unit length, so a = 1.
        let oc = self.center - ray.origin();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - c;
        if discriminant < 0.0 {
            return false;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = h - sqrtd;
        if !ray_t.surrounds(root) {
            root = h + sqrtd;
            if !ray_t.surrounds(root) {
                return false;
            }
        }

        hit.t = root;
        hit.point = ray.at(root);
        let outward_normal = (hit.point - self.center) / self.radius;
        hit.set_face_normal(ray, outward_normal);
        (hit.u, hit.v) = Self::get_sphere_uv(outward_normal);
        hit.material = &self.material;

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn translate(&mut self, offset: Vec3) {
        self.center += offset;
        self.bbox = Self::bounds(self.center, self.radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, HitType};

    fn grey() -> Material {
        Material::lambertian(Color::splat(0.5))
    }

    #[test]
    fn test_sphere_hit_from_outside() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey());
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut hit = Hit::default();

        assert!(sphere.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut hit));
        assert!((hit.t - 0.5).abs() < 0.001);
        assert_eq!(hit.hit_type, HitType::Outside);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0, grey());
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let mut hit = Hit::default();

        assert!(sphere.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut hit));
        assert!((hit.t - 2.0).abs() < 1e-5);
        assert_eq!(hit.hit_type, HitType::Inside);
        // Outward normal is kept; the facing normal points back at the ray
        assert!((hit.normal - Vec3::X).length() < 1e-5);
        assert!((hit.facing_normal() + Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey());
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        let mut hit = Hit::default();

        assert!(!sphere.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut hit));
        assert!(!hit.is_hit());
    }

    #[test]
    fn test_sphere_translate_moves_bounds() {
        let mut sphere = Sphere::new(Vec3::ZERO, 1.0, grey());
        sphere.translate(Vec3::new(3.0, 0.0, 0.0));

        assert_eq!(sphere.center(), Vec3::new(3.0, 0.0, 0.0));
        assert!((sphere.bounding_box().x.min - 2.0).abs() < 1e-5);
    }
}
