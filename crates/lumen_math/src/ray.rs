use crate::Vec3;

/// Refractive index of the medium rays start in.
pub const AIR_IOR: f32 = 1.0;

/// A ray in 3D space.
///
/// The direction is normalized on construction, so `t` along the ray is a
/// world-space distance. `medium_ior` is the refractive index of the medium
/// the ray is currently travelling through and `outer_ior` that of the medium
/// enclosing it, which the ray returns to when it exits. Only one level of
/// nesting is remembered; leaving the outer medium returns to air.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    /// Component-wise reciprocal of `direction`, cached for slab tests.
    pub inv_direction: Vec3,
    pub medium_ior: f32,
    pub outer_ior: f32,
}

impl Ray {
    /// Create a ray travelling through air.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self::in_medium(origin, direction, AIR_IOR)
    }

    /// Create a ray travelling through a medium with the given index of
    /// refraction, itself surrounded by air.
    pub fn in_medium(origin: Vec3, direction: Vec3, medium_ior: f32) -> Self {
        let direction = direction.normalize_or_zero();
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
            medium_ior,
            outer_ior: AIR_IOR,
        }
    }

    /// Set the index of the medium surrounding the current one.
    pub fn with_outer_ior(mut self, outer_ior: f32) -> Self {
        self.outer_ior = outer_ior;
        self
    }

    /// Ray from a new origin in the same media as `self`.
    pub fn continued(&self, origin: Vec3, direction: Vec3) -> Self {
        Self::in_medium(origin, direction, self.medium_ior).with_outer_ior(self.outer_ior)
    }

    /// Ray that has crossed into a medium of index `ior` from the current one.
    pub fn entering(&self, origin: Vec3, direction: Vec3, ior: f32) -> Self {
        Self::in_medium(origin, direction, ior).with_outer_ior(self.medium_ior)
    }

    /// Ray that has left the current medium for the enclosing one.
    pub fn exiting(&self, origin: Vec3, direction: Vec3) -> Self {
        Self::in_medium(origin, direction, self.outer_ior)
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the (unit length) direction of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_direction_is_normalized() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 4.0));

        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
        assert!((ray.at(5.0) - Vec3::new(0.0, 3.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn test_ray_defaults_to_air() {
        let ray = Ray::new(Vec3::ONE, Vec3::X);
        assert_eq!(ray.medium_ior, AIR_IOR);

        let inside = Ray::in_medium(Vec3::ONE, Vec3::X, 1.5);
        assert_eq!(inside.medium_ior, 1.5);
        assert_eq!(inside.outer_ior, AIR_IOR);
    }

    #[test]
    fn test_nested_media_unwind() {
        let in_water = Ray::new(Vec3::ZERO, Vec3::Z).entering(Vec3::ZERO, Vec3::Z, 1.33);
        let in_glass = in_water.entering(Vec3::ZERO, Vec3::Z, 1.5);
        assert_eq!((in_glass.medium_ior, in_glass.outer_ior), (1.5, 1.33));

        let bounced = in_glass.continued(Vec3::ONE, -Vec3::Z);
        assert_eq!((bounced.medium_ior, bounced.outer_ior), (1.5, 1.33));

        let back_in_water = in_glass.exiting(Vec3::ZERO, Vec3::Z);
        assert_eq!(back_in_water.medium_ior, 1.33);
        assert_eq!(back_in_water.exiting(Vec3::ZERO, Vec3::Z).medium_ior, AIR_IOR);
    }

    #[test]
    fn test_ray_caches_reciprocal_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));

        assert_eq!(ray.inv_direction.x, 1.0);
        assert!(ray.inv_direction.y.is_infinite());
    }
}
