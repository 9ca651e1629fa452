//! Recursive light transport.
//!
//! [`Integrator::shoot_ray`] maps a ray and a remaining bounce budget to the
//! radiance arriving back along it. The whole material model is the one
//! `match` in `shade`.

use std::f32::consts::FRAC_1_PI;

use lumen_math::Vec3;
use rand::RngCore;

use crate::material::{beer_attenuation, fresnel, reflect, refract};
use crate::sampling::{lambert_weight, random_unit_vector, sample_hemisphere};
use crate::{Bvh, Color, Hit, HitType, Light, LightingMode, Material, Ray, RenderConfig};

/// Radiance of one primary ray plus the distance of its first hit, which the
/// accumulation buffer keeps for the depth-aware filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub color: Color,
    pub depth: f32,
}

/// Borrowed view of everything shading needs. Cheap to construct per frame.
#[derive(Clone, Copy)]
pub struct Integrator<'a> {
    bvh: &'a Bvh,
    lights: &'a [Light],
    config: &'a RenderConfig,
    debug: bool,
}

impl<'a> Integrator<'a> {
    pub fn new(bvh: &'a Bvh, lights: &'a [Light], config: &'a RenderConfig) -> Self {
        Self {
            bvh,
            lights,
            config,
            debug: false,
        }
    }

    /// Replace shading with a BVH traversal heat map.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Trace a camera ray with the configured bounce budget.
    pub fn sample_primary(&self, ray: &Ray, rng: &mut dyn RngCore) -> Sample {
        if self.debug {
            let (hit, stats) = self.bvh.traversal_cost(ray);
            return Sample {
                color: heat_color(stats.nodes_visited as f32 / self.config.debug_heat_scale),
                depth: hit.t,
            };
        }

        let hit = self.bvh.intersect(ray);
        let color = if hit.is_hit() {
            self.shade(ray, &hit, self.config.max_depth, rng)
        } else {
            self.config.background
        };
        Sample { color, depth: hit.t }
    }

    /// Radiance arriving along `ray`. At `depth == 0` surfaces are still
    /// shaded, but every term that would need another bounce is zero.
    pub fn shoot_ray(&self, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        let hit = self.bvh.intersect(ray);
        if !hit.is_hit() {
            return self.config.background;
        }
        self.shade(ray, &hit, depth, rng)
    }

    fn shade(&self, ray: &Ray, hit: &Hit<'_>, depth: u32, rng: &mut dyn RngCore) -> Color {
        let color = match hit.material {
            Material::Emissive { emission } => *emission,
            Material::Lambertian { albedo } => {
                let albedo = albedo.value(hit.u, hit.v);
                self.diffuse(ray, hit, albedo, depth, rng)
            }
            Material::Mirror {
                albedo,
                specular,
                roughness,
            } => {
                let diffuse = if *specular < 1.0 {
                    self.diffuse(ray, hit, albedo.value(hit.u, hit.v), depth, rng)
                } else {
                    Color::ZERO
                };
                let reflected = if *specular > 0.0 && depth > 0 {
                    self.reflected(ray, hit, *roughness, depth, rng)
                } else {
                    Color::ZERO
                };
                diffuse * (1.0 - specular) + reflected * *specular
            }
            Material::Dielectric {
                ior,
                tint,
                absorption,
            } => self.dielectric(ray, hit, *ior, *tint, *absorption, depth, rng),
        };

        // Guards against negative lobes from numerical noise
        color.max(Color::ZERO)
    }

    fn diffuse(&self, ray: &Ray, hit: &Hit<'_>, albedo: Color, depth: u32, rng: &mut dyn RngCore) -> Color {
        let normal = hit.facing_normal();
        match self.config.lighting {
            LightingMode::Direct => {
                let mut direct = Color::ZERO;
                for light in self.lights {
                    let Some(sample) = light.illuminate(hit.point) else {
                        continue;
                    };
                    let cos_theta = normal.dot(sample.to_light);
                    if cos_theta <= 0.0 {
                        continue;
                    }
                    let shadow_ray = Ray::new(hit.point + normal * self.config.shadow_bias, sample.to_light);
                    if self.bvh.occluded(&shadow_ray, sample.distance) {
                        continue;
                    }
                    direct += sample.radiance * cos_theta;
                }
                albedo * FRAC_1_PI * direct + albedo * self.config.ambient
            }
            LightingMode::PathTraced => {
                if depth == 0 {
                    return Color::ZERO;
                }
                let sample = sample_hemisphere(normal, self.config.hemisphere, rng);
                let weight = lambert_weight(&sample);
                if weight <= 0.0 {
                    return Color::ZERO;
                }
                let origin = hit.point + normal * self.config.shadow_bias;
                let bounce = ray.continued(origin, sample.direction);
                albedo * self.shoot_ray(&bounce, depth - 1, rng) * weight
            }
        }
    }

    fn reflected(&self, ray: &Ray, hit: &Hit<'_>, roughness: f32, depth: u32, rng: &mut dyn RngCore) -> Color {
        let normal = hit.facing_normal();
        let ideal = reflect(ray.direction(), normal);
        let mut direction = ideal;
        if roughness > 0.0 {
            let glossy = (ideal + random_unit_vector(rng) * roughness).normalize_or_zero();
            // Perturbed below the surface: keep the sharp reflection
            if glossy.dot(normal) > 0.0 {
                direction = glossy;
            }
        }

        let origin = hit.point + direction * self.config.reflection_bias;
        let reflected = ray.continued(origin, direction);
        self.shoot_ray(&reflected, depth - 1, rng)
    }

    #[allow(clippy::too_many_arguments)]
    fn dielectric(
        &self,
        ray: &Ray,
        hit: &Hit<'_>,
        ior: f32,
        tint: Color,
        absorption: f32,
        depth: u32,
        rng: &mut dyn RngCore,
    ) -> Color {
        if depth == 0 {
            return Color::ZERO;
        }

        let normal = hit.facing_normal();
        let (eta_i, eta_t) = match hit.hit_type {
            HitType::Outside => (ray.medium_ior, ior),
            HitType::Inside => (ior, ray.outer_ior),
        };
        let kr = fresnel(ray.direction(), normal, eta_i, eta_t);

        let mut color = Color::ZERO;
        if kr < 1.0 {
            if let Some(direction) = refract(ray.direction(), normal, eta_i / eta_t) {
                let origin = hit.point + direction * self.config.refraction_bias;
                let refracted = match hit.hit_type {
                    HitType::Outside => ray.entering(origin, direction, ior),
                    HitType::Inside => ray.exiting(origin, direction),
                };
                color += self.shoot_ray(&refracted, depth - 1, rng) * (1.0 - kr);
            }
        }
        if kr > 0.0 {
            let direction = reflect(ray.direction(), normal);
            let origin = hit.point + direction * self.config.reflection_bias;
            let reflected = ray.continued(origin, direction);
            color += self.shoot_ray(&reflected, depth - 1, rng) * kr;
        }

        if hit.hit_type == HitType::Inside {
            color *= beer_attenuation(tint, absorption, hit.t);
        }
        color
    }
}

/// Blue to green to red ramp for `t` in [0, 1].
pub fn heat_color(t: f32) -> Color {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
    Vec3::new(
        (2.0 * t - 1.0).clamp(0.0, 1.0),
        1.0 - (2.0 * t - 1.0).abs(),
        (1.0 - 2.0 * t).clamp(0.0, 1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HemisphereSampling, Primitive, Sphere, Triangle};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> RenderConfig {
        RenderConfig::default()
    }

    fn quad(corners: [Vec3; 4], material: Material) -> Vec<Box<dyn Primitive>> {
        let [a, b, c, d] = corners;
        vec![
            Box::new(Triangle::new(a, b, c, material.clone())),
            Box::new(Triangle::new(a, c, d, material)),
        ]
    }

    /// Emissive wall in the z = 0 plane. The quad's diagonal avoids the
    /// origin so axis rays never graze a shared edge.
    fn emitter_wall(emission: f32) -> Vec<Box<dyn Primitive>> {
        quad(
            [
                Vec3::new(-50.0, -40.0, 0.0),
                Vec3::new(-50.0, 50.0, 0.0),
                Vec3::new(50.0, 50.0, 0.0),
                Vec3::new(50.0, -50.0, 0.0),
            ],
            Material::emissive(Color::splat(emission)),
        )
    }

    #[test]
    fn test_miss_returns_background() {
        let bvh = Bvh::new(vec![]);
        let mut cfg = config();
        cfg.background = Color::new(0.1, 0.2, 0.3);
        let integrator = Integrator::new(&bvh, &[], &cfg);
        let mut rng = StdRng::seed_from_u64(0);

        let color = integrator.shoot_ray(&Ray::new(Vec3::ZERO, Vec3::Z), 4, &mut rng);
        assert_eq!(color, cfg.background);
    }

    #[test]
    fn test_emissive_returns_emission() {
        let bvh = Bvh::new(emitter_wall(3.0));
        let cfg = config();
        let integrator = Integrator::new(&bvh, &[], &cfg);
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::Z);
        assert_eq!(integrator.shoot_ray(&ray, 0, &mut rng), Color::splat(3.0));
    }

    #[test]
    fn test_direct_light_and_shadow() {
        let floor = quad(
            [
                Vec3::new(-10.0, 0.0, -9.0),
                Vec3::new(-10.0, 0.0, 10.0),
                Vec3::new(10.0, 0.0, 10.0),
                Vec3::new(10.0, 0.0, -10.0),
            ],
            Material::lambertian(Color::ONE),
        );
        let mut objects = floor;
        // Blocker directly above x = 5
        objects.push(Box::new(Sphere::new(Vec3::new(5.0, 2.0, 0.0), 0.5, Material::lambertian(Color::ONE))));
        let bvh = Bvh::new(objects);
        let lights = [Light::directional(-Vec3::Y, Color::ONE, 1.0)];
        let cfg = config();
        let integrator = Integrator::new(&bvh, &lights, &cfg);
        let mut rng = StdRng::seed_from_u64(0);

        let lit = integrator.shoot_ray(&Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y), 2, &mut rng);
        assert!((lit.x - FRAC_1_PI).abs() < 1e-4);

        let shadowed = integrator.shoot_ray(&Ray::new(Vec3::new(5.0, 1.0, 0.0), -Vec3::Y), 2, &mut rng);
        assert_eq!(shadowed, Color::ZERO);
    }

    #[test]
    fn test_depth_zero_stops_recursion() {
        let mut objects = emitter_wall(1.0);
        objects.push(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -5.0),
            1.0,
            Material::mirror(Color::ONE, 1.0, 0.0),
        )));
        let bvh = Bvh::new(objects);
        let cfg = config();
        let integrator = Integrator::new(&bvh, &[], &cfg);
        let mut rng = StdRng::seed_from_u64(0);

        // Looking at the mirror's back side, which faces the emitter
        let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0), -Vec3::Z);
        assert_eq!(integrator.shoot_ray(&ray, 0, &mut rng), Color::ZERO);
        assert!(integrator.shoot_ray(&ray, 1, &mut rng).x > 0.9);
    }

    #[test]
    fn test_perfect_mirror_sees_emitter() {
        let mut objects = emitter_wall(2.0);
        objects.push(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -5.0),
            1.0,
            Material::mirror(Color::splat(0.3), 1.0, 0.0),
        )));
        let bvh = Bvh::new(objects);
        let cfg = config();
        let integrator = Integrator::new(&bvh, &[], &cfg);
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0), -Vec3::Z);
        let color = integrator.shoot_ray(&ray, 3, &mut rng);
        assert!((color - Color::splat(2.0)).length() < 1e-4);
    }

    #[test]
    fn test_radiance_is_non_negative() {
        let mut objects = emitter_wall(1.0);
        objects.push(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -4.0), 1.0, Material::dielectric(1.5))));
        objects.push(Box::new(Sphere::new(
            Vec3::new(2.0, 0.0, -4.0),
            0.8,
            Material::mirror(Color::splat(0.5), 0.6, 0.4),
        )));
        objects.push(Box::new(Sphere::new(
            Vec3::new(-2.0, 0.0, -4.0),
            0.8,
            Material::tinted_dielectric(1.3, Color::new(1.0, 0.3, 0.3), 0.8),
        )));
        let bvh = Bvh::new(objects);
        let lights = [Light::point(Vec3::new(0.0, 5.0, -6.0), Color::ONE, 20.0)];

        for lighting in [LightingMode::Direct, LightingMode::PathTraced] {
            let cfg = config().with_lighting(lighting, HemisphereSampling::Uniform);
            let integrator = Integrator::new(&bvh, &lights, &cfg);
            let mut rng = StdRng::seed_from_u64(17);

            for _ in 0..500 {
                let direction = crate::sampling::random_unit_vector(&mut rng);
                let color = integrator.shoot_ray(&Ray::new(Vec3::new(0.0, 0.0, -8.0), direction), 5, &mut rng);
                assert!(color.min_element() >= 0.0);
                assert!(color.is_finite());
            }
        }
    }

    #[test]
    fn test_glass_transmits_most_light_head_on() {
        // Thin glass slab between the camera and the emitter
        let glass = Material::dielectric(1.5);
        let mut objects = emitter_wall(1.0);
        objects.extend(quad(
            [
                Vec3::new(-5.0, -4.0, -2.0),
                Vec3::new(5.0, -5.0, -2.0),
                Vec3::new(5.0, 5.0, -2.0),
                Vec3::new(-5.0, 5.0, -2.0),
            ],
            glass,
        ));
        let bvh = Bvh::new(objects);
        let cfg = config();
        let integrator = Integrator::new(&bvh, &[], &cfg);
        let mut rng = StdRng::seed_from_u64(0);

        // One interface at normal incidence transmits 96%; the reflected
        // part escapes to the black background
        let color = integrator.shoot_ray(&Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z), 4, &mut rng);
        assert!((color.x - 0.96).abs() < 0.01, "got {}", color.x);
    }

    /// Emissive wall in the z = 5 plane, behind a unit glass sphere at the origin.
    fn glass_in_front_of_wall(glass: Material) -> Vec<Box<dyn Primitive>> {
        let mut objects = quad(
            [
                Vec3::new(-50.0, -40.0, 5.0),
                Vec3::new(-50.0, 50.0, 5.0),
                Vec3::new(50.0, 50.0, 5.0),
                Vec3::new(50.0, -50.0, 5.0),
            ],
            Material::emissive(Color::ONE),
        );
        objects.push(Box::new(Sphere::new(Vec3::ZERO, 1.0, glass)));
        objects
    }

    #[test]
    fn test_absorbing_glass_follows_beer_law() {
        let tint = Color::new(1.0, 0.5, 0.2);
        let absorption = 0.7;
        let kr = crate::fresnel(Vec3::Z, -Vec3::Z, 1.0, 1.5);
        let cfg = config();
        let mut rng = StdRng::seed_from_u64(0);
        // Straight through the center: two interfaces and a chord of 2
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);

        let bvh = Bvh::new(glass_in_front_of_wall(Material::tinted_dielectric(1.5, tint, absorption)));
        let integrator = Integrator::new(&bvh, &[], &cfg);
        let color = integrator.shoot_ray(&ray, 8, &mut rng);
        let expected = (1.0 - kr) * (1.0 - kr) * beer_attenuation(tint, absorption, 2.0);
        assert!((color - expected).abs().max_element() < 5e-3, "got {color}, expected {expected}");
        assert!(color.z < color.y && color.y < color.x);

        let bvh = Bvh::new(glass_in_front_of_wall(Material::tinted_dielectric(1.5, Color::ONE, absorption)));
        let integrator = Integrator::new(&bvh, &[], &cfg);
        let clear = integrator.shoot_ray(&ray, 8, &mut rng);
        assert!((clear - Color::splat((1.0 - kr) * (1.0 - kr))).abs().max_element() < 5e-3, "got {clear}");
    }

    #[test]
    fn test_exit_uses_enclosing_medium() {
        let bvh = Bvh::new(glass_in_front_of_wall(Material::dielectric(1.5)));
        let cfg = config();
        let integrator = Integrator::new(&bvh, &[], &cfg);
        let mut rng = StdRng::seed_from_u64(0);

        // Starts inside the sphere and meets its wall at 64 degrees
        let start = Vec3::new(0.0, 0.9, 0.0);

        // Glass in air: total internal reflection traps the ray
        let in_air = Ray::in_medium(start, Vec3::Z, 1.5);
        assert!(integrator.shoot_ray(&in_air, 6, &mut rng).max_element() < 1e-4);

        // Glass in index-matched glass: the boundary vanishes
        let matched = Ray::in_medium(start, Vec3::Z, 1.5).with_outer_ior(1.5);
        let color = integrator.shoot_ray(&matched, 6, &mut rng);
        assert!((color - Color::ONE).abs().max_element() < 1e-4, "got {color}");
    }

    #[test]
    fn test_debug_heat_map() {
        let bvh = Bvh::new(emitter_wall(1.0));
        let cfg = config();
        let integrator = Integrator::new(&bvh, &[], &cfg).with_debug(true);
        let mut rng = StdRng::seed_from_u64(0);

        let sample = integrator.sample_primary(&Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::Z), &mut rng);
        assert!((sample.depth - 1.0).abs() < 1e-5);
        assert_ne!(sample.color, Color::splat(1.0));

        assert_eq!(heat_color(0.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(heat_color(1.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(heat_color(0.5), Vec3::new(0.0, 1.0, 0.0));
    }
}
