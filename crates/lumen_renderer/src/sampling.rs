//! Random sampling helpers.
//!
//! All sampling goes through an explicit `&mut dyn RngCore` so each tile can
//! own an independently seeded sequence.

use std::f32::consts::{FRAC_1_PI, PI, TAU};

use lumen_math::{Vec2, Vec3};
use rand::{Rng, RngCore};

use crate::HemisphereSampling;

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Random offset inside a pixel, in [0, 1) x [0, 1).
pub fn sample_square(rng: &mut dyn RngCore) -> Vec2 {
    Vec2::new(gen_f32(rng), gen_f32(rng))
}

/// Sample a random point in the unit disk (z = 0).
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec2 {
    loop {
        let p = Vec2::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Generate a random unit vector on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// A direction sampled about a surface normal, with its solid-angle pdf.
#[derive(Debug, Clone, Copy)]
pub struct HemisphereSample {
    pub direction: Vec3,
    pub cos_theta: f32,
    pub pdf: f32,
}

/// Sample a direction in the hemisphere around `normal`.
pub fn sample_hemisphere(
    normal: Vec3,
    distribution: HemisphereSampling,
    rng: &mut dyn RngCore,
) -> HemisphereSample {
    let (u1, u2) = (gen_f32(rng), gen_f32(rng));
    let phi = TAU * u2;
    let (sin_phi, cos_phi) = phi.sin_cos();

    let (local, pdf) = match distribution {
        HemisphereSampling::Uniform => {
            let z = u1;
            let r = (1.0 - z * z).max(0.0).sqrt();
            (Vec3::new(r * cos_phi, r * sin_phi, z), 0.5 * FRAC_1_PI)
        }
        HemisphereSampling::Cosine => {
            let r = u1.sqrt();
            let z = (1.0 - u1).max(0.0).sqrt();
            (Vec3::new(r * cos_phi, r * sin_phi, z), z * FRAC_1_PI)
        }
    };

    let (tangent, bitangent) = normal.any_orthonormal_pair();
    let direction = (tangent * local.x + bitangent * local.y + normal * local.z).normalize();

    HemisphereSample {
        direction,
        cos_theta: local.z,
        pdf,
    }
}

/// Weight applied to radiance arriving along a hemisphere sample at a
/// Lambertian surface: `(albedo / π) · cosθ / pdf`, without the albedo.
#[inline]
pub fn lambert_weight(sample: &HemisphereSample) -> f32 {
    if sample.pdf <= 0.0 {
        return 0.0;
    }
    (sample.cos_theta / PI) / sample.pdf
}

/// Seed for the random sequence of one tile in one iteration.
///
/// SplitMix64 finalizer over the inputs, so neighboring tiles and
/// consecutive iterations get uncorrelated streams.
pub fn tile_seed(seed: u64, iteration: u32, tile_index: usize) -> u64 {
    let mut z = seed
        ^ (iteration as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15)
        ^ (tile_index as u64).wrapping_mul(0xc2b2_ae3d_27d4_eb4f);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_unit_disk_samples_stay_inside() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            assert!(random_in_unit_disk(&mut rng).length() < 1.0);
        }
    }

    #[test]
    fn test_hemisphere_samples_face_normal() {
        let mut rng = StdRng::seed_from_u64(7);
        let normal = Vec3::new(1.0, 2.0, -0.5).normalize();

        for distribution in [HemisphereSampling::Uniform, HemisphereSampling::Cosine] {
            for _ in 0..1000 {
                let s = sample_hemisphere(normal, distribution, &mut rng);
                assert!((s.direction.length() - 1.0).abs() < 1e-4);
                assert!(s.direction.dot(normal) >= -1e-4);
                assert!((s.direction.dot(normal) - s.cos_theta).abs() < 1e-3);
                assert!(s.pdf >= 0.0);
            }
        }
    }

    #[test]
    fn test_lambert_weight_is_unbiased() {
        // E[cosθ/π / pdf] over the hemisphere is 1 for both distributions,
        // so a white furnace converges to 1 either way.
        let mut rng = StdRng::seed_from_u64(99);
        for distribution in [HemisphereSampling::Uniform, HemisphereSampling::Cosine] {
            let n = 20_000;
            let mean: f32 = (0..n)
                .map(|_| lambert_weight(&sample_hemisphere(Vec3::Y, distribution, &mut rng)))
                .sum::<f32>()
                / n as f32;
            assert!((mean - 1.0).abs() < 0.03, "{distribution:?} mean {mean}");
        }
    }

    #[test]
    fn test_tile_seed_varies() {
        let a = tile_seed(1, 1, 0);
        assert_ne!(a, tile_seed(1, 1, 1));
        assert_ne!(a, tile_seed(1, 2, 0));
        assert_ne!(a, tile_seed(2, 1, 0));
        assert_eq!(a, tile_seed(1, 1, 0));
    }
}
