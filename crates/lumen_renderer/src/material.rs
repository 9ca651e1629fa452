//! Surface materials.
//!
//! Materials are plain data. The shading logic for every variant lives in
//! one `match` in [`crate::Integrator`], so this module only carries the
//! parameters and the optics helpers (reflection, Snell refraction, Fresnel).

use lumen_math::Vec3;

use crate::{Color, Texture};

/// Shading behavior of a surface. Exactly one variant applies; only its
/// fields are meaningful.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Ideal diffuse reflector.
    Lambertian { albedo: Texture },
    /// Blend of a diffuse base and a (possibly glossy) mirror reflection:
    /// `diffuse * (1 - specular) + specular * reflected`.
    Mirror {
        albedo: Texture,
        /// Mirror weight in [0, 1]; 1 is a perfect mirror
        specular: f32,
        /// Perturbation of the reflected direction, 0 = perfectly sharp
        roughness: f32,
    },
    /// Glass-like interface with exact Fresnel weighting and Beer's-law
    /// absorption inside the volume.
    Dielectric {
        /// Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
        ior: f32,
        /// Color the medium tends towards; channels below 1 are absorbed
        tint: Color,
        /// Absorption coefficient per unit distance travelled inside
        absorption: f32,
    },
    /// Light source surface; returns its emission and stops recursion.
    Emissive { emission: Color },
}

/// Used by [`crate::Hit::default`] before anything is hit.
pub(crate) static NO_MATERIAL: Material = Material::Emissive {
    emission: Color::ZERO,
};

impl Material {
    /// Create a Lambertian material with a constant albedo color.
    pub fn lambertian(albedo: impl Into<Texture>) -> Self {
        Material::Lambertian {
            albedo: albedo.into(),
        }
    }

    /// Create a mirror. `specular` and `roughness` are clamped to [0, 1].
    pub fn mirror(albedo: impl Into<Texture>, specular: f32, roughness: f32) -> Self {
        Material::Mirror {
            albedo: albedo.into(),
            specular: specular.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
        }
    }

    /// Create a clear dielectric with the given index of refraction.
    pub fn dielectric(ior: f32) -> Self {
        Material::Dielectric {
            ior,
            tint: Color::ONE,
            absorption: 0.0,
        }
    }

    /// Create a tinted, absorbing dielectric.
    pub fn tinted_dielectric(ior: f32, tint: Color, absorption: f32) -> Self {
        Material::Dielectric {
            ior,
            tint: tint.clamp(Color::ZERO, Color::ONE),
            absorption: absorption.max(0.0),
        }
    }

    /// Create a light emitting material.
    pub fn emissive(emission: Color) -> Self {
        Material::Emissive {
            emission: emission.max(Color::ZERO),
        }
    }

    pub fn is_emissive(&self) -> bool {
        matches!(self, Material::Emissive { .. })
    }
}

/// Reflect `incident` about `normal`: `i - 2(i·n)n`.
#[inline]
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * incident.dot(normal) * normal
}

/// Refract a unit `incident` direction through a surface whose unit
/// `normal` faces against it. `eta` is `eta_incident / eta_transmitted`.
///
/// Returns `None` on total internal reflection.
#[inline]
pub fn refract(incident: Vec3, normal: Vec3, eta: f32) -> Option<Vec3> {
    let cos_i = (-incident.dot(normal)).clamp(-1.0, 1.0);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }
    Some((eta * incident + (eta * cos_i - k.sqrt()) * normal).normalize())
}

/// Exact (unpolarized) Fresnel reflectance for a unit `incident` direction
/// crossing from a medium with index `eta_i` into one with index `eta_t`.
/// `normal` faces against the incident direction.
///
/// Total internal reflection yields 1.
pub fn fresnel(incident: Vec3, normal: Vec3, eta_i: f32, eta_t: f32) -> f32 {
    let cos_i = (-incident.dot(normal)).clamp(0.0, 1.0);
    let sin_t = eta_i / eta_t * (1.0 - cos_i * cos_i).max(0.0).sqrt();
    if sin_t >= 1.0 {
        return 1.0;
    }
    let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();

    let rs = (eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t);
    let rp = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);
    ((rs * rs + rp * rp) * 0.5).clamp(0.0, 1.0)
}

/// Beer's-law transmittance after travelling `distance` through a medium.
#[inline]
pub fn beer_attenuation(tint: Color, absorption: f32, distance: f32) -> Color {
    let exponent = -(Color::ONE - tint) * absorption * distance.max(0.0);
    Color::new(exponent.x.exp(), exponent.y.exp(), exponent.z.exp())
}
