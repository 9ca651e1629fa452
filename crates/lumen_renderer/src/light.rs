//! Explicit light sources used by direct lighting.

use lumen_math::Vec3;

use crate::Color;

/// A light source. Lights have no geometry; they are never hit by rays.
#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    /// Parallel light arriving from infinitely far away.
    Directional {
        /// Direction the light travels in
        direction: Vec3,
        color: Color,
        intensity: f32,
    },
    /// Omnidirectional light with inverse-square falloff.
    Point {
        position: Vec3,
        color: Color,
        intensity: f32,
    },
    /// Cone-shaped light. Full intensity inside the inner cone, fading to
    /// zero at the outer cone.
    Spot {
        position: Vec3,
        direction: Vec3,
        /// Cosine of the inner cone half-angle
        cos_inner: f32,
        /// Cosine of the outer cone half-angle
        cos_outer: f32,
        color: Color,
        intensity: f32,
    },
}

/// Light arriving at a shading point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    /// Unit vector from the shading point towards the light
    pub to_light: Vec3,
    /// Distance to the light; `f32::INFINITY` for directional lights
    pub distance: f32,
    /// Incident radiance before the cosine and visibility terms
    pub radiance: Color,
}

impl Light {
    pub fn directional(direction: Vec3, color: Color, intensity: f32) -> Self {
        Light::Directional {
            direction: direction.normalize_or_zero(),
            color,
            intensity,
        }
    }

    pub fn point(position: Vec3, color: Color, intensity: f32) -> Self {
        Light::Point {
            position,
            color,
            intensity,
        }
    }

    /// Create a spot light. Angles are cone half-angles in radians.
    pub fn spot(
        position: Vec3,
        direction: Vec3,
        inner_angle: f32,
        outer_angle: f32,
        color: Color,
        intensity: f32,
    ) -> Self {
        let outer_angle = outer_angle.max(inner_angle);
        Light::Spot {
            position,
            direction: direction.normalize_or_zero(),
            cos_inner: inner_angle.cos(),
            cos_outer: outer_angle.cos(),
            color,
            intensity,
        }
    }

    /// Light arriving at `point`, or `None` when the point lies outside the
    /// light's reach (behind a spot cone, or at the light's position).
    pub fn illuminate(&self, point: Vec3) -> Option<LightSample> {
        match *self {
            Light::Directional {
                direction,
                color,
                intensity,
            } => Some(LightSample {
                to_light: -direction,
                distance: f32::INFINITY,
                radiance: color * intensity,
            }),
            Light::Point {
                position,
                color,
                intensity,
            } => {
                let (to_light, distance) = towards(point, position)?;
                Some(LightSample {
                    to_light,
                    distance,
                    radiance: color * intensity / (distance * distance),
                })
            }
            Light::Spot {
                position,
                direction,
                cos_inner,
                cos_outer,
                color,
                intensity,
            } => {
                let (to_light, distance) = towards(point, position)?;
                let cos_angle = direction.dot(-to_light);
                if cos_angle <= cos_outer {
                    return None;
                }
                let falloff = if cos_inner > cos_outer {
                    ((cos_angle - cos_outer) / (cos_inner - cos_outer)).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                Some(LightSample {
                    to_light,
                    distance,
                    radiance: color * intensity * falloff / (distance * distance),
                })
            }
        }
    }
}

fn towards(from: Vec3, to: Vec3) -> Option<(Vec3, f32)> {
    let delta = to - from;
    let distance = delta.length();
    if distance <= f32::EPSILON {
        return None;
    }
    Some((delta / distance, distance))
}
