//! Albedo sources for materials.

use crate::Color;

/// Albedo lookup by surface `(u, v)` coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Texture {
    /// Constant color everywhere.
    Solid(Color),
    /// Alternating squares in uv space, `scale` squares per unit.
    Checker { even: Color, odd: Color, scale: f32 },
}

impl Texture {
    /// Sample the texture at the given uv coordinates.
    pub fn value(&self, u: f32, v: f32) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Checker { even, odd, scale } => {
                let iu = (u * scale).floor() as i64;
                let iv = (v * scale).floor() as i64;
                if (iu + iv).rem_euclid(2) == 0 {
                    *even
                } else {
                    *odd
                }
            }
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::Solid(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_texture() {
        let tex = Texture::from(Color::new(0.2, 0.4, 0.6));
        assert_eq!(tex.value(0.0, 0.0), Color::new(0.2, 0.4, 0.6));
        assert_eq!(tex.value(0.9, 0.3), Color::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn test_checker_alternates() {
        let tex = Texture::Checker {
            even: Color::ONE,
            odd: Color::ZERO,
            scale: 2.0,
        };
        assert_eq!(tex.value(0.1, 0.1), Color::ONE);
        assert_eq!(tex.value(0.6, 0.1), Color::ZERO);
        assert_eq!(tex.value(0.6, 0.6), Color::ONE);
    }
}
