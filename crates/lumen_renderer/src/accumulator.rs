//! Progressive accumulation buffer and display readout.
//!
//! Radiance samples are summed per pixel over iterations. Readout divides by
//! the number of completed iterations, optionally runs a depth-aware 3x3 box
//! filter, applies square-root gamma and packs 8-bit ARGB pixels.

use crate::tile::TileResult;
use crate::Color;

/// Packed display pixel, `0xAARRGGBB`.
pub type Pixel = u32;

/// Running per-pixel radiance sums plus the primary-hit depth of the last
/// iteration.
#[derive(Debug, Clone)]
pub struct AccumulationBuffer {
    width: u32,
    height: u32,
    sums: Vec<Color>,
    depths: Vec<f32>,
    /// Normalized, filtered radiance from the last readout
    filtered: Vec<Color>,
    output: Vec<Pixel>,
    /// Starts at 1; `current_iteration - 1` iterations have been summed
    current_iteration: u32,
}

impl AccumulationBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width * height) as usize;
        Self {
            width,
            height,
            sums: vec![Color::ZERO; len],
            depths: vec![f32::INFINITY; len],
            filtered: vec![Color::ZERO; len],
            output: vec![pack_argb(Color::ZERO); len],
            current_iteration: 1,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn current_iteration(&self) -> u32 {
        self.current_iteration
    }

    /// Number of completed iterations.
    pub fn iterations(&self) -> u32 {
        self.current_iteration - 1
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Add one sample to pixel (x, y) and record its primary-hit depth.
    pub fn accumulate(&mut self, x: u32, y: u32, sample: Color, depth: f32) {
        let i = self.index(x, y);
        self.sums[i] += sample;
        self.depths[i] = depth;
    }

    /// Merge a rendered tile.
    pub fn accumulate_tile(&mut self, result: &TileResult) {
        let tile = &result.tile;
        for (i, sample) in result.samples.iter().enumerate() {
            let local_x = i as u32 % tile.width;
            let local_y = i as u32 / tile.width;
            self.accumulate(tile.x + local_x, tile.y + local_y, sample.color, sample.depth);
        }
    }

    /// Mark the end of a frame. Called once, after every tile was merged.
    pub fn complete_iteration(&mut self) {
        self.current_iteration += 1;
    }

    /// Discard everything accumulated so far.
    pub fn invalidate(&mut self) {
        self.sums.fill(Color::ZERO);
        self.depths.fill(f32::INFINITY);
        self.filtered.fill(Color::ZERO);
        self.output.fill(pack_argb(Color::ZERO));
        self.current_iteration = 1;
    }

    /// Current radiance estimate at (x, y); zero before the first iteration.
    pub fn resolve(&self, x: u32, y: u32) -> Color {
        let iterations = self.iterations();
        if iterations == 0 {
            return Color::ZERO;
        }
        self.sums[self.index(x, y)] / iterations as f32
    }

    pub fn depth(&self, x: u32, y: u32) -> f32 {
        self.depths[self.index(x, y)]
    }

    /// Rebuild the display pixels from the sums.
    pub fn readout(&mut self, denoise: bool, depth_bias: f32) -> &[Pixel] {
        for y in 0..self.height {
            for x in 0..self.width {
                let value = if denoise {
                    self.filter_pixel(x, y, depth_bias)
                } else {
                    self.resolve(x, y)
                };
                let i = self.index(x, y);
                self.filtered[i] = value;
            }
        }

        for (pixel, color) in self.output.iter_mut().zip(&self.filtered) {
            *pixel = pack_argb(gamma(*color));
        }
        &self.output
    }

    /// Pixels produced by the last [`readout`](Self::readout).
    pub fn output(&self) -> &[Pixel] {
        &self.output
    }

    /// 3x3 box filter that only averages neighbors at a similar depth.
    /// Rejected or out-of-image neighbors contribute the center value.
    fn filter_pixel(&self, x: u32, y: u32, depth_bias: f32) -> Color {
        let center = self.resolve(x, y);
        let center_depth = self.depth(x, y);
        let mut sum = Color::ZERO;

        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                let inside = nx >= 0 && ny >= 0 && (nx as u32) < self.width && (ny as u32) < self.height;
                if inside && depth_matches(center_depth, self.depth(nx as u32, ny as u32), depth_bias) {
                    sum += self.resolve(nx as u32, ny as u32);
                } else {
                    sum += center;
                }
            }
        }

        sum / 9.0
    }
}

/// Depths match when within `bias`; two misses (both infinite) match.
fn depth_matches(a: f32, b: f32, bias: f32) -> bool {
    a == b || (a - b).abs() <= bias
}

/// Square-root gamma.
#[inline]
fn gamma(color: Color) -> Color {
    color.max(Color::ZERO).powf(0.5)
}

/// Clamp to [0, 1], quantize to 8 bits per channel and pack `0xAARRGGBB`
/// with opaque alpha.
pub fn pack_argb(color: Color) -> Pixel {
    let quantize = |c: f32| -> u32 {
        let c = if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
        (c * 255.0).round() as u32
    };
    0xff00_0000 | quantize(color.x) << 16 | quantize(color.y) << 8 | quantize(color.z)
}

/// Split a packed pixel into `[r, g, b, a]` bytes.
pub fn unpack_rgba(pixel: Pixel) -> [u8; 4] {
    let [a, r, g, b] = pixel.to_be_bytes();
    [r, g, b, a]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrator::Sample;
    use crate::tile::Tile;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_color(rng: &mut StdRng) -> Color {
        Color::new(rng.gen(), rng.gen(), rng.gen())
    }

    #[test]
    fn test_pack_argb() {
        assert_eq!(pack_argb(Color::ZERO), 0xff00_0000);
        assert_eq!(pack_argb(Color::ONE), 0xffff_ffff);
        assert_eq!(pack_argb(Color::new(1.0, 0.0, 0.0)), 0xffff_0000);
        assert_eq!(pack_argb(Color::new(-1.0, 5.0, 0.0)), 0xff00_ff00);
        assert_eq!(unpack_rgba(0xff11_2233), [0x11, 0x22, 0x33, 0xff]);
    }

    #[test]
    fn test_resolve_before_first_frame_is_zero() {
        let mut buffer = AccumulationBuffer::new(4, 4);
        buffer.accumulate(1, 1, Color::ONE, 1.0);
        assert_eq!(buffer.resolve(1, 1), Color::ZERO);

        buffer.complete_iteration();
        assert_eq!(buffer.resolve(1, 1), Color::ONE);
    }

    #[test]
    fn test_accumulation_is_mean_of_samples() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut buffer = AccumulationBuffer::new(3, 2);
        let mut expected = vec![Color::ZERO; 6];

        let frames = 25;
        for _ in 0..frames {
            for y in 0..2 {
                for x in 0..3 {
                    let sample = random_color(&mut rng);
                    expected[(y * 3 + x) as usize] += sample;
                    buffer.accumulate(x, y, sample, 1.0);
                }
            }
            buffer.complete_iteration();
        }

        assert_eq!(buffer.iterations(), frames);
        for y in 0..2 {
            for x in 0..3 {
                let mean = expected[(y * 3 + x) as usize] / frames as f32;
                assert!((buffer.resolve(x, y) - mean).length() < 1e-5);
            }
        }
    }

    #[test]
    fn test_invalidate_is_idempotent() {
        let mut buffer = AccumulationBuffer::new(5, 5);
        buffer.accumulate(2, 3, Color::splat(0.7), 2.0);
        buffer.complete_iteration();
        buffer.readout(true, 0.1);

        buffer.invalidate();
        let once = (buffer.sums.clone(), buffer.depths.clone(), buffer.output.clone(), buffer.current_iteration);
        buffer.invalidate();
        let twice = (buffer.sums.clone(), buffer.depths.clone(), buffer.output.clone(), buffer.current_iteration);

        assert_eq!(once, twice);
        assert_eq!(buffer.current_iteration(), 1);
        assert!(buffer.output().iter().all(|&p| p == 0xff00_0000));
    }

    #[test]
    fn test_accumulate_tile() {
        let mut buffer = AccumulationBuffer::new(8, 8);
        let tile = Tile::new(4, 2, 3, 2, 0);
        let samples = (0..6)
            .map(|i| Sample {
                color: Color::splat(i as f32),
                depth: 1.0,
            })
            .collect();
        buffer.accumulate_tile(&TileResult { tile, samples });
        buffer.complete_iteration();

        assert_eq!(buffer.resolve(4, 2), Color::splat(0.0));
        assert_eq!(buffer.resolve(6, 2), Color::splat(2.0));
        assert_eq!(buffer.resolve(4, 3), Color::splat(3.0));
        assert_eq!(buffer.resolve(6, 3), Color::splat(5.0));
        assert_eq!(buffer.resolve(0, 0), Color::ZERO);
    }

    #[test]
    fn test_filter_respects_depth_edges() {
        // Left half bright and near, right half dark and far
        let mut buffer = AccumulationBuffer::new(6, 4);
        for y in 0..4 {
            for x in 0..6 {
                if x < 3 {
                    buffer.accumulate(x, y, Color::ONE, 1.0);
                } else {
                    buffer.accumulate(x, y, Color::ZERO, 10.0);
                }
            }
        }
        buffer.complete_iteration();

        let output = buffer.readout(true, 0.5).to_vec();
        // Pixels next to the edge keep their own value on both sides
        assert_eq!(output[1 * 6 + 2], 0xffff_ffff);
        assert_eq!(output[1 * 6 + 3], 0xff00_0000);

        // Each half is uniform, so the filtered image matches the raw one
        let raw = buffer.readout(false, 0.5).to_vec();
        assert_eq!(raw, output);

        // Without the depth edge the two halves blur together
        buffer.depths.fill(1.0);
        let mixed = buffer.readout(true, 0.5).to_vec();
        assert_ne!(mixed[1 * 6 + 2], 0xffff_ffff);
    }

    #[test]
    fn test_filter_smooths_noise_at_equal_depth() {
        let mut buffer = AccumulationBuffer::new(3, 3);
        buffer.accumulate(1, 1, Color::splat(0.9), 1.0);
        for (x, y) in [(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (0, 2), (1, 2), (2, 2)] {
            buffer.accumulate(x, y, Color::ZERO, 1.0);
        }
        buffer.complete_iteration();

        buffer.readout(true, 0.1);
        assert!((buffer.filtered[4].x - 0.1).abs() < 1e-6);
        // Corner: 5 of 9 taps fall outside and reuse the center (zero)
        assert!((buffer.filtered[0].x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_depth_matching_treats_misses_as_equal() {
        assert!(depth_matches(f32::INFINITY, f32::INFINITY, 0.1));
        assert!(!depth_matches(1.0, f32::INFINITY, 0.1));
        assert!(depth_matches(1.0, 1.05, 0.1));
    }
}
