//! Tile-based frame partitioning.
//!
//! Each frame the image is split into square tiles that are rendered
//! independently on the rayon pool and merged into the accumulation buffer
//! afterwards.

use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::integrator::{Integrator, Sample};
use crate::sampling::tile_seed;
use crate::Camera;

/// A rectangular region of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// X coordinate of the tile's top-left corner
    pub x: u32,
    /// Y coordinate of the tile's top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position in the render order
    pub index: usize,
}

impl Tile {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }
}

/// Cover a `width` x `height` image with tiles of at most `tile_size`
/// pixels a side, ordered from the image center outward.
pub fn generate_tiles(width: u32, height: u32, tile_size: u32) -> Vec<Tile> {
    let tile_size = tile_size.max(1);
    let mut tiles = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let tw = tile_size.min(width - x);
            let th = tile_size.min(height - y);
            tiles.push(Tile::new(x, y, tw, th, 0));
            x += tile_size;
        }
        y += tile_size;
    }

    sort_spiral(&mut tiles, width, height);
    for (i, tile) in tiles.iter_mut().enumerate() {
        tile.index = i;
    }

    tiles
}

/// Sort tiles by the distance of their centers from the image center.
fn sort_spiral(tiles: &mut [Tile], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let distance = |tile: &Tile| {
        let (x, y) = tile.center();
        (x - center_x).powi(2) + (y - center_y).powi(2)
    };

    tiles.sort_by(|a, b| distance(a).partial_cmp(&distance(b)).unwrap_or(Ordering::Equal));
}

/// Samples produced for one tile in one iteration.
#[derive(Debug, Clone)]
pub struct TileResult {
    pub tile: Tile,
    /// One sample per pixel, row-major within the tile
    pub samples: Vec<Sample>,
}

/// Trace one sample for every pixel of `tile`.
///
/// The tile's random sequence depends only on `(seed, iteration, tile.index)`,
/// so a frame is reproducible regardless of thread scheduling.
pub fn render_tile(
    tile: &Tile,
    camera: &Camera,
    integrator: &Integrator<'_>,
    seed: u64,
    iteration: u32,
) -> TileResult {
    let mut rng = StdRng::seed_from_u64(tile_seed(seed, iteration, tile.index));
    let mut samples = Vec::with_capacity(tile.pixel_count());

    for local_y in 0..tile.height {
        for local_x in 0..tile.width {
            let ray = camera.get_ray(tile.x + local_x, tile.y + local_y, &mut rng);
            samples.push(integrator.sample_primary(&ray, &mut rng));
        }
    }

    TileResult {
        tile: *tile,
        samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bvh, RenderConfig};

    #[test]
    fn test_generate_tiles_exact_fit() {
        let tiles = generate_tiles(128, 128, 64);
        assert_eq!(tiles.len(), 4);

        let total: usize = tiles.iter().map(Tile::pixel_count).sum();
        assert_eq!(total, 128 * 128);
    }

    #[test]
    fn test_generate_tiles_ragged_edges() {
        let tiles = generate_tiles(100, 70, 32);
        assert_eq!(tiles.len(), 4 * 3);

        let total: usize = tiles.iter().map(Tile::pixel_count).sum();
        assert_eq!(total, 100 * 70);
        assert!(tiles.iter().any(|t| t.width == 4 && t.height == 6));
    }

    #[test]
    fn test_tiles_cover_every_pixel_once() {
        let (w, h) = (53, 41);
        let mut covered = vec![0u8; (w * h) as usize];
        for tile in generate_tiles(w, h, 16) {
            for y in tile.y..tile.y + tile.height {
                for x in tile.x..tile.x + tile.width {
                    covered[(y * w + x) as usize] += 1;
                }
            }
        }
        assert!(covered.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_center_tile_first() {
        let tiles = generate_tiles(192, 192, 64);
        assert_eq!(tiles.len(), 9);
        assert_eq!((tiles[0].x, tiles[0].y), (64, 64));
        assert!(tiles.iter().enumerate().all(|(i, t)| t.index == i));
    }

    #[test]
    fn test_render_tile_is_deterministic() {
        let bvh = Bvh::new(vec![]);
        let mut config = RenderConfig::default().with_resolution(16, 16);
        config.background = crate::Color::new(0.2, 0.4, 0.6);
        let integrator = Integrator::new(&bvh, &[], &config);
        let camera = Camera::new().with_resolution(16, 16);
        let tile = generate_tiles(16, 16, 8)[2];

        let a = render_tile(&tile, &camera, &integrator, 7, 1);
        let b = render_tile(&tile, &camera, &integrator, 7, 1);
        assert_eq!(a.samples, b.samples);
        assert_eq!(a.samples.len(), 64);
        assert!(a.samples.iter().all(|s| s.color == config.background && s.depth.is_infinite()));
    }
}
