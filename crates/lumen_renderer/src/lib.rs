//! Lumen - progressive CPU ray tracer.
//!
//! Renders scenes of spheres and triangles with diffuse, mirror, glass and
//! emissive materials. Rays are answered by a SAH BVH, samples are traced
//! tile-parallel with rayon and accumulated over frames, and the displayed
//! image is the running mean passed through a depth-aware denoising filter.

mod accumulator;
mod bvh;
mod camera;
mod config;
mod error;
mod integrator;
mod light;
mod material;
mod primitive;
mod renderer;
mod sampling;
mod sphere;
mod texture;
mod tile;
mod triangle;

pub use accumulator::{pack_argb, unpack_rgba, AccumulationBuffer, Pixel};
pub use bvh::{Bvh, BvhNode, TraversalStats, MIN_HIT_DISTANCE};
pub use camera::Camera;
pub use config::{HemisphereSampling, LightingMode, RenderConfig, MAX_IDLE_INTERVAL};
pub use error::{RenderError, Result};
pub use integrator::{heat_color, Integrator, Sample};
pub use light::{Light, LightSample};
pub use material::{beer_attenuation, fresnel, reflect, refract, Material};
pub use primitive::{bounds_of, intersect_all, Hit, HitType, Primitive};
pub use renderer::{FrameStatus, RenderStats, Renderer, Scene};
pub use sampling::{sample_hemisphere, tile_seed, HemisphereSample};
pub use sphere::Sphere;
pub use texture::Texture;
pub use tile::{generate_tiles, render_tile, Tile, TileResult};
pub use triangle::Triangle;

/// Re-export math types from lumen_math
pub use lumen_math::{Aabb, Interval, Ray, Vec2, Vec3, AIR_IOR};

/// Linear RGB radiance.
pub type Color = Vec3;
