//! Progressive renderer: owns the scene, camera and accumulation buffer and
//! renders one sample per pixel per frame.

use std::time::{Duration, Instant};

use lumen_math::Vec3;
use rayon::prelude::*;

use crate::accumulator::{AccumulationBuffer, Pixel};
use crate::error::Result;
use crate::integrator::Integrator;
use crate::tile::{generate_tiles, render_tile, Tile, TileResult};
use crate::{Bvh, Camera, Light, Primitive, RenderConfig};

/// Everything the renderer consumes at construction.
#[derive(Default)]
pub struct Scene {
    pub primitives: Vec<Box<dyn Primitive>>,
    pub lights: Vec<Light>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, primitive: impl Primitive + 'static) {
        self.primitives.push(Box::new(primitive));
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Add a group of primitives modelled around the origin, moved into
    /// place by `offset`.
    pub fn add_translated(&mut self, primitives: impl IntoIterator<Item = Box<dyn Primitive>>, offset: Vec3) {
        for mut primitive in primitives {
            primitive.translate(offset);
            self.primitives.push(primitive);
        }
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, primitive: impl Primitive + 'static) -> Self {
        self.add(primitive);
        self
    }

    /// Builder form of [`add_light`](Self::add_light).
    pub fn with_light(mut self, light: Light) -> Self {
        self.add_light(light);
        self
    }
}

/// What a call to [`Renderer::render_frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// One more iteration was accumulated.
    Rendered,
    /// The iteration limit was reached; the call only throttled.
    Idle,
}

/// Counters since the last invalidation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderStats {
    pub frames: u64,
    pub primary_rays: u64,
    pub total_time: Duration,
    pub last_frame_time: Duration,
}

/// Progressive ray tracer.
pub struct Renderer {
    config: RenderConfig,
    camera: Camera,
    bvh: Bvh,
    lights: Vec<Light>,
    tiles: Vec<Tile>,
    buffer: AccumulationBuffer,
    debug: bool,
    stats: RenderStats,
}

impl Renderer {
    /// Build the BVH over `scene` and prepare an empty accumulation buffer.
    /// The camera's resolution is overridden by the config's.
    pub fn new(scene: Scene, camera: Camera, config: RenderConfig) -> Result<Self> {
        config.validate()?;

        let camera = camera.with_resolution(config.width, config.height);
        let bvh = Bvh::new(scene.primitives);
        let tiles = generate_tiles(config.width, config.height, config.tile_size);
        let buffer = AccumulationBuffer::new(config.width, config.height);

        log::info!(
            "Renderer ready: {}x{}, {} tiles of {}px, {} lights, {:?} lighting",
            config.width,
            config.height,
            tiles.len(),
            config.tile_size,
            scene.lights.len(),
            config.lighting
        );

        Ok(Self {
            config,
            camera,
            bvh,
            lights: scene.lights,
            tiles,
            buffer,
            debug: false,
            stats: RenderStats::default(),
        })
    }

    /// Accumulate one sample per pixel. Once `max_iterations` is reached this
    /// only sleeps long enough to cap the idle frame rate.
    pub fn render_frame(&mut self) -> FrameStatus {
        if self.buffer.iterations() >= self.config.max_iterations {
            std::thread::sleep(self.config.idle_interval());
            return FrameStatus::Idle;
        }

        let start = Instant::now();
        let iteration = self.buffer.current_iteration();
        let seed = self.config.seed;
        let camera = &self.camera;
        let integrator = Integrator::new(&self.bvh, &self.lights, &self.config).with_debug(self.debug);

        let results: Vec<TileResult> = self
            .tiles
            .par_iter()
            .map(|tile| render_tile(tile, camera, &integrator, seed, iteration))
            .collect();

        for result in &results {
            self.buffer.accumulate_tile(result);
        }
        self.buffer.complete_iteration();

        let elapsed = start.elapsed();
        self.stats.frames += 1;
        self.stats.primary_rays += u64::from(self.config.width) * u64::from(self.config.height);
        self.stats.total_time += elapsed;
        self.stats.last_frame_time = elapsed;
        log::debug!("Iteration {} rendered in {:.2?}", iteration, elapsed);

        FrameStatus::Rendered
    }

    /// Filtered, gamma corrected pixels of the current estimate, row-major.
    pub fn output(&mut self) -> &[Pixel] {
        self.buffer
            .readout(self.config.denoise, self.config.depth_filter_bias)
    }

    /// Drop all accumulated samples.
    pub fn invalidate(&mut self) {
        self.buffer.invalidate();
        self.stats = RenderStats::default();
        log::debug!("Accumulation buffer invalidated");
    }

    /// Move the camera in its own frame (x = right, y = up, z = forward).
    pub fn move_camera(&mut self, delta: Vec3) {
        self.camera.move_by(delta);
        self.invalidate();
    }

    /// Rotate the camera by (yaw, pitch, roll) radians.
    pub fn rotate_camera(&mut self, delta: Vec3) {
        self.camera.rotate(delta);
        self.invalidate();
    }

    pub fn zoom_camera(&mut self, delta: f32) {
        self.camera.zoom(delta);
        self.invalidate();
    }

    pub fn change_aperture(&mut self, delta: f32) {
        self.camera.change_aperture(delta);
        self.invalidate();
    }

    /// Focus on whatever the center of the view hits. Returns the new focus
    /// distance, or `None` when the center ray escapes.
    pub fn focus_camera(&mut self) -> Option<f32> {
        let hit = self.bvh.intersect(&self.camera.focus_ray());
        let focused = if hit.is_hit() {
            self.camera.set_focus_distance(hit.t);
            log::info!("Focus distance set to {:.3}", hit.t);
            Some(hit.t)
        } else {
            log::warn!("Nothing under the view center to focus on");
            None
        };
        self.invalidate();
        focused
    }

    pub fn toggle_debug(&mut self) {
        self.set_debug(!self.debug);
    }

    /// Switch between shading and the BVH traversal heat map.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        log::info!("BVH debug view {}", if debug { "on" } else { "off" });
        self.invalidate();
    }

    /// Log the current renderer state.
    pub fn report(&self) {
        let camera = &self.camera;
        log::info!(
            "Camera: position {:?}, forward {:?}, focal length {:.2}, aperture {:.3}, focus {:.3}",
            camera.position(),
            camera.forward(),
            camera.focal_length(),
            camera.aperture(),
            camera.focus_distance()
        );
        log::info!(
            "Scene: {} primitives, {} BVH nodes (depth {}), {} lights",
            self.bvh.len(),
            self.bvh.node_count(),
            self.bvh.depth(),
            self.lights.len()
        );

        let stats = &self.stats;
        let seconds = stats.total_time.as_secs_f64();
        let rays_per_second = if seconds > 0.0 {
            stats.primary_rays as f64 / seconds
        } else {
            0.0
        };
        log::info!(
            "Iterations: {}/{}, last frame {:.2?}, {:.2} Mrays/s",
            self.buffer.iterations(),
            self.config.max_iterations,
            stats.last_frame_time,
            rays_per_second / 1e6
        );
    }

    /// Number of completed iterations since the last invalidation.
    pub fn iteration(&self) -> u32 {
        self.buffer.iterations()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn buffer(&self) -> &AccumulationBuffer {
        &self.buffer
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }
}
