//! Render configuration.
//!
//! Every tunable constant the renderer depends on lives in [`RenderConfig`].
//! Configs deserialize from JSON; missing fields take their defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};
use crate::Color;

/// Longest pause between idle frames, one hour.
pub const MAX_IDLE_INTERVAL: Duration = Duration::from_secs(3600);

/// How diffuse surfaces gather light.
///
/// The two modes are never mixed: doing so would need MIS weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightingMode {
    /// Shadow rays towards every explicit [`crate::Light`]. Emissive
    /// primitives are visible but do not illuminate diffuse surfaces.
    #[default]
    Direct,
    /// One hemisphere sample per bounce; only emissive primitives light the
    /// scene and explicit lights are ignored.
    PathTraced,
}

/// Distribution used to pick diffuse bounce directions in
/// [`LightingMode::PathTraced`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HemisphereSampling {
    /// pdf = 1 / 2π
    Uniform,
    /// pdf = cosθ / π
    #[default]
    Cosine,
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output resolution in pixels
    pub width: u32,
    pub height: u32,
    /// Edge length of the square tiles dispatched to worker threads
    pub tile_size: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Frames accumulated before rendering goes idle
    pub max_iterations: u32,
    /// Constant ambient term added to diffuse surfaces in direct mode
    pub ambient: f32,
    /// Radiance returned by rays that escape the scene
    pub background: Color,
    /// Origin offsets that keep secondary rays off the surface they left
    pub shadow_bias: f32,
    pub reflection_bias: f32,
    pub refraction_bias: f32,
    /// Neighbors whose depth differs from the center pixel by more than this
    /// are excluded from the readout filter
    pub depth_filter_bias: f32,
    /// Apply the depth-aware 3x3 filter on readout
    pub denoise: bool,
    /// Frame rate cap once `max_iterations` has been reached
    pub idle_fps: f32,
    pub lighting: LightingMode,
    pub hemisphere: HemisphereSampling,
    /// Base seed for the per-tile random sequences
    pub seed: u64,
    /// Number of visited BVH nodes that maps to full heat in debug mode
    pub debug_heat_scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            tile_size: 32,
            max_depth: 8,
            max_iterations: 4096,
            ambient: 0.0,
            background: Color::ZERO,
            shadow_bias: 1e-3,
            reflection_bias: 1e-3,
            refraction_bias: 1e-3,
            depth_filter_bias: 0.1,
            denoise: true,
            idle_fps: 30.0,
            lighting: LightingMode::Direct,
            hemisphere: HemisphereSampling::Cosine,
            seed: 0x5eed,
            debug_heat_scale: 64.0,
        }
    }
}

impl RenderConfig {
    /// Set output resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set lighting mode and hemisphere distribution.
    pub fn with_lighting(mut self, lighting: LightingMode, hemisphere: HemisphereSampling) -> Self {
        self.lighting = lighting;
        self.hemisphere = hemisphere;
        self
    }

    /// Parse a config from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded render config from {}", path.display());
        Ok(config)
    }

    /// Check the invariants the renderer relies on.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "resolution must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.tile_size == 0 {
            return Err(RenderError::InvalidConfig("tile_size must be non-zero".into()));
        }
        if !(self.idle_fps > 0.0) || !(1.0 / self.idle_fps <= MAX_IDLE_INTERVAL.as_secs_f32()) {
            return Err(RenderError::InvalidConfig(format!(
                "idle_fps must be at least one frame per {}s, got {}",
                MAX_IDLE_INTERVAL.as_secs(),
                self.idle_fps
            )));
        }
        let biases = [
            ("shadow_bias", self.shadow_bias),
            ("reflection_bias", self.reflection_bias),
            ("refraction_bias", self.refraction_bias),
            ("depth_filter_bias", self.depth_filter_bias),
        ];
        for (name, value) in biases {
            if !(value >= 0.0) {
                return Err(RenderError::InvalidConfig(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        if self.ambient < 0.0 || self.background.min_element() < 0.0 {
            return Err(RenderError::InvalidConfig(
                "ambient and background must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Pause between frames once `max_iterations` is reached, never longer
    /// than [`MAX_IDLE_INTERVAL`].
    pub fn idle_interval(&self) -> Duration {
        Duration::try_from_secs_f32(1.0 / self.idle_fps).map_or(MAX_IDLE_INTERVAL, |d| d.min(MAX_IDLE_INTERVAL))
    }
}
