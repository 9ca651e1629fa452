//! Lumen headless driver.
//!
//! Builds a demo scene, renders a number of progressive iterations while
//! replaying scripted input, and writes the resulting image.

mod input;
mod scenes;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lumen_renderer::{unpack_rgba, FrameStatus, HemisphereSampling, LightingMode, RenderConfig, Renderer};

use input::{update, InputState};
use scenes::DemoScene;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Lighting {
    /// Shadow rays to explicit lights
    Direct,
    /// Cosine-weighted path tracing from emissive geometry
    Path,
    /// Uniform hemisphere path tracing
    PathUniform,
}

#[derive(Parser, Debug)]
#[command(name = "lumen", version, about = "Progressive CPU ray tracer")]
struct Args {
    /// Scene to render
    #[arg(long, value_enum, default_value_t)]
    scene: DemoScene,

    /// JSON render config; command line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Iterations to accumulate
    #[arg(short = 'n', long, default_value_t = 64)]
    iterations: u32,

    /// Output image (format from the extension)
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    #[arg(long, value_enum)]
    lighting: Option<Lighting>,

    #[arg(long)]
    seed: Option<u64>,

    /// Show the BVH traversal heat map instead of shading
    #[arg(long)]
    debug: bool,

    /// Focus on the center of the view before rendering
    #[arg(long)]
    autofocus: bool,

    /// Keys pressed before rendering, one per frame (e.g. "wwjf")
    #[arg(long, default_value = "")]
    keys: String,

    /// Disable the depth-aware denoising filter
    #[arg(long)]
    no_denoise: bool,
}

impl Args {
    fn render_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => RenderConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(lighting) = self.lighting {
            let hemisphere = config.hemisphere;
            config = match lighting {
                Lighting::Direct => config.with_lighting(LightingMode::Direct, hemisphere),
                Lighting::Path => config.with_lighting(LightingMode::PathTraced, HemisphereSampling::Cosine),
                Lighting::PathUniform => config.with_lighting(LightingMode::PathTraced, HemisphereSampling::Uniform),
            };
        }
        if self.no_denoise {
            config.denoise = false;
        }
        config.max_iterations = config.max_iterations.min(self.iterations);

        config.validate().context("Invalid render config")?;
        Ok(config)
    }
}

fn save_image(renderer: &mut Renderer, path: &Path) -> Result<()> {
    let (width, height) = (renderer.config().width, renderer.config().height);
    let bytes: Vec<u8> = renderer.output().iter().flat_map(|&p| unpack_rgba(p)).collect();

    let image = image::RgbaImage::from_raw(width, height, bytes)
        .context("Output buffer does not match the image size")?;
    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!("Saved {}x{} image to {}", width, height, path.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let config = args.render_config()?;
    let (scene, camera) = args.scene.build();
    let mut renderer = Renderer::new(scene, camera, config).context("Failed to create renderer")?;

    let mut frames = Vec::new();
    if args.autofocus {
        frames.push(InputState {
            focus: true,
            ..Default::default()
        });
    }
    frames.extend(InputState::parse_script(&args.keys)?);
    for input in &frames {
        update(&mut renderer, input);
        renderer.render_frame();
    }
    if args.debug && !renderer.debug() {
        renderer.set_debug(true);
    }

    let start = Instant::now();
    while renderer.render_frame() == FrameStatus::Rendered {
        let iteration = renderer.iteration();
        if iteration % 16 == 0 {
            log::info!("Iteration {}/{}", iteration, renderer.config().max_iterations);
        }
    }
    log::info!(
        "Rendered {} iterations in {:.2?}",
        renderer.iteration(),
        start.elapsed()
    );

    renderer.report();
    save_image(&mut renderer, &args.output)
}
