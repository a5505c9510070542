//! Load one reconstruction, frame it and measure between two screen points
//!
//! ```text
//! measure dino --click 400,300 --click 520,310
//! measure room --gallery --plain
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use reconview_io::{FileAssetLoader, ThumbnailCache};
use reconview_viewer::{
    AssetSource, GalleryController, MaterialMode, PointerButton, SelectionPanel, Viewer, ViewerConfig,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "measure")]
#[command(about = "Frame a reconstruction and measure the distance between two clicked points")]
struct Cli {
    /// Scene id to load
    scene: String,

    /// JSON viewer configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Method whose output is loaded (defaults to the first configured one)
    #[arg(long)]
    method: Option<String>,

    /// Load from the single-model gallery instead of the results tree
    #[arg(long)]
    gallery: bool,

    /// Show geometry with the plain material
    #[arg(long)]
    plain: bool,

    /// Viewport size as WIDTHxHEIGHT
    #[arg(long, default_value = "800x600")]
    viewport: String,

    /// Screen position to click, as X,Y; may be repeated
    #[arg(long = "click")]
    clicks: Vec<String>,
}

fn parse_pair(text: &str, separator: char) -> Result<(f64, f64)> {
    let (a, b) = text
        .split_once(separator)
        .with_context(|| format!("expected two numbers separated by '{}', got '{}'", separator, text))?;
    Ok((a.trim().parse()?, b.trim().parse()?))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ViewerConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    let source = if cli.gallery {
        AssetSource::Gallery
    } else {
        let method = match cli.method.clone() {
            Some(method) => method,
            None => config.methods.first().cloned().context("no methods configured")?,
        };
        AssetSource::Results { method }
    };

    let viewer = Viewer::with_config(
        Arc::new(FileAssetLoader),
        config.framing.clone(),
        config.click_threshold_px,
    );
    let panel = SelectionPanel::new([cli.scene.clone()])?;
    let mut controller = GalleryController::new(viewer, panel, config.paths.clone(), source.clone());

    let (width, height) = parse_pair(&cli.viewport, 'x').context("parsing --viewport")?;
    controller.viewer_mut().set_viewport(width as f32, height as f32);
    if cli.plain {
        controller.set_material_mode(MaterialMode::Plain);
    }

    let Some(pending) = controller.start() else {
        bail!("viewer is already loading");
    };
    let path = pending.path().to_path_buf();
    let framing = controller
        .complete(pending.wait().await)
        .with_context(|| format!("loading {}", path.display()))?;

    println!("Loaded {}", path.display());
    println!("  depth       {:.3}", framing.depth);
    println!("  scene size  {:.3}", framing.scene_size);
    println!("  radius      {:.3} (limits {:.3}..{:.3})", framing.radius, framing.lower_radius_limit, framing.upper_radius_limit);
    println!("  target      ({:.3}, {:.3}, {:.3})", framing.target.x, framing.target.y, framing.target.z);

    if matches!(source, AssetSource::Results { .. }) {
        let mut thumbnails = ThumbnailCache::new(config.paths.clone());
        let count = config.expected_count(&cli.scene);
        let frames = thumbnails.preload(&cli.scene, count).await;
        println!("  thumbnails  {} of {}", frames.len(), count);
    }

    log::debug!("Replaying {} clicks", cli.clicks.len());
    for click in &cli.clicks {
        let (x, y) = parse_pair(click, ',').with_context(|| format!("parsing --click {}", click))?;
        match controller.viewer().pick_at(x as f32, y as f32) {
            Some(hit) => {
                let p = hit.point;
                println!("Click ({}, {}) -> ({:.3}, {:.3}, {:.3})", x, y, p.x, p.y, p.z);
            }
            None => println!("Click ({}, {}) -> no surface", x, y),
        }
        controller.pointer_down(PointerButton::Primary, x, y);
        controller.pointer_up(PointerButton::Primary, x, y);
    }

    println!("{}", controller.measurement().display_text());
    Ok(())
}
