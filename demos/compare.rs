//! Load the same scene reconstructed by two methods side by side
//!
//! ```text
//! compare dino --left mapanything --right baseline --switch-right mapanything
//! compare dino --image room --image street
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use reconview_io::FileAssetLoader;
use reconview_viewer::{
    ComparisonSlot, ComparisonView, ImageComparison, MethodSelector, PendingLoad, SelectionPanel, Side, Viewer,
    ViewerConfig,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "compare")]
#[command(about = "Compare reconstructions of one scene from different methods")]
struct Cli {
    /// Scene id to load on both sides
    scene: String,

    /// JSON viewer configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Method on the left side (defaults to the first configured one)
    #[arg(long)]
    left: Option<String>,

    /// Method on the right side (defaults to the last configured one)
    #[arg(long)]
    right: Option<String>,

    /// After the first load, switch the right side to this method
    #[arg(long)]
    switch_right: Option<String>,

    /// Comparison figures to step through; the first one starts selected
    #[arg(long = "image")]
    images: Vec<String>,
}

fn slot(config: &ViewerConfig, method: Option<&str>, fallback: Option<&String>) -> Result<ComparisonSlot> {
    let active = method
        .map(str::to_string)
        .or_else(|| fallback.cloned())
        .context("no methods configured")?;
    let mut methods = config.methods.clone();
    if !methods.contains(&active) {
        methods.push(active.clone());
    }
    let selector = MethodSelector::new(methods)?.with_active(&active)?;
    let viewer = Viewer::with_config(
        Arc::new(FileAssetLoader),
        config.framing.clone(),
        config.click_threshold_px,
    );
    Ok(ComparisonSlot::new(viewer, selector))
}

async fn finish(view: &mut ComparisonView, side: Side, pending: Option<PendingLoad>) {
    let Some(pending) = pending else {
        println!("{:?}: nothing to load", side);
        return;
    };
    let path = pending.path().to_path_buf();
    match view.complete(side, pending.wait().await) {
        Ok(framing) => println!(
            "{:?}: {} (depth {:.3}, scene size {:.3})",
            side,
            path.display(),
            framing.depth,
            framing.scene_size
        ),
        Err(e) => println!("{:?}: failed to load {}: {}", side, path.display(), e),
    }
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

    let left = slot(&config, cli.left.as_deref(), config.methods.first())?;
    let right = slot(&config, cli.right.as_deref(), config.methods.last())?;
    let mut scene_ids = config.result_scenes.clone();
    if !scene_ids.contains(&cli.scene) {
        scene_ids.push(cli.scene.clone());
    }
    let scenes = SelectionPanel::new(scene_ids)?.with_selected(&cli.scene)?;
    let mut view = ComparisonView::new(left, right, config.paths.clone(), scenes);

    let (left, right) = view.start();
    finish(&mut view, Side::Left, left).await;
    finish(&mut view, Side::Right, right).await;

    if let Some(method) = &cli.switch_right {
        log::info!("Switching right side to {}", method);
        let pending = view.select_method(Side::Right, method);
        finish(&mut view, Side::Right, pending).await;
    }

    let image_names = if cli.images.is_empty() {
        config.comparison_images.clone()
    } else {
        cli.images.clone()
    };
    if let Ok(panel) = SelectionPanel::new(image_names.iter().cloned()) {
        let mut images = ImageComparison::new(panel, config.paths.clone());
        println!("Figure: {}", images.image().display());
        for name in image_names.iter().skip(1) {
            if let Some(path) = images.select(name) {
                println!("Figure: {}", path.display());
            }
        }
    }

    Ok(())
}
