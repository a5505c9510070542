//! On-disk layout of the demo assets

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory roots and file extensions for every asset the viewers show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    /// Single-model gallery: `{gallery_dir}/{id}/mesh.{ext}`
    pub gallery_dir: PathBuf,
    /// Per-method reconstruction outputs and their input views
    pub results_dir: PathBuf,
    /// Pre-rendered comparison images
    pub comparison_dir: PathBuf,
    pub model_extension: String,
    pub thumbnail_extension: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            gallery_dir: PathBuf::from("static/gallery"),
            results_dir: PathBuf::from("static/qual_viz_outputs"),
            comparison_dir: PathBuf::from("static/comparison"),
            model_extension: "glb".to_string(),
            thumbnail_extension: "png".to_string(),
        }
    }
}

impl AssetPaths {
    /// `{results_dir}/{id}/{id}_{method}_output.{ext}`
    pub fn comparison_output(&self, scene_id: &str, method: &str) -> PathBuf {
        self.results_dir.join(scene_id).join(format!(
            "{}_{}_output.{}",
            scene_id, method, self.model_extension
        ))
    }

    /// `{gallery_dir}/{id}/mesh.{ext}`
    pub fn gallery_mesh(&self, scene_id: &str) -> PathBuf {
        self.gallery_dir
            .join(scene_id)
            .join(format!("mesh.{}", self.model_extension))
    }

    /// `{gallery_dir}/{id}/image.jpg`
    pub fn gallery_thumbnail(&self, scene_id: &str) -> PathBuf {
        self.gallery_dir.join(scene_id).join("image.jpg")
    }

    /// `{results_dir}/{id}/{id}_input_images/view_{i}.{ext}`
    pub fn input_view(&self, scene_id: &str, index: usize) -> PathBuf {
        self.results_dir
            .join(scene_id)
            .join(format!("{}_input_images", scene_id))
            .join(format!("view_{}.{}", index, self.thumbnail_extension))
    }

    /// `{comparison_dir}/{name}.png`
    pub fn comparison_image(&self, name: &str) -> PathBuf {
        self.comparison_dir.join(format!("{}.png", name))
    }

    /// `{comparison_dir}/{name}_src.jpg`
    pub fn comparison_thumbnail(&self, name: &str) -> PathBuf {
        self.comparison_dir.join(format!("{}_src.jpg", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_result_layout() {
        let paths = AssetPaths::default();
        assert_eq!(
            paths.comparison_output("dino", "mapanything"),
            Path::new("static/qual_viz_outputs/dino/dino_mapanything_output.glb")
        );
        assert_eq!(
            paths.input_view("kpi", 1),
            Path::new("static/qual_viz_outputs/kpi/kpi_input_images/view_1.png")
        );
    }

    #[test]
    fn test_gallery_and_comparison_layout() {
        let paths = AssetPaths {
            model_extension: "ply".to_string(),
            ..AssetPaths::default()
        };
        assert_eq!(paths.gallery_mesh("painting"), Path::new("static/gallery/painting/mesh.ply"));
        assert_eq!(paths.gallery_thumbnail("painting"), Path::new("static/gallery/painting/image.jpg"));
        assert_eq!(paths.comparison_image("indoor"), Path::new("static/comparison/indoor.png"));
        assert_eq!(paths.comparison_thumbnail("indoor"), Path::new("static/comparison/indoor_src.jpg"));
    }
}
