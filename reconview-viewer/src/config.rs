//! JSON configuration for the viewers

use crate::framing::FramingConfig;
use crate::pointer::DEFAULT_CLICK_THRESHOLD;
use reconview_core::{Error, Result};
use reconview_io::AssetPaths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Everything the gallery, results and comparison views are built from.
///
/// Every field has a default, so a config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub paths: AssetPaths,
    /// Reconstruction methods offered in the comparison view; the first is active
    pub methods: Vec<String>,
    /// Number of input views per results scene
    pub expected_thumbnail_counts: BTreeMap<String, usize>,
    /// View count assumed for scenes missing from `expected_thumbnail_counts`
    pub default_thumbnail_count: usize,
    pub hover_interval_ms: u64,
    pub click_threshold_px: f64,
    pub framing: FramingConfig,
    pub result_scenes: Vec<String>,
    pub gallery_scenes: Vec<String>,
    pub comparison_images: Vec<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let counts = [
            ("basketball", 2),
            ("basti_desk", 2),
            ("dino", 3),
            ("grindelwald", 3),
            ("jpl_mars_yard", 6),
            ("kpi", 2),
            ("mt_washington", 4),
            ("painting", 1),
            ("panda_wildwest", 1),
        ];
        Self {
            paths: AssetPaths::default(),
            methods: vec!["mapanything".to_string()],
            expected_thumbnail_counts: counts
                .iter()
                .map(|(name, count)| (name.to_string(), *count))
                .collect(),
            default_thumbnail_count: 10,
            hover_interval_ms: 250,
            click_threshold_px: DEFAULT_CLICK_THRESHOLD,
            framing: FramingConfig::default(),
            result_scenes: counts.iter().map(|(name, _)| name.to_string()).collect(),
            gallery_scenes: Vec::new(),
            comparison_images: Vec::new(),
        }
    }
}

impl ViewerConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(format!("invalid viewer config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_json_str(&text)?;
        log::debug!("Loaded viewer config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.methods.is_empty() {
            return Err(Error::Config("at least one method is required".to_string()));
        }
        if self.framing.fallback_depth <= 0.0 || !self.framing.fallback_depth.is_finite() {
            return Err(Error::Config("fallback_depth must be positive".to_string()));
        }
        if self.click_threshold_px < 0.0 {
            return Err(Error::Config("click_threshold_px must not be negative".to_string()));
        }
        Ok(())
    }

    /// Number of input views to preload for `scene_id`
    pub fn expected_count(&self, scene_id: &str) -> usize {
        self.expected_thumbnail_counts
            .get(scene_id)
            .copied()
            .unwrap_or(self.default_thumbnail_count)
    }

    pub fn hover_interval(&self) -> Duration {
        Duration::from_millis(self.hover_interval_ms)
    }
}
