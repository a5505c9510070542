//! Hover-preview frame preloading
//!
//! Each selectable scene has a fixed number of input views. A frame that
//! fails to load is dropped from the sequence rather than failing the scene.

use crate::AssetPaths;
use std::collections::HashMap;
use std::path::PathBuf;

/// A preview frame that decoded successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// Position in the full `view_{i}` sequence
    pub index: usize,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Caches the loadable frames per `(scene, count)` pair
#[derive(Debug, Default)]
pub struct ThumbnailCache {
    paths: AssetPaths,
    cache: HashMap<(String, usize), Vec<Thumbnail>>,
}

impl ThumbnailCache {
    pub fn new(paths: AssetPaths) -> Self {
        Self {
            paths,
            cache: HashMap::new(),
        }
    }

    /// Check `view_0 .. view_{count-1}` for `scene_id`, keeping the frames that load.
    ///
    /// Image headers are read on a blocking worker, so this must be awaited
    /// from within a Tokio runtime. Results are cached per `(scene, count)`.
    pub async fn preload(&mut self, scene_id: &str, count: usize) -> &[Thumbnail] {
        let key = (scene_id.to_string(), count);
        if !self.cache.contains_key(&key) {
            let paths = self.paths.clone();
            let id = scene_id.to_string();
            let worker = tokio::task::spawn_blocking(move || readable_frames(&paths, &id, count));
            let frames = match worker.await {
                Ok(frames) => frames,
                Err(e) => {
                    log::warn!("Thumbnail preload for {} did not finish: {}", scene_id, e);
                    return &[];
                }
            };
            log::info!("Cached {} of {} thumbnails for {}", frames.len(), count, scene_id);
            self.cache.insert(key.clone(), frames);
        }
        self.cache.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Frames from an earlier [`preload`](Self::preload), if any
    pub fn cached(&self, scene_id: &str, count: usize) -> Option<&[Thumbnail]> {
        self.cache
            .get(&(scene_id.to_string(), count))
            .map(Vec::as_slice)
    }

    /// Path shown while the pointer is not over the thumbnail
    pub fn resting_frame(&self, scene_id: &str) -> PathBuf {
        self.paths.input_view(scene_id, 0)
    }
}

/// Frames of `scene_id` whose image header can be read
fn readable_frames(paths: &AssetPaths, scene_id: &str, count: usize) -> Vec<Thumbnail> {
    (0..count)
        .filter_map(|index| {
            let path = paths.input_view(scene_id, index);
            match image::image_dimensions(&path) {
                Ok((width, height)) => Some(Thumbnail { index, path, width, height }),
                Err(e) => {
                    log::warn!("Failed to load thumbnail {}: {}", path.display(), e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_frame(paths: &AssetPaths, scene: &str, index: usize) {
        let path = paths.input_view(scene, index);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        image::RgbImage::new(4, 3).save(&path).unwrap();
    }

    #[tokio::test]
    async fn test_failed_frames_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AssetPaths {
            results_dir: dir.path().to_path_buf(),
            ..AssetPaths::default()
        };
        write_frame(&paths, "dino", 0);
        write_frame(&paths, "dino", 2);
        // view_1 is present but not an image
        std::fs::write(paths.input_view("dino", 1), b"garbage").unwrap();

        let mut cache = ThumbnailCache::new(paths);
        let frames = cache.preload("dino", 4).await;
        let indices: Vec<usize> = frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!((frames[0].width, frames[0].height), (4, 3));
        assert!(cache.cached("dino", 4).is_some());
        assert!(cache.cached("dino", 3).is_none());
    }

    #[tokio::test]
    async fn test_missing_scene_yields_no_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = ThumbnailCache::new(AssetPaths {
            results_dir: dir.path().to_path_buf(),
            ..AssetPaths::default()
        });
        assert!(cache.preload("nowhere", 3).await.is_empty());
        assert_eq!(cache.cached("nowhere", 3), Some(&[][..]));
    }

    #[tokio::test]
    async fn test_cached_frames_are_not_read_again() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AssetPaths {
            results_dir: dir.path().to_path_buf(),
            ..AssetPaths::default()
        };
        write_frame(&paths, "kpi", 0);
        let mut cache = ThumbnailCache::new(paths.clone());
        assert_eq!(cache.preload("kpi", 2).await.len(), 1);

        // A frame appearing later is not picked up for the same key.
        write_frame(&paths, "kpi", 1);
        assert_eq!(cache.preload("kpi", 2).await.len(), 1);
        assert_eq!(cache.preload("kpi", 3).await.len(), 2);
    }
}
