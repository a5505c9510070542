//! Asset loading for reconview
//!
//! This crate reads reconstruction outputs (glTF/GLB, PLY and OBJ) into
//! plain meshes with their world transforms, knows where the demo assets
//! and thumbnails live on disk, and preloads hover-preview frames.

pub mod error;
pub mod glb;
pub mod paths;
pub mod ply;
pub mod wavefront;
pub mod thumbnails;

pub use error::*;
pub use paths::AssetPaths;
pub use thumbnails::{Thumbnail, ThumbnailCache};

use reconview_core::{Color3, Transform3D, TriangleMesh};
use std::path::Path;

/// Result type for asset reading
pub type IoResult<T> = std::result::Result<T, IoError>;

/// One mesh of a decoded asset, already placed in the world
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMesh {
    pub name: String,
    pub mesh: TriangleMesh,
    pub transform: Transform3D,
    /// Base color declared by the asset's own material, if any
    pub base_color: Option<Color3>,
}

impl LoadedMesh {
    pub fn new(name: impl Into<String>, mesh: TriangleMesh) -> Self {
        Self {
            name: name.into(),
            mesh,
            transform: Transform3D::identity(),
            base_color: None,
        }
    }
}

/// A fully decoded asset, ready to be added to a scene
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedAsset {
    pub meshes: Vec<LoadedMesh>,
}

impl LoadedAsset {
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mesh.vertex_count()).sum()
    }
}

/// Source of decoded assets.
///
/// Implementations run on a blocking worker thread, so they may do file I/O.
pub trait AssetLoader: Send + Sync {
    fn load(&self, path: &Path) -> IoResult<LoadedAsset>;
}

/// Loads assets from the local filesystem, choosing the decoder by extension
#[derive(Debug, Clone, Copy, Default)]
pub struct FileAssetLoader;

impl AssetLoader for FileAssetLoader {
    fn load(&self, path: &Path) -> IoResult<LoadedAsset> {
        read_asset(path)
    }
}

/// Auto-detect format and read an asset
pub fn read_asset<P: AsRef<Path>>(path: P) -> IoResult<LoadedAsset> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    let asset = match extension.as_deref() {
        Some("glb") | Some("gltf") => glb::read_gltf(path)?,
        Some("ply") => ply::read_ply(path)?,
        Some("obj") => wavefront::read_obj(path)?,
        other => {
            return Err(IoError::UnsupportedFormat {
                format: other.unwrap_or("<none>").to_string(),
            })
        }
    };

    log::debug!(
        "Read {} with {} meshes and {} vertices",
        path.display(),
        asset.meshes.len(),
        asset.vertex_count()
    );
    Ok(asset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_reported() {
        let err = read_asset("does/not/exist/mesh.glb").unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.fbx");
        std::fs::write(&path, b"not a mesh").unwrap();

        match FileAssetLoader.load(&path) {
            Err(IoError::UnsupportedFormat { format }) => assert_eq!(format, "fbx"),
            other => panic!("expected unsupported format, got {:?}", other),
        }
    }

    #[test]
    fn test_io_error_converts_to_core_error() {
        let err: reconview_core::Error = IoError::UnsupportedFormat {
            format: "fbx".to_string(),
        }
        .into();
        assert!(matches!(err, reconview_core::Error::UnsupportedFormat(_)));
    }
}
