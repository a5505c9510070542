//! In-memory loaders for unit tests

use reconview_core::{Point3f, TriangleMesh};
use reconview_io::{AssetLoader, IoError, IoResult, LoadedAsset, LoadedMesh};
use std::path::Path;

/// Always returns a clone of the same asset
pub(crate) struct StaticLoader(pub LoadedAsset);

impl StaticLoader {
    /// A 2x2 quad facing the reference camera at `-depth`
    pub fn plane_at_depth(depth: f32) -> Self {
        let z = -depth;
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(-1.0, -1.0, z),
                Point3f::new(1.0, -1.0, z),
                Point3f::new(1.0, 1.0, z),
                Point3f::new(-1.0, 1.0, z),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        let mut loaded = LoadedMesh::new("plane", mesh);
        loaded.base_color = Some([0.8, 0.7, 0.6]);
        Self(LoadedAsset { meshes: vec![loaded] })
    }
}

impl AssetLoader for StaticLoader {
    fn load(&self, _path: &Path) -> IoResult<LoadedAsset> {
        Ok(self.0.clone())
    }
}

/// Fails every load with a parse error
pub(crate) struct FailingLoader;

impl AssetLoader for FailingLoader {
    fn load(&self, _path: &Path) -> IoResult<LoadedAsset> {
        Err(IoError::ParseError {
            message: "corrupt file".to_string(),
        })
    }
}
