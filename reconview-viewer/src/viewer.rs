//! The viewer: one scene, one camera, one light
//!
//! Loading is split in two so at most one load can be in flight. [`Viewer::begin_load`]
//! clears the scene and hands back a [`PendingLoad`]; awaiting it yields a
//! [`CompletedLoad`], which [`Viewer::finish_load`] applies. The busy flag is
//! owned by a guard that travels with the pending load, so it clears on both
//! the success and failure paths, and also if the caller abandons the load.

use crate::{
    camera::OrbitCamera,
    framing::{FramingConfig, SceneFraming},
    picking::{pick, PickHit, Ray},
    pointer::{ClickTracker, PointerButton, DEFAULT_CLICK_THRESHOLD},
};
use nalgebra::Vector3;
use reconview_core::{BoxError, Error, Material, MaterialId, NodeId, Result, Scene, SceneNode};
use reconview_io::{AssetLoader, LoadedAsset};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Sky/ground light shining from `direction`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphericLight {
    pub direction: Vector3<f32>,
    pub intensity: f32,
}

impl Default for HemisphericLight {
    fn default() -> Self {
        Self {
            direction: Vector3::new(1.0, 1.0, 0.0),
            intensity: 2.0,
        }
    }
}

/// Surface appearance for loaded asset meshes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterialMode {
    /// The asset's own materials
    #[default]
    Textured,
    /// A neutral grey that shows the reconstructed geometry only
    Plain,
}

/// Clears the owning viewer's busy flag when dropped
#[derive(Debug)]
struct LoadGuard(Arc<AtomicBool>);

impl Drop for LoadGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A load that has been issued and not yet finished
#[derive(Debug)]
pub struct PendingLoad {
    path: PathBuf,
    handle: JoinHandle<reconview_io::IoResult<LoadedAsset>>,
    guard: LoadGuard,
}

impl PendingLoad {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the decode to finish
    pub async fn wait(self) -> CompletedLoad {
        let outcome = match self.handle.await {
            Ok(Ok(asset)) => Ok(asset),
            Ok(Err(e)) => Err(BoxError::from(e)),
            Err(join_error) => Err(BoxError::from(join_error)),
        };
        CompletedLoad {
            path: self.path,
            outcome,
            guard: self.guard,
        }
    }
}

/// A finished load waiting to be applied with [`Viewer::finish_load`]
#[derive(Debug)]
pub struct CompletedLoad {
    path: PathBuf,
    outcome: std::result::Result<LoadedAsset, BoxError>,
    guard: LoadGuard,
}

impl CompletedLoad {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Owns a scene and presents it through an orbit camera
pub struct Viewer {
    scene: Scene,
    camera: OrbitCamera,
    light: HemisphericLight,
    loader: Arc<dyn AssetLoader>,
    config: FramingConfig,
    clicks: ClickTracker,
    viewport: (f32, f32),
    loading: Arc<AtomicBool>,
    framing: Option<SceneFraming>,
    current_asset: Option<PathBuf>,
    asset_nodes: Vec<(NodeId, Option<MaterialId>)>,
    material_mode: MaterialMode,
    plain_material: Option<MaterialId>,
}

impl Viewer {
    /// Create a viewer with the default framing configuration
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self::with_config(loader, FramingConfig::default(), DEFAULT_CLICK_THRESHOLD)
    }

    pub fn with_config(loader: Arc<dyn AssetLoader>, config: FramingConfig, click_threshold: f64) -> Self {
        Self {
            scene: Scene::new(),
            camera: OrbitCamera::default(),
            light: HemisphericLight::default(),
            loader,
            config,
            clicks: ClickTracker::new(click_threshold),
            viewport: (800.0, 600.0),
            loading: Arc::new(AtomicBool::new(false)),
            framing: None,
            current_asset: None,
            asset_nodes: Vec::new(),
            material_mode: MaterialMode::default(),
            plain_material: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Clear the scene and start decoding `path` on a blocking worker.
    ///
    /// Returns `None`, leaving everything untouched, while another load is in
    /// flight. Must be called from within a Tokio runtime.
    pub fn begin_load(&mut self, path: impl Into<PathBuf>) -> Option<PendingLoad> {
        let path = path.into();
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("Load already in flight, ignoring {}", path.display());
            return None;
        }
        let guard = LoadGuard(Arc::clone(&self.loading));

        self.scene.clear_nodes();
        self.scene.clear_materials();
        self.asset_nodes.clear();
        self.plain_material = None;
        self.framing = None;
        self.current_asset = None;

        log::info!("Loading {}", path.display());
        let loader = Arc::clone(&self.loader);
        let worker_path = path.clone();
        let handle = tokio::task::spawn_blocking(move || loader.load(&worker_path));

        Some(PendingLoad { path, handle, guard })
    }

    /// Apply a finished load: add its meshes and frame the camera on success.
    ///
    /// On failure the scene stays empty and the cause is returned. Either way
    /// the viewer accepts new loads afterwards.
    ///
    /// A load issued by a different viewer is rejected with
    /// [`Error::ForeignLoad`] and discarded, which releases the issuing viewer.
    /// This viewer's own state, busy flag included, is left untouched.
    pub fn finish_load(&mut self, done: CompletedLoad) -> Result<SceneFraming> {
        let CompletedLoad { path, outcome, guard } = done;
        if !Arc::ptr_eq(&guard.0, &self.loading) {
            log::error!("Refusing {}: load belongs to another viewer", path.display());
            return Err(Error::ForeignLoad { path });
        }
        let result = match outcome {
            Ok(asset) => {
                self.install(asset);
                let framing = SceneFraming::compute(&self.scene, &self.config);
                framing.apply(&mut self.camera, &self.config);
                self.framing = Some(framing);
                self.current_asset = Some(path.clone());
                log::info!(
                    "Loaded {} ({} meshes, scene size {:.3})",
                    path.display(),
                    self.asset_nodes.len(),
                    framing.scene_size
                );
                Ok(framing)
            }
            Err(source) => {
                log::error!("Failed to load {}: {}", path.display(), source);
                Err(Error::load(path, "asset could not be loaded", source))
            }
        };
        drop(guard);
        result
    }

    /// Load `path` and wait for it; `Error::LoadInFlight` if one is already running
    pub async fn load(&mut self, path: impl Into<PathBuf>) -> Result<SceneFraming> {
        let pending = self.begin_load(path).ok_or(Error::LoadInFlight)?;
        let done = pending.wait().await;
        self.finish_load(done)
    }

    fn install(&mut self, asset: LoadedAsset) {
        for loaded in asset.meshes {
            let material = loaded.base_color.map(|color| {
                self.scene
                    .add_material(Material::textured(format!("{}_material", loaded.name), color))
            });
            let mut node = SceneNode::new(loaded.name, loaded.mesh).with_transform(loaded.transform);
            node.material = material;
            let id = self.scene.add_node(node);
            self.asset_nodes.push((id, material));
        }
        self.apply_material_mode();
    }

    /// Switch loaded meshes between their own and the plain material.
    ///
    /// The mode sticks across loads.
    pub fn set_material_mode(&mut self, mode: MaterialMode) {
        self.material_mode = mode;
        self.apply_material_mode();
    }

    pub fn material_mode(&self) -> MaterialMode {
        self.material_mode
    }

    fn apply_material_mode(&mut self) {
        let plain = match self.material_mode {
            MaterialMode::Textured => None,
            MaterialMode::Plain => Some(match self.plain_material {
                Some(id) if self.scene.material(id).is_some() => id,
                _ => {
                    let id = self.scene.add_material(Material::plain());
                    self.plain_material = Some(id);
                    id
                }
            }),
        };
        for (id, original) in &self.asset_nodes {
            if let Some(node) = self.scene.node_mut(*id) {
                node.material = plain.or(*original);
            }
        }
    }

    /// Resize the drawing surface
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
        if height > 0.0 {
            self.camera.aspect_ratio = width / height;
        }
    }

    pub fn pointer_down(&mut self, button: PointerButton, x: f64, y: f64) {
        self.clicks.pointer_down(button, x, y);
    }

    /// Finish a gesture; a click is resolved against the scene geometry
    pub fn pointer_up(&mut self, button: PointerButton, x: f64, y: f64) -> Option<PickHit> {
        let (x, y) = self.clicks.pointer_up(button, x, y)?;
        self.pick_at(x as f32, y as f32)
    }

    /// Pick the nearest pickable surface under pixel `(x, y)`
    pub fn pick_at(&self, x: f32, y: f32) -> Option<PickHit> {
        let (width, height) = self.viewport;
        let ray = Ray::from_screen(&self.camera, x, y, width, height)?;
        pick(&self.scene, &ray)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn light(&self) -> &HemisphericLight {
        &self.light
    }

    pub fn config(&self) -> &FramingConfig {
        &self.config
    }

    /// Framing of the last successful load
    pub fn framing(&self) -> Option<&SceneFraming> {
        self.framing.as_ref()
    }

    /// Scale used for overlays; derived from the fallback depth until something loads
    pub fn scene_size(&self) -> f32 {
        self.framing
            .map(|f| f.scene_size)
            .unwrap_or(3.0 * self.config.fallback_depth)
    }

    pub fn current_asset(&self) -> Option<&Path> {
        self.current_asset.as_deref()
    }

    /// Nodes created from the current asset, in load order
    pub fn asset_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.asset_nodes.iter().map(|(id, _)| *id)
    }
}

impl std::fmt::Debug for Viewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("nodes", &self.scene.node_count())
            .field("loading", &self.is_loading())
            .field("current_asset", &self.current_asset)
            .field("framing", &self.framing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingLoader, StaticLoader};
    use approx::assert_relative_eq;
    use reconview_core::MaterialKind;

    #[tokio::test]
    async fn test_load_frames_scene() {
        let mut viewer = Viewer::new(Arc::new(StaticLoader::plane_at_depth(2.0)));
        let framing = viewer.load("scene.glb").await.unwrap();

        assert_relative_eq!(framing.depth, 2.0, max_relative = 1e-5);
        assert_relative_eq!(viewer.scene_size(), 6.0, max_relative = 1e-5);
        assert_relative_eq!(viewer.camera().radius, 3.0, max_relative = 1e-5);
        assert_eq!(viewer.current_asset(), Some(Path::new("scene.glb")));
        assert!(!viewer.is_loading());
    }

    #[tokio::test]
    async fn test_second_load_is_rejected_while_in_flight() {
        let mut viewer = Viewer::new(Arc::new(StaticLoader::plane_at_depth(2.0)));
        let pending = viewer.begin_load("a.glb").unwrap();
        assert!(viewer.is_loading());

        assert!(viewer.begin_load("b.glb").is_none());
        assert!(matches!(viewer.load("c.glb").await, Err(Error::LoadInFlight)));

        let done = pending.wait().await;
        assert_eq!(done.path(), Path::new("a.glb"));
        viewer.finish_load(done).unwrap();
        assert!(!viewer.is_loading());
        assert!(viewer.begin_load("b.glb").is_some());
    }

    #[tokio::test]
    async fn test_failed_load_leaves_cleared_scene() {
        let mut viewer = Viewer::new(Arc::new(StaticLoader::plane_at_depth(2.0)));
        viewer.load("first.glb").await.unwrap();
        assert!(!viewer.scene().is_empty());

        let mut viewer = Viewer {
            loader: Arc::new(FailingLoader),
            ..viewer
        };
        let err = viewer.load("broken.glb").await.unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
        assert!(viewer.scene().is_empty());
        assert_eq!(viewer.scene().material_count(), 0);
        assert!(viewer.framing().is_none());
        assert!(!viewer.is_loading());
    }

    #[tokio::test]
    async fn test_load_from_another_viewer_is_refused() {
        let mut left = Viewer::new(Arc::new(StaticLoader::plane_at_depth(1.0)));
        let mut right = Viewer::new(Arc::new(StaticLoader::plane_at_depth(3.0)));
        let own = left.begin_load("left.glb").unwrap();
        let foreign = right.begin_load("right.glb").unwrap();

        let err = left.finish_load(foreign.wait().await).unwrap_err();
        assert!(matches!(err, Error::ForeignLoad { ref path } if path == Path::new("right.glb")));
        assert!(left.scene().is_empty());
        assert!(left.is_loading());
        assert!(!right.is_loading());
        assert!(right.scene().is_empty());

        let framing = left.finish_load(own.wait().await).unwrap();
        assert_relative_eq!(framing.depth, 1.0, max_relative = 1e-5);
        assert!(!left.is_loading());
    }

    #[tokio::test]
    async fn test_abandoned_load_releases_viewer() {
        let mut viewer = Viewer::new(Arc::new(StaticLoader::plane_at_depth(1.0)));
        let pending = viewer.begin_load("a.glb").unwrap();
        drop(pending);
        assert!(!viewer.is_loading());
    }

    #[tokio::test]
    async fn test_plain_mode_survives_reload() {
        let mut viewer = Viewer::new(Arc::new(StaticLoader::plane_at_depth(1.0)));
        viewer.set_material_mode(MaterialMode::Plain);
        viewer.load("a.glb").await.unwrap();

        let node = viewer.asset_nodes().next().unwrap();
        let material = viewer.scene().node(node).unwrap().material.unwrap();
        assert!(matches!(
            viewer.scene().material(material).unwrap().kind,
            MaterialKind::Plain { .. }
        ));

        viewer.set_material_mode(MaterialMode::Textured);
        let material = viewer.scene().node(node).unwrap().material.unwrap();
        assert!(matches!(
            viewer.scene().material(material).unwrap().kind,
            MaterialKind::Textured { .. }
        ));
    }

    #[tokio::test]
    async fn test_click_picks_surface_drag_does_not() {
        let mut viewer = Viewer::new(Arc::new(StaticLoader::plane_at_depth(2.0)));
        viewer.load("a.glb").await.unwrap();
        // Look straight down -Z at the plane.
        viewer.camera_mut().beta = std::f32::consts::FRAC_PI_2;
        viewer.set_viewport(800.0, 600.0);

        viewer.pointer_down(PointerButton::Primary, 400.0, 300.0);
        let hit = viewer.pointer_up(PointerButton::Primary, 401.0, 300.0);
        assert!(hit.is_some());
        assert_relative_eq!(hit.unwrap().point.z, -2.0, epsilon = 1e-3);

        viewer.pointer_down(PointerButton::Primary, 400.0, 300.0);
        assert!(viewer.pointer_up(PointerButton::Primary, 440.0, 300.0).is_none());
    }
}
