//! Side-by-side method comparison and the static image comparison panel

use crate::{
    annotation::MeasurementTool,
    framing::SceneFraming,
    selection::{SelectionOutcome, SelectionPanel},
    viewer::{CompletedLoad, PendingLoad, Viewer},
};
use reconview_core::Result;
use reconview_io::AssetPaths;
use std::path::PathBuf;

/// Reconstruction methods with exactly one active
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSelector {
    panel: SelectionPanel,
}

impl MethodSelector {
    pub fn new<I, S>(methods: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            panel: SelectionPanel::new(methods)?,
        })
    }

    pub fn with_active(self, method: &str) -> Result<Self> {
        Ok(Self {
            panel: self.panel.with_selected(method)?,
        })
    }

    pub fn active(&self) -> &str {
        self.panel.selected()
    }

    pub fn methods(&self) -> &[String] {
        self.panel.items()
    }

    /// Make `method` active; true only if the active method changed
    pub fn toggle(&mut self, method: &str, busy: bool) -> bool {
        matches!(self.panel.request(method, busy), SelectionOutcome::Changed { .. })
    }
}

/// Which half of the comparison view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// One viewer in the comparison, showing a single method's output
#[derive(Debug)]
pub struct ComparisonSlot {
    pub viewer: Viewer,
    pub measure: MeasurementTool,
    pub methods: MethodSelector,
}

impl ComparisonSlot {
    pub fn new(viewer: Viewer, methods: MethodSelector) -> Self {
        Self {
            viewer,
            measure: MeasurementTool::new(),
            methods,
        }
    }

    /// Reload this side; refused with no state change while it is loading
    fn begin(&mut self, paths: &AssetPaths, scene_id: &str) -> Option<PendingLoad> {
        if self.viewer.is_loading() {
            return None;
        }
        self.measure.reset(&mut self.viewer);
        let path = paths.comparison_output(scene_id, self.methods.active());
        self.viewer.begin_load(path)
    }
}

/// Two viewers loading the same scene reconstructed by different methods
#[derive(Debug)]
pub struct ComparisonView {
    left: ComparisonSlot,
    right: ComparisonSlot,
    paths: AssetPaths,
    scenes: SelectionPanel,
}

impl ComparisonView {
    /// View over the scenes in `scenes`, showing the selected one
    pub fn new(left: ComparisonSlot, right: ComparisonSlot, paths: AssetPaths, scenes: SelectionPanel) -> Self {
        Self {
            left,
            right,
            paths,
            scenes,
        }
    }

    pub fn scene_id(&self) -> &str {
        self.scenes.selected()
    }

    pub fn scenes(&self) -> &SelectionPanel {
        &self.scenes
    }

    /// True while either side has a load in flight
    pub fn is_loading(&self) -> bool {
        self.left.viewer.is_loading() || self.right.viewer.is_loading()
    }

    pub fn slot(&self, side: Side) -> &ComparisonSlot {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut ComparisonSlot {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Path the given side shows for the current scene
    pub fn asset_path(&self, side: Side) -> PathBuf {
        self.paths
            .comparison_output(self.scenes.selected(), self.slot(side).methods.active())
    }

    /// Load the current scene into both sides; a side still loading is skipped
    pub fn start(&mut self) -> (Option<PendingLoad>, Option<PendingLoad>) {
        let scene_id = self.scenes.selected();
        let left = self.left.begin(&self.paths, scene_id);
        let right = self.right.begin(&self.paths, scene_id);
        (left, right)
    }

    /// Switch the scene shown on both sides.
    ///
    /// Refused, with the selection unchanged, while either side is loading or
    /// when `scene_id` is unknown or already shown.
    pub fn select_scene(&mut self, scene_id: &str) -> (Option<PendingLoad>, Option<PendingLoad>) {
        let busy = self.is_loading();
        match self.scenes.request(scene_id, busy) {
            SelectionOutcome::Changed { .. } => self.start(),
            _ => (None, None),
        }
    }

    /// Switch one side to another method and reload it
    pub fn select_method(&mut self, side: Side, method: &str) -> Option<PendingLoad> {
        let paths = &self.paths;
        let scene_id = self.scenes.selected();
        let slot = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        if !slot.methods.toggle(method, slot.viewer.is_loading()) {
            return None;
        }
        log::debug!("{:?} viewer switched to {}", side, method);
        slot.begin(paths, scene_id)
    }

    pub fn complete(&mut self, side: Side, done: CompletedLoad) -> Result<SceneFraming> {
        self.slot_mut(side).viewer.finish_load(done)
    }
}

/// Precomputed comparison figures chosen from a strip of source thumbnails
#[derive(Debug, Clone, PartialEq)]
pub struct ImageComparison {
    panel: SelectionPanel,
    paths: AssetPaths,
}

impl ImageComparison {
    pub fn new(panel: SelectionPanel, paths: AssetPaths) -> Self {
        Self { panel, paths }
    }

    /// Figure currently displayed
    pub fn image(&self) -> PathBuf {
        self.paths.comparison_image(self.panel.selected())
    }

    /// Source thumbnail for each selectable name
    pub fn thumbnails(&self) -> Vec<PathBuf> {
        self.panel
            .items()
            .iter()
            .map(|name| self.paths.comparison_thumbnail(name))
            .collect()
    }

    /// Show `name`; returns the new figure path, or `None` when nothing changed
    pub fn select(&mut self, name: &str) -> Option<PathBuf> {
        match self.panel.request(name, false) {
            SelectionOutcome::Changed { .. } => Some(self.image()),
            _ => None,
        }
    }

    pub fn selected(&self) -> &str {
        self.panel.selected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticLoader;
    use std::path::Path;
    use std::sync::Arc;

    fn scenes() -> SelectionPanel {
        SelectionPanel::new(["dino", "kpi", "painting"]).unwrap()
    }

    fn view() -> ComparisonView {
        ComparisonView::new(
            slot(&["mapanything", "baseline"]),
            slot(&["mapanything", "baseline"]),
            AssetPaths::default(),
            scenes(),
        )
    }

    fn slot(methods: &[&str]) -> ComparisonSlot {
        ComparisonSlot::new(
            Viewer::new(Arc::new(StaticLoader::plane_at_depth(1.0))),
            MethodSelector::new(methods.iter().copied()).unwrap(),
        )
    }

    #[test]
    fn test_method_toggle() {
        let mut methods = MethodSelector::new(["mapanything", "baseline"]).unwrap();
        assert_eq!(methods.active(), "mapanything");
        assert!(!methods.toggle("mapanything", false));
        assert!(!methods.toggle("baseline", true));
        assert!(methods.toggle("baseline", false));
        assert_eq!(methods.active(), "baseline");
    }

    #[tokio::test]
    async fn test_sides_load_their_own_method() {
        let right = ComparisonSlot::new(
            Viewer::new(Arc::new(StaticLoader::plane_at_depth(1.0))),
            MethodSelector::new(["mapanything", "baseline"])
                .unwrap()
                .with_active("baseline")
                .unwrap(),
        );
        let mut view = ComparisonView::new(slot(&["mapanything", "baseline"]), right, AssetPaths::default(), scenes());

        let (left, right) = view.start();
        let (left, right) = (left.unwrap(), right.unwrap());
        assert_eq!(
            left.path(),
            Path::new("static/qual_viz_outputs/dino/dino_mapanything_output.glb")
        );
        assert_eq!(
            right.path(),
            Path::new("static/qual_viz_outputs/dino/dino_baseline_output.glb")
        );

        let done = left.wait().await;
        view.complete(Side::Left, done).unwrap();
        let done = right.wait().await;
        view.complete(Side::Right, done).unwrap();
        assert!(!view.slot(Side::Left).viewer.scene().is_empty());
        assert!(!view.slot(Side::Right).viewer.scene().is_empty());
    }

    #[tokio::test]
    async fn test_method_switch_reloads_one_side() {
        let mut view = ComparisonView::new(
            slot(&["mapanything", "baseline"]),
            slot(&["mapanything", "baseline"]),
            AssetPaths::default(),
            scenes().with_selected("kpi").unwrap(),
        );
        assert!(view.select_method(Side::Right, "mapanything").is_none());

        let pending = view.select_method(Side::Right, "baseline").unwrap();
        assert!(view.slot(Side::Right).viewer.is_loading());
        assert!(!view.slot(Side::Left).viewer.is_loading());
        assert_eq!(view.asset_path(Side::Right), pending.path());

        // Busy side ignores further switches and keeps its active method.
        assert!(view.select_method(Side::Right, "mapanything").is_none());
        assert_eq!(view.slot(Side::Right).methods.active(), "baseline");
        drop(pending);
    }

    #[tokio::test]
    async fn test_scene_switch_while_loading_is_refused() {
        let mut view = view();
        let (left, right) = view.start();
        let (left, right) = (left.unwrap(), right.unwrap());

        let (l, r) = view.select_scene("kpi");
        assert!(l.is_none() && r.is_none());
        assert_eq!(view.scene_id(), "dino");

        view.complete(Side::Left, left.wait().await).unwrap();
        // One side still loading keeps the view busy.
        assert!(view.select_scene("kpi").0.is_none());
        assert_eq!(view.scene_id(), "dino");
        view.complete(Side::Right, right.wait().await).unwrap();

        let (left, right) = view.select_scene("kpi");
        let (left, right) = (left.unwrap(), right.unwrap());
        assert_eq!(view.scene_id(), "kpi");
        assert_eq!(
            left.path(),
            Path::new("static/qual_viz_outputs/kpi/kpi_mapanything_output.glb")
        );
        drop((left, right));
    }

    #[test]
    fn test_unknown_or_current_scene_is_ignored() {
        let mut view = view();
        let (l, r) = view.select_scene("atlantis");
        assert!(l.is_none() && r.is_none());
        let (l, r) = view.select_scene("dino");
        assert!(l.is_none() && r.is_none());
        assert_eq!(view.scene_id(), "dino");
    }

    #[tokio::test]
    async fn test_completion_on_wrong_side_is_refused() {
        let mut view = view();
        let (left, right) = view.start();
        let (left, right) = (left.unwrap(), right.unwrap());

        let err = view.complete(Side::Left, right.wait().await).unwrap_err();
        assert!(matches!(err, reconview_core::Error::ForeignLoad { .. }));
        assert!(view.slot(Side::Left).viewer.scene().is_empty());
        assert!(view.slot(Side::Left).viewer.is_loading());

        view.complete(Side::Left, left.wait().await).unwrap();
        assert_eq!(view.slot(Side::Left).viewer.scene().node_count(), 1);
    }

    #[tokio::test]
    async fn test_start_skips_busy_side() {
        let mut view = view();
        let pending = view.select_method(Side::Right, "baseline").unwrap();
        {
            let slot = view.slot_mut(Side::Right);
            slot.measure.handle_pick(&mut slot.viewer, Some(reconview_core::Point3f::origin()));
        }

        let (left, right) = view.start();
        assert!(left.is_some());
        assert!(right.is_none());
        assert_eq!(view.slot(Side::Right).measure.points().len(), 1);
        drop((left, pending));
    }

    #[test]
    fn test_image_comparison_selection() {
        let panel = SelectionPanel::new(["room", "street"]).unwrap();
        let mut images = ImageComparison::new(panel, AssetPaths::default());
        assert_eq!(images.image(), PathBuf::from("static/comparison/room.png"));
        assert_eq!(images.thumbnails()[1], PathBuf::from("static/comparison/street_src.jpg"));

        assert!(images.select("room").is_none());
        assert_eq!(images.select("street"), Some(PathBuf::from("static/comparison/street.png")));
        assert_eq!(images.selected(), "street");
    }
}
