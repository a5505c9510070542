//! Selection panels and the gallery controller that drives a viewer from one

use crate::{
    annotation::{MarkerStyle, MeasurementTool},
    framing::SceneFraming,
    pointer::PointerButton,
    viewer::{CompletedLoad, MaterialMode, PendingLoad, Viewer},
};
use reconview_core::{Error, Result};
use reconview_io::AssetPaths;
use std::path::PathBuf;

/// What a selection request did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The highlight moved; the previous id is returned
    Changed { previous: String },
    /// The id was already selected; nothing happens
    AlreadySelected,
    /// A load is in flight; the highlight stays where it was
    Busy,
    Unknown,
}

/// A list of selectable ids with exactly one active at all times
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPanel {
    items: Vec<String>,
    selected: usize,
}

impl SelectionPanel {
    /// Panel over `items` with the first one selected
    pub fn new<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            return Err(Error::Config("selection panel needs at least one item".to_string()));
        }
        Ok(Self { items, selected: 0 })
    }

    /// Panel with `initial` selected instead of the first item
    pub fn with_selected(mut self, initial: &str) -> Result<Self> {
        self.selected = self
            .position(initial)
            .ok_or_else(|| Error::Config(format!("unknown initial selection '{}'", initial)))?;
        Ok(self)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected(&self) -> &str {
        &self.items[self.selected]
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item == id)
    }

    /// Try to move the highlight to `id`
    pub fn request(&mut self, id: &str, busy: bool) -> SelectionOutcome {
        let Some(index) = self.position(id) else {
            return SelectionOutcome::Unknown;
        };
        if index == self.selected {
            return SelectionOutcome::AlreadySelected;
        }
        if busy {
            log::debug!("Load in flight, ignoring selection of '{}'", id);
            return SelectionOutcome::Busy;
        }
        let previous = std::mem::replace(&mut self.selected, index);
        SelectionOutcome::Changed {
            previous: self.items[previous].clone(),
        }
    }
}

/// Where a selected id's model comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// `{gallery_dir}/{id}/mesh.{ext}`
    Gallery,
    /// `{results_dir}/{id}/{id}_{method}_output.{ext}`
    Results { method: String },
}

/// A viewer, its measurement tool and the panel choosing what it shows
#[derive(Debug)]
pub struct GalleryController {
    viewer: Viewer,
    measure: MeasurementTool,
    panel: SelectionPanel,
    paths: AssetPaths,
    source: AssetSource,
}

impl GalleryController {
    /// Controller with the marker style of its page: gallery or results
    pub fn new(viewer: Viewer, panel: SelectionPanel, paths: AssetPaths, source: AssetSource) -> Self {
        let style = match source {
            AssetSource::Gallery => MarkerStyle::gallery(),
            AssetSource::Results { .. } => MarkerStyle::results(),
        };
        Self {
            viewer,
            measure: MeasurementTool::with_style(style),
            panel,
            paths,
            source,
        }
    }

    /// Replace the measurement overlay style; clears any current measurement
    pub fn with_marker_style(mut self, style: MarkerStyle) -> Self {
        self.measure.reset(&mut self.viewer);
        self.measure = MeasurementTool::with_style(style);
        self
    }

    pub fn asset_path(&self, id: &str) -> PathBuf {
        match &self.source {
            AssetSource::Gallery => self.paths.gallery_mesh(id),
            AssetSource::Results { method } => self.paths.comparison_output(id, method),
        }
    }

    /// Load whatever the panel currently has selected.
    ///
    /// Refused with no state change while a load is in flight.
    pub fn start(&mut self) -> Option<PendingLoad> {
        if self.viewer.is_loading() {
            log::debug!("Load in flight, ignoring start");
            return None;
        }
        self.measure.reset(&mut self.viewer);
        let path = self.asset_path(self.panel.selected());
        self.viewer.begin_load(path)
    }

    /// Handle a click on a thumbnail.
    ///
    /// Returns the load to await when the selection changed; rejected or
    /// redundant clicks return `None` and leave the highlight alone.
    pub fn select(&mut self, id: &str) -> Option<PendingLoad> {
        match self.panel.request(id, self.viewer.is_loading()) {
            SelectionOutcome::Changed { .. } => {
                self.measure.reset(&mut self.viewer);
                let path = self.asset_path(id);
                self.viewer.begin_load(path)
            }
            _ => None,
        }
    }

    /// Apply a finished load to the viewer
    pub fn complete(&mut self, done: CompletedLoad) -> Result<SceneFraming> {
        self.viewer.finish_load(done)
    }

    pub fn pointer_down(&mut self, button: PointerButton, x: f64, y: f64) {
        self.viewer.pointer_down(button, x, y);
    }

    /// Finish a pointer gesture; clicks on geometry feed the measurement
    pub fn pointer_up(&mut self, button: PointerButton, x: f64, y: f64) {
        if let Some(hit) = self.viewer.pointer_up(button, x, y) {
            self.measure.handle_pick(&mut self.viewer, Some(hit.point));
        }
    }

    pub fn set_material_mode(&mut self, mode: MaterialMode) {
        self.viewer.set_material_mode(mode);
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut Viewer {
        &mut self.viewer
    }

    pub fn measurement(&self) -> &MeasurementTool {
        &self.measure
    }

    /// Measurement tool together with the viewer it draws into
    pub fn measurement_mut(&mut self) -> (&mut MeasurementTool, &mut Viewer) {
        (&mut self.measure, &mut self.viewer)
    }

    pub fn panel(&self) -> &SelectionPanel {
        &self.panel
    }
}
