//! Point-to-point distance measurement
//!
//! Picks accumulate into a buffer of at most two world points. Each accepted
//! point gets a sphere marker; the second also gets a connector joining the
//! pair plus a distance readout. A third pick
//! starts a new pair in the same step.

use crate::viewer::Viewer;
use reconview_core::{
    Color3, Material, MaterialId, NodeId, Point3f, SceneNode, TriangleMesh, ANNOTATION_EMISSIVE,
};
use serde::{Deserialize, Serialize};

/// Readout shown while no pair is complete
pub const IDLE_MESSAGE: &str = "Click two points to measure distance";

/// Idle readout of the single-model gallery
pub const GALLERY_IDLE_MESSAGE: &str = "Pick two points to measure the distance.";

const SPHERE_SEGMENTS: usize = 16;
const TUBE_TESSELLATION: usize = 8;

/// What joins the two measured points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Connector {
    /// Solid tube of radius `scene_size / radius_divisor`
    Tube { radius_divisor: f32 },
    /// One-pixel line
    Line,
}

/// Look of the measurement overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    /// Sphere diameter is `scene_size / diameter_divisor`
    pub diameter_divisor: f32,
    pub connector: Connector,
    pub color: Color3,
    pub idle_message: String,
}

impl MarkerStyle {
    /// Orange spheres joined by a tube
    pub fn results() -> Self {
        Self {
            diameter_divisor: 100.0,
            connector: Connector::Tube { radius_divisor: 400.0 },
            color: ANNOTATION_EMISSIVE,
            idle_message: IDLE_MESSAGE.to_string(),
        }
    }

    /// Smaller red spheres joined by a line
    pub fn gallery() -> Self {
        Self {
            diameter_divisor: 200.0,
            connector: Connector::Line,
            color: [1.0, 0.0, 0.0],
            idle_message: GALLERY_IDLE_MESSAGE.to_string(),
        }
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self::results()
    }
}

/// How many points are currently selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureState {
    Empty,
    One,
    Two,
}

/// Format a distance the way the readout shows it
pub fn format_distance(distance: f32) -> String {
    format!("Distance: {:.2} m", distance)
}

/// Measurement workflow bound to whichever viewer is passed in
#[derive(Debug)]
pub struct MeasurementTool {
    style: MarkerStyle,
    points: Vec<Point3f>,
    markers: Vec<NodeId>,
    material: Option<MaterialId>,
    display: String,
}

impl MeasurementTool {
    pub fn new() -> Self {
        Self::with_style(MarkerStyle::default())
    }

    pub fn with_style(style: MarkerStyle) -> Self {
        let display = style.idle_message.clone();
        Self {
            style,
            points: Vec::with_capacity(2),
            markers: Vec::new(),
            material: None,
            display,
        }
    }

    pub fn style(&self) -> &MarkerStyle {
        &self.style
    }

    pub fn state(&self) -> MeasureState {
        match self.points.len() {
            0 => MeasureState::Empty,
            1 => MeasureState::One,
            _ => MeasureState::Two,
        }
    }

    pub fn points(&self) -> &[Point3f] {
        &self.points
    }

    /// Scene nodes currently drawn for this measurement
    pub fn markers(&self) -> &[NodeId] {
        &self.markers
    }

    pub fn display_text(&self) -> &str {
        &self.display
    }

    /// Distance of the completed pair
    pub fn distance(&self) -> Option<f32> {
        match self.points.as_slice() {
            [a, b] => Some(nalgebra::distance(a, b)),
            _ => None,
        }
    }

    /// Feed one pick result; a miss (`None`) changes nothing
    pub fn handle_pick(&mut self, viewer: &mut Viewer, pick: Option<Point3f>) -> MeasureState {
        let Some(point) = pick else {
            return self.state();
        };

        if self.points.len() == 2 {
            self.reset(viewer);
        }

        let scene_size = viewer.scene_size();
        let diameter = scene_size / self.style.diameter_divisor;
        let material = self.material(viewer);

        let sphere = TriangleMesh::uv_sphere(point, diameter, SPHERE_SEGMENTS);
        self.add_marker(viewer, SceneNode::new("sphere", sphere), material);
        self.points.push(point);

        if let [a, b] = self.points[..] {
            let connector = match self.style.connector {
                Connector::Tube { radius_divisor } => {
                    let radius = scene_size / radius_divisor;
                    SceneNode::new("tube", TriangleMesh::tube(a, b, radius, TUBE_TESSELLATION))
                }
                Connector::Line => SceneNode::polyline("line", vec![a, b]),
            };
            self.add_marker(viewer, connector, material);

            let distance = nalgebra::distance(&a, &b);
            self.display = format_distance(distance);
            log::info!("{}", self.display);
        }

        self.state()
    }

    /// Destroy every marker and return to the idle readout
    pub fn reset(&mut self, viewer: &mut Viewer) {
        let scene = viewer.scene_mut();
        for id in self.markers.drain(..) {
            scene.remove_node(id);
        }
        self.points.clear();
        self.display.clone_from(&self.style.idle_message);
    }

    fn add_marker(&mut self, viewer: &mut Viewer, node: SceneNode, material: MaterialId) {
        let id = viewer
            .scene_mut()
            .add_node(node.with_material(material).with_pickable(false));
        self.markers.push(id);
    }

    /// The shared marker material, recreated if a load cleared it
    fn material(&mut self, viewer: &mut Viewer) -> MaterialId {
        match self.material {
            Some(id) if viewer.scene().material(id).is_some() => id,
            _ => {
                let id = viewer
                    .scene_mut()
                    .add_material(Material::emissive("annotationMaterial", self.style.color));
                self.material = Some(id);
                id
            }
        }
    }
}

impl Default for MeasurementTool {
    fn default() -> Self {
        Self::new()
    }
}
