//! Interactive viewing of 3D reconstructions
//!
//! This crate holds everything between a decoded asset and the pixels,
//! short of the draw calls themselves:
//! - Orbit camera and automatic framing from the scene's depth statistics
//! - Click-versus-drag tracking and ray picking
//! - Two-point distance measurement with scene-scaled markers
//! - A viewer that allows one asset load in flight at a time
//! - Selection panels, hover previews and method comparison

pub mod annotation;
pub mod camera;
pub mod comparison;
pub mod config;
pub mod framing;
pub mod hover;
pub mod picking;
pub mod pointer;
pub mod selection;
pub mod viewer;

#[cfg(test)]
mod testing;

pub use annotation::{
    format_distance, Connector, MarkerStyle, MeasureState, MeasurementTool, GALLERY_IDLE_MESSAGE, IDLE_MESSAGE,
};
pub use camera::OrbitCamera;
pub use comparison::{ComparisonSlot, ComparisonView, ImageComparison, MethodSelector, Side};
pub use config::ViewerConfig;
pub use framing::{estimate_depth, DepthPolicy, FramingConfig, SceneFraming};
pub use hover::{HoverCycler, HoverSession};
pub use picking::{pick, PickHit, Ray};
pub use pointer::{ClickTracker, PointerButton};
pub use selection::{AssetSource, GalleryController, SelectionOutcome, SelectionPanel};
pub use viewer::{CompletedLoad, HemisphericLight, MaterialMode, PendingLoad, Viewer};
