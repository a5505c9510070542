//! Scene auto-framing
//!
//! Reconstructions are expressed in the frame of their reference camera,
//! which sits at the world origin looking down -Z, so the depth of a world
//! point is simply `-z`. The geometric mean of vertex depths gives a scale
//! for the whole scene that a handful of far-away outliers cannot inflate;
//! every camera bound is derived from it.

use crate::camera::OrbitCamera;
use nalgebra::Point3;
use reconview_core::Scene;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Depth used when no vertex qualifies
pub const DEFAULT_FALLBACK_DEPTH: f32 = 5.0;

/// Which vertices enter the depth estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthPolicy {
    /// Only vertices in front of the camera (`-z > 0`); unbiased mean;
    /// the fallback depth when nothing qualifies.
    #[default]
    FrontOnly,
    /// Every vertex, with the log accumulator starting at 1; returns 0 for an
    /// empty scene. Vertices behind the camera make the result NaN.
    Legacy,
}

/// Tunables for framing and camera feel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    pub policy: DepthPolicy,
    pub fallback_depth: f32,
    pub angular_sensibility: f32,
    pub panning_sensibility: f32,
    pub inertia: f32,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            policy: DepthPolicy::FrontOnly,
            fallback_depth: DEFAULT_FALLBACK_DEPTH,
            angular_sensibility: 2000.0,
            panning_sensibility: 2000.0,
            inertia: 0.9,
        }
    }
}

/// Geometric mean of the forward depth of every visible vertex in `scene`
pub fn estimate_depth(scene: &Scene, policy: DepthPolicy, fallback: f32) -> f32 {
    let (mut log_sum, mut count) = match policy {
        DepthPolicy::FrontOnly => (0.0f64, 0usize),
        DepthPolicy::Legacy => (1.0f64, 0usize),
    };

    for (_, node) in scene.nodes() {
        if !node.visible || node.vertex_count() == 0 {
            continue;
        }
        for p in node.world_vertices() {
            let depth = -(p.z as f64);
            match policy {
                DepthPolicy::FrontOnly if depth > 0.0 => {
                    log_sum += depth.ln();
                    count += 1;
                }
                DepthPolicy::FrontOnly => {}
                DepthPolicy::Legacy => {
                    log_sum += depth.ln();
                    count += 1;
                }
            }
        }
    }

    if count == 0 {
        return match policy {
            DepthPolicy::FrontOnly => {
                log::warn!("No vertices in front of the camera, using fallback depth {}", fallback);
                fallback
            }
            DepthPolicy::Legacy => 0.0,
        };
    }

    (log_sum / count as f64).exp() as f32
}

/// Camera placement derived from a depth estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneFraming {
    pub depth: f32,
    /// Three times the depth; sizes markers and camera bounds
    pub scene_size: f32,
    pub target: Point3<f32>,
    pub radius: f32,
    pub lower_radius_limit: f32,
    pub upper_radius_limit: f32,
    pub wheel_precision: f32,
    pub alpha: f32,
    pub beta: f32,
}

impl SceneFraming {
    /// Derive the framing for a positive depth estimate
    pub fn from_depth(depth: f32) -> Self {
        let scene_size = 3.0 * depth;
        Self {
            depth,
            scene_size,
            target: Point3::new(0.0, 0.0, -depth),
            radius: scene_size / 2.0,
            lower_radius_limit: 0.3 * scene_size,
            upper_radius_limit: 2.0 * scene_size,
            wheel_precision: 500.0 / scene_size,
            alpha: 0.5 * PI,
            beta: 0.4 * PI,
        }
    }

    /// Estimate the depth of `scene` and frame it.
    ///
    /// A non-positive or non-finite estimate is replaced by the fallback so
    /// the radius limits always stay ordered.
    pub fn compute(scene: &Scene, config: &FramingConfig) -> Self {
        let mut depth = estimate_depth(scene, config.policy, config.fallback_depth);
        if !(depth.is_finite() && depth > 0.0) {
            log::warn!("Degenerate depth estimate {}, using fallback {}", depth, config.fallback_depth);
            depth = config.fallback_depth;
        }
        let framing = Self::from_depth(depth);
        log::debug!(
            "Framed scene: depth {:.3}, size {:.3}, radius {:.3}",
            framing.depth,
            framing.scene_size,
            framing.radius
        );
        framing
    }

    /// Point `camera` at the scene and install the derived limits
    pub fn apply(&self, camera: &mut OrbitCamera, config: &FramingConfig) {
        camera.set_target(self.target);
        camera.radius = self.radius;
        camera.lower_radius_limit = Some(self.lower_radius_limit);
        camera.upper_radius_limit = Some(self.upper_radius_limit);
        camera.wheel_precision = self.wheel_precision;
        camera.angular_sensibility = config.angular_sensibility;
        camera.panning_sensibility = config.panning_sensibility;
        camera.inertia = config.inertia;
        camera.alpha = self.alpha;
        camera.beta = self.beta;
    }
}
