//! Orbit camera for viewing reconstructed scenes

use nalgebra::{Matrix4, Perspective3, Point3, Vector3};
use std::f32::consts::{FRAC_PI_2, PI};

/// Keeps the polar angle away from the poles, where the view basis degenerates
const BETA_EPSILON: f32 = 1e-3;

/// An arc-rotate camera circling `target` at `radius`.
///
/// `alpha` is the azimuth around the vertical axis and `beta` the polar angle
/// measured from +Y. With `alpha = beta = π/2` the camera sits on +Z looking
/// down -Z, which is the reference view reconstruction outputs are expressed in.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub target: Point3<f32>,
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
    pub lower_radius_limit: Option<f32>,
    pub upper_radius_limit: Option<f32>,
    /// Wheel units needed to move the camera one world unit
    pub wheel_precision: f32,
    /// Pointer pixels per radian of rotation
    pub angular_sensibility: f32,
    /// Pointer pixels per world unit of panning
    pub panning_sensibility: f32,
    pub inertia: f32,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl OrbitCamera {
    /// Create a camera looking at `target` from the given angles and distance
    pub fn new(alpha: f32, beta: f32, radius: f32, target: Point3<f32>) -> Self {
        Self {
            target,
            alpha,
            beta,
            radius,
            lower_radius_limit: None,
            upper_radius_limit: None,
            wheel_precision: 3.0,
            angular_sensibility: 1000.0,
            panning_sensibility: 1000.0,
            inertia: 0.9,
            up: Vector3::y(),
            fov: 0.8,
            aspect_ratio: 16.0 / 9.0,
            near: 0.01,
            far: 1000.0,
        }
    }

    /// World-space eye position
    pub fn position(&self) -> Point3<f32> {
        let (sin_a, cos_a) = self.alpha.sin_cos();
        let (sin_b, cos_b) = self.beta.sin_cos();
        self.target + Vector3::new(cos_a * sin_b, cos_b, sin_a * sin_b) * self.radius
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position(), &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        perspective.into_inner()
    }

    pub fn set_target(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    /// Rotate around the target by a pointer drag of `(dx, dy)` pixels
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.alpha -= dx / self.angular_sensibility;
        self.beta = (self.beta - dy / self.angular_sensibility).clamp(BETA_EPSILON, PI - BETA_EPSILON);
    }

    /// Slide the target in the view plane by a pointer drag of `(dx, dy)` pixels
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.target - self.position()).normalize();
        let right = forward.cross(&self.up).normalize();
        let up = right.cross(&forward);
        self.target += (-right * dx + up * dy) / self.panning_sensibility;
    }

    /// Move toward (positive delta) or away from the target
    pub fn zoom(&mut self, wheel_delta: f32) {
        self.radius -= wheel_delta / self.wheel_precision;
        self.clamp_radius();
    }

    /// Pull the radius back inside the configured limits
    pub fn clamp_radius(&mut self) {
        if let Some(lower) = self.lower_radius_limit {
            self.radius = self.radius.max(lower);
        }
        if let Some(upper) = self.upper_radius_limit {
            self.radius = self.radius.min(upper);
        }
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(FRAC_PI_2, FRAC_PI_2, 10.0, Point3::origin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_camera_looks_down_negative_z() {
        let camera = OrbitCamera::default();
        let eye = camera.position();
        assert_relative_eq!(eye, Point3::new(0.0, 0.0, 10.0), epsilon = 1e-5);

        // A point in front of the camera ends up on the view-space -Z axis.
        let view = camera.view_matrix();
        let p = view.transform_point(&Point3::new(0.0, 0.0, -2.0));
        assert_relative_eq!(p.z, -12.0, epsilon = 1e-4);
    }

    #[test]
    fn test_zoom_respects_limits() {
        let mut camera = OrbitCamera::default();
        camera.lower_radius_limit = Some(3.0);
        camera.upper_radius_limit = Some(20.0);
        camera.wheel_precision = 1.0;

        camera.zoom(100.0);
        assert_relative_eq!(camera.radius, 3.0);
        camera.zoom(-100.0);
        assert_relative_eq!(camera.radius, 20.0);
    }

    #[test]
    fn test_orbit_keeps_beta_off_the_poles() {
        let mut camera = OrbitCamera::default();
        camera.orbit(0.0, 1.0e6);
        assert!(camera.beta > 0.0);
        camera.orbit(0.0, -1.0e6);
        assert!(camera.beta < PI);
    }

    #[test]
    fn test_pan_moves_target_in_view_plane() {
        let mut camera = OrbitCamera::default();
        camera.panning_sensibility = 10.0;
        camera.pan(0.0, 10.0);
        assert_relative_eq!(camera.target, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
    }
}
