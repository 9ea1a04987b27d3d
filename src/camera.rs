//! Orbit camera circling the point field.

use glam::{Mat4, Vec2, Vec3};

use crate::animation::CameraControls;
use crate::params::{OrbitParams, RenderConfig};

/// Perspective camera orbiting a target on a sphere
pub struct OrbitCamera {
    params: OrbitParams,
    target: Vec3,
    /// Distance from the target
    radius: f32,
    /// Angle around +Y, measured from +Z (radians)
    azimuth: f32,
    /// Angle down from +Y (radians)
    polar: f32,
    fov_degrees: f32,
    aspect: f32,
    near: f32,
    far: f32,
    /// Drag input (pixels) not yet applied
    pending_drag: Vec2,
    /// Scroll input (lines) not yet applied
    pending_zoom: f32,
}

impl OrbitCamera {
    /// Camera at `eye` looking at the origin
    pub fn new(eye: Vec3, config: &RenderConfig, params: OrbitParams) -> Self {
        let radius = eye.length().max(f32::EPSILON);
        let polar = (eye.y / radius).clamp(-1.0, 1.0).acos();
        let azimuth = eye.x.atan2(eye.z);

        Self {
            params,
            target: Vec3::ZERO,
            radius,
            azimuth,
            polar,
            fov_degrees: config.fov_degrees,
            aspect: config.aspect_ratio(),
            near: config.near_plane,
            far: config.far_plane,
            pending_drag: Vec2::ZERO,
            pending_zoom: 0.0,
        }
    }

    /// Default framing: slightly left of the field, `camera_distance` back
    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(
            Vec3::new(-3.0, 0.0, config.camera_distance),
            config,
            OrbitParams::default(),
        )
    }

    /// Queue a mouse drag (pixels)
    pub fn rotate(&mut self, delta: Vec2) {
        self.pending_drag += delta;
    }

    /// Queue scroll input (lines); ignored unless zoom is enabled
    pub fn zoom(&mut self, lines: f32) {
        if self.params.enable_zoom {
            self.pending_zoom += lines;
        }
    }

    pub fn eye(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.target
            + self.radius
                * Vec3::new(
                    sin_polar * self.azimuth.sin(),
                    self.polar.cos(),
                    sin_polar * self.azimuth.cos(),
                )
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }
}

impl CameraControls for OrbitCamera {
    fn update(&mut self) {
        let drag = std::mem::take(&mut self.pending_drag);
        self.azimuth -= drag.x * self.params.rotate_speed;
        self.polar = (self.polar - drag.y * self.params.rotate_speed)
            .clamp(self.params.min_polar, self.params.max_polar);

        let zoom = std::mem::take(&mut self.pending_zoom);
        self.radius = (self.radius - zoom * self.params.zoom_speed).max(self.near);
    }

    fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_initial_eye_matches_config() {
        let camera = OrbitCamera::from_config(&RenderConfig::default());
        assert!(approx(camera.eye(), Vec3::new(-3.0, 0.0, 14.0)));
    }

    #[test]
    fn test_update_applies_drag_once() {
        let mut camera = OrbitCamera::from_config(&RenderConfig::default());
        let start = camera.eye();

        camera.rotate(Vec2::new(100.0, 0.0));
        camera.update();
        let moved = camera.eye();
        assert!(!approx(start, moved));
        assert!((moved.length() - start.length()).abs() < 1e-3);

        camera.update();
        assert!(approx(moved, camera.eye()));
    }

    #[test]
    fn test_polar_clamped() {
        let mut camera = OrbitCamera::from_config(&RenderConfig::default());
        camera.rotate(Vec2::new(0.0, 1.0e6));
        camera.update();
        assert!(camera.eye().is_finite());
        assert!(camera.view_proj().is_finite());
    }

    #[test]
    fn test_zoom_disabled_by_default() {
        let mut camera = OrbitCamera::from_config(&RenderConfig::default());
        let distance = camera.eye().length();
        camera.zoom(5.0);
        camera.update();
        assert!((camera.eye().length() - distance).abs() < 1e-4);
    }

    #[test]
    fn test_view_proj_generation() {
        let mut camera = OrbitCamera::from_config(&RenderConfig::default());
        camera.look_at(Vec3::ZERO);
        let view_proj = camera.view_proj();
        assert_ne!(view_proj, Mat4::IDENTITY);
        assert_ne!(view_proj, Mat4::ZERO);
        assert!(view_proj.is_finite());
    }
}
