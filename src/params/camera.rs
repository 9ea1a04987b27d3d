//! Orbit control configuration.

/// Orbit camera control parameters
#[derive(Debug, Clone)]
pub struct OrbitParams {
    /// Radians of rotation per pixel of drag
    pub rotate_speed: f32,

    /// Smallest polar angle from +Y (radians), keeps the view off the pole
    pub min_polar: f32,

    /// Largest polar angle from +Y (radians)
    pub max_polar: f32,

    /// Zoom from scroll input (disabled by default)
    pub enable_zoom: bool,

    /// Distance change per scroll line when zoom is enabled
    pub zoom_speed: f32,
}

impl Default for OrbitParams {
    fn default() -> Self {
        Self {
            rotate_speed: 2.0 * std::f32::consts::PI / 720.0,
            min_polar: 0.01,
            max_polar: std::f32::consts::PI - 0.01,
            enable_zoom: false,
            zoom_speed: 0.5,
        }
    }
}
