//! Parameter definitions with documented semantics.
//!
//! Every tunable and default lives here:
//! - Shading uniforms and the live tuning state
//! - Window and projection settings
//! - Orbit control settings

mod camera;
mod field;
mod render;

// Re-export all types
pub use camera::OrbitParams;
pub use field::{ParamKey, UniformState, Uniforms, MAX_GRID_CELLS};
pub use render::{RenderConfig, Rgb, BACKGROUND_PRESETS};
