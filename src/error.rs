//! Error taxonomy for the point field.

use thiserror::Error;

/// Point field result type
pub type Result<T> = std::result::Result<T, FieldError>;

/// Errors surfaced by loading, tuning, rendering and export
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("failed to load point sprite from {source_name}: {reason}")]
    ResourceLoad { source_name: String, reason: String },

    #[error("invalid value {value} for parameter {key}")]
    InvalidConfiguration { key: &'static str, value: f32 },

    #[error("parameter {0} is driven by the animation clock")]
    ReadOnlyParameter(&'static str),

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("gpu setup failed: {0}")]
    Gpu(String),

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
