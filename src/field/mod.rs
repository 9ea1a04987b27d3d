//! Point field: grid layout, per-point displacement and scene ownership.

pub mod displacement;
pub mod grid;
pub mod scene;

pub use displacement::{
    compose_fragment, displace, displace_all, sanitize, smoothstep, DisplacedPoint,
    PointInstance, SPRITE_TINT,
};
pub use grid::{GridBuilder, GridPoint, PointBuffer, POINT_SIZE_SEED};
pub use scene::{PointMesh, Scene};
