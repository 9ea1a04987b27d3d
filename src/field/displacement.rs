//! Per-point displacement and sprite compositing.
//!
//! This is the vertex/fragment pair of the point field expressed as plain
//! functions: [`displace`] turns a grid point plus the frame's uniforms into a
//! world position and alpha, [`compose_fragment`] combines that alpha with the
//! sprite's mask.

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use super::grid::{GridPoint, PointBuffer};
use crate::noise::get_noise_value;
use crate::params::Uniforms;

/// Smallest magnitude allowed for an oscillation period
pub const MIN_PERIOD: f32 = 1e-3;

/// Smallest grid size and gap size used for layout
pub const MIN_EXTENT: f32 = 1e-3;

/// Fixed RGB tint of every sprite
pub const SPRITE_TINT: [f32; 3] = [0.0, 0.2, 0.7];

/// Per-point draw data streamed to the GPU each frame
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointInstance {
    pub position: [f32; 3],
    /// Sprite edge length in pixels
    pub size: f32,
    pub alpha: f32,
    pub strength: f32,
    pub _padding: [f32; 2],
}

/// Output of the displacement stage for one point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplacedPoint {
    pub position: Vec3,
    pub point_size: f32,
    pub alpha: f32,
    pub strength: f32,
}

impl DisplacedPoint {
    pub fn to_instance(self) -> PointInstance {
        PointInstance {
            position: self.position.to_array(),
            size: self.point_size,
            alpha: self.alpha,
            strength: self.strength,
            _padding: [0.0; 2],
        }
    }
}

/// GLSL `smoothstep`, also valid for `edge0 > edge1` (reversed falloff)
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let span = edge1 - edge0;
    if span == 0.0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / span).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn guard_period(period: f32) -> f32 {
    if period.abs() < MIN_PERIOD {
        MIN_PERIOD.copysign(period)
    } else {
        period
    }
}

/// Clamp degenerate configuration so layout and oscillation stay finite.
///
/// Zero periods keep their sign at the minimum magnitude; grid and gap sizes
/// are raised to [`MIN_EXTENT`].
pub fn sanitize(uniforms: &Uniforms) -> Uniforms {
    Uniforms {
        grid_size: uniforms.grid_size.max(MIN_EXTENT),
        gap_size: uniforms.gap_size.max(MIN_EXTENT),
        x_osc_period: guard_period(uniforms.x_osc_period),
        z_osc_period: guard_period(uniforms.z_osc_period),
        ..*uniforms
    }
}

/// Displace one grid point for the current frame
pub fn displace(point: &GridPoint, uniforms: &Uniforms) -> DisplacedPoint {
    displace_sanitized(point, &sanitize(uniforms))
}

fn displace_sanitized(point: &GridPoint, u: &Uniforms) -> DisplacedPoint {
    let index = point.index as f32;
    let line_index = point.line_index as f32;

    let total_size = u.gap_size * u.grid_size;
    let half_size = total_size * 0.5;

    // Per-column and per-row travelling waves
    let osc_x = u.x_osc_amp * (TAU * ((index + u.time) / u.x_osc_period)).sin();
    let osc_z = u.z_osc_amp * (TAU * ((line_index + u.time) / u.z_osc_period)).cos();

    let mut position = Vec3::new(
        point.position[0] - half_size + u.gap_size * index,
        point.position[1],
        point.position[2] - half_size + line_index * u.gap_size,
    );

    let noise_value = get_noise_value(
        Vec2::new(position.x, position.z),
        u.time * u.noise_speed,
        u.noise_scale,
        u.time,
        u.noise_offset,
    );

    // Noise term recentered on its own amplitude
    position.y +=
        osc_x + osc_z + noise_value * u.noise_scale_y - (u.noise_scale_y / 2.0);

    let alpha = smoothstep(half_size, 0.0, position.length());

    DisplacedPoint {
        position,
        point_size: point.size * u.point_size,
        alpha,
        strength: 1.0,
    }
}

/// Displace every point of `buffer` into `out`, reusing its allocation
pub fn displace_all(buffer: &PointBuffer, uniforms: &Uniforms, out: &mut Vec<PointInstance>) {
    let u = sanitize(uniforms);
    out.clear();
    out.extend(
        buffer
            .iter()
            .map(|point| displace_sanitized(point, &u).to_instance()),
    );
}

/// Final sprite color: fixed tint with alpha scaled by the sprite mask
pub fn compose_fragment(alpha: f32, mask_alpha: f32) -> [f32; 4] {
    [SPRITE_TINT[0], SPRITE_TINT[1], SPRITE_TINT[2], alpha * mask_alpha]
}
