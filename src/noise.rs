//! Noise generation for the point field surface.
//!
//! Skewed-lattice 3D simplex noise with a hash-derived gradient per lattice
//! cell. Every function here is pure: the same coordinate always produces the
//! same value, so CPU results can be compared against a GPU port.

use glam::{Vec2, Vec3, Vec4};

/// Skew factor for 3D simplex lattice
pub const F3: f32 = 0.333_333_3;

/// Unskew factor for 3D simplex lattice
pub const G3: f32 = 0.166_666_7;

/// Squared radius of influence of a single surflet
const SURFLET_RADIUS_SQ: f32 = 0.6;

/// Normalisation applied to the surflet sum (maps it to roughly [-1, 1])
const SURFLET_SCALE: f32 = 52.0;

/// Multiplier that calibrates `noiseScale` to the grid's world units
pub const NOISE_SCALE_CALIBRATION: f32 = 1000.0;

/// How far one unit of the iteration parameter moves through noise depth
pub const NOISE_DEPTH_STEP: f32 = 0.001;

/// GLSL `fract`: always in [0, 1), also for negative inputs
#[inline]
fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// GLSL `step(0.0, v)` per component
#[inline]
fn step_zero(v: Vec3) -> Vec3 {
    Vec3::new(
        if v.x < 0.0 { 0.0 } else { 1.0 },
        if v.y < 0.0 { 0.0 } else { 1.0 },
        if v.z < 0.0 { 0.0 } else { 1.0 },
    )
}

#[inline]
fn yzx(v: Vec3) -> Vec3 {
    Vec3::new(v.y, v.z, v.x)
}

#[inline]
fn zxy(v: Vec3) -> Vec3 {
    Vec3::new(v.z, v.x, v.y)
}

/// Discontinuous pseudo-random vector in [-0.5, 0.5]³ for a lattice cell
pub fn random3(c: Vec3) -> Vec3 {
    let mut j = 4096.0 * c.dot(Vec3::new(17.0, 59.4, 15.0)).sin();
    let z = fract(512.0 * j);
    j *= 0.125;
    let x = fract(512.0 * j);
    j *= 0.125;
    let y = fract(512.0 * j);
    Vec3::new(x, y, z) - Vec3::splat(0.5)
}

/// 3D simplex noise, roughly in [-1, 1]
pub fn simplex3d(p: Vec3) -> f32 {
    // Skewed cell origin and position relative to it
    let s = (p + Vec3::splat(p.dot(Vec3::splat(F3)))).floor();
    let x = p - s + Vec3::splat(s.dot(Vec3::splat(G3)));

    // Tetrahedron corners; ties resolve towards x, then y, then z
    let e = step_zero(x - yzx(x));
    let i1 = e * (Vec3::ONE - zxy(e));
    let i2 = Vec3::ONE - zxy(e) * (Vec3::ONE - e);

    let x1 = x - i1 + Vec3::splat(G3);
    let x2 = x - i2 + Vec3::splat(2.0 * G3);
    let x3 = x - Vec3::ONE + Vec3::splat(3.0 * G3);

    // Falloff clamps at zero before it is raised to the 4th power
    let mut w = Vec4::new(x.dot(x), x1.dot(x1), x2.dot(x2), x3.dot(x3));
    w = (Vec4::splat(SURFLET_RADIUS_SQ) - w).max(Vec4::ZERO);

    let mut d = Vec4::new(
        random3(s).dot(x),
        random3(s + i1).dot(x1),
        random3(s + i2).dot(x2),
        random3(s + Vec3::ONE).dot(x3),
    );

    w *= w;
    w *= w;
    d *= w;

    d.dot(Vec4::splat(SURFLET_SCALE))
}

/// Sample the raw noise field at a 3D coordinate
pub fn sample_3d(coordinate: Vec3) -> f32 {
    simplex3d(coordinate)
}

/// Noise value in [0, 1] for a point on the grid plane.
///
/// The planar position drifts by `time * noise_offset` along both axes while
/// `noise_iter` scans through noise depth, so advancing it changes the shape
/// of the surface rather than sliding it sideways.
///
/// # Arguments
/// * `p` - Grid-plane position (world x, world z)
/// * `noise_iter` - Depth coordinate driver (typically `time * noiseSpeed`)
/// * `scale` - Spatial frequency (`noiseScale`)
/// * `time` - Current animation time
/// * `noise_offset` - Planar drift per unit of time
pub fn get_noise_value(p: Vec2, noise_iter: f32, scale: f32, time: f32, noise_offset: f32) -> f32 {
    let drift = noise_offset * time;
    let p3 = Vec3::new(p.x + drift, p.y + drift, noise_iter * NOISE_DEPTH_STEP);

    let value = sample_3d(p3 * scale * NOISE_SCALE_CALIBRATION);
    if !value.is_finite() {
        return 0.5;
    }

    (0.5 + 0.5 * value).clamp(0.0, 1.0)
}
