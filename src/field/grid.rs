//! Static per-point attribute buffers for the N×N grid.

use bytemuck::{Pod, Zeroable};
use log::debug;

/// Base sprite scale of every point, multiplied by `pointSize` at draw time
pub const POINT_SIZE_SEED: f32 = 2.0;

/// One grid cell's static attributes.
///
/// The world position is computed per frame by the displacement stage, so
/// `position` stays at the origin.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GridPoint {
    pub position: [f32; 3],
    pub size: f32,
    /// Reserved, always 0
    pub offset: f32,
    /// Column, 0..n
    pub index: u32,
    /// Row, 0..n
    pub line_index: u32,
    pub _padding: u32,
}

impl GridPoint {
    pub fn new(index: u32, line_index: u32) -> Self {
        Self {
            position: [0.0; 3],
            size: POINT_SIZE_SEED,
            offset: 0.0,
            index,
            line_index,
            _padding: 0,
        }
    }
}

/// Row-major point collection produced by [`GridBuilder::build`]
#[derive(Debug, Clone, PartialEq)]
pub struct PointBuffer {
    points: Vec<GridPoint>,
    grid_size: usize,
}

impl PointBuffer {
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    /// Points per side
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GridPoint> {
        self.points.iter()
    }
}

/// Builds the grid's point buffer
pub struct GridBuilder;

impl GridBuilder {
    /// Create `n * n` points, rows (`line_index`) outer and columns (`index`) inner
    pub fn build(n: usize) -> PointBuffer {
        let mut points = Vec::with_capacity(n.checked_mul(n).unwrap_or(0));

        for line_index in 0..n as u32 {
            for index in 0..n as u32 {
                points.push(GridPoint::new(index, line_index));
            }
        }

        debug!("Built {}x{} grid ({} points)", n, n, points.len());

        PointBuffer {
            points,
            grid_size: n,
        }
    }
}
