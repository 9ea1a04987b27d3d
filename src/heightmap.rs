//! Headless heightmap export.
//!
//! Evaluates one frame of the displaced field and writes the point heights
//! as an `n × n` grayscale PNG (row = line index, column = index).

use std::path::Path;
use std::time::Instant;

use image::{GrayImage, Luma};
use log::info;

use crate::error::{FieldError, Result};
use crate::field::{displace, PointBuffer};
use crate::params::Uniforms;

/// Render displaced heights normalised to `0..=255`.
///
/// A flat field maps to black.
pub fn heightmap_image(buffer: &PointBuffer, uniforms: &Uniforms) -> GrayImage {
    let n = buffer.grid_size() as u32;
    let heights: Vec<f32> = buffer
        .iter()
        .map(|point| displace(point, uniforms).position.y)
        .collect();

    let (min, max) = heights
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &y| {
            (lo.min(y), hi.max(y))
        });
    let span = max - min;

    let mut img = GrayImage::new(n, n);
    for (point, y) in buffer.iter().zip(&heights) {
        let level = if span > f32::EPSILON {
            (y - min) / span
        } else {
            0.0
        };
        let gray = (level * 255.0).round().clamp(0.0, 255.0) as u8;
        img.put_pixel(point.index, point.line_index, Luma([gray]));
    }
    img
}

/// Write one frame's heightmap to `path`
pub fn export_heightmap(path: &Path, buffer: &PointBuffer, uniforms: &Uniforms) -> Result<()> {
    if buffer.is_empty() {
        return Err(FieldError::InvalidConfiguration {
            key: "gridSize",
            value: uniforms.grid_size,
        });
    }

    let start = Instant::now();
    let img = heightmap_image(buffer, uniforms);
    img.save(path)?;

    info!(
        "Heightmap {}x{} at t={} written to {} in {:.2}ms",
        img.width(),
        img.height(),
        uniforms.time,
        path.display(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::GridBuilder;

    #[test]
    fn test_image_matches_grid() {
        let buffer = GridBuilder::build(16);
        let img = heightmap_image(&buffer, &Uniforms::default());
        assert_eq!(img.dimensions(), (16, 16));

        // Normalised: the extremes are both present
        let pixels: Vec<u8> = img.pixels().map(|p| p.0[0]).collect();
        assert_eq!(pixels.iter().copied().min(), Some(0));
        assert_eq!(pixels.iter().copied().max(), Some(255));
    }

    #[test]
    fn test_flat_field_is_black() {
        let uniforms = Uniforms {
            x_osc_amp: 0.0,
            z_osc_amp: 0.0,
            noise_scale_y: 0.0,
            ..Uniforms::default()
        };
        let img = heightmap_image(&GridBuilder::build(8), &uniforms);
        assert!(img.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_export_writes_png() {
        let path = std::env::temp_dir().join("wavefield_heightmap_test.png");
        let buffer = GridBuilder::build(12);
        export_heightmap(&path, &buffer, &Uniforms::default()).unwrap();

        let loaded = image::open(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (12, 12));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_export_rejects_empty_grid() {
        let path = std::env::temp_dir().join("wavefield_heightmap_empty.png");
        let result = export_heightmap(&path, &GridBuilder::build(0), &Uniforms::default());
        assert!(matches!(
            result,
            Err(FieldError::InvalidConfiguration { key: "gridSize", .. })
        ));
    }
}
