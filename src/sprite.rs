//! Point sprite image loading.

use std::fmt;
use std::path::PathBuf;

use log::info;

use crate::error::{FieldError, Result};
use crate::field::smoothstep;

/// Edge length of the built-in sprite (pixels)
pub const BUILTIN_SPRITE_SIZE: u32 = 64;

/// RGBA8 sprite whose alpha channel masks each point into a soft disc
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl SpriteImage {
    /// Wrap raw RGBA8 pixels, rejecting empty or truncated data
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FieldError::ResourceLoad {
                source_name: "rgba".to_string(),
                reason: format!("empty image {}x{}", width, height),
            });
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(FieldError::ResourceLoad {
                source_name: "rgba".to_string(),
                reason: format!("expected {} bytes, got {}", expected, rgba.len()),
            });
        }
        Ok(Self { width, height, rgba })
    }

    /// White disc with a smooth radial alpha falloff
    pub fn soft_dot(size: u32) -> Self {
        let size = size.max(1);
        let center = size as f32 / 2.0;
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);

        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 + 0.5 - center;
                let dy = y as f32 + 0.5 - center;
                let d = (dx * dx + dy * dy).sqrt() / center;
                let alpha = smoothstep(1.0, 0.0, d);
                rgba.extend_from_slice(&[255, 255, 255, (alpha * 255.0).round() as u8]);
            }
        }

        Self {
            width: size,
            height: size,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Nearest-texel alpha at normalised coordinates (clamped to the edge)
    pub fn alpha_at(&self, u: f32, v: f32) -> f32 {
        let x = ((u.clamp(0.0, 1.0) * self.width as f32) as u32).min(self.width - 1);
        let y = ((v.clamp(0.0, 1.0) * self.height as f32) as u32).min(self.height - 1);
        let idx = ((y * self.width + x) * 4 + 3) as usize;
        self.rgba[idx] as f32 / 255.0
    }
}

/// Where the point sprite comes from
#[derive(Debug, Clone, PartialEq)]
pub enum SpriteSource {
    /// Procedural soft dot
    Builtin,
    /// Image file decoded with the `image` crate
    File(PathBuf),
}

impl fmt::Display for SpriteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpriteSource::Builtin => f.write_str("built-in soft dot"),
            SpriteSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Load the point sprite.
///
/// This is the only suspension point before the frame loop starts; callers
/// await it (or block on it) before entering the running state.
pub async fn load_sprite(source: &SpriteSource) -> Result<SpriteImage> {
    let sprite = match source {
        SpriteSource::Builtin => SpriteImage::soft_dot(BUILTIN_SPRITE_SIZE),
        SpriteSource::File(path) => {
            let image = image::open(path).map_err(|e| FieldError::ResourceLoad {
                source_name: source.to_string(),
                reason: e.to_string(),
            })?;
            let rgba = image.to_rgba8();
            let (width, height) = rgba.dimensions();
            SpriteImage::from_rgba(width, height, rgba.into_raw()).map_err(|e| match e {
                FieldError::ResourceLoad { reason, .. } => FieldError::ResourceLoad {
                    source_name: source.to_string(),
                    reason,
                },
                other => other,
            })?
        }
    };

    info!(
        "Loaded point sprite from {} ({}x{})",
        source, sprite.width, sprite.height
    );
    Ok(sprite)
}
