//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use log::info;

use crate::error::Result;
use crate::params::{ParamKey, RenderConfig, UniformState};
use crate::sprite::SpriteSource;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "wavefield")]
#[command(about = "Animated point-cloud wave field", long_about = None)]
pub struct Args {
    /// Points per side of the grid
    #[arg(long, value_name = "N")]
    pub grid_size: Option<f32>,

    /// Distance between neighbouring points (world units)
    #[arg(long, value_name = "UNITS")]
    pub gap_size: Option<f32>,

    /// Point sprite scale
    #[arg(long, value_name = "SCALE")]
    pub point_size: Option<f32>,

    /// Time advance per frame
    #[arg(long, value_name = "STEP")]
    pub time_inc: Option<f32>,

    /// Rate at which time scans through noise depth
    #[arg(long, value_name = "RATE")]
    pub noise_speed: Option<f32>,

    /// Point sprite image (default: built-in soft dot)
    #[arg(long, value_name = "PATH")]
    pub sprite: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Write one frame's heightmap to PATH and exit (no window)
    #[arg(long, value_name = "PATH")]
    pub heightmap: Option<PathBuf>,

    /// Animation time of the exported heightmap
    #[arg(long, value_name = "T", default_value_t = 0.0)]
    pub heightmap_time: f32,
}

impl Args {
    /// Initial uniform state with command-line overrides applied
    pub fn uniform_state(&self) -> Result<UniformState> {
        let mut state = UniformState::default();
        let overrides = [
            (ParamKey::GridSize, self.grid_size),
            (ParamKey::GapSize, self.gap_size),
            (ParamKey::PointSize, self.point_size),
            (ParamKey::TimeInc, self.time_inc),
            (ParamKey::NoiseSpeed, self.noise_speed),
        ];

        for (key, value) in overrides {
            if let Some(value) = value {
                state.set(key, value)?;
                info!("Override: {} = {}", key, state.get(key));
            }
        }
        Ok(state)
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width,
            window_height: self.height,
            ..RenderConfig::default()
        }
    }

    pub fn sprite_source(&self) -> SpriteSource {
        match &self.sprite {
            Some(path) => SpriteSource::File(path.clone()),
            None => SpriteSource::Builtin,
        }
    }
}
