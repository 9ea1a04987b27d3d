//! Shading parameters: the live tunable state and its per-frame snapshot.

use std::fmt;
use std::str::FromStr;

use log::warn;

use super::render::Rgb;
use crate::error::{FieldError, Result};

/// Largest grid edge the state will hold (matches the tuning panel's range)
pub const MAX_GRID_CELLS: usize = 1000;

/// Named parameter addressable by the tuning surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    Time,
    TimeInc,
    PointSize,
    GridSize,
    GapSize,
    XOscAmp,
    XOscPeriod,
    ZOscAmp,
    ZOscPeriod,
    NoiseScale,
    NoiseScaleY,
    NoiseOffset,
    NoiseSpeed,
}

impl ParamKey {
    pub const ALL: [ParamKey; 13] = [
        ParamKey::Time,
        ParamKey::TimeInc,
        ParamKey::PointSize,
        ParamKey::GridSize,
        ParamKey::GapSize,
        ParamKey::XOscAmp,
        ParamKey::XOscPeriod,
        ParamKey::ZOscAmp,
        ParamKey::ZOscPeriod,
        ParamKey::NoiseScale,
        ParamKey::NoiseScaleY,
        ParamKey::NoiseOffset,
        ParamKey::NoiseSpeed,
    ];

    /// Name used by the shading stage and the tuning panel
    pub fn name(self) -> &'static str {
        match self {
            ParamKey::Time => "time",
            ParamKey::TimeInc => "timeInc",
            ParamKey::PointSize => "pointSize",
            ParamKey::GridSize => "gridSize",
            ParamKey::GapSize => "gapSize",
            ParamKey::XOscAmp => "xOscAmp",
            ParamKey::XOscPeriod => "xOscPeriod",
            ParamKey::ZOscAmp => "zOscAmp",
            ParamKey::ZOscPeriod => "zOscPeriod",
            ParamKey::NoiseScale => "noiseScale",
            ParamKey::NoiseScaleY => "noiseScaleY",
            ParamKey::NoiseOffset => "noiseOffset",
            ParamKey::NoiseSpeed => "noiseSpeed",
        }
    }

    /// Whether the key is part of the per-frame uniform snapshot
    pub fn is_uniform(self) -> bool {
        self != ParamKey::TimeInc
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamKey {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self> {
        ParamKey::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| FieldError::UnknownParameter(s.to_string()))
    }
}

/// Uniform values shared by every point in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniforms {
    /// Animation time (frames scaled by `timeInc`)
    pub time: f32,

    /// Multiplier on each point's size seed (pixels)
    pub point_size: f32,

    /// Points per side of the grid
    pub grid_size: f32,

    /// Distance between neighbouring points (world units)
    pub gap_size: f32,

    /// Height of the per-column travelling wave
    pub x_osc_amp: f32,

    /// Column count per wave cycle
    pub x_osc_period: f32,

    /// Height of the per-row travelling wave
    pub z_osc_amp: f32,

    /// Row count per wave cycle
    pub z_osc_period: f32,

    /// Spatial frequency of the noise field
    pub noise_scale: f32,

    /// Peak-to-peak height of the noise term
    pub noise_scale_y: f32,

    /// Planar drift of the noise per unit of time
    pub noise_offset: f32,

    /// Rate at which time scans through noise depth
    pub noise_speed: f32,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            point_size: 0.7,
            grid_size: 250.0,
            gap_size: 0.07,
            x_osc_amp: 0.5,
            x_osc_period: 75.0,
            z_osc_amp: 0.5,
            z_osc_period: 75.0,
            noise_scale: 0.0001,
            noise_scale_y: 2.0,
            noise_offset: 0.0003,
            noise_speed: 10.0,
        }
    }
}

impl Uniforms {
    /// Read a uniform by key (`None` for settings that are not uniforms)
    pub fn get(&self, key: ParamKey) -> Option<f32> {
        let value = match key {
            ParamKey::Time => self.time,
            ParamKey::PointSize => self.point_size,
            ParamKey::GridSize => self.grid_size,
            ParamKey::GapSize => self.gap_size,
            ParamKey::XOscAmp => self.x_osc_amp,
            ParamKey::XOscPeriod => self.x_osc_period,
            ParamKey::ZOscAmp => self.z_osc_amp,
            ParamKey::ZOscPeriod => self.z_osc_period,
            ParamKey::NoiseScale => self.noise_scale,
            ParamKey::NoiseScaleY => self.noise_scale_y,
            ParamKey::NoiseOffset => self.noise_offset,
            ParamKey::NoiseSpeed => self.noise_speed,
            ParamKey::TimeInc => return None,
        };
        Some(value)
    }

    fn slot_mut(&mut self, key: ParamKey) -> Option<&mut f32> {
        let slot = match key {
            ParamKey::Time => &mut self.time,
            ParamKey::PointSize => &mut self.point_size,
            ParamKey::GridSize => &mut self.grid_size,
            ParamKey::GapSize => &mut self.gap_size,
            ParamKey::XOscAmp => &mut self.x_osc_amp,
            ParamKey::XOscPeriod => &mut self.x_osc_period,
            ParamKey::ZOscAmp => &mut self.z_osc_amp,
            ParamKey::ZOscPeriod => &mut self.z_osc_period,
            ParamKey::NoiseScale => &mut self.noise_scale,
            ParamKey::NoiseScaleY => &mut self.noise_scale_y,
            ParamKey::NoiseOffset => &mut self.noise_offset,
            ParamKey::NoiseSpeed => &mut self.noise_speed,
            ParamKey::TimeInc => return None,
        };
        Some(slot)
    }
}

/// Live shading configuration.
///
/// Created once with defaults and mutated in place by tuning input between
/// frames. The frame loop reads it through [`UniformState::snapshot`] so one
/// frame never mixes old and new values.
#[derive(Debug, Clone)]
pub struct UniformState {
    uniforms: Uniforms,

    /// Time advance per frame
    time_inc: f32,

    /// Scene clear color
    background: Rgb,
}

impl Default for UniformState {
    fn default() -> Self {
        Self {
            uniforms: Uniforms::default(),
            time_inc: 0.30,
            background: Rgb::from_hex(0x55fff5),
        }
    }
}

impl UniformState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a parameter
    pub fn get(&self, key: ParamKey) -> f32 {
        match key {
            ParamKey::TimeInc => self.time_inc,
            _ => self.uniforms.get(key).unwrap_or_default(),
        }
    }

    /// Set a parameter.
    ///
    /// Non-finite values are rejected and leave the state untouched.
    /// `gridSize` is stored rounded to a whole cell count in
    /// `1..=MAX_GRID_CELLS`. `time` belongs to the animation clock and is
    /// only written through [`UniformState::set_time`].
    pub fn set(&mut self, key: ParamKey, value: f32) -> Result<()> {
        if key == ParamKey::Time {
            warn!("Rejected edit of clock-driven {}", key);
            return Err(FieldError::ReadOnlyParameter(key.name()));
        }
        if !value.is_finite() {
            warn!("Rejected non-finite value {} for {}", value, key);
            return Err(FieldError::InvalidConfiguration {
                key: key.name(),
                value,
            });
        }

        let value = match key {
            ParamKey::GridSize => value.round().clamp(1.0, MAX_GRID_CELLS as f32),
            _ => value,
        };

        match self.uniforms.slot_mut(key) {
            Some(slot) => *slot = value,
            None => self.time_inc = value,
        }
        Ok(())
    }

    /// Set a parameter by its shading name (e.g. `"xOscAmp"`)
    pub fn set_by_name(&mut self, name: &str, value: f32) -> Result<()> {
        let key: ParamKey = name.parse()?;
        self.set(key, value)
    }

    /// Record the clock's current time
    pub fn set_time(&mut self, time: f32) {
        self.uniforms.time = time;
    }

    pub fn time_inc(&self) -> f32 {
        self.time_inc
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn set_background(&mut self, color: Rgb) {
        self.background = color;
    }

    /// Record a grid size chosen outside the setter surface
    pub fn set_grid_cells(&mut self, cells: usize) {
        self.uniforms.grid_size = cells.clamp(1, MAX_GRID_CELLS) as f32;
    }

    /// Number of points per side the grid should have
    pub fn grid_cells(&self) -> usize {
        (self.uniforms.grid_size.max(1.0) as usize).min(MAX_GRID_CELLS)
    }

    /// Immutable copy of every uniform for one frame
    pub fn snapshot(&self) -> Uniforms {
        self.uniforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tuned_settings() {
        let state = UniformState::default();
        assert_eq!(state.get(ParamKey::TimeInc), 0.30);
        assert_eq!(state.get(ParamKey::GridSize), 250.0);
        assert_eq!(state.get(ParamKey::GapSize), 0.07);
        assert_eq!(state.get(ParamKey::NoiseSpeed), 10.0);
        assert_eq!(state.grid_cells(), 250);
        assert_eq!(state.background(), Rgb::from_hex(0x55fff5));
    }

    #[test]
    fn test_key_names_round_trip() {
        for key in ParamKey::ALL {
            assert_eq!(key.name().parse::<ParamKey>().unwrap(), key);
        }
        assert!(matches!(
            "bogus".parse::<ParamKey>(),
            Err(FieldError::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_set_rejects_non_finite() {
        let mut state = UniformState::default();
        let before = state.get(ParamKey::XOscPeriod);

        assert!(state.set(ParamKey::XOscPeriod, f32::NAN).is_err());
        assert!(state.set(ParamKey::XOscPeriod, f32::INFINITY).is_err());
        assert_eq!(state.get(ParamKey::XOscPeriod), before);
    }

    #[test]
    fn test_set_accepts_degenerate_finite_values() {
        let mut state = UniformState::default();
        state.set(ParamKey::ZOscPeriod, 0.0).unwrap();
        assert_eq!(state.get(ParamKey::ZOscPeriod), 0.0);
    }

    #[test]
    fn test_grid_size_clamped_to_safe_range() {
        let mut state = UniformState::default();
        for (value, cells) in [(0.0, 1), (-3.0, 1), (5.0e9, MAX_GRID_CELLS)] {
            state.set(ParamKey::GridSize, value).unwrap();
            assert_eq!(state.grid_cells(), cells);
            assert_eq!(state.get(ParamKey::GridSize), cells as f32);
        }

        state.set_grid_cells(0);
        assert_eq!(state.grid_cells(), 1);
        state.set_grid_cells(usize::MAX);
        assert_eq!(state.grid_cells(), MAX_GRID_CELLS);
    }

    #[test]
    fn test_time_is_clock_owned() {
        let mut state = UniformState::default();
        assert!(matches!(
            state.set(ParamKey::Time, 5.0),
            Err(FieldError::ReadOnlyParameter("time"))
        ));
        assert!(state.set_by_name("time", 5.0).is_err());
        assert_eq!(state.get(ParamKey::Time), 0.0);

        state.set_time(5.0);
        assert_eq!(state.snapshot().time, 5.0);
    }

    #[test]
    fn test_grid_size_rounded() {
        let mut state = UniformState::default();
        state.set(ParamKey::GridSize, 10.6).unwrap();
        assert_eq!(state.get(ParamKey::GridSize), 11.0);
        assert_eq!(state.grid_cells(), 11);
    }

    #[test]
    fn test_time_inc_not_in_snapshot() {
        let mut state = UniformState::default();
        state.set_by_name("timeInc", 1.5).unwrap();

        assert_eq!(state.time_inc(), 1.5);
        assert_eq!(state.snapshot().get(ParamKey::TimeInc), None);
        assert!(!ParamKey::TimeInc.is_uniform());
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_edits() {
        let mut state = UniformState::default();
        let frame = state.snapshot();
        state.set(ParamKey::NoiseScaleY, 9.0).unwrap();

        assert_eq!(frame.noise_scale_y, 2.0);
        assert_eq!(state.snapshot().noise_scale_y, 9.0);
    }
}
