//! Live tuning panel bound to the uniform state.
//!
//! Each control binds one [`ParamKey`] to a slider range, grouped in folders.
//! Edits are clamped into range and written through the state's setters; a
//! control may carry a change action that the frame loop must react to.

use log::info;

use crate::error::Result;
use crate::params::{ParamKey, Rgb, UniformState, BACKGROUND_PRESETS};

/// Follow-up required after an edit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TuningEffect {
    /// Grid size changed; the point buffer must be rebuilt
    RebuildGrid(usize),
    /// Background color changed
    UpdateBackground(Rgb),
}

/// Action attached to a control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnChange {
    RebuildGrid,
}

/// A ranged numeric control
#[derive(Debug, Clone)]
pub struct Control {
    pub folder: &'static str,
    pub key: ParamKey,
    pub min: f32,
    pub max: f32,
    pub on_change: Option<OnChange>,
}

impl Control {
    fn new(folder: &'static str, key: ParamKey, min: f32, max: f32) -> Self {
        Self {
            folder,
            key,
            min,
            max,
            on_change: None,
        }
    }

    fn with_action(mut self, action: OnChange) -> Self {
        self.on_change = Some(action);
        self
    }

    /// One nudge: 1% of the range
    pub fn step(&self) -> f32 {
        (self.max - self.min) / 100.0
    }
}

/// Tuning panel with a selected control
pub struct TuningPanel {
    controls: Vec<Control>,
    selected: usize,
    background_preset: usize,
}

impl Default for TuningPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl TuningPanel {
    pub fn new() -> Self {
        let controls = vec![
            Control::new("time", ParamKey::TimeInc, 0.001, 2.0),
            Control::new("osc", ParamKey::XOscAmp, 0.001, 3.0),
            Control::new("osc", ParamKey::XOscPeriod, 4.0, 500.0),
            Control::new("osc", ParamKey::ZOscAmp, 0.001, 3.0),
            Control::new("osc", ParamKey::ZOscPeriod, 4.0, 500.0),
            Control::new("noise", ParamKey::NoiseScale, 0.00001, 0.002),
            Control::new("noise", ParamKey::NoiseScaleY, 0.01, 10.0),
            Control::new("noise", ParamKey::NoiseOffset, 0.0001, 0.003),
            Control::new("noise", ParamKey::NoiseSpeed, 0.0001, 300.0),
            Control::new("grid", ParamKey::PointSize, 0.01, 7.0),
            Control::new("grid", ParamKey::GridSize, 10.0, 1000.0)
                .with_action(OnChange::RebuildGrid),
            Control::new("grid", ParamKey::GapSize, 0.005, 0.5),
        ];

        Self {
            controls,
            selected: 0,
            background_preset: 0,
        }
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control(&self, key: ParamKey) -> Option<&Control> {
        self.controls.iter().find(|c| c.key == key)
    }

    pub fn selected(&self) -> &Control {
        &self.controls[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.controls.len();
    }

    pub fn select_prev(&mut self) {
        self.selected = (self.selected + self.controls.len() - 1) % self.controls.len();
    }

    /// Set a bound parameter, clamped to its control's range.
    ///
    /// Keys without a control are written unclamped.
    pub fn set(
        &self,
        state: &mut UniformState,
        key: ParamKey,
        value: f32,
    ) -> Result<Option<TuningEffect>> {
        let control = self.control(key);
        let value = match control {
            Some(c) => value.clamp(c.min, c.max),
            None => value,
        };

        let before = state.get(key);
        state.set(key, value)?;
        let after = state.get(key);

        let effect = match control.and_then(|c| c.on_change) {
            Some(OnChange::RebuildGrid) if before != after => {
                Some(TuningEffect::RebuildGrid(state.grid_cells()))
            }
            _ => None,
        };
        Ok(effect)
    }

    /// Move the selected control by `steps` nudges
    pub fn nudge(&self, state: &mut UniformState, steps: i32) -> Result<Option<TuningEffect>> {
        let control = self.selected();
        // Grid size moves by whole cells at least
        let step = match control.key {
            ParamKey::GridSize => control.step().max(1.0),
            _ => control.step(),
        };
        let value = state.get(control.key) + step * steps as f32;
        let effect = self.set(state, control.key, value)?;

        info!(
            "[{}] {} = {}",
            control.folder,
            control.key,
            state.get(control.key)
        );
        Ok(effect)
    }

    /// Color control: advance to the next background preset
    pub fn cycle_background(&mut self, state: &mut UniformState) -> TuningEffect {
        self.background_preset = (self.background_preset + 1) % BACKGROUND_PRESETS.len();
        let color = Rgb::from_hex(BACKGROUND_PRESETS[self.background_preset]);
        state.set_background(color);
        info!("[osc] bgColor = #{:06x}", color.to_hex());
        TuningEffect::UpdateBackground(color)
    }
}
