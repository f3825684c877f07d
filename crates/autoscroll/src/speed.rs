//! Speed setting and the speed-to-rate mapping.

use crate::config::AutoscrollConfig;

/// Settings below this value are raised to it before computing a rate, so a
/// zero or negative setting still scrolls slowly instead of stalling.
pub const MIN_SPEED_FLOOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Compact,
    Regular,
}

impl DeviceClass {
    pub fn from_window_width(width_px: f64, config: &AutoscrollConfig) -> Self {
        if width_px <= config.compact_width_threshold_px {
            Self::Compact
        } else {
            Self::Regular
        }
    }

    pub fn base_rate(self, config: &AutoscrollConfig) -> f64 {
        match self {
            Self::Compact => config.base_rate_compact_px_per_sec,
            Self::Regular => config.base_rate_regular_px_per_sec,
        }
    }

    pub fn render_scale(self, config: &AutoscrollConfig) -> f32 {
        match self {
            Self::Compact => config.render_scale_compact,
            Self::Regular => config.render_scale_regular,
        }
    }
}

/// Pixels per second for a given setting and base rate. Always positive for
/// a positive base rate.
pub fn speed_to_rate(setting: f64, base_rate_px_per_sec: f64) -> f64 {
    // NaN from a broken input source degrades to the floor as well.
    let setting = if setting.is_nan() { MIN_SPEED_FLOOR } else { setting.max(MIN_SPEED_FLOOR) };
    base_rate_px_per_sec * setting
}

/// The slider value, kept inside its bounds and on its step grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedSetting {
    value: f64,
    min: f64,
    max: f64,
    step: f64,
}

impl SpeedSetting {
    pub fn new(value: f64, min: f64, max: f64, step: f64) -> Self {
        let mut setting = Self { value: min, min, max, step };
        setting.set(value);
        setting
    }

    pub fn from_config(config: &AutoscrollConfig) -> Self {
        Self::new(config.speed_default, config.speed_min, config.speed_max, config.speed_step)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn set(&mut self, value: f64) -> f64 {
        let value = if value.is_nan() { self.min } else { value };
        let snapped = (value / self.step).round() * self.step;
        // Rounding to the grid can step just outside a bound that is not itself on the grid.
        self.value = snapped.clamp(self.min, self.max);
        self.value
    }

    pub fn adjust(&mut self, delta: f64) -> f64 {
        self.set(self.value + delta)
    }

    /// Formats the value the way the slider label shows it.
    pub fn display(&self) -> String {
        format!("{:.1}", self.value)
    }
}

impl Default for SpeedSetting {
    fn default() -> Self {
        Self::from_config(&AutoscrollConfig::default())
    }
}
