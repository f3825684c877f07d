//! Tunable constants for the autoscroll engine.
//!
//! All values have defaults matching the desktop viewer. A partially filled
//! JSON document deserializes into a full config because every field falls
//! back to its default.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("speed bounds are inverted: min {min} > max {max}")]
    InvertedSpeedBounds { min: f64, max: f64 },
    #[error("default speed {value} is outside [{min}, {max}]")]
    DefaultSpeedOutOfRange { value: f64, min: f64, max: f64 },
    #[error("smoothing alpha must be in (0, 1] (got {0})")]
    InvalidSmoothing(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoscrollConfig {
    /// Inactivity after a manual interaction before autoscroll resumes.
    pub resume_delay_ms: u64,
    /// How long "Auto-resumed" stays visible before the status settles.
    pub status_settle_ms: u64,
    /// Distance from the bottom that already counts as the end.
    pub end_tolerance_px: f64,
    pub smoothing_alpha: f64,
    /// Seed for the smoothed frame delta, roughly one 60 Hz frame.
    pub initial_delta_secs: f64,
    pub speed_min: f64,
    pub speed_max: f64,
    pub speed_step: f64,
    pub speed_default: f64,
    pub base_rate_regular_px_per_sec: f64,
    pub base_rate_compact_px_per_sec: f64,
    /// Windows at most this wide are treated as compact devices.
    pub compact_width_threshold_px: f64,
    pub render_scale_regular: f32,
    pub render_scale_compact: f32,
    pub page_margin_px: f64,
}

impl Default for AutoscrollConfig {
    fn default() -> Self {
        Self {
            resume_delay_ms: 3000,
            status_settle_ms: 700,
            end_tolerance_px: 1.0,
            smoothing_alpha: 0.08,
            initial_delta_secs: 0.016,
            speed_min: 0.1,
            speed_max: 5.0,
            speed_step: 0.1,
            speed_default: 1.0,
            base_rate_regular_px_per_sec: 20.0,
            base_rate_compact_px_per_sec: 40.0,
            compact_width_threshold_px: 800.0,
            render_scale_regular: 1.5,
            render_scale_compact: 1.2,
            page_margin_px: 20.0,
        }
    }
}

impl AutoscrollConfig {
    pub fn resume_delay(&self) -> Duration {
        Duration::from_millis(self.resume_delay_ms)
    }

    pub fn status_settle_delay(&self) -> Duration {
        Duration::from_millis(self.status_settle_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("resume_delay_ms", self.resume_delay_ms as f64),
            ("initial_delta_secs", self.initial_delta_secs),
            ("speed_min", self.speed_min),
            ("speed_step", self.speed_step),
            ("base_rate_regular_px_per_sec", self.base_rate_regular_px_per_sec),
            ("base_rate_compact_px_per_sec", self.base_rate_compact_px_per_sec),
            ("render_scale_regular", f64::from(self.render_scale_regular)),
            ("render_scale_compact", f64::from(self.render_scale_compact)),
        ];

        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        if self.end_tolerance_px < 0.0 {
            return Err(ConfigError::NotPositive {
                field: "end_tolerance_px",
                value: self.end_tolerance_px,
            });
        }

        if self.page_margin_px < 0.0 {
            return Err(ConfigError::NotPositive {
                field: "page_margin_px",
                value: self.page_margin_px,
            });
        }

        if !(self.smoothing_alpha > 0.0 && self.smoothing_alpha <= 1.0) {
            return Err(ConfigError::InvalidSmoothing(self.smoothing_alpha));
        }

        if self.speed_min > self.speed_max {
            return Err(ConfigError::InvertedSpeedBounds {
                min: self.speed_min,
                max: self.speed_max,
            });
        }

        if self.speed_default < self.speed_min || self.speed_default > self.speed_max {
            return Err(ConfigError::DefaultSpeedOutOfRange {
                value: self.speed_default,
                min: self.speed_min,
                max: self.speed_max,
            });
        }

        Ok(())
    }
}
