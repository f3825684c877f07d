//! Fractional carry between frames.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollAccumulator {
    carry_px: f64,
}

impl ScrollAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `rate * delta` to the carry and returns the whole pixels to move
    /// now. The fractional remainder stays for the next frame.
    pub fn advance(&mut self, rate_px_per_sec: f64, delta_secs: f64) -> u32 {
        let step = rate_px_per_sec * delta_secs;
        if step.is_finite() && step > 0.0 {
            self.carry_px += step;
        }

        let whole = self.carry_px.floor();
        if whole < 1.0 {
            return 0;
        }

        self.carry_px -= whole;
        whole.min(f64::from(u32::MAX)) as u32
    }

    pub fn carry_px(&self) -> f64 {
        self.carry_px
    }

    pub fn reset(&mut self) {
        self.carry_px = 0.0;
    }
}
