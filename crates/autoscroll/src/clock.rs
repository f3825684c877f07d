//! Per-frame timing with jitter smoothing.
//!
//! Timestamps are monotonic offsets from an arbitrary origin, the same shape
//! a display-refresh callback hands out. Raw frame deltas are damped with an
//! exponential moving average so an irregular scheduler does not make the
//! scroll speed visibly pulse.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FrameClock {
    last_frame: Option<Duration>,
    smoothed_delta_secs: f64,
    alpha: f64,
    initial_delta_secs: f64,
}

impl FrameClock {
    pub fn new(alpha: f64, initial_delta_secs: f64) -> Self {
        Self {
            last_frame: None,
            smoothed_delta_secs: initial_delta_secs,
            alpha,
            initial_delta_secs,
        }
    }

    /// Forgets the previous frame so the next tick starts a fresh timeline.
    pub fn reset(&mut self) {
        self.last_frame = None;
        self.smoothed_delta_secs = self.initial_delta_secs;
    }

    /// Returns the smoothed delta in seconds for the frame at `now`.
    ///
    /// The first tick after construction or [`reset`](Self::reset) only
    /// records the timestamp and returns zero, so time spent before playback
    /// started never turns into a jump.
    pub fn tick(&mut self, now: Duration) -> f64 {
        let Some(last) = self.last_frame.replace(now) else {
            return 0.0;
        };

        let raw = now.saturating_sub(last).as_secs_f64();
        self.smoothed_delta_secs = self.alpha * raw + (1.0 - self.alpha) * self.smoothed_delta_secs;
        self.smoothed_delta_secs
    }

    pub fn last_frame(&self) -> Option<Duration> {
        self.last_frame
    }

    pub fn smoothed_delta_secs(&self) -> f64 {
        self.smoothed_delta_secs
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(0.08, 0.016)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn first_tick_emits_zero() {
        let mut clock = FrameClock::default();

        assert_eq!(clock.tick(ms(5_000)), 0.0);
        assert_eq!(clock.last_frame(), Some(ms(5_000)));
    }

    #[test]
    fn later_ticks_blend_raw_delta_into_average() {
        let mut clock = FrameClock::default();
        clock.tick(ms(0));

        let delta = clock.tick(ms(100));
        let expected = 0.08 * 0.1 + 0.92 * 0.016;
        assert!((delta - expected).abs() < 1e-12);
    }

    #[test]
    fn spike_is_damped() {
        let mut clock = FrameClock::default();
        clock.tick(ms(0));
        for frame in 1..=120 {
            clock.tick(ms(frame * 16));
        }

        let steady = clock.smoothed_delta_secs();
        let spiked = clock.tick(ms(120 * 16 + 500));

        assert!((steady - 0.016).abs() < 1e-6);
        assert!(spiked < 0.06, "a 500 ms hitch should be heavily damped, got {spiked}");
    }

    #[test]
    fn stays_positive_after_first_tick_even_for_repeated_timestamps() {
        let mut clock = FrameClock::default();
        clock.tick(ms(10));

        assert!(clock.tick(ms(10)) > 0.0);
        assert!(clock.tick(ms(9)) > 0.0);
    }

    #[test]
    fn reset_restarts_timeline() {
        let mut clock = FrameClock::default();
        clock.tick(ms(0));
        clock.tick(ms(400));

        clock.reset();

        assert_eq!(clock.last_frame(), None);
        assert_eq!(clock.smoothed_delta_secs(), 0.016);
        assert_eq!(clock.tick(ms(10_000)), 0.0);
    }
}
