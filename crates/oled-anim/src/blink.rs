//! Blink animation: never / always / progressive intensity-scaled toggling.

use crate::clock::Clock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkMode {
    Never,
    Always,
    Progressive,
}

#[derive(Debug, Clone)]
pub struct BlinkAnimator {
    pub mode: BlinkMode,
    pub base_interval: Duration,
    state: bool,
    last_toggle: Option<Instant>,
}

impl BlinkAnimator {
    pub fn new(mode: BlinkMode, base_interval: Duration) -> Self {
        Self {
            mode,
            base_interval,
            state: false,
            last_toggle: None,
        }
    }

    /// The toggle interval for a given intensity (spec.md §4.4 / testable
    /// property 8). Intensity `0` means "no blink" under `Progressive`.
    pub fn interval(&self, intensity: u32) -> Duration {
        match self.mode {
            BlinkMode::Never => Duration::ZERO,
            BlinkMode::Always => self.base_interval,
            BlinkMode::Progressive => {
                if intensity == 0 {
                    return Duration::ZERO;
                }
                let base = self.base_interval.as_secs_f64();
                let step = base / 10.0;
                let raw = base - (intensity as f64 - 1.0) * step;
                let clamped = raw.clamp(step, base);
                Duration::from_secs_f64(clamped)
            }
        }
    }

    /// Toggles `state` if the interval has elapsed; returns whether it changed.
    pub fn update(&mut self, intensity: u32, clock: &dyn Clock) -> bool {
        let interval = self.interval(intensity);
        if interval.is_zero() {
            return false;
        }
        let now = clock.now();
        match self.last_toggle {
            None => {
                self.last_toggle = Some(now);
                false
            }
            Some(last) => {
                if now.saturating_duration_since(last) >= interval {
                    self.state = !self.state;
                    self.last_toggle = Some(now);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// `true` for `Never`, otherwise the current toggle state.
    pub fn should_render(&self) -> bool {
        match self.mode {
            BlinkMode::Never => true,
            _ => self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;

    #[test]
    fn never_always_renders_true() {
        let b = BlinkAnimator::new(BlinkMode::Never, Duration::from_secs(1));
        assert!(b.should_render());
    }

    #[test]
    fn progressive_interval_matches_property_8() {
        let base = Duration::from_secs(1);
        let b = BlinkAnimator::new(BlinkMode::Progressive, base);
        assert_eq!(b.interval(0), Duration::ZERO);
        assert_eq!(b.interval(1), base);
        assert_eq!(b.interval(10), base / 10);
    }

    #[test]
    fn progressive_clamps_beyond_intensity_ten() {
        let base = Duration::from_secs(1);
        let b = BlinkAnimator::new(BlinkMode::Progressive, base);
        assert_eq!(b.interval(25), base / 10);
    }

    #[test]
    fn toggles_after_interval_elapses() {
        let clock = FakeClock::new();
        let mut b = BlinkAnimator::new(BlinkMode::Always, Duration::from_millis(100));
        assert!(!b.update(0, &clock)); // primes last_toggle
        clock.advance(Duration::from_millis(50));
        assert!(!b.update(0, &clock));
        clock.advance(Duration::from_millis(60));
        assert!(b.update(0, &clock));
        assert!(b.should_render());
    }
}
