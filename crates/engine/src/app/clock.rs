use std::time::{Duration, Instant};

/// Time as seen by one render tick: seconds since the loop started and
/// seconds since the previous tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    elapsed_seconds: f32,
    delta_seconds: f32,
}

impl FrameClock {
    pub fn new(elapsed_seconds: f32, delta_seconds: f32) -> Self {
        Self {
            elapsed_seconds: elapsed_seconds.max(0.0),
            delta_seconds: delta_seconds.max(0.0),
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed_seconds
    }

    pub fn delta(&self) -> f32 {
        self.delta_seconds
    }

    /// Clock for the next tick, `delta_seconds` later.
    pub fn advanced_by(&self, delta_seconds: f32) -> Self {
        let delta_seconds = delta_seconds.max(0.0);
        Self::new(self.elapsed_seconds + delta_seconds, delta_seconds)
    }
}

/// Wall-clock source for [`FrameClock`]s. Elapsed time never goes backwards
/// and per-tick deltas are capped at `max_delta`.
#[derive(Debug)]
pub(crate) struct ClockSource {
    start: Instant,
    last_tick: Instant,
    max_delta: Duration,
}

impl ClockSource {
    pub(crate) fn new(now: Instant, max_delta: Duration) -> Self {
        Self {
            start: now,
            last_tick: now,
            max_delta,
        }
    }

    pub(crate) fn tick(&mut self, now: Instant) -> FrameClock {
        let raw_delta = now.saturating_duration_since(self.last_tick);
        if now > self.last_tick {
            self.last_tick = now;
        }
        let delta = raw_delta.min(self.max_delta);
        let elapsed = self.last_tick.saturating_duration_since(self.start);
        FrameClock::new(elapsed.as_secs_f32(), delta.as_secs_f32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_reports_elapsed_and_delta() {
        let base = Instant::now();
        let mut source = ClockSource::new(base, Duration::from_millis(250));

        let first = source.tick(base + Duration::from_millis(16));
        let second = source.tick(base + Duration::from_millis(40));

        assert!((first.elapsed() - 0.016).abs() < 1e-4);
        assert!((first.delta() - 0.016).abs() < 1e-4);
        assert!((second.elapsed() - 0.040).abs() < 1e-4);
        assert!((second.delta() - 0.024).abs() < 1e-4);
    }

    #[test]
    fn long_stall_is_clamped_to_max_delta() {
        let base = Instant::now();
        let mut source = ClockSource::new(base, Duration::from_millis(250));

        let clock = source.tick(base + Duration::from_secs(3));

        assert!((clock.delta() - 0.25).abs() < 1e-4);
        assert!((clock.elapsed() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn out_of_order_instant_does_not_rewind_elapsed() {
        let base = Instant::now();
        let mut source = ClockSource::new(base, Duration::from_millis(250));
        let later = source.tick(base + Duration::from_millis(100));
        let earlier = source.tick(base + Duration::from_millis(50));

        assert_eq!(earlier.delta(), 0.0);
        assert!(earlier.elapsed() >= later.elapsed());
    }

    #[test]
    fn advanced_by_ignores_negative_steps() {
        let clock = FrameClock::new(1.0, 0.1).advanced_by(-0.5);
        assert_eq!(clock.elapsed(), 1.0);
        assert_eq!(clock.delta(), 0.0);
    }
}
