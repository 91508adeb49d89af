// src/time.rs
//! Fixed-timestep clock.
//!
//! Frame time is accumulated into a lag counter which is drained in fixed
//! tick increments, so a frame may run zero, one or several simulation ticks.

use log::warn;

/// Absorbs float drift when lag is drained down to an exact tick multiple.
const LAG_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct FixedTimestep {
    tick_dt: f64,
    lag: f64,
    max_ticks_per_frame: u32,
    total_ticks: u64,
}

impl FixedTimestep {
    /// `tick_rate` in ticks per second.
    pub fn new(tick_rate: f64) -> Self {
        Self {
            tick_dt: 1.0 / tick_rate.max(1.0),
            lag: 0.0,
            max_ticks_per_frame: 8,
            total_ticks: 0,
        }
    }

    /// Caps how many ticks one frame may catch up on (prevents the spiral of death).
    pub fn with_max_catch_up(mut self, max_ticks: u32) -> Self {
        self.max_ticks_per_frame = max_ticks.max(1);
        self
    }

    /// Feed elapsed wall time (seconds) since the previous frame.
    pub fn accumulate(&mut self, elapsed: f64) {
        self.lag += elapsed.max(0.0);

        let budget = self.tick_dt * self.max_ticks_per_frame as f64;
        if self.lag > budget {
            warn!(
                "fixed timestep: {:.1} ms behind, dropping lag beyond {} ticks",
                self.lag * 1000.0,
                self.max_ticks_per_frame
            );
            self.lag = budget;
        }
    }

    /// Drain accumulated lag one tick at a time.
    ///
    /// ```ignore
    /// clock.accumulate(frame_seconds);
    /// for _ in clock.ticks() { session.tick(&input); }
    /// ```
    #[inline(always)]
    pub fn ticks(&mut self) -> FixedTicks<'_> {
        FixedTicks { clock: self }
    }

    #[inline(always)]
    pub fn tick_dt(&self) -> f32 {
        self.tick_dt as f32
    }

    /// Fraction of a tick left in the lag counter, for render interpolation.
    #[inline(always)]
    pub fn alpha(&self) -> f32 {
        (self.lag / self.tick_dt) as f32
    }

    #[inline(always)]
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn reset(&mut self) {
        self.lag = 0.0;
    }
}

/// Iterator over the ticks owed by the accumulated lag.
pub struct FixedTicks<'a> {
    clock: &'a mut FixedTimestep,
}

impl Iterator for FixedTicks<'_> {
    type Item = ();

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.clock.lag + LAG_EPSILON >= self.clock.tick_dt {
            self.clock.lag = (self.clock.lag - self.clock.tick_dt).max(0.0);
            self.clock.total_ticks += 1;
            Some(())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_frames_run_no_tick_until_lag_builds() {
        let mut clock = FixedTimestep::new(60.0);
        clock.accumulate(1.0 / 240.0);
        assert_eq!(clock.ticks().count(), 0);
        clock.accumulate(1.0 / 240.0);
        assert_eq!(clock.ticks().count(), 0);
        clock.accumulate(1.0 / 120.0 + 1e-6);
        assert_eq!(clock.ticks().count(), 1);
    }

    #[test]
    fn long_frames_run_several_ticks() {
        let mut clock = FixedTimestep::new(60.0);
        clock.accumulate(3.5 / 60.0);
        assert_eq!(clock.ticks().count(), 3);
        assert!((clock.alpha() - 0.5).abs() < 1e-3);
        assert_eq!(clock.total_ticks(), 3);
    }

    #[test]
    fn stalls_are_capped() {
        let mut clock = FixedTimestep::new(60.0).with_max_catch_up(4);
        clock.accumulate(2.0);
        assert_eq!(clock.ticks().count(), 4);
        assert_eq!(clock.ticks().count(), 0);
    }
}
