/// Tracks simulation time: a frame counter, a fixed-step counter, and the
/// accumulator that decides how many fixed steps each frame runs.
#[derive(Debug, Clone)]
pub struct SimClock {
    frame: u64,
    fixed_tick: u64,
    fixed_dt: f32,
    max_fixed_steps: u32,
    frame_dt: f32,
    elapsed: f64,
    accumulator: f32,
}

impl SimClock {
    /// Create a clock at frame 0 with the given fixed step and catch-up cap.
    pub fn new(fixed_dt: f32, max_fixed_steps: u32) -> Self {
        Self {
            frame: 0,
            fixed_tick: 0,
            fixed_dt,
            max_fixed_steps,
            frame_dt: 0.0,
            elapsed: 0.0,
            accumulator: 0.0,
        }
    }

    /// Start a new frame of `dt` seconds. Returns how many fixed steps to run.
    ///
    /// When the cap is hit the remaining backlog is dropped, so a long stall
    /// never causes a burst of catch-up steps on the following frames.
    pub fn begin_frame(&mut self, dt: f32) -> u32 {
        let dt = dt.max(0.0);
        self.frame += 1;
        self.frame_dt = dt;
        self.elapsed += f64::from(dt);

        if self.fixed_dt <= 0.0 {
            return 0;
        }
        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= self.fixed_dt && steps < self.max_fixed_steps {
            self.accumulator -= self.fixed_dt;
            steps += 1;
        }
        if steps == self.max_fixed_steps && self.accumulator >= self.fixed_dt {
            log::debug!(
                "frame {}: dropping {:.3}s of fixed-step backlog",
                self.frame,
                self.accumulator
            );
            self.accumulator %= self.fixed_dt;
        }
        steps
    }

    /// Count one fixed step.
    pub fn advance_fixed(&mut self) -> u64 {
        self.fixed_tick += 1;
        self.fixed_tick
    }

    /// Number of frames started so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of fixed steps run so far.
    pub fn fixed_tick(&self) -> u64 {
        self.fixed_tick
    }

    /// Duration of a fixed step in seconds.
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Duration of the current frame in seconds.
    pub fn frame_dt(&self) -> f32 {
        self.frame_dt
    }

    /// Total simulated seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Fraction of a fixed step left over in the accumulator.
    pub fn alpha(&self) -> f32 {
        if self.fixed_dt > 0.0 {
            self.accumulator / self.fixed_dt
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_initial_state() {
        let clock = SimClock::new(0.02, 5);
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.fixed_tick(), 0);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn accumulator_carries_remainder() {
        let mut clock = SimClock::new(0.25, 5);
        assert_eq!(clock.begin_frame(0.375), 1);
        // 0.125 left over + 0.375 = 0.5 -> two steps
        assert_eq!(clock.begin_frame(0.375), 2);
        assert_eq!(clock.frame(), 2);
        assert!((clock.elapsed() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn short_frames_can_skip_fixed_steps() {
        let mut clock = SimClock::new(0.25, 5);
        assert_eq!(clock.begin_frame(0.125), 0);
        assert!((clock.alpha() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn stall_is_capped_and_backlog_dropped() {
        let mut clock = SimClock::new(0.25, 3);
        assert_eq!(clock.begin_frame(10.0), 3);
        assert!(clock.alpha() < 1.0);
        assert_eq!(clock.begin_frame(0.25), 1);
    }

    #[test]
    fn negative_dt_is_ignored() {
        let mut clock = SimClock::new(0.02, 3);
        assert_eq!(clock.begin_frame(-1.0), 0);
        assert_eq!(clock.frame_dt(), 0.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn advance_fixed_counts() {
        let mut clock = SimClock::new(0.02, 3);
        clock.advance_fixed();
        assert_eq!(clock.advance_fixed(), 2);
    }
}
