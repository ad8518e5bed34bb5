//! Fixed-step scheduling
//!
//! Decouples the simulation tick from the host's frame rate. Frame time is
//! accumulated and spent in whole fixed steps; leftover time carries over to
//! the next frame.

/// Accumulator turning variable frame deltas into fixed steps
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedTimestep {
    step: f32,
    accumulator: f32,
    max_steps_per_frame: u32,
}

impl FixedTimestep {
    /// Default simulation rate
    pub const DEFAULT_HZ: f32 = 120.0;

    pub fn new(step: f32) -> Self {
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            tracing::warn!(step, "invalid fixed step, using default rate");
            1.0 / Self::DEFAULT_HZ
        };
        Self {
            step,
            accumulator: 0.0,
            max_steps_per_frame: 8,
        }
    }

    pub fn from_hz(hz: f32) -> Self {
        Self::new(1.0 / hz)
    }

    /// Builder: cap the number of steps a single frame may run
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps_per_frame = max_steps.max(1);
        self
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Add frame time and return how many fixed steps to run now.
    ///
    /// Time beyond `max_steps_per_frame` steps is discarded so a long stall
    /// does not trigger a burst of catch-up steps.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }

        self.accumulator += frame_dt;
        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps_per_frame {
            self.accumulator -= self.step;
            steps += 1;
        }

        if self.accumulator >= self.step {
            tracing::debug!(
                dropped = self.accumulator,
                max_steps = self.max_steps_per_frame,
                "frame exceeded step budget, dropping time"
            );
            self.accumulator %= self.step;
        }

        steps
    }

    /// Fraction of a step left in the accumulator (for render interpolation)
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::from_hz(Self::DEFAULT_HZ)
    }
}
