//! Forces
//!
//! A force supplies the target a spring chases. The set of forces is closed:
//! a fixed target, or a curve sampled along a local elapsed-time cursor.

use crate::curve::{Curve, WrapMode};
use sway_core::Animatable;

/// Fixed target, independent of time
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantForce<T> {
    pub target: T,
}

/// Target sampled from a curve
#[derive(Clone, Debug, PartialEq)]
pub struct CurveForce<T> {
    pub curve: Curve<T>,
    pub wrap: WrapMode,
    elapsed: f32,
}

impl<T: Animatable> CurveForce<T> {
    pub fn new(curve: Curve<T>, wrap: WrapMode) -> Self {
        Self {
            curve,
            wrap,
            elapsed: 0.0,
        }
    }

    /// A non-looping curve whose last key has passed
    pub fn is_finished(&self) -> bool {
        self.wrap == WrapMode::Hold && self.elapsed >= self.curve.duration()
    }
}

/// Driver of a spring's target
#[derive(Clone, Debug, PartialEq)]
pub enum Force<T> {
    Constant(ConstantForce<T>),
    Curve(CurveForce<T>),
}

impl<T: Animatable> Force<T> {
    pub fn constant(target: T) -> Self {
        Force::Constant(ConstantForce { target })
    }

    pub fn curve(curve: Curve<T>, wrap: WrapMode) -> Self {
        Force::Curve(CurveForce::new(curve, wrap))
    }

    /// Restart the elapsed-time cursor
    pub fn activate(&mut self) {
        if let Force::Curve(force) = self {
            force.elapsed = 0.0;
        }
    }

    /// Advance the elapsed-time cursor
    pub fn tick(&mut self, dt: f32) {
        if let Force::Curve(force) = self {
            if dt.is_finite() && dt > 0.0 {
                force.elapsed += dt;
                // Keep the cursor bounded so f32 precision does not erode
                // long-running loops.
                let duration = force.curve.duration();
                if force.wrap == WrapMode::Loop && duration > 0.0 && force.elapsed > duration {
                    force.elapsed = force.elapsed.rem_euclid(duration);
                }
            }
        }
    }

    /// Seconds since the last activation (always 0 for constant forces)
    pub fn elapsed(&self) -> f32 {
        match self {
            Force::Constant(_) => 0.0,
            Force::Curve(force) => force.elapsed,
        }
    }

    /// Target at an arbitrary elapsed time
    pub fn target_at(&self, elapsed: f32) -> T {
        match self {
            Force::Constant(force) => force.target,
            Force::Curve(force) => force.curve.sample(elapsed, force.wrap),
        }
    }

    /// Target at the current cursor
    pub fn target(&self) -> T {
        self.target_at(self.elapsed())
    }

    /// Replace the configuration in place. A curve replacing a curve keeps
    /// the running cursor so looping targets stay in phase.
    pub fn retarget(&mut self, next: Force<T>) {
        let elapsed = self.elapsed();
        let was_curve = matches!(self, Force::Curve(_));
        *self = next;
        if let Force::Curve(force) = self {
            force.elapsed = if was_curve { elapsed } else { 0.0 };
        }
    }
}

impl<T: Animatable> Default for Force<T> {
    fn default() -> Self {
        Force::constant(T::ZERO)
    }
}
