//! Motions
//!
//! A [`Motion`] is a named, independently enabled unit owning one or more
//! spring channels. Each channel pairs a spring with the force that supplies
//! its target; the motion's output is the sum of its channel values, expressed
//! as an offset from the consumer's rest value.

use crate::data::MotionData;
use crate::force::Force;
use crate::spring::{SpringParams, SpringSolver, SpringState, StepReport};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use sway_core::Animatable;

/// What a motion does while disabled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisableBehavior {
    /// Freeze the springs and keep contributing the last output
    Hold,
    /// Let the springs pull the output back to zero (the rest value)
    #[default]
    Decay,
    /// Drop the output to zero on the next tick
    Snap,
}

/// Hooks an external pool calls when recycling instances
pub trait PoolHooks {
    /// Return to a freshly-constructed state before reuse. Broadcast
    /// subscriptions are detached; the next owner registers again.
    fn reset(&mut self);

    /// Release external attachments when handed back to the pool
    fn dispose(&mut self);
}

/// The mixer's view of anything that produces motion
pub trait Animated<T>: PoolHooks {
    fn name(&self) -> &str;

    /// Advance by one fixed step of `dt` seconds
    fn tick(&mut self, dt: f32);

    /// Output cached by the last tick
    fn output(&self) -> T;

    fn is_enabled(&self) -> bool;

    /// Takes effect on the next tick
    fn set_enabled(&mut self, enabled: bool);
}

/// A spring paired with the force that drives its target
#[derive(Clone, Debug)]
pub struct SpringChannel<T> {
    state: SpringState<T>,
    params: SpringParams,
    force: Force<T>,
}

impl<T: Animatable> SpringChannel<T> {
    pub fn new(params: SpringParams, force: Force<T>) -> Self {
        Self {
            state: SpringState::default(),
            params,
            force,
        }
    }

    pub fn state(&self) -> SpringState<T> {
        self.state
    }

    pub fn params(&self) -> &SpringParams {
        &self.params
    }

    pub fn force(&self) -> &Force<T> {
        &self.force
    }

    /// Swap parameters without touching value or velocity
    pub fn set_params(&mut self, params: SpringParams) {
        self.params = params;
    }

    /// Swap the force without touching value or velocity
    pub fn set_force(&mut self, force: Force<T>) {
        self.force.retarget(force);
    }

    /// Push the spring directly (recoil impulses, landings)
    pub fn add_impulse(&mut self, velocity: T) {
        self.state.velocity = self.state.velocity + velocity;
    }

    fn advance(&mut self, solver: &SpringSolver, target: T, dt: f32) -> StepReport {
        let (state, report) = solver.advance(self.state, &self.params, target, dt);
        self.state = state;
        report
    }
}

/// A named unit of procedural motion
#[derive(Clone, Debug)]
pub struct Motion<T> {
    name: String,
    channels: SmallVec<[SpringChannel<T>; 2]>,
    enabled: bool,
    disable_behavior: DisableBehavior,
    solver: SpringSolver,
    output: T,
    unstable_steps: u32,
}

impl<T: Animatable> Motion<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: SmallVec::new(),
            enabled: true,
            disable_behavior: DisableBehavior::default(),
            solver: SpringSolver::default(),
            output: T::ZERO,
            unstable_steps: 0,
        }
    }

    /// Build one channel per entry of `data`
    pub fn from_data(name: impl Into<String>, data: &MotionData) -> Self {
        data.channels().iter().fold(Self::new(name), |motion, channel| {
            motion.channel(channel.spring, channel.force.build())
        })
    }

    /// Builder: add a channel
    pub fn channel(mut self, params: SpringParams, force: Force<T>) -> Self {
        self.push_channel(params, force);
        self
    }

    /// Builder: choose what happens while disabled
    pub fn with_disable_behavior(mut self, behavior: DisableBehavior) -> Self {
        self.disable_behavior = behavior;
        self
    }

    /// Builder: use a solver with custom stability limits
    pub fn with_solver(mut self, solver: SpringSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn push_channel(&mut self, params: SpringParams, force: Force<T>) {
        if let Err(err) = params.validate() {
            tracing::warn!(motion = %self.name, %err, "spring will integrate with safe minimums");
        }
        self.channels.push(SpringChannel::new(params, force));
    }

    pub fn channels(&self) -> &[SpringChannel<T>] {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut [SpringChannel<T>] {
        &mut self.channels
    }

    pub fn disable_behavior(&self) -> DisableBehavior {
        self.disable_behavior
    }

    /// Number of ticks whose step exceeded the solver's stability threshold
    pub fn unstable_steps(&self) -> u32 {
        self.unstable_steps
    }

    fn step_enabled(&mut self, dt: f32) {
        for channel in self.channels.iter_mut() {
            channel.force.tick(dt);
            let target = channel.force.target();
            let report = channel.advance(&self.solver, target, dt);
            if report.exceeded_threshold() || report.rejected {
                self.unstable_steps = self.unstable_steps.saturating_add(1);
            }
        }
    }

    fn step_disabled(&mut self, dt: f32) {
        match self.disable_behavior {
            DisableBehavior::Hold => {}
            DisableBehavior::Decay => {
                for channel in self.channels.iter_mut() {
                    channel.advance(&self.solver, T::ZERO, dt);
                }
            }
            DisableBehavior::Snap => {
                for channel in self.channels.iter_mut() {
                    channel.state = SpringState::default();
                }
            }
        }
    }

    fn sum_channels(&self) -> T {
        self.channels
            .iter()
            .fold(T::ZERO, |acc, channel| acc + channel.state.value)
    }
}

impl<T: Animatable> Animated<T> for Motion<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        if self.enabled {
            self.step_enabled(dt);
        } else {
            self.step_disabled(dt);
        }

        self.output = self.sum_channels();
    }

    fn output(&self) -> T {
        self.output
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            for channel in self.channels.iter_mut() {
                channel.force.activate();
            }
        }
        self.enabled = enabled;
    }
}

impl<T: Animatable> PoolHooks for Motion<T> {
    fn reset(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.state = SpringState::default();
            channel.force.activate();
        }
        self.enabled = true;
        self.output = T::ZERO;
        self.unstable_steps = 0;
    }

    fn dispose(&mut self) {
        self.reset();
    }
}
