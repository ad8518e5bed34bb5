//! Data-driven motions
//!
//! A [`DataMotion`] is a [`Motion`] whose spring parameters and forces come
//! from shared [`MotionData`]. It subscribes to one [`DataKind`] on a
//! [`MotionDataBroadcaster`](crate::broadcaster::MotionDataBroadcaster) and
//! swaps its data in place whenever the resolved source for that kind
//! changes. Spring value and velocity are never touched by a swap.

use crate::data::{DataKind, MotionData};
use crate::motion::{Animated, DisableBehavior, Motion, PoolHooks};
use std::sync::Arc;
use sway_core::{Animatable, MotionError, Result};

/// Capability of accepting broadcast motion data for one kind
pub trait MotionDataReceiver {
    /// The single kind this receiver consumes
    fn data_kind(&self) -> &DataKind;

    /// The resolved data for [`data_kind`](Self::data_kind) changed.
    /// `None` means nothing is resolved and the receiver should use its own
    /// fallback. On error the receiver must keep its previous state.
    fn on_data_changed(&mut self, data: Option<&Arc<MotionData>>) -> Result<()>;

    /// Detached receivers are dropped by the broadcaster on its next pass
    fn is_attached(&self) -> bool {
        true
    }

    /// Called by [`register`](crate::MotionDataBroadcaster::register) before
    /// the first delivery
    fn attach(&mut self) {}
}

/// A motion configured by swappable motion data
#[derive(Debug)]
pub struct DataMotion<T> {
    motion: Motion<T>,
    kind: DataKind,
    fallback: Arc<MotionData>,
    current: Arc<MotionData>,
    attached: bool,
}

impl<T: Animatable> DataMotion<T> {
    /// Build from `fallback`, which also fixes the kind and channel layout
    pub fn new(fallback: Arc<MotionData>) -> Result<Self> {
        fallback.validate()?;
        let kind = fallback.kind().clone();
        Ok(Self {
            motion: Motion::from_data(kind.as_str(), &fallback),
            kind,
            current: fallback.clone(),
            fallback,
            attached: true,
        })
    }

    /// Builder: choose what happens while disabled
    pub fn with_disable_behavior(mut self, behavior: DisableBehavior) -> Self {
        self.motion = self.motion.with_disable_behavior(behavior);
        self
    }

    pub fn motion(&self) -> &Motion<T> {
        &self.motion
    }

    pub fn motion_mut(&mut self) -> &mut Motion<T> {
        &mut self.motion
    }

    /// Data currently driving the channels
    pub fn current_data(&self) -> &Arc<MotionData> {
        &self.current
    }

    pub fn fallback_data(&self) -> &Arc<MotionData> {
        &self.fallback
    }

    /// Swap to `data`; rejected data leaves everything untouched
    pub fn apply(&mut self, data: &Arc<MotionData>) -> Result<()> {
        if Arc::ptr_eq(&self.current, data) {
            return Ok(());
        }
        if data.kind() != &self.kind {
            return Err(MotionError::DataKindMismatch {
                expected: self.kind.to_string(),
                actual: data.kind().to_string(),
            });
        }
        let expected = self.motion.channels().len();
        if data.channels().len() != expected {
            return Err(MotionError::ChannelCountMismatch {
                data: data.name().to_string(),
                expected,
                actual: data.channels().len(),
            });
        }
        data.validate()?;

        for (channel, channel_data) in self.motion.channels_mut().iter_mut().zip(data.channels()) {
            channel.set_params(channel_data.spring);
            channel.set_force(channel_data.force.build());
        }
        self.current = data.clone();

        tracing::debug!(kind = %self.kind, data = data.name(), "motion data applied");
        Ok(())
    }
}

impl<T: Animatable> MotionDataReceiver for DataMotion<T> {
    fn data_kind(&self) -> &DataKind {
        &self.kind
    }

    fn on_data_changed(&mut self, data: Option<&Arc<MotionData>>) -> Result<()> {
        let data = data.unwrap_or(&self.fallback).clone();
        self.apply(&data)
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn attach(&mut self) {
        self.attached = true;
    }
}

impl<T: Animatable> Animated<T> for DataMotion<T> {
    fn name(&self) -> &str {
        self.motion.name()
    }

    fn tick(&mut self, dt: f32) {
        self.motion.tick(dt);
    }

    fn output(&self) -> T {
        self.motion.output()
    }

    fn is_enabled(&self) -> bool {
        self.motion.is_enabled()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.motion.set_enabled(enabled);
    }
}

impl<T: Animatable> PoolHooks for DataMotion<T> {
    fn reset(&mut self) {
        let fallback = self.fallback.clone();
        if let Err(err) = self.apply(&fallback) {
            tracing::warn!(kind = %self.kind, %err, "fallback data rejected on reset");
        }
        self.motion.reset();
        // A recycled motion must be registered again by its next owner
        self.attached = false;
    }

    fn dispose(&mut self) {
        self.reset();
    }
}
