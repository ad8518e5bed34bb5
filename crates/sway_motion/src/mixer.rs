//! Motion mixer
//!
//! Owns the motions of one consumer (camera rig, weapon, UI element), ticks
//! them on a fixed step and blends their outputs into a single value:
//!
//! ```text
//! value = rest + Σ weight_i · output_i      (insertion order)
//! ```
//!
//! Motions are held as `Rc<RefCell<..>>` so a [`DataMotion`](crate::DataMotion)
//! can be owned by the mixer and subscribed to a broadcaster at the same
//! time. Nothing here is shared between consumers.

use crate::motion::{Animated, PoolHooks};
use crate::scheduler::FixedTimestep;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;
use sway_core::Animatable;

/// A motion shared between a mixer and its other owners
pub type SharedMotion<T> = Rc<RefCell<dyn Animated<T>>>;

/// Handle to a motion registered with a [`MotionMixer`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MotionId(u64);

struct MixerEntry<T> {
    motion: SharedMotion<T>,
    weight: f32,
    /// Output from the last successful tick
    output: T,
}

/// Ticks and blends the motions of one consumer
pub struct MotionMixer<T> {
    rest: T,
    value: T,
    entries: IndexMap<MotionId, MixerEntry<T>>,
    next_id: u64,
    clock: FixedTimestep,
    ticks: u64,
}

impl<T: Animatable> MotionMixer<T> {
    pub fn new(rest: T) -> Self {
        Self {
            rest,
            value: rest,
            entries: IndexMap::new(),
            next_id: 0,
            clock: FixedTimestep::default(),
            ticks: 0,
        }
    }

    /// Builder: run on a custom fixed step
    pub fn with_timestep(mut self, clock: FixedTimestep) -> Self {
        self.clock = clock;
        self
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Take ownership of a motion, blended at weight 1
    pub fn add<M: Animated<T> + 'static>(&mut self, motion: M) -> MotionId {
        self.add_weighted(motion, 1.0)
    }

    pub fn add_weighted<M: Animated<T> + 'static>(&mut self, motion: M, weight: f32) -> MotionId {
        let shared: SharedMotion<T> = Rc::new(RefCell::new(motion));
        self.insert(shared, weight)
    }

    /// Register a motion also held elsewhere (typically a broadcaster receiver)
    pub fn add_shared<M: Animated<T> + 'static>(&mut self, motion: &Rc<RefCell<M>>) -> MotionId {
        self.add_shared_weighted(motion, 1.0)
    }

    pub fn add_shared_weighted<M: Animated<T> + 'static>(
        &mut self,
        motion: &Rc<RefCell<M>>,
        weight: f32,
    ) -> MotionId {
        let shared: SharedMotion<T> = motion.clone();
        self.insert(shared, weight)
    }

    fn insert(&mut self, motion: SharedMotion<T>, weight: f32) -> MotionId {
        let id = MotionId(self.next_id);
        self.next_id += 1;
        let output = motion.try_borrow().map_or(T::ZERO, |m| m.output());
        self.entries.insert(
            id,
            MixerEntry {
                motion,
                weight: sanitize_weight(weight),
                output,
            },
        );
        id
    }

    /// Remove a motion; the remaining order is preserved
    pub fn remove(&mut self, id: MotionId) -> bool {
        self.entries.shift_remove(&id).is_some()
    }

    pub fn contains(&self, id: MotionId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered ids in blend order
    pub fn ids(&self) -> impl Iterator<Item = MotionId> + '_ {
        self.entries.keys().copied()
    }

    pub fn motion(&self, id: MotionId) -> Option<SharedMotion<T>> {
        self.entries.get(&id).map(|e| e.motion.clone())
    }

    // ========================================================================
    // Per-motion controls
    // ========================================================================

    pub fn weight(&self, id: MotionId) -> Option<f32> {
        self.entries.get(&id).map(|e| e.weight)
    }

    pub fn set_weight(&mut self, id: MotionId, weight: f32) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.weight = sanitize_weight(weight);
                true
            }
            None => false,
        }
    }

    /// Enable or disable a motion; takes effect on the next tick
    pub fn set_enabled(&mut self, id: MotionId, enabled: bool) -> bool {
        let Some(entry) = self.entries.get(&id) else {
            return false;
        };
        match entry.motion.try_borrow_mut() {
            Ok(mut motion) => {
                motion.set_enabled(enabled);
                true
            }
            Err(_) => {
                tracing::warn!(?id, "motion busy, enable state unchanged");
                false
            }
        }
    }

    // ========================================================================
    // Ticking
    // ========================================================================

    /// Feed frame time; runs zero or more fixed steps and returns how many
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        let steps = self.clock.advance(frame_dt);
        for _ in 0..steps {
            self.step();
        }
        steps
    }

    /// Run exactly one fixed step
    pub fn step(&mut self) {
        let dt = self.clock.step();

        for (id, entry) in self.entries.iter_mut() {
            match entry.motion.try_borrow_mut() {
                Ok(mut motion) => {
                    motion.tick(dt);
                    entry.output = motion.output();
                }
                Err(_) => {
                    tracing::warn!(?id, "motion busy during tick, holding last output");
                }
            }
        }

        self.value = self
            .entries
            .values()
            .fold(self.rest, |acc, entry| acc + entry.output * entry.weight);
        self.ticks += 1;
    }

    /// Blended value from the last step
    pub fn current_value(&self) -> T {
        self.value
    }

    pub fn rest_value(&self) -> T {
        self.rest
    }

    /// Move the rest value; applied from the next step
    pub fn set_rest_value(&mut self, rest: T) {
        self.rest = rest;
    }

    /// Fixed steps run since creation or the last reset
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Fraction of a step waiting in the accumulator
    pub fn alpha(&self) -> f32 {
        self.clock.alpha()
    }

    pub fn timestep(&self) -> &FixedTimestep {
        &self.clock
    }
}

impl<T: Animatable> PoolHooks for MotionMixer<T> {
    fn reset(&mut self) {
        for entry in self.entries.values_mut() {
            if let Ok(mut motion) = entry.motion.try_borrow_mut() {
                motion.reset();
            }
            entry.output = T::ZERO;
        }
        self.clock.reset();
        self.value = self.rest;
        self.ticks = 0;
    }

    fn dispose(&mut self) {
        for entry in self.entries.values() {
            if let Ok(mut motion) = entry.motion.try_borrow_mut() {
                motion.dispose();
            }
        }
        self.entries.clear();
        self.clock.reset();
        self.value = self.rest;
        self.ticks = 0;
    }
}

fn sanitize_weight(weight: f32) -> f32 {
    if weight.is_finite() {
        weight
    } else {
        tracing::warn!(weight, "non-finite motion weight, using 0");
        0.0
    }
}
