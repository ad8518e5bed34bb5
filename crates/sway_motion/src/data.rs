//! Motion data and presets
//!
//! [`MotionData`] describes how one kind of motion behaves under one game
//! state: the spring parameters and target force of every channel. It is an
//! immutable value shared through `Arc`, so swapping the data a motion uses is
//! a pointer swap.
//!
//! Force targets are stored as three components regardless of the channel
//! type. Scalar channels read the first component, 2D channels the first two.

use crate::curve::{Curve, CurveKey, Easing, WrapMode};
use crate::force::Force;
use crate::spring::SpringParams;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use sway_core::{Animatable, MotionError, Result};

/// Identifies a type of motion data ("weapon_sway", "camera_bob", ...)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataKind(Arc<str>);

impl DataKind {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DataKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DataKind {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One key of a dimension-agnostic curve
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveKeyData {
    pub time: f32,
    pub value: [f32; 3],
    pub easing: Easing,
}

/// Dimension-agnostic force description
#[derive(Clone, Debug, PartialEq)]
pub enum ForceData {
    Constant([f32; 3]),
    Curve {
        keys: Vec<CurveKeyData>,
        wrap: WrapMode,
    },
}

impl ForceData {
    /// Constant target of zero (spring rests at the consumer's rest value)
    pub fn rest() -> Self {
        ForceData::Constant([0.0; 3])
    }

    pub fn constant(components: &[f32]) -> Self {
        let mut value = [0.0; 3];
        for (slot, c) in value.iter_mut().zip(components) {
            *slot = *c;
        }
        ForceData::Constant(value)
    }

    /// Materialise the force for a concrete channel type
    pub fn build<T: Animatable>(&self) -> Force<T> {
        match self {
            ForceData::Constant(value) => Force::constant(T::from_slice(value)),
            ForceData::Curve { keys, wrap } => {
                let keys = keys
                    .iter()
                    .map(|k| CurveKey::new(k.time, T::from_slice(&k.value), k.easing))
                    .collect();
                Force::curve(Curve::new(keys), *wrap)
            }
        }
    }
}

impl Default for ForceData {
    fn default() -> Self {
        Self::rest()
    }
}

/// Spring and force for one channel of a motion
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelData {
    pub spring: SpringParams,
    pub force: ForceData,
}

/// Named bundle of channel behaviour for one game-state profile
#[derive(Clone, Debug, PartialEq)]
pub struct MotionData {
    name: String,
    kind: DataKind,
    channels: SmallVec<[ChannelData; 2]>,
}

impl MotionData {
    pub fn new(name: impl Into<String>, kind: impl Into<DataKind>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            channels: SmallVec::new(),
        }
    }

    /// Builder: append a channel
    pub fn channel(mut self, spring: SpringParams, force: ForceData) -> Self {
        self.channels.push(ChannelData { spring, force });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &DataKind {
        &self.kind
    }

    pub fn channels(&self) -> &[ChannelData] {
        &self.channels
    }

    /// At least one channel, every spring valid
    pub fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            return Err(MotionError::InvalidSpring(format!(
                "motion data `{}` has no channels",
                self.name
            )));
        }
        for channel in &self.channels {
            channel.spring.validate().map_err(|e| match e {
                MotionError::InvalidSpring(msg) => {
                    MotionError::InvalidSpring(format!("motion data `{}`: {msg}", self.name))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    pub fn into_shared(self) -> Arc<MotionData> {
        Arc::new(self)
    }
}

/// A set of motion data pushed and popped as one game state
#[derive(Clone, Debug, Default)]
pub struct MotionDataPreset {
    name: String,
    entries: IndexMap<DataKind, Arc<MotionData>>,
}

impl MotionDataPreset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    /// Builder: add data, replacing any earlier entry of the same kind
    pub fn with(mut self, data: Arc<MotionData>) -> Self {
        self.insert(data);
        self
    }

    pub fn insert(&mut self, data: Arc<MotionData>) {
        self.entries.insert(data.kind().clone(), data);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, kind: &DataKind) -> Option<&Arc<MotionData>> {
        self.entries.get(kind)
    }

    pub fn defines(&self, kind: &DataKind) -> bool {
        self.entries.contains_key(kind)
    }

    /// Kinds in insertion order
    pub fn kinds(&self) -> impl Iterator<Item = &DataKind> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_shared(self) -> Arc<MotionDataPreset> {
        Arc::new(self)
    }
}
