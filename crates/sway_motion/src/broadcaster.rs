//! Motion data broadcaster
//!
//! Keeps a stack of [`MotionDataPreset`]s (one per active game state) plus
//! explicit per-kind overrides, and pushes the resolved [`MotionData`] of every
//! kind to the receivers subscribed to it.
//!
//! Resolution for a kind, highest priority first:
//!
//! 1. the override for that kind
//! 2. the top-most preset on the stack that defines the kind
//! 3. the configured default for the kind
//! 4. nothing: receivers fall back to their own data
//!
//! Presets can be popped from anywhere in the stack, so resolution is always
//! an explicit top-down scan rather than a peek at the top.
//!
//! Notifications are synchronous. A receiver must not mutate the broadcaster
//! while handling one; it can instead record the mutation on a
//! [`BroadcastQueue`] which is applied at the next tick boundary by
//! [`MotionDataBroadcaster::apply_queued`].

use crate::data::{DataKind, MotionData, MotionDataPreset};
use crate::receiver::MotionDataReceiver;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use sway_core::{MotionError, Result};

new_key_type! {
    /// Handle to one pushed preset instance
    pub struct PresetId;
    /// Handle to one receiver subscription
    pub struct ReceiverId;
}

type WeakReceiver = Weak<RefCell<dyn MotionDataReceiver>>;

struct Subscription {
    kind: DataKind,
    receiver: WeakReceiver,
    /// Missed a delivery because the receiver was borrowed
    stale: bool,
}

enum Delivery {
    Delivered,
    Busy,
    Gone,
}

impl Subscription {
    fn deliver(&mut self, data: Option<&Arc<MotionData>>) -> Delivery {
        let Some(receiver) = self.receiver.upgrade() else {
            return Delivery::Gone;
        };
        let Ok(mut receiver) = receiver.try_borrow_mut() else {
            self.stale = true;
            tracing::warn!(kind = %self.kind, "receiver busy during notification, deferring");
            return Delivery::Busy;
        };
        if !receiver.is_attached() {
            return Delivery::Gone;
        }

        self.stale = false;
        if let Err(err) = receiver.on_data_changed(data) {
            tracing::warn!(kind = %self.kind, %err, "receiver rejected motion data");
        }
        Delivery::Delivered
    }
}

/// A broadcaster mutation recorded for later
#[derive(Clone, Debug)]
pub enum BroadcastCommand {
    PushPreset(Arc<MotionDataPreset>),
    PopPreset(Arc<MotionDataPreset>),
    SetOverride(Arc<MotionData>),
    ClearOverride(DataKind),
}

/// Cloneable handle for deferring broadcaster mutations to the next tick
#[derive(Clone, Default)]
pub struct BroadcastQueue {
    commands: Rc<RefCell<VecDeque<BroadcastCommand>>>,
}

impl BroadcastQueue {
    pub fn push(&self, command: BroadcastCommand) {
        self.commands.borrow_mut().push_back(command);
    }

    pub fn push_preset(&self, preset: Arc<MotionDataPreset>) {
        self.push(BroadcastCommand::PushPreset(preset));
    }

    pub fn pop_preset(&self, preset: Arc<MotionDataPreset>) {
        self.push(BroadcastCommand::PopPreset(preset));
    }

    pub fn set_override(&self, data: Arc<MotionData>) {
        self.push(BroadcastCommand::SetOverride(data));
    }

    pub fn clear_override(&self, kind: DataKind) {
        self.push(BroadcastCommand::ClearOverride(kind));
    }

    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }

    fn take(&self) -> VecDeque<BroadcastCommand> {
        std::mem::take(&mut *self.commands.borrow_mut())
    }
}

/// Resolves and distributes motion data per kind
#[derive(Default)]
pub struct MotionDataBroadcaster {
    presets: SlotMap<PresetId, Arc<MotionDataPreset>>,
    /// Bottom to top
    stack: Vec<PresetId>,
    overrides: FxHashMap<DataKind, Arc<MotionData>>,
    defaults: FxHashMap<DataKind, Arc<MotionData>>,
    subscriptions: SlotMap<ReceiverId, Subscription>,
    /// Last value delivered per kind
    resolved: FxHashMap<DataKind, Arc<MotionData>>,
    queue: BroadcastQueue,
}

impl MotionDataBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Preset stack
    // ========================================================================

    /// Push a preset on top of the stack
    pub fn push_preset(&mut self, preset: Arc<MotionDataPreset>) -> PresetId {
        let kinds: SmallVec<[DataKind; 4]> = preset.kinds().cloned().collect();
        tracing::debug!(preset = preset.name(), depth = self.stack.len() + 1, "push preset");

        let id = self.presets.insert(preset);
        self.stack.push(id);
        for kind in &kinds {
            self.refresh(kind);
        }
        id
    }

    /// Remove a pushed preset from anywhere in the stack
    pub fn pop_preset(&mut self, id: PresetId) -> Result<Arc<MotionDataPreset>> {
        let Some(position) = self.stack.iter().position(|entry| *entry == id) else {
            return Err(self.report(MotionError::StackConsistency(format!(
                "preset {id:?} is not on the stack"
            ))));
        };
        self.stack.remove(position);
        let preset = self.presets.remove(id).ok_or_else(|| {
            MotionError::StackConsistency(format!("preset {id:?} missing from storage"))
        })?;

        tracing::debug!(preset = preset.name(), depth = self.stack.len(), "pop preset");
        let kinds: SmallVec<[DataKind; 4]> = preset.kinds().cloned().collect();
        for kind in &kinds {
            self.refresh(kind);
        }
        Ok(preset)
    }

    /// Remove the top-most stack entry holding this preset instance
    pub fn pop_preset_by_reference(&mut self, preset: &Arc<MotionDataPreset>) -> Result<PresetId> {
        let found = self
            .stack
            .iter()
            .rev()
            .copied()
            .find(|id| self.presets.get(*id).is_some_and(|p| Arc::ptr_eq(p, preset)));

        match found {
            Some(id) => self.pop_preset(id).map(|_| id),
            None => Err(self.report(MotionError::StackConsistency(format!(
                "preset `{}` is not on the stack",
                preset.name()
            )))),
        }
    }

    pub fn contains(&self, id: PresetId) -> bool {
        self.presets.contains_key(id)
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Presets from bottom to top
    pub fn stack(&self) -> impl Iterator<Item = &Arc<MotionDataPreset>> {
        self.stack.iter().filter_map(|id| self.presets.get(*id))
    }

    // ========================================================================
    // Overrides and defaults
    // ========================================================================

    /// Force `data` for its kind regardless of the stack
    pub fn set_override(&mut self, data: Arc<MotionData>) {
        let kind = data.kind().clone();
        tracing::debug!(kind = %kind, data = data.name(), "set override");
        self.overrides.insert(kind.clone(), data);
        self.refresh(&kind);
    }

    /// Remove the override for `kind`; returns whether one was set
    pub fn clear_override(&mut self, kind: &DataKind) -> bool {
        let removed = self.overrides.remove(kind).is_some();
        if removed {
            tracing::debug!(kind = %kind, "clear override");
            self.refresh(kind);
        }
        removed
    }

    pub fn override_for(&self, kind: &DataKind) -> Option<&Arc<MotionData>> {
        self.overrides.get(kind)
    }

    /// Data used for its kind when no preset defines it
    pub fn set_default(&mut self, data: Arc<MotionData>) {
        let kind = data.kind().clone();
        self.defaults.insert(kind.clone(), data);
        self.refresh(&kind);
    }

    pub fn clear_default(&mut self, kind: &DataKind) -> bool {
        let removed = self.defaults.remove(kind).is_some();
        if removed {
            self.refresh(kind);
        }
        removed
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// The data currently in effect for `kind`
    pub fn resolve(&self, kind: &DataKind) -> Option<Arc<MotionData>> {
        if let Some(data) = self.overrides.get(kind) {
            return Some(data.clone());
        }
        self.stack
            .iter()
            .rev()
            .filter_map(|id| self.presets.get(*id))
            .find_map(|preset| preset.get(kind))
            .or_else(|| self.defaults.get(kind))
            .cloned()
    }

    /// Re-resolve `kind` and notify its receivers if the source changed
    fn refresh(&mut self, kind: &DataKind) {
        let next = self.resolve(kind);
        let changed = match (self.resolved.get(kind), &next) {
            (Some(previous), Some(next)) => !Arc::ptr_eq(previous, next),
            (None, None) => false,
            _ => true,
        };
        if !changed {
            return;
        }

        match &next {
            Some(data) => {
                tracing::debug!(kind = %kind, data = data.name(), "resolved motion data changed");
                self.resolved.insert(kind.clone(), data.clone());
            }
            None => {
                tracing::debug!(kind = %kind, "motion data unresolved, receivers use fallback");
                self.resolved.remove(kind);
            }
        }
        self.notify(kind, next.as_ref());
    }

    fn notify(&mut self, kind: &DataKind, data: Option<&Arc<MotionData>>) {
        let mut gone: SmallVec<[ReceiverId; 4]> = SmallVec::new();
        for (id, subscription) in self.subscriptions.iter_mut() {
            if &subscription.kind != kind {
                continue;
            }
            if let Delivery::Gone = subscription.deliver(data) {
                gone.push(id);
            }
        }
        for id in gone {
            self.subscriptions.remove(id);
        }
    }

    fn report(&self, err: MotionError) -> MotionError {
        tracing::warn!(%err, "broadcaster operation ignored");
        err
    }

    // ========================================================================
    // Receivers
    // ========================================================================

    /// Subscribe a receiver to its kind and deliver the current resolution
    pub fn register<R>(&mut self, receiver: &Rc<RefCell<R>>) -> Result<ReceiverId>
    where
        R: MotionDataReceiver + 'static,
    {
        let (kind, detached) = match receiver.try_borrow() {
            Ok(receiver) => (receiver.data_kind().clone(), !receiver.is_attached()),
            Err(_) => return Err(self.report(MotionError::ReceiverBusy("<unknown>".into()))),
        };

        let shared: Rc<RefCell<dyn MotionDataReceiver>> = receiver.clone();
        let weak = Rc::downgrade(&shared);
        let existing = self
            .subscriptions
            .iter()
            .find(|(_, s)| s.receiver.ptr_eq(&weak))
            .map(|(id, _)| id);
        if let Some(existing) = existing {
            if !detached {
                return Err(self.report(MotionError::DuplicateRegistration(kind.to_string())));
            }
            // Detached by a pool hook and not pruned yet
            self.subscriptions.remove(existing);
        }

        match receiver.try_borrow_mut() {
            Ok(mut receiver) => receiver.attach(),
            Err(_) => return Err(self.report(MotionError::ReceiverBusy(kind.to_string()))),
        }

        let current = self.resolve(&kind);
        let id = self.subscriptions.insert(Subscription {
            kind,
            receiver: weak,
            stale: false,
        });
        if let Some(subscription) = self.subscriptions.get_mut(id) {
            if let Delivery::Gone = subscription.deliver(current.as_ref()) {
                self.subscriptions.remove(id);
            }
        }
        Ok(id)
    }

    /// Drop a subscription; returns whether it existed
    pub fn unregister(&mut self, id: ReceiverId) -> bool {
        self.subscriptions.remove(id).is_some()
    }

    /// Number of subscriptions whose receiver is alive and attached
    pub fn receiver_count(&self) -> usize {
        self.subscriptions
            .values()
            .filter(|s| {
                s.receiver.upgrade().is_some_and(|receiver| {
                    let attached = receiver.try_borrow().map_or(true, |r| r.is_attached());
                    attached
                })
            })
            .count()
    }

    // ========================================================================
    // Deferred mutations
    // ========================================================================

    /// Handle receivers and game code can use to defer mutations
    pub fn queue(&self) -> BroadcastQueue {
        self.queue.clone()
    }

    /// Apply the commands queued so far, then re-deliver to receivers that
    /// were busy. Call at a tick boundary. Commands queued by receivers while
    /// this runs wait for the next call. Returns the number of commands applied.
    pub fn apply_queued(&mut self) -> usize {
        let commands = self.queue.take();
        let applied = commands.len();
        for command in commands {
            match command {
                BroadcastCommand::PushPreset(preset) => {
                    self.push_preset(preset);
                }
                BroadcastCommand::PopPreset(preset) => {
                    // Already reported
                    let _ = self.pop_preset_by_reference(&preset);
                }
                BroadcastCommand::SetOverride(data) => self.set_override(data),
                BroadcastCommand::ClearOverride(kind) => {
                    self.clear_override(&kind);
                }
            }
        }
        self.resync_stale();
        if !self.queue.is_empty() {
            tracing::debug!(pending = self.queue.len(), "commands queued during apply deferred");
        }
        applied
    }

    fn resync_stale(&mut self) {
        let mut gone: SmallVec<[ReceiverId; 4]> = SmallVec::new();
        for (id, subscription) in self.subscriptions.iter_mut() {
            if !subscription.stale {
                continue;
            }
            let current = self.resolved.get(&subscription.kind).cloned();
            if let Delivery::Gone = subscription.deliver(current.as_ref()) {
                gone.push(id);
            }
        }
        for id in gone {
            self.subscriptions.remove(id);
        }
    }
}
