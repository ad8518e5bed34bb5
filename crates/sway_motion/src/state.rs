//! Game-state driven presets
//!
//! Binds [`StateMachine`] states to motion presets. After the game sends
//! events to its state machine, [`StatePresets::sync`] pops the preset of the
//! state that was left and pushes the preset of the state entered.

use crate::broadcaster::{MotionDataBroadcaster, PresetId};
use crate::data::MotionDataPreset;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use sway_core::{Result, StateId, StateMachine};

/// Preset per game state, plus the one currently pushed
#[derive(Default)]
pub struct StatePresets {
    bindings: FxHashMap<StateId, Arc<MotionDataPreset>>,
    active: Option<(StateId, PresetId)>,
}

impl StatePresets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: bind a preset to a state
    pub fn bind(mut self, state: StateId, preset: Arc<MotionDataPreset>) -> Self {
        self.set(state, preset);
        self
    }

    /// Bind a preset; takes effect on the next state change
    pub fn set(&mut self, state: StateId, preset: Arc<MotionDataPreset>) {
        self.bindings.insert(state, preset);
    }

    pub fn unbind(&mut self, state: StateId) -> Option<Arc<MotionDataPreset>> {
        self.bindings.remove(&state)
    }

    pub fn preset_for(&self, state: StateId) -> Option<&Arc<MotionDataPreset>> {
        self.bindings.get(&state)
    }

    /// State whose preset is currently on the broadcaster's stack
    pub fn active_state(&self) -> Option<StateId> {
        self.active.map(|(state, _)| state)
    }

    /// Bring the broadcaster in line with the machine's current state.
    ///
    /// Returns whether the stack changed. A state without a binding leaves
    /// nothing pushed, so resolution falls through to whatever lies below.
    pub fn sync(
        &mut self,
        machine: &StateMachine,
        broadcaster: &mut MotionDataBroadcaster,
    ) -> Result<bool> {
        let state = machine.current_state();
        let in_sync = match self.active {
            Some((active, _)) => active == state,
            None => !self.bindings.contains_key(&state),
        };
        if in_sync {
            return Ok(false);
        }

        if let Some((left, id)) = self.active.take() {
            tracing::debug!(from = left, to = state, "leaving state preset");
            broadcaster.pop_preset(id)?;
        }
        if let Some(preset) = self.bindings.get(&state) {
            let id = broadcaster.push_preset(preset.clone());
            self.active = Some((state, id));
        }
        Ok(true)
    }

    /// Pop the active preset, if any
    pub fn release(&mut self, broadcaster: &mut MotionDataBroadcaster) -> Result<()> {
        if let Some((_, id)) = self.active.take() {
            broadcaster.pop_preset(id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataKind, ForceData, MotionData};
    use crate::spring::SpringParams;
    use sway_core::Transition;

    const IDLE: StateId = 0;
    const AIMING: StateId = 1;
    const SPRINTING: StateId = 2;

    const AIM: u32 = 10;
    const SPRINT: u32 = 11;
    const RELAX: u32 = 12;

    fn machine() -> StateMachine {
        StateMachine::new(
            IDLE,
            vec![
                Transition::new(IDLE, AIM, AIMING),
                Transition::new(IDLE, SPRINT, SPRINTING),
                Transition::new(AIMING, RELAX, IDLE),
                Transition::new(SPRINTING, RELAX, IDLE),
                Transition::new(SPRINTING, AIM, AIMING),
            ],
        )
    }

    fn preset(name: &str) -> Arc<MotionDataPreset> {
        let data = MotionData::new(format!("{name}_sway"), "sway")
            .channel(SpringParams::gentle(), ForceData::rest())
            .into_shared();
        MotionDataPreset::new(name).with(data).into_shared()
    }

    fn sway(b: &MotionDataBroadcaster) -> Option<String> {
        b.resolve(&DataKind::from("sway")).map(|d| d.name().to_string())
    }

    #[test]
    fn test_sync_follows_state_changes() {
        let mut fsm = machine();
        let mut broadcaster = MotionDataBroadcaster::new();
        let mut presets = StatePresets::new()
            .bind(AIMING, preset("aiming"))
            .bind(SPRINTING, preset("sprinting"));

        assert!(!presets.sync(&fsm, &mut broadcaster).unwrap());
        assert_eq!(sway(&broadcaster), None);

        fsm.send(SPRINT);
        assert!(presets.sync(&fsm, &mut broadcaster).unwrap());
        assert_eq!(sway(&broadcaster).as_deref(), Some("sprinting_sway"));

        fsm.send(AIM);
        presets.sync(&fsm, &mut broadcaster).unwrap();
        assert_eq!(sway(&broadcaster).as_deref(), Some("aiming_sway"));
        assert_eq!(broadcaster.stack_len(), 1);

        fsm.send(RELAX);
        presets.sync(&fsm, &mut broadcaster).unwrap();
        assert_eq!(sway(&broadcaster), None);
        assert_eq!(broadcaster.stack_len(), 0);
        assert_eq!(presets.active_state(), None);
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mut fsm = machine();
        let mut broadcaster = MotionDataBroadcaster::new();
        let mut presets = StatePresets::new().bind(AIMING, preset("aiming"));

        fsm.send(AIM);
        assert!(presets.sync(&fsm, &mut broadcaster).unwrap());
        assert!(!presets.sync(&fsm, &mut broadcaster).unwrap());
        assert_eq!(broadcaster.stack_len(), 1);
    }

    #[test]
    fn test_presets_below_are_kept() {
        let mut fsm = machine();
        let mut broadcaster = MotionDataBroadcaster::new();
        broadcaster.push_preset(preset("level"));
        let mut presets = StatePresets::new().bind(AIMING, preset("aiming"));

        fsm.send(AIM);
        presets.sync(&fsm, &mut broadcaster).unwrap();
        assert_eq!(sway(&broadcaster).as_deref(), Some("aiming_sway"));

        presets.release(&mut broadcaster).unwrap();
        assert_eq!(sway(&broadcaster).as_deref(), Some("level_sway"));
    }
}
