//! Game-state machine
//!
//! Flat state machine describing which gameplay state (idle, aiming,
//! sprinting, swimming, ...) a consumer is in. Motion code observes the
//! [`StateChange`]s it produces to push and pop motion presets; the machine
//! itself knows nothing about motion.
//!
//! Supports:
//! - Guards (conditional transitions)
//! - Bounded transition history

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Identifier for a game state
pub type StateId = u32;

/// Identifier for a game event
pub type EventId = u32;

/// A guard that must hold for a transition to fire
pub type Guard = Box<dyn Fn() -> bool + Send>;

/// Maximum number of transitions kept in the history
const HISTORY_LIMIT: usize = 64;

/// A transition in the state machine
pub struct Transition {
    pub from_state: StateId,
    pub event: EventId,
    pub to_state: StateId,
    pub guard: Option<Guard>,
}

impl Transition {
    /// Create an unguarded transition
    pub fn new(from: StateId, event: EventId, to: StateId) -> Self {
        Self {
            from_state: from,
            event,
            to_state: to,
            guard: None,
        }
    }

    /// Add a guard condition
    pub fn with_guard<F: Fn() -> bool + Send + 'static>(mut self, guard: F) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }

    fn accepts(&self, state: StateId, event: EventId) -> bool {
        self.from_state == state
            && self.event == event
            && self.guard.as_ref().map_or(true, |guard| guard())
    }
}

/// A state change produced by [`StateMachine::send`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChange {
    pub from: StateId,
    pub event: EventId,
    pub to: StateId,
}

/// A game-state machine instance
pub struct StateMachine {
    current_state: StateId,
    /// Transitions grouped by source state
    transitions: FxHashMap<StateId, SmallVec<[Transition; 4]>>,
    history: Vec<StateChange>,
}

impl StateMachine {
    /// Create a state machine with an initial state and transitions
    pub fn new(initial_state: StateId, transitions: Vec<Transition>) -> Self {
        let mut machine = Self {
            current_state: initial_state,
            transitions: FxHashMap::default(),
            history: Vec::new(),
        };
        for transition in transitions {
            machine.add_transition(transition);
        }
        machine
    }

    /// Add a transition after construction
    pub fn add_transition(&mut self, transition: Transition) {
        self.transitions
            .entry(transition.from_state)
            .or_default()
            .push(transition);
    }

    pub fn current_state(&self) -> StateId {
        self.current_state
    }

    pub fn is_in(&self, state: StateId) -> bool {
        self.current_state == state
    }

    /// Most recent transitions, oldest first
    pub fn history(&self) -> &[StateChange] {
        &self.history
    }

    /// Check whether `event` would fire a transition right now
    pub fn can_send(&self, event: EventId) -> bool {
        self.find(event).is_some()
    }

    /// Send an event; returns the resulting change if a transition fired
    pub fn send(&mut self, event: EventId) -> Option<StateChange> {
        let to = self.find(event)?.to_state;
        let change = StateChange {
            from: self.current_state,
            event,
            to,
        };

        tracing::debug!(from = change.from, event, to, "game state transition");

        self.current_state = to;
        if self.history.len() == HISTORY_LIMIT {
            self.history.remove(0);
        }
        self.history.push(change);

        Some(change)
    }

    /// Jump directly to a state, bypassing transitions (respawn, load)
    pub fn force_state(&mut self, state: StateId) {
        self.current_state = state;
    }

    fn find(&self, event: EventId) -> Option<&Transition> {
        self.transitions
            .get(&self.current_state)?
            .iter()
            .find(|t| t.accepts(self.current_state, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    const IDLE: StateId = 0;
    const AIMING: StateId = 1;
    const SPRINTING: StateId = 2;

    const AIM_PRESSED: EventId = 1;
    const AIM_RELEASED: EventId = 2;
    const SPRINT_PRESSED: EventId = 3;

    fn machine() -> StateMachine {
        StateMachine::new(
            IDLE,
            vec![
                Transition::new(IDLE, AIM_PRESSED, AIMING),
                Transition::new(AIMING, AIM_RELEASED, IDLE),
                Transition::new(IDLE, SPRINT_PRESSED, SPRINTING),
            ],
        )
    }

    #[test]
    fn test_simple_transitions() {
        let mut fsm = machine();
        assert_eq!(fsm.current_state(), IDLE);

        let change = fsm.send(AIM_PRESSED);
        assert_eq!(
            change,
            Some(StateChange {
                from: IDLE,
                event: AIM_PRESSED,
                to: AIMING
            })
        );
        assert!(fsm.is_in(AIMING));

        fsm.send(AIM_RELEASED);
        assert!(fsm.is_in(IDLE));
    }

    #[test]
    fn test_invalid_event_no_transition() {
        let mut fsm = machine();
        assert_eq!(fsm.send(AIM_RELEASED), None);
        assert!(fsm.is_in(IDLE));
        assert!(fsm.history().is_empty());
    }

    #[test]
    fn test_guard_blocks_transition() {
        let can_sprint = Arc::new(AtomicBool::new(false));
        let flag = can_sprint.clone();

        let mut fsm = StateMachine::new(
            IDLE,
            vec![Transition::new(IDLE, SPRINT_PRESSED, SPRINTING)
                .with_guard(move || flag.load(Ordering::Relaxed))],
        );

        assert!(!fsm.can_send(SPRINT_PRESSED));
        assert_eq!(fsm.send(SPRINT_PRESSED), None);

        can_sprint.store(true, Ordering::Relaxed);
        assert!(fsm.can_send(SPRINT_PRESSED));
        assert!(fsm.send(SPRINT_PRESSED).is_some());
        assert!(fsm.is_in(SPRINTING));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut fsm = machine();
        for _ in 0..HISTORY_LIMIT {
            fsm.send(AIM_PRESSED);
            fsm.send(AIM_RELEASED);
        }
        assert_eq!(fsm.history().len(), HISTORY_LIMIT);
        assert_eq!(fsm.history().last().map(|c| c.to), Some(IDLE));
    }
}
