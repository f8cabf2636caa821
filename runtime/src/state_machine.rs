//! Runtime-level wrapper around [`core::types::StateMachine`]: adds
//! per-state entry callbacks and a bounded transition history (§4.9).

use std::collections::HashMap;

use core::types::{BotState, StateMachine};

/// One recorded transition, for diagnostics and the end-of-run summary.
#[derive(Debug, Clone, Copy)]
pub struct StateTransition {
    pub from: BotState,
    pub to: BotState,
}

const MAX_HISTORY: usize = 50;

/// Adds callback registration and history tracking atop the core state
/// machine's transition-legality rules, mirroring the reference's
/// `StateMachine.add_state_callback` / `get_history`.
pub struct BotStateMachine {
    inner: StateMachine,
    callbacks: HashMap<BotState, Vec<Box<dyn FnMut()>>>,
    history: Vec<StateTransition>,
}

impl BotStateMachine {
    pub fn new(initial: BotState) -> Self {
        Self {
            inner: StateMachine::new(initial),
            callbacks: HashMap::new(),
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> BotState {
        self.inner.current()
    }

    pub fn time_in_state(&self) -> std::time::Duration {
        self.inner.time_in_state()
    }

    /// Registers a callback to run every time `state` is entered.
    pub fn add_state_callback(&mut self, state: BotState, callback: impl FnMut() + 'static) {
        self.callbacks.entry(state).or_default().push(Box::new(callback));
    }

    /// Attempts a transition, logging and recording history on success,
    /// rejecting illegal transitions as a no-op logged at warn level (§4.9,
    /// §8 property 1).
    pub fn transition(&mut self, target: BotState) -> bool {
        let from = self.inner.current();
        if !self.inner.transition(target) {
            log::warn!("rejected illegal state transition {from:?} -> {target:?}");
            return false;
        }

        if from != target {
            self.history.push(StateTransition { from, to: target });
            if self.history.len() > MAX_HISTORY {
                self.history.remove(0);
            }
            log::info!("state transition {from:?} -> {target:?}");
            if let Some(callbacks) = self.callbacks.get_mut(&target) {
                for callback in callbacks {
                    callback();
                }
            }
        }
        true
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn callback_fires_on_matching_entry() {
        let mut sm = BotStateMachine::new(BotState::Idle);
        let fired = Rc::new(RefCell::new(0));
        let fired_clone = fired.clone();
        sm.add_state_callback(BotState::Walking, move || {
            *fired_clone.borrow_mut() += 1;
        });

        assert!(sm.transition(BotState::Walking));
        assert_eq!(*fired.borrow(), 1);
    }

    #[test]
    fn illegal_transition_does_not_record_history() {
        let mut sm = BotStateMachine::new(BotState::Eating);
        assert!(!sm.transition(BotState::Looting));
        assert!(sm.history().is_empty());
    }

    #[test]
    fn history_tracks_successful_transitions() {
        let mut sm = BotStateMachine::new(BotState::Walking);
        sm.transition(BotState::Gathering);
        sm.transition(BotState::Banking);
        assert_eq!(sm.history().len(), 2);
        assert_eq!(sm.history()[0].from, BotState::Walking);
        assert_eq!(sm.history()[1].to, BotState::Banking);
    }
}
