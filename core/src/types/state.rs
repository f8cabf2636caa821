//! Bot lifecycle state machine (§4.9).

use std::time::{Duration, Instant};

/// Closed set of high-level bot activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotState {
    Idle,
    Starting,
    Walking,
    Gathering,
    Combat,
    Banking,
    Eating,
    Looting,
    Recovering,
    Error,
    Break,
    Stopping,
}

impl BotState {
    /// The explicitly-tabulated allowed destinations for this state, not
    /// including the universal targets (`IDLE, ERROR, STOPPING, BREAK`),
    /// which [`BotState::can_transition_to`] adds for every state.
    fn table_targets(self) -> &'static [BotState] {
        use BotState::*;
        match self {
            Idle => &[Starting, Walking, Gathering, Combat],
            Starting => &[Gathering, Walking, Combat],
            Gathering => &[Banking, Walking],
            Combat => &[Eating, Looting, Banking],
            Eating => &[Combat, Banking],
            Looting => &[Combat, Banking, Idle],
            Walking => &[Gathering, Combat, Banking, Idle],
            Banking => &[Walking, Gathering, Combat],
            Error => &[Recovering, Stopping],
            Recovering => &[Idle, Error],
            Break => &[Idle, Starting],
            Stopping => &[],
        }
    }

    /// True when `self == target`, the table allows it, or `target` is one
    /// of the universal destinations reachable from every state (§4.9).
    pub fn can_transition_to(self, target: BotState) -> bool {
        if self == target {
            return true;
        }
        matches!(target, BotState::Idle | BotState::Error | BotState::Stopping | BotState::Break)
            || self.table_targets().contains(&target)
    }
}

/// Wraps [`BotState`] with time-in-state accounting and rejects illegal
/// transitions as no-ops instead of panicking (§8 property 1).
pub struct StateMachine {
    current: BotState,
    entered_at: Instant,
}

impl StateMachine {
    pub fn new(initial: BotState) -> Self {
        Self {
            current: initial,
            entered_at: Instant::now(),
        }
    }

    pub fn current(&self) -> BotState {
        self.current
    }

    pub fn time_in_state(&self) -> Duration {
        self.entered_at.elapsed()
    }

    /// Attempts a transition. Returns `true` on success (including the
    /// same-state no-op case, per §8: `transition(s)` when `current == s`
    /// is a no-op that returns success). Illegal transitions return `false`
    /// and leave the state unchanged; the caller logs the rejection.
    pub fn transition(&mut self, target: BotState) -> bool {
        if target == self.current {
            return true;
        }
        if !self.current.can_transition_to(target) {
            return false;
        }
        self.current = target;
        self.entered_at = Instant::now();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_state_transition_is_noop_success() {
        let mut sm = StateMachine::new(BotState::Walking);
        assert!(sm.transition(BotState::Walking));
        assert_eq!(sm.current(), BotState::Walking);
    }

    #[test]
    fn universal_targets_reachable_from_every_state() {
        for &state in &[
            BotState::Idle,
            BotState::Starting,
            BotState::Walking,
            BotState::Gathering,
            BotState::Combat,
            BotState::Banking,
            BotState::Eating,
            BotState::Looting,
            BotState::Recovering,
            BotState::Error,
            BotState::Break,
        ] {
            assert!(state.can_transition_to(BotState::Idle));
            assert!(state.can_transition_to(BotState::Error));
            assert!(state.can_transition_to(BotState::Stopping));
            assert!(state.can_transition_to(BotState::Break));
        }
    }

    #[test]
    fn illegal_transition_is_rejected_not_panicking() {
        let mut sm = StateMachine::new(BotState::Eating);
        assert!(!sm.transition(BotState::Looting));
        assert_eq!(sm.current(), BotState::Eating);
    }

    #[test]
    fn gathering_to_banking_is_legal() {
        let mut sm = StateMachine::new(BotState::Gathering);
        assert!(sm.transition(BotState::Banking));
        assert_eq!(sm.current(), BotState::Banking);
    }

    #[test]
    fn stopping_has_no_outgoing_table_targets_but_allows_universal() {
        let mut sm = StateMachine::new(BotState::Stopping);
        assert!(!sm.transition(BotState::Walking));
        assert!(sm.transition(BotState::Idle));
    }
}
