//! Bounded error log, consecutive-failure tracking, and the
//! emergency-shutdown sequence (§4.11, §7).
//!
//! The reference keeps a process-wide singleton `GlobalErrorHandler`; here
//! it is an owned instance threaded through the runtime explicitly (§9
//! design notes), constructed once at startup and held by [`crate::runtime::Runtime`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use core::constants::{CONSECUTIVE_FAILURE_ESCALATION_THRESHOLD, LOGOUT_TIMEOUT, MAX_ERROR_LOG_ENTRIES};
use core::error::{BotError, Severity};
use core::types::{BotState, RunStatistics};

use crate::state_machine::BotStateMachine;

/// One recorded error occurrence, kept for diagnostics only.
#[derive(Debug, Clone)]
pub struct ErrorLogEntry {
    pub kind_tag: &'static str,
    pub message: String,
    pub severity: Severity,
    pub at: Instant,
}

/// Outcome of handling one error, for the bot loop's dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOutcome {
    /// Non-fatal; caller may retry the current task.
    Recovered,
    /// Emergency shutdown ran; the caller must stop.
    ShutDown,
}

/// Bounded in-memory error log plus consecutive-same-task-failure tracking
/// and the emergency-shutdown procedure (§4.11).
pub struct ErrorHandler {
    log: Vec<ErrorLogEntry>,
    consecutive_by_tag: HashMap<&'static str, u32>,
    shutdown_triggered: bool,
}

impl ErrorHandler {
    pub fn new() -> Self {
        Self {
            log: Vec::new(),
            consecutive_by_tag: HashMap::new(),
            shutdown_triggered: false,
        }
    }

    /// Records a non-failing occurrence of `tag` resetting its consecutive
    /// streak, called by the bot loop after a successful task.
    pub fn record_success(&mut self, tag: &'static str) {
        self.consecutive_by_tag.insert(tag, 0);
    }

    fn bump_consecutive(&mut self, tag: &'static str) -> u32 {
        let count = self.consecutive_by_tag.entry(tag).or_insert(0);
        *count += 1;
        *count
    }

    fn log_error(&mut self, error: &BotError) {
        self.log.push(ErrorLogEntry {
            kind_tag: error.kind_tag(),
            message: error.to_string(),
            severity: error.severity(),
            at: Instant::now(),
        });
        if self.log.len() > MAX_ERROR_LOG_ENTRIES {
            self.log.remove(0);
        }
    }

    pub fn log(&self) -> &[ErrorLogEntry] {
        &self.log
    }

    /// Handles one error: logs it, escalates severity on a consecutive
    /// failure streak, and runs emergency shutdown when warranted.
    ///
    /// `running` is the bot's run flag, `stats` the run's statistics
    /// accumulator — both mutated during emergency shutdown per §4.11 steps
    /// 1 and 6. `close_interfaces` and `logout` are the runtime's own
    /// collaborators, passed as closures so this module stays free of a
    /// direct telemetry/input dependency.
    pub fn handle(
        &mut self,
        error: &BotError,
        state_machine: &mut BotStateMachine,
        running: &mut bool,
        stats: &RunStatistics,
        close_interfaces: impl FnOnce(),
        logout: impl FnOnce(Duration) -> bool,
    ) -> ErrorOutcome {
        self.log_error(error);
        log::error!("error detected: {error} (severity={})", error.severity());

        let consecutive = self.bump_consecutive(error.kind_tag());
        let severity = error.severity().max(if consecutive >= CONSECUTIVE_FAILURE_ESCALATION_THRESHOLD {
            Severity::High
        } else {
            Severity::Low
        });

        if severity >= Severity::High {
            self.emergency_shutdown(state_machine, running, stats, close_interfaces, logout);
            ErrorOutcome::ShutDown
        } else {
            self.attempt_recovery(state_machine, close_interfaces);
            ErrorOutcome::Recovered
        }
    }

    /// Non-fatal recovery: close any open interface and transition through
    /// `Recovering` before the caller retries (§4.11 step "attempt_recovery").
    /// `Recovering` is only reachable from `Error`, so this routes through
    /// it first rather than jumping there directly.
    fn attempt_recovery(&self, state_machine: &mut BotStateMachine, close_interfaces: impl FnOnce()) {
        log::warn!("attempting error recovery");
        close_interfaces();
        state_machine.transition(BotState::Error);
        state_machine.transition(BotState::Recovering);
    }

    /// The six-step emergency shutdown sequence: stop the run flag, close
    /// interfaces, attempt a time-boxed logout, walk the state machine
    /// Error -> Stopping -> Idle, and print final statistics (§4.11).
    fn emergency_shutdown(
        &mut self,
        state_machine: &mut BotStateMachine,
        running: &mut bool,
        stats: &RunStatistics,
        close_interfaces: impl FnOnce(),
        logout: impl FnOnce(Duration) -> bool,
    ) {
        if self.shutdown_triggered {
            log::warn!("emergency shutdown already in progress");
            return;
        }
        self.shutdown_triggered = true;

        log::error!("EMERGENCY SHUTDOWN INITIATED");

        *running = false;

        close_interfaces();

        if !logout(LOGOUT_TIMEOUT) {
            log::error!("logout failed or timed out during emergency shutdown");
        }

        state_machine.transition(BotState::Error);
        state_machine.transition(BotState::Stopping);
        state_machine.transition(BotState::Idle);

        log::info!("run summary: {}", stats.summary());
        log::error!("EMERGENCY SHUTDOWN COMPLETE");
    }

    pub fn is_shutdown_triggered(&self) -> bool {
        self.shutdown_triggered
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_severity_error_recovers_without_shutdown() {
        let mut handler = ErrorHandler::new();
        let mut sm = BotStateMachine::new(BotState::Gathering);
        let mut running = true;
        let stats = RunStatistics::new();
        let err = BotError::TelemetryUnavailable { endpoint: "/player" };

        let outcome = handler.handle(&err, &mut sm, &mut running, &stats, || {}, |_| true);

        assert_eq!(outcome, ErrorOutcome::Recovered);
        assert!(running);
        assert_eq!(sm.current(), BotState::Recovering);
    }

    #[test]
    fn three_consecutive_failures_escalate_to_shutdown() {
        let mut handler = ErrorHandler::new();
        let mut sm = BotStateMachine::new(BotState::Gathering);
        let mut running = true;
        let stats = RunStatistics::new();
        let err = BotError::TelemetryUnavailable { endpoint: "/player" };

        handler.handle(&err, &mut sm, &mut running, &stats, || {}, |_| true);
        handler.handle(&err, &mut sm, &mut running, &stats, || {}, |_| true);
        let outcome = handler.handle(&err, &mut sm, &mut running, &stats, || {}, |_| true);

        assert_eq!(outcome, ErrorOutcome::ShutDown);
        assert!(!running);
        assert_eq!(sm.current(), BotState::Idle);
    }

    #[test]
    fn combat_lost_is_high_severity_and_shuts_down_immediately() {
        let mut handler = ErrorHandler::new();
        let mut sm = BotStateMachine::new(BotState::Combat);
        let mut running = true;
        let stats = RunStatistics::new();

        let outcome = handler.handle(&BotError::CombatLost, &mut sm, &mut running, &stats, || {}, |_| true);

        assert_eq!(outcome, ErrorOutcome::ShutDown);
    }

    #[test]
    fn error_log_is_capped() {
        let mut handler = ErrorHandler::new();
        let mut sm = BotStateMachine::new(BotState::Gathering);
        let mut running = true;
        let stats = RunStatistics::new();
        for _ in 0..150 {
            handler.log_error(&BotError::TelemetryUnavailable { endpoint: "/player" });
        }
        assert_eq!(handler.log().len(), MAX_ERROR_LOG_ENTRIES);
        let _ = (&mut sm, &mut running, &stats);
    }

    #[test]
    fn recovered_run_can_resume_walking_after_idle() {
        let mut handler = ErrorHandler::new();
        let mut sm = BotStateMachine::new(BotState::Gathering);
        let mut running = true;
        let stats = RunStatistics::new();
        let err = BotError::TelemetryUnavailable { endpoint: "/player" };

        let outcome = handler.handle(&err, &mut sm, &mut running, &stats, || {}, |_| true);
        assert_eq!(outcome, ErrorOutcome::Recovered);
        assert_eq!(sm.current(), BotState::Recovering);

        assert!(sm.transition(BotState::Idle));
        assert!(sm.transition(BotState::Starting));
        assert!(sm.transition(BotState::Walking));
    }

    #[test]
    fn record_success_resets_consecutive_streak() {
        let mut handler = ErrorHandler::new();
        let mut sm = BotStateMachine::new(BotState::Gathering);
        let mut running = true;
        let stats = RunStatistics::new();
        let err = BotError::TelemetryUnavailable { endpoint: "/player" };

        handler.handle(&err, &mut sm, &mut running, &stats, || {}, |_| true);
        handler.record_success(err.kind_tag());
        let outcome = handler.handle(&err, &mut sm, &mut running, &stats, || {}, |_| true);
        assert_eq!(outcome, ErrorOutcome::Recovered);
    }
}
