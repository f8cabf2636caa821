//! Run-level statistics accumulator (§3.1).
//!
//! Printed by the error handler's emergency-shutdown sequence and by a
//! normal graceful exit, matching the reference's end-of-run summary.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct RunStatistics {
    pub cycles_run: u64,
    pub resources_gathered: u64,
    pub kills: u64,
    pub bank_trips: u64,
    pub breaks_taken: u64,
    pub food_eaten: u64,
    pub escapes: u64,
    pub errors_by_kind: HashMap<&'static str, u64>,
    started_at: Instant,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self {
            cycles_run: 0,
            resources_gathered: 0,
            kills: 0,
            bank_trips: 0,
            breaks_taken: 0,
            food_eaten: 0,
            escapes: 0,
            errors_by_kind: HashMap::new(),
            started_at: Instant::now(),
        }
    }

    pub fn record_cycle(&mut self) {
        self.cycles_run += 1;
    }

    pub fn record_resource_gathered(&mut self) {
        self.resources_gathered += 1;
    }

    pub fn record_kill(&mut self) {
        self.kills += 1;
    }

    pub fn record_bank_trip(&mut self) {
        self.bank_trips += 1;
    }

    pub fn record_break(&mut self) {
        self.breaks_taken += 1;
    }

    pub fn record_food_eaten(&mut self) {
        self.food_eaten += 1;
    }

    pub fn record_escape(&mut self) {
        self.escapes += 1;
    }

    pub fn record_error(&mut self, kind_tag: &'static str) {
        *self.errors_by_kind.entry(kind_tag).or_insert(0) += 1;
    }

    pub fn total_errors(&self) -> u64 {
        self.errors_by_kind.values().sum()
    }

    pub fn session_duration(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Human-readable end-of-run summary, as printed on graceful exit and
    /// on emergency shutdown (§7 "User-visible failure behavior").
    pub fn summary(&self) -> String {
        format!(
            "cycles={} resources={} kills={} bank_trips={} breaks={} food_eaten={} escapes={} errors={} duration={:?}",
            self.cycles_run,
            self.resources_gathered,
            self.kills,
            self.bank_trips,
            self.breaks_taken,
            self.food_eaten,
            self.escapes,
            self.total_errors(),
            self.session_duration(),
        )
    }
}

impl Default for RunStatistics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_counts_accumulate_by_kind() {
        let mut stats = RunStatistics::new();
        stats.record_error("telemetry_unavailable");
        stats.record_error("telemetry_unavailable");
        stats.record_error("combat_lost");
        assert_eq!(stats.total_errors(), 3);
        assert_eq!(stats.errors_by_kind["telemetry_unavailable"], 2);
    }

    #[test]
    fn summary_includes_counters() {
        let mut stats = RunStatistics::new();
        stats.record_cycle();
        stats.record_kill();
        let summary = stats.summary();
        assert!(summary.contains("cycles=1"));
        assert!(summary.contains("kills=1"));
    }
}
