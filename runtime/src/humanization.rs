//! Fatigue model, idle micro-actions, and break scheduling (§4.8).
//!
//! Generalizes the reference's anti-ban manager: randomized idle actions,
//! a monotonically creeping fatigue level that scales every post-action
//! delay, and scheduled idle/logout breaks. Where the reference dispatches
//! idle actions through a `random.choice` over bound methods, this picks a
//! tagged [`IdleAction`] variant instead, keeping the dispatch exhaustive.

use std::thread::sleep;
use std::time::{Duration, Instant};

use rand::Rng;

use core::constants::{FATIGUE_DELAY_COEFFICIENT, FATIGUE_INCREMENT_PER_ACTION, REACTION_DELAY_FATIGUE_COEFFICIENT, REACTION_DELAY_MS_RANGE};
use core::types::{Break, BreakKind, Region, RuntimeConfig};

use crate::camera::CameraController;
use crate::helpers::{jitter_duration, scale_by_fatigue};
use crate::input::{InputBackend, InputSynthesizer};

/// One of the idle micro-actions performed between work cycles (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleAction {
    RandomMouseMovement,
    CheckStatsTab,
    RandomCameraAngle,
    HoverRandomLocation,
}

impl IdleAction {
    fn choose(rng: &mut impl Rng) -> Self {
        match rng.gen_range(0..4) {
            0 => IdleAction::RandomMouseMovement,
            1 => IdleAction::CheckStatsTab,
            2 => IdleAction::RandomCameraAngle,
            _ => IdleAction::HoverRandomLocation,
        }
    }
}

/// Tracks fatigue, idle-action cadence, and upcoming breaks for one run.
pub struct Humanization {
    fatigue: f64,
    last_idle_action: Instant,
    idle_freq_range: (Duration, Duration),
    idle_dur_range: (Duration, Duration),
    next_idle_break: Option<Break>,
    next_logout_break: Option<Break>,
    game_area: Region,
}

impl Humanization {
    pub fn new(config: &RuntimeConfig, game_area: Region) -> Self {
        let mins = |m: f64| Duration::from_secs_f64(m * 60.0);
        Self {
            fatigue: 0.0,
            last_idle_action: Instant::now(),
            idle_freq_range: (mins(config.idle_break_freq_min_minutes), mins(config.idle_break_freq_max_minutes)),
            idle_dur_range: (mins(config.idle_break_dur_min_minutes), mins(config.idle_break_dur_max_minutes)),
            next_idle_break: None,
            next_logout_break: None,
            game_area,
        }
    }

    pub fn fatigue(&self) -> f64 {
        self.fatigue
    }

    /// Increments fatigue by one action's worth, clamped to `[0, 1]` (§4.8).
    pub fn record_action(&mut self) {
        self.fatigue = (self.fatigue + FATIGUE_INCREMENT_PER_ACTION).min(1.0);
    }

    /// Resets fatigue to zero, as happens after a completed break (§4.8).
    pub fn reset_fatigue(&mut self) {
        self.fatigue = 0.0;
    }

    /// Blocks for a humanized reaction delay before acting on new
    /// information, scaled up as fatigue accumulates.
    pub fn reaction_delay(&self, rng: &mut impl Rng) {
        let (lo, hi) = REACTION_DELAY_MS_RANGE;
        let base = jitter_duration(Duration::from_millis(lo), Duration::from_millis(hi), rng);
        let scaled = scale_by_fatigue(base, self.fatigue, REACTION_DELAY_FATIGUE_COEFFICIENT);
        sleep(scaled);
    }

    /// Blocks for a post-action settle delay, scaled by fatigue.
    pub fn post_action_delay(&self, base: Duration, rng: &mut impl Rng) {
        let jittered = jitter_duration(base, base + Duration::from_millis(200), rng);
        sleep(scale_by_fatigue(jittered, self.fatigue, FATIGUE_DELAY_COEFFICIENT));
    }

    /// Whether enough time has elapsed to perform another idle action.
    pub fn should_perform_idle_action(&self, rng: &mut impl Rng) -> bool {
        let threshold = jitter_duration(self.idle_freq_range.0, self.idle_freq_range.1, rng);
        self.last_idle_action.elapsed() >= threshold
    }

    /// Performs one randomly chosen idle micro-action (§4.8).
    pub fn perform_idle_action<B: InputBackend>(
        &mut self,
        camera: &CameraController,
        input: &mut InputSynthesizer<B>,
        rng: &mut impl Rng,
    ) {
        match IdleAction::choose(rng) {
            IdleAction::RandomMouseMovement | IdleAction::HoverRandomLocation => {
                let target = self.game_area.random_interior_point(rng);
                input.move_to(target, target, Duration::from_millis(200), 0.3, rng);
                sleep(jitter_duration(Duration::from_millis(300), Duration::from_secs(2), rng));
            }
            IdleAction::CheckStatsTab => {
                input.tap("F1", None);
                sleep(jitter_duration(Duration::from_secs(1), Duration::from_secs(3), rng));
                input.tap("F4", None);
                sleep(jitter_duration(Duration::from_millis(300), Duration::from_millis(600), rng));
            }
            IdleAction::RandomCameraAngle => {
                let center = self.game_area.center();
                let _ = camera;
                let drag_to = (center.0 + rng.gen_range(-100..=100), center.1 + rng.gen_range(-50..=50));
                input.drag_middle(center, drag_to, Duration::from_millis(300), 0.2, rng);
            }
        }

        self.last_idle_action = Instant::now();
        self.record_action();
    }

    /// Schedules the next idle break, sampling the wait-until-due interval
    /// from the configured cadence range; the break's own duration is
    /// sampled separately, once it actually starts, via
    /// [`Humanization::sample_break_duration`].
    pub fn schedule_next_idle_break(&mut self, rng: &mut impl Rng) {
        let due_in = jitter_duration(self.idle_freq_range.0, self.idle_freq_range.1, rng);
        self.next_idle_break = Some(Break::new(BreakKind::Idle, due_in, "scheduled_break"));
    }

    /// Samples how long an idle break should actually last, once due.
    pub fn sample_break_duration(&self, rng: &mut impl Rng) -> Duration {
        jitter_duration(self.idle_dur_range.0, self.idle_dur_range.1, rng)
    }

    pub fn schedule_next_logout_break(&mut self, duration: Duration) {
        self.next_logout_break = Some(Break::new(BreakKind::Logout, duration, "scheduled_logout"));
    }

    /// Returns the break due to start now, preferring a pending logout break
    /// over an idle one (§4.8 priority rule).
    pub fn due_break(&self) -> Option<&Break> {
        if let Some(b) = &self.next_logout_break {
            return Some(b);
        }
        self.next_idle_break.as_ref()
    }

    pub fn clear_idle_break(&mut self) {
        self.next_idle_break = None;
    }

    pub fn clear_logout_break(&mut self) {
        self.next_logout_break = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn humanization() -> Humanization {
        Humanization::new(&RuntimeConfig::default(), Region::new(0, 0, 765, 503, 0))
    }

    #[test]
    fn fatigue_accumulates_and_clamps_at_one() {
        let mut h = humanization();
        for _ in 0..2000 {
            h.record_action();
        }
        assert!((h.fatigue() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn logout_break_takes_priority_over_idle() {
        let mut h = humanization();
        h.schedule_next_idle_break(&mut rand::thread_rng());
        h.schedule_next_logout_break(Duration::from_secs(5));
        assert_eq!(h.due_break().unwrap().kind, BreakKind::Logout);
    }

    #[test]
    fn no_break_scheduled_means_none_due() {
        let h = humanization();
        assert!(h.due_break().is_none());
    }

    #[test]
    fn reset_fatigue_returns_to_zero() {
        let mut h = humanization();
        h.record_action();
        h.reset_fatigue();
        assert_eq!(h.fatigue(), 0.0);
    }
}
