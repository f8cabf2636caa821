//! Top-level runtime: owns every subsystem and drives the state-dispatch
//! loop (§4.9, §4.10, §9).
//!
//! The reference threads a singleton `GlobalErrorHandler` and a bot-subclass
//! `self.osrs` god-object through module-level state. Per the design notes
//! this collapses into one owned [`Runtime`] struct, constructed once at
//! startup and passed explicitly rather than reached for as ambient state.

use std::time::Duration;

use rand::rngs::ThreadRng;
use rand::Rng;

use core::error::BotError;
use core::types::{BotState, Region, RuntimeConfig, WorldCoord};

use crate::bot_loop::{run_banking_cycle, run_combat_cycle, run_gathering_cycle, run_walking_cycle, CycleContext};
use crate::camera::CameraController;
use crate::collision::CollisionMap;
use crate::error_handler::{ErrorHandler, ErrorOutcome};
use crate::humanization::Humanization;
use crate::input::{InputBackend, InputSynthesizer};
use crate::interactor::EntityInteractor;
use crate::navigator::{MinimapGeometry, Navigator};
use crate::pathfinder::{Pathfinder, VarianceLevel};
use crate::policy::Policy;
use crate::state_machine::BotStateMachine;
use crate::telemetry::TelemetryClient;

/// Owns every subsystem for one bot run and dispatches cycles by state.
pub struct Runtime<B: InputBackend> {
    telemetry: TelemetryClient,
    input: InputSynthesizer<B>,
    collision: CollisionMap,
    pathfinder: Pathfinder,
    navigator: Navigator,
    camera: CameraController,
    interactor: EntityInteractor,
    humanization: Humanization,
    state_machine: BotStateMachine,
    error_handler: ErrorHandler,
    stats: core::types::RunStatistics,
    policy: Policy,
    rng: ThreadRng,
    running: bool,
    /// Set while the combat escape path is unwinding, so the next `Walking`
    /// dispatch heads to the bank instead of back to the work area.
    escaping: bool,
}

impl<B: InputBackend> Runtime<B> {
    pub fn new(config: &RuntimeConfig, backend: B, policy: Policy, game_area: Region) -> Result<Self, BotError> {
        policy.validate().map_err(|reason| BotError::ConfigInvalid { reason })?;

        let telemetry = TelemetryClient::new(config.telemetry_base_url.clone(), Duration::from_millis(config.telemetry_timeout_ms));
        let collision = CollisionMap::open(config.collision_archive_path.clone(), config.collision_cache_cap)?;
        let pathfinder = Pathfinder::new(config.path_cache_cap, VarianceLevel::Moderate);

        let viewport_center = game_area.center();
        let mut geometry = MinimapGeometry::default();
        geometry.px_per_tile = config.minimap_px_per_tile;

        Ok(Self {
            telemetry,
            input: InputSynthesizer::new(backend),
            collision,
            pathfinder,
            navigator: Navigator::new(geometry),
            camera: CameraController::new(viewport_center, game_area.clone()),
            interactor: EntityInteractor::new(game_area.clone()),
            humanization: Humanization::new(config, game_area),
            state_machine: BotStateMachine::new(BotState::Idle),
            error_handler: ErrorHandler::new(),
            stats: core::types::RunStatistics::new(),
            policy,
            rng: rand::thread_rng(),
            running: false,
            escaping: false,
        })
    }

    pub fn current_state(&self) -> BotState {
        self.state_machine.current()
    }

    pub fn stats(&self) -> &core::types::RunStatistics {
        &self.stats
    }

    /// Drives the bot until `running` is cleared, either by an emergency
    /// shutdown or by `external_stop` (set from a signal handler on another
    /// thread; checked once per cycle, matching the reference's
    /// `while !quit_flag.load(...)` main loop).
    pub fn run(&mut self, external_stop: &std::sync::atomic::AtomicBool) {
        use std::sync::atomic::Ordering;

        self.running = true;
        self.state_machine.transition(BotState::Starting);
        self.state_machine.transition(BotState::Walking);

        while self.running && !external_stop.load(Ordering::SeqCst) {
            self.run_cycle();
            self.stats.record_cycle();
        }

        log::info!("run finished: {}", self.stats.summary());
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    fn run_cycle(&mut self) {
        if self.humanization.due_break().is_none() {
            self.humanization.schedule_next_idle_break(&mut self.rng);
        }

        if let Some(due) = self.humanization.due_break() {
            if due.is_elapsed() {
                log::info!("break elapsed: {}", due.reason.clone());
                self.state_machine.transition(BotState::Break);
                self.humanization.clear_idle_break();
                self.humanization.clear_logout_break();

                let duration = self.humanization.sample_break_duration(&mut self.rng);
                self.run_break(duration);

                self.stats.record_break();
                self.humanization.reset_fatigue();

                // A break can only lead back into `Starting`, from which
                // `Walking` is legal (mirrors the startup sequence in `run`).
                self.state_machine.transition(BotState::Starting);
                self.state_machine.transition(BotState::Walking);
            }
        }

        let result = self.dispatch();
        if let Err(error) = result {
            self.handle_error(&error);
        }
    }

    /// Blocks out the full break duration, occasionally performing an idle
    /// micro-action to look like the client is still attended (§4.8).
    fn run_break(&mut self, duration: Duration) {
        let deadline = std::time::Instant::now() + duration;
        while std::time::Instant::now() < deadline {
            let tick = Duration::from_secs(self.rng.gen_range(10..=30));
            std::thread::sleep(tick.min(deadline.saturating_duration_since(std::time::Instant::now())));
            if self.rng.gen_bool(0.30) {
                self.humanization.perform_idle_action(&self.camera, &mut self.input, &mut self.rng);
            }
        }
    }

    fn dispatch(&mut self) -> Result<(), BotError> {
        let mut ctx = CycleContext {
            telemetry: &self.telemetry,
            input: &mut self.input,
            collision: &mut self.collision,
            pathfinder: &mut self.pathfinder,
            navigator: &mut self.navigator,
            camera: &self.camera,
            interactor: &self.interactor,
            humanization: &mut self.humanization,
            stats: &mut self.stats,
        };

        let next = match (&self.policy, self.state_machine.current()) {
            (Policy::Gathering(policy), BotState::Gathering) => run_gathering_cycle(&mut ctx, policy, &mut self.rng)?,
            (Policy::Gathering(policy), BotState::Banking) => {
                run_banking_cycle(&mut ctx, BotState::Gathering, &mut self.rng).or_else(|_| {
                    run_walking_cycle(&mut ctx, work_area_goal(policy.path_to_bank()), BotState::Banking, &mut self.rng)
                })?
            }
            (Policy::Gathering(policy), BotState::Walking) => {
                run_walking_cycle(&mut ctx, work_area_goal(policy.path_to_work_area()), BotState::Gathering, &mut self.rng)?
            }
            (Policy::Combat(policy), BotState::Combat) => run_combat_cycle(&mut ctx, policy, &mut self.rng)?,
            (Policy::Combat(policy), BotState::Banking) => {
                run_banking_cycle(&mut ctx, BotState::Combat, &mut self.rng).or_else(|_| {
                    run_walking_cycle(&mut ctx, work_area_goal(policy.path_to_bank()), BotState::Banking, &mut self.rng)
                })?
            }
            (Policy::Combat(policy), BotState::Walking) if self.escaping => {
                self.escaping = false;
                run_walking_cycle(&mut ctx, work_area_goal(policy.path_to_bank()), BotState::Banking, &mut self.rng)?
            }
            (Policy::Combat(policy), BotState::Walking) => {
                run_walking_cycle(&mut ctx, work_area_goal(policy.path_to_work_area()), BotState::Combat, &mut self.rng)?
            }
            (Policy::Combat(policy), BotState::Eating) => run_combat_cycle(&mut ctx, policy, &mut self.rng)?,
            (_, BotState::Idle) => {
                self.state_machine.transition(BotState::Starting);
                self.state_machine.transition(BotState::Walking);
                self.state_machine.current()
            }
            (_, BotState::Recovering) | (_, BotState::Error) | (_, BotState::Stopping) | (_, BotState::Break) => {
                std::thread::sleep(Duration::from_millis(250));
                self.state_machine.current()
            }
            (_, other) => {
                log::warn!("no cycle handler for state {other:?}");
                std::thread::sleep(Duration::from_secs(1));
                other
            }
        };

        self.error_handler.record_success(state_tag(self.state_machine.current()));
        self.state_machine.transition(next);
        Ok(())
    }

    fn handle_error(&mut self, error: &BotError) {
        let is_escape = error.kind_tag() == "combat_escape";

        let telemetry = &self.telemetry;
        let outcome = self.error_handler.handle(
            error,
            &mut self.state_machine,
            &mut self.running,
            &self.stats,
            || {
                let _ = telemetry.widgets();
            },
            |timeout| {
                std::thread::sleep(timeout.min(Duration::from_secs(1)));
                true
            },
        );

        if outcome == ErrorOutcome::Recovered {
            if is_escape {
                self.escaping = true;
            }
            // `Recovering`'s only legal targets are `Idle`/`Error`; the next
            // `dispatch()` call resumes the walk from `Idle`.
            self.state_machine.transition(BotState::Idle);
        }
    }
}

/// Picks the final destination of a multi-leg path for the walking handler;
/// intermediate interactions/custom actions are not yet modeled by the
/// walking cycle, which only drives the pathfinder/navigator toward a
/// single goal tile per call.
fn work_area_goal(path: &core::types::NavigationPath) -> WorldCoord {
    path.steps.last().map(|s| s.goal).unwrap_or(WorldCoord::new(0, 0, 0))
}

/// Stable tag for a completed state's cycle, used to reset the error
/// handler's consecutive-failure streak for that activity on success.
fn state_tag(state: BotState) -> &'static str {
    match state {
        BotState::Idle => "state_idle",
        BotState::Starting => "state_starting",
        BotState::Walking => "state_walking",
        BotState::Gathering => "state_gathering",
        BotState::Combat => "state_combat",
        BotState::Banking => "state_banking",
        BotState::Eating => "state_eating",
        BotState::Looting => "state_looting",
        BotState::Recovering => "state_recovering",
        BotState::Error => "state_error",
        BotState::Break => "state_break",
        BotState::Stopping => "state_stopping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_area_goal_falls_back_to_origin_on_empty_path() {
        let path = core::types::NavigationPath::default();
        assert_eq!(work_area_goal(&path), WorldCoord::new(0, 0, 0));
    }
}
