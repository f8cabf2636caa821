//! Waypoint walking over the telemetry/input/pathfinder seam (§4.5).

use std::thread::sleep;
use std::time::{Duration, Instant};

use rand::Rng;

use core::constants::{
    ARRIVAL_TOLERANCE_TILES, DEFAULT_MINIMAP_PX_PER_TILE, DEFAULT_MINIMAP_RADIUS_PX,
    MAX_STUCK_EVENTS_PER_JOURNEY, MINIMAP_CLICK_RANGE_TILES, STUCK_DETECTION_WINDOW,
    STUCK_MIN_SAMPLES, WAYPOINT_ARRIVAL_TIMEOUT,
};
use core::error::BotError;
use core::types::WorldCoord;

use crate::collision::CollisionMap;
use crate::input::{InputBackend, InputSynthesizer, MouseButton};
use crate::pathfinder::Pathfinder;
use crate::telemetry::TelemetryClient;

/// Screen-space location and radius of the minimap, in client pixels.
#[derive(Debug, Clone, Copy)]
pub struct MinimapGeometry {
    pub center_x: f64,
    pub center_y: f64,
    pub radius_px: f64,
    pub px_per_tile: f64,
}

impl Default for MinimapGeometry {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            radius_px: DEFAULT_MINIMAP_RADIUS_PX,
            px_per_tile: DEFAULT_MINIMAP_PX_PER_TILE,
        }
    }
}

/// Converts a world-space tile delta and camera yaw into a minimap screen
/// point, or `None` if the computed point falls outside the circular
/// minimap.
fn minimap_click_point(
    delta_x: i32,
    delta_y: i32,
    yaw: i32,
    geometry: MinimapGeometry,
    rng: &mut impl Rng,
) -> Option<(i32, i32)> {
    let theta = (yaw as f64) * std::f64::consts::TAU / 2048.0;
    let (sin_t, cos_t) = (-theta).sin_cos();
    let rx = delta_x as f64 * cos_t - delta_y as f64 * sin_t;
    let ry = delta_x as f64 * sin_t + delta_y as f64 * cos_t;

    let px = rx * geometry.px_per_tile + rng.gen_range(-2.5..=2.5);
    let py = -ry * geometry.px_per_tile + rng.gen_range(-2.5..=2.5);

    if (px * px + py * py).sqrt() > geometry.radius_px {
        return None;
    }

    Some((
        (geometry.center_x + px).round() as i32,
        (geometry.center_y + py).round() as i32,
    ))
}

/// Synthesizes waypoints every 10-12 tiles along the straight line to
/// `goal`, used when pathfinding is unavailable or disabled.
fn linear_fallback_waypoints(from: WorldCoord, goal: WorldCoord, rng: &mut impl Rng) -> Vec<WorldCoord> {
    let total = from.chebyshev_distance(&goal);
    if total <= 0 {
        return vec![goal];
    }
    let step = rng.gen_range(10..=12);
    let count = (total + step - 1) / step;
    let mut waypoints = Vec::with_capacity(count as usize);
    for i in 1..=count {
        let t = (i as f64 / count as f64).min(1.0);
        let x = from.x + ((goal.x - from.x) as f64 * t).round() as i32;
        let y = from.y + ((goal.y - from.y) as f64 * t).round() as i32;
        waypoints.push(WorldCoord::new(x, y, from.plane));
    }
    waypoints
}

/// Greedily picks the farthest queued waypoint within minimap click range of
/// `from`, returning its index.
fn farthest_in_range(from: WorldCoord, waypoints: &[WorldCoord]) -> Option<usize> {
    waypoints
        .iter()
        .enumerate()
        .filter(|(_, w)| from.chebyshev_distance(w) <= MINIMAP_CLICK_RANGE_TILES)
        .last()
        .map(|(i, _)| i)
}

/// Stateful walker tracking per-journey stuck events across repeated
/// `walk_to` calls toward the same destination.
pub struct Navigator {
    stuck_events: u32,
    geometry: MinimapGeometry,
}

impl Navigator {
    pub fn new(geometry: MinimapGeometry) -> Self {
        Self {
            stuck_events: 0,
            geometry,
        }
    }

    pub fn reset_journey(&mut self) {
        self.stuck_events = 0;
    }

    pub fn stuck_events(&self) -> u32 {
        self.stuck_events
    }

    /// Walks toward `goal` on `plane`. Consumes and re-fills the pathfinder
    /// cache as needed; returns `Err` on unreachable goal, a full stuck
    /// budget, or telemetry loss.
    pub fn walk_to<B: InputBackend>(
        &mut self,
        telemetry: &TelemetryClient,
        input: &mut InputSynthesizer<B>,
        collision: &mut CollisionMap,
        pathfinder: &mut Pathfinder,
        goal: WorldCoord,
        plane: i8,
        use_pathfinding: bool,
        rng: &mut impl Rng,
    ) -> Result<(), BotError> {
        let start = current_position(telemetry, plane)?;
        if start.chebyshev_distance(&goal) <= ARRIVAL_TOLERANCE_TILES {
            return Ok(());
        }

        let mut waypoints = if use_pathfinding {
            match pathfinder.find_path(collision, start, goal, rng) {
                Some(path) if !path.is_empty() => path.steps.into_iter().map(|s| s.coord).collect(),
                _ => linear_fallback_waypoints(start, goal, rng),
            }
        } else {
            linear_fallback_waypoints(start, goal, rng)
        };

        while !waypoints.is_empty() {
            let here = current_position(telemetry, plane)?;
            if here.chebyshev_distance(&goal) <= ARRIVAL_TOLERANCE_TILES {
                return Ok(());
            }

            let Some(idx) = farthest_in_range(here, &waypoints) else {
                // Nothing queued is within minimap range yet; re-derive from
                // the straight line so we always have a reachable target.
                waypoints = linear_fallback_waypoints(here, goal, rng);
                continue;
            };
            let target = waypoints[idx];
            waypoints.drain(..=idx);

            if rng.gen_bool(0.20) {
                // Anti-pattern: occasionally re-path the remainder instead of
                // clicking straight through every waypoint.
                if let Some(path) = pathfinder.find_path(collision, here, goal, rng) {
                    waypoints = path.steps.into_iter().map(|s| s.coord).collect();
                }
                continue;
            }

            self.click_minimap_toward(telemetry, input, here, target, rng);
            let stuck_before = self.stuck_events;
            self.wait_for_arrival(telemetry, here, target, plane)?;

            if self.stuck_events > stuck_before {
                // Got stuck short of the hard-failure threshold: the cached
                // route probably runs into something the collision map
                // didn't know about, so drop it and re-path fresh.
                pathfinder.clear_cache();
                let here = current_position(telemetry, plane)?;
                waypoints = match pathfinder.find_path(collision, here, goal, rng) {
                    Some(path) if !path.is_empty() => path.steps.into_iter().map(|s| s.coord).collect(),
                    _ => linear_fallback_waypoints(here, goal, rng),
                };
            }
        }

        Ok(())
    }

    fn click_minimap_toward<B: InputBackend>(
        &self,
        telemetry: &TelemetryClient,
        input: &mut InputSynthesizer<B>,
        from: WorldCoord,
        target: WorldCoord,
        rng: &mut impl Rng,
    ) {
        let yaw = telemetry
            .camera()
            .map(|c| c.yaw)
            .unwrap_or(0);
        let delta_x = target.x - from.x;
        let delta_y = target.y - from.y;

        let Some((px, py)) = minimap_click_point(delta_x, delta_y, yaw, self.geometry, rng) else {
            return;
        };

        input.move_to((px, py), (px, py), Duration::from_millis(120), 0.2, rng);
        input.click(MouseButton::Left, rng);
    }

    /// Polls position until arrival, timeout, or a stuck streak; returns
    /// `Err(NavigationStuck)` once `MAX_STUCK_EVENTS_PER_JOURNEY` is hit.
    fn wait_for_arrival(
        &mut self,
        telemetry: &TelemetryClient,
        from: WorldCoord,
        target: WorldCoord,
        plane: i8,
    ) -> Result<(), BotError> {
        let deadline = Instant::now() + WAYPOINT_ARRIVAL_TIMEOUT;
        let mut samples: Vec<WorldCoord> = Vec::new();
        let mut window_start = Instant::now();

        while Instant::now() < deadline {
            let Ok(here) = current_position(telemetry, plane) else {
                sleep(Duration::from_secs(1));
                continue;
            };
            if here.chebyshev_distance(&target) <= ARRIVAL_TOLERANCE_TILES {
                return Ok(());
            }

            if samples.last() == Some(&here) {
                samples.push(here);
            } else {
                samples.clear();
                samples.push(here);
                window_start = Instant::now();
            }

            if samples.len() >= STUCK_MIN_SAMPLES && window_start.elapsed() >= STUCK_DETECTION_WINDOW {
                self.stuck_events += 1;
                if self.stuck_events >= MAX_STUCK_EVENTS_PER_JOURNEY {
                    return Err(BotError::NavigationStuck {
                        stuck_events: self.stuck_events,
                        near: here,
                    });
                }
                return Ok(());
            }

            sleep(Duration::from_secs(1));
        }

        let _ = from;
        Ok(())
    }
}

fn current_position(telemetry: &TelemetryClient, plane: i8) -> Result<WorldCoord, BotError> {
    telemetry
        .coords()
        .map(|c| WorldCoord::new(c.x, c.y, plane))
        .ok_or(BotError::TelemetryUnavailable { endpoint: "/coords" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn minimap_click_rejects_points_outside_radius() {
        let mut rng = StdRng::seed_from_u64(1);
        let geometry = MinimapGeometry {
            center_x: 0.0,
            center_y: 0.0,
            radius_px: 10.0,
            px_per_tile: 4.0,
        };
        let result = minimap_click_point(20, 20, 0, geometry, &mut rng);
        assert!(result.is_none());
    }

    #[test]
    fn minimap_click_zero_yaw_moves_toward_delta_direction() {
        let mut rng = StdRng::seed_from_u64(2);
        let geometry = MinimapGeometry::default();
        let (px, _py) = minimap_click_point(5, 0, 0, geometry, &mut rng).unwrap();
        assert!(px > 0);
    }

    #[test]
    fn linear_fallback_covers_the_distance() {
        let mut rng = StdRng::seed_from_u64(3);
        let from = WorldCoord::new(0, 0, 0);
        let goal = WorldCoord::new(50, 0, 0);
        let waypoints = linear_fallback_waypoints(from, goal, &mut rng);
        assert_eq!(waypoints.last(), Some(&goal));
        assert!(waypoints.len() >= 4);
    }

    #[test]
    fn farthest_in_range_picks_last_reachable() {
        let from = WorldCoord::new(0, 0, 0);
        let waypoints = vec![
            WorldCoord::new(5, 0, 0),
            WorldCoord::new(11, 0, 0),
            WorldCoord::new(30, 0, 0),
        ];
        assert_eq!(farthest_in_range(from, &waypoints), Some(1));
    }

    #[test]
    fn reset_journey_clears_stuck_counter() {
        let mut nav = Navigator::new(MinimapGeometry::default());
        nav.stuck_events = 2;
        nav.reset_journey();
        assert_eq!(nav.stuck_events(), 0);
    }
}
