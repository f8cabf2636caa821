//! Closed-loop camera rotation/zoom controller (§4.6).

use std::thread::sleep;
use std::time::Duration;

use rand::Rng;

use core::constants::{
    CAMERA_DRAG_SUCCESS_THRESHOLD_PX, CAMERA_LARGE_DRAG_THRESHOLD_PX, CAMERA_MAX_ATTEMPTS,
    CAMERA_MAX_STUCK_READINGS, CAMERA_SCROLL_CLAMP, CAMERA_SCROLL_UNITS_PER_SCALE,
    CAMERA_ZOOM_IN_THRESHOLD, CAMERA_ZOOM_TARGET_RANGE,
};
use core::types::{CameraRotationFeedback, Region};

use crate::input::{InputBackend, InputSynthesizer};
use crate::telemetry::TelemetryClient;

/// Moves the camera until `(x, y, plane)` is in the viewport, or gives up
/// after `CAMERA_MAX_ATTEMPTS` (§4.6).
pub struct CameraController {
    viewport_center: (i32, i32),
    game_area: Region,
}

impl CameraController {
    pub fn new(viewport_center: (i32, i32), game_area: Region) -> Self {
        Self {
            viewport_center,
            game_area,
        }
    }

    pub fn rotate_to_visible<B: InputBackend>(
        &self,
        telemetry: &TelemetryClient,
        input: &mut InputSynthesizer<B>,
        x: i32,
        y: i32,
        plane: i8,
        rng: &mut impl Rng,
    ) -> bool {
        let mut stuck_readings = 0u32;
        let mut last_yaw_pitch: Option<(i32, i32)> = None;

        for attempt in 0..CAMERA_MAX_ATTEMPTS {
            let Some(feedback) = telemetry.camera_rotation_to(x, y, plane) else {
                return false;
            };
            if feedback.visible {
                return true;
            }

            if attempt == 0 && feedback.current_scale >= CAMERA_ZOOM_IN_THRESHOLD {
                self.zoom_out(telemetry, input, x, y, plane, rng);
            }

            if last_yaw_pitch == Some((feedback.current_yaw, feedback.current_pitch)) {
                stuck_readings += 1;
                if stuck_readings >= CAMERA_MAX_STUCK_READINGS {
                    return false;
                }
            } else {
                stuck_readings = 0;
            }
            last_yaw_pitch = Some((feedback.current_yaw, feedback.current_pitch));

            if (feedback.drag_pixels_x.abs() as f64) < CAMERA_DRAG_SUCCESS_THRESHOLD_PX
                && (feedback.drag_pixels_y.abs() as f64) < CAMERA_DRAG_SUCCESS_THRESHOLD_PX
            {
                return true;
            }

            self.drag(input, &feedback, rng);
            sleep(Duration::from_millis(rng.gen_range(400..=600)));
        }

        false
    }

    /// Scrolls toward a random target within the "comfortable" zoom band,
    /// re-verifying via telemetry with up to two retries.
    fn zoom_out<B: InputBackend>(
        &self,
        telemetry: &TelemetryClient,
        input: &mut InputSynthesizer<B>,
        x: i32,
        y: i32,
        plane: i8,
        rng: &mut impl Rng,
    ) {
        for _ in 0..=2 {
            let Some(feedback) = telemetry.camera_rotation_to(x, y, plane) else {
                return;
            };
            if feedback.current_scale < CAMERA_ZOOM_IN_THRESHOLD {
                return;
            }

            let (lo, hi) = CAMERA_ZOOM_TARGET_RANGE;
            let target = rng.gen_range(lo..=hi);
            let base_delta = (target - feedback.current_scale) * CAMERA_SCROLL_UNITS_PER_SCALE;
            let jitter = 1.0 + rng.gen_range(-0.10..=0.10);
            let delta = ((base_delta as f64) * jitter)
                .round()
                .clamp(-CAMERA_SCROLL_CLAMP as f64, CAMERA_SCROLL_CLAMP as f64) as i32;

            input.move_to(
                self.viewport_center,
                self.viewport_center,
                Duration::from_millis(80),
                0.1,
                rng,
            );
            input.scroll_wheel(delta, rng);
            sleep(Duration::from_millis(rng.gen_range(1200..=1800)));
        }
    }

    /// Executes the feedback-supplied drag vector as one diagonal MMB drag,
    /// or several segments if it exceeds the large-drag threshold.
    fn drag<B: InputBackend>(
        &self,
        input: &mut InputSynthesizer<B>,
        feedback: &CameraRotationFeedback,
        rng: &mut impl Rng,
    ) {
        let jitter_axis = |v: i32, rng: &mut dyn rand::RngCore| {
            (v as f64 * (1.0 + rng.gen_range(-0.07..=0.07))) as i32
        };
        let dx = jitter_axis(feedback.drag_pixels_x, rng);
        let dy = jitter_axis(feedback.drag_pixels_y, rng);
        let magnitude = ((dx * dx + dy * dy) as f64).sqrt();

        let segments = if magnitude > CAMERA_LARGE_DRAG_THRESHOLD_PX {
            (magnitude / CAMERA_LARGE_DRAG_THRESHOLD_PX).ceil().max(2.0) as i32
        } else {
            1
        };

        let seg_dx = dx / segments;
        let seg_dy = dy / segments;

        for i in 0..segments {
            let origin = self.randomized_origin(rng);
            let end = self.clamp_to_game_area((origin.0 + seg_dx, origin.1 + seg_dy));
            input.drag_middle(origin, end, Duration::from_millis(180), 0.2, rng);
            if i + 1 < segments {
                sleep(Duration::from_millis(rng.gen_range(100..=200)));
            }
        }
    }

    fn randomized_origin(&self, rng: &mut impl Rng) -> (i32, i32) {
        let (cx, cy) = self.viewport_center;
        self.clamp_to_game_area((cx + rng.gen_range(-20..=20), cy + rng.gen_range(-20..=20)))
    }

    fn clamp_to_game_area(&self, (x, y): (i32, i32)) -> (i32, i32) {
        self.game_area.clamp_point(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_to_game_area_keeps_points_inside() {
        let controller = CameraController::new((400, 300), Region::new(0, 0, 800, 600, 0));
        let clamped = controller.clamp_to_game_area((-50, 900));
        assert_eq!(clamped, (0, 600));
    }

    #[test]
    fn randomized_origin_stays_within_game_area() {
        let controller = CameraController::new((10, 10), Region::new(0, 0, 20, 20, 0));
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let (x, y) = controller.randomized_origin(&mut rng);
            assert!((0..=20).contains(&x) && (0..=20).contains(&y));
        }
    }
}
