//! Humanized OS-level mouse/keyboard synthesis (§4.2).
//!
//! [`InputBackend`] is the seam between humanized motion planning (this
//! module) and the actual OS injection primitives, which the specification
//! treats as an external collaborator. The `enigo`-backed implementation is
//! the production backend; tests use [`RecordingBackend`].

use std::thread::sleep;
use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MoveTo(i32, i32),
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    Scroll(i32),
    KeyTap(String),
    KeyDown(String),
    KeyUp(String),
    TypeChar(char),
}

/// Raw, unhumanized OS input primitives. Implementors perform no delay or
/// curve planning — that's [`InputSynthesizer`]'s job.
pub trait InputBackend {
    fn move_to(&mut self, x: i32, y: i32);
    fn mouse_down(&mut self, button: MouseButton);
    fn mouse_up(&mut self, button: MouseButton);
    fn scroll(&mut self, delta: i32);
    fn key_down(&mut self, key: &str);
    fn key_up(&mut self, key: &str);
    fn type_char(&mut self, c: char);
}

/// `enigo`-backed production input backend.
pub struct EnigoBackend {
    enigo: enigo::Enigo,
}

impl EnigoBackend {
    pub fn new() -> Result<Self, String> {
        let settings = enigo::Settings::default();
        let enigo = enigo::Enigo::new(&settings).map_err(|e| e.to_string())?;
        Ok(Self { enigo })
    }

    fn map_button(button: MouseButton) -> enigo::Button {
        match button {
            MouseButton::Left => enigo::Button::Left,
            MouseButton::Right => enigo::Button::Right,
            MouseButton::Middle => enigo::Button::Middle,
        }
    }
}

impl InputBackend for EnigoBackend {
    fn move_to(&mut self, x: i32, y: i32) {
        use enigo::Mouse;
        let _ = self.enigo.move_mouse(x, y, enigo::Coordinate::Abs);
    }

    fn mouse_down(&mut self, button: MouseButton) {
        use enigo::Mouse;
        let _ = self.enigo.button(Self::map_button(button), enigo::Direction::Press);
    }

    fn mouse_up(&mut self, button: MouseButton) {
        use enigo::Mouse;
        let _ = self
            .enigo
            .button(Self::map_button(button), enigo::Direction::Release);
    }

    fn scroll(&mut self, delta: i32) {
        use enigo::Mouse;
        let _ = self.enigo.scroll(delta, enigo::Axis::Vertical);
    }

    fn key_down(&mut self, key: &str) {
        use enigo::Keyboard;
        if let Some(k) = parse_key(key) {
            let _ = self.enigo.key(k, enigo::Direction::Press);
        }
    }

    fn key_up(&mut self, key: &str) {
        use enigo::Keyboard;
        if let Some(k) = parse_key(key) {
            let _ = self.enigo.key(k, enigo::Direction::Release);
        }
    }

    fn type_char(&mut self, c: char) {
        use enigo::Keyboard;
        let _ = self.enigo.text(&c.to_string());
    }
}

fn parse_key(key: &str) -> Option<enigo::Key> {
    match key {
        "F1" => Some(enigo::Key::F1),
        "F4" => Some(enigo::Key::F4),
        "Enter" => Some(enigo::Key::Return),
        "Escape" => Some(enigo::Key::Escape),
        "Tab" => Some(enigo::Key::Tab),
        single if single.chars().count() == 1 => {
            single.chars().next().map(enigo::Key::Unicode)
        }
        _ => None,
    }
}

/// Records every primitive call instead of touching the OS. Used by
/// subsystem tests that need to assert on movement/click sequencing.
#[derive(Default)]
pub struct RecordingBackend {
    pub events: Vec<InputEvent>,
}

impl InputBackend for RecordingBackend {
    fn move_to(&mut self, x: i32, y: i32) {
        self.events.push(InputEvent::MoveTo(x, y));
    }

    fn mouse_down(&mut self, button: MouseButton) {
        self.events.push(InputEvent::ButtonDown(button));
    }

    fn mouse_up(&mut self, button: MouseButton) {
        self.events.push(InputEvent::ButtonUp(button));
    }

    fn scroll(&mut self, delta: i32) {
        self.events.push(InputEvent::Scroll(delta));
    }

    fn key_down(&mut self, key: &str) {
        self.events.push(InputEvent::KeyDown(key.to_string()));
    }

    fn key_up(&mut self, key: &str) {
        self.events.push(InputEvent::KeyUp(key.to_string()));
    }

    fn type_char(&mut self, c: char) {
        self.events.push(InputEvent::TypeChar(c));
    }
}

/// Plans humanized motion/click/scroll/keyboard sequences atop a raw
/// [`InputBackend`] (§4.2).
pub struct InputSynthesizer<B: InputBackend> {
    backend: B,
}

fn ease_in_out_quad(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

impl<B: InputBackend> InputSynthesizer<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Moves along a cubic Bézier path from `(from_x, from_y)` with two
    /// randomized perpendicular control offsets scaled by `curve_intensity`.
    pub fn move_to(
        &mut self,
        from: (i32, i32),
        to: (i32, i32),
        duration: Duration,
        curve_intensity: f64,
        rng: &mut impl Rng,
    ) {
        let (x0, y0) = (from.0 as f64, from.1 as f64);
        let (x3, y3) = (to.0 as f64, to.1 as f64);
        let dx = x3 - x0;
        let dy = y3 - y0;
        let len = (dx * dx + dy * dy).sqrt().max(1.0);
        let (perp_x, perp_y) = (-dy / len, dx / len);

        let offset1 = rng.gen_range(-1.0..1.0) * curve_intensity * len * 0.25;
        let offset2 = rng.gen_range(-1.0..1.0) * curve_intensity * len * 0.25;
        let (cx1, cy1) = (x0 + dx / 3.0 + perp_x * offset1, y0 + dy / 3.0 + perp_y * offset1);
        let (cx2, cy2) = (
            x0 + dx * 2.0 / 3.0 + perp_x * offset2,
            y0 + dy * 2.0 / 3.0 + perp_y * offset2,
        );

        let steps = (duration.as_secs_f64() * 60.0).round().max(10.0) as u32;
        let per_step = duration.as_secs_f64() / steps as f64;

        for i in 1..=steps {
            let t = ease_in_out_quad(i as f64 / steps as f64);
            let x = bezier(x0, cx1, cx2, x3, t);
            let y = bezier(y0, cy1, cy2, y3, t);
            self.backend.move_to(x.round() as i32, y.round() as i32);
            let jitter = rng.gen_range(0.8..1.2);
            sleep(Duration::from_secs_f64((per_step * jitter).max(0.0)));
        }
    }

    pub fn click(&mut self, button: MouseButton, rng: &mut impl Rng) {
        sleep(Duration::from_millis(rng.gen_range(50..=150)));
        self.backend.mouse_down(button);
        sleep(Duration::from_millis(rng.gen_range(50..=120)));
        self.backend.mouse_up(button);
    }

    pub fn drag_middle(
        &mut self,
        from: (i32, i32),
        to: (i32, i32),
        duration: Duration,
        curve_intensity: f64,
        rng: &mut impl Rng,
    ) {
        self.backend.mouse_down(MouseButton::Middle);
        self.move_to(from, to, duration, curve_intensity, rng);
        self.backend.mouse_up(MouseButton::Middle);
    }

    /// Splits `delta` into 3-5 chunks with inter-chunk jitter. Positive
    /// `delta` zooms in.
    pub fn scroll_wheel(&mut self, delta: i32, rng: &mut impl Rng) {
        let chunks = rng.gen_range(3..=5);
        let mut remaining = delta;
        for i in 0..chunks {
            let left = chunks - i;
            let share = if left == 1 {
                remaining
            } else {
                let base = remaining / left;
                let jitter = (base as f64 * rng.gen_range(-0.2..0.2)) as i32;
                base + jitter
            };
            self.backend.scroll(share);
            remaining -= share;
            if i + 1 < chunks {
                sleep(Duration::from_millis(rng.gen_range(30..=90)));
            }
        }
    }

    pub fn tap(&mut self, key: &str, hold: Option<Duration>) {
        self.backend.key_down(key);
        sleep(hold.unwrap_or(Duration::from_millis(60)));
        self.backend.key_up(key);
    }

    pub fn hotkey(&mut self, keys: &[&str]) {
        for key in keys {
            self.backend.key_down(key);
        }
        for key in keys.iter().rev() {
            self.backend.key_up(key);
        }
    }

    pub fn type_text(&mut self, text: &str, min_delay: Duration, max_delay: Duration, rng: &mut impl Rng) {
        for c in text.chars() {
            self.backend.type_char(c);
            let delay = crate::helpers::jitter_duration(min_delay, max_delay, rng);
            sleep(delay);
        }
    }
}

fn bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn move_to_starts_and_ends_near_targets() {
        let backend = RecordingBackend::default();
        let mut synth = InputSynthesizer::new(backend);
        let mut rng = StdRng::seed_from_u64(7);
        synth.move_to((0, 0), (100, 50), Duration::from_millis(1), 0.3, &mut rng);
        let events = &synth.backend_mut().events;
        assert!(!events.is_empty());
        if let InputEvent::MoveTo(x, y) = events.last().unwrap() {
            assert!((*x - 100).abs() <= 1);
            assert!((*y - 50).abs() <= 1);
        } else {
            panic!("expected a MoveTo event");
        }
    }

    #[test]
    fn click_produces_down_then_up() {
        let backend = RecordingBackend::default();
        let mut synth = InputSynthesizer::new(backend);
        let mut rng = StdRng::seed_from_u64(1);
        synth.click(MouseButton::Left, &mut rng);
        let events = &synth.backend_mut().events;
        assert_eq!(events[0], InputEvent::ButtonDown(MouseButton::Left));
        assert_eq!(events[1], InputEvent::ButtonUp(MouseButton::Left));
    }

    #[test]
    fn scroll_wheel_chunks_sum_to_delta() {
        let backend = RecordingBackend::default();
        let mut synth = InputSynthesizer::new(backend);
        let mut rng = StdRng::seed_from_u64(3);
        synth.scroll_wheel(300, &mut rng);
        let total: i32 = synth
            .backend_mut()
            .events
            .iter()
            .filter_map(|e| match e {
                InputEvent::Scroll(d) => Some(*d),
                _ => None,
            })
            .sum();
        assert_eq!(total, 300);
    }

    #[test]
    fn hotkey_releases_in_reverse_order() {
        let backend = RecordingBackend::default();
        let mut synth = InputSynthesizer::new(backend);
        synth.hotkey(&["Shift", "F1"]);
        let events = &synth.backend_mut().events;
        assert_eq!(events[0], InputEvent::KeyDown("Shift".to_string()));
        assert_eq!(events[1], InputEvent::KeyDown("F1".to_string()));
        assert_eq!(events[2], InputEvent::KeyUp("F1".to_string()));
        assert_eq!(events[3], InputEvent::KeyUp("Shift".to_string()));
    }
}
