//! Small free-standing helpers shared across subsystems.

use std::time::Duration;

use rand::Rng;

/// Logs `message` tagged with the current subsystem name, mirroring the
/// reference codebase's per-character log prefix convention.
#[macro_export]
macro_rules! botlog {
    ($subsystem:expr, $fmt:expr $(, $args:expr)*) => {
        log::info!("[{}] {}", $subsystem, format!($fmt $(, $args)*));
    };
}

/// Uniformly samples a `Duration` within `[min, max]`, inclusive.
pub fn jitter_duration(min: Duration, max: Duration, rng: &mut impl Rng) -> Duration {
    if max <= min {
        return min;
    }
    let span_ms = (max.as_millis() - min.as_millis()) as u64;
    min + Duration::from_millis(rng.gen_range(0..=span_ms))
}

/// Samples a uniform `f64` within `[min, max]`, inclusive, swapping bounds
/// if given in the wrong order.
pub fn jitter_range(min: f64, max: f64, rng: &mut impl Rng) -> f64 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    if (hi - lo).abs() < f64::EPSILON {
        return lo;
    }
    rng.gen_range(lo..=hi)
}

/// Scales a base delay by `1 + coefficient * fatigue`, per the humanization
/// model (§4.8).
pub fn scale_by_fatigue(base: Duration, fatigue: f64, coefficient: f64) -> Duration {
    let factor = 1.0 + coefficient * fatigue;
    Duration::from_secs_f64(base.as_secs_f64() * factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn jitter_duration_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let d = jitter_duration(Duration::from_millis(150), Duration::from_millis(400), &mut rng);
            assert!(d >= Duration::from_millis(150) && d <= Duration::from_millis(400));
        }
    }

    #[test]
    fn jitter_duration_degenerate_range_returns_min() {
        let mut rng = StdRng::seed_from_u64(2);
        let d = jitter_duration(Duration::from_millis(10), Duration::from_millis(10), &mut rng);
        assert_eq!(d, Duration::from_millis(10));
    }

    #[test]
    fn scale_by_fatigue_increases_with_fatigue() {
        let base = Duration::from_millis(100);
        let at_zero = scale_by_fatigue(base, 0.0, 0.5);
        let at_full = scale_by_fatigue(base, 1.0, 0.5);
        assert_eq!(at_zero, base);
        assert!(at_full > at_zero);
        assert_eq!(at_full, Duration::from_millis(150));
    }

    #[test]
    fn jitter_range_handles_swapped_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let v = jitter_range(10.0, 5.0, &mut rng);
        assert!((5.0..=10.0).contains(&v));
    }
}
