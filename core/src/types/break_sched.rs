//! Scheduled breaks (§4.8).

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    Idle,
    Logout,
}

#[derive(Debug, Clone)]
pub struct Break {
    pub kind: BreakKind,
    pub start_time: Instant,
    pub duration: Duration,
    pub reason: String,
}

impl Break {
    pub fn new(kind: BreakKind, duration: Duration, reason: impl Into<String>) -> Self {
        Self {
            kind,
            start_time: Instant::now(),
            duration,
            reason: reason.into(),
        }
    }

    pub fn is_elapsed(&self) -> bool {
        self.start_time.elapsed() >= self.duration
    }

    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.start_time.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_break_is_immediately_elapsed() {
        let b = Break::new(BreakKind::Idle, Duration::from_secs(0), "scheduled_break");
        assert!(b.is_elapsed());
        assert_eq!(b.remaining(), Duration::from_secs(0));
    }

    #[test]
    fn logout_break_tracks_kind() {
        let b = Break::new(BreakKind::Logout, Duration::from_secs(60), "scheduled_logout");
        assert_eq!(b.kind, BreakKind::Logout);
        assert_eq!(b.reason, "scheduled_logout");
        assert!(!b.is_elapsed());
    }
}
