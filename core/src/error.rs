//! Closed error taxonomy for the bot runtime (§7).
//!
//! Subsystem boundaries (telemetry, navigation, camera, interaction) return
//! `Result<T, BotError>` instead of the stringly-typed errors the reference
//! codebase uses at its HTTP boundary. Internal helpers that cannot fail in
//! practice stay infallible.

use std::fmt;

use crate::types::WorldCoord;

/// The closed set of error kinds the core can raise, per §7.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("telemetry endpoint {endpoint} returned no response")]
    TelemetryUnavailable { endpoint: &'static str },

    #[error("telemetry endpoint {endpoint} returned a malformed body: {reason}")]
    TelemetryMalformed {
        endpoint: &'static str,
        reason: String,
    },

    #[error("resource not found: {what}")]
    ResourceNotFound { what: String },

    #[error("no path from {from} to {to}")]
    PathNotFound { from: WorldCoord, to: WorldCoord },

    #[error("navigation stuck after {stuck_events} stuck events near {near}")]
    NavigationStuck { stuck_events: u32, near: WorldCoord },

    #[error("interaction failed: {reason}")]
    InteractionFailed { reason: String },

    #[error("combat lost: player died")]
    CombatLost,

    #[error("emergency escape: teleported away, recovering at bank")]
    CombatEscape,

    #[error("emergency escape without a usable teleport: logging out")]
    EmergencyLogout,

    #[error("logout failed: {reason}")]
    LogoutFailed { reason: String },

    #[error("login failed: {reason}")]
    LoginFailed { reason: String },

    #[error("invalid configuration: {reason}")]
    ConfigInvalid { reason: String },

    #[error("critical runtime error: {reason}")]
    CriticalRuntime { reason: String },
}

impl BotError {
    /// Classifies this error's severity per §4.11 / §7.
    ///
    /// Consecutive-failure escalation (three same-named task failures) is
    /// tracked by the caller (`ErrorHandler`), not derivable from the error
    /// value alone, so this only covers the kind-intrinsic severities.
    pub fn severity(&self) -> Severity {
        match self {
            BotError::CriticalRuntime { .. } => Severity::Critical,
            BotError::LoginFailed { .. } | BotError::LogoutFailed { .. } => Severity::High,
            BotError::TelemetryMalformed { .. } => Severity::High,
            BotError::CombatLost => Severity::High,
            BotError::EmergencyLogout => Severity::High,
            BotError::CombatEscape => Severity::Medium,
            BotError::NavigationStuck { .. } => Severity::Medium,
            BotError::PathNotFound { .. } => Severity::Medium,
            BotError::InteractionFailed { .. } => Severity::Medium,
            BotError::ConfigInvalid { .. } => Severity::Medium,
            BotError::ResourceNotFound { .. } => Severity::Medium,
            BotError::TelemetryUnavailable { .. } => Severity::Low,
        }
    }

    /// A stable, short task-name-like tag used for consecutive-failure
    /// streak tracking by the error handler.
    pub fn kind_tag(&self) -> &'static str {
        match self {
            BotError::TelemetryUnavailable { .. } => "telemetry_unavailable",
            BotError::TelemetryMalformed { .. } => "telemetry_malformed",
            BotError::ResourceNotFound { .. } => "resource_not_found",
            BotError::PathNotFound { .. } => "path_not_found",
            BotError::NavigationStuck { .. } => "navigation_stuck",
            BotError::InteractionFailed { .. } => "interaction_failed",
            BotError::CombatLost => "combat_lost",
            BotError::CombatEscape => "combat_escape",
            BotError::EmergencyLogout => "emergency_logout",
            BotError::LogoutFailed { .. } => "logout_failed",
            BotError::LoginFailed { .. } => "login_failed",
            BotError::ConfigInvalid { .. } => "config_invalid",
            BotError::CriticalRuntime { .. } => "critical_runtime",
        }
    }
}

/// Severity levels from §4.11.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_runtime_is_critical() {
        let err = BotError::CriticalRuntime {
            reason: "panic".into(),
        };
        assert_eq!(err.severity(), Severity::Critical);
    }

    #[test]
    fn single_telemetry_miss_is_low_severity() {
        let err = BotError::TelemetryUnavailable { endpoint: "/player" };
        assert_eq!(err.severity(), Severity::Low);
    }

    #[test]
    fn kind_tags_are_stable() {
        assert_eq!(BotError::CombatLost.kind_tag(), "combat_lost");
    }
}
