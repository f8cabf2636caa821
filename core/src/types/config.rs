//! Process-level runtime configuration (§3.1, §9.1).
//!
//! Loaded once at startup and immutable afterward, matching the reference's
//! profile lifetime note. Validation happens after parsing, producing
//! [`crate::error::BotError::ConfigInvalid`] rather than panicking on a bad
//! TOML file.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COLLISION_CACHE_CAP, DEFAULT_MINIMAP_PX_PER_TILE, DEFAULT_PATH_CACHE_CAP,
};
use crate::error::BotError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub telemetry_base_url: String,
    pub telemetry_timeout_ms: u64,
    pub collision_archive_path: String,
    pub minimap_px_per_tile: f64,
    pub collision_cache_cap: usize,
    pub path_cache_cap: usize,
    pub log_level: String,
    pub log_file_path: Option<String>,
    pub policy: String,
    pub idle_break_freq_min_minutes: f64,
    pub idle_break_freq_max_minutes: f64,
    pub idle_break_dur_min_minutes: f64,
    pub idle_break_dur_max_minutes: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            telemetry_base_url: "http://127.0.0.1:8080".to_string(),
            telemetry_timeout_ms: 2000,
            collision_archive_path: "collision.zip".to_string(),
            minimap_px_per_tile: DEFAULT_MINIMAP_PX_PER_TILE,
            collision_cache_cap: DEFAULT_COLLISION_CACHE_CAP,
            path_cache_cap: DEFAULT_PATH_CACHE_CAP,
            log_level: "info".to_string(),
            log_file_path: None,
            policy: "gathering".to_string(),
            idle_break_freq_min_minutes: 15.0,
            idle_break_freq_max_minutes: 45.0,
            idle_break_dur_min_minutes: 2.0,
            idle_break_dur_max_minutes: 8.0,
        }
    }
}

impl RuntimeConfig {
    /// Parses a TOML configuration document, applying defaults for any
    /// field it omits, then validates it.
    pub fn from_toml_str(text: &str) -> Result<Self, BotError> {
        let config: RuntimeConfig = toml::from_str(text).map_err(|e| BotError::ConfigInvalid {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BotError> {
        if self.telemetry_base_url.is_empty() {
            return Err(BotError::ConfigInvalid {
                reason: "telemetry_base_url must not be empty".to_string(),
            });
        }
        if self.collision_cache_cap == 0 || self.path_cache_cap == 0 {
            return Err(BotError::ConfigInvalid {
                reason: "cache caps must be non-zero".to_string(),
            });
        }
        if self.minimap_px_per_tile <= 0.0 {
            return Err(BotError::ConfigInvalid {
                reason: "minimap_px_per_tile must be positive".to_string(),
            });
        }
        if self.idle_break_freq_min_minutes > self.idle_break_freq_max_minutes
            || self.idle_break_dur_min_minutes > self.idle_break_dur_max_minutes
        {
            return Err(BotError::ConfigInvalid {
                reason: "break frequency/duration ranges must be min <= max".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_cleanly() {
        RuntimeConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_url_is_invalid() {
        let mut config = RuntimeConfig::default();
        config.telemetry_base_url.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = RuntimeConfig::from_toml_str("policy = \"combat\"\n").unwrap();
        assert_eq!(config.policy, "combat");
        assert_eq!(config.collision_cache_cap, DEFAULT_COLLISION_CACHE_CAP);
    }

    #[test]
    fn inverted_break_range_is_rejected() {
        let mut config = RuntimeConfig::default();
        config.idle_break_freq_min_minutes = 50.0;
        config.idle_break_freq_max_minutes = 10.0;
        assert!(config.validate().is_err());
    }
}
