//! Configuration for the telemetry service and its overlays
//!
//! Plain parameter structs with serde support and sensible defaults. The
//! binary reads overrides from `TELEMETRY_*` environment variables; library
//! users usually build a [`TelemetryConfig`] in code.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::EquivalencePolicy;
use crate::utils::time::{is_valid_format, DEFAULT_TIMESTAMP_FORMAT};

pub const ENV_CAPACITY: &str = "TELEMETRY_CAPACITY";
pub const ENV_AGING_MS: &str = "TELEMETRY_AGING_MS";
pub const ENV_MAX_CHARS: &str = "TELEMETRY_MAX_CHARS";
pub const ENV_CONSOLIDATE_EVENTS: &str = "TELEMETRY_CONSOLIDATE_EVENTS";
pub const ENV_CONSOLIDATE_MODES: &str = "TELEMETRY_CONSOLIDATE_MODES";
pub const ENV_TIMESTAMP_FORMAT: &str = "TELEMETRY_TIMESTAMP_FORMAT";
pub const ENV_VERBOSE_EVENTS: &str = "TELEMETRY_VERBOSE_EVENTS";

/// Errors raised while reading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: expected {expected}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("invalid timestamp format {0:?}")]
    InvalidTimestampFormat(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub events: EventsConfig,
    pub event_overlay: EventOverlayConfig,
    pub modes: ModesConfig,
    pub mode_overlay: ModeOverlayConfig,
}

/// Event capture and storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Maximum number of events retained
    pub capacity: usize,
    /// chrono strftime pattern for record timestamps
    pub timestamp_format: String,
    /// Events whose name starts with one of these prefixes are not recorded
    pub verbose_event_prefixes: Vec<String>,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: 4096,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            verbose_event_prefixes: [
                "AccelerometerEvent",
                "Grid Event",
                "Evt_GUIBurstEvent",
                "Evt_GameBurstEvent",
                "Evt_ShowLocationText",
                "Evt_VerticalLevelValue",
                "Evt_HorizontalLevelValue",
                "Evt_RunGUIInsertCommand",
                "Evt_SetLED",
                "Evt_AddGUIInsertScript",
                "Evt_RemoveGUIInsertScript",
                "Evt_AddLEDToSimulator",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Event overlay view-model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventOverlayConfig {
    /// Number of display lines
    pub lines: usize,
    /// Maximum characters per line
    pub max_chars_per_line: usize,
    /// Collapse consecutive duplicates into one `(xN)` line
    pub consolidate: bool,
    pub equivalence: EquivalencePolicy,
    /// Exact event names never shown
    pub ignored_events: Vec<String>,
    /// For these events only the posting records are shown
    pub only_show_poster_for: Vec<String>,
    /// Lines containing any of these substrings are marked bold
    pub bold_if_contains: Vec<String>,
}

impl Default for EventOverlayConfig {
    fn default() -> Self {
        Self {
            lines: 24,
            max_chars_per_line: 154,
            consolidate: true,
            equivalence: EquivalencePolicy::default(),
            ignored_events: Vec::new(),
            only_show_poster_for: Vec::new(),
            bold_if_contains: Vec::new(),
        }
    }
}

/// Mode registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModesConfig {
    /// Length of the "just turned on" window in milliseconds
    pub aging_window_ms: u64,
}

impl ModesConfig {
    pub fn aging_window(&self) -> Duration {
        Duration::from_millis(self.aging_window_ms)
    }
}

impl Default for ModesConfig {
    fn default() -> Self {
        Self { aging_window_ms: 5000 }
    }
}

/// Mode overlay view-model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeOverlayConfig {
    pub lines: usize,
    /// Group identical modes into one `(xN)` line
    pub consolidate: bool,
    /// Modes whose class name starts with one of these prefixes are hidden
    pub ignored_prefixes: Vec<String>,
    pub bold_if_contains: Vec<String>,
}

impl Default for ModeOverlayConfig {
    fn default() -> Self {
        Self {
            lines: 32,
            consolidate: true,
            ignored_prefixes: Vec::new(),
            bold_if_contains: Vec::new(),
        }
    }
}

impl TelemetryConfig {
    /// Defaults with `TELEMETRY_*` environment overrides applied
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from any key lookup (the environment, a map in tests)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_CAPACITY) {
            self.events.capacity = parse_number(ENV_CAPACITY, &value)?;
        }
        if let Some(value) = lookup(ENV_AGING_MS) {
            self.modes.aging_window_ms = parse_number(ENV_AGING_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_CHARS) {
            self.event_overlay.max_chars_per_line = parse_number(ENV_MAX_CHARS, &value)?;
        }
        if let Some(value) = lookup(ENV_CONSOLIDATE_EVENTS) {
            self.event_overlay.consolidate = parse_flag(ENV_CONSOLIDATE_EVENTS, &value)?;
        }
        if let Some(value) = lookup(ENV_CONSOLIDATE_MODES) {
            self.mode_overlay.consolidate = parse_flag(ENV_CONSOLIDATE_MODES, &value)?;
        }
        if let Some(value) = lookup(ENV_TIMESTAMP_FORMAT) {
            if !is_valid_format(&value) {
                return Err(ConfigError::InvalidTimestampFormat(value));
            }
            self.events.timestamp_format = value;
        }
        if let Some(value) = lookup(ENV_VERBOSE_EVENTS) {
            self.events.verbose_event_prefixes = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        expected: "a non-negative integer",
    })
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            expected: "a boolean",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TelemetryConfig::default();
        assert_eq!(config.events.capacity, 4096);
        assert_eq!(config.event_overlay.max_chars_per_line, 154);
        assert!(config.event_overlay.consolidate);
        assert!(config.mode_overlay.consolidate);
        assert_eq!(config.modes.aging_window(), Duration::from_secs(5));
        assert!(config
            .events
            .verbose_event_prefixes
            .iter()
            .any(|p| p == "Evt_SetLED"));
    }

    #[test]
    fn test_overrides() {
        let mut config = TelemetryConfig::default();
        config
            .apply_overrides(lookup(&[
                (ENV_CAPACITY, "16"),
                (ENV_AGING_MS, "250"),
                (ENV_MAX_CHARS, " 80 "),
                (ENV_CONSOLIDATE_EVENTS, "off"),
                (ENV_CONSOLIDATE_MODES, "FALSE"),
                (ENV_TIMESTAMP_FORMAT, "%H:%M"),
                (ENV_VERBOSE_EVENTS, "Evt_A, Evt_B,,"),
            ]))
            .unwrap();

        assert_eq!(config.events.capacity, 16);
        assert_eq!(config.modes.aging_window_ms, 250);
        assert_eq!(config.event_overlay.max_chars_per_line, 80);
        assert!(!config.event_overlay.consolidate);
        assert!(!config.mode_overlay.consolidate);
        assert_eq!(config.events.timestamp_format, "%H:%M");
        assert_eq!(config.events.verbose_event_prefixes, vec!["Evt_A", "Evt_B"]);
    }

    #[test]
    fn test_invalid_overrides() {
        let mut config = TelemetryConfig::default();
        let err = config
            .apply_overrides(lookup(&[(ENV_CAPACITY, "-1")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_CAPACITY, .. }));

        let err = config
            .apply_overrides(lookup(&[(ENV_CONSOLIDATE_EVENTS, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = config
            .apply_overrides(lookup(&[(ENV_TIMESTAMP_FORMAT, "%Q")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidTimestampFormat("%Q".to_string()));
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: TelemetryConfig = serde_json::from_str(
            r#"{"events": {"capacity": 8}, "event_overlay": {"equivalence": "name_only"}}"#,
        )
        .unwrap();
        assert_eq!(config.events.capacity, 8);
        assert_eq!(config.events.timestamp_format, DEFAULT_TIMESTAMP_FORMAT);
        assert_eq!(config.event_overlay.equivalence, EquivalencePolicy::NameOnly);
        assert_eq!(config.event_overlay.lines, 24);
    }
}
