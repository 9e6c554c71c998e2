#![forbid(unsafe_code)]

//! Planner configuration as data.
//!
//! [`PlannerConfig`] groups every tunable of the board. Each field defaults to
//! the built-in constant, so a file only needs the values it overrides:
//!
//! ```toml
//! [gesture]
//! drag_start_threshold = 10.0
//!
//! [coordinator]
//! long_press_ms = 400
//!
//! [move_engine]
//! undo_limit = 20
//! ```
//!
//! Parsing and validation are separate steps: `from_*` only parses,
//! [`validate`](PlannerConfig::validate) lists every problem at once.

use std::path::Path;
use std::time::Duration;

use planboard_core::{GestureConfig, ThrottleConfig};
use planboard_runtime::{CoordinatorConfig, LayoutConfig, MoveEngineConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading a planner configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Gesture recognition section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSection {
    /// Distance (px) before a press becomes a drag.
    pub drag_start_threshold: f32,
    /// Minimum spacing of forwarded drag moves.
    pub move_sample_interval_ms: u64,
    /// Longest a drag move may be held back.
    pub max_move_latency_ms: u64,
}

impl Default for GestureSection {
    fn default() -> Self {
        Self::from(GestureConfig::default())
    }
}

impl From<GestureConfig> for GestureSection {
    fn from(config: GestureConfig) -> Self {
        let millis = |d: Duration| u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
        Self {
            drag_start_threshold: config.drag_start_threshold,
            move_sample_interval_ms: millis(config.throttle.min_interval),
            max_move_latency_ms: millis(config.throttle.max_latency),
        }
    }
}

impl GestureSection {
    #[must_use]
    pub fn to_gesture_config(&self) -> GestureConfig {
        GestureConfig {
            drag_start_threshold: self.drag_start_threshold,
            throttle: ThrottleConfig {
                min_interval: Duration::from_millis(self.move_sample_interval_ms),
                max_latency: Duration::from_millis(self.max_move_latency_ms),
            },
        }
    }
}

/// Top-level planner configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub gesture: GestureSection,
    pub coordinator: CoordinatorConfig,
    pub move_engine: MoveEngineConfig,
    pub layout: LayoutConfig,
}

impl PlannerConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Err(err) = self.gesture.to_gesture_config().validate() {
            errors.push(format!("gesture: {err}"));
        }
        let resize = GestureConfig::default().with_threshold(self.coordinator.resize_threshold);
        if let Err(err) = resize.validate() {
            errors.push(format!("coordinator.resize_threshold: {err}"));
        }
        errors.extend(
            self.coordinator
                .problems()
                .into_iter()
                .map(|p| format!("coordinator: {p}")),
        );
        errors.extend(self.layout.problems().into_iter().map(|p| format!("layout: {p}")));
        errors
    }

    /// `self` if valid, otherwise every problem as one error.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}
