use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a [`MovementConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tuning for the movement loop. Distances are world units, `speed` is per
/// frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Forward/backward step applied once per frame.
    pub speed: f32,
    /// Strafe step as a fraction of `speed`.
    pub strafe_factor: f32,
    /// Probe hits closer than this are ignored.
    pub probe_near: f32,
    /// Probe length.
    pub probe_far: f32,
    /// Hits at or under this distance block the matching intents.
    pub block_distance: f32,
    /// Height probes are cast at, regardless of the controller's height.
    pub probe_height: f32,
    /// Radians of look rotation per pixel of mouse motion.
    pub look_sensitivity: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: 0.07,
            strafe_factor: 0.5,
            probe_near: 0.01,
            probe_far: 0.5,
            block_distance: 0.3,
            probe_height: 0.0,
            look_sensitivity: 0.002,
        }
    }
}

impl MovementConfig {
    /// Load overrides from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::debug!(path = %path.as_ref().display(), ?config, "movement config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("speed", self.speed),
            ("strafe_factor", self.strafe_factor),
            ("probe_near", self.probe_near),
            ("probe_far", self.probe_far),
            ("block_distance", self.block_distance),
            ("look_sensitivity", self.look_sensitivity),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} must be a finite, non-negative number"),
                });
            }
        }
        if !self.probe_height.is_finite() {
            return Err(ConfigError::Invalid {
                field: "probe_height",
                reason: format!("{} must be finite", self.probe_height),
            });
        }
        if self.probe_near > self.probe_far {
            return Err(ConfigError::Invalid {
                field: "probe_near",
                reason: format!(
                    "{} exceeds probe_far {}",
                    self.probe_near, self.probe_far
                ),
            });
        }
        Ok(())
    }

    /// Per-frame strafe step.
    pub fn strafe_speed(&self) -> f32 {
        self.speed * self.strafe_factor
    }
}
