//! shift.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// Total rollout duration used when nothing else is configured.
pub const DEFAULT_ROLLOUT_DURATION_SECS: u64 = 120;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShiftConfig {
    #[serde(default)]
    pub rollout: RolloutConfig,
}

/// Pacing of progressive rollouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutConfig {
    /// How long a full rollout from 1% to the target percentage should take.
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
}

fn default_duration_secs() -> u64 {
    DEFAULT_ROLLOUT_DURATION_SECS
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_ROLLOUT_DURATION_SECS,
        }
    }
}

impl RolloutConfig {
    pub fn with_duration_secs(duration_secs: u64) -> Self {
        Self { duration_secs }
    }

    /// Cadence computation needs more than a single second to split up.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.duration_secs < 2 {
            return Err(ConfigError::Invalid(format!(
                "rollout.duration_secs must be at least 2, got {}",
                self.duration_secs
            )));
        }
        Ok(())
    }
}

impl ShiftConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: ShiftConfig = toml::from_str(content)?;
        config.rollout.validate()?;
        Ok(config)
    }
}
