use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

static GLOBAL: OnceLock<StepConfig> = OnceLock::new();

/// Process-wide stepping configuration shared by every stepping builder.
///
/// Each builder emits one sample per `1 / hz` seconds of simulated travel, so
/// the arc-length advance per step is `velocity / hz`. Reference data was
/// captured at 100 Hz; changing the rate breaks golden parity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StepConfig {
    pub hz: f32,
    /// Trains slower than this stall on uphills and end the section.
    pub min_velocity: f32,
    pub max_velocity: f32,
    /// Largest |(normal, lateral)| force, in g, a section may reach.
    pub max_force: f32,
    pub max_iterations: usize,
}

impl StepConfig {
    pub const DEFAULT: Self = Self {
        hz: 100.0,
        min_velocity: 0.1,
        max_velocity: 150.0,
        max_force: 10.0,
        max_iterations: 1_000_000,
    };

    /// Installed configuration, or [`StepConfig::DEFAULT`] when nothing was
    /// installed before the first read.
    pub fn global() -> &'static StepConfig {
        GLOBAL.get_or_init(|| Self::DEFAULT)
    }

    /// Validates and installs `self` as the process-wide configuration.
    ///
    /// Installing the value already in effect is a no-op; anything else after
    /// the first install (or first read) is rejected.
    pub fn install(self) -> Result<()> {
        let config = self.validate()?;
        let installed = GLOBAL.get_or_init(|| config);
        if *installed == config {
            tracing::debug!(hz = config.hz, "step configuration installed");
            Ok(())
        } else {
            Err(Error::ConfigConflict)
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: StepConfig = toml::from_str(text)?;
        config.validate()
    }

    pub fn validate(self) -> Result<Self> {
        if !self.hz.is_finite() || self.hz <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "hz must be positive and finite, got {}",
                self.hz
            )));
        }
        if !(self.min_velocity > 0.0 && self.min_velocity < self.max_velocity) {
            return Err(Error::InvalidConfig(format!(
                "velocity bounds must satisfy 0 < min < max, got {}..{}",
                self.min_velocity, self.max_velocity
            )));
        }
        if self.max_force.is_nan() || self.max_force <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "max_force must be positive, got {}",
                self.max_force
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig("max_iterations must be non-zero".into()));
        }
        Ok(self)
    }

    /// Seconds per step.
    pub fn dt(&self) -> f32 {
        1.0 / self.hz
    }
}

impl Default for StepConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
