use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::store::prefixed::DEFAULT_PREFIX;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// "none" | "noop" | "log"
    #[serde(default = "default_observability_backend")]
    pub backend: String,
}

fn default_observability_backend() -> String {
    "none".into()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            backend: default_observability_backend(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConfig {
    /// Key prefix separating state entries from everything else in the store
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Entries created this many seconds ago or earlier are swept
    #[serde(default = "default_stale_state_age_secs")]
    pub stale_state_age_secs: u64,
    /// Keys processed at once during a sweep
    #[serde(default = "default_sweep_concurrency")]
    pub sweep_concurrency: usize,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.into()
}
fn default_stale_state_age_secs() -> u64 {
    15 * 60
}
fn default_sweep_concurrency() -> usize {
    1
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            stale_state_age_secs: default_stale_state_age_secs(),
            sweep_concurrency: default_sweep_concurrency(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl StateConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.is_empty() {
            return Err(ConfigError::Validation(
                "prefix must not be empty".into(),
            ));
        }
        if self.sweep_concurrency == 0 {
            return Err(ConfigError::Validation(
                "sweep_concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
