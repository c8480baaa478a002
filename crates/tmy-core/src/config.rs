//! Engine tunables
//!
//! Defaults are the values the content script has shipped with. Hosts can
//! pass a partial camelCase JSON object to override any of them.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Coalescing window for re-evaluation requests
    pub debounce_ms: u32,
    /// Delay between enforcement retry ticks
    pub retry_interval_ms: u32,
    /// Retry ticks per enforcement cycle, the inline first tick included
    pub max_retry_attempts: u32,
    /// Delay between startup polls
    pub startup_poll_interval_ms: u32,
    /// Startup polls before the poll cancels itself
    pub startup_poll_attempts: u32,
    /// How long after a programmatic set a rate change is treated as our own echo
    pub attribution_window_ms: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            retry_interval_ms: 350,
            max_retry_attempts: 30,
            startup_poll_interval_ms: 500,
            startup_poll_attempts: 20,
            attribution_window_ms: 400.0,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON override.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("debounceMs", self.debounce_ms),
            ("retryIntervalMs", self.retry_interval_ms),
            ("maxRetryAttempts", self.max_retry_attempts),
            ("startupPollIntervalMs", self.startup_poll_interval_ms),
            ("startupPollAttempts", self.startup_poll_attempts),
        ];
        for (field, value) in non_zero {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: "must be greater than zero".to_string(),
                });
            }
        }

        if !self.attribution_window_ms.is_finite() || self.attribution_window_ms < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "attributionWindowMs",
                message: format!("{} is not a finite, non-negative duration", self.attribution_window_ms),
            });
        }

        Ok(())
    }
}
