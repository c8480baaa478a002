//! Error types
//!
//! None of these escape the evaluation path: the session logs and
//! suppresses them. They exist for the edges (config parsing, settings
//! reads, player calls) and for tooling that wants to explain a no-op.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config format: {0}")]
    InvalidFormat(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Malformed settings JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Why a rule can never apply a rate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("rule has an empty match value")]
    EmptyValue,

    #[error("rule has an empty speed")]
    EmptySpeed,

    #[error("speed {0:?} is not a finite number greater than zero")]
    InvalidSpeed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("player does not expose setPlaybackRate")]
    Unavailable,

    #[error("player call failed: {0}")]
    CallFailed(String),
}
