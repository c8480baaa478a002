//! Rule list snapshots and the settings-store contract
//!
//! The settings editor owns the list; the content script only ever reads
//! the full snapshot and replaces it wholesale on every change
//! notification.

use serde_json::Value;

use crate::error::{RuleError, SettingsError};
use crate::types::{PlaybackRate, Rule};

/// Storage area the rule list is persisted in.
pub const STORAGE_AREA: &str = "sync";

/// Storage key holding the ordered rule list.
pub const RULES_KEY: &str = "rules";

/// True when a storage change notification should trigger a settings reload.
pub fn is_rules_change<S: AsRef<str>>(area: &str, changed_keys: &[S]) -> bool {
    area == STORAGE_AREA && changed_keys.iter().any(|key| key.as_ref() == RULES_KEY)
}

// =============================================================================
// RuleSet
// =============================================================================

/// Ordered, read-only snapshot of the persisted rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Build a snapshot from whatever the store returned for [`RULES_KEY`].
    ///
    /// Anything that is not an array is treated as "no rules". Entries that
    /// do not deserialize (unknown type, wrong shape) are skipped; they could
    /// never match anyway. Order is preserved.
    pub fn from_value(value: &Value) -> Self {
        let Some(entries) = value.as_array() else {
            if !value.is_null() {
                log::debug!("rules value is not an array; treating as empty");
            }
            return Self::default();
        };

        let rules = entries
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| match serde_json::from_value::<Rule>(entry.clone()) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    log::debug!("skipping rule #{}: {}", idx, e);
                    None
                }
            })
            .collect();

        Self { rules }
    }

    /// Parse a JSON rule array.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

// =============================================================================
// Editor-side normalization
// =============================================================================

/// The normalization the settings editor applies before saving: trim
/// value and speed, drop rules where either ends up empty.
pub fn normalize_rules(rules: Vec<Rule>) -> Vec<Rule> {
    rules
        .into_iter()
        .map(|rule| Rule {
            value: rule.value.trim().to_string(),
            speed: rule.speed.trim().to_string(),
            ..rule
        })
        .filter(|rule| !rule.value.is_empty() && !rule.speed.is_empty())
        .collect()
}

impl Rule {
    /// The rate this rule applies, or why it would be a no-op.
    pub fn validate(&self) -> Result<PlaybackRate, RuleError> {
        if self.value.trim().is_empty() {
            return Err(RuleError::EmptyValue);
        }
        if self.speed.trim().is_empty() {
            return Err(RuleError::EmptySpeed);
        }
        PlaybackRate::parse(&self.speed).ok_or_else(|| RuleError::InvalidSpeed(self.speed.clone()))
    }
}
