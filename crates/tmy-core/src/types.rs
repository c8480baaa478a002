//! Core type definitions for TooMuchYouTube
//!
//! These types mirror the JSON the settings editor persists and the
//! payloads exchanged with the popup, so they derive `serde` and `ts-rs`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Rules
// =============================================================================

/// Which page signal a rule is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum RuleType {
    /// Case-insensitive substring of any channel candidate
    Channel,
    /// Case-insensitive substring of the video title
    Title,
    /// Exact, case-sensitive video id
    VideoId,
}

impl RuleType {
    /// Label used by the settings editor and the CLI.
    pub fn label(self) -> &'static str {
        match self {
            Self::Channel => "Channel",
            Self::Title => "Title",
            Self::VideoId => "Video ID",
        }
    }
}

/// A user-defined match rule. Position in the persisted list is its priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub speed: String,
}

impl Rule {
    pub fn new(rule_type: RuleType, value: impl Into<String>, speed: impl Into<String>) -> Self {
        Self {
            id: None,
            rule_type,
            value: value.into(),
            speed: speed.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

// =============================================================================
// Playback Rate
// =============================================================================

/// A validated playback rate: finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PlaybackRate(f64);

impl PlaybackRate {
    /// Parse a stored speed string. Returns `None` for anything that is
    /// not a finite number greater than zero.
    pub fn parse(speed: &str) -> Option<Self> {
        let trimmed = speed.trim();
        if trimmed.is_empty() {
            return None;
        }
        let value: f64 = trimmed.parse().ok()?;
        Self::new(value)
    }

    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && value > 0.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

// =============================================================================
// Match Context
// =============================================================================

/// Identity signals extracted from the page for one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchContext {
    /// Channel name candidates, deduplicated, in insertion order
    pub channels: Vec<String>,
    /// Video title
    pub title: String,
    /// Video id, empty when the page is not a video page
    pub video_id: String,
}

impl MatchContext {
    pub fn new(title: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self {
            channels: Vec::new(),
            title: title.into(),
            video_id: video_id.into(),
        }
    }

    /// Add a channel candidate. Blank and duplicate values are dropped.
    pub fn push_channel(&mut self, candidate: &str) {
        let candidate = candidate.trim();
        if candidate.is_empty() || self.channels.iter().any(|c| c == candidate) {
            return;
        }
        self.channels.push(candidate.to_string());
    }

    pub fn with_channel(mut self, candidate: &str) -> Self {
        self.push_channel(candidate);
        self
    }
}

// =============================================================================
// Quick Add
// =============================================================================

/// Snapshot of the current page handed to the popup's quick-add buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuickAddData {
    pub video_id: String,
    pub channel_candidates: Vec<String>,
    pub title: String,
}

impl From<MatchContext> for QuickAddData {
    fn from(ctx: MatchContext) -> Self {
        Self {
            video_id: ctx.video_id,
            channel_candidates: ctx.channels,
            title: ctx.title,
        }
    }
}

impl QuickAddData {
    /// The candidate the popup pre-fills for a channel rule.
    pub fn channel_suggestion(&self) -> Option<&str> {
        pick_channel_candidate(&self.channel_candidates)
    }
}

/// Pick the most rule-worthy channel candidate: a `@handle` first, then a
/// channel id, then whatever non-empty value came first.
pub fn pick_channel_candidate<S: AsRef<str>>(candidates: &[S]) -> Option<&str> {
    let cleaned = || {
        candidates
            .iter()
            .map(|c| c.as_ref().trim())
            .filter(|c| !c.is_empty())
    };

    cleaned()
        .find(|c| c.starts_with('@'))
        .or_else(|| cleaned().find(|c| is_channel_id(c)))
        .or_else(|| cleaned().next())
}

/// `UC` followed by at least ten id characters.
pub fn is_channel_id(value: &str) -> bool {
    match value.strip_prefix("UC") {
        Some(rest) => {
            rest.len() >= 10
                && rest
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_wire_format() {
        let rule: Rule =
            serde_json::from_str(r#"{"id":"r1","type":"videoId","value":"abc123","speed":"2"}"#)
                .unwrap();
        assert_eq!(rule.rule_type, RuleType::VideoId);
        assert_eq!(rule.id.as_deref(), Some("r1"));

        let json = serde_json::to_string(&Rule::new(RuleType::Channel, "acme", "1.5")).unwrap();
        assert_eq!(json, r#"{"type":"channel","value":"acme","speed":"1.5"}"#);
    }

    #[test]
    fn test_rule_missing_fields_default_empty() {
        let rule: Rule = serde_json::from_str(r#"{"type":"title"}"#).unwrap();
        assert!(rule.value.is_empty());
        assert!(rule.speed.is_empty());
    }

    #[test]
    fn test_playback_rate_parse() {
        assert_eq!(PlaybackRate::parse("2").map(PlaybackRate::get), Some(2.0));
        assert_eq!(PlaybackRate::parse(" 1.25 ").map(PlaybackRate::get), Some(1.25));
        assert!(PlaybackRate::parse("-1").is_none());
        assert!(PlaybackRate::parse("0").is_none());
        assert!(PlaybackRate::parse("abc").is_none());
        assert!(PlaybackRate::parse("").is_none());
        assert!(PlaybackRate::parse("inf").is_none());
        assert!(PlaybackRate::parse("NaN").is_none());
    }

    #[test]
    fn test_push_channel_dedupes() {
        let mut ctx = MatchContext::default();
        ctx.push_channel("Acme");
        ctx.push_channel("  Acme ");
        ctx.push_channel("");
        ctx.push_channel("@acme");
        assert_eq!(ctx.channels, vec!["Acme", "@acme"]);
    }

    #[test]
    fn test_pick_channel_candidate() {
        assert_eq!(
            pick_channel_candidate(&["Acme", "UCabcdefghij12", "@acme"]),
            Some("@acme")
        );
        assert_eq!(
            pick_channel_candidate(&["Acme", "UCabcdefghij12"]),
            Some("UCabcdefghij12")
        );
        assert_eq!(pick_channel_candidate(&["", " Acme "]), Some("Acme"));
        assert_eq!(pick_channel_candidate::<&str>(&[]), None);
    }

    #[test]
    fn test_is_channel_id() {
        assert!(is_channel_id("UC_x5XG1OV2P6uZZ5FSM9Ttw"));
        assert!(!is_channel_id("UCshort"));
        assert!(!is_channel_id("acme"));
    }

    #[test]
    fn test_quick_add_wire_format() {
        let data = QuickAddData::from(
            MatchContext::new("Title", "abc123").with_channel("@acme"),
        );
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["videoId"], "abc123");
        assert_eq!(json["channelCandidates"][0], "@acme");
        assert_eq!(data.channel_suggestion(), Some("@acme"));
    }
}
