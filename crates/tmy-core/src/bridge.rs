//! Cross-context message protocols
//!
//! Two one-way boundaries:
//! - content script -> page context, over `window.postMessage` on a fixed
//!   channel, because some player internals are only reachable from the
//!   page's own execution context;
//! - popup -> content script, a single read-only quick-add request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::page::PlayerApi;
use crate::types::PlaybackRate;

/// Channel name stamped on every bridge message.
pub const PAGE_SYNC_CHANNEL: &str = "TMY_PLAYBACK_RATE_SYNC";

/// Window flag the page-side listener sets so it is only installed once.
pub const BRIDGE_INSTALLED_FLAG: &str = "__tmyPlaybackRateBridgeInstalled";

// =============================================================================
// Page bridge
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BridgeCommand {
    SetPlaybackRate { rate: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeMessage {
    pub channel: String,
    #[serde(flatten)]
    pub command: BridgeCommand,
}

impl BridgeMessage {
    pub fn new(command: BridgeCommand) -> Self {
        Self {
            channel: PAGE_SYNC_CHANNEL.to_string(),
            command,
        }
    }

    pub fn set_playback_rate(rate: f64) -> Self {
        Self::new(BridgeCommand::SetPlaybackRate { rate })
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Accept only well-formed messages on our channel.
    pub fn parse(data: &Value) -> Option<BridgeCommand> {
        if data.get("channel").and_then(Value::as_str) != Some(PAGE_SYNC_CHANNEL) {
            return None;
        }
        serde_json::from_value::<BridgeMessage>(data.clone())
            .ok()
            .map(|message| message.command)
    }
}

/// Page-side handler: push the rate into every player object. Failures are
/// independent; returns how many calls succeeded.
pub fn apply_bridge_command(players: &[Box<dyn PlayerApi>], command: BridgeCommand) -> usize {
    match command {
        BridgeCommand::SetPlaybackRate { rate } => {
            let Some(rate) = PlaybackRate::new(rate) else {
                return 0;
            };
            players
                .iter()
                .filter(|player| match player.set_playback_rate(rate.get()) {
                    Ok(()) => true,
                    Err(e) => {
                        log::debug!("page bridge: {}", e);
                        false
                    }
                })
                .count()
        }
    }
}

// =============================================================================
// Content-script requests
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentRequest {
    GetQuickAddData,
}

impl ContentRequest {
    pub fn parse(data: &Value) -> Option<Self> {
        serde_json::from_value(data.clone()).ok()
    }
}
