//! Host page abstraction
//!
//! The engine never touches the DOM directly. A host (the wasm bindings in
//! the browser, a fake in tests) implements these traits and forwards the
//! events it subscribes to back into the session.

use crate::bridge::BridgeMessage;
use crate::error::PlayerError;

/// Opaque identity of a video element.
///
/// Holding a key does not keep the element alive; ask the page whether it
/// is still attached before acting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey(pub u64);

/// `HTMLMediaElement.readyState` at which metadata is available.
pub const HAVE_METADATA: u16 = 1;

/// Native media events the engine subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaEventKind {
    /// `ratechange`, subscribed persistently
    RateChange,
    /// `loadedmetadata`, one-shot
    LoadedMetadata,
    /// `playing`, one-shot
    Playing,
}

impl MediaEventKind {
    pub fn event_name(self) -> &'static str {
        match self {
            Self::RateChange => "ratechange",
            Self::LoadedMetadata => "loadedmetadata",
            Self::Playing => "playing",
        }
    }
}

/// A player object that keeps its own rate state outside the media element.
pub trait PlayerApi {
    fn set_playback_rate(&self, rate: f64) -> Result<(), PlayerError>;
}

/// Read-only identity signals published by the host page.
pub trait PageSignals {
    /// Current `location.href`.
    fn location_href(&self) -> String;

    /// Text of the primary video heading, if rendered.
    fn heading_text(&self) -> Option<String>;

    /// `document.title`.
    fn document_title(&self) -> String;

    /// Text content of the known channel-name containers.
    fn channel_name_texts(&self) -> Vec<String>;

    /// `href` attributes of owner/channel links.
    fn channel_link_hrefs(&self) -> Vec<String>;

    /// `content` of `meta[itemprop=<itemprop>]`.
    fn meta_content(&self, itemprop: &str) -> Option<String>;

    /// Author field of the page's initial player response, if exposed.
    fn player_response_author(&self) -> Option<String>;
}

/// Mutable surface the rate enforcer drives.
pub trait Page: PageSignals {
    /// Every video element currently in the document, in document order.
    fn videos(&self) -> Vec<ElementKey>;

    /// Whether the element is still attached to the document.
    fn is_connected(&self, video: ElementKey) -> bool;

    fn ready_state(&self, video: ElementKey) -> u16;

    fn playback_rate(&self, video: ElementKey) -> Option<f64>;

    fn set_playback_rate(&mut self, video: ElementKey, rate: f64);

    /// Deliver every `ratechange` on this element to the session.
    fn watch_rate_changes(&mut self, video: ElementKey);

    /// Deliver the next occurrence of `kind` on this element to the session.
    fn watch_once(&mut self, video: ElementKey, kind: MediaEventKind);

    /// Player objects reachable from this context.
    fn player_apis(&self) -> Vec<Box<dyn PlayerApi>>;

    /// Post a message to the page's own execution context. No reply.
    fn post_bridge_message(&self, message: &BridgeMessage);
}
