//! `Page` over the live DOM.
//!
//! Video elements are identified by a numeric key stamped on the element
//! itself, so nothing on the Rust side keeps a removed element alive.
//! Lookups re-query the document; a key whose element is gone simply
//! stops resolving.

use std::sync::atomic::{AtomicU64, Ordering};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Document, Element, HtmlMediaElement, Window};

use tmy_core::bridge::BridgeMessage;
use tmy_core::page::{ElementKey, MediaEventKind, Page, PageSignals, PlayerApi};
use tmy_core::signals::{CHANNEL_LINK_SELECTOR, CHANNEL_TEXT_SELECTOR, TITLE_SELECTOR};
use tmy_core::PlayerError;

use crate::{json_to_js, with_session, WeakSession};

/// Expando property holding an element's key.
const ELEMENT_KEY_PROP: &str = "__tmyKey";

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

pub struct WebPage {
    window: Window,
    document: Document,
    session: WeakSession,
}

impl WebPage {
    pub fn new(window: Window, document: Document, session: WeakSession) -> Self {
        Self {
            window,
            document,
            session,
        }
    }

    fn video_elements(&self) -> Vec<HtmlMediaElement> {
        let Ok(nodes) = self.document.query_selector_all("video") else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|node| node.dyn_into::<HtmlMediaElement>().ok())
            .collect()
    }

    fn key_of(&self, element: &HtmlMediaElement) -> ElementKey {
        let existing = js_sys::Reflect::get(element, &ELEMENT_KEY_PROP.into())
            .ok()
            .and_then(|value| value.as_f64());
        if let Some(key) = existing {
            return ElementKey(key as u64);
        }

        let key = NEXT_KEY.fetch_add(1, Ordering::Relaxed);
        let _ = js_sys::Reflect::set(element, &ELEMENT_KEY_PROP.into(), &JsValue::from(key as f64));
        ElementKey(key)
    }

    fn find(&self, key: ElementKey) -> Option<HtmlMediaElement> {
        self.video_elements()
            .into_iter()
            .find(|element| self.key_of(element) == key)
    }

    fn texts(&self, selector: &str) -> Vec<String> {
        self.each(selector, |element| element.text_content())
    }

    fn each(&self, selector: &str, f: impl Fn(&Element) -> Option<String>) -> Vec<String> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter_map(|element| f(&element))
            .collect()
    }

    fn subscribe(&self, element: &HtmlMediaElement, key: ElementKey, kind: MediaEventKind, once: bool) {
        let session = self.session.clone();
        let callback = move || {
            with_session(&session, kind.event_name(), |session| session.handle_media_event(key, kind));
        };

        let result = if once {
            let listener = Closure::once_into_js(callback);
            let options = AddEventListenerOptions::new();
            options.set_once(true);
            element.add_event_listener_with_callback_and_add_event_listener_options(
                kind.event_name(),
                listener.unchecked_ref(),
                &options,
            )
        } else {
            let listener = Closure::<dyn FnMut()>::new(callback);
            let result = element.add_event_listener_with_callback(kind.event_name(), listener.as_ref().unchecked_ref());
            // Lives as long as the element
            listener.forget();
            result
        };

        if let Err(e) = result {
            log::warn!("failed to listen for {}: {:?}", kind.event_name(), e);
        }
    }
}

impl PageSignals for WebPage {
    fn location_href(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn heading_text(&self) -> Option<String> {
        self.document
            .query_selector(TITLE_SELECTOR)
            .ok()
            .flatten()
            .and_then(|element| element.text_content())
    }

    fn document_title(&self) -> String {
        self.document.title()
    }

    fn channel_name_texts(&self) -> Vec<String> {
        self.texts(CHANNEL_TEXT_SELECTOR)
    }

    fn channel_link_hrefs(&self) -> Vec<String> {
        self.each(CHANNEL_LINK_SELECTOR, |element| element.get_attribute("href"))
    }

    fn meta_content(&self, itemprop: &str) -> Option<String> {
        self.document
            .query_selector(&format!("meta[itemprop=\"{}\"]", itemprop))
            .ok()
            .flatten()
            .and_then(|element| element.get_attribute("content"))
    }

    fn player_response_author(&self) -> Option<String> {
        let mut value: JsValue = self.window.clone().into();
        for key in ["ytInitialPlayerResponse", "videoDetails", "author"] {
            value = js_sys::Reflect::get(&value, &key.into()).ok()?;
            if value.is_undefined() || value.is_null() {
                return None;
            }
        }
        value.as_string()
    }
}

impl Page for WebPage {
    fn videos(&self) -> Vec<ElementKey> {
        self.video_elements()
            .iter()
            .map(|element| self.key_of(element))
            .collect()
    }

    fn is_connected(&self, video: ElementKey) -> bool {
        self.find(video).is_some_and(|element| element.is_connected())
    }

    fn ready_state(&self, video: ElementKey) -> u16 {
        self.find(video).map_or(0, |element| element.ready_state())
    }

    fn playback_rate(&self, video: ElementKey) -> Option<f64> {
        self.find(video).map(|element| element.playback_rate())
    }

    fn set_playback_rate(&mut self, video: ElementKey, rate: f64) {
        if let Some(element) = self.find(video) {
            element.set_playback_rate(rate);
        }
    }

    fn watch_rate_changes(&mut self, video: ElementKey) {
        if let Some(element) = self.find(video) {
            self.subscribe(&element, video, MediaEventKind::RateChange, false);
        }
    }

    fn watch_once(&mut self, video: ElementKey, kind: MediaEventKind) {
        if let Some(element) = self.find(video) {
            self.subscribe(&element, video, kind, true);
        }
    }

    fn player_apis(&self) -> Vec<Box<dyn PlayerApi>> {
        find_player_apis(&self.document)
    }

    fn post_bridge_message(&self, message: &BridgeMessage) {
        if let Err(e) = self.window.post_message(&json_to_js(&message.to_value()), "*") {
            log::warn!("bridge post failed: {:?}", e);
        }
    }
}

// =============================================================================
// Player objects
// =============================================================================

/// A JS object exposing `setPlaybackRate(rate)`.
pub struct JsPlayer {
    target: JsValue,
}

impl JsPlayer {
    /// `Some` only when the object actually has the method.
    pub fn probe(target: JsValue) -> Option<Self> {
        if target.is_undefined() || target.is_null() {
            return None;
        }
        let method = js_sys::Reflect::get(&target, &"setPlaybackRate".into()).ok()?;
        method.is_function().then_some(Self { target })
    }
}

impl PlayerApi for JsPlayer {
    fn set_playback_rate(&self, rate: f64) -> Result<(), PlayerError> {
        let method = js_sys::Reflect::get(&self.target, &"setPlaybackRate".into())
            .ok()
            .and_then(|method| method.dyn_into::<js_sys::Function>().ok())
            .ok_or(PlayerError::Unavailable)?;
        method
            .call1(&self.target, &JsValue::from(rate))
            .map(|_| ())
            .map_err(|e| PlayerError::CallFailed(format!("{:?}", e)))
    }
}

/// Every player object reachable from `document`: the movie player
/// element, `ytd-player.getPlayer()` and the legacy `ytd-player.player_`.
pub fn find_player_apis(document: &Document) -> Vec<Box<dyn PlayerApi>> {
    let mut apis: Vec<Box<dyn PlayerApi>> = Vec::new();

    if let Some(player) = document
        .get_element_by_id("movie_player")
        .and_then(|element| JsPlayer::probe(element.into()))
    {
        apis.push(Box::new(player));
    }

    if let Ok(Some(ytd_player)) = document.query_selector("ytd-player") {
        let ytd_player: JsValue = ytd_player.into();

        let inner = js_sys::Reflect::get(&ytd_player, &"getPlayer".into())
            .ok()
            .and_then(|method| method.dyn_into::<js_sys::Function>().ok())
            .and_then(|get_player| get_player.call0(&ytd_player).ok())
            .and_then(JsPlayer::probe);
        if let Some(inner) = inner {
            apis.push(Box::new(inner));
        }

        let legacy = js_sys::Reflect::get(&ytd_player, &"player_".into())
            .ok()
            .and_then(JsPlayer::probe);
        if let Some(legacy) = legacy {
            apis.push(Box::new(legacy));
        }
    }

    apis
}
