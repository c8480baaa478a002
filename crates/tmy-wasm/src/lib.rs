//! WebAssembly bindings for TooMuchYouTube
//!
//! Two entry points: [`start_content_script`] runs in the extension's
//! isolated world and owns the session; [`install_page_bridge`] runs in
//! the page's own context, where the player objects live.

mod bridge;
mod dom;
mod storage;
mod timers;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use tmy_core::bridge::ContentRequest;
use tmy_core::domains::is_recognized_host;
use tmy_core::types::pick_channel_candidate;
use tmy_core::url::extract_host;
use tmy_core::{ContentSession, EngineConfig, RuleSet};

pub use bridge::install_page_bridge;

use crate::dom::WebPage;
use crate::timers::BrowserScheduler;

/// Host event fired once the video site finishes a client-side navigation.
const NAVIGATE_FINISH_EVENT: &str = "yt-navigate-finish";

pub(crate) type Session = ContentSession<WebPage, BrowserScheduler>;
pub(crate) type WeakSession = Weak<RefCell<Session>>;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}

/// Run `f` against the live session. Callbacks that fire after teardown
/// or while the session is already borrowed are dropped.
pub(crate) fn with_session(weak: &WeakSession, what: &str, f: impl FnOnce(&mut Session)) {
    let Some(session) = weak.upgrade() else {
        return;
    };
    let result = session.try_borrow_mut();
    match result {
        Ok(mut session) => f(&mut session),
        Err(_) => log::warn!("session busy; dropped {}", what),
    }
}

pub(crate) fn json_to_js(value: &serde_json::Value) -> JsValue {
    js_sys::JSON::parse(&value.to_string()).unwrap_or(JsValue::UNDEFINED)
}

pub(crate) fn js_to_json(value: &JsValue) -> serde_json::Value {
    if value.is_undefined() {
        return serde_json::Value::Null;
    }
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|s| s.as_string())
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or(serde_json::Value::Null)
}

// =============================================================================
// Content script
// =============================================================================

#[wasm_bindgen]
pub struct ContentScript {
    session: Rc<RefCell<Session>>,
    window: web_sys::Window,
    observer: web_sys::MutationObserver,
    _on_mutation: Closure<dyn FnMut()>,
    on_navigate: Closure<dyn FnMut()>,
}

fn warn_on_err(what: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::warn!("{} unavailable: {:?}", what, e);
    }
}

/// Start the content script on the current page.
///
/// `config_json` optionally overrides engine tunables (camelCase keys).
#[wasm_bindgen]
pub fn start_content_script(config_json: Option<String>) -> Result<ContentScript, JsValue> {
    let config = match config_json.as_deref() {
        Some(json) => EngineConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => EngineConfig::default(),
    };

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("No document"))?;

    let session = Rc::new_cyclic(|weak: &WeakSession| {
        RefCell::new(ContentSession::new(
            WebPage::new(window.clone(), document.clone(), weak.clone()),
            BrowserScheduler::new(window.clone(), weak.clone()),
            config,
        ))
    });

    // Last fallible step; nothing is attached to the page yet
    let weak = Rc::downgrade(&session);
    let on_mutation = Closure::<dyn FnMut()>::new(move || {
        with_session(&weak, "mutation", |session| session.on_mutation());
    });
    let observer = web_sys::MutationObserver::new(on_mutation.as_ref().unchecked_ref())?;

    let weak = Rc::downgrade(&session);
    let on_navigate = Closure::<dyn FnMut()>::new(move || {
        with_session(&weak, "navigation", |session| session.on_navigate_finish());
    });

    // From here on the script runs with whatever hooks could be installed.
    warn_on_err(
        "navigation listener",
        window.add_event_listener_with_callback(NAVIGATE_FINISH_EVENT, on_navigate.as_ref().unchecked_ref()),
    );
    if let Some(root) = document.document_element() {
        let init = web_sys::MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        warn_on_err("mutation observer", observer.observe_with_options(&root, &init));
    }

    warn_on_err("settings watch", storage::watch_rule_changes(Rc::downgrade(&session)));
    warn_on_err("settings load", storage::load_rules(Rc::downgrade(&session)));
    warn_on_err("quick-add listener", listen_for_requests(Rc::downgrade(&session)));

    session.borrow_mut().start();
    log::info!("content script started on {}", window.location().host().unwrap_or_default());

    Ok(ContentScript {
        session,
        window,
        observer,
        _on_mutation: on_mutation,
        on_navigate,
    })
}

#[wasm_bindgen]
impl ContentScript {
    /// Replace the rule snapshot directly, bypassing the settings store.
    pub fn apply_settings(&self, rules: JsValue) -> Result<(), JsValue> {
        let rules = RuleSet::from_value(&js_to_json(&rules));
        let mut session = self
            .session
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("Session busy"))?;
        let result = session.apply_settings(rules);
        log::debug!("settings applied: {:?}", result);
        Ok(())
    }

    /// Answer a content-script request. `undefined` for unknown requests.
    pub fn handle_message(&self, message: JsValue) -> JsValue {
        let Some(request) = ContentRequest::parse(&js_to_json(&message)) else {
            return JsValue::UNDEFINED;
        };
        match self.session.try_borrow() {
            Ok(session) => {
                let data = session.handle_request(request);
                serde_json::to_value(&data).map(|v| json_to_js(&v)).unwrap_or(JsValue::UNDEFINED)
            }
            Err(_) => JsValue::UNDEFINED,
        }
    }

    /// Current enforcement phase, for debugging from the console.
    pub fn phase(&self) -> String {
        match self.session.try_borrow() {
            Ok(session) => format!("{:?}", session.phase()),
            Err(_) => "Busy".to_string(),
        }
    }

    /// Disconnect observers and cancel every timer.
    pub fn stop(&self) {
        self.observer.disconnect();
        let _ = self
            .window
            .remove_event_listener_with_callback(NAVIGATE_FINISH_EVENT, self.on_navigate.as_ref().unchecked_ref());
        if let Ok(mut session) = self.session.try_borrow_mut() {
            session.shutdown();
        }
    }
}

/// `chrome.runtime.onMessage` handler for popup requests.
fn listen_for_requests(weak: WeakSession) -> Result<(), JsValue> {
    let Some(on_message) = storage::chrome_path(&["runtime", "onMessage"]) else {
        log::warn!("chrome.runtime.onMessage unavailable; quick-add disabled");
        return Ok(());
    };

    let handler = Closure::<dyn FnMut(JsValue, JsValue, JsValue) -> bool>::new(
        move |message: JsValue, _sender: JsValue, send_response: JsValue| {
            let Some(request) = ContentRequest::parse(&js_to_json(&message)) else {
                return false;
            };
            let Some(shared) = weak.upgrade() else {
                return false;
            };
            let Ok(session) = shared.try_borrow() else {
                return false;
            };
            let data = session.handle_request(request);
            if let (Ok(value), Some(respond)) = (
                serde_json::to_value(&data),
                send_response.dyn_ref::<js_sys::Function>(),
            ) {
                let _ = respond.call1(&JsValue::NULL, &json_to_js(&value));
            }
            false
        },
    );

    storage::add_listener(&on_message, handler.as_ref())?;
    handler.forget();
    Ok(())
}

// =============================================================================
// Popup helpers
// =============================================================================

/// Whether the popup's editor applies to this tab URL.
#[wasm_bindgen]
pub fn is_recognized_url(url: &str) -> bool {
    extract_host(url).is_some_and(is_recognized_host)
}

/// Channel candidate to pre-fill for a quick-add channel rule.
#[wasm_bindgen]
pub fn suggest_channel(candidates: JsValue) -> Option<String> {
    let candidates: Vec<String> = js_sys::Array::from(&candidates)
        .iter()
        .filter_map(|value| value.as_string())
        .collect();
    pick_channel_candidate(&candidates).map(|c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_is_recognized_url() {
        assert!(is_recognized_url("https://www.youtube.com/watch?v=abc"));
        assert!(is_recognized_url("https://youtu.be/abc"));
        assert!(!is_recognized_url("https://example.com/watch?v=abc"));
        assert!(!is_recognized_url("chrome://extensions"));
    }

    #[wasm_bindgen_test]
    fn test_suggest_channel() {
        let candidates = js_sys::Array::new();
        candidates.push(&"Acme Inc".into());
        candidates.push(&"UCabcdefghij12".into());
        candidates.push(&"@acme".into());
        assert_eq!(suggest_channel(candidates.into()), Some("@acme".to_string()));
        assert_eq!(suggest_channel(js_sys::Array::new().into()), None);
    }

    fn throwing_event() -> js_sys::Object {
        let event = js_sys::Object::new();
        let thrower = js_sys::Function::new_no_args("throw new Error('Extension context invalidated.')");
        js_sys::Reflect::set(&event, &"addListener".into(), &thrower).unwrap();
        js_sys::Reflect::set(&event, &"get".into(), &thrower).unwrap();
        event
    }

    #[wasm_bindgen_test]
    fn test_starts_when_extension_apis_throw() {
        let storage = js_sys::Object::new();
        js_sys::Reflect::set(&storage, &tmy_core::rules::STORAGE_AREA.into(), &throwing_event()).unwrap();
        js_sys::Reflect::set(&storage, &"onChanged".into(), &throwing_event()).unwrap();
        let runtime = js_sys::Object::new();
        js_sys::Reflect::set(&runtime, &"onMessage".into(), &throwing_event()).unwrap();
        let chrome = js_sys::Object::new();
        js_sys::Reflect::set(&chrome, &"storage".into(), &storage).unwrap();
        js_sys::Reflect::set(&chrome, &"runtime".into(), &runtime).unwrap();
        let global = js_sys::global();
        let previous = js_sys::Reflect::get(&global, &"chrome".into()).unwrap();
        js_sys::Reflect::set(&global, &"chrome".into(), &chrome).unwrap();

        let script = start_content_script(None);
        js_sys::Reflect::set(&global, &"chrome".into(), &previous).unwrap();

        let script = script.unwrap();
        assert_eq!(script.phase(), "Idle");
        script.stop();
    }

    #[wasm_bindgen_test]
    fn test_js_to_json_undefined_is_null() {
        assert_eq!(js_to_json(&JsValue::UNDEFINED), serde_json::Value::Null);
        let rules = js_sys::JSON::parse(r#"[{"type":"channel","value":"acme","speed":"2"}]"#).unwrap();
        assert_eq!(RuleSet::from_value(&js_to_json(&rules)).len(), 1);
    }
}
