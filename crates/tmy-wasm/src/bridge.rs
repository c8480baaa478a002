//! Page-context half of the playback-rate bridge.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::MessageEvent;

use tmy_core::bridge::{apply_bridge_command, BridgeMessage, BRIDGE_INSTALLED_FLAG};

use crate::dom::find_player_apis;
use crate::js_to_json;

/// Listen for rate commands posted by the content script. Idempotent per
/// window: returns false when a listener was already installed.
#[wasm_bindgen]
pub fn install_page_bridge() -> Result<bool, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;

    let installed = js_sys::Reflect::get(&window, &BRIDGE_INSTALLED_FLAG.into())?;
    if installed.is_truthy() {
        return Ok(false);
    }
    js_sys::Reflect::set(&window, &BRIDGE_INSTALLED_FLAG.into(), &JsValue::TRUE)?;

    let target = window.clone();
    let listener = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        // Only messages this window posted to itself
        let from_self = event
            .source()
            .is_some_and(|source| js_sys::Object::is(&source, &target));
        if !from_self {
            return;
        }

        let Some(command) = BridgeMessage::parse(&js_to_json(&event.data())) else {
            return;
        };
        let Some(document) = target.document() else {
            return;
        };
        let applied = apply_bridge_command(&find_player_apis(&document), command);
        log::trace!("page bridge: {:?} applied to {} player(s)", command, applied);
    });

    window.add_event_listener_with_callback("message", listener.as_ref().unchecked_ref())?;
    listener.forget();
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_install_page_bridge_once() {
        let first = install_page_bridge().unwrap();
        let second = install_page_bridge().unwrap();
        assert!(first);
        assert!(!second);
    }
}
