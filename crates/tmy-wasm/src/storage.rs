//! Settings store adapter over `chrome.storage`.
//!
//! Read-only: the content script loads the full rule list on start and
//! reloads it on every change notification for the rules key.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use tmy_core::rules::{is_rules_change, RULES_KEY, STORAGE_AREA};
use tmy_core::RuleSet;

use crate::{js_to_json, with_session, WeakSession};

/// Walk `chrome.<path...>`. `None` outside an extension context.
pub fn chrome_path(path: &[&str]) -> Option<JsValue> {
    let mut value = js_sys::Reflect::get(&js_sys::global(), &"chrome".into()).ok()?;
    for key in path {
        if value.is_undefined() || value.is_null() {
            return None;
        }
        value = js_sys::Reflect::get(&value, &(*key).into()).ok()?;
    }
    (!value.is_undefined() && !value.is_null()).then_some(value)
}

fn call_method(target: &JsValue, name: &str, args: &[&JsValue]) -> Result<JsValue, JsValue> {
    let method: js_sys::Function = js_sys::Reflect::get(target, &name.into())?.dyn_into()?;
    let array = js_sys::Array::new();
    for arg in args {
        array.push(arg);
    }
    js_sys::Reflect::apply(&method, target, &array)
}

/// `event.addListener(listener)` on a chrome event object.
pub fn add_listener(event: &JsValue, listener: &JsValue) -> Result<(), JsValue> {
    call_method(event, "addListener", &[listener]).map(|_| ())
}

/// Read the rule list and hand it to the session.
pub fn load_rules(session: WeakSession) -> Result<(), JsValue> {
    let Some(area) = chrome_path(&["storage", STORAGE_AREA]) else {
        log::warn!("chrome.storage.{} unavailable; running without rules", STORAGE_AREA);
        return Ok(());
    };

    let defaults: JsValue = js_sys::Object::new().into();
    js_sys::Reflect::set(&defaults, &RULES_KEY.into(), &js_sys::Array::new())?;

    let callback = Closure::once_into_js(move |data: JsValue| {
        let rules = js_sys::Reflect::get(&data, &RULES_KEY.into()).unwrap_or(JsValue::UNDEFINED);
        let rules = RuleSet::from_value(&js_to_json(&rules));
        with_session(&session, "settings load", |session| {
            let result = session.apply_settings(rules);
            log::debug!("settings loaded: {:?}", result);
        });
    });

    call_method(&area, "get", &[&defaults, &callback]).map(|_| ())
}

/// Reload the rule list whenever the rules key changes in the sync area.
pub fn watch_rule_changes(session: WeakSession) -> Result<(), JsValue> {
    let Some(on_changed) = chrome_path(&["storage", "onChanged"]) else {
        return Ok(());
    };

    let listener = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |changes: JsValue, area: JsValue| {
        let area = area.as_string().unwrap_or_default();
        let keys: Vec<String> = js_sys::Object::keys(changes.unchecked_ref::<js_sys::Object>())
            .iter()
            .filter_map(|key| key.as_string())
            .collect();
        if !is_rules_change(&area, &keys) {
            return;
        }
        if let Err(e) = load_rules(session.clone()) {
            log::warn!("settings reload failed: {:?}", e);
        }
    });

    add_listener(&on_changed, listener.as_ref())?;
    listener.forget();
    Ok(())
}
