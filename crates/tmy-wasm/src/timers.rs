//! `Scheduler` over `setTimeout`.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use tmy_core::scheduler::{Scheduler, Task, TaskHandle};

use crate::{with_session, WeakSession};

pub struct BrowserScheduler {
    window: Window,
    session: WeakSession,
}

impl BrowserScheduler {
    pub fn new(window: Window, session: WeakSession) -> Self {
        Self { window, session }
    }
}

impl Scheduler for BrowserScheduler {
    fn now_ms(&self) -> f64 {
        match self.window.performance() {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        }
    }

    fn schedule(&mut self, delay_ms: u32, task: Task) -> TaskHandle {
        let session = self.session.clone();
        let callback = Closure::once_into_js(move || {
            with_session(&session, "timer", |session| session.run_task(task));
        });

        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
        {
            Ok(id) => TaskHandle(id as u64),
            Err(e) => {
                log::warn!("setTimeout failed for {:?}: {:?}", task, e);
                TaskHandle(0)
            }
        }
    }

    fn cancel(&mut self, handle: TaskHandle) {
        if handle.0 != 0 {
            self.window.clear_timeout_with_handle(handle.0 as i32);
        }
    }
}
