// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for tripline.
//!
//! This crate drives a [`tripline_core::dispatcher::Dispatcher`] from the
//! live page:
//!
//! - [`DomPage`]: geometry and lookups over `window` and `document`
//! - [`DomEffects`]: class, image and width mutations plus notification events
//! - [`FrameRequest`]: coalescing `requestAnimationFrame` callback
//! - [`ConsoleSink`]: trace lines on the browser console
//!
//! One runtime exists per page. It is created by the first call to [`init`],
//! [`auto_init`], [`refresh`] or [`register`], and installs throttled window
//! `scroll` and `resize` listeners.
//!
//! From JavaScript:
//!
//! ```js
//! import init, { autoInit, init as watch } from './tripline_web.js';
//! await init();
//! autoInit();                                   // every [data-scroll] element
//! watch([{ el: '.card', className: 'shown' }]); // programmatic descriptors
//! ```

mod console;
mod effects;
mod js;
mod page;
mod raf;
mod runtime;

pub use console::ConsoleSink;
pub use effects::DomEffects;
pub use page::DomPage;
pub use raf::FrameRequest;
pub use runtime::{PAUSE_EVENT, RESUME_EVENT};

use tripline_core::config::{TriggerConfig, TriggerHooks};
use tripline_core::dispatcher::TriggerError;
use tripline_core::error::ConfigurationError;
use tripline_core::id::TriggerId;
use tripline_core::registry::Registration;
use tripline_core::time::HostTime;
use tripline_core::trace::TraceSink;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event};

use runtime::Runtime;

/// Returns the current host time from `performance.now()`.
#[must_use]
pub fn now() -> HostTime {
    HostTime::from_millis_f64(raf::performance_now())
}

fn runtime() -> Result<std::rc::Rc<Runtime>, JsError> {
    Runtime::get().ok_or_else(|| JsError::new("tripline needs a window and a document"))
}

/// Registers every `data-scroll` element, then the given descriptors.
///
/// `items` is an array of descriptor objects, or `undefined`. A value of any
/// other shape throws before anything is registered. Descriptors whose
/// options or boundaries are invalid are reported in the returned
/// `{ registered, errors }` object; the rest of the batch still registers.
#[wasm_bindgen]
pub fn init(items: JsValue) -> Result<JsValue, JsError> {
    let runtime = runtime()?;
    let parsed = js::descriptors(&items)?;
    let mut report = runtime.scan();
    report.extend(runtime.register_parsed(parsed));
    Ok(js::report(&report))
}

/// Registers every `data-scroll` element once the document has loaded.
///
/// Runs immediately when the document is already past `loading`.
#[wasm_bindgen(js_name = autoInit)]
pub fn auto_init() -> Result<(), JsError> {
    let runtime = runtime()?;
    let document = runtime.page().document();
    if document.ready_state() != "loading" {
        let _ = runtime.scan();
        return Ok(());
    }
    let on_ready = Closure::once_into_js(move |_event: Event| {
        if let Some(runtime) = Runtime::get() {
            let _ = runtime.scan();
        }
    });
    let _ = document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref());
    Ok(())
}

#[cfg(feature = "auto-init")]
#[wasm_bindgen(start)]
fn start() {
    let _ = auto_init();
}

/// Recomputes every trigger's boundaries and samples the page.
///
/// For layout changes that do not resize the window.
#[wasm_bindgen]
pub fn refresh() -> Result<(), JsError> {
    runtime()?.refresh();
    Ok(())
}

/// Logs trace events to the browser console.
#[wasm_bindgen(js_name = enableConsoleTrace)]
pub fn enable_console_trace() -> Result<(), JsError> {
    runtime()?.set_trace_sink(Some(Box::new(ConsoleSink)));
    Ok(())
}

/// Routes trace events to `sink`, replacing any previous one.
///
/// Returns `false` outside a browser main thread.
pub fn set_trace_sink(sink: Box<dyn TraceSink>) -> bool {
    Runtime::get().is_some_and(|runtime| {
        runtime.set_trace_sink(Some(sink));
        true
    })
}

/// Watches `element` from Rust.
///
/// Returns `None` outside a browser main thread.
pub fn register(
    element: Element,
    config: TriggerConfig,
    hooks: TriggerHooks<Element>,
) -> Option<Result<Registration, ConfigurationError>> {
    Some(Runtime::get()?.register(element, config, hooks))
}

/// Stops watching a trigger. Returns `false` if `id` is stale.
pub fn remove(id: TriggerId) -> bool {
    Runtime::get().is_some_and(|runtime| runtime.remove(id))
}

/// Takes the errors that disabled triggers during resize passes.
#[must_use]
pub fn take_errors() -> Vec<TriggerError> {
    Runtime::get().map(|runtime| runtime.take_errors()).unwrap_or_default()
}
