// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`TraceSink`] that logs to the browser console.

use tripline_core::trace::{
    BoundsEvent, DisabledEvent, ErrorEvent, RegisterEvent, ResizeEvent, TraceSink,
    TransitionEvent,
};
use tripline_core::trigger::Transition;
use wasm_bindgen::JsValue;

/// Logs transitions, bounds, registrations and errors with `console.log`.
///
/// Scroll sample passes are not logged; they fire on every scroll burst.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    fn log(line: &str) {
        web_sys::console::log_1(&JsValue::from_str(line));
    }
}

impl TraceSink for ConsoleSink {
    fn on_transition(&mut self, e: &TransitionEvent) {
        Self::log(&transition_line(e));
    }

    fn on_bounds(&mut self, e: &BoundsEvent) {
        Self::log(&bounds_line(e));
    }

    fn on_disabled(&mut self, e: &DisabledEvent) {
        Self::log(&format!(
            "[tripline] {} disabled ({})",
            e.trigger,
            e.reason.as_str()
        ));
    }

    fn on_register(&mut self, e: &RegisterEvent) {
        let what = if e.existing { "already registered" } else { "registered" };
        Self::log(&format!("[tripline] {} {what}", e.trigger));
    }

    fn on_error(&mut self, e: &ErrorEvent) {
        let line = match e.trigger {
            Some(id) => format!("[tripline] {id} error: {:?}", e.kind),
            None => format!("[tripline] error: {:?}", e.kind),
        };
        web_sys::console::warn_1(&JsValue::from_str(&line));
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        Self::log(&format!("[tripline] resize: {} recomputed", e.recomputed));
    }
}

fn transition_line(e: &TransitionEvent) -> String {
    let verb = match e.transition {
        Transition::Enter => "entered",
        Transition::Exit => "exited",
    };
    format!("[tripline] {} {verb} at scroll {}", e.trigger, e.scroll_y)
}

fn bounds_line(e: &BoundsEvent) -> String {
    match e.end {
        Some(end) => format!("[tripline] {} bounds [{}, {end}]", e.trigger, e.start),
        None => format!("[tripline] {} bounds [{}, ∞)", e.trigger, e.start),
    }
}
