// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot `requestAnimationFrame` requests.
//!
//! [`FrameRequest`] wraps a callback that runs on the next animation frame
//! after [`request`](FrameRequest::request). Repeated requests before the
//! frame arrives are coalesced into one callback. Each callback receives the
//! frame's [`DOMHighResTimeStamp`][mdn] converted to [`HostTime`].
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tripline_core::time::HostTime;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

// Bound directly so events skip the Window and Performance lookups.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

type RafClosure = Closure<dyn FnMut(f64)>;

/// A coalescing one-shot animation-frame callback.
pub struct FrameRequest {
    inner: Rc<FrameInner>,
}

struct FrameInner {
    /// The JS closure handed to `requestAnimationFrame`.
    closure: RefCell<Option<RafClosure>>,

    /// The user-supplied callback.
    callback: RefCell<Box<dyn FnMut(HostTime)>>,

    /// The ID of the outstanding request, if any.
    pending: Cell<Option<i32>>,
}

impl FrameRequest {
    /// Creates an idle request that runs `callback` once per
    /// [`request`](Self::request).
    pub fn new(callback: impl FnMut(HostTime) + 'static) -> Self {
        let inner = Rc::new(FrameInner {
            closure: RefCell::new(None),
            callback: RefCell::new(Box::new(callback)),
            pending: Cell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.pending.set(None);
            inner.callback.borrow_mut()(HostTime::from_millis_f64(timestamp_ms));
        }) as Box<dyn FnMut(f64)>);
        *inner.closure.borrow_mut() = Some(closure);

        Self { inner }
    }

    /// Schedules the callback for the next animation frame.
    ///
    /// No-op while a request is outstanding.
    pub fn request(&self) {
        if self.inner.pending.get().is_some() {
            return;
        }
        if let Some(ref closure) = *self.inner.closure.borrow() {
            let id = request_animation_frame(closure.as_ref().unchecked_ref());
            self.inner.pending.set(Some(id));
        }
    }

    /// Cancels the outstanding request, if any.
    pub fn cancel(&self) {
        if let Some(id) = self.inner.pending.take() {
            cancel_animation_frame(id);
        }
    }

    /// Returns `true` while a request is outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.pending.get().is_some()
    }
}

impl Drop for FrameRequest {
    fn drop(&mut self) {
        self.cancel();
        // Drop the JS closure so it doesn't leak.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for FrameRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameRequest")
            .field("pending", &self.inner.pending.get())
            .finish_non_exhaustive()
    }
}
