// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The page-wide runtime: one dispatcher fed by window listeners.
//!
//! A single [`Runtime`] exists per page. It owns the [`Dispatcher`], the
//! window `scroll` and `resize` listeners, one timer for the dispatcher's
//! trailing work, the per-element pause/resume listeners and the
//! animation-frame request used by fixed-mode triggers. Closures hold weak
//! references back to it.
//!
//! Queued events are taken out of the dispatcher before effects and hooks
//! run, so page callbacks may call back into the runtime.
//!
//! Pause/resume listeners are removed when their trigger is removed or
//! detaches. A released closure may still be on the stack (a resume handler
//! whose sample detaches its own trigger), so it is parked and dropped at
//! the start of the next event handler.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tripline_core::config::{TriggerConfig, TriggerHooks};
use tripline_core::dispatcher::{
    BatchReport, DescriptorError, Dispatcher, DispatcherConfig, TriggerError,
};
use tripline_core::error::ConfigurationError;
use tripline_core::id::TriggerId;
use tripline_core::registry::Registration;
use tripline_core::time::{Duration, HostTime};
use tripline_core::trace::{TraceSink, Tracer};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, Event};

use crate::effects::DomEffects;
use crate::js::ParsedDescriptor;
use crate::page::DomPage;
use crate::raf::FrameRequest;

/// Event that pauses the trigger watching its target element.
pub const PAUSE_EVENT: &str = "trigger:pause";

/// Event that resumes the trigger watching its target element.
pub const RESUME_EVENT: &str = "trigger:resume";

thread_local! {
    static RUNTIME: RefCell<Option<Rc<Runtime>>> = const { RefCell::new(None) };
}

pub(crate) struct Runtime {
    page: DomPage,
    config: DispatcherConfig,
    dispatcher: RefCell<Dispatcher<Element>>,
    sink: RefCell<Option<Box<dyn TraceSink>>>,
    frame: FrameRequest,
    /// Pending `setTimeout` handle and the deadline it was set for.
    timer: Cell<Option<(i32, HostTime)>>,
    timer_callback: Closure<dyn FnMut()>,
    controls: RefCell<HashMap<TriggerId, Controls>>,
    retired: RefCell<Vec<Controls>>,
}

/// The pause/resume listeners installed on one trigger's element.
struct Controls {
    element: Element,
    pause: Closure<dyn FnMut(Event)>,
    resume: Closure<dyn FnMut(Event)>,
}

impl Controls {
    fn detach(&self) {
        let _ = self
            .element
            .remove_event_listener_with_callback(PAUSE_EVENT, self.pause.as_ref().unchecked_ref());
        let _ = self
            .element
            .remove_event_listener_with_callback(RESUME_EVENT, self.resume.as_ref().unchecked_ref());
    }
}

impl core::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("triggers", &self.dispatcher.borrow().registry().len())
            .field("controls", &self.controls.borrow().len())
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// The page's runtime, created and attached to the window on first use.
    ///
    /// Returns `None` outside a browser main thread.
    pub(crate) fn get() -> Option<Rc<Self>> {
        RUNTIME.with(|slot| {
            if let Some(runtime) = &*slot.borrow() {
                return Some(Rc::clone(runtime));
            }
            let runtime = Self::new(DomPage::new()?, DispatcherConfig::web());
            runtime.listen();
            *slot.borrow_mut() = Some(Rc::clone(&runtime));
            Some(runtime)
        })
    }

    fn new(page: DomPage, config: DispatcherConfig) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let on_frame = weak.clone();
            let on_timer = weak.clone();
            Self {
                page,
                config,
                dispatcher: RefCell::new(Dispatcher::new(config)),
                sink: RefCell::new(None),
                frame: FrameRequest::new(move |now| {
                    if let Some(runtime) = on_frame.upgrade() {
                        runtime.on_frame(now);
                    }
                }),
                timer: Cell::new(None),
                timer_callback: Closure::wrap(Box::new(move || {
                    if let Some(runtime) = on_timer.upgrade() {
                        runtime.on_timer();
                    }
                }) as Box<dyn FnMut()>),
                controls: RefCell::new(HashMap::new()),
                retired: RefCell::new(Vec::new()),
            }
        })
    }

    /// Installs the window `scroll` and `resize` listeners.
    fn listen(self: &Rc<Self>) {
        let window = self.page.window();

        let weak = Rc::downgrade(self);
        let on_scroll = Closure::wrap(Box::new(move |_event: Event| {
            if let Some(runtime) = weak.upgrade() {
                runtime.on_scroll();
            }
        }) as Box<dyn FnMut(_)>);
        let _ = window.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref());
        on_scroll.forget();

        let weak = Rc::downgrade(self);
        let on_resize = Closure::wrap(Box::new(move |_event: Event| {
            if let Some(runtime) = weak.upgrade() {
                runtime.on_resize();
            }
        }) as Box<dyn FnMut(_)>);
        let _ = window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
        on_resize.forget();
    }

    pub(crate) fn page(&self) -> &DomPage {
        &self.page
    }

    pub(crate) fn take_errors(&self) -> Vec<TriggerError> {
        self.dispatcher.borrow_mut().take_errors()
    }

    pub(crate) fn set_trace_sink(&self, sink: Option<Box<dyn TraceSink>>) {
        *self.sink.borrow_mut() = sink;
    }

    /// Runs `f` with the dispatcher and a tracer over the installed sink.
    fn with_dispatcher<R>(&self, f: impl FnOnce(&mut Dispatcher<Element>, &mut Tracer<'_>) -> R) -> R {
        let mut sink = self.sink.borrow_mut();
        let mut tracer = match sink.as_deref_mut() {
            Some(sink) => Tracer::new(sink),
            None => Tracer::none(),
        };
        f(&mut self.dispatcher.borrow_mut(), &mut tracer)
    }

    /// Applies queued events outside the dispatcher borrow.
    fn deliver(&self) {
        let detached = self.dispatcher.borrow_mut().take_detached();
        for id in detached {
            self.release_controls(id);
        }
        let deliveries = self.dispatcher.borrow_mut().take_deliveries();
        let mut effects = DomEffects;
        for delivery in &deliveries {
            delivery.deliver(&mut effects);
        }
    }

    // -- Registration --

    /// Registers every `data-scroll` element.
    pub(crate) fn scan(self: &Rc<Self>) -> BatchReport {
        let report = self.with_dispatcher(|d, tracer| d.scan(&self.page, tracer));
        self.attach_controls(&report);
        self.deliver();
        report
    }

    /// Registers parsed `init` descriptors. Option errors keep their index.
    pub(crate) fn register_parsed(self: &Rc<Self>, parsed: Vec<ParsedDescriptor>) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, descriptor) in parsed.into_iter().enumerate() {
            match descriptor {
                Ok(descriptor) => {
                    let mut one =
                        self.with_dispatcher(|d, tracer| d.register_all(&self.page, vec![descriptor], tracer));
                    for error in &mut one.errors {
                        error.index = index;
                    }
                    report.extend(one);
                }
                Err(error) => report.errors.push(DescriptorError { index, error }),
            }
        }
        self.attach_controls(&report);
        self.deliver();
        report
    }

    /// Registers one element from Rust.
    pub(crate) fn register(
        self: &Rc<Self>,
        element: Element,
        config: TriggerConfig,
        hooks: TriggerHooks<Element>,
    ) -> Result<Registration, ConfigurationError> {
        let registration = self.with_dispatcher(|d, tracer| {
            d.register(&self.page, element, config, hooks, tracer)
        })?;
        let report = BatchReport {
            registered: vec![registration],
            errors: Vec::new(),
        };
        self.attach_controls(&report);
        self.deliver();
        Ok(registration)
    }

    pub(crate) fn remove(&self, id: TriggerId) -> bool {
        let removed = self.dispatcher.borrow_mut().remove(id);
        self.release_controls(id);
        removed
    }

    /// Recomputes every trigger's bounds now, then samples.
    pub(crate) fn refresh(&self) {
        self.with_dispatcher(|d, tracer| d.refresh(&self.page, tracer));
        if self.dispatcher.borrow().wants_animation_frame() {
            self.frame.request();
        }
        self.deliver();
    }

    /// Installs pause/resume listeners on newly registered elements.
    fn attach_controls(self: &Rc<Self>, report: &BatchReport) {
        for registration in &report.registered {
            let Registration::New(id) = *registration else {
                continue;
            };
            let Some(element) = self
                .dispatcher
                .borrow()
                .trigger(id)
                .map(|trigger| trigger.element().clone())
            else {
                continue;
            };
            let listener = |pause: bool| {
                let weak = Rc::downgrade(self);
                Closure::wrap(Box::new(move |_event: Event| {
                    if let Some(runtime) = weak.upgrade() {
                        runtime.control(id, pause);
                    }
                }) as Box<dyn FnMut(_)>)
            };
            let controls = Controls {
                element,
                pause: listener(true),
                resume: listener(false),
            };
            let _ = controls
                .element
                .add_event_listener_with_callback(PAUSE_EVENT, controls.pause.as_ref().unchecked_ref());
            let _ = controls
                .element
                .add_event_listener_with_callback(RESUME_EVENT, controls.resume.as_ref().unchecked_ref());
            if let Some(stale) = self.controls.borrow_mut().insert(id, controls) {
                stale.detach();
                self.retired.borrow_mut().push(stale);
            }
        }
    }

    /// Removes the pause/resume listeners of `id`, if any.
    fn release_controls(&self, id: TriggerId) {
        let controls = self.controls.borrow_mut().remove(&id);
        if let Some(controls) = controls {
            controls.detach();
            self.retired.borrow_mut().push(controls);
        }
    }

    /// Drops listeners released by an earlier handler.
    fn drop_retired(&self) {
        self.retired.borrow_mut().clear();
    }

    // -- Event handlers --

    fn control(&self, id: TriggerId, pause: bool) {
        self.drop_retired();
        if pause {
            self.dispatcher.borrow_mut().pause(id);
            return;
        }
        let resumed = self.dispatcher.borrow_mut().resume(id);
        if resumed {
            self.with_dispatcher(|d, tracer| d.sample_trigger(&self.page, id, tracer));
            self.deliver();
        }
    }

    fn on_scroll(&self) {
        self.drop_retired();
        let now = crate::now();
        let sampled = self.with_dispatcher(|d, tracer| d.on_scroll(&self.page, now, tracer));
        self.schedule_poll(now);
        if sampled {
            self.deliver();
        }
    }

    fn on_resize(&self) {
        let now = crate::now();
        self.dispatcher.borrow_mut().on_resize(now);
        self.schedule_poll(now);
    }

    fn on_timer(&self) {
        self.drop_retired();
        self.timer.set(None);
        let now = crate::now();
        let ran = self.with_dispatcher(|d, tracer| d.poll(&self.page, now, tracer));
        // Re-arms for work that is not yet due, including an early timer.
        self.schedule_poll(now);
        if !ran {
            return;
        }
        if self.dispatcher.borrow().wants_animation_frame() {
            self.frame.request();
        }
        self.deliver();
    }

    fn on_frame(&self, now: HostTime) {
        self.drop_retired();
        self.with_dispatcher(|d, tracer| d.animation_frame(&self.page, now, tracer));
        if self.dispatcher.borrow().wants_animation_frame() {
            self.frame.request();
        }
        self.deliver();
    }

    /// Points the timer at the dispatcher's next deadline.
    fn schedule_poll(&self, now: HostTime) {
        let deadline = self.dispatcher.borrow().deadline();
        let scheduled = self.timer.get();
        if scheduled.map(|(_, at)| at) == deadline {
            return;
        }
        let window = self.page.window();
        if let Some((handle, _)) = scheduled {
            window.clear_timeout_with_handle(handle);
        }
        self.timer.set(None);
        let Some(deadline) = deadline else {
            return;
        };
        let handle = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            self.timer_callback.as_ref().unchecked_ref(),
            timeout_millis(deadline.saturating_duration_since(now)),
        );
        self.timer.set(handle.ok().map(|handle| (handle, deadline)));
    }
}

/// `setTimeout` delay for `delay`, rounded up to whole milliseconds.
fn timeout_millis(delay: Duration) -> i32 {
    let millis = delay.ticks().div_ceil(1000);
    i32::try_from(millis).unwrap_or(i32::MAX)
}
