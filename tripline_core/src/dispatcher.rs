// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The process-wide scroll/resize dispatcher.
//!
//! One [`Dispatcher`] owns every trigger. The host forwards window events to
//! it, and it fans each throttled sample out to the subscribed triggers in
//! registration order:
//!
//! ```text
//!   scroll ──► on_scroll ──(leading throttle)──► sample every trigger
//!   resize ──► on_resize ──► mark BOUNDS
//!   timer  ──► poll ──(trailing calls)──► recompute marked, then sample
//!   frame  ──► animation_frame ──► recompute + sample deferred fixed triggers
//! ```
//!
//! Nothing is applied to the page directly. Transitions are queued as
//! [`TriggerEvent`]s and handed out by [`take_deliveries`] or [`flush`],
//! together with the trigger's configuration and hook. This keeps page
//! callbacks out of the dispatcher's borrow.
//!
//! [`take_deliveries`]: Dispatcher::take_deliveries
//! [`flush`]: Dispatcher::flush

use alloc::string::String;
use alloc::vec::Vec;

use crate::attributes;
use crate::config::{Hook, TriggerConfig, TriggerHooks};
use crate::dirty;
use crate::error::ConfigurationError;
use crate::event::{EventKind, TriggerEvent};
use crate::id::TriggerId;
use crate::page::{EffectSink, Page, Viewport};
use crate::registry::{Registration, Registry};
use crate::throttle::{Edge, Throttle};
use crate::time::{Duration, HostTime};
use crate::trace::{
    BoundsEvent, DisableReason, DisabledEvent, ErrorEvent, RegisterEvent, ResizeEvent,
    SampleEvent, Tracer, TransitionEvent,
};
use crate::trigger::{Recompute, Transition, Trigger};

/// Throttle windows for window events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Leading-edge window for scroll sampling.
    pub scroll_window: Duration,
    /// Trailing-edge window for bounds recomputation after resizes.
    pub resize_window: Duration,
}

impl DispatcherConfig {
    /// Browser defaults: sample scrolls at most once every 10 ms, recompute
    /// bounds 100 ms after the last resize event.
    #[must_use]
    pub const fn web() -> Self {
        Self {
            scroll_window: Duration::from_millis(10),
            resize_window: Duration::from_millis(100),
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::web()
    }
}

/// Which elements a [`Descriptor`] applies to.
#[derive(Clone, Debug, PartialEq)]
pub enum Target<E> {
    /// Every element matching the selector at registration time.
    Selector(String),
    /// The given elements.
    Elements(Vec<E>),
}

/// A programmatic registration request.
#[derive(Clone, Debug)]
pub struct Descriptor<E> {
    /// Elements to watch.
    pub target: Target<E>,
    /// Configuration shared by every matched element.
    pub config: TriggerConfig,
    /// Hooks shared by every matched element.
    pub hooks: TriggerHooks<E>,
}

/// A descriptor (or marked element) that failed to register.
#[derive(Clone, Debug, PartialEq)]
pub struct DescriptorError {
    /// Position of the descriptor in the batch, or of the element in
    /// document order for [`Dispatcher::scan`].
    pub index: usize,
    /// Why registration failed.
    pub error: ConfigurationError,
}

/// Outcome of a batch registration. Failures do not stop the batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    /// One entry per matched element that produced a trigger.
    pub registered: Vec<Registration>,
    /// One entry per element that failed.
    pub errors: Vec<DescriptorError>,
}

impl BatchReport {
    /// Appends `other` to this report.
    pub fn extend(&mut self, other: Self) {
        self.registered.extend(other.registered);
        self.errors.extend(other.errors);
    }
}

/// A recomputation failure collected during a resize pass.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerError {
    /// The trigger that was disabled.
    pub id: TriggerId,
    /// Why.
    pub error: ConfigurationError,
}

/// One queued event, ready to apply outside the dispatcher.
pub struct Delivery<E> {
    /// The event.
    pub event: TriggerEvent<E>,
    /// The trigger's configuration.
    pub config: TriggerConfig,
    /// The hook to run after effects are applied, for enter and exit events.
    pub hook: Option<Hook<E>>,
}

impl<E> Delivery<E> {
    /// Applies effects, runs the hook, then publishes the notification.
    pub fn deliver(&self, sink: &mut dyn EffectSink<E>) {
        sink.apply(&self.event, &self.config);
        if let Some(hook) = &self.hook {
            hook(&self.event.element, &self.config);
        }
        sink.notify(&self.event, &self.config);
    }
}

impl<E: core::fmt::Debug> core::fmt::Debug for Delivery<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Delivery")
            .field("event", &self.event)
            .field("config", &self.config)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

/// Owns every trigger and drives them from window events.
///
/// Timestamps passed to the event methods are also used for trace events;
/// registration reuses the most recent one.
#[derive(Debug)]
pub struct Dispatcher<E> {
    registry: Registry<E>,
    scroll: Throttle,
    resize: Throttle,
    events: Vec<TriggerEvent<E>>,
    errors: Vec<TriggerError>,
    awaiting_frame: Vec<TriggerId>,
    detached: Vec<TriggerId>,
    now: HostTime,
}

impl<E: Clone + PartialEq> Default for Dispatcher<E> {
    fn default() -> Self {
        Self::new(DispatcherConfig::default())
    }
}

impl<E: Clone + PartialEq> Dispatcher<E> {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            registry: Registry::new(),
            scroll: Throttle::new(config.scroll_window, Edge::Leading),
            resize: Throttle::new(config.resize_window, Edge::Trailing),
            events: Vec::new(),
            errors: Vec::new(),
            awaiting_frame: Vec::new(),
            detached: Vec::new(),
            now: HostTime(0),
        }
    }

    /// The trigger storage.
    #[must_use]
    pub fn registry(&self) -> &Registry<E> {
        &self.registry
    }

    /// The trigger behind `id`, if it is live.
    #[must_use]
    pub fn trigger(&self, id: TriggerId) -> Option<&Trigger<E>> {
        self.registry.get(id)
    }

    /// The trigger watching `element`, if any.
    #[must_use]
    pub fn find(&self, element: &E) -> Option<TriggerId> {
        self.registry.find(element)
    }

    // -- Registration --

    /// Registers one element.
    ///
    /// Bounds are computed immediately and the new trigger is sampled once
    /// against the current scroll position, so an element that is already
    /// in view enters right away. Registering an element twice returns
    /// [`Registration::Existing`] and leaves the first trigger untouched.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`] if bounds cannot be computed. No trigger is
    /// created in that case.
    pub fn register<P>(
        &mut self,
        page: &P,
        element: E,
        config: TriggerConfig,
        hooks: TriggerHooks<E>,
        tracer: &mut Tracer<'_>,
    ) -> Result<Registration, ConfigurationError>
    where
        P: Page<Element = E> + ?Sized,
    {
        if let Some(id) = self.registry.find(&element) {
            tracer.register(&RegisterEvent {
                at: self.now,
                trigger: id,
                existing: true,
            });
            return Ok(Registration::Existing(id));
        }

        let trigger = match Trigger::new(page, element, config) {
            Ok(trigger) => trigger,
            Err(err) => {
                tracer.error(&ErrorEvent {
                    at: self.now,
                    trigger: None,
                    kind: err.kind(),
                });
                return Err(err);
            }
        };
        let state = *trigger.state();
        let registration = self.registry.register(trigger, hooks);
        let id = registration.id();

        tracer.register(&RegisterEvent {
            at: self.now,
            trigger: id,
            existing: false,
        });
        if state.disabled {
            tracer.disabled(&DisabledEvent {
                at: self.now,
                trigger: id,
                reason: DisableReason::NotLaidOut,
            });
        } else {
            tracer.bounds(&BoundsEvent {
                at: self.now,
                trigger: id,
                start: state.start,
                end: state.end,
            });
        }

        let viewport = Viewport::read(page);
        self.sample_one(id, &viewport, tracer);
        Ok(registration)
    }

    /// Registers every element matched by each descriptor.
    ///
    /// Each element is registered independently; a failure is recorded in
    /// the report and the batch continues.
    pub fn register_all<P>(
        &mut self,
        page: &P,
        descriptors: Vec<Descriptor<E>>,
        tracer: &mut Tracer<'_>,
    ) -> BatchReport
    where
        P: Page<Element = E> + ?Sized,
    {
        let mut report = BatchReport::default();
        for (index, descriptor) in descriptors.into_iter().enumerate() {
            let elements = match descriptor.target {
                Target::Selector(selector) if !page.is_valid_selector(&selector) => {
                    let error = ConfigurationError::InvalidSelector { selector };
                    tracer.error(&ErrorEvent {
                        at: self.now,
                        trigger: None,
                        kind: error.kind(),
                    });
                    report.errors.push(DescriptorError { index, error });
                    continue;
                }
                Target::Selector(selector) => page.query_all(&selector),
                Target::Elements(elements) => elements,
            };
            for element in elements {
                let config = descriptor.config.clone();
                let hooks = descriptor.hooks.clone();
                match self.register(page, element, config, hooks, tracer) {
                    Ok(registration) => report.registered.push(registration),
                    Err(error) => report.errors.push(DescriptorError { index, error }),
                }
            }
        }
        report
    }

    /// Registers every element carrying the `data-scroll` marker, configured
    /// from its attributes.
    ///
    /// Error indices are positions in document order among marked elements.
    pub fn scan<P>(&mut self, page: &P, tracer: &mut Tracer<'_>) -> BatchReport
    where
        P: Page<Element = E> + ?Sized,
    {
        let mut report = BatchReport::default();
        for (index, element) in page
            .query_all(attributes::MARKER_SELECTOR)
            .into_iter()
            .enumerate()
        {
            let parsed = attributes::parse(|name| page.attribute(&element, name));
            let result = parsed.and_then(|config| {
                self.register(page, element, config, TriggerHooks::none(), tracer)
            });
            match result {
                Ok(registration) => report.registered.push(registration),
                Err(error) => {
                    if matches!(error, ConfigurationError::InvalidAttribute { .. }) {
                        tracer.error(&ErrorEvent {
                            at: self.now,
                            trigger: None,
                            kind: error.kind(),
                        });
                    }
                    report.errors.push(DescriptorError { index, error });
                }
            }
        }
        report
    }

    /// Removes a trigger. Queued events for it are dropped.
    ///
    /// Returns `false` for a stale handle.
    pub fn remove(&mut self, id: TriggerId) -> bool {
        self.awaiting_frame.retain(|&other| other != id);
        self.detached.retain(|&other| other != id);
        self.events.retain(|event| event.id != id);
        self.registry.remove(id).is_some()
    }

    // -- Control signals --

    /// Suppresses sampling for `id`. Returns `false` for a stale handle.
    pub fn pause(&mut self, id: TriggerId) -> bool {
        self.registry.get_mut(id).map(Trigger::pause).is_some()
    }

    /// Re-enables sampling for `id` with its previous bounds.
    ///
    /// Nothing is sampled until the next scroll event or an explicit
    /// [`sample_trigger`](Self::sample_trigger).
    pub fn resume(&mut self, id: TriggerId) -> bool {
        self.registry.get_mut(id).map(Trigger::resume).is_some()
    }

    // -- Window events --

    /// Handles a scroll event. Returns `true` if a sample pass ran.
    ///
    /// A suppressed event leaves a trailing sample pending; the host calls
    /// [`poll`](Self::poll) at [`deadline`](Self::deadline) so the position
    /// a burst comes to rest at is always sampled.
    pub fn on_scroll<P>(&mut self, page: &P, now: HostTime, tracer: &mut Tracer<'_>) -> bool
    where
        P: Page<Element = E> + ?Sized,
    {
        self.now = now;
        if !self.scroll.hit(now) {
            return false;
        }
        self.sample_all(page, tracer);
        true
    }

    /// Handles a resize event.
    ///
    /// Marks every subscribed trigger for recomputation and restarts the
    /// trailing window; the host calls [`poll`](Self::poll) at
    /// [`deadline`](Self::deadline).
    pub fn on_resize(&mut self, now: HostTime) {
        self.now = now;
        self.resize.hit(now);
        self.registry.mark_all(dirty::BOUNDS);
    }

    /// When the pending resize pass is due, if any.
    #[must_use]
    pub fn resize_deadline(&self) -> Option<HostTime> {
        self.resize.deadline()
    }

    /// When the pending trailing scroll sample is due, if any.
    #[must_use]
    pub fn scroll_deadline(&self) -> Option<HostTime> {
        self.scroll.deadline()
    }

    /// The earliest time [`poll`](Self::poll) has work to do.
    #[must_use]
    pub fn deadline(&self) -> Option<HostTime> {
        match (self.scroll.deadline(), self.resize.deadline()) {
            (Some(scroll), Some(resize)) => Some(scroll.min(resize)),
            (scroll, resize) => scroll.or(resize),
        }
    }

    /// Runs whatever trailing work is due: the resize pass recomputes the
    /// bounds of every marked trigger, and either pass then samples.
    /// Returns `true` if anything ran.
    pub fn poll<P>(&mut self, page: &P, now: HostTime, tracer: &mut Tracer<'_>) -> bool
    where
        P: Page<Element = E> + ?Sized,
    {
        self.now = now;
        let resized = self.resize.poll(now);
        let scrolled = self.scroll.poll(now);
        if !resized && !scrolled {
            return false;
        }
        if resized {
            let marked = self.registry.drain(dirty::BOUNDS);
            let recomputed = self.recompute_each(&marked, page, tracer);
            tracer.resize(&ResizeEvent {
                at: now,
                recomputed,
            });
        }
        self.sample_all(page, tracer);
        true
    }

    /// Recomputes every subscribed trigger and samples, without throttling.
    ///
    /// For hosts that know layout changed without a resize event.
    pub fn refresh<P>(&mut self, page: &P, tracer: &mut Tracer<'_>)
    where
        P: Page<Element = E> + ?Sized,
    {
        self.resize.cancel();
        self.scroll.cancel();
        self.registry.mark_all(dirty::BOUNDS);
        let marked = self.registry.drain(dirty::BOUNDS);
        let recomputed = self.recompute_each(&marked, page, tracer);
        tracer.resize(&ResizeEvent {
            at: self.now,
            recomputed,
        });
        self.sample_all(page, tracer);
    }

    /// Whether fixed-mode triggers wait for an animation frame.
    #[must_use]
    pub fn wants_animation_frame(&self) -> bool {
        !self.awaiting_frame.is_empty()
    }

    /// Recomputes and samples the fixed-mode triggers that were forced out
    /// of view by the last resize pass.
    pub fn animation_frame<P>(&mut self, page: &P, now: HostTime, tracer: &mut Tracer<'_>)
    where
        P: Page<Element = E> + ?Sized,
    {
        self.now = now;
        let deferred = core::mem::take(&mut self.awaiting_frame);
        _ = self.recompute_each(&deferred, page, tracer);
        let viewport = Viewport::read(page);
        for id in deferred {
            if !self.awaiting_frame.contains(&id) {
                self.sample_one(id, &viewport, tracer);
            }
        }
    }

    /// Samples every subscribed trigger against the current scroll position.
    pub fn sample_all<P>(&mut self, page: &P, tracer: &mut Tracer<'_>)
    where
        P: Page<Element = E> + ?Sized,
    {
        let viewport = Viewport::read(page);
        let ids = self.registry.subscribed();
        let mut sampled = 0_u32;
        for id in ids {
            if self.awaiting_frame.contains(&id) {
                continue;
            }
            self.sample_one(id, &viewport, tracer);
            sampled = sampled.saturating_add(1);
        }
        tracer.sample(&SampleEvent {
            at: self.now,
            scroll_y: viewport.scroll_y,
            sampled,
        });
    }

    /// Samples one subscribed trigger against the current scroll position.
    pub fn sample_trigger<P>(&mut self, page: &P, id: TriggerId, tracer: &mut Tracer<'_>)
    where
        P: Page<Element = E> + ?Sized,
    {
        if self.registry.is_subscribed(id) && !self.awaiting_frame.contains(&id) {
            let viewport = Viewport::read(page);
            self.sample_one(id, &viewport, tracer);
        }
    }

    // -- Output --

    /// Takes the queued events in the order they occurred.
    ///
    /// Events for triggers removed since they were queued are dropped.
    pub fn take_deliveries(&mut self) -> Vec<Delivery<E>> {
        let events = core::mem::take(&mut self.events);
        let mut out = Vec::with_capacity(events.len());
        for event in events {
            let Some(entry) = self.registry.entry(event.id) else {
                continue;
            };
            let hook = match event.kind {
                EventKind::Entered => entry.hooks.on_enter.clone(),
                EventKind::Exited => entry.hooks.on_exit.clone(),
                EventKind::BoundsChanged(_) | EventKind::Progress { .. } => None,
            };
            out.push(Delivery {
                config: entry.trigger.config().clone(),
                event,
                hook,
            });
        }
        out
    }

    /// Delivers every queued event to `sink`.
    pub fn flush(&mut self, sink: &mut dyn EffectSink<E>) {
        for delivery in self.take_deliveries() {
            delivery.deliver(sink);
        }
    }

    /// Takes the errors collected by resize passes.
    pub fn take_errors(&mut self) -> Vec<TriggerError> {
        core::mem::take(&mut self.errors)
    }

    /// Takes the once-triggers that detached since the last call.
    ///
    /// Hosts use this to release per-trigger listeners.
    pub fn take_detached(&mut self) -> Vec<TriggerId> {
        core::mem::take(&mut self.detached)
    }

    // -- Internals --

    fn sample_one(&mut self, id: TriggerId, viewport: &Viewport, tracer: &mut Tracer<'_>) {
        let Some(trigger) = self.registry.get_mut(id) else {
            return;
        };
        let sample = trigger.sample(viewport);
        let element = trigger.element().clone();

        if let Some(fraction) = sample.progress {
            self.events.push(TriggerEvent {
                id,
                element: element.clone(),
                kind: EventKind::Progress { fraction },
            });
        }
        if let Some(transition) = sample.transition {
            let kind = match transition {
                Transition::Enter => EventKind::Entered,
                Transition::Exit => EventKind::Exited,
            };
            self.events.push(TriggerEvent { id, element, kind });
            tracer.transition(&TransitionEvent {
                at: self.now,
                trigger: id,
                transition,
                scroll_y: viewport.scroll_y,
            });
        }
        if sample.detach {
            self.registry.unsubscribe(id);
            self.detached.push(id);
            tracer.disabled(&DisabledEvent {
                at: self.now,
                trigger: id,
                reason: DisableReason::Once,
            });
        }
    }

    /// Returns how many triggers were measured.
    fn recompute_each<P>(&mut self, ids: &[TriggerId], page: &P, tracer: &mut Tracer<'_>) -> u32
    where
        P: Page<Element = E> + ?Sized,
    {
        let mut recomputed = 0_u32;
        for &id in ids {
            let Some(trigger) = self.registry.get_mut(id) else {
                continue;
            };
            let was_added = trigger.state().added;
            let result = trigger.recompute(page);
            let moved_out = was_added && !trigger.state().added;
            let element = trigger.element().clone();
            match result {
                Ok(Recompute::Measured(bounds)) => {
                    recomputed = recomputed.saturating_add(1);
                    self.events.push(TriggerEvent {
                        id,
                        element,
                        kind: EventKind::BoundsChanged(bounds),
                    });
                    tracer.bounds(&BoundsEvent {
                        at: self.now,
                        trigger: id,
                        start: bounds.start,
                        end: bounds.end,
                    });
                }
                Ok(Recompute::NotLaidOut) => {
                    if moved_out {
                        self.push_exit(id, element, page.scroll_y(), tracer);
                    }
                    tracer.disabled(&DisabledEvent {
                        at: self.now,
                        trigger: id,
                        reason: DisableReason::NotLaidOut,
                    });
                }
                Ok(Recompute::Deferred) => {
                    self.push_exit(id, element, page.scroll_y(), tracer);
                    if !self.awaiting_frame.contains(&id) {
                        self.awaiting_frame.push(id);
                    }
                }
                Ok(Recompute::Terminal) => {}
                Err(error) => {
                    if moved_out {
                        self.push_exit(id, element, page.scroll_y(), tracer);
                    }
                    tracer.error(&ErrorEvent {
                        at: self.now,
                        trigger: Some(id),
                        kind: error.kind(),
                    });
                    tracer.disabled(&DisabledEvent {
                        at: self.now,
                        trigger: id,
                        reason: DisableReason::Error,
                    });
                    self.errors.push(TriggerError { id, error });
                }
            }
        }
        recomputed
    }

    /// Queues an exit that did not come from sampling.
    fn push_exit(&mut self, id: TriggerId, element: E, scroll_y: f64, tracer: &mut Tracer<'_>) {
        self.events.push(TriggerEvent {
            id,
            element,
            kind: EventKind::Exited,
        });
        tracer.transition(&TransitionEvent {
            at: self.now,
            trigger: id,
            transition: Transition::Exit,
            scroll_y,
        });
    }
}
