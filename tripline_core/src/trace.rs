// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the dispatcher.
//!
//! This module provides a [`TraceSink`] trait with one method per event the
//! [`Dispatcher`](crate::dispatcher::Dispatcher) reports. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.

use crate::error::ErrorKind;
use crate::id::TriggerId;
use crate::time::HostTime;
use crate::trigger::Transition;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why a trigger stopped sampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisableReason {
    /// The element is not laid out.
    NotLaidOut,
    /// A once-trigger entered and was detached.
    Once,
    /// Bounds could not be recomputed.
    Error,
}

impl DisableReason {
    /// Short lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotLaidOut => "not-laid-out",
            Self::Once => "once",
            Self::Error => "error",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after a scroll sample pass.
#[derive(Clone, Copy, Debug)]
pub struct SampleEvent {
    /// Host time of the pass.
    pub at: HostTime,
    /// Scroll offset that was sampled.
    pub scroll_y: f64,
    /// Number of triggers sampled.
    pub sampled: u32,
}

/// Emitted when a trigger enters or exits.
#[derive(Clone, Copy, Debug)]
pub struct TransitionEvent {
    /// Host time of the sample.
    pub at: HostTime,
    /// The trigger.
    pub trigger: TriggerId,
    /// Which way it moved.
    pub transition: Transition,
    /// Scroll offset at the time.
    pub scroll_y: f64,
}

/// Emitted when bounds are computed from fresh geometry.
#[derive(Clone, Copy, Debug)]
pub struct BoundsEvent {
    /// Host time of the computation.
    pub at: HostTime,
    /// The trigger.
    pub trigger: TriggerId,
    /// Start boundary.
    pub start: f64,
    /// End boundary, if any.
    pub end: Option<f64>,
}

/// Emitted when a trigger is disabled.
#[derive(Clone, Copy, Debug)]
pub struct DisabledEvent {
    /// Host time.
    pub at: HostTime,
    /// The trigger.
    pub trigger: TriggerId,
    /// Why.
    pub reason: DisableReason,
}

/// Emitted for every registration attempt that produced a trigger handle.
#[derive(Clone, Copy, Debug)]
pub struct RegisterEvent {
    /// Host time.
    pub at: HostTime,
    /// The trigger handle.
    pub trigger: TriggerId,
    /// The element was already registered.
    pub existing: bool,
}

/// Emitted when a configuration error is returned or collected.
#[derive(Clone, Copy, Debug)]
pub struct ErrorEvent {
    /// Host time.
    pub at: HostTime,
    /// The affected trigger, if one exists yet.
    pub trigger: Option<TriggerId>,
    /// Error classification.
    pub kind: ErrorKind,
}

/// Emitted after the trailing resize pass.
#[derive(Clone, Copy, Debug)]
pub struct ResizeEvent {
    /// Host time of the pass.
    pub at: HostTime,
    /// Number of triggers whose bounds were recomputed.
    pub recomputed: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the dispatcher.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after a scroll sample pass.
    fn on_sample(&mut self, e: &SampleEvent) {
        _ = e;
    }

    /// Called when a trigger enters or exits.
    fn on_transition(&mut self, e: &TransitionEvent) {
        _ = e;
    }

    /// Called when bounds are computed.
    fn on_bounds(&mut self, e: &BoundsEvent) {
        _ = e;
    }

    /// Called when a trigger is disabled.
    fn on_disabled(&mut self, e: &DisabledEvent) {
        _ = e;
    }

    /// Called when an element is registered.
    fn on_register(&mut self, e: &RegisterEvent) {
        _ = e;
    }

    /// Called when a configuration error occurs.
    fn on_error(&mut self, e: &ErrorEvent) {
        _ = e;
    }

    /// Called after a resize pass.
    fn on_resize(&mut self, e: &ResizeEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

/// Expands to the body shared by every `Tracer` emit method.
macro_rules! emit {
    ($self:ident, $method:ident, $e:ident) => {{
        #[cfg(feature = "trace")]
        if let Some(s) = &mut $self.sink {
            s.$method($e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = $e;
        }
    }};
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`SampleEvent`].
    #[inline]
    pub fn sample(&mut self, e: &SampleEvent) {
        emit!(self, on_sample, e);
    }

    /// Emits a [`TransitionEvent`].
    #[inline]
    pub fn transition(&mut self, e: &TransitionEvent) {
        emit!(self, on_transition, e);
    }

    /// Emits a [`BoundsEvent`].
    #[inline]
    pub fn bounds(&mut self, e: &BoundsEvent) {
        emit!(self, on_bounds, e);
    }

    /// Emits a [`DisabledEvent`].
    #[inline]
    pub fn disabled(&mut self, e: &DisabledEvent) {
        emit!(self, on_disabled, e);
    }

    /// Emits a [`RegisterEvent`].
    #[inline]
    pub fn register(&mut self, e: &RegisterEvent) {
        emit!(self, on_register, e);
    }

    /// Emits an [`ErrorEvent`].
    #[inline]
    pub fn error(&mut self, e: &ErrorEvent) {
        emit!(self, on_error, e);
    }

    /// Emits a [`ResizeEvent`].
    #[inline]
    pub fn resize(&mut self, e: &ResizeEvent) {
        emit!(self, on_resize, e);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transition() -> TransitionEvent {
        TransitionEvent {
            at: HostTime(1_000),
            trigger: TriggerId::from_raw(3, 1),
            transition: Transition::Enter,
            scroll_y: 700.0,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_transition(&sample_transition());
        sink.on_error(&ErrorEvent {
            at: HostTime(0),
            trigger: None,
            kind: ErrorKind::MissingStart,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.transition(&sample_transition());
        tracer.resize(&ResizeEvent {
            at: HostTime(0),
            recomputed: 0,
        });
    }

    #[test]
    fn disable_reason_names() {
        assert_eq!(DisableReason::NotLaidOut.as_str(), "not-laid-out");
        assert_eq!(DisableReason::Once.as_str(), "once");
        assert_eq!(DisableReason::Error.as_str(), "error");
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            transitions: Vec<TriggerId>,
        }
        impl TraceSink for RecordingSink {
            fn on_transition(&mut self, e: &TransitionEvent) {
                self.transitions.push(e.trigger);
            }
        }

        let mut sink = RecordingSink {
            transitions: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.transition(&sample_transition());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.transitions, &[TriggerId::from_raw(3, 1)]);
    }
}
