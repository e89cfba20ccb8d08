// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed trigger notifications.
//!
//! The state machine never touches the presentation layer. It queues
//! [`TriggerEvent`]s in the [`Dispatcher`](crate::dispatcher::Dispatcher),
//! which hands them to an [`EffectSink`](crate::page::EffectSink) and to the
//! trigger's hooks when flushed.

use crate::bounds::Bounds;
use crate::id::TriggerId;

/// DOM event name dispatched when a trigger enters.
pub const ENTERED_VIEW: &str = "enteredView";

/// DOM event name dispatched when a trigger exits.
pub const EXITED_VIEW: &str = "exitedView";

/// DOM event name dispatched after bounds are recomputed.
pub const BOUNDS_RECOMPUTED: &str = "boundsRecomputed";

/// What happened to a trigger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EventKind {
    /// The trigger moved from out of view to in view.
    Entered,
    /// The trigger moved from in view to out of view.
    Exited,
    /// Bounds were computed from fresh geometry.
    BoundsChanged(Bounds),
    /// A progress-mode sample. `fraction` is not clamped.
    Progress {
        /// Scroll position as a fraction of the scrollable range.
        fraction: f64,
    },
}

impl EventKind {
    /// Name of the notification dispatched to page code, if any.
    ///
    /// Progress samples are applied as a style and never dispatched.
    #[must_use]
    pub const fn notification_name(&self) -> Option<&'static str> {
        match self {
            Self::Entered => Some(ENTERED_VIEW),
            Self::Exited => Some(EXITED_VIEW),
            Self::BoundsChanged(_) => Some(BOUNDS_RECOMPUTED),
            Self::Progress { .. } => None,
        }
    }
}

/// A notification about one trigger.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerEvent<E> {
    /// The trigger that produced the event.
    pub id: TriggerId,
    /// The watched element.
    pub element: E,
    /// What happened.
    pub kind: EventKind,
}
