// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event-burst throttling.
//!
//! Scroll and resize events arrive in bursts. A [`Throttle`] decides which
//! events in a burst do real work:
//!
//! - [`Edge::Leading`] fires at most once per `window`, measured from the
//!   last call that fired. An event suppressed inside the window leaves a
//!   trailing call pending, so the final position of a burst is always
//!   seen. Used for scroll sampling.
//! - [`Edge::Trailing`] never fires on an event. It fires from
//!   [`poll`](Throttle::poll) once `window` has passed since the last event.
//!   Used for bounds recomputation after resizes.
//!
//! Time is supplied by the caller, which keeps the throttle deterministic
//! and usable without a timer facility.

use crate::time::{Duration, HostTime};

/// Which edge of a burst does the work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Fire on the first event of each window, plus once after the burst.
    Leading,
    /// Fire once the burst has been quiet for the whole window.
    Trailing,
}

/// Burst throttle driven by caller-supplied timestamps.
#[derive(Clone, Copy, Debug)]
pub struct Throttle {
    window: Duration,
    edge: Edge,
    last_event: Option<HostTime>,
    last_fired: Option<HostTime>,
    pending: bool,
}

impl Throttle {
    /// Creates an idle throttle.
    #[must_use]
    pub const fn new(window: Duration, edge: Edge) -> Self {
        Self {
            window,
            edge,
            last_event: None,
            last_fired: None,
            pending: false,
        }
    }

    /// The quiet window.
    #[inline]
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Records an event at `now`.
    ///
    /// Returns `true` if the work should run immediately, which only
    /// happens for a leading-edge throttle once `window` has passed since
    /// it last fired.
    pub fn hit(&mut self, now: HostTime) -> bool {
        self.last_event = Some(now);
        match self.edge {
            Edge::Leading => {
                let due = self
                    .last_fired
                    .is_none_or(|last| now.saturating_duration_since(last) >= self.window);
                if due {
                    self.last_fired = Some(now);
                }
                self.pending = !due;
                due
            }
            Edge::Trailing => {
                self.pending = true;
                false
            }
        }
    }

    /// When the pending trailing call becomes due.
    #[must_use]
    pub fn deadline(&self) -> Option<HostTime> {
        if !self.pending {
            return None;
        }
        let anchor = match self.edge {
            Edge::Leading => self.last_fired,
            Edge::Trailing => self.last_event,
        };
        anchor.map(|last| last.saturating_add(self.window))
    }

    /// Returns `true` once per burst, when the trailing call is due.
    pub fn poll(&mut self, now: HostTime) -> bool {
        match self.deadline() {
            Some(due) if now >= due => {
                self.pending = false;
                if self.edge == Edge::Leading {
                    self.last_fired = Some(now);
                }
                true
            }
            _ => false,
        }
    }

    /// Drops any pending trailing call.
    pub fn cancel(&mut self) {
        self.pending = false;
    }
}
