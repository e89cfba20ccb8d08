// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The [`Registry`](crate::registry::Registry) uses [`understory_dirty`] to
//! remember which triggers owe work to a later callback. Triggers have no
//! dependency edges, so marking one slot never marks another.
//!
//! [`BOUNDS`] is marked for every subscribed trigger when a resize event
//! arrives and drained when the trailing resize throttle fires. A trigger
//! registered in between is not marked; its bounds are already fresh.

use understory_dirty::Channel;

/// Bounds must be recomputed from fresh geometry.
pub const BOUNDS: Channel = Channel::new(0);
