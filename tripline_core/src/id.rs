// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trigger identity.

use core::fmt;

/// A handle to a trigger in a [`Registry`](crate::registry::Registry).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a trigger is removed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriggerId {
    /// Slot index into the registry.
    pub(crate) idx: u32,
    /// Generation counter; must match the registry's generation for this slot.
    pub(crate) generation: u32,
}

impl TriggerId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Reassembles a handle from its raw parts.
    ///
    /// Used by the trace decoder and by backends that round-trip ids through
    /// the DOM. A handle built this way is only valid if the registry still
    /// holds the same generation in that slot.
    #[inline]
    #[must_use]
    pub const fn from_raw(index: u32, generation: u32) -> Self {
        Self {
            idx: index,
            generation,
        }
    }
}

impl fmt::Debug for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TriggerId({}@gen{})", self.idx, self.generation)
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.idx, self.generation)
    }
}
