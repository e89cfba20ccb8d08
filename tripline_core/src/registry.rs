// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational trigger storage.

use alloc::vec::Vec;

use understory_dirty::{Channel, CycleHandling, DirtyTracker};

use crate::config::TriggerHooks;
use crate::id::TriggerId;
use crate::trigger::Trigger;

/// Result of registering an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Registration {
    /// A new trigger was created.
    New(TriggerId),
    /// The element was already registered; the existing trigger is kept.
    Existing(TriggerId),
}

impl Registration {
    /// The trigger handle, new or existing.
    #[inline]
    #[must_use]
    pub const fn id(self) -> TriggerId {
        match self {
            Self::New(id) | Self::Existing(id) => id,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Entry<E> {
    pub(crate) trigger: Trigger<E>,
    pub(crate) hooks: TriggerHooks<E>,
}

/// Storage for all triggers owned by a dispatcher.
///
/// Triggers are addressed by [`TriggerId`] handles. Removed triggers leave
/// their slot on a free list, and generation counters make stale handles
/// miss. A separate subscription list records which triggers still receive
/// scroll and resize work, in registration order.
#[derive(Debug)]
pub struct Registry<E> {
    slots: Vec<Option<Entry<E>>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
    subscribed: Vec<u32>,
    dirty: DirtyTracker<u32>,
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Registry<E> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            subscribed: Vec::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    /// Number of live triggers, subscribed or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether no triggers are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Returns whether `id` refers to a live trigger.
    #[must_use]
    pub fn is_alive(&self, id: TriggerId) -> bool {
        self.generation.get(id.idx as usize) == Some(&id.generation)
            && self.slots[id.idx as usize].is_some()
    }

    /// Returns whether `id` still receives scroll and resize work.
    #[must_use]
    pub fn is_subscribed(&self, id: TriggerId) -> bool {
        self.is_alive(id) && self.subscribed.contains(&id.idx)
    }

    /// The trigger behind `id`, if it is live.
    #[must_use]
    pub fn get(&self, id: TriggerId) -> Option<&Trigger<E>> {
        self.entry(id).map(|entry| &entry.trigger)
    }

    /// Mutable access to the trigger behind `id`, if it is live.
    pub fn get_mut(&mut self, id: TriggerId) -> Option<&mut Trigger<E>> {
        self.entry_mut(id).map(|entry| &mut entry.trigger)
    }

    /// Live triggers in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (TriggerId, &Trigger<E>)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            let entry = slot.as_ref()?;
            Some((self.id_at(idx_u32(idx)), &entry.trigger))
        })
    }

    /// Detaches `id` from scroll and resize work; the trigger stays live.
    pub fn unsubscribe(&mut self, id: TriggerId) {
        if self.is_alive(id) {
            self.subscribed.retain(|&idx| idx != id.idx);
            self.dirty.remove_key(id.idx);
        }
    }

    /// Removes `id` entirely and frees its slot.
    ///
    /// Returns the removed trigger, or `None` for a stale handle.
    pub fn remove(&mut self, id: TriggerId) -> Option<Trigger<E>> {
        if !self.is_alive(id) {
            return None;
        }
        self.subscribed.retain(|&idx| idx != id.idx);
        self.dirty.remove_key(id.idx);
        let entry = self.slots[id.idx as usize].take()?;
        self.generation[id.idx as usize] += 1;
        self.free_list.push(id.idx);
        Some(entry.trigger)
    }

    /// Marks every subscribed trigger on `channel`.
    pub fn mark_all(&mut self, channel: Channel) {
        for &idx in &self.subscribed {
            self.dirty.mark(idx, channel);
        }
    }

    /// Marks one trigger on `channel`. Stale handles are ignored.
    pub fn mark(&mut self, id: TriggerId, channel: Channel) {
        if self.is_alive(id) {
            self.dirty.mark(id.idx, channel);
        }
    }

    /// Drains `channel`, returning the marked triggers that are still
    /// subscribed, in registration order.
    pub fn drain(&mut self, channel: Channel) -> Vec<TriggerId> {
        let marked: Vec<u32> = self
            .dirty
            .drain(channel)
            .deterministic()
            .run()
            .collect();
        self.subscribed
            .iter()
            .filter(|idx| marked.contains(idx))
            .map(|&idx| self.id_at(idx))
            .collect()
    }

    pub(crate) fn subscribed(&self) -> Vec<TriggerId> {
        self.subscribed.iter().map(|&idx| self.id_at(idx)).collect()
    }

    pub(crate) fn entry(&self, id: TriggerId) -> Option<&Entry<E>> {
        if self.generation.get(id.idx as usize) != Some(&id.generation) {
            return None;
        }
        self.slots[id.idx as usize].as_ref()
    }

    pub(crate) fn entry_mut(&mut self, id: TriggerId) -> Option<&mut Entry<E>> {
        if self.generation.get(id.idx as usize) != Some(&id.generation) {
            return None;
        }
        self.slots[id.idx as usize].as_mut()
    }

    fn id_at(&self, idx: u32) -> TriggerId {
        TriggerId {
            idx,
            generation: self.generation[idx as usize],
        }
    }
}

impl<E: Clone + PartialEq> Registry<E> {
    /// The live trigger watching `element`, if any.
    ///
    /// A linear scan: element handles only offer equality (`web_sys::Element`
    /// is not `Hash`), so registering `n` elements costs `O(n²)` compares.
    #[must_use]
    pub fn find(&self, element: &E) -> Option<TriggerId> {
        self.iter()
            .find(|(_, trigger)| trigger.element() == element)
            .map(|(id, _)| id)
    }

    /// Stores `trigger` unless its element is already registered.
    ///
    /// New triggers are subscribed. Registering an element twice keeps the
    /// first trigger and discards the new one.
    pub fn register(&mut self, trigger: Trigger<E>, hooks: TriggerHooks<E>) -> Registration {
        if let Some(id) = self.find(trigger.element()) {
            return Registration::Existing(id);
        }
        let entry = Entry { trigger, hooks };
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx as usize] = Some(entry);
            idx
        } else {
            let idx = idx_u32(self.slots.len());
            self.slots.push(Some(entry));
            self.generation.push(0);
            idx
        };
        self.subscribed.push(idx);
        Registration::New(self.id_at(idx))
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "trigger counts stay far below u32::MAX"
)]
fn idx_u32(idx: usize) -> u32 {
    idx as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TriggerConfig;
    use crate::dirty;
    use crate::testing::FakePage;

    fn trigger(page: &FakePage, element: u32) -> Trigger<u32> {
        Trigger::new(page, element, TriggerConfig::default()).unwrap()
    }

    #[test]
    fn registering_twice_keeps_first_trigger() {
        let mut page = FakePage::new(800.0, 5000.0);
        let el = page.add("#a", 1000.0, 100.0);
        let mut registry = Registry::new();

        let first = registry.register(trigger(&page, el), TriggerHooks::none());
        let Registration::New(id) = first else {
            panic!("expected a new registration, got {first:?}");
        };
        assert_eq!(
            registry.register(trigger(&page, el), TriggerHooks::none()),
            Registration::Existing(id)
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find(&el), Some(id));
    }

    #[test]
    fn removed_handles_go_stale() {
        let mut page = FakePage::new(800.0, 5000.0);
        let a = page.add("#a", 1000.0, 100.0);
        let b = page.add("#b", 2000.0, 100.0);
        let mut registry = Registry::new();

        let old = registry.register(trigger(&page, a), TriggerHooks::none()).id();
        assert!(registry.remove(old).is_some());
        assert!(!registry.is_alive(old));
        assert!(registry.get(old).is_none());
        assert!(registry.remove(old).is_none(), "double remove is a no-op");

        let new = registry.register(trigger(&page, b), TriggerHooks::none()).id();
        assert_eq!(new.index(), old.index(), "slot reused");
        assert_ne!(new, old);
        assert!(registry.get(old).is_none());
        assert_eq!(registry.get(new).map(|t| *t.element()), Some(b));
    }

    #[test]
    fn unsubscribed_triggers_stay_live_but_are_not_drained() {
        let mut page = FakePage::new(800.0, 5000.0);
        let a = page.add("#a", 1000.0, 100.0);
        let b = page.add("#b", 2000.0, 100.0);
        let mut registry = Registry::new();
        let ia = registry.register(trigger(&page, a), TriggerHooks::none()).id();
        let ib = registry.register(trigger(&page, b), TriggerHooks::none()).id();

        registry.unsubscribe(ia);
        assert!(registry.is_alive(ia));
        assert!(!registry.is_subscribed(ia));

        registry.mark_all(dirty::BOUNDS);
        assert_eq!(registry.drain(dirty::BOUNDS), [ib]);
        assert!(registry.drain(dirty::BOUNDS).is_empty(), "drain clears marks");
    }

    #[test]
    fn drain_preserves_registration_order() {
        let mut page = FakePage::new(800.0, 5000.0);
        let mut registry = Registry::new();
        let els: Vec<u32> = (0..4)
            .map(|i| page.add("#y", 1000.0 * f64::from(i), 100.0))
            .collect();
        let ids: Vec<TriggerId> = els
            .iter()
            .map(|&el| registry.register(trigger(&page, el), TriggerHooks::none()).id())
            .collect();

        registry.mark(ids[3], dirty::BOUNDS);
        registry.mark(ids[0], dirty::BOUNDS);
        registry.mark(ids[2], dirty::BOUNDS);
        assert_eq!(registry.drain(dirty::BOUNDS), [ids[0], ids[2], ids[3]]);
    }
}
