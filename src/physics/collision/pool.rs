use crate::event::CollisionEvent;

use thunderdome as td;

/// Fixed-capacity storage for the collision events of a single sub-step.
///
/// Slots are reused through the arena's free list,
/// so after the first frame no sub-step allocates.
pub struct EventPool {
    slots: td::Arena<CollisionEvent>,
    capacity: usize,
    // events that didn't fit, counted so overflow can be reported
    overflow: usize,
}

impl EventPool {
    pub fn with_capacity(capacity: usize) -> Self {
        EventPool {
            slots: td::Arena::with_capacity(capacity),
            capacity,
            overflow: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events stored, not counting overflow.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.len() == 0 && self.overflow == 0
    }

    /// Number of events offered since the last release, including ones that didn't fit.
    #[inline]
    pub fn requested(&self) -> usize {
        self.slots.len() + self.overflow
    }

    #[inline]
    pub fn is_overflowing(&self) -> bool {
        self.overflow > 0
    }

    /// Store an event in a free slot.
    /// If every slot is taken, the event is dropped and counted as overflow.
    pub fn acquire(&mut self, evt: CollisionEvent) -> Option<td::Index> {
        if self.slots.len() >= self.capacity {
            self.overflow += 1;
            return None;
        }
        Some(self.slots.insert(evt))
    }

    #[inline]
    pub fn get(&self, slot: td::Index) -> Option<&CollisionEvent> {
        self.slots.get(slot)
    }

    /// Free every slot for the next sub-step.
    pub fn release_all(&mut self) {
        self.slots.clear();
        self.overflow = 0;
    }

    /// Copy the stored events out in pair registration order.
    pub fn sorted_events(&self, out: &mut Vec<CollisionEvent>) {
        out.clear();
        out.extend(self.slots.iter().map(|(_, evt)| *evt));
        out.sort_by_key(|evt| evt.pair_index);
    }
}
