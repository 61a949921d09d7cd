//! Slot storage with stable handles.
//!
//! `SlotArena` hands out a [`SlotId`] for every inserted value. The id stays
//! valid until the value is removed. Vacant slots are chained into a free
//! list threaded through the slots themselves, so reuse is O(1) and a
//! long-running list never grows past its peak node count.
//!
//! ```text
//!   slots:  [ Occupied(a) | Vacant(→3) | Occupied(c) | Vacant(end) ]
//!   free_head: 1
//! ```

/// Stable handle to a value stored in a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    /// Position of the slot inside the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
enum Slot<T> {
    Occupied(T),
    Vacant { next_free: Option<usize> },
}

#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<usize>,
    occupied: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            occupied: 0,
        }
    }

    /// Stores `value`, reusing the most recently freed slot if there is one.
    pub fn insert(&mut self, value: T) -> SlotId {
        self.occupied += 1;
        match self.free_head {
            Some(idx) => {
                if let Slot::Vacant { next_free } =
                    std::mem::replace(&mut self.slots[idx], Slot::Occupied(value))
                {
                    self.free_head = next_free;
                }
                SlotId(idx)
            },
            None => {
                self.slots.push(Slot::Occupied(value));
                SlotId(self.slots.len() - 1)
            },
        }
    }

    /// Frees the slot and returns its value; `None` if it was already vacant.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.0)?;
        if matches!(slot, Slot::Vacant { .. }) {
            return None;
        }
        let vacated = Slot::Vacant {
            next_free: self.free_head,
        };
        match std::mem::replace(slot, vacated) {
            Slot::Occupied(value) => {
                self.free_head = Some(id.0);
                self.occupied -= 1;
                Some(value)
            },
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        match self.slots.get(id.0)? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        match self.slots.get_mut(id.0)? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Drops every value. Previously issued ids become invalid.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.occupied = 0;
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
