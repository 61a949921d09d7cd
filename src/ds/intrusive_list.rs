//! Doubly linked list whose nodes live in a [`SlotArena`].
//!
//! Links are `SlotId`s rather than pointers, so a caller can keep a node's id
//! as a handle and later remove it, splice next to it, or move it to the
//! front in O(1) without walking the list and without `unsafe`.
//!
//! ```text
//!   head                                        tail
//!    │                                           │
//!    ▼                                           ▼
//!   ┌──────────┐  next  ┌──────────┐  next  ┌──────────┐
//!   │ slot 4   │ ─────► │ slot 0   │ ─────► │ slot 2   │ ─► None
//!   │ value: A │ ◄───── │ value: B │ ◄───── │ value: C │
//!   └──────────┘  prev  └──────────┘  prev  └──────────┘
//!        ▲
//!      None
//! ```
//!
//! The `head` and `tail` fields play the part of sentinels. A node whose
//! `prev` is `None` sits right after the head sentinel and a node whose `next`
//! is `None` sits right before the tail sentinel, so every splice is the same
//! "link between two neighbours" step.
//!
//! | Operation                                  | Cost |
//! |--------------------------------------------|------|
//! | `push_front` / `push_back` / `push_before` | O(1) |
//! | `pop_front` / `pop_back` / `remove`        | O(1) |
//! | `move_to_front`                            | O(1) |
//! | `next_id` / `prev_id`                      | O(1) |
//! | `iter` (double-ended)                      | O(n) |

use std::iter::FusedIterator;

use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

#[derive(Debug)]
/// Intrusive list that stores nodes in a `SlotArena` and links them via `SlotId`.
pub struct IntrusiveList<T> {
    arena: SlotArena<Node<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> IntrusiveList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Returns `true` if `id` is currently a node in this list.
    pub fn contains(&self, id: SlotId) -> bool {
        self.arena.contains(id)
    }

    pub fn front(&self) -> Option<&T> {
        self.get(self.head?)
    }

    pub fn front_id(&self) -> Option<SlotId> {
        self.head
    }

    pub fn back(&self) -> Option<&T> {
        self.get(self.tail?)
    }

    pub fn back_id(&self) -> Option<SlotId> {
        self.tail
    }

    /// Neighbour towards the back; `None` at the tail or for a stale id.
    pub fn next_id(&self, id: SlotId) -> Option<SlotId> {
        self.arena.get(id)?.next
    }

    /// Neighbour towards the front; `None` at the head or for a stale id.
    pub fn prev_id(&self, id: SlotId) -> Option<SlotId> {
        self.arena.get(id)?.prev
    }

    /// Returns a double-ended iterator from front to back.
    pub fn iter(&self) -> IntrusiveListIter<'_, T> {
        IntrusiveListIter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }

    /// Node ids from front to back.
    pub fn iter_ids(&self) -> IntrusiveListIdIter<'_, T> {
        IntrusiveListIdIter {
            list: self,
            current: self.head,
        }
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.arena.get_mut(id).map(|node| &mut node.value)
    }

    /// Inserts a new node at the front and returns its `SlotId`.
    pub fn push_front(&mut self, value: T) -> SlotId {
        self.insert_between(None, self.head, value)
    }

    /// Inserts a new node at the back and returns its `SlotId`.
    pub fn push_back(&mut self, value: T) -> SlotId {
        self.insert_between(self.tail, None, value)
    }

    /// Inserts a new node immediately before `anchor` and returns its `SlotId`.
    ///
    /// `anchor` must be a node of this list. Debug builds assert this; release
    /// builds fall back to `push_back` when the anchor is missing.
    pub fn push_before(&mut self, anchor: SlotId, value: T) -> SlotId {
        debug_assert!(
            self.arena.contains(anchor),
            "push_before anchor {:?} is not in the list",
            anchor
        );
        let Some(prev) = self.arena.get(anchor).map(|node| node.prev) else {
            return self.push_back(value);
        };
        self.insert_between(prev, Some(anchor), value)
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.remove(self.head?)
    }

    pub fn pop_back(&mut self) -> Option<T> {
        self.remove(self.tail?)
    }

    /// Removes the node `id` from the list and returns its value.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.unlink(id)?;
        self.arena.remove(id).map(|node| node.value)
    }

    /// Moves an existing node to the front; returns `false` if `id` is not present.
    pub fn move_to_front(&mut self, id: SlotId) -> bool {
        if !self.arena.contains(id) {
            return false;
        }
        if self.head != Some(id) {
            self.unlink(id);
            self.link(id, None, self.head);
        }
        true
    }

    /// Clears the list and frees all nodes.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
    }

    #[cfg(any(test, debug_assertions))]
    /// Returns the list order as SlotIds from head to tail.
    pub fn debug_snapshot_ids(&self) -> Vec<SlotId> {
        self.iter_ids().collect()
    }

    fn insert_between(&mut self, prev: Option<SlotId>, next: Option<SlotId>, value: T) -> SlotId {
        let id = self.arena.insert(Node {
            value,
            prev: None,
            next: None,
        });
        self.link(id, prev, next);
        id
    }

    /// Splices the detached node `id` between two adjacent positions. A `None`
    /// side stands for the head or tail sentinel.
    fn link(&mut self, id: SlotId, prev: Option<SlotId>, next: Option<SlotId>) {
        if let Some(node) = self.arena.get_mut(id) {
            node.prev = prev;
            node.next = next;
        }
        match prev.and_then(|p| self.arena.get_mut(p)) {
            Some(node) => node.next = Some(id),
            None => self.head = Some(id),
        }
        match next.and_then(|n| self.arena.get_mut(n)) {
            Some(node) => node.prev = Some(id),
            None => self.tail = Some(id),
        }
    }

    /// Joins the neighbours of `id` to each other. The node keeps its slot and
    /// its stale links until it is relinked or freed.
    fn unlink(&mut self, id: SlotId) -> Option<()> {
        let node = self.arena.get(id)?;
        let (prev, next) = (node.prev, node.next);
        match prev.and_then(|p| self.arena.get_mut(p)) {
            Some(node) => node.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.arena.get_mut(n)) {
            Some(node) => node.prev = prev,
            None => self.tail = prev,
        }
        Some(())
    }

    /// Panics if forward and backward links disagree or the walk length
    /// differs from `len()`.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(
            self.head.is_none(),
            self.tail.is_none(),
            "head and tail disagree on emptiness"
        );

        let forward: Vec<_> = self.iter_ids().take(self.len() + 1).collect();
        assert_eq!(forward.len(), self.len(), "forward walk does not match len");

        let mut backward = Vec::with_capacity(self.len());
        let mut cursor = self.tail;
        while let Some(id) = cursor {
            backward.push(id);
            assert!(backward.len() <= self.len(), "backward walk overruns len");
            cursor = self.prev_id(id);
        }
        backward.reverse();
        assert_eq!(forward, backward, "prev links disagree with next links");
    }
}

/// Double-ended iterator over list values.
///
/// Restartable: each call to [`IntrusiveList::iter`] starts a fresh walk.
pub struct IntrusiveListIter<'a, T> {
    list: &'a IntrusiveList<T>,
    front: Option<SlotId>,
    back: Option<SlotId>,
    remaining: usize,
}

impl<'a, T> Iterator for IntrusiveListIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        let node = self.list.arena.get(id)?;
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for IntrusiveListIter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        let node = self.list.arena.get(id)?;
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<T> ExactSizeIterator for IntrusiveListIter<'_, T> {}

impl<T> FusedIterator for IntrusiveListIter<'_, T> {}

/// Iterator over SlotIds from front to back.
pub struct IntrusiveListIdIter<'a, T> {
    list: &'a IntrusiveList<T>,
    current: Option<SlotId>,
}

impl<T> Iterator for IntrusiveListIdIter<'_, T> {
    type Item = SlotId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.list.arena.get(id)?;
        self.current = node.next;
        Some(id)
    }
}

impl<'a, T> IntoIterator for &'a IntrusiveList<T> {
    type Item = &'a T;
    type IntoIter = IntrusiveListIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> Default for IntrusiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}
