//! Doubly linked list over parallel slot arrays
//!
//! Every node lives in a numbered slot shared by four [`GrowableBuffer`]s:
//! the value, the `next` link, the `prev` link, and a generation counter.
//! Slot `0` is a permanent sentinel that never holds a value; `next[0]` is
//! the head and `prev[0]` the tail, which closes the chain into a circle.
//!
//! Unused slots form a singly linked free list threaded through `next`,
//! starting at `free_head` and ending at `0`. A free slot is recognized by
//! `prev[slot] == SlotIndex::free_mark()`. Freed slots go to the front of the
//! free list, so the most recently freed slot is the next one reused.
//!
//! Slots are only ever appended. Growing the list never moves or renumbers
//! an existing slot, so a [`SlotRef`] stays valid until its own slot is
//! freed, whatever else happens to the list.
//!
//! All operations are transient on failure: an error return means nothing
//! was changed. A link structure that contradicts these invariants is a bug
//! and panics.

mod index;

pub use index::{SlotIndex, SlotRef};

use crate::{BufferConfig, Error, GrowableBuffer};
use std::fmt::{self, Debug};
use std::iter::FusedIterator;

/// Array-backed doubly linked list with O(1) slot reuse
pub struct ArrayLinkedList<T, I = u32> {
    /// Slot values; `None` for the sentinel and for free slots
    data: GrowableBuffer<Option<T>>,
    /// Forward links, or the next free slot for free slots
    next: GrowableBuffer<I>,
    /// Backward links, or the free mark for free slots
    prev: GrowableBuffer<I>,
    /// Bumped every time a slot is freed
    generation: GrowableBuffer<u32>,
    /// First free slot, or `0` when the free list is empty
    free_head: I,
    /// Number of occupied slots, not counting the sentinel
    len: usize,
}

impl<T> ArrayLinkedList<T> {
    /// Create an empty list with `u32` links and the default
    /// [`BufferConfig`].
    pub fn new() -> Result<Self, Error> {
        Self::with_config(0, BufferConfig::default())
    }
}

impl<T, I: SlotIndex> ArrayLinkedList<T, I> {
    /// Create an empty list with room for `hint` values before growing.
    pub fn with_config(hint: usize, config: BufferConfig) -> Result<Self, Error> {
        let slots = hint.checked_add(1).ok_or(Error::NoMemory)?;
        let mut list = Self {
            data: GrowableBuffer::with_hint(slots, config),
            next: GrowableBuffer::with_hint(slots, config),
            prev: GrowableBuffer::with_hint(slots, config),
            generation: GrowableBuffer::with_hint(slots, config),
            free_head: I::zero(),
            len: 0,
        };
        list.data.push(None)?;
        list.next.push(I::zero())?;
        list.prev.push(I::zero())?;
        list.generation.push(0)?;
        Ok(list)
    }

    /// Number of values in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the list holds no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots, including the sentinel and free slots.
    pub fn slot_count(&self) -> usize {
        self.next.len()
    }

    /// First slot on the free list, if any.
    pub fn free_head(&self) -> Option<usize> {
        match self.free_head.into_slot() {
            0 => None,
            slot => Some(slot),
        }
    }

    /// Convert a known-valid slot number into a stored link.
    #[inline(always)]
    fn link(slot: usize) -> I {
        I::from_slot(slot).expect("slot numbers are range-checked when slots are created")
    }

    /// True if `slot` is on the free list.
    #[inline(always)]
    fn is_free(&self, slot: usize) -> bool {
        self.prev[slot] == I::free_mark()
    }

    /// Build the current [`SlotRef`] for a slot.
    #[inline(always)]
    fn slot_ref(&self, slot: usize) -> SlotRef {
        SlotRef::new(slot, self.generation[slot])
    }

    /// Resolve a [`SlotRef`] to a live slot number.
    ///
    /// The sentinel is only accepted when `allow_sentinel` is set.
    fn resolve(&self, at: SlotRef, allow_sentinel: bool) -> Result<usize, Error> {
        let slot = at.index();
        if slot >= self.slot_count() || self.is_free(slot) || (slot == 0 && !allow_sentinel) {
            return Err(Error::IndexOutOfBounds { index: slot });
        }
        if self.generation[slot] != at.generation() {
            return Err(Error::StaleSlot { index: slot });
        }
        Ok(slot)
    }

    /// Add exactly one slot and make it the head of the (empty) free list.
    ///
    /// Every backing buffer is reserved before any of them is pushed to,
    /// so a failed allocation leaves all four untouched and growable.
    fn grow_free_list(&mut self) -> Result<(), Error> {
        let slot = self.slot_count();
        let link = I::from_slot(slot).ok_or(Error::NoMemory)?;
        let slots = slot + 1;
        self.data.reserve_for(slots)?;
        self.next.reserve_for(slots)?;
        self.prev.reserve_for(slots)?;
        self.generation.reserve_for(slots)?;

        self.data.push(None)?;
        self.next.push(self.free_head)?;
        self.prev.push(I::free_mark())?;
        self.generation.push(0)?;
        tracing::trace!(slot, "list grew by one slot");
        self.free_head = link;
        Ok(())
    }

    /// Insert `value` right after the slot `after`.
    ///
    /// `after` may be [`SlotRef::SENTINEL`], which inserts at the front.
    /// Fails with [`Error::IndexOutOfBounds`] for a slot that doesn't exist
    /// or is free, and [`Error::StaleSlot`] for an outdated reference.
    pub fn insert_after(&mut self, value: T, after: SlotRef) -> Result<SlotRef, Error> {
        let after = self.resolve(after, true)?;
        if self.free_head == I::zero() {
            self.grow_free_list()?;
        }

        let slot = self.free_head.into_slot();
        assert!(
            slot < self.slot_count() && self.is_free(slot),
            "free list head {slot} is not a free slot"
        );
        self.free_head = self.next[slot];

        let old_next = self.next[after];
        self.data[slot] = Some(value);
        self.next[after] = Self::link(slot);
        self.prev[slot] = Self::link(after);
        self.next[slot] = old_next;
        self.prev[old_next.into_slot()] = Self::link(slot);
        self.len += 1;
        Ok(self.slot_ref(slot))
    }

    /// Insert `value` right before the slot `at`.
    ///
    /// Passing [`SlotRef::SENTINEL`] inserts at the back.
    pub fn insert_before(&mut self, value: T, at: SlotRef) -> Result<SlotRef, Error> {
        let at = self.resolve(at, true)?;
        let before = self.prev[at].into_slot();
        self.insert_after(value, self.slot_ref(before))
    }

    /// Append `value` at the back.
    pub fn push_back(&mut self, value: T) -> Result<SlotRef, Error> {
        self.insert_before(value, SlotRef::SENTINEL)
    }

    /// Prepend `value` at the front.
    pub fn push_front(&mut self, value: T) -> Result<SlotRef, Error> {
        self.insert_after(value, SlotRef::SENTINEL)
    }

    /// Unlink the value in slot `at` and return it.
    ///
    /// The slot goes to the front of the free list and its generation is
    /// bumped, so `at` and every copy of it become stale.
    pub fn pop(&mut self, at: SlotRef) -> Result<T, Error> {
        let slot = self.resolve(at, false)?;
        let value = self.data[slot]
            .take()
            .expect("occupied list slot always holds a value");

        let prev = self.prev[slot];
        let next = self.next[slot];
        self.next[prev.into_slot()] = next;
        self.prev[next.into_slot()] = prev;

        self.prev[slot] = I::free_mark();
        self.next[slot] = self.free_head;
        self.free_head = Self::link(slot);
        self.generation[slot] = self.generation[slot].wrapping_add(1);
        self.len -= 1;
        Ok(value)
    }

    /// Remove and return the first value, or [`Error::NotFound`] if empty.
    pub fn pop_front(&mut self) -> Result<T, Error> {
        let head = self.head().ok_or(Error::NotFound)?;
        self.pop(head)
    }

    /// Remove and return the last value, or [`Error::NotFound`] if empty.
    pub fn pop_back(&mut self) -> Result<T, Error> {
        let tail = self.tail().ok_or(Error::NotFound)?;
        self.pop(tail)
    }

    /// Free every slot. Slot count and generations are kept.
    pub fn clear(&mut self) {
        while self.pop_front().is_ok() {}
    }

    /// Reference to the first value, if any.
    pub fn head(&self) -> Option<SlotRef> {
        self.neighbor(self.next[0])
    }

    /// Reference to the last value, if any.
    pub fn tail(&self) -> Option<SlotRef> {
        self.neighbor(self.prev[0])
    }

    /// Turn a stored link into a reference, mapping the sentinel to `None`.
    fn neighbor(&self, link: I) -> Option<SlotRef> {
        match link.into_slot() {
            0 => None,
            slot => Some(self.slot_ref(slot)),
        }
    }

    /// Reference to the value after `at`, or `None` at the end.
    ///
    /// `next(SENTINEL)` is the head.
    pub fn next(&self, at: SlotRef) -> Result<Option<SlotRef>, Error> {
        let slot = self.resolve(at, true)?;
        Ok(self.neighbor(self.next[slot]))
    }

    /// Reference to the value before `at`, or `None` at the start.
    ///
    /// `prev(SENTINEL)` is the tail.
    pub fn prev(&self, at: SlotRef) -> Result<Option<SlotRef>, Error> {
        let slot = self.resolve(at, true)?;
        Ok(self.neighbor(self.prev[slot]))
    }

    /// Borrow the value in slot `at`.
    pub fn get(&self, at: SlotRef) -> Result<&T, Error> {
        let slot = self.resolve(at, false)?;
        Ok(self.data[slot]
            .as_ref()
            .expect("occupied list slot always holds a value"))
    }

    /// Mutably borrow the value in slot `at`.
    pub fn get_mut(&mut self, at: SlotRef) -> Result<&mut T, Error> {
        let slot = self.resolve(at, false)?;
        Ok(self.data[slot]
            .as_mut()
            .expect("occupied list slot always holds a value"))
    }

    /// Iterate over values from front to back.
    pub fn iter(&self) -> Iter<'_, T, I> {
        Iter {
            list: self,
            front: self.next[0],
            back: self.prev[0],
            remaining: self.len,
        }
    }

    /// Iterate over every slot in index order, without following links.
    ///
    /// This is a read-only view for tools that draw the slot arrays; the
    /// indices it reports are the same ones a [`SlotRef`] carries.
    pub fn slots(&self) -> Slots<'_, T, I> {
        Slots {
            list: self,
            slot: 0,
        }
    }

    /// Check every link and free-list invariant, panicking on the first
    /// violation.
    #[cfg(any(test, feature = "invariants"))]
    #[cfg_attr(feature = "invariants", visibility::make(pub))]
    pub(crate) fn check_links(&self) {
        let count = self.slot_count();
        assert_eq!(self.data.len(), count);
        assert_eq!(self.prev.len(), count);
        assert_eq!(self.generation.len(), count);
        assert!(self.data[0].is_none(), "sentinel holds a value");

        let mut slot = 0;
        let mut seen = 0;
        loop {
            let next = self.next[slot].into_slot();
            assert!(next < count, "link {slot} -> {next} leaves the slot space");
            assert_eq!(self.prev[next].into_slot(), slot, "broken back link at {next}");
            if next == 0 {
                break;
            }
            assert!(self.data[next].is_some(), "linked slot {next} is empty");
            seen += 1;
            assert!(seen <= self.len, "chain is longer than len");
            slot = next;
        }
        assert_eq!(seen, self.len, "chain is shorter than len");

        let mut free = 0;
        let mut slot = self.free_head.into_slot();
        while slot != 0 {
            assert!(slot < count, "free link {slot} leaves the slot space");
            assert!(self.is_free(slot), "free list reaches occupied slot {slot}");
            assert!(self.data[slot].is_none(), "free slot {slot} holds a value");
            free += 1;
            assert!(free < count, "free list has a cycle");
            slot = self.next[slot].into_slot();
        }
        assert_eq!(free + self.len + 1, count, "slots lost from both lists");
    }
}

impl<T: Clone, I: SlotIndex> ArrayLinkedList<T, I> {
    /// Deep copy with the same slot layout, so every [`SlotRef`] into
    /// `self` is also valid for the copy.
    ///
    /// Fails with [`Error::NoMemory`] if any backing buffer can't be
    /// allocated.
    pub fn try_clone(&self) -> Result<Self, Error> {
        Ok(Self {
            data: self.data.try_clone()?,
            next: self.next.try_clone()?,
            prev: self.prev.try_clone()?,
            generation: self.generation.try_clone()?,
            free_head: self.free_head,
            len: self.len,
        })
    }
}

impl<T: PartialEq, I: SlotIndex> ArrayLinkedList<T, I> {
    /// Find the first slot holding `value`, scanning from the front.
    ///
    /// This is a plain O(n) walk of the chain; the list keeps no index.
    pub fn find(&self, value: &T) -> Result<SlotRef, Error> {
        self.iter()
            .find(|(_, item)| *item == value)
            .map(|(at, _)| at)
            .ok_or(Error::NotFound)
    }
}

impl<T: Debug, I: SlotIndex> Debug for ArrayLinkedList<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|(_, v)| v)).finish()
    }
}

impl<'a, T, I: SlotIndex> IntoIterator for &'a ArrayLinkedList<T, I> {
    type Item = (SlotRef, &'a T);
    type IntoIter = Iter<'a, T, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Front-to-back iterator over an [`ArrayLinkedList`]
pub struct Iter<'a, T, I> {
    /// List being walked
    list: &'a ArrayLinkedList<T, I>,
    /// Next slot to yield from the front
    front: I,
    /// Next slot to yield from the back
    back: I,
    /// Values not yet yielded from either end
    remaining: usize,
}

impl<'a, T, I: SlotIndex> Iter<'a, T, I> {
    /// Yield `slot`, which must be occupied.
    fn item(&self, slot: usize) -> (SlotRef, &'a T) {
        let list = self.list;
        let value = list.data[slot]
            .as_ref()
            .expect("occupied list slot always holds a value");
        (list.slot_ref(slot), value)
    }
}

impl<'a, T, I: SlotIndex> Iterator for Iter<'a, T, I> {
    type Item = (SlotRef, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let slot = self.front.into_slot();
        self.front = self.list.next[slot];
        Some(self.item(slot))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T, I: SlotIndex> DoubleEndedIterator for Iter<'a, T, I> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let slot = self.back.into_slot();
        self.back = self.list.prev[slot];
        Some(self.item(slot))
    }
}

impl<'a, T, I: SlotIndex> ExactSizeIterator for Iter<'a, T, I> {}

impl<'a, T, I: SlotIndex> FusedIterator for Iter<'a, T, I> {}

/// What one slot currently holds
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[non_exhaustive]
pub enum SlotState<'a, T> {
    /// Slot `0`, which anchors the head and tail
    Sentinel,
    /// A slot on the value chain
    Occupied(&'a T),
    /// A slot on the free list
    Free,
}

/// Raw contents of one slot, as reported by [`ArrayLinkedList::slots()`]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[non_exhaustive]
pub struct SlotView<'a, T> {
    /// Slot number
    pub index: usize,
    /// Current generation of the slot
    pub generation: u32,
    /// Forward link; for free slots, the next free slot (`0` ends the list)
    pub next: usize,
    /// Backward link; `None` for free slots
    pub prev: Option<usize>,
    /// Slot contents
    pub state: SlotState<'a, T>,
}

/// Index-order iterator over the slots of an [`ArrayLinkedList`]
pub struct Slots<'a, T, I> {
    /// List being inspected
    list: &'a ArrayLinkedList<T, I>,
    /// Next slot number to report
    slot: usize,
}

impl<'a, T, I: SlotIndex> Iterator for Slots<'a, T, I> {
    type Item = SlotView<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.list;
        let index = self.slot;
        if index >= list.slot_count() {
            return None;
        }
        self.slot += 1;

        let free = list.is_free(index);
        let state = match (index, &list.data[index]) {
            (0, _) => SlotState::Sentinel,
            (_, Some(value)) => SlotState::Occupied(value),
            (_, None) => SlotState::Free,
        };
        Some(SlotView {
            index,
            generation: list.generation[index],
            next: list.next[index].into_slot(),
            prev: (!free).then(|| list.prev[index].into_slot()),
            state,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.list.slot_count().saturating_sub(self.slot);
        (left, Some(left))
    }
}

impl<'a, T, I: SlotIndex> ExactSizeIterator for Slots<'a, T, I> {}
