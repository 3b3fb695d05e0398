//! Slot index types and handles
//!
//! The list stores its links as narrow integers, so the index type is a
//! parameter. The largest value of that type is reserved as the free-slot
//! marker and can never name a real slot.

use num_traits::{Bounded, Unsigned};
use std::fmt::Debug;

/// Types we can use to store slot links
pub trait SlotIndex: Copy + Eq + Debug + Bounded + Unsigned + TryFrom<usize> + TryInto<usize> {
    /// The reserved value stored in `prev[slot]` for free slots.
    #[inline(always)]
    fn free_mark() -> Self {
        Self::max_value()
    }

    /// Build an index from a slot number.
    ///
    /// Returns `None` if the slot number doesn't fit, or collides with
    /// [`Self::free_mark()`].
    #[inline(always)]
    fn from_slot(slot: usize) -> Option<Self> {
        let index: Self = slot.try_into().ok()?;
        (index != Self::free_mark()).then_some(index)
    }

    /// Convert this index back into a slot number.
    ///
    /// Panics if the value would not fit in a `usize`. Only called on
    /// values we produced with [`Self::from_slot()`].
    #[inline(always)]
    fn into_slot(self) -> usize {
        self.try_into()
            .map_err(|_| ())
            .expect("slot index always fits in a usize")
    }
}

impl<T: Copy + Eq + Debug + Bounded + Unsigned + TryFrom<usize> + TryInto<usize>> SlotIndex
    for T
{
}

/// Stable reference to one slot of an [`crate::ArrayLinkedList`]
///
/// Holds the slot index plus the slot's generation when the reference was
/// handed out. Freeing a slot bumps its generation, so a reference that
/// outlives its value is rejected with [`crate::Error::StaleSlot`] instead
/// of silently naming whatever reused the slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SlotRef {
    /// Slot number in the list's parallel buffers
    index: usize,
    /// Generation of that slot when this reference was made
    generation: u32,
}

impl SlotRef {
    /// Reference to the sentinel slot `0`.
    ///
    /// Inserting after the sentinel inserts at the front; inserting before
    /// it inserts at the back.
    pub const SENTINEL: SlotRef = SlotRef {
        index: 0,
        generation: 0,
    };

    /// Make a new reference from its parts.
    pub(crate) fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot number this reference points at.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Generation this reference expects the slot to have.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[cfg(test)]
mod test {
    use super::SlotIndex;

    #[test]
    fn free_mark_is_reserved() {
        assert_eq!(<u8 as SlotIndex>::from_slot(254), Some(254));
        assert_eq!(<u8 as SlotIndex>::from_slot(255), None);
        assert_eq!(<u8 as SlotIndex>::from_slot(256), None);
        assert_eq!(<u16 as SlotIndex>::free_mark(), u16::MAX);
        assert_eq!(7_u32.into_slot(), 7);
    }
}
