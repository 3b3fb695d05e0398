//! Owned, capacity-tracked contiguous storage
//!
//! [`GrowableBuffer`] is the bottom layer of the crate. It owns one
//! allocation of `capacity` slots, of which the first `length` are
//! initialized. Capacities follow the [`BufferConfig`] growth formula, and
//! the only way to change capacity is to allocate a fresh block, move the
//! live prefix across, and release the old block.
//!
//! Storage is a `Vec<MaybeUninit<T>>` whose length always equals our
//! capacity. We never ask that `Vec` to grow; it exists so allocation can be
//! fallible (via `try_reserve_exact`) and so release happens on every exit
//! path. It's critical for memory safety that we only read slots below
//! `length`, and that `length` is never incremented before the slot under it
//! has actually been written.
//!
//! Allocation failure is sticky. After one failed capacity change, the
//! buffer keeps its current contents but refuses every later capacity change
//! with the same error, until the buffer is replaced.

use crate::{BufferConfig, Error};
use std::fmt::{self, Debug};
use std::mem::{self, MaybeUninit};
use std::ops::{Deref, DerefMut};
use std::{ptr, slice};

/// Growable contiguous buffer with fallible, sticky-failure allocation
pub struct GrowableBuffer<T> {
    /// Backing slots; only `..length` hold initialized values
    storage: Vec<MaybeUninit<T>>,
    /// Number of initialized values at the front of `storage`
    length: usize,
    /// Growth policy used for every capacity change
    config: BufferConfig,
    /// First allocation error seen, returned again by every capacity change
    fault: Option<Error>,
}

impl<T> GrowableBuffer<T> {
    /// Create an empty buffer with the default [`BufferConfig`].
    pub fn new() -> Self {
        Self::with_hint(0, BufferConfig::default())
    }

    /// Create an empty buffer with room for more than `hint` items.
    ///
    /// The capacity is the smallest one allowed by `config` that exceeds
    /// `hint`. If that allocation fails, the buffer is zero-sized and
    /// remembers the failure; see [`Self::status()`].
    pub fn with_hint(hint: usize, config: BufferConfig) -> Self {
        match config.capacity_for(hint).and_then(Self::allocate) {
            Ok(storage) => Self {
                storage,
                length: 0,
                config,
                fault: None,
            },
            Err(err) => {
                tracing::warn!(hint, "buffer allocation failed at construction");
                Self {
                    storage: Vec::new(),
                    length: 0,
                    config,
                    fault: Some(err),
                }
            }
        }
    }

    /// Allocate `capacity` uninitialized slots.
    fn allocate(capacity: usize) -> Result<Vec<MaybeUninit<T>>, Error> {
        let mut storage = Vec::new();
        storage.try_reserve_exact(capacity)?;
        // SAFETY: The reservation above guarantees room for `capacity`
        //         items, and a `MaybeUninit` needs no initialization.
        unsafe { storage.set_len(capacity) };
        Ok(storage)
    }

    /// Number of slots in the current allocation.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of initialized items.
    pub fn len(&self) -> usize {
        self.length
    }

    /// True if no items are initialized.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The growth policy this buffer was built with.
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Report the sticky allocation fault, if any.
    ///
    /// Returns `Ok(())` while the buffer can still change capacity.
    pub fn status(&self) -> Result<(), Error> {
        match &self.fault {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Make sure the allocation can hold `new_length` items.
    ///
    /// This is the only place capacity ever changes for the public API.
    /// Either the buffer ends up with a larger allocation holding the same
    /// items, or it is left exactly as it was and the error becomes sticky.
    fn grow_for(&mut self, new_length: usize) -> Result<(), Error> {
        if let Some(err) = &self.fault {
            return Err(err.clone());
        }
        self.relocate(new_length).map_err(|err| {
            tracing::warn!(
                length = self.length,
                requested = new_length,
                "buffer allocation failed, further growth disabled"
            );
            self.fault = Some(err.clone());
            err
        })
    }

    /// Make room for `new_length` items without recording a failure.
    ///
    /// For containers built on several buffers that must grow together:
    /// they reserve every buffer first, so a failure leaves each one
    /// usable, and the pushes that follow need no allocation.
    pub(crate) fn reserve_for(&mut self, new_length: usize) -> Result<(), Error> {
        if let Some(err) = &self.fault {
            return Err(err.clone());
        }
        self.relocate(new_length)
    }

    /// Move the items into an allocation that fits `new_length` items.
    ///
    /// Does nothing if the current one already fits. On failure the buffer
    /// is unchanged.
    fn relocate(&mut self, new_length: usize) -> Result<(), Error> {
        if new_length < self.capacity() {
            return Ok(());
        }
        let mut storage = self
            .config
            .capacity_for(new_length)
            .and_then(Self::allocate)?;
        // SAFETY: Both pointers come from distinct live allocations of
        //         `MaybeUninit<T>`, the new one is at least as large as
        //         `length`, and the copy is typed so its extent is
        //         `length` items rather than `length` bytes. After the copy
        //         the old slots are dropped as `MaybeUninit`, which never
        //         runs `T`'s destructor, so ownership moves exactly once.
        unsafe {
            ptr::copy_nonoverlapping(self.storage.as_ptr(), storage.as_mut_ptr(), self.length);
        }
        tracing::debug!(
            from = self.capacity(),
            to = storage.len(),
            length = self.length,
            "buffer grown"
        );
        self.storage = storage;
        Ok(())
    }

    /// Change the number of initialized items to `new_length`.
    ///
    /// New slots are filled by calling `fill`, surplus items are dropped.
    /// If `new_length` fits the current allocation only the length changes;
    /// otherwise the buffer reallocates. Fails with the sticky fault if one
    /// is set, even when no allocation would have been needed.
    pub fn resize_with<F: FnMut() -> T>(
        &mut self,
        new_length: usize,
        mut fill: F,
    ) -> Result<(), Error> {
        self.grow_for(new_length)?;
        if new_length < self.length {
            self.truncate(new_length);
        }
        while self.length < new_length {
            self.storage[self.length].write(fill());
            self.length += 1;
        }
        Ok(())
    }

    /// Append one item, growing the allocation if needed.
    ///
    /// On failure the item is dropped and the buffer is unchanged.
    pub fn push(&mut self, value: T) -> Result<(), Error> {
        self.grow_for(self.length + 1)?;
        self.storage[self.length].write(value);
        self.length += 1;
        Ok(())
    }

    /// Remove and return the last item.
    pub fn pop(&mut self) -> Option<T> {
        if self.length == 0 {
            return None;
        }
        self.length -= 1;
        // SAFETY: The slot was below the old `length` so it is initialized,
        //         and lowering `length` first means it will never be read or
        //         dropped again.
        Some(unsafe { self.storage[self.length].assume_init_read() })
    }

    /// Drop every item at or after `new_length`. Capacity is unchanged.
    pub fn truncate(&mut self, new_length: usize) {
        if new_length >= self.length {
            return;
        }
        let tail = self.length - new_length;
        self.length = new_length;
        // SAFETY: Slots `new_length..new_length + tail` were initialized, and
        //         we lowered `length` before dropping so a panicking
        //         destructor can't cause a double drop.
        unsafe {
            let tail_ptr = self.storage.as_mut_ptr().add(new_length).cast::<T>();
            ptr::drop_in_place(slice::from_raw_parts_mut(tail_ptr, tail));
        }
    }

    /// Drop every item. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Move the allocation out, leaving this buffer with nothing.
    ///
    /// The returned buffer owns the storage, items and any sticky fault.
    /// `self` is left with zero capacity, zero length and no fault.
    pub fn take(&mut self) -> Self {
        let empty = Self {
            storage: Vec::new(),
            length: 0,
            config: self.config,
            fault: None,
        };
        mem::replace(self, empty)
    }

    /// View the initialized items.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: The first `length` slots are initialized, and
        //         `MaybeUninit<T>` has the same layout as `T`.
        unsafe { slice::from_raw_parts(self.storage.as_ptr().cast::<T>(), self.length) }
    }

    /// Mutably view the initialized items.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: As in `as_slice`, with exclusive access through `&mut self`.
        unsafe { slice::from_raw_parts_mut(self.storage.as_mut_ptr().cast::<T>(), self.length) }
    }
}

impl<T> Drop for GrowableBuffer<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: Clone> GrowableBuffer<T> {
    /// Deep copy into a fresh allocation with the same capacity.
    ///
    /// Fails with [`Error::NoMemory`] if that allocation fails. A sticky
    /// fault on `self` is copied, not reported.
    pub fn try_clone(&self) -> Result<Self, Error> {
        let mut copy = Self {
            storage: Self::allocate(self.capacity())?,
            length: 0,
            config: self.config,
            fault: self.fault.clone(),
        };
        for item in self.as_slice() {
            copy.storage[copy.length].write(item.clone());
            copy.length += 1;
        }
        Ok(copy)
    }
}

impl<T: Clone> Clone for GrowableBuffer<T> {
    /// Deep copy into a fresh allocation with the same capacity.
    ///
    /// If that allocation fails the copy is empty, zero-sized, and holds
    /// the sticky fault; use [`GrowableBuffer::try_clone()`] to see the
    /// failure directly.
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|err| Self {
            storage: Vec::new(),
            length: 0,
            config: self.config,
            fault: Some(err),
        })
    }
}

impl<T> Default for GrowableBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for GrowableBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for GrowableBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<'a, T> IntoIterator for &'a GrowableBuffer<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<T: Debug> Debug for GrowableBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowableBuffer")
            .field("capacity", &self.capacity())
            .field("items", &self.as_slice())
            .field("fault", &self.fault)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::GrowableBuffer;
    use crate::{BufferConfig, Error};
    use std::rc::Rc;

    #[test]
    fn hint_picks_capacity() {
        let b = GrowableBuffer::<u8>::with_hint(20, BufferConfig::default());
        assert_eq!(b.capacity(), 32);
        assert_eq!(b.len(), 0);
        assert_eq!(b.status(), Ok(()));
    }

    #[test]
    fn shrink_keeps_allocation() {
        let mut b = GrowableBuffer::new();
        b.resize_with(12, || 7_u32).expect("grow");
        assert_eq!(b.capacity(), 16);
        b.resize_with(3, || 0).expect("shrink");
        assert_eq!(b.capacity(), 16);
        assert_eq!(b.as_slice(), &[7, 7, 7]);
    }

    #[test]
    fn moves_drop_once() {
        // Each Rc clone lives in the buffer; growth must move, not copy.
        let counter = Rc::new(());
        {
            let mut b = GrowableBuffer::new();
            for _ in 0..100 {
                b.push(Rc::clone(&counter)).expect("push");
            }
            assert_eq!(Rc::strong_count(&counter), 101);
            let popped = b.pop();
            assert!(popped.is_some());
            drop(popped);
            assert_eq!(Rc::strong_count(&counter), 100);
            b.truncate(10);
            assert_eq!(Rc::strong_count(&counter), 11);
        }
        assert_eq!(Rc::strong_count(&counter), 1);
    }

    #[test]
    fn clone_is_deep() {
        let mut b = GrowableBuffer::new();
        for i in 0..9_u64 {
            b.push(i.to_string()).expect("push");
        }
        let mut c = b.clone();
        assert_eq!(c.capacity(), b.capacity());
        assert_eq!(c.as_slice(), b.as_slice());
        c[0].push('!');
        assert_eq!(b[0], "0");
        assert_eq!(c[0], "0!");
    }

    #[test]
    fn take_leaves_nothing() {
        let mut b = GrowableBuffer::new();
        b.push(1_i32).expect("push");
        let moved = b.take();
        assert_eq!(moved.as_slice(), &[1]);
        assert_eq!(b.capacity(), 0);
        assert_eq!(b.len(), 0);
        b.push(2).expect("source is still usable");
        assert_eq!(b.capacity(), 8);
    }

    #[test]
    fn zero_sized_items() {
        let mut b = GrowableBuffer::new();
        for _ in 0..40 {
            b.push(()).expect("push");
        }
        assert_eq!(b.len(), 40);
        assert_eq!(b.capacity(), 64);
    }

    #[test]
    fn failed_construction_is_sticky() {
        let config = BufferConfig::builder()
            .max_capacity(8)
            .build()
            .expect("valid config");
        let mut b = GrowableBuffer::<u8>::with_hint(8, config);
        assert_eq!(b.capacity(), 0);
        assert_eq!(b.status(), Err(Error::NoMemory));
        assert_eq!(b.push(1), Err(Error::NoMemory));
        assert_eq!(b.resize_with(0, || 0), Err(Error::NoMemory));
    }
}
