//! Bounded in-memory journal of records
//!
//! A [`Journal`] holds up to `N` records inline. The moment the buffer
//! fills it is written to the sink as one batch, so a journal never holds
//! a full buffer between calls. It is also written on [`Journal::flush()`]
//! and when the journal is dropped.

use crate::{Record, Sink};
use arrayvec::ArrayVec;

/// Buffers up to `N` records before handing them to a [`Sink`]
#[derive(Debug)]
pub struct Journal<S: Sink, const N: usize> {
    /// Destination for full or flushed batches
    sink: S,
    /// Records not yet written
    pending: ArrayVec<Record, N>,
}

impl<S: Sink, const N: usize> Journal<S, N> {
    /// Create an empty journal writing to `sink`.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            pending: ArrayVec::new(),
        }
    }

    /// Number of records waiting to be flushed.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True if nothing is waiting to be flushed.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The sink records are written to.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Add one record, flushing if that fills the buffer.
    pub fn record(&mut self, record: Record) {
        if let Err(overflow) = self.pending.try_push(record) {
            // Only reachable with N == 0: write straight through
            self.sink.write(&[overflow.element()]);
            return;
        }
        if self.pending.is_full() {
            self.flush();
        }
    }

    /// Write every pending record to the sink as one batch.
    pub fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        tracing::trace!(count = self.pending.len(), "flushing journal");
        self.sink.write(&self.pending);
        self.pending.clear();
    }
}

impl<S: Sink, const N: usize> Drop for Journal<S, N> {
    fn drop(&mut self) {
        self.flush();
    }
}
