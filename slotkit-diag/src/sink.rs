//! Destinations for flushed records

use crate::Record;
use slotkit::ErrorCode;

/// Receives batches of records from a [`crate::Journal`]
pub trait Sink {
    /// Accept one batch, in the order the records were journaled.
    ///
    /// Called only with non-empty batches.
    fn write(&mut self, records: &[Record]);
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn write(&mut self, records: &[Record]) {
        (**self).write(records);
    }
}

/// Sink that emits one `tracing` event per record
///
/// Allocation failures are reported at `ERROR` level, everything else at
/// `WARN`.
#[derive(Debug, Default, Clone, Copy)]
#[non_exhaustive]
pub struct TracingSink;

impl TracingSink {
    /// Create a new [`TracingSink`].
    pub fn new() -> Self {
        Self
    }
}

impl Sink for TracingSink {
    fn write(&mut self, records: &[Record]) {
        for r in records {
            let file = r.location.file();
            let line = r.location.line();
            let detail = r.message.as_deref().unwrap_or("");
            if r.code == ErrorCode::NoMemory {
                tracing::error!(code = %r.code, file, line, detail, "container error");
            } else {
                tracing::warn!(code = %r.code, file, line, detail, "container error");
            }
        }
    }
}

/// Sink that keeps every record in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    /// Everything written so far
    records: Vec<Record>,
    /// Number of batches received
    batches: usize,
}

impl MemorySink {
    /// Create an empty [`MemorySink`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record received so far, oldest first.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// How many batches have been written.
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Remove and return every record received so far.
    pub fn take(&mut self) -> Vec<Record> {
        std::mem::take(&mut self.records)
    }
}

impl Sink for MemorySink {
    fn write(&mut self, records: &[Record]) {
        self.records.extend_from_slice(records);
        self.batches += 1;
    }
}
