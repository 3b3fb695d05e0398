//! Recording errors while forwarding them

use crate::{Journal, Record, Sink};
use slotkit::Error;
use std::panic::Location;

/// Extension methods for recording the error side of a slotkit `Result`
///
/// Both methods return the result unchanged, so they slot into an existing
/// `?` chain:
///
/// ```
/// use slotkit::{ArrayLinkedList, Error};
/// use slotkit_diag::{Journal, MemorySink, ResultExt};
///
/// fn drain(list: &mut ArrayLinkedList<u32>, journal: &mut Journal<MemorySink, 4>) -> Result<u32, Error> {
///     let mut sum = 0;
///     loop {
///         match list.pop_front().journal(journal) {
///             Ok(v) => sum += v,
///             Err(Error::NotFound) => return Ok(sum),
///             Err(e) => return Err(e),
///         }
///     }
/// }
/// ```
pub trait ResultExt: Sized {
    /// If this is an error, add a record of it to `journal`.
    ///
    /// The record carries the caller's source location and the error's
    /// display text.
    fn journal<S: Sink, const N: usize>(self, journal: &mut Journal<S, N>) -> Self;

    /// Like [`ResultExt::journal()`], with a message built only on error.
    fn journal_with<S, const N: usize, F>(self, journal: &mut Journal<S, N>, message: F) -> Self
    where
        S: Sink,
        F: FnOnce(&Error) -> String;
}

impl<T> ResultExt for Result<T, Error> {
    #[track_caller]
    fn journal<S: Sink, const N: usize>(self, journal: &mut Journal<S, N>) -> Self {
        if let Err(err) = &self {
            journal.record(Record::from_error(err, Location::caller()));
        }
        self
    }

    #[track_caller]
    fn journal_with<S, const N: usize, F>(self, journal: &mut Journal<S, N>, message: F) -> Self
    where
        S: Sink,
        F: FnOnce(&Error) -> String,
    {
        if let Err(err) = &self {
            journal.record(Record::at(err.code(), Location::caller()).with_message(message(err)));
        }
        self
    }
}

#[cfg(test)]
mod test {
    use super::ResultExt;
    use crate::{Journal, MemorySink};
    use slotkit::{Error, ErrorCode};

    #[test]
    fn ok_is_not_recorded() {
        let mut j = Journal::<_, 4>::new(MemorySink::new());
        let r: Result<u8, Error> = Ok(3);
        assert_eq!(r.journal(&mut j), Ok(3));
        assert!(j.is_empty());
    }

    #[test]
    fn error_is_recorded_and_forwarded() {
        let mut j = Journal::<_, 4>::new(MemorySink::new());
        let line = line!() + 1;
        let r: Result<u8, Error> = Err(Error::NotFound).journal(&mut j);
        assert_eq!(r, Err(Error::NotFound));
        j.flush();
        let records = j.sink().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, ErrorCode::NotFound);
        assert_eq!(records[0].location.line(), line);
    }

    #[test]
    fn message_only_built_on_error() {
        let mut j = Journal::<_, 4>::new(MemorySink::new());
        let ok: Result<(), Error> = Ok(());
        let _ = ok.journal_with(&mut j, |_| unreachable!());
        let err: Result<(), Error> = Err(Error::IndexOutOfBounds { index: 9 });
        let _ = err.journal_with(&mut j, |e| format!("popping: {e}"));
        j.flush();
        let records = j.sink().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, ErrorCode::IndexOutOfBounds);
        assert!(records[0]
            .message
            .as_deref()
            .is_some_and(|m| m.starts_with("popping: ")));
    }
}
