//! Error types for the `slotkit` crate
//!
//! Every fallible container operation returns `Result<_, Error>`. Collaborators
//! that want a flat status value (loggers, dump tools) convert an [`Error`]
//! into its [`ErrorCode`], which is the fixed public enumeration with one
//! static name per code.

use std::collections::TryReserveError;
use std::num::{IntErrorKind, ParseFloatError, ParseIntError};

/// Errors returned by the containers in this crate
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An allocation failed, or a requested capacity could not be expressed.
    ///
    /// For a [`crate::GrowableBuffer`] this is sticky: once returned by a
    /// capacity change, every later capacity change returns it again.
    #[error("allocation failed or requested capacity is too large")]
    NoMemory,

    /// A slot index is past the end of the slot space, names a free slot,
    /// or names the list sentinel where user data is required.
    #[error("slot index {index} is out of bounds or not occupied")]
    IndexOutOfBounds {
        /// The rejected slot index
        index: usize,
    },

    /// A slot reference outlived the value it pointed at.
    ///
    /// The slot was freed (and possibly reused) after the reference was
    /// taken. Reported with the same [`ErrorCode`] as
    /// [`Error::IndexOutOfBounds`].
    #[error("slot {index} was freed since this reference was taken")]
    StaleSlot {
        /// The slot index carried by the stale reference
        index: usize,
    },

    /// A key or value search found no match, or the container was empty.
    #[error("no matching item")]
    NotFound,

    /// A string could not be converted to a number.
    #[error("malformed number")]
    BadNumber,

    /// A value was used before it was initialized.
    #[error("value used before initialization")]
    Uninitialized,

    /// A value was outside the range its consumer accepts.
    #[error("value out of range")]
    BadValue,

    /// An empty string was given where content is required.
    #[error("empty string")]
    EmptyString,

    /// A file could not be opened or had unexpected contents.
    #[error("bad file")]
    BadFile,
}

impl Error {
    /// Flatten this error into its [`ErrorCode`].
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::NoMemory => ErrorCode::NoMemory,
            Error::IndexOutOfBounds { .. } | Error::StaleSlot { .. } => {
                ErrorCode::IndexOutOfBounds
            }
            Error::NotFound => ErrorCode::NotFound,
            Error::BadNumber => ErrorCode::BadNumber,
            Error::Uninitialized => ErrorCode::Uninitialized,
            Error::BadValue => ErrorCode::BadValue,
            Error::EmptyString => ErrorCode::EmptyString,
            Error::BadFile => ErrorCode::BadFile,
        }
    }
}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Error::NoMemory
    }
}

impl From<ParseIntError> for Error {
    fn from(err: ParseIntError) -> Self {
        match err.kind() {
            IntErrorKind::Empty => Error::EmptyString,
            _ => Error::BadNumber,
        }
    }
}

impl From<ParseFloatError> for Error {
    fn from(_: ParseFloatError) -> Self {
        Error::BadNumber
    }
}

/// Flat status code for an operation outcome
///
/// This is the single source of truth for code names; the strings come from
/// the derive and are available through [`ErrorCode::name()`], `Display`,
/// and `&'static str` conversion.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    strum::Display,
    strum::IntoStaticStr,
    strum::EnumIter,
    strum::EnumCount,
    strum::FromRepr,
)]
#[repr(u8)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The operation succeeded.
    #[strum(serialize = "EVERYTHING_FINE")]
    EverythingFine = 0,
    /// See [`Error::NoMemory`].
    #[strum(serialize = "ERROR_NO_MEMORY")]
    NoMemory,
    /// See [`Error::IndexOutOfBounds`] and [`Error::StaleSlot`].
    #[strum(serialize = "ERROR_INDEX_OUT_OF_BOUNDS")]
    IndexOutOfBounds,
    /// See [`Error::NotFound`].
    #[strum(serialize = "ERROR_NOT_FOUND")]
    NotFound,
    /// See [`Error::BadNumber`].
    #[strum(serialize = "ERROR_BAD_NUMBER")]
    BadNumber,
    /// See [`Error::Uninitialized`].
    #[strum(serialize = "ERROR_UNINITIALIZED")]
    Uninitialized,
    /// See [`Error::BadValue`].
    #[strum(serialize = "ERROR_BAD_VALUE")]
    BadValue,
    /// See [`Error::EmptyString`].
    #[strum(serialize = "ERROR_EMPTY_STRING")]
    EmptyString,
    /// See [`Error::BadFile`].
    #[strum(serialize = "ERROR_BAD_FILE")]
    BadFile,
}

impl ErrorCode {
    /// Status code for any operation result.
    ///
    /// `Ok` maps to [`ErrorCode::EverythingFine`].
    pub fn of<T>(result: &Result<T, Error>) -> Self {
        match result {
            Ok(_) => ErrorCode::EverythingFine,
            Err(e) => e.code(),
        }
    }

    /// Upper-case name of this code, for example `"ERROR_NOT_FOUND"`.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// True for every code except [`ErrorCode::EverythingFine`].
    pub fn is_error(self) -> bool {
        self != ErrorCode::EverythingFine
    }
}

impl From<&Error> for ErrorCode {
    fn from(err: &Error) -> Self {
        err.code()
    }
}

#[cfg(test)]
mod test {
    use super::{Error, ErrorCode};
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn code_names() {
        let names: Vec<&str> = ErrorCode::iter().map(ErrorCode::name).collect();
        assert_eq!(
            names,
            [
                "EVERYTHING_FINE",
                "ERROR_NO_MEMORY",
                "ERROR_INDEX_OUT_OF_BOUNDS",
                "ERROR_NOT_FOUND",
                "ERROR_BAD_NUMBER",
                "ERROR_UNINITIALIZED",
                "ERROR_BAD_VALUE",
                "ERROR_EMPTY_STRING",
                "ERROR_BAD_FILE",
            ]
        );
        assert_eq!(ErrorCode::COUNT, 9);
        assert_eq!(ErrorCode::NotFound.to_string(), "ERROR_NOT_FOUND");
    }

    #[test]
    fn repr_round_trip() {
        for code in ErrorCode::iter() {
            assert_eq!(ErrorCode::from_repr(code as u8), Some(code));
        }
        assert_eq!(ErrorCode::from_repr(ErrorCode::COUNT as u8), None);
    }

    #[test]
    fn stale_shares_index_code() {
        assert_eq!(
            Error::StaleSlot { index: 3 }.code(),
            Error::IndexOutOfBounds { index: 3 }.code()
        );
        assert_eq!(ErrorCode::of::<()>(&Ok(())), ErrorCode::EverythingFine);
        assert!(!ErrorCode::of::<()>(&Ok(())).is_error());
        assert!(ErrorCode::of::<()>(&Err(Error::NotFound)).is_error());
    }

    #[test]
    fn parse_errors() {
        let empty: Result<u32, Error> = "".parse::<u32>().map_err(Error::from);
        assert_eq!(empty, Err(Error::EmptyString));
        let bad: Result<u32, Error> = "12x".parse::<u32>().map_err(Error::from);
        assert_eq!(bad, Err(Error::BadNumber));
        let float: Result<f64, Error> = "nope".parse::<f64>().map_err(Error::from);
        assert_eq!(float, Err(Error::BadNumber));
    }
}
