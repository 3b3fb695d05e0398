//! One journaled error

use slotkit::{Error, ErrorCode};
use std::fmt;
use std::panic::Location;

/// An error code, where it was observed, and an optional message
#[derive(Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub struct Record {
    /// Code of the error that was observed
    pub code: ErrorCode,
    /// Source location of the call that observed it
    pub location: &'static Location<'static>,
    /// Extra context supplied by the caller
    pub message: Option<String>,
}

impl Record {
    /// Record `code` at the caller's location, with no message.
    #[track_caller]
    pub fn new(code: ErrorCode) -> Self {
        Self::at(code, Location::caller())
    }

    /// Record `code` at an explicit location.
    pub fn at(code: ErrorCode, location: &'static Location<'static>) -> Self {
        Self {
            code,
            location,
            message: None,
        }
    }

    /// Record `err` at an explicit location, keeping its text as the message.
    pub(crate) fn from_error(err: &Error, location: &'static Location<'static>) -> Self {
        Self::at(err.code(), location).with_message(err.to_string())
    }

    /// Attach a message, replacing any earlier one.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.location.file(),
            self.location.line(),
            self.code
        )?;
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Record;
    use slotkit::{Error, ErrorCode};
    use std::panic::Location;

    #[test]
    fn display() {
        let here = Location::caller();
        let r = Record::at(ErrorCode::NotFound, here);
        assert_eq!(
            r.to_string(),
            format!("{}:{}: ERROR_NOT_FOUND", here.file(), here.line())
        );
        let r = r.with_message("key 7");
        assert!(r.to_string().ends_with("ERROR_NOT_FOUND: key 7"));
    }

    #[test]
    fn new_uses_caller_location() {
        let line = line!() + 1;
        let r = Record::new(ErrorCode::BadValue);
        assert_eq!(r.location.line(), line);
        assert_eq!(r.location.file(), file!());
    }

    #[test]
    fn from_error_keeps_text() {
        let err = Error::IndexOutOfBounds { index: 4 };
        let r = Record::from_error(&err, Location::caller());
        assert_eq!(r.code, ErrorCode::IndexOutOfBounds);
        assert_eq!(r.message, Some(err.to_string()));
    }
}
