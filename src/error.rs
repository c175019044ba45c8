//! Error types

use crate::binary::read::ReadEof;
use crate::tag::DisplayTag;
use std::fmt;

/// Errors that originate when parsing binary data
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ParseError {
    BadEof,
    BadValue,
    BadVersion,
    BadOffset,
    BadIndex,
    LimitExceeded,
    /// A format number outside the set of formats defined for a structure.
    InvalidFormat(u16),
    /// A sequence that must be strictly increasing was not.
    OutOfOrder,
    /// The table with the given tag must be sanitized before this one.
    MissingDependency(u32),
    NotImplemented,
}

impl From<ReadEof> for ParseError {
    fn from(_error: ReadEof) -> Self {
        ParseError::BadEof
    }
}

impl From<std::num::TryFromIntError> for ParseError {
    fn from(_error: std::num::TryFromIntError) -> Self {
        ParseError::BadValue
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BadEof => write!(f, "end of data reached unexpectedly"),
            ParseError::BadValue => write!(f, "invalid value"),
            ParseError::BadVersion => write!(f, "unexpected data version"),
            ParseError::BadOffset => write!(f, "invalid data offset"),
            ParseError::BadIndex => write!(f, "invalid data index"),
            ParseError::LimitExceeded => write!(f, "limit exceeded"),
            ParseError::InvalidFormat(format) => write!(f, "invalid format {}", format),
            ParseError::OutOfOrder => write!(f, "values out of order"),
            ParseError::MissingDependency(tag) => {
                write!(f, "font is missing '{}' table", DisplayTag(*tag))
            }
            ParseError::NotImplemented => write!(f, "feature not implemented"),
        }
    }
}

impl std::error::Error for ParseError {}

/// How the failure of a table should be treated by the caller.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Severity {
    /// The table cannot be trusted and the whole font must be rejected.
    Fatal,
    /// Only the table is discarded; the rest of the font may still be used.
    Drop,
}

/// A table failed sanitization.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SanitizeError {
    /// Tag of the table that was rejected.
    pub tag: u32,
    /// What went wrong.
    pub kind: ParseError,
    /// The structure or field being checked when the failure occurred.
    pub detail: String,
}

impl SanitizeError {
    pub fn new(tag: u32, kind: ParseError, detail: impl Into<String>) -> Self {
        SanitizeError {
            tag,
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for SanitizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", DisplayTag(self.tag), self.detail, self.kind)
    }
}

impl std::error::Error for SanitizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Attach the table tag and a description of the failing structure to a low level error.
pub(crate) trait Context<T> {
    fn context(self, tag: u32, detail: &str) -> Result<T, SanitizeError>;

    fn with_context<F>(self, tag: u32, f: F) -> Result<T, SanitizeError>
    where
        F: FnOnce() -> String;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: Into<ParseError>,
{
    fn context(self, tag: u32, detail: &str) -> Result<T, SanitizeError> {
        self.map_err(|err| SanitizeError::new(tag, err.into(), detail))
    }

    fn with_context<F>(self, tag: u32, f: F) -> Result<T, SanitizeError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| SanitizeError::new(tag, err.into(), f()))
    }
}

/// Errors that originate when writing binary data
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum WriteError {
    BadValue,
    /// No table with the given tag has been accepted.
    MissingTable(u32),
}

impl From<std::num::TryFromIntError> for WriteError {
    fn from(_error: std::num::TryFromIntError) -> Self {
        WriteError::BadValue
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::BadValue => write!(f, "write: bad value"),
            WriteError::MissingTable(tag) => {
                write!(f, "write: no sanitized '{}' table", DisplayTag(*tag))
            }
        }
    }
}

impl std::error::Error for WriteError {}
