#![forbid(unsafe_code)]

//! Error taxonomy.
//!
//! [`FetchError`] is recoverable and ends up as a user-visible message.
//! [`InvariantViolation`] is a programming error surfaced only to callers
//! that construct invalid inputs.

use std::fmt;

use crate::page::PageNumber;

/// Why a page fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The endpoint answered with a non-success status code.
    Status(u16),
    /// The request never produced a response (connect, TLS, timeout, worker panic).
    Transport(String),
    /// The response body could not be decoded into records.
    Decode(String),
}

/// Failure to fetch a specific page. The page stays retryable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    /// The page that failed.
    pub page: PageNumber,
    /// What went wrong.
    pub kind: FetchErrorKind,
}

impl FetchError {
    /// Non-success status code.
    #[must_use]
    pub fn status(page: PageNumber, code: u16) -> Self {
        Self {
            page,
            kind: FetchErrorKind::Status(code),
        }
    }

    /// Transport failure.
    #[must_use]
    pub fn transport(page: PageNumber, msg: impl Into<String>) -> Self {
        Self {
            page,
            kind: FetchErrorKind::Transport(msg.into()),
        }
    }

    /// Undecodable body.
    #[must_use]
    pub fn decode(page: PageNumber, msg: impl Into<String>) -> Self {
        Self {
            page,
            kind: FetchErrorKind::Decode(msg.into()),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FetchErrorKind::Status(code) => write!(f, "Failed to fetch photos: {code}"),
            FetchErrorKind::Transport(msg) => {
                write!(f, "Failed to fetch photos (page {}): {msg}", self.page)
            }
            FetchErrorKind::Decode(msg) => {
                write!(f, "Failed to decode photos (page {}): {msg}", self.page)
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// A precondition the caller was responsible for did not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Page numbers start at 1.
    PageNumberZero,
    /// A measurement was recorded while the layout does not use measured sizing.
    NotMeasured,
    /// An index at or past the end of the loaded units.
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageNumberZero => f.write_str("page numbers start at 1"),
            Self::NotMeasured => f.write_str("layout does not use measured extents"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for {len} units")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}
