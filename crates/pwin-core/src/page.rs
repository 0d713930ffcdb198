#![forbid(unsafe_code)]

//! Pages and page numbers.

use std::fmt;
use std::num::NonZeroU32;

use crate::error::InvariantViolation;
use crate::record::Record;

/// A page number, always `>= 1`.
///
/// Page 0 (or anything negative) is unrepresentable, which is what keeps
/// "load previous" from ever walking past the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageNumber(NonZeroU32);

impl PageNumber {
    /// Page 1.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Create a page number.
    ///
    /// # Errors
    /// Returns [`InvariantViolation::PageNumberZero`] for `0`.
    pub fn new(n: u32) -> Result<Self, InvariantViolation> {
        NonZeroU32::new(n)
            .map(Self)
            .ok_or(InvariantViolation::PageNumberZero)
    }

    /// The raw page number.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// The next page, or `None` on overflow.
    #[must_use]
    pub fn succ(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// The previous page, or `None` when this is page 1.
    #[must_use]
    pub fn pred(self) -> Option<Self> {
        NonZeroU32::new(self.get() - 1).map(Self)
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u32> for PageNumber {
    type Error = InvariantViolation;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<PageNumber> for u32 {
    fn from(page: PageNumber) -> Self {
        page.get()
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a page is expected to land relative to already-loaded content.
///
/// The store never trusts this for ordering; it only records intent for
/// logging and scroll anchoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// After the highest loaded page.
    #[default]
    Append,
    /// Before the lowest loaded page.
    Prepend,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => f.write_str("append"),
            Self::Prepend => f.write_str("prepend"),
        }
    }
}

/// One fetch-sized batch of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Page number.
    pub number: PageNumber,
    /// Records in fetch order.
    pub records: Vec<Record>,
}

impl Page {
    /// Create a page.
    #[must_use]
    pub fn new(number: PageNumber, records: Vec<Record>) -> Self {
        Self { number, records }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the page carried no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
