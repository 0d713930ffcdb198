#![forbid(unsafe_code)]

//! Fetched records keyed by page number.
//!
//! # Invariants
//!
//! 1. `items()` is the concatenation of loaded pages in ascending page order,
//!    whatever order they were merged in.
//! 2. `items().len()` equals the sum of loaded page lengths.
//! 3. Merging an already-loaded page number changes nothing.
//!
//! Records are spliced in at the offset implied by the pages sorted before
//! them, so the flattened sequence is never rebuilt wholesale and each
//! record is stored once.

use std::collections::BTreeMap;
use std::ops::Range;

use pwin_core::{Direction, Page, PageNumber, Record};
use tracing::{debug, trace};

/// Result of [`PageStore::merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The page was new; its records now occupy `inserted_at..inserted_at + len`.
    Merged {
        /// Index of the page's first record in `items()`.
        inserted_at: usize,
        /// Number of records inserted.
        len: usize,
    },
    /// The page was already loaded.
    Duplicate,
}

/// Loaded pages and their flattened records.
#[derive(Debug, Clone, Default)]
pub struct PageStore {
    /// Page number to record count, ordered by page number.
    pages: BTreeMap<PageNumber, usize>,
    items: Vec<Record>,
}

impl PageStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `page` has been merged.
    #[must_use]
    pub fn has_page(&self, page: PageNumber) -> bool {
        self.pages.contains_key(&page)
    }

    /// Loaded page numbers, ascending.
    pub fn loaded_pages(&self) -> impl Iterator<Item = PageNumber> + '_ {
        self.pages.keys().copied()
    }

    /// Number of loaded pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Lowest loaded page.
    #[must_use]
    pub fn min_page(&self) -> Option<PageNumber> {
        self.pages.keys().next().copied()
    }

    /// Highest loaded page.
    #[must_use]
    pub fn max_page(&self) -> Option<PageNumber> {
        self.pages.keys().next_back().copied()
    }

    /// All records, in page order.
    #[must_use]
    pub fn items(&self) -> &[Record] {
        &self.items
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no records are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index range of `page`'s records within `items()`.
    #[must_use]
    pub fn page_range(&self, page: PageNumber) -> Option<Range<usize>> {
        let len = *self.pages.get(&page)?;
        let start = self.offset_of(page);
        Some(start..start + len)
    }

    /// Records of one loaded page.
    #[must_use]
    pub fn page(&self, page: PageNumber) -> Option<&[Record]> {
        self.page_range(page).map(|r| &self.items[r])
    }

    /// Page containing record `index`.
    #[must_use]
    pub fn page_of(&self, index: usize) -> Option<PageNumber> {
        let mut start = 0;
        for (&page, &len) in &self.pages {
            if index < start + len {
                return Some(page);
            }
            start += len;
        }
        None
    }

    /// Merge a fetched page.
    ///
    /// `direction` is advisory: placement is always determined by page number,
    /// so a "previous" page that arrives after later pages still lands first.
    pub fn merge(&mut self, page: Page, direction: Direction) -> MergeOutcome {
        let Page { number, records } = page;
        if self.has_page(number) {
            trace!(page = number.get(), "duplicate page ignored");
            return MergeOutcome::Duplicate;
        }

        let inserted_at = self.offset_of(number);
        let len = records.len();
        let in_order = match direction {
            Direction::Append => inserted_at == self.items.len(),
            Direction::Prepend => inserted_at == 0,
        };

        if inserted_at == self.items.len() {
            self.items.extend(records);
        } else {
            self.items.splice(inserted_at..inserted_at, records);
        }
        self.pages.insert(number, len);

        debug_assert_eq!(self.items.len(), self.pages.values().sum::<usize>());
        debug!(
            page = number.get(),
            %direction,
            inserted_at,
            len,
            in_order,
            total = self.items.len(),
            "page merged"
        );
        MergeOutcome::Merged { inserted_at, len }
    }

    /// Number of records in pages strictly before `page`.
    fn offset_of(&self, page: PageNumber) -> usize {
        self.pages.range(..page).map(|(_, len)| *len).sum()
    }
}
