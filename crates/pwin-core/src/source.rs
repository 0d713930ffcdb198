#![forbid(unsafe_code)]

//! The page-fetch capability.

use crate::error::FetchError;
use crate::page::PageNumber;
use crate::record::Record;

/// Something that can fetch one page of records.
///
/// Implementations block until the page is available; the loader decides
/// which thread that happens on. A `page_size` is passed on every call so
/// sources stay stateless with respect to paging.
pub trait PageSource: Send + Sync {
    /// Fetch `page` holding at most `page_size` records, in collection order.
    ///
    /// # Errors
    /// Returns [`FetchError`] on a non-success status, transport failure, or
    /// undecodable body.
    fn fetch_page(&self, page: PageNumber, page_size: usize) -> Result<Vec<Record>, FetchError>;
}

impl<F> PageSource for F
where
    F: Fn(PageNumber, usize) -> Result<Vec<Record>, FetchError> + Send + Sync,
{
    fn fetch_page(&self, page: PageNumber, page_size: usize) -> Result<Vec<Record>, FetchError> {
        self(page, page_size)
    }
}
