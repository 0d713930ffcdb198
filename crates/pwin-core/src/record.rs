#![forbid(unsafe_code)]

//! Fetched records.

/// One item of the collection, immutable once fetched.
///
/// Ordering is never derived from record fields: it comes from position within
/// its page and from page order across pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    /// Unique identifier.
    pub id: String,
    /// Author credit reported by the listing endpoint.
    #[cfg_attr(feature = "serde", serde(default))]
    pub author: String,
    /// Intrinsic width in pixels (> 0).
    pub width: u32,
    /// Intrinsic height in pixels (> 0).
    pub height: u32,
    /// Where the full-size content can be fetched from.
    pub source_url: String,
}

impl Record {
    /// Create a record without an author credit.
    ///
    /// Dimensions are taken as given; sources reject zero sizes when decoding.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        width: u32,
        height: u32,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author: String::new(),
            width,
            height,
            source_url: source_url.into(),
        }
    }

    /// Set the author credit.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Width divided by height, or `1.0` for degenerate dimensions.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        if self.width == 0 || self.height == 0 {
            return 1.0;
        }
        f64::from(self.width) / f64::from(self.height)
    }
}
